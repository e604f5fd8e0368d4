use axum::{Json, extract::State};

use crate::{
    AppState,
    api::models::healthcheck::{HealthcheckResponse, SystemInfo},
};

/// Report that the service is up, along with its environment and version
#[utoipa::path(
    get,
    path = "/healthcheck",
    tag = "healthcheck",
    responses(
        (status = 200, description = "Service is available", body = HealthcheckResponse),
    )
)]
#[tracing::instrument(skip_all)]
pub async fn healthcheck(State(state): State<AppState>) -> Json<HealthcheckResponse> {
    Json(HealthcheckResponse {
        status: "available".to_string(),
        system_info: SystemInfo {
            environment: state.config.environment.clone(),
            version: env!("CARGO_PKG_VERSION").to_string(),
        },
    })
}

#[cfg(test)]
mod tests {
    use crate::test_utils::{create_test_server, create_test_state};
    use serde_json::Value;

    #[tokio::test]
    async fn test_healthcheck() {
        let server = create_test_server(create_test_state());

        let response = server.get("/v1/healthcheck").await;
        response.assert_status_ok();

        let body: Value = response.json();
        assert_eq!(body["status"], "available");
        assert_eq!(body["system_info"]["environment"], "testing");
        assert_eq!(body["system_info"]["version"], env!("CARGO_PKG_VERSION"));
    }
}
