use serde::Serialize;
use utoipa::ToSchema;

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct HealthcheckResponse {
    /// Always `available` when the server can answer
    pub status: String,
    pub system_info: SystemInfo,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
pub struct SystemInfo {
    pub environment: String,
    pub version: String,
}
