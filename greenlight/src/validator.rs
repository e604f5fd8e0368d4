//! Field-level input validation.
//!
//! A [`Validator`] collects failed checks into a map keyed by field name. Only the first failure
//! for each field is kept, but every check is evaluated, so a single pass reports all invalid
//! fields at once. The collected map is what clients see in a 422 response body.

use std::collections::{BTreeMap, HashSet};
use std::hash::Hash;

use once_cell::sync::Lazy;
use regex::Regex;

use crate::errors::Error;

/// Mapping from field name to a single human-readable message.
pub type FieldErrors = BTreeMap<String, String>;

/// Shape check for email addresses (the WHATWG "valid email address" production).
pub static EMAIL_RX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^[a-zA-Z0-9.!#$%&'*+/=?^_`{|}~-]+@[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?(?:\.[a-zA-Z0-9](?:[a-zA-Z0-9-]{0,61}[a-zA-Z0-9])?)*$",
    )
    .expect("invalid email pattern")
});

#[derive(Debug, Default, Clone)]
pub struct Validator {
    errors: FieldErrors,
}

impl Validator {
    pub fn new() -> Self {
        Self::default()
    }

    /// True if no check has failed so far.
    pub fn valid(&self) -> bool {
        self.errors.is_empty()
    }

    /// Record an error for `field`, unless one is already recorded.
    pub fn add_error(&mut self, field: &str, message: impl Into<String>) {
        self.errors.entry(field.to_string()).or_insert_with(|| message.into());
    }

    /// Record `message` against `field` when `ok` is false.
    pub fn check(&mut self, ok: bool, field: &str, message: impl Into<String>) {
        if !ok {
            self.add_error(field, message);
        }
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    /// Finish validation, turning any collected failures into [`Error::Validation`].
    pub fn finish(self) -> Result<(), Error> {
        if self.valid() {
            Ok(())
        } else {
            Err(Error::Validation { errors: self.errors })
        }
    }
}

pub fn permitted_value<T: PartialEq>(value: &T, permitted: &[T]) -> bool {
    permitted.contains(value)
}

pub fn matches(value: &str, rx: &Regex) -> bool {
    rx.is_match(value)
}

pub fn unique<T: Eq + Hash>(values: &[T]) -> bool {
    let mut seen = HashSet::with_capacity(values.len());
    values.iter().all(|v| seen.insert(v))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_failure_wins_per_field() {
        let mut v = Validator::new();
        v.check(false, "title", "must be provided");
        v.check(false, "title", "must not be more than 500 bytes long");
        v.check(true, "year", "must be provided");
        v.check(false, "runtime", "must be a positive integer");

        assert!(!v.valid());
        assert_eq!(v.errors().len(), 2);
        assert_eq!(v.errors()["title"], "must be provided");
        assert_eq!(v.errors()["runtime"], "must be a positive integer");
    }

    #[test]
    fn test_finish() {
        assert!(Validator::new().finish().is_ok());

        let mut v = Validator::new();
        v.add_error("email", "must be provided");
        match v.finish() {
            Err(Error::Validation { errors }) => assert_eq!(errors["email"], "must be provided"),
            other => panic!("expected validation error, got {other:?}"),
        }
    }

    #[test]
    fn test_helpers() {
        assert!(permitted_value(&"year", &["id", "year", "-year"]));
        assert!(!permitted_value(&"rating", &["id", "year", "-year"]));

        assert!(unique(&["drama", "comedy"]));
        assert!(!unique(&["drama", "comedy", "drama"]));
        assert!(unique::<String>(&[]));
    }

    #[test]
    fn test_email_shape() {
        for ok in ["alice@example.com", "bob_tester@example.com", "a.b+tag@sub.example.co.uk"] {
            assert!(matches(ok, &EMAIL_RX), "{ok} should be accepted");
        }
        for bad in ["", "@aaaaaz1", "alice", "alice@", "alice@-example.com", "a b@example.com"] {
            assert!(!matches(bad, &EMAIL_RX), "{bad} should be rejected");
        }
    }
}
