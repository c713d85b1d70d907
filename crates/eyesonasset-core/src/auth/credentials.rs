use std::fmt;

use crate::models::ValidationError;

/// Login identifier and password, held only until submission.
///
/// Never persisted and never printed: `Debug` redacts the password.
#[derive(Clone, PartialEq, Eq)]
pub struct Credentials {
    pub identifier: String,
    pub password: String,
}

impl Credentials {
    pub fn new(identifier: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into().trim().to_string(),
            password: password.into(),
        }
    }

    /// Reject empty fields before any network call
    pub fn validate(&self) -> Result<(), ValidationError> {
        let mut errors = ValidationError::default();
        if self.identifier.trim().is_empty() {
            errors.push("identifier", "Username is required");
        }
        if self.password.is_empty() {
            errors.push("password", "Password is required");
        }
        errors.into_result()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("identifier", &self.identifier)
            .field("password", &"<redacted>")
            .finish()
    }
}
