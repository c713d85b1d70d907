use thiserror::Error;

/// One rejected form field
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

/// Every field that failed validation, in form order.
#[derive(Error, Debug, Clone, Default, PartialEq, Eq)]
#[error("{}", summarize(.errors))]
pub struct ValidationError {
    errors: Vec<FieldError>,
}

fn summarize(errors: &[FieldError]) -> String {
    errors
        .iter()
        .map(|e| e.message.as_str())
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    pub fn push(&mut self, field: &'static str, message: impl Into<String>) {
        self.errors.push(FieldError {
            field,
            message: message.into(),
        });
    }

    pub fn is_empty(&self) -> bool {
        self.errors.is_empty()
    }

    /// `Ok(())` when nothing was pushed
    pub fn into_result(self) -> Result<(), Self> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(self)
        }
    }

    /// First message recorded for `field`
    pub fn field(&self, field: &str) -> Option<&str> {
        self.errors
            .iter()
            .find(|e| e.field == field)
            .map(|e| e.message.as_str())
    }

    pub fn fields(&self) -> impl Iterator<Item = &FieldError> {
        self.errors.iter()
    }
}

// ============================================================================
// Field checks
// ============================================================================

/// Required, non-blank, at most `max` characters.
pub(crate) fn check_text(
    errors: &mut ValidationError,
    field: &'static str,
    label: &str,
    value: &str,
    max: usize,
) {
    if value.trim().is_empty() {
        errors.push(field, format!("{} is required", label));
    } else if value.chars().count() > max {
        errors.push(field, format!("{} must be at most {} characters", label, max));
    }
}

/// Loose address check: one `@`, non-empty local part, dotted domain, no spaces.
pub fn is_valid_email(email: &str) -> bool {
    if email.chars().any(char::is_whitespace) {
        return false;
    }
    let Some((local, domain)) = email.split_once('@') else {
        return false;
    };
    if local.is_empty() || domain.contains('@') {
        return false;
    }
    let labels: Vec<&str> = domain.split('.').collect();
    labels.len() >= 2 && labels.iter().all(|l| !l.is_empty())
}
