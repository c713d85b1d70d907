use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::validation::{check_text, is_valid_email, ValidationError};
use super::Identified;

pub const OWNER_NAME_MAX: usize = 140;
pub const OWNER_EMAIL_MAX: usize = 140;
pub const OWNER_PHONE_MAX: usize = 20;

/// A person responsible for one or more assets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Owner {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl Identified for Owner {
    fn id(&self) -> Uuid {
        self.id
    }
}

/// Owner form contents, used for both create and full update.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnerDraft {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl OwnerDraft {
    /// Trimmed copy, as submitted
    pub fn normalized(&self) -> Self {
        Self {
            name: self.name.trim().to_string(),
            email: self.email.trim().to_string(),
            phone: self.phone.trim().to_string(),
        }
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        let draft = self.normalized();
        let mut errors = ValidationError::default();
        check_text(&mut errors, "name", "Name", &draft.name, OWNER_NAME_MAX);
        check_text(&mut errors, "email", "Email", &draft.email, OWNER_EMAIL_MAX);
        if errors.field("email").is_none() && !is_valid_email(&draft.email) {
            errors.push("email", "Email is not a valid address");
        }
        check_text(&mut errors, "phone", "Phone", &draft.phone, OWNER_PHONE_MAX);
        errors.into_result()
    }
}

impl From<&Owner> for OwnerDraft {
    fn from(owner: &Owner) -> Self {
        Self {
            name: owner.name.clone(),
            email: owner.email.clone(),
            phone: owner.phone.clone(),
        }
    }
}

/// Column to sort owners by
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OwnerSortColumn {
    #[default]
    Name,
    Email,
}

impl OwnerSortColumn {
    pub fn toggle(self) -> Self {
        match self {
            OwnerSortColumn::Name => OwnerSortColumn::Email,
            OwnerSortColumn::Email => OwnerSortColumn::Name,
        }
    }

    pub fn sort(self, owners: &mut [&Owner]) {
        match self {
            OwnerSortColumn::Name => {
                owners.sort_by_key(|o| o.name.to_lowercase());
            }
            OwnerSortColumn::Email => {
                owners.sort_by_key(|o| o.email.to_lowercase());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> OwnerDraft {
        OwnerDraft {
            name: "Ana Souza".to_string(),
            email: "ana@example.com".to_string(),
            phone: "+55 11 99999-0000".to_string(),
        }
    }

    #[test]
    fn test_valid_draft() {
        assert!(draft().validate().is_ok());
    }

    #[test]
    fn test_validate_trims_before_checking() {
        let mut d = draft();
        d.email = "  ana@example.com  ".to_string();
        assert!(d.validate().is_ok());
        assert_eq!(d.normalized().email, "ana@example.com");
    }

    #[test]
    fn test_reports_every_bad_field() {
        let d = OwnerDraft {
            name: String::new(),
            email: "not-an-email".to_string(),
            phone: "1".repeat(OWNER_PHONE_MAX + 1),
        };
        let err = d.validate().unwrap_err();
        assert_eq!(err.field("name"), Some("Name is required"));
        assert_eq!(err.field("email"), Some("Email is not a valid address"));
        assert_eq!(err.field("phone"), Some("Phone must be at most 20 characters"));
    }

    #[test]
    fn test_name_length_limit() {
        let mut d = draft();
        d.name = "a".repeat(OWNER_NAME_MAX);
        assert!(d.validate().is_ok());
        d.name.push('a');
        assert!(d.validate().is_err());
    }

    #[test]
    fn test_owner_deserializes_backend_shape() {
        let json = r#"{
            "id": "3f1c2b6e-8a4d-4c1e-9b7a-2d5e6f708192",
            "name": "Ana",
            "email": "ana@example.com",
            "phone": "123"
        }"#;
        let owner: Owner = serde_json::from_str(json).unwrap();
        assert_eq!(owner.name, "Ana");
        assert_eq!(OwnerDraft::from(&owner).phone, "123");
    }

    #[test]
    fn test_sort_by_name_case_insensitive() {
        let a = Owner { id: Uuid::new_v4(), name: "bruno".into(), email: "z@x.io".into(), phone: "1".into() };
        let b = Owner { id: Uuid::new_v4(), name: "Ana".into(), email: "y@x.io".into(), phone: "2".into() };
        let mut list = vec![&a, &b];
        OwnerSortColumn::Name.sort(&mut list);
        assert_eq!(list[0].name, "Ana");
        OwnerSortColumn::Email.sort(&mut list);
        assert_eq!(list[0].name, "Ana");
        assert_eq!(OwnerSortColumn::Name.toggle(), OwnerSortColumn::Email);
    }
}
