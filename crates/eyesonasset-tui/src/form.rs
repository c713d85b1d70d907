//! Editable form state shared by the login, register, owner and asset forms.

use uuid::Uuid;

use eyesonasset_core::models::asset::{ASSET_CATEGORY_MAX, ASSET_NAME_MAX};
use eyesonasset_core::models::owner::{OWNER_EMAIL_MAX, OWNER_NAME_MAX, OWNER_PHONE_MAX};
use eyesonasset_core::models::{Asset, AssetDraft, Owner, OwnerDraft, ValidationError};

/// Maximum length for username input.
const MAX_USERNAME_LENGTH: usize = 50;

/// Maximum length for password input.
/// 128 chars accommodates password managers and passphrases.
const MAX_PASSWORD_LENGTH: usize = 128;

/// Check if a character is valid for input (no control characters)
fn is_valid_input_char(c: char) -> bool {
    !c.is_control()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldKind {
    Text,
    /// Rendered as dots
    Secret,
    /// Picks one of the loaded owners; holds the owner id
    OwnerChoice,
}

#[derive(Debug, Clone)]
pub struct FormField {
    pub key: &'static str,
    pub label: &'static str,
    pub value: String,
    pub max_len: usize,
    pub kind: FieldKind,
}

impl FormField {
    fn new(key: &'static str, label: &'static str, max_len: usize, kind: FieldKind) -> Self {
        Self {
            key,
            label,
            value: String::new(),
            max_len,
            kind,
        }
    }

    fn with_value(mut self, value: impl Into<String>) -> Self {
        self.value = value.into();
        self
    }

    /// Accept a typed character if it fits
    pub fn push_char(&mut self, c: char) -> bool {
        if self.kind == FieldKind::OwnerChoice {
            return false;
        }
        if self.value.chars().count() < self.max_len && is_valid_input_char(c) {
            self.value.push(c);
            true
        } else {
            false
        }
    }

    pub fn backspace(&mut self) {
        if self.kind != FieldKind::OwnerChoice {
            self.value.pop();
        }
    }
}

#[derive(Debug, Clone)]
pub struct Form {
    pub fields: Vec<FormField>,
    pub focus: usize,
    /// Id of the record being edited; `None` when creating
    pub editing: Option<Uuid>,
    pub errors: Option<ValidationError>,
    /// Non-field error (e.g. from the backend)
    pub message: Option<String>,
}

impl Form {
    fn new(fields: Vec<FormField>) -> Self {
        Self {
            fields,
            focus: 0,
            editing: None,
            errors: None,
            message: None,
        }
    }

    pub fn login(identifier: &str) -> Self {
        let mut form = Self::new(vec![
            FormField::new("identifier", "Username", MAX_USERNAME_LENGTH, FieldKind::Text)
                .with_value(identifier),
            FormField::new("password", "Password", MAX_PASSWORD_LENGTH, FieldKind::Secret),
        ]);
        if !identifier.is_empty() {
            form.focus = 1;
        }
        form
    }

    pub fn owner(existing: Option<&Owner>) -> Self {
        let draft = existing.map(OwnerDraft::from).unwrap_or_default();
        let mut form = Self::new(vec![
            FormField::new("name", "Name", OWNER_NAME_MAX, FieldKind::Text).with_value(draft.name),
            FormField::new("email", "Email", OWNER_EMAIL_MAX, FieldKind::Text).with_value(draft.email),
            FormField::new("phone", "Phone", OWNER_PHONE_MAX, FieldKind::Text).with_value(draft.phone),
        ]);
        form.editing = existing.map(|o| o.id);
        form
    }

    pub fn asset(existing: Option<&Asset>, owners: &[&Owner]) -> Self {
        let mut draft = existing.map(AssetDraft::from).unwrap_or_default();
        if draft.owner_id.is_empty() {
            if let Some(first) = owners.first() {
                draft.owner_id = first.id.to_string();
            }
        }
        let mut form = Self::new(vec![
            FormField::new("name", "Name", ASSET_NAME_MAX, FieldKind::Text).with_value(draft.name),
            FormField::new("category", "Category", ASSET_CATEGORY_MAX, FieldKind::Text)
                .with_value(draft.category),
            FormField::new("owner_id", "Owner", 36, FieldKind::OwnerChoice).with_value(draft.owner_id),
        ]);
        form.editing = existing.map(|a| a.id);
        form
    }

    pub fn value(&self, key: &str) -> &str {
        self.fields
            .iter()
            .find(|f| f.key == key)
            .map(|f| f.value.as_str())
            .unwrap_or_default()
    }

    pub fn focused_mut(&mut self) -> Option<&mut FormField> {
        self.fields.get_mut(self.focus)
    }

    pub fn focused(&self) -> Option<&FormField> {
        self.fields.get(self.focus)
    }

    pub fn focus_next(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + 1) % self.fields.len();
        }
    }

    pub fn focus_prev(&mut self) {
        if !self.fields.is_empty() {
            self.focus = (self.focus + self.fields.len() - 1) % self.fields.len();
        }
    }

    pub fn is_last_field(&self) -> bool {
        self.focus + 1 >= self.fields.len()
    }

    /// Move the owner choice one step through `owners`
    pub fn cycle_owner(&mut self, owners: &[&Owner], forward: bool) {
        let Some(field) = self.fields.iter_mut().find(|f| f.kind == FieldKind::OwnerChoice) else {
            return;
        };
        if owners.is_empty() {
            return;
        }
        let current = owners.iter().position(|o| o.id.to_string() == field.value);
        let next = match (current, forward) {
            (None, _) => 0,
            (Some(i), true) => (i + 1) % owners.len(),
            (Some(i), false) => (i + owners.len() - 1) % owners.len(),
        };
        field.value = owners[next].id.to_string();
    }

    pub fn owner_draft(&self) -> OwnerDraft {
        OwnerDraft {
            name: self.value("name").to_string(),
            email: self.value("email").to_string(),
            phone: self.value("phone").to_string(),
        }
    }

    pub fn asset_draft(&self) -> AssetDraft {
        AssetDraft {
            name: self.value("name").to_string(),
            category: self.value("category").to_string(),
            owner_id: self.value("owner_id").to_string(),
        }
    }

    pub fn field_error(&self, key: &str) -> Option<&str> {
        self.errors.as_ref().and_then(|e| e.field(key))
    }

    pub fn clear_feedback(&mut self) {
        self.errors = None;
        self.message = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner(name: &str) -> Owner {
        Owner {
            id: Uuid::new_v4(),
            name: name.to_string(),
            email: "o@example.com".to_string(),
            phone: "1".to_string(),
        }
    }

    #[test]
    fn test_login_form_focuses_password_when_prefilled() {
        assert_eq!(Form::login("").focus, 0);
        let form = Form::login("eyesonasset");
        assert_eq!(form.focus, 1);
        assert_eq!(form.value("identifier"), "eyesonasset");
    }

    #[test]
    fn test_push_char_limits() {
        let mut form = Form::login("");
        let field = form.focused_mut().unwrap();
        for _ in 0..MAX_USERNAME_LENGTH {
            assert!(field.push_char('a'));
        }
        assert!(!field.push_char('a'));
        assert!(!field.push_char('\n'));
        assert_eq!(field.value.len(), MAX_USERNAME_LENGTH);
    }

    #[test]
    fn test_control_chars_rejected() {
        let mut form = Form::login("");
        form.focus = 1;
        let field = form.focused_mut().unwrap();
        assert!(!field.push_char('\x00'));
        assert!(!field.push_char('\r'));
        assert!(field.push_char('!'));
    }

    #[test]
    fn test_focus_wraps() {
        let mut form = Form::owner(None);
        form.focus_prev();
        assert_eq!(form.focus, 2);
        assert!(form.is_last_field());
        form.focus_next();
        assert_eq!(form.focus, 0);
    }

    #[test]
    fn test_owner_form_prefills_from_existing() {
        let o = owner("Ana");
        let form = Form::owner(Some(&o));
        assert_eq!(form.editing, Some(o.id));
        assert_eq!(form.owner_draft(), OwnerDraft::from(&o));
    }

    #[test]
    fn test_asset_form_cycles_owners() {
        let a = owner("Ana");
        let b = owner("Bruno");
        let owners = vec![&a, &b];
        let mut form = Form::asset(None, &owners);
        assert_eq!(form.value("owner_id"), a.id.to_string());

        form.cycle_owner(&owners, true);
        assert_eq!(form.value("owner_id"), b.id.to_string());
        form.cycle_owner(&owners, true);
        assert_eq!(form.value("owner_id"), a.id.to_string());
        form.cycle_owner(&owners, false);
        assert_eq!(form.value("owner_id"), b.id.to_string());
    }

    #[test]
    fn test_owner_choice_ignores_typing() {
        let a = owner("Ana");
        let mut form = Form::asset(None, &[&a]);
        form.focus = 2;
        assert!(!form.focused_mut().unwrap().push_char('x'));
        form.focused_mut().unwrap().backspace();
        assert_eq!(form.value("owner_id"), a.id.to_string());
    }
}
