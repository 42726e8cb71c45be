use super::Contact;
use crate::record::Id;
use serde::{Deserialize, Serialize};

const MAX_NAME_LEN: usize = 100;
const MIN_PHONE_DIGITS: usize = 7;
const MAX_PHONE_DIGITS: usize = 15;

/// A field that failed validation.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Invalid {field}: {message}")]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

pub type ValidationResult<T> = std::result::Result<T, ValidationError>;

/// Input for creating a contact. The id is always generated.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateContact {
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default)]
    pub account_id: Option<String>,
}

/// Partial input for updating a contact; absent fields keep their value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateContact {
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
    #[serde(default)]
    pub email: Option<String>,
    #[serde(default)]
    pub phone: Option<String>,
    #[serde(default)]
    pub account_id: Option<String>,
}

/// Input for creating or replacing a contact, optionally under a known id.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpsertContact {
    #[serde(default)]
    pub id: Option<Id>,
    #[serde(flatten)]
    pub contact: CreateContact,
}

impl CreateContact {
    pub fn validate(&self) -> ValidationResult<()> {
        validate_name("firstName", &self.first_name)?;
        validate_name("lastName", &self.last_name)?;
        validate_email(&self.email)?;
        validate_phone(&self.phone)?;
        if let Some(account_id) = &self.account_id {
            validate_account_id(account_id)?;
        }
        Ok(())
    }

    /// Build a contact under the given id.
    pub(crate) fn into_contact(self, id: Id) -> Contact {
        Contact {
            id,
            first_name: self.first_name,
            last_name: self.last_name,
            email: self.email,
            phone: self.phone,
            account_id: self.account_id,
        }
    }
}

impl UpdateContact {
    pub fn is_empty(&self) -> bool {
        self.first_name.is_none()
            && self.last_name.is_none()
            && self.email.is_none()
            && self.phone.is_none()
            && self.account_id.is_none()
    }

    /// Apply the present fields over `contact`.
    pub fn merge_into(self, mut contact: Contact) -> Contact {
        if let Some(first_name) = self.first_name {
            contact.first_name = first_name;
        }
        if let Some(last_name) = self.last_name {
            contact.last_name = last_name;
        }
        if let Some(email) = self.email {
            contact.email = email;
        }
        if let Some(phone) = self.phone {
            contact.phone = phone;
        }
        if let Some(account_id) = self.account_id {
            contact.account_id = Some(account_id);
        }
        contact
    }
}

/// Check every field of a complete contact.
pub fn validate_contact(contact: &Contact) -> ValidationResult<()> {
    if contact.id.trim().is_empty() {
        return Err(ValidationError::new("id", "must not be blank"));
    }
    validate_name("firstName", &contact.first_name)?;
    validate_name("lastName", &contact.last_name)?;
    validate_email(&contact.email)?;
    validate_phone(&contact.phone)?;
    if let Some(account_id) = &contact.account_id {
        validate_account_id(account_id)?;
    }
    Ok(())
}

fn validate_name(field: &'static str, value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::new(field, "must not be blank"));
    }
    if value.chars().count() > MAX_NAME_LEN {
        return Err(ValidationError::new(
            field,
            format!("must be at most {} characters", MAX_NAME_LEN),
        ));
    }
    Ok(())
}

fn validate_email(value: &str) -> ValidationResult<()> {
    let invalid = || ValidationError::new("email", format!("'{}' is not an email address", value));

    let (local, domain) = value.split_once('@').ok_or_else(invalid)?;
    if local.is_empty() || domain.contains('@') || value.chars().any(char::is_whitespace) {
        return Err(invalid());
    }
    if !domain.contains('.') || domain.starts_with('.') || domain.ends_with('.') {
        return Err(invalid());
    }
    Ok(())
}

fn validate_phone(value: &str) -> ValidationResult<()> {
    if let Some(c) = value
        .chars()
        .find(|c| !c.is_ascii_digit() && !matches!(c, ' ' | '+' | '-' | '(' | ')' | '.'))
    {
        return Err(ValidationError::new(
            "phone",
            format!("unexpected character '{}'", c),
        ));
    }

    let digits = value.chars().filter(char::is_ascii_digit).count();
    if !(MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits) {
        return Err(ValidationError::new(
            "phone",
            format!(
                "must contain {} to {} digits, found {}",
                MIN_PHONE_DIGITS, MAX_PHONE_DIGITS, digits
            ),
        ));
    }
    Ok(())
}

fn validate_account_id(value: &str) -> ValidationResult<()> {
    if value.trim().is_empty() {
        return Err(ValidationError::new("accountId", "must not be blank"));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn valid_input() -> CreateContact {
        CreateContact {
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            email: "john.doe@example.com".to_string(),
            phone: "555-555-5555".to_string(),
            account_id: None,
        }
    }

    #[test]
    fn test_valid_input() {
        assert_eq!(valid_input().validate(), Ok(()));

        let with_account = CreateContact {
            account_id: Some("acc-1".to_string()),
            phone: "+1 (555) 555.5555".to_string(),
            ..valid_input()
        };
        assert_eq!(with_account.validate(), Ok(()));
    }

    #[test]
    fn test_blank_names() {
        let input = CreateContact {
            first_name: "   ".to_string(),
            ..valid_input()
        };
        assert_eq!(input.validate().unwrap_err().field, "firstName");

        let input = CreateContact {
            last_name: "x".repeat(MAX_NAME_LEN + 1),
            ..valid_input()
        };
        assert_eq!(input.validate().unwrap_err().field, "lastName");
    }

    #[test]
    fn test_emails() {
        for email in ["plain", "@example.com", "a@b@c.com", "a@example", "a@.com", "a@com.", "a b@c.com"] {
            let input = CreateContact {
                email: email.to_string(),
                ..valid_input()
            };
            assert_eq!(input.validate().unwrap_err().field, "email", "{}", email);
        }
    }

    #[test]
    fn test_phones() {
        for phone in ["555", "555-555-555x", "1234567890123456"] {
            let input = CreateContact {
                phone: phone.to_string(),
                ..valid_input()
            };
            assert_eq!(input.validate().unwrap_err().field, "phone", "{}", phone);
        }
    }

    #[test]
    fn test_blank_account_id() {
        let input = CreateContact {
            account_id: Some(" ".to_string()),
            ..valid_input()
        };
        assert_eq!(input.validate().unwrap_err().field, "accountId");
    }

    #[test]
    fn test_merge_keeps_absent_fields() {
        let contact = valid_input().into_contact("1".to_string());
        let merged = UpdateContact {
            email: Some("jd@example.org".to_string()),
            ..Default::default()
        }
        .merge_into(contact.clone());

        assert_eq!(merged.email, "jd@example.org");
        assert_eq!(merged.first_name, contact.first_name);
        assert_eq!(merged.id, "1");
    }

    #[test]
    fn test_validate_contact_rejects_blank_id() {
        let contact = valid_input().into_contact(" ".to_string());
        assert_eq!(validate_contact(&contact).unwrap_err().field, "id");
    }

    #[test]
    fn test_upsert_input_deserializes_flat() {
        let input: UpsertContact = serde_json::from_value(json!({
            "id": "42",
            "firstName": "John",
            "lastName": "Doe",
            "email": "john.doe@example.com",
            "phone": "555-555-5555"
        }))
        .unwrap();

        assert_eq!(input.id.as_deref(), Some("42"));
        assert_eq!(input.contact, valid_input());
    }

    #[test]
    fn test_update_is_empty() {
        assert!(UpdateContact::default().is_empty());
        let update = UpdateContact {
            phone: Some("5555555".to_string()),
            ..Default::default()
        };
        assert!(!update.is_empty());
    }
}
