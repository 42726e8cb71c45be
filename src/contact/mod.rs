//! The contact domain: record type, input validation and service.

pub mod service;
pub mod validation;

use crate::record::{Id, Identifiable};
use crate::repository::Repository;
use serde::{Deserialize, Serialize};

pub use service::{ContactError, ContactResult, ContactService};
pub use validation::{CreateContact, UpdateContact, UpsertContact};

/// Repository specialized for contacts.
pub type ContactRepository = Repository<Contact>;

/// A person in the address book.
///
/// Serialized in camelCase (`firstName`, `accountId`, ...).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Contact {
    pub id: Id,
    pub first_name: String,
    pub last_name: String,
    pub email: String,
    pub phone: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub account_id: Option<String>,
}

impl Contact {
    /// Create a contact with a freshly generated id.
    pub fn new(
        first_name: impl Into<String>,
        last_name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            first_name: first_name.into(),
            last_name: last_name.into(),
            email: email.into(),
            phone: phone.into(),
            account_id: None,
        }
    }

    /// Attach the contact to an account.
    pub fn with_account(mut self, account_id: impl Into<String>) -> Self {
        self.account_id = Some(account_id.into());
        self
    }

    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

impl Identifiable for Contact {
    fn id(&self) -> &str {
        &self.id
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn john() -> Contact {
        Contact {
            id: "1".to_string(),
            first_name: "John".to_string(),
            last_name: "Doe".to_string(),
            email: "john.doe@example.com".to_string(),
            phone: "555-555-5555".to_string(),
            account_id: None,
        }
    }

    #[test]
    fn test_full_name() {
        assert_eq!(john().full_name(), "John Doe");
    }

    #[test]
    fn test_new_generates_unique_ids() {
        let a = Contact::new("A", "B", "a@b.io", "5555555");
        let b = Contact::new("A", "B", "a@b.io", "5555555");
        assert_ne!(a.id, b.id);
        assert!(uuid::Uuid::parse_str(&a.id).is_ok());
        assert_eq!(a.account_id, None);
    }

    #[test]
    fn test_serializes_camel_case() {
        let value = serde_json::to_value(john().with_account("acc-1")).unwrap();
        assert_eq!(
            value,
            json!({
                "id": "1",
                "firstName": "John",
                "lastName": "Doe",
                "email": "john.doe@example.com",
                "phone": "555-555-5555",
                "accountId": "acc-1"
            })
        );
    }

    #[test]
    fn test_account_id_is_optional_on_read() {
        let contact: Contact = serde_json::from_value(json!({
            "id": "1",
            "firstName": "John",
            "lastName": "Doe",
            "email": "john.doe@example.com",
            "phone": "555-555-5555"
        }))
        .unwrap();
        assert_eq!(contact, john());
    }
}
