//! # contact-store
//!
//! A small persistence layer: a uniform async CRUD contract ([`Storage`])
//! with two interchangeable backends, and a validating contact service built
//! on top of it.
//!
//! - [`MemoryStorage`] keeps records in process memory.
//! - [`JsonStorage`] keeps them in a single JSON file, re-read on every call
//!   and replaced atomically on every mutation.
//!
//! ## Example
//!
//! ```rust
//! use contact_store::{contact_service, CreateContact, StorageConfig, UpdateContact};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> anyhow::Result<()> {
//! let dir = tempfile::tempdir()?;
//! let service = contact_service(&StorageConfig::json(dir.path().join("contacts.json")));
//!
//! let john = service
//!     .create(CreateContact {
//!         first_name: "John".to_string(),
//!         last_name: "Doe".to_string(),
//!         email: "john.doe@example.com".to_string(),
//!         phone: "555-555-5555".to_string(),
//!         account_id: None,
//!     })
//!     .await?;
//!
//! let update = UpdateContact {
//!     email: Some("jd@example.org".to_string()),
//!     ..Default::default()
//! };
//! let updated = service.update(&john.id, update).await?.unwrap();
//! assert_eq!(updated.full_name(), "John Doe");
//! assert_eq!(service.count().await?, 1);
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod contact;
pub mod logging;
pub mod record;
pub mod repository;
pub mod storage;

pub use config::{BackendConfig, StorageConfig};
pub use contact::validation::ValidationError;
pub use contact::{
    Contact, ContactError, ContactRepository, ContactResult, ContactService, CreateContact,
    UpdateContact, UpsertContact,
};
pub use record::{Collection, Id, Identifiable, Record};
pub use repository::Repository;
pub use storage::{
    BoxError, JsonStorage, MemoryStorage, Modify, Storage, StorageError, StorageFeature,
    StorageMetadata, StorageResult,
};

/// Open the configured backend and wrap it in a [`ContactService`].
pub fn contact_service(config: &StorageConfig) -> ContactService {
    ContactService::new(ContactRepository::new(config.open::<Contact>()))
}
