use super::validation::{
    CreateContact, UpdateContact, UpsertContact, ValidationError, validate_contact,
};
use super::{Contact, ContactRepository};
use crate::storage::{Modify, StorageError};

pub type ContactResult<T> = std::result::Result<T, ContactError>;

#[derive(Debug, thiserror::Error)]
pub enum ContactError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
}

/// Validating front door for contacts.
///
/// Inputs are checked before they reach the repository; reads and removals
/// pass straight through.
#[derive(Clone)]
pub struct ContactService {
    repository: ContactRepository,
}

impl ContactService {
    pub fn new(repository: ContactRepository) -> Self {
        Self { repository }
    }

    pub async fn get_all(&self) -> ContactResult<Vec<Contact>> {
        Ok(self.repository.get_all().await?)
    }

    pub async fn get_by_id(&self, id: &str) -> ContactResult<Option<Contact>> {
        Ok(self.repository.get_by_id(id).await?)
    }

    /// Validate `input` and store it under a new id.
    pub async fn create(&self, input: CreateContact) -> ContactResult<Contact> {
        input.validate()?;
        let contact = input.into_contact(uuid::Uuid::new_v4().to_string());
        Ok(self.repository.create(contact).await?)
    }

    /// Merge `input` over the stored contact and save the result.
    ///
    /// The merge runs inside the backend's update cycle, so concurrent partial
    /// updates of different fields all survive. Returns `None` when no contact
    /// has `id`; nothing is written then.
    pub async fn update(&self, id: &str, input: UpdateContact) -> ContactResult<Option<Contact>> {
        if input.is_empty() {
            return Ok(self.repository.get_by_id(id).await?);
        }

        let merge: Modify<Contact> = Box::new(move |current| {
            let merged = input.merge_into(current);
            validate_contact(&merged)?;
            Ok(merged)
        });
        match self.repository.update_with(id, merge).await {
            Ok(updated) => Ok(updated),
            Err(StorageError::Rejected(err)) => match err.downcast::<ValidationError>() {
                Ok(invalid) => Err(ContactError::Validation(*invalid)),
                Err(err) => Err(StorageError::Rejected(err).into()),
            },
            Err(err) => Err(err.into()),
        }
    }

    /// Validate `input` and store it, replacing any contact with the same id.
    ///
    /// Without an id a new one is generated.
    pub async fn upsert(&self, input: UpsertContact) -> ContactResult<Contact> {
        input.contact.validate()?;
        let id = match input.id {
            Some(id) if !id.trim().is_empty() => id,
            Some(_) => {
                return Err(ContactError::Validation(ValidationError {
                    field: "id",
                    message: "must not be blank".to_string(),
                }));
            }
            None => uuid::Uuid::new_v4().to_string(),
        };
        let contact = input.contact.into_contact(id);
        Ok(self.repository.upsert(contact).await?)
    }

    pub async fn delete(&self, id: &str) -> ContactResult<bool> {
        Ok(self.repository.delete(id).await?)
    }

    pub async fn clear(&self) -> ContactResult<()> {
        Ok(self.repository.clear().await?)
    }

    pub async fn exists(&self, id: &str) -> ContactResult<bool> {
        Ok(self.repository.exists(id).await?)
    }

    pub async fn count(&self) -> ContactResult<usize> {
        Ok(self.repository.count().await?)
    }
}
