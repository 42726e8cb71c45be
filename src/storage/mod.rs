//! Storage backend abstraction.
//!
//! This module provides a uniform CRUD contract ([`Storage`]) and two
//! interchangeable backends: a volatile in-memory map and a JSON file.

pub mod json;
pub mod memory;
pub mod storage_trait;

// Re-export commonly used types
pub use json::{JsonStorage, parse_collection};
pub use memory::MemoryStorage;
pub use storage_trait::{
    BoxError, Modify, Storage, StorageError, StorageFeature, StorageMetadata, StorageResult,
};

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::Identifiable;
    use serde::{Deserialize, Serialize};
    use std::sync::Arc;

    #[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
    struct Note {
        id: String,
        body: String,
    }

    impl Identifiable for Note {
        fn id(&self) -> &str {
            &self.id
        }
    }

    async fn exercise(storage: Arc<dyn Storage<Note>>) {
        let note = Note {
            id: "n1".to_string(),
            body: "hello".to_string(),
        };

        storage.create(note.clone()).await.unwrap();
        assert_eq!(storage.get_by_id("n1").await.unwrap(), Some(note.clone()));
        assert!(storage.exists("n1").await.unwrap());

        let edited = Note {
            body: "edited".to_string(),
            ..note
        };
        assert_eq!(
            storage.update("n1", edited.clone()).await.unwrap(),
            Some(edited.clone())
        );
        assert_eq!(storage.get_all().await.unwrap(), vec![edited]);

        let shouted = storage
            .update_with(
                "n1",
                Box::new(|note: Note| {
                    Ok(Note {
                        body: note.body.to_uppercase(),
                        ..note
                    })
                }),
            )
            .await
            .unwrap();
        assert_eq!(shouted.map(|n| n.body), Some("EDITED".to_string()));
        let untouched = storage.update_with("missing", Box::new(|note: Note| Ok(note)));
        assert_eq!(untouched.await.unwrap(), None);

        assert!(storage.delete("n1").await.unwrap());
        assert_eq!(storage.count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_storage_backends_interchangeable() {
        let dir = tempfile::tempdir().unwrap();

        exercise(Arc::new(MemoryStorage::<Note>::new())).await;
        exercise(Arc::new(JsonStorage::<Note>::new(dir.path().join("notes.json")))).await;
    }

    #[test]
    fn test_storage_metadata() {
        let json_storage: JsonStorage<Note> = JsonStorage::new("notes.json");
        assert_eq!(json_storage.metadata().name, "json");

        let memory_storage: MemoryStorage<Note> = MemoryStorage::new();
        assert_eq!(memory_storage.metadata().name, "memory");
    }
}
