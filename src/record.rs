use serde::de::DeserializeOwned;
use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::HashMap;

/// Identifier of a stored record.
pub type Id = String;

/// Anything that exposes a stable, unique identifier.
pub trait Identifiable {
    fn id(&self) -> &str;
}

/// Everything a value needs to be held by a storage backend.
///
/// Implemented automatically for every identifiable, serializable type.
pub trait Record: Identifiable + Clone + Serialize + DeserializeOwned + Send + Sync + 'static {}

impl<T> Record for T where
    T: Identifiable + Clone + Serialize + DeserializeOwned + Send + Sync + 'static
{
}

/// An ordered mapping from identifier to record.
///
/// Records keep the position of their first insertion; replacing a record
/// with the same id updates it in place.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection<T> {
    records: Vec<T>,
    /// Maps record IDs to their index in the records vector
    index: HashMap<Id, usize>,
}

impl<T: Identifiable> Collection<T> {
    /// Create a new empty collection.
    pub fn new() -> Self {
        Self {
            records: Vec::new(),
            index: HashMap::new(),
        }
    }

    /// Insert a record, replacing any record with the same id.
    ///
    /// Returns the replaced record, if there was one.
    pub fn insert(&mut self, record: T) -> Option<T> {
        if let Some(&idx) = self.index.get(record.id()) {
            return Some(std::mem::replace(&mut self.records[idx], record));
        }
        self.index.insert(record.id().to_string(), self.records.len());
        self.records.push(record);
        None
    }

    /// Get a record by its ID.
    pub fn get(&self, id: &str) -> Option<&T> {
        self.index.get(id).map(|&idx| &self.records[idx])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.index.contains_key(id)
    }

    /// Remove a record by its ID, shifting later records down.
    pub fn remove(&mut self, id: &str) -> Option<T> {
        let idx = self.index.remove(id)?;
        let removed = self.records.remove(idx);
        for slot in self.index.values_mut() {
            if *slot > idx {
                *slot -= 1;
            }
        }
        Some(removed)
    }

    pub fn clear(&mut self) {
        self.records.clear();
        self.index.clear();
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, T> {
        self.records.iter()
    }

    /// Consume the collection, yielding records in insertion order.
    pub fn into_records(self) -> Vec<T> {
        self.records
    }
}

impl<T: Identifiable> Default for Collection<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Identifiable> FromIterator<T> for Collection<T> {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        let mut collection = Self::new();
        for record in iter {
            collection.insert(record);
        }
        collection
    }
}

// Written as an object keyed by id, in insertion order.
impl<T: Identifiable + Serialize> Serialize for Collection<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.records.len()))?;
        for record in &self.records {
            map.serialize_entry(record.id(), record)?;
        }
        map.end()
    }
}
