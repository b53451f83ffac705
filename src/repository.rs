//! Person Repository
//!
//! The backing-store interface the service depends on, plus an in-memory
//! implementation standing in for the relational store. The store owns the
//! authoritative records and assigns ids.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::error::{StoreError, StoreResult};
use crate::models::Person;

// == Repository Port ==
/// Contract for person persistence. Assumed durable and strongly
/// consistent.
#[async_trait]
pub trait PersonRepository: Send + Sync {
    /// Fetches a person by id.
    async fn find_by_id(&self, id: u64) -> StoreResult<Person>;

    /// Inserts or updates a person; assigns an id when absent. Returns the
    /// saved record.
    async fn save(&self, person: Person) -> StoreResult<Person>;

    /// Removes a person by id.
    async fn delete_by_id(&self, id: u64) -> StoreResult<()>;

    /// Lists all persons ordered by id.
    async fn find_all(&self) -> StoreResult<Vec<Person>>;
}

// == In-Memory Implementation ==
/// BTreeMap-backed repository keeping the demo self-contained.
#[derive(Debug)]
pub struct InMemoryPersonStore {
    rows: RwLock<BTreeMap<u64, Person>>,
    next_id: AtomicU64,
}

impl InMemoryPersonStore {
    pub fn new() -> Self {
        Self {
            rows: RwLock::new(BTreeMap::new()),
            next_id: AtomicU64::new(1),
        }
    }
}

impl Default for InMemoryPersonStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PersonRepository for InMemoryPersonStore {
    async fn find_by_id(&self, id: u64) -> StoreResult<Person> {
        self.rows
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(StoreError::NotFound(id))
    }

    async fn save(&self, mut person: Person) -> StoreResult<Person> {
        let id = match person.id {
            Some(id) => {
                // Keep the sequence ahead of explicitly-supplied ids.
                self.next_id.fetch_max(id + 1, Ordering::SeqCst);
                id
            }
            None => self.next_id.fetch_add(1, Ordering::SeqCst),
        };
        person.id = Some(id);

        self.rows.write().await.insert(id, person.clone());
        Ok(person)
    }

    async fn delete_by_id(&self, id: u64) -> StoreResult<()> {
        match self.rows.write().await.remove(&id) {
            Some(_) => Ok(()),
            None => Err(StoreError::NotFound(id)),
        }
    }

    async fn find_all(&self) -> StoreResult<Vec<Person>> {
        Ok(self.rows.read().await.values().cloned().collect())
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_assigns_sequential_ids() {
        let store = InMemoryPersonStore::new();

        let first = store.save(Person::new("Ada", "Lovelace")).await.unwrap();
        let second = store.save(Person::new("Grace", "Hopper")).await.unwrap();

        assert_eq!(first.id, Some(1));
        assert_eq!(second.id, Some(2));
    }

    #[tokio::test]
    async fn test_save_with_id_updates_in_place() {
        let store = InMemoryPersonStore::new();
        let saved = store.save(Person::new("Ada", "Lovelace")).await.unwrap();

        let mut updated = saved.clone();
        updated.name = "Augusta".to_string();
        store.save(updated).await.unwrap();

        let fetched = store.find_by_id(saved.id.unwrap()).await.unwrap();
        assert_eq!(fetched.name, "Augusta");
        assert_eq!(store.find_all().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_sequence_skips_explicit_ids() {
        let store = InMemoryPersonStore::new();

        let explicit = Person {
            id: Some(10),
            name: "Ada".to_string(),
            surname: "Lovelace".to_string(),
        };
        store.save(explicit).await.unwrap();

        let next = store.save(Person::new("Grace", "Hopper")).await.unwrap();
        assert_eq!(next.id, Some(11));
    }

    #[tokio::test]
    async fn test_find_missing_is_not_found() {
        let store = InMemoryPersonStore::new();

        let result = store.find_by_id(42).await;
        assert!(matches!(result, Err(StoreError::NotFound(42))));
    }

    #[tokio::test]
    async fn test_delete_then_find_is_not_found() {
        let store = InMemoryPersonStore::new();
        let saved = store.save(Person::new("Ada", "Lovelace")).await.unwrap();
        let id = saved.id.unwrap();

        store.delete_by_id(id).await.unwrap();

        assert!(matches!(store.find_by_id(id).await, Err(StoreError::NotFound(_))));
        assert!(matches!(store.delete_by_id(id).await, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_find_all_ordered_by_id() {
        let store = InMemoryPersonStore::new();
        store.save(Person::new("Ada", "Lovelace")).await.unwrap();
        store.save(Person::new("Grace", "Hopper")).await.unwrap();

        let all = store.find_all().await.unwrap();
        assert_eq!(all.len(), 2);
        assert!(all[0].id < all[1].id);
    }
}
