//! Person Entity
//!
//! The single entity exposed by the CRUD API. The backing store owns the
//! authoritative record; the cache only ever holds a projection of it.

use serde::{Deserialize, Serialize};

/// A person record.
///
/// `id` is `None` until the backing store assigns one on insert.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Person {
    /// Store-assigned identifier
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<u64>,
    /// First name
    pub name: String,
    /// Last name
    pub surname: String,
}

impl Person {
    /// Creates a person without an id, ready for insertion.
    pub fn new(name: impl Into<String>, surname: impl Into<String>) -> Self {
        Self {
            id: None,
            name: name.into(),
            surname: surname.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_person_new_has_no_id() {
        let person = Person::new("Ada", "Lovelace");
        assert!(person.id.is_none());
        assert_eq!(person.name, "Ada");
        assert_eq!(person.surname, "Lovelace");
    }

    #[test]
    fn test_person_serialize_skips_missing_id() {
        let person = Person::new("Ada", "Lovelace");
        let json = serde_json::to_string(&person).unwrap();
        assert!(!json.contains("id"));
    }

    #[test]
    fn test_person_deserialize_with_id() {
        let json = r#"{"id": 7, "name": "Ada", "surname": "Lovelace"}"#;
        let person: Person = serde_json::from_str(json).unwrap();
        assert_eq!(person.id, Some(7));
    }
}
