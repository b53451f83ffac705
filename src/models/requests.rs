//! Request DTOs for the person API
//!
//! Defines the structure of incoming HTTP request bodies.

use serde::Deserialize;

use crate::models::Person;

/// Request body for creating or updating a person.
#[derive(Debug, Clone, Deserialize)]
pub struct PersonPayload {
    /// First name
    pub name: String,
    /// Last name
    pub surname: String,
}

impl PersonPayload {
    /// Converts the payload into a person to insert (no id yet).
    pub fn into_person(self) -> Person {
        Person::new(self.name, self.surname)
    }

    /// Applies the payload on top of an existing person, keeping its id.
    pub fn apply_to(self, person: Person) -> Person {
        Person {
            id: person.id,
            name: self.name,
            surname: self.surname,
        }
    }
}
