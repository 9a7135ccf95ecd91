// Copyright 2025 Cowboy AI, LLC.

//! Pets, pet types and visits
//!
//! A Pet only exists inside its owner's aggregate. It holds no reference
//! back to the owner.

use crate::age::{age_in_years, today};
use crate::entity::{Persistable, RecordId};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Kind of animal (dog, cat, ...). Immutable reference data.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PetType {
    /// Persisted identity
    pub id: RecordId<PetType>,
    /// Display name
    pub name: String,
}

impl PetType {
    /// Create a pet type
    pub fn new(id: i32, name: impl Into<String>) -> Self {
        Self {
            id: RecordId::new(id),
            name: name.into(),
        }
    }
}

/// A visit to the clinic
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Visit {
    /// Persisted identity
    pub id: Option<RecordId<Visit>>,
    /// Day of the visit
    pub date: NaiveDate,
    /// What was done
    pub description: String,
}

impl Visit {
    /// Create a new, unsaved visit
    pub fn new(date: NaiveDate, description: impl Into<String>) -> Self {
        Self {
            id: None,
            date,
            description: description.into(),
        }
    }
}

impl Persistable for Visit {
    type Marker = Visit;

    fn id(&self) -> Option<RecordId<Visit>> {
        self.id
    }
}

/// A pet belonging to exactly one owner
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pet {
    /// Persisted identity; `None` while the pet is new
    pub id: Option<RecordId<Pet>>,
    /// Name, unique per owner ignoring case
    pub name: Option<String>,
    /// Birth date
    pub birth_date: Option<NaiveDate>,
    /// Kind of animal
    #[serde(rename = "type")]
    pub pet_type: Option<PetType>,
    /// Visit history in insertion order
    #[serde(default)]
    pub visits: Vec<Visit>,
}

impl Pet {
    /// Create an empty, unsaved pet
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an unsaved pet with the given name
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    /// Set the ID
    pub fn with_id(mut self, id: i32) -> Self {
        self.id = Some(RecordId::new(id));
        self
    }

    /// Set the birth date
    pub fn with_birth_date(mut self, birth_date: NaiveDate) -> Self {
        self.birth_date = Some(birth_date);
        self
    }

    /// Set the pet type
    pub fn with_type(mut self, pet_type: PetType) -> Self {
        self.pet_type = Some(pet_type);
        self
    }

    /// Whether the name matches `name` ignoring case
    pub fn has_name(&self, name: &str) -> bool {
        self.name
            .as_deref()
            .is_some_and(|own| own.to_lowercase() == name.to_lowercase())
    }

    /// Age in whole years as of `today`
    pub fn age_on(&self, today: NaiveDate) -> u32 {
        age_in_years(self.birth_date, today)
    }

    /// Age in whole years as of the local date
    pub fn age(&self) -> u32 {
        self.age_on(today())
    }

    /// Record a visit
    pub fn add_visit(&mut self, visit: Visit) {
        self.visits.push(visit);
    }
}

impl Persistable for Pet {
    type Marker = Pet;

    fn id(&self) -> Option<RecordId<Pet>> {
        self.id
    }
}
