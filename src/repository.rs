// Copyright 2025 Cowboy AI, LLC.

//! Persistence collaborator for owners and pet types
//!
//! The core never persists anything itself. Services talk to an
//! [`OwnerRepository`], which stores whole owner aggregates and assigns IDs
//! to new owners, pets and visits on save. The in-memory implementations
//! here back the tests and any embedding that has no database.

use crate::entity::{Persistable, RecordId};
use crate::owner::Owner;
use crate::pet::{Pet, PetType, Visit};
use crate::validation::{ValidationFailure, ValidationFailures};
use serde::ser::SerializeStruct;
use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};
use thiserror::Error;

/// Failures of the persistence collaborator
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RepositoryError {
    /// The store's lock was poisoned by a panicking writer
    #[error("storage lock poisoned: {0}")]
    LockPoisoned(String),

    /// No more IDs can be assigned
    #[error("identity space exhausted for {0}")]
    IdsExhausted(&'static str),

    /// The backing store refused the operation
    #[error("storage unavailable: {0}")]
    Unavailable(String),
}

/// A zero-based page request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct PageRequest {
    page: usize,
    size: usize,
}

impl PageRequest {
    /// Validate raw paging parameters
    ///
    /// `page` must be at least 0 and `size` at least 1. Both are checked and
    /// every problem is reported.
    pub fn new(page: i64, size: i64) -> Result<Self, ValidationFailures> {
        let mut failures = ValidationFailures::new();
        if page < 0 {
            failures.push(
                ValidationFailure::new("page", "min", "must be greater than or equal to 0")
                    .rejecting(page),
            );
        }
        if size < 1 {
            failures.push(
                ValidationFailure::new("size", "min", "must be greater than or equal to 1")
                    .rejecting(size),
            );
        }
        if !failures.is_empty() {
            return Err(failures);
        }

        let page = usize::try_from(page).unwrap_or(0);
        let size = usize::try_from(size).unwrap_or(1);
        Ok(Self { page, size })
    }

    /// First page of the given size; a size of 0 is raised to 1
    pub fn first(size: usize) -> Self {
        Self {
            page: 0,
            size: size.max(1),
        }
    }

    /// Zero-based page number
    pub fn page(&self) -> usize {
        self.page
    }

    /// Page size
    pub fn size(&self) -> usize {
        self.size
    }

    /// Number of elements before this page
    pub fn offset(&self) -> usize {
        self.page.saturating_mul(self.size)
    }

    /// Slice one page out of an already ordered result set
    pub fn slice<T>(&self, all: Vec<T>) -> Page<T> {
        let total_elements = all.len();
        let content = all.into_iter().skip(self.offset()).take(self.size).collect();
        Page::new(content, *self, total_elements)
    }
}

/// One page of a larger result set
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Page<T> {
    /// Elements on this page
    pub content: Vec<T>,
    /// Zero-based page number
    pub number: usize,
    /// Requested page size
    pub size: usize,
    /// Elements across all pages
    pub total_elements: usize,
}

impl<T> Page<T> {
    /// Wrap page content
    pub fn new(content: Vec<T>, request: PageRequest, total_elements: usize) -> Self {
        Self {
            content,
            number: request.page(),
            size: request.size(),
            total_elements,
        }
    }

    /// Number of pages; 0 for an empty result set
    pub fn total_pages(&self) -> usize {
        if self.size == 0 {
            return 1;
        }
        self.total_elements.div_ceil(self.size)
    }

    /// Whether this is the first page
    pub fn is_first(&self) -> bool {
        self.number == 0
    }

    /// Whether no page follows this one
    pub fn is_last(&self) -> bool {
        self.number + 1 >= self.total_pages()
    }

    /// Elements on this page
    pub fn number_of_elements(&self) -> usize {
        self.content.len()
    }

    /// Whether a later page exists
    pub fn has_next(&self) -> bool {
        !self.is_last()
    }

    /// Map the content to a different type
    pub fn map<U, F>(self, f: F) -> Page<U>
    where
        F: FnMut(T) -> U,
    {
        Page {
            content: self.content.into_iter().map(f).collect(),
            number: self.number,
            size: self.size,
            total_elements: self.total_elements,
        }
    }
}

impl<T: Serialize> Serialize for Page<T> {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut page = serializer.serialize_struct("Page", 8)?;
        page.serialize_field("content", &self.content)?;
        page.serialize_field("number", &self.number)?;
        page.serialize_field("size", &self.size)?;
        page.serialize_field("totalElements", &self.total_elements)?;
        page.serialize_field("totalPages", &self.total_pages())?;
        page.serialize_field("first", &self.is_first())?;
        page.serialize_field("last", &self.is_last())?;
        page.serialize_field("numberOfElements", &self.number_of_elements())?;
        page.end()
    }
}

/// Storage of owner aggregates
#[cfg_attr(test, mockall::automock)]
pub trait OwnerRepository: Send + Sync {
    /// Load an owner with its pets and visits
    fn find_by_id(&self, id: RecordId<Owner>) -> Result<Option<Owner>, RepositoryError>;

    /// Whether an owner with this ID exists
    fn exists_by_id(&self, id: RecordId<Owner>) -> Result<bool, RepositoryError>;

    /// Store an owner, assigning IDs to anything new, and return what was stored
    fn save(&self, owner: Owner) -> Result<Owner, RepositoryError>;

    /// Remove an owner and everything it holds
    fn delete_by_id(&self, id: RecordId<Owner>) -> Result<(), RepositoryError>;

    /// Owners whose last name starts with `prefix`, ordered by ID
    fn find_by_last_name_starting_with(
        &self,
        prefix: &str,
        page: PageRequest,
    ) -> Result<Page<Owner>, RepositoryError>;

    /// All owners, ordered by ID
    fn find_all(&self, page: PageRequest) -> Result<Page<Owner>, RepositoryError>;

    /// Visits of one pet, oldest first
    fn find_visits_by_pet_id(&self, pet_id: RecordId<Pet>) -> Result<Vec<Visit>, RepositoryError>;
}

/// Reference data of pet types
#[cfg_attr(test, mockall::automock)]
pub trait PetTypeRepository: Send + Sync {
    /// All pet types, ordered by name
    fn find_pet_types(&self) -> Result<Vec<PetType>, RepositoryError>;
}

#[derive(Debug, Default)]
struct OwnerStore {
    owners: BTreeMap<i32, Owner>,
    last_owner_id: i32,
    last_pet_id: i32,
    last_visit_id: i32,
}

fn next_id(last: &mut i32, kind: &'static str) -> Result<i32, RepositoryError> {
    *last = last.checked_add(1).ok_or(RepositoryError::IdsExhausted(kind))?;
    Ok(*last)
}

/// In-memory owner storage
#[derive(Debug, Clone, Default)]
pub struct InMemoryOwnerRepository {
    storage: Arc<RwLock<OwnerStore>>,
}

impl InMemoryOwnerRepository {
    /// Create an empty repository
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored owners
    pub fn len(&self) -> Result<usize, RepositoryError> {
        Ok(self.read()?.owners.len())
    }

    /// Whether no owners are stored
    pub fn is_empty(&self) -> Result<bool, RepositoryError> {
        Ok(self.len()? == 0)
    }

    fn read(&self) -> Result<std::sync::RwLockReadGuard<'_, OwnerStore>, RepositoryError> {
        self.storage
            .read()
            .map_err(|e| RepositoryError::LockPoisoned(e.to_string()))
    }

    fn write(&self) -> Result<std::sync::RwLockWriteGuard<'_, OwnerStore>, RepositoryError> {
        self.storage
            .write()
            .map_err(|e| RepositoryError::LockPoisoned(e.to_string()))
    }
}

impl OwnerRepository for InMemoryOwnerRepository {
    fn find_by_id(&self, id: RecordId<Owner>) -> Result<Option<Owner>, RepositoryError> {
        Ok(self.read()?.owners.get(&id.value()).cloned())
    }

    fn exists_by_id(&self, id: RecordId<Owner>) -> Result<bool, RepositoryError> {
        Ok(self.read()?.owners.contains_key(&id.value()))
    }

    fn save(&self, mut owner: Owner) -> Result<Owner, RepositoryError> {
        let mut store = self.write()?;

        let owner_id = match owner.id() {
            Some(id) => {
                store.last_owner_id = store.last_owner_id.max(id.value());
                id
            }
            None => {
                let id = RecordId::new(next_id(&mut store.last_owner_id, "owners")?);
                owner.assign_id(id);
                id
            }
        };

        for pet in owner.pets_mut() {
            match pet.id {
                Some(id) => store.last_pet_id = store.last_pet_id.max(id.value()),
                None => pet.id = Some(RecordId::new(next_id(&mut store.last_pet_id, "pets")?)),
            }
            for visit in &mut pet.visits {
                match visit.id {
                    Some(id) => store.last_visit_id = store.last_visit_id.max(id.value()),
                    None => {
                        visit.id = Some(RecordId::new(next_id(&mut store.last_visit_id, "visits")?))
                    }
                }
            }
        }

        store.owners.insert(owner_id.value(), owner.clone());
        Ok(owner)
    }

    fn delete_by_id(&self, id: RecordId<Owner>) -> Result<(), RepositoryError> {
        self.write()?.owners.remove(&id.value());
        Ok(())
    }

    fn find_by_last_name_starting_with(
        &self,
        prefix: &str,
        page: PageRequest,
    ) -> Result<Page<Owner>, RepositoryError> {
        let matching: Vec<Owner> = self
            .read()?
            .owners
            .values()
            .filter(|owner| owner.last_name().starts_with(prefix))
            .cloned()
            .collect();
        Ok(page.slice(matching))
    }

    fn find_all(&self, page: PageRequest) -> Result<Page<Owner>, RepositoryError> {
        let all: Vec<Owner> = self.read()?.owners.values().cloned().collect();
        Ok(page.slice(all))
    }

    fn find_visits_by_pet_id(&self, pet_id: RecordId<Pet>) -> Result<Vec<Visit>, RepositoryError> {
        let store = self.read()?;
        let mut visits: Vec<Visit> = store
            .owners
            .values()
            .filter_map(|owner| owner.find_pet_by_id(pet_id))
            .flat_map(|pet| pet.visits.iter().cloned())
            .collect();
        visits.sort_by_key(|visit| (visit.date, visit.id));
        Ok(visits)
    }
}

/// In-memory pet type storage
#[derive(Debug, Clone, Default)]
pub struct InMemoryPetTypeRepository {
    types: Arc<RwLock<Vec<PetType>>>,
}

impl InMemoryPetTypeRepository {
    /// Create a repository holding `types`
    pub fn new(types: Vec<PetType>) -> Self {
        Self {
            types: Arc::new(RwLock::new(types)),
        }
    }

    /// The usual clinic types: bird, cat, dog, hamster, lizard, snake
    pub fn with_standard_types() -> Self {
        let names = ["cat", "dog", "lizard", "snake", "bird", "hamster"];
        Self::new(
            names
                .iter()
                .zip(1..)
                .map(|(name, id)| PetType::new(id, *name))
                .collect(),
        )
    }
}

impl PetTypeRepository for InMemoryPetTypeRepository {
    fn find_pet_types(&self) -> Result<Vec<PetType>, RepositoryError> {
        let mut types = self
            .types
            .read()
            .map_err(|e| RepositoryError::LockPoisoned(e.to_string()))?
            .clone();
        types.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(types)
    }
}
