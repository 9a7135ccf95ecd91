// Copyright 2025 Cowboy AI, LLC.

//! Record identity for clinic entities

use serde::{Deserialize, Serialize};
use std::fmt;
use std::hash::{Hash, Hasher};
use std::marker::PhantomData;

/// A typed record ID using phantom types for type safety
///
/// IDs are plain integers assigned by the persistence collaborator. The
/// phantom type parameter keeps owner IDs and pet IDs from being mixed up
/// at compile time.
///
/// # Examples
///
/// ```rust
/// use petclinic_domain::{Owner, Pet, RecordId};
///
/// let owner_id = RecordId::<Owner>::new(7);
/// let pet_id = RecordId::<Pet>::new(7);
///
/// // Same number, different types:
/// // let _: RecordId<Owner> = pet_id; // ERROR!
/// assert_eq!(owner_id.value(), pet_id.value());
/// ```
#[derive(Serialize, Deserialize)]
#[serde(transparent)]
pub struct RecordId<T> {
    id: i32,
    #[serde(skip)]
    _phantom: PhantomData<fn() -> T>,
}

impl<T> RecordId<T> {
    /// Wrap a raw integer key
    pub const fn new(id: i32) -> Self {
        Self {
            id,
            _phantom: PhantomData,
        }
    }

    /// Get the underlying integer key
    pub const fn value(&self) -> i32 {
        self.id
    }

    /// Convert to a different record ID type (use with caution)
    pub fn cast<U>(self) -> RecordId<U> {
        RecordId::new(self.id)
    }
}

// Manual impls so `T` itself needs no bounds.
impl<T> Clone for RecordId<T> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<T> Copy for RecordId<T> {}

impl<T> PartialEq for RecordId<T> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<T> Eq for RecordId<T> {}

impl<T> Hash for RecordId<T> {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl<T> PartialOrd for RecordId<T> {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl<T> Ord for RecordId<T> {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.id.cmp(&other.id)
    }
}

impl<T> fmt::Debug for RecordId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("RecordId").field(&self.id).finish()
    }
}

impl<T> fmt::Display for RecordId<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.id)
    }
}

impl<T> From<i32> for RecordId<T> {
    fn from(id: i32) -> Self {
        Self::new(id)
    }
}

impl<T> From<RecordId<T>> for i32 {
    fn from(id: RecordId<T>) -> Self {
        id.id
    }
}

/// Trait for records whose identity is assigned on persistence
///
/// A record without an ID is *new*: it has been constructed from inbound
/// data but the persistence collaborator has not accepted it yet.
pub trait Persistable {
    /// The marker type for this record's ID
    type Marker;

    /// Get the record's ID, if it has been persisted
    fn id(&self) -> Option<RecordId<Self::Marker>>;

    /// Whether the record has no persisted identity yet
    fn is_new(&self) -> bool {
        self.id().is_none()
    }
}
