// Copyright 2025 Cowboy AI, LLC.

//! Owner and pet flows
//!
//! Services sit between an outer surface and the core. They bind inbound
//! forms, run every validation rule, enforce the aggregate's consistency
//! rules and hand finished aggregates to the repository. All failures come
//! back as a [`ServiceError`], which the
//! [`ErrorResponseMapper`](crate::ErrorResponseMapper) renders.
//!
//! ```mermaid
//! sequenceDiagram
//!     participant C as Caller
//!     participant S as PetService
//!     participant R as OwnerRepository
//!     C->>S: create_pet(owner_id, form, today)
//!     S->>R: find_by_id(owner_id)
//!     R-->>S: Owner
//!     S->>S: bind + validate + duplicate + birth date
//!     alt any failure
//!         S-->>C: FieldValidation(Pet)
//!     else clean
//!         S->>R: save(owner)
//!         S-->>C: Owner
//!     end
//! ```

use crate::config::ClinicConfig;
use crate::entity::{Persistable, RecordId};
use crate::errors::{ClinicError, OwnerBuildError, Subject};
use crate::owner::{Owner, OwnerForm};
use crate::pet::{Pet, PetType};
use crate::repository::{OwnerRepository, Page, PageRequest, PetTypeRepository, RepositoryError};
use crate::validation::{
    check_birth_date_not_in_future, OwnerFieldValidator, ValidationFailure, ValidationFailures,
    Validator, DUPLICATE, PET_VALIDATOR, TYPE_MISMATCH,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Rule code raised when a body ID disagrees with the addressed owner
pub const OWNER_ID_MISMATCH: &str = "OWNER_ID_MISMATCH";

/// Failures a service call can end with
#[derive(Debug, Clone, Error)]
pub enum ServiceError {
    /// A charted domain failure
    #[error(transparent)]
    Domain(#[from] ClinicError),

    /// Inbound data failed generic binding checks
    #[error("invalid input: {0}")]
    Invalid(ValidationFailures),

    /// The repository failed
    #[error(transparent)]
    Storage(#[from] RepositoryError),
}

impl ServiceError {
    /// The domain failure, if this is one
    pub fn as_domain(&self) -> Option<&ClinicError> {
        match self {
            ServiceError::Domain(err) => Some(err),
            _ => None,
        }
    }

    /// The binding failures, if this is one
    pub fn as_invalid(&self) -> Option<&ValidationFailures> {
        match self {
            ServiceError::Invalid(failures) => Some(failures),
            _ => None,
        }
    }
}

impl From<ValidationFailures> for ServiceError {
    fn from(failures: ValidationFailures) -> Self {
        ServiceError::Invalid(failures)
    }
}

impl From<OwnerBuildError> for ServiceError {
    fn from(err: OwnerBuildError) -> Self {
        ServiceError::Domain(err.into())
    }
}

/// Result type for service calls
pub type ServiceResult<T> = Result<T, ServiceError>;

fn check_positive_id(field: &str, id: i32) -> ServiceResult<()> {
    if id >= 1 {
        return Ok(());
    }
    let mut failures = ValidationFailures::new();
    failures.push(
        ValidationFailure::new(field, "min", "must be greater than or equal to 1").rejecting(id),
    );
    Err(ServiceError::Invalid(failures))
}

fn page_request(page: Option<i64>, size: Option<i64>, default_size: usize) -> ServiceResult<PageRequest> {
    let default_size = i64::try_from(default_size).unwrap_or(i64::MAX);
    Ok(PageRequest::new(page.unwrap_or(0), size.unwrap_or(default_size))?)
}

/// Owner CRUD and search
pub struct OwnerService<R: OwnerRepository> {
    owners: R,
    validator: OwnerFieldValidator,
    config: ClinicConfig,
}

impl<R: OwnerRepository> OwnerService<R> {
    /// Create a service over `owners`
    pub fn new(owners: R, config: ClinicConfig) -> Self {
        Self {
            owners,
            validator: OwnerFieldValidator::new(config.telephone_digits),
            config,
        }
    }

    /// The underlying repository
    pub fn repository(&self) -> &R {
        &self.owners
    }

    fn validate_form(&self, form: &OwnerForm) -> ServiceResult<()> {
        let failures = self.validator.validate(form);
        if failures.is_empty() {
            return Ok(());
        }
        debug!("Owner form rejected: {}", failures);
        Err(ServiceError::Invalid(failures))
    }

    fn require_existing(&self, id: RecordId<Owner>) -> ServiceResult<()> {
        if self.owners.exists_by_id(id)? {
            return Ok(());
        }
        warn!("Owner {} not found", id);
        Err(ClinicError::owner_not_found(id.value()).into())
    }

    /// Validate and store a new owner; any ID in the form is ignored
    pub fn create_owner(&self, form: OwnerForm) -> ServiceResult<Owner> {
        self.validate_form(&form)?;

        let owner = Owner::builder()
            .telephone_digits(self.config.telephone_digits)
            .form(&form)
            .build()?;
        let saved = self.owners.save(owner)?;

        info!(
            "Created owner {} {} with id {:?}",
            saved.first_name(),
            saved.last_name(),
            saved.id()
        );
        Ok(saved)
    }

    /// Load one owner
    pub fn get_owner(&self, id: i32) -> ServiceResult<Owner> {
        check_positive_id("ownerId", id)?;

        match self.owners.find_by_id(RecordId::new(id))? {
            Some(owner) => Ok(owner),
            None => {
                warn!("Owner {} not found", id);
                Err(ClinicError::owner_not_found(id).into())
            }
        }
    }

    /// Replace an owner's contact data, keeping its pets
    pub fn update_owner(&self, id: i32, form: OwnerForm) -> ServiceResult<Owner> {
        check_positive_id("ownerId", id)?;
        self.validate_form(&form)?;

        let owner_id = RecordId::new(id);
        self.require_existing(owner_id)?;

        if let Some(body_id) = form.id.filter(|body_id| *body_id != id) {
            warn!("Owner id mismatch: path {} body {}", id, body_id);
            return Err(ClinicError::rule_violation(
                "The owner ID in the URL does not match the owner ID in the request body",
                Some(OWNER_ID_MISMATCH.to_string()),
                Some(serde_json::json!({ "pathId": id, "bodyId": body_id })),
            )
            .into());
        }

        let existing = self
            .owners
            .find_by_id(owner_id)?
            .ok_or_else(|| ClinicError::owner_not_found(id))?;
        let updated = existing
            .to_builder()
            .telephone_digits(self.config.telephone_digits)
            .form(&form)
            .build()?;
        let saved = self.owners.save(updated)?;

        info!("Updated owner {}", id);
        Ok(saved)
    }

    /// Remove an owner and its pets
    pub fn delete_owner(&self, id: i32) -> ServiceResult<()> {
        check_positive_id("ownerId", id)?;

        let owner_id = RecordId::new(id);
        self.require_existing(owner_id)?;
        self.owners.delete_by_id(owner_id)?;

        info!("Deleted owner {}", id);
        Ok(())
    }

    /// Owners whose last name starts with `last_name`; everyone when absent
    pub fn search_owners(
        &self,
        last_name: Option<&str>,
        page: Option<i64>,
        size: Option<i64>,
    ) -> ServiceResult<Page<Owner>> {
        let request = page_request(page, size, self.config.search_page_size)?;
        let prefix = last_name.unwrap_or_default();

        let found = self.owners.find_by_last_name_starting_with(prefix, request)?;
        debug!(
            "Search '{}' page {} returned {} of {}",
            prefix,
            request.page(),
            found.number_of_elements(),
            found.total_elements
        );
        Ok(found)
    }

    /// All owners, one page at a time
    pub fn list_owners(&self, page: Option<i64>, size: Option<i64>) -> ServiceResult<Page<Owner>> {
        let request = page_request(page, size, self.config.list_page_size)?;
        Ok(self.owners.find_all(request)?)
    }
}

/// Pet data as it arrives from a form
///
/// Absent fields leave the target pet untouched. The type is given by name
/// and resolved against the known pet types.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PetForm {
    /// Name
    pub name: Option<String>,
    /// Birth date
    pub birth_date: Option<NaiveDate>,
    /// Name of the pet type
    #[serde(rename = "type")]
    pub pet_type: Option<String>,
}

impl PetForm {
    /// Form with every field set
    pub fn new(name: impl Into<String>, birth_date: NaiveDate, pet_type: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            birth_date: Some(birth_date),
            pet_type: Some(pet_type.into()),
        }
    }
}

/// Pet creation and editing inside an owner
pub struct PetService<O: OwnerRepository, T: PetTypeRepository> {
    owners: O,
    types: T,
}

impl<O: OwnerRepository, T: PetTypeRepository> PetService<O, T> {
    /// Create a service over the two repositories
    pub fn new(owners: O, types: T) -> Self {
        Self { owners, types }
    }

    /// Known pet types, ordered by name
    pub fn pet_types(&self) -> ServiceResult<Vec<PetType>> {
        Ok(self.types.find_pet_types()?)
    }

    fn load_owner(&self, owner_id: i32) -> ServiceResult<Owner> {
        match self.owners.find_by_id(RecordId::new(owner_id))? {
            Some(owner) => Ok(owner),
            None => {
                warn!("Owner {} not found", owner_id);
                Err(ClinicError::owner_not_found(owner_id).into())
            }
        }
    }

    /// Overlay the form onto `pet`, collecting type resolution failures
    fn bind(&self, form: PetForm, mut pet: Pet, failures: &mut ValidationFailures) -> ServiceResult<Pet> {
        if let Some(name) = form.name {
            pet.name = Some(name);
        }
        if let Some(birth_date) = form.birth_date {
            pet.birth_date = Some(birth_date);
        }
        if let Some(type_name) = form.pet_type {
            let known = self.types.find_pet_types()?;
            match known.into_iter().find(|t| t.name == type_name) {
                Some(pet_type) => pet.pet_type = Some(pet_type),
                None => {
                    pet.pet_type = None;
                    failures.push(
                        ValidationFailure::new("type", TYPE_MISMATCH, "unknown pet type")
                            .rejecting(type_name),
                    );
                }
            }
        }
        Ok(pet)
    }

    fn check(owner: &Owner, pet: &Pet, include_new: bool, today: NaiveDate, failures: &mut ValidationFailures) {
        failures.extend(PET_VALIDATOR.validate(pet));
        failures.extend(duplicate_name(owner, pet, include_new));
        failures.extend(check_birth_date_not_in_future(pet, today));
    }

    /// Add a new pet to an owner
    pub fn create_pet(&self, owner_id: i32, form: PetForm, today: NaiveDate) -> ServiceResult<Owner> {
        let mut owner = self.load_owner(owner_id)?;

        let mut failures = ValidationFailures::new();
        let pet = self.bind(form, Pet::new(), &mut failures)?;
        Self::check(&owner, &pet, true, today, &mut failures);

        if !failures.is_empty() {
            debug!("New pet for owner {} rejected: {}", owner_id, failures);
            return Err(rejected(failures, None));
        }

        owner.add_pet(pet);
        let saved = self.owners.save(owner)?;
        info!("New Pet has been Added to owner {}", owner_id);
        Ok(saved)
    }

    /// Change name, birth date and type of an existing pet
    pub fn update_pet(
        &self,
        owner_id: i32,
        pet_id: i32,
        form: PetForm,
        today: NaiveDate,
    ) -> ServiceResult<Owner> {
        let mut owner = self.load_owner(owner_id)?;
        let Some(existing) = owner.find_pet_by_id(pet_id).cloned() else {
            warn!("Pet {} not found for owner {}", pet_id, owner_id);
            return Err(ClinicError::pet_not_found(pet_id).into());
        };

        let mut failures = ValidationFailures::new();
        let edited = self.bind(form, existing, &mut failures)?;
        Self::check(&owner, &edited, false, today, &mut failures);

        if !failures.is_empty() {
            debug!("Edit of pet {} rejected: {}", pet_id, failures);
            return Err(rejected(failures, Some(pet_id)));
        }

        if let Some(pet) = owner.find_pet_by_id_mut(pet_id) {
            pet.name = edited.name;
            pet.birth_date = edited.birth_date;
            pet.pet_type = edited.pet_type;
        }
        let saved = self.owners.save(owner)?;
        info!("Pet details has been edited for pet {}", pet_id);
        Ok(saved)
    }
}

/// A `name` failure when another pet of the owner already uses the name
///
/// The match is only excused when both are provably the same record.
pub fn duplicate_name(owner: &Owner, pet: &Pet, include_new: bool) -> Option<ValidationFailure> {
    let name = pet.name.as_deref()?;
    let existing = owner.find_pet_by_name(name, include_new)?;
    if existing.id().is_some() && existing.id() == pet.id() {
        return None;
    }
    Some(ValidationFailure::new("name", DUPLICATE, "already exists").rejecting(name))
}

fn rejected(failures: ValidationFailures, pet_id: Option<i32>) -> ServiceError {
    ClinicError::field_validation(
        Subject::Pet,
        "Pet validation failed",
        failures.into_field_errors(),
        pet_id,
    )
    .into()
}
