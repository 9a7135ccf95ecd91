// Copyright 2025 Cowboy AI, LLC.

//! # Petclinic Domain
//!
//! Core record rules of a veterinary clinic: owners, the pets they own, and
//! the uniform way failures are reported.
//!
//! This crate provides:
//! - **Owner aggregate**: the consistency boundary for pets, with a
//!   fail-fast builder and case-insensitive pet lookup
//! - **Record validation**: exhaustive, collectible field-level checks
//! - **Age calculation**: whole years from a birth date, never negative
//! - **Error taxonomy**: a closed [`ClinicError`] enum with stable codes
//! - **Error reports**: mapping any failure to one [`ErrorReport`]
//! - **Repositories and services**: owner CRUD and pet flows over a
//!   pluggable persistence collaborator
//!
//! ## Design Principles
//!
//! 1. **Type Safety**: Phantom-typed record IDs keep owner and pet keys apart
//! 2. **Exhaustive Validation**: Every rule runs, every failure is reported
//! 3. **Closed Errors**: Failures are matched exhaustively, never downcast
//! 4. **No Leaks**: Uncharted failures are logged, never rendered
//!
//! ```rust
//! use petclinic_domain::{ClinicError, ErrorResponseMapper};
//!
//! let err = ClinicError::owner_not_found(999);
//! let response = ErrorResponseMapper::default().map(&err, "/owners/999");
//!
//! assert_eq!(response.status_code(), 404);
//! assert_eq!(response.report.error_code, "OWNER_NOT_FOUND");
//! ```

#![warn(missing_docs)]

mod age;
mod config;
mod entity;
mod errors;
mod owner;
mod pet;
pub mod repository;
mod response;
pub mod services;
pub mod validation;

pub use age::{age_in_years, today};
pub use config::ClinicConfig;
pub use entity::{Persistable, RecordId};
pub use errors::{
    Cause, Classification, ClinicError, DomainResult, FieldErrors, OwnerBuildError, Subject,
    BUSINESS_RULE_VIOLATION,
};
pub use owner::{Owner, OwnerBuilder, OwnerForm, DEFAULT_TELEPHONE_DIGITS};
pub use pet::{Pet, PetType, Visit};
pub use repository::{
    InMemoryOwnerRepository, InMemoryPetTypeRepository, OwnerRepository, Page, PageRequest,
    PetTypeRepository, RepositoryError,
};
pub use response::{
    request_path, BindingSource, ErrorReport, ErrorResponse, ErrorResponseMapper,
    FieldErrorEntry, ResponseClass, INTERNAL_ERROR, VALIDATION_ERROR,
};
pub use services::{OwnerService, PetForm, PetService, ServiceError, ServiceResult};
pub use validation::{
    PetValidator, ValidationFailure, ValidationFailures, Validator, PET_VALIDATOR,
};
