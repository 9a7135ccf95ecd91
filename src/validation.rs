// Copyright 2025 Cowboy AI, LLC.

//! Field-level validation of inbound records
//!
//! Validators never stop at the first problem: every rule is evaluated and
//! each violation becomes one [`ValidationFailure`]. The collected
//! [`ValidationFailures`] are turned into a
//! [`ClinicError::FieldValidation`](crate::ClinicError) by the caller, or
//! rendered directly through the generic binding path of the
//! [`ErrorResponseMapper`](crate::ErrorResponseMapper).

use crate::entity::Persistable;
use crate::errors::{ClinicError, FieldErrors, Subject};
use crate::owner::OwnerForm;
use crate::pet::Pet;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::any::TypeId;
use std::fmt;

/// A required value is absent or blank
pub const REQUIRED: &str = "required";
/// Another record already uses the value
pub const DUPLICATE: &str = "duplicate";
/// The value could not be interpreted
pub const TYPE_MISMATCH: &str = "typeMismatch";
/// The value does not match the expected format
pub const PATTERN: &str = "pattern";
/// A birth date lies in the future
pub const FUTURE_BIRTH_DATE: &str = "typeMismatch.birthDate";

/// One problem with one named field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationFailure {
    /// Wire name of the field
    pub field: String,
    /// Human-readable message
    pub message: String,
    /// Machine code, e.g. `required` or `duplicate`
    pub code: String,
    /// Raw value that was rejected, if one was supplied
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rejected_value: Option<String>,
}

impl ValidationFailure {
    /// Create a failure without a rejected value
    pub fn new(
        field: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
            code: code.into(),
            rejected_value: None,
        }
    }

    /// Attach the rejected raw value
    pub fn rejecting(mut self, value: impl fmt::Display) -> Self {
        self.rejected_value = Some(value.to_string());
        self
    }

    /// A `required` failure whose message is the code itself
    pub fn required(field: impl Into<String>) -> Self {
        Self::new(field, REQUIRED, REQUIRED)
    }
}

/// Ordered collection of failures
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ValidationFailures(Vec<ValidationFailure>);

impl ValidationFailures {
    /// Create an empty collection
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a failure
    pub fn push(&mut self, failure: ValidationFailure) {
        self.0.push(failure);
    }

    /// Whether nothing failed
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of failures
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether any failure names `field`
    pub fn has_field(&self, field: &str) -> bool {
        self.0.iter().any(|f| f.field == field)
    }

    /// First failure naming `field`
    pub fn field(&self, field: &str) -> Option<&ValidationFailure> {
        self.0.iter().find(|f| f.field == field)
    }

    /// Iterate in insertion order
    pub fn iter(&self) -> std::slice::Iter<'_, ValidationFailure> {
        self.0.iter()
    }

    /// Group messages by field, keeping first-seen field order
    pub fn into_field_errors(self) -> FieldErrors {
        self.to_field_errors()
    }

    /// Borrowing form of [`into_field_errors`](Self::into_field_errors)
    pub fn to_field_errors(&self) -> FieldErrors {
        let mut grouped = FieldErrors::new();
        for failure in &self.0 {
            grouped
                .entry(failure.field.clone())
                .or_default()
                .push(failure.message.clone());
        }
        grouped
    }

    /// `Ok(())` when empty, otherwise a field-validation error for `subject`
    pub fn into_result(
        self,
        subject: Subject,
        message: impl Into<String>,
        record_id: Option<i32>,
    ) -> Result<(), ClinicError> {
        if self.is_empty() {
            return Ok(());
        }
        Err(ClinicError::field_validation(
            subject,
            message,
            self.into_field_errors(),
            record_id,
        ))
    }
}

impl fmt::Display for ValidationFailures {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|failure| format!("{}: {}", failure.field, failure.message))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

impl Extend<ValidationFailure> for ValidationFailures {
    fn extend<I: IntoIterator<Item = ValidationFailure>>(&mut self, iter: I) {
        self.0.extend(iter);
    }
}

impl FromIterator<ValidationFailure> for ValidationFailures {
    fn from_iter<I: IntoIterator<Item = ValidationFailure>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

impl IntoIterator for ValidationFailures {
    type Item = ValidationFailure;
    type IntoIter = std::vec::IntoIter<ValidationFailure>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}

impl<'a> IntoIterator for &'a ValidationFailures {
    type Item = &'a ValidationFailure;
    type IntoIter = std::slice::Iter<'a, ValidationFailure>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

/// A stateless validator for records of type `T`
pub trait Validator<T: 'static> {
    /// Whether this validator applies to records of type `ty`
    fn supports(&self, ty: TypeId) -> bool {
        ty == TypeId::of::<T>()
    }

    /// Evaluate every rule and collect the violations
    fn validate(&self, target: &T) -> ValidationFailures;
}

/// Absent, empty or whitespace-only
pub fn is_blank(value: Option<&str>) -> bool {
    value.map_or(true, |v| v.trim().is_empty())
}

/// Exactly `digits` ASCII digits and nothing else
pub fn is_valid_telephone(telephone: &str, digits: usize) -> bool {
    telephone.len() == digits && telephone.bytes().all(|b| b.is_ascii_digit())
}

/// Required-field rules for pets
///
/// `name` and `birthDate` are always required. `type` is required only for
/// new pets, so an edit that omits the type of an already typed pet passes.
#[derive(Debug, Clone, Copy, Default)]
pub struct PetValidator;

/// Shared pet validator instance
pub const PET_VALIDATOR: PetValidator = PetValidator;

impl Validator<Pet> for PetValidator {
    fn validate(&self, pet: &Pet) -> ValidationFailures {
        let mut failures = ValidationFailures::new();

        if is_blank(pet.name.as_deref()) {
            let mut failure = ValidationFailure::required("name");
            failure.rejected_value = pet.name.clone();
            failures.push(failure);
        }

        if pet.pet_type.is_none() && pet.is_new() {
            failures.push(ValidationFailure::required("type"));
        }

        if pet.birth_date.is_none() {
            failures.push(ValidationFailure::required("birthDate"));
        }

        failures
    }
}

/// Caller-side rule: a birth date may not be after `today`
pub fn check_birth_date_not_in_future(pet: &Pet, today: NaiveDate) -> Option<ValidationFailure> {
    pet.birth_date
        .filter(|birth| *birth > today)
        .map(|birth| ValidationFailure::new("birthDate", FUTURE_BIRTH_DATE, "invalid date").rejecting(birth))
}

/// Collectible owner field rules, used when owner data arrives through a
/// request body rather than the fail-fast builder
#[derive(Debug, Clone, Copy)]
pub struct OwnerFieldValidator {
    telephone_digits: usize,
}

impl OwnerFieldValidator {
    /// Create a validator requiring `telephone_digits` digits
    pub fn new(telephone_digits: usize) -> Self {
        Self { telephone_digits }
    }
}

impl Default for OwnerFieldValidator {
    fn default() -> Self {
        Self::new(10)
    }
}

impl Validator<OwnerForm> for OwnerFieldValidator {
    fn validate(&self, form: &OwnerForm) -> ValidationFailures {
        let mut failures = ValidationFailures::new();

        let required = [
            ("firstName", &form.first_name),
            ("lastName", &form.last_name),
            ("address", &form.address),
            ("city", &form.city),
            ("telephone", &form.telephone),
        ];
        for (field, value) in required {
            if is_blank(value.as_deref()) {
                let mut failure = ValidationFailure::new(field, REQUIRED, "must not be blank");
                failure.rejected_value = value.clone();
                failures.push(failure);
            }
        }

        if let Some(telephone) = form.telephone.as_deref() {
            if !telephone.trim().is_empty() && !is_valid_telephone(telephone, self.telephone_digits) {
                failures.push(
                    ValidationFailure::new(
                        "telephone",
                        PATTERN,
                        format!("Telephone must be a {}-digit number", self.telephone_digits),
                    )
                    .rejecting(telephone),
                );
            }
        }

        failures
    }
}
