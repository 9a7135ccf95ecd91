// Copyright 2025 Cowboy AI, LLC.

//! Error types for clinic record operations
//!
//! Every failure the core raises is a [`ClinicError`]. Each variant carries a
//! stable error code, a human message, the local time it was created, and an
//! optional underlying cause. The cause is only for diagnostics: it is
//! reachable through [`std::error::Error::source`] and never rendered into
//! an [`ErrorReport`](crate::ErrorReport).

use chrono::{Local, NaiveDateTime};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// Shared underlying cause of a [`ClinicError`]
pub type Cause = Arc<dyn StdError + Send + Sync + 'static>;

/// Field name to ordered list of messages, in insertion order
pub type FieldErrors = IndexMap<String, Vec<String>>;

/// Error code of [`ClinicError::BusinessRuleViolation`]
pub const BUSINESS_RULE_VIOLATION: &str = "BUSINESS_RULE_VIOLATION";

/// The record kind an error is about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Subject {
    /// An owner aggregate
    Owner,
    /// A pet inside an owner aggregate
    Pet,
}

impl Subject {
    /// Human name, capitalized
    pub fn name(&self) -> &'static str {
        match self {
            Subject::Owner => "Owner",
            Subject::Pet => "Pet",
        }
    }

    /// Code of the not-found variant for this subject
    pub fn not_found_code(&self) -> &'static str {
        match self {
            Subject::Owner => "OWNER_NOT_FOUND",
            Subject::Pet => "PET_NOT_FOUND",
        }
    }

    /// Code of the field-validation variant for this subject
    pub fn validation_code(&self) -> &'static str {
        match self {
            Subject::Owner => "OWNER_VALIDATION_ERROR",
            Subject::Pet => "PET_VALIDATION_ERROR",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// How a failure is presented to the caller
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Classification {
    /// The addressed record does not exist
    ResourceMissing,
    /// The input was rejected by field validation
    InvalidInput,
    /// The request was rejected by a business rule
    RuleRejected,
    /// Something the core does not chart went wrong
    Unexpected,
}

/// Errors raised by the clinic core
#[derive(Debug, Clone, Error)]
pub enum ClinicError {
    /// A record addressed by integer key does not exist
    #[error("{message}")]
    NotFound {
        /// Kind of record that was looked up
        subject: Subject,
        /// Key that was looked up
        id: i32,
        /// Message shown to the caller
        message: String,
        /// When the failure was detected
        timestamp: NaiveDateTime,
        /// Underlying cause, for logging only
        #[source]
        cause: Option<Cause>,
    },

    /// One or more named fields failed validation
    #[error("{message}")]
    FieldValidation {
        /// Kind of record that was validated
        subject: Subject,
        /// Message shown to the caller
        message: String,
        /// Offending fields, each with its ordered messages
        field_errors: FieldErrors,
        /// Identity of the record being edited, if any
        record_id: Option<i32>,
        /// When the failure was detected
        timestamp: NaiveDateTime,
        /// Underlying cause, for logging only
        #[source]
        cause: Option<Cause>,
    },

    /// A cross-field or cross-entity rule failed
    #[error("{message}")]
    BusinessRuleViolation {
        /// Message shown to the caller
        message: String,
        /// Identifier of the violated rule
        rule_code: Option<String>,
        /// Context about the entity involved
        related_entity: Option<serde_json::Value>,
        /// When the failure was detected
        timestamp: NaiveDateTime,
        /// Underlying cause, for logging only
        #[source]
        cause: Option<Cause>,
    },
}

/// Result type for clinic operations
pub type DomainResult<T> = Result<T, ClinicError>;

pub(crate) fn now() -> NaiveDateTime {
    Local::now().naive_local()
}

impl ClinicError {
    /// Owner lookup failed, with the default corrective message
    pub fn owner_not_found(id: i32) -> Self {
        Self::not_found(Subject::Owner, id)
    }

    /// Pet lookup failed, with the default corrective message
    pub fn pet_not_found(id: i32) -> Self {
        Self::not_found(Subject::Pet, id)
    }

    /// Lookup of `subject` with key `id` failed
    pub fn not_found(subject: Subject, id: i32) -> Self {
        let message = format!(
            "{} not found with id: {}. Please ensure the ID is correct and the {} exists in the database.",
            subject.name(),
            id,
            subject.name().to_lowercase()
        );
        Self::not_found_with_message(subject, id, message)
    }

    /// Lookup failed, with a custom message replacing the default one
    pub fn not_found_with_message(subject: Subject, id: i32, message: impl Into<String>) -> Self {
        ClinicError::NotFound {
            subject,
            id,
            message: message.into(),
            timestamp: now(),
            cause: None,
        }
    }

    /// Owner validation failed on the given fields
    pub fn owner_validation(message: impl Into<String>, field_errors: FieldErrors) -> Self {
        Self::field_validation(Subject::Owner, message, field_errors, None)
    }

    /// Pet validation failed on the given fields
    pub fn pet_validation(
        message: impl Into<String>,
        field_errors: FieldErrors,
        pet_id: Option<i32>,
    ) -> Self {
        Self::field_validation(Subject::Pet, message, field_errors, pet_id)
    }

    /// Validation of `subject` failed on the given fields
    pub fn field_validation(
        subject: Subject,
        message: impl Into<String>,
        field_errors: FieldErrors,
        record_id: Option<i32>,
    ) -> Self {
        ClinicError::FieldValidation {
            subject,
            message: message.into(),
            field_errors,
            record_id,
            timestamp: now(),
            cause: None,
        }
    }

    /// A business rule failed, without a rule code
    pub fn business_rule(message: impl Into<String>) -> Self {
        Self::rule_violation(message, None, None)
    }

    /// A business rule identified by `rule_code` failed
    pub fn business_rule_with_code(message: impl Into<String>, rule_code: impl Into<String>) -> Self {
        Self::rule_violation(message, Some(rule_code.into()), None)
    }

    /// A business rule failed, with optional rule code and entity context
    pub fn rule_violation(
        message: impl Into<String>,
        rule_code: Option<String>,
        related_entity: Option<serde_json::Value>,
    ) -> Self {
        ClinicError::BusinessRuleViolation {
            message: message.into(),
            rule_code,
            related_entity,
            timestamp: now(),
            cause: None,
        }
    }

    /// Attach an underlying cause
    pub fn with_cause<E>(self, cause: E) -> Self
    where
        E: StdError + Send + Sync + 'static,
    {
        self.with_shared_cause(Arc::new(cause))
    }

    /// Attach an already shared underlying cause
    pub fn with_shared_cause(mut self, shared: Cause) -> Self {
        match &mut self {
            ClinicError::NotFound { cause, .. }
            | ClinicError::FieldValidation { cause, .. }
            | ClinicError::BusinessRuleViolation { cause, .. } => *cause = Some(shared),
        }
        self
    }

    /// Stable machine-readable code
    pub fn error_code(&self) -> &'static str {
        match self {
            ClinicError::NotFound { subject, .. } => subject.not_found_code(),
            ClinicError::FieldValidation { subject, .. } => subject.validation_code(),
            ClinicError::BusinessRuleViolation { .. } => BUSINESS_RULE_VIOLATION,
        }
    }

    /// Human-readable message
    pub fn message(&self) -> &str {
        match self {
            ClinicError::NotFound { message, .. }
            | ClinicError::FieldValidation { message, .. }
            | ClinicError::BusinessRuleViolation { message, .. } => message,
        }
    }

    /// When the failure was created
    pub fn timestamp(&self) -> NaiveDateTime {
        match self {
            ClinicError::NotFound { timestamp, .. }
            | ClinicError::FieldValidation { timestamp, .. }
            | ClinicError::BusinessRuleViolation { timestamp, .. } => *timestamp,
        }
    }

    /// Underlying cause, if one was attached
    pub fn cause(&self) -> Option<&Cause> {
        match self {
            ClinicError::NotFound { cause, .. }
            | ClinicError::FieldValidation { cause, .. }
            | ClinicError::BusinessRuleViolation { cause, .. } => cause.as_ref(),
        }
    }

    /// How the failure is presented to the caller
    pub fn classification(&self) -> Classification {
        match self {
            ClinicError::NotFound { .. } => Classification::ResourceMissing,
            ClinicError::FieldValidation { .. } => Classification::InvalidInput,
            ClinicError::BusinessRuleViolation { .. } => Classification::RuleRejected,
        }
    }

    /// Field errors of a validation failure
    pub fn field_errors(&self) -> Option<&FieldErrors> {
        match self {
            ClinicError::FieldValidation { field_errors, .. } => Some(field_errors),
            _ => None,
        }
    }

    /// Whether this is a validation failure naming at least one field
    pub fn has_field_errors(&self) -> bool {
        self.field_errors().is_some_and(|errors| !errors.is_empty())
    }

    /// Rule code of a business-rule violation, as given
    pub fn rule_code(&self) -> Option<&str> {
        match self {
            ClinicError::BusinessRuleViolation { rule_code, .. } => rule_code.as_deref(),
            _ => None,
        }
    }

    /// Whether a non-blank rule code is present
    pub fn has_rule_code(&self) -> bool {
        self.rule_code().is_some_and(|code| !code.trim().is_empty())
    }

    /// Entity context of a business-rule violation
    pub fn related_entity(&self) -> Option<&serde_json::Value> {
        match self {
            ClinicError::BusinessRuleViolation { related_entity, .. } => related_entity.as_ref(),
            _ => None,
        }
    }

    /// Check if this is a not found error
    pub fn is_not_found(&self) -> bool {
        matches!(self, ClinicError::NotFound { .. })
    }

    /// Check if this is a field validation error
    pub fn is_validation_error(&self) -> bool {
        matches!(self, ClinicError::FieldValidation { .. })
    }

    /// Check if this is a business rule violation
    pub fn is_business_rule_violation(&self) -> bool {
        matches!(self, ClinicError::BusinessRuleViolation { .. })
    }

    /// One-line diagnostic form: `Variant[errorCode='..', timestamp='..', message='..']`
    pub fn describe(&self) -> String {
        let variant = match self {
            ClinicError::NotFound { .. } => "NotFound",
            ClinicError::FieldValidation { .. } => "FieldValidation",
            ClinicError::BusinessRuleViolation { .. } => "BusinessRuleViolation",
        };
        format!(
            "{}[errorCode='{}', timestamp='{}', message='{}']",
            variant,
            self.error_code(),
            self.timestamp(),
            self.message()
        )
    }
}

/// Reasons an [`Owner`](crate::Owner) cannot be built at all
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OwnerBuildError {
    /// First name absent or blank
    #[error("First name is required and cannot be blank")]
    MissingFirstName,
    /// Last name absent or blank
    #[error("Last name is required and cannot be blank")]
    MissingLastName,
    /// Address absent or blank
    #[error("Address is required and cannot be blank")]
    MissingAddress,
    /// City absent or blank
    #[error("City is required and cannot be blank")]
    MissingCity,
    /// Telephone absent or blank
    #[error("Telephone is required and cannot be blank")]
    MissingTelephone,
    /// Telephone is not exactly the required number of ASCII digits
    #[error("Telephone must be exactly {expected} digits")]
    InvalidTelephone {
        /// Required digit count
        expected: usize,
    },
    /// Two initial pets share a name, ignoring case
    #[error("Pet name '{name}' is used more than once")]
    DuplicatePetName {
        /// The repeated name, as given on the later pet
        name: String,
    },
}

impl OwnerBuildError {
    /// Wire name of the offending field
    pub fn field(&self) -> &'static str {
        match self {
            OwnerBuildError::MissingFirstName => "firstName",
            OwnerBuildError::MissingLastName => "lastName",
            OwnerBuildError::MissingAddress => "address",
            OwnerBuildError::MissingCity => "city",
            OwnerBuildError::MissingTelephone | OwnerBuildError::InvalidTelephone { .. } => {
                "telephone"
            }
            OwnerBuildError::DuplicatePetName { .. } => "pets",
        }
    }
}

impl From<OwnerBuildError> for ClinicError {
    fn from(err: OwnerBuildError) -> Self {
        let mut field_errors = FieldErrors::new();
        field_errors.insert(err.field().to_string(), vec![err.to_string()]);
        ClinicError::owner_validation(err.to_string(), field_errors).with_cause(err)
    }
}
