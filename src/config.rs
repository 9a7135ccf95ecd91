// Copyright 2025 Cowboy AI, LLC.

//! Clinic configuration

use crate::owner::DEFAULT_TELEPHONE_DIGITS;
use serde::{Deserialize, Serialize};

/// Settings shared by the services and the error response mapper
///
/// Missing keys fall back to their defaults when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClinicConfig {
    /// Page size of an owner search when none is requested
    pub search_page_size: usize,
    /// Page size of the owner list when none is requested
    pub list_page_size: usize,
    /// Digits an owner's telephone must have
    pub telephone_digits: usize,
    /// Message rendered for uncharted failures
    pub internal_error_message: String,
    /// Message rendered when a request body fails to bind
    pub request_validation_message: String,
    /// Message rendered when a form fails to bind
    pub form_validation_message: String,
}

impl Default for ClinicConfig {
    fn default() -> Self {
        Self {
            search_page_size: 5,
            list_page_size: 10,
            telephone_digits: DEFAULT_TELEPHONE_DIGITS,
            internal_error_message: "An unexpected error occurred".to_string(),
            request_validation_message: "Validation failed for request".to_string(),
            form_validation_message: "Form validation failed".to_string(),
        }
    }
}
