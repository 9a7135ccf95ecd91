// Copyright 2025 Cowboy AI, LLC.

//! Rendering failures as uniform error reports
//!
//! Every failure reaching the outer surface becomes exactly one
//! [`ErrorReport`] plus a [`ResponseClass`]. Charted failures keep their
//! code, message and timestamp. Uncharted failures are logged in full and
//! rendered with a generic message only.

use crate::config::ClinicConfig;
use crate::errors::{now, ClinicError};
use crate::services::ServiceError;
use crate::validation::ValidationFailures;
use chrono::NaiveDateTime;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::error::Error as StdError;
use tracing::{debug, error, warn};

/// Error code of a failed request or form binding
pub const VALIDATION_ERROR: &str = "VALIDATION_ERROR";
/// Error code of an uncharted failure
pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";

/// Response class of a rendered failure
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResponseClass {
    /// The addressed record does not exist
    NotFound,
    /// The input or the requested change was rejected
    BadRequest,
    /// The failure was not charted
    InternalError,
}

impl ResponseClass {
    /// HTTP status code for this class
    pub fn status_code(&self) -> u16 {
        match self {
            ResponseClass::NotFound => 404,
            ResponseClass::BadRequest => 400,
            ResponseClass::InternalError => 500,
        }
    }
}

/// Where a generic binding failure came from
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingSource {
    /// A structured request body
    RequestBody,
    /// A submitted form
    Form,
}

/// One field entry of an [`ErrorReport`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct FieldErrorEntry {
    /// Wire name of the field
    pub field: String,
    /// Message for this field
    pub message: String,
    /// Raw rejected value, when the binding layer captured one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rejected_value: Option<String>,
}

/// The externally visible error document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "camelCase")]
pub struct ErrorReport {
    /// Stable machine code
    pub error_code: String,
    /// Human-readable message
    pub message: String,
    /// Local time, rendered as `yyyy-MM-dd'T'HH:mm:ss`
    #[serde(with = "report_timestamp")]
    #[schemars(with = "String")]
    pub timestamp: NaiveDateTime,
    /// Request path
    pub path: String,
    /// Offending fields, present only for validation failures
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub field_errors: Option<Vec<FieldErrorEntry>>,
}

impl ErrorReport {
    /// JSON schema of the report document
    pub fn json_schema() -> schemars::schema::RootSchema {
        schemars::schema_for!(ErrorReport)
    }
}

mod report_timestamp {
    use chrono::NaiveDateTime;
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

    pub fn serialize<S: Serializer>(value: &NaiveDateTime, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(&value.format(FORMAT))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<NaiveDateTime, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT).map_err(serde::de::Error::custom)
    }
}

/// A rendered failure
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    /// Response class
    pub class: ResponseClass,
    /// Report body
    pub report: ErrorReport,
}

impl ErrorResponse {
    /// HTTP status code of the response class
    pub fn status_code(&self) -> u16 {
        self.class.status_code()
    }
}

/// Strip a leading `uri=` from a request description
pub fn request_path(description: &str) -> &str {
    description.strip_prefix("uri=").unwrap_or(description)
}

/// Maps failures to [`ErrorResponse`]s
#[derive(Debug, Clone)]
pub struct ErrorResponseMapper {
    internal_error_message: String,
    request_validation_message: String,
    form_validation_message: String,
}

impl ErrorResponseMapper {
    /// Create a mapper using the configured message texts
    pub fn new(config: &ClinicConfig) -> Self {
        Self {
            internal_error_message: config.internal_error_message.clone(),
            request_validation_message: config.request_validation_message.clone(),
            form_validation_message: config.form_validation_message.clone(),
        }
    }

    /// Render a charted failure
    pub fn map(&self, err: &ClinicError, path: &str) -> ErrorResponse {
        let (class, field_errors) = match err {
            ClinicError::NotFound { .. } => {
                warn!(code = err.error_code(), path, "{}", err.message());
                (ResponseClass::NotFound, None)
            }
            ClinicError::FieldValidation { field_errors, .. } => {
                debug!(code = err.error_code(), path, fields = field_errors.len(), "{}", err.message());
                let entries = field_errors
                    .iter()
                    .flat_map(|(field, messages)| {
                        messages.iter().map(move |message| FieldErrorEntry {
                            field: field.clone(),
                            message: message.clone(),
                            rejected_value: None,
                        })
                    })
                    .collect();
                (ResponseClass::BadRequest, Some(entries))
            }
            ClinicError::BusinessRuleViolation { rule_code, .. } => {
                warn!(code = err.error_code(), rule = ?rule_code, path, "{}", err.message());
                (ResponseClass::BadRequest, None)
            }
        };

        ErrorResponse {
            class,
            report: ErrorReport {
                error_code: err.error_code().to_string(),
                message: err.message().to_string(),
                timestamp: err.timestamp(),
                path: path.to_string(),
                field_errors,
            },
        }
    }

    /// Render failures collected while binding a request body or form
    pub fn map_binding_failures(
        &self,
        failures: &ValidationFailures,
        path: &str,
        source: BindingSource,
    ) -> ErrorResponse {
        debug!(path, failures = failures.len(), "binding failed: {}", failures);

        let message = match source {
            BindingSource::RequestBody => &self.request_validation_message,
            BindingSource::Form => &self.form_validation_message,
        };
        let entries = failures
            .iter()
            .map(|failure| FieldErrorEntry {
                field: failure.field.clone(),
                message: failure.message.clone(),
                rejected_value: failure.rejected_value.clone(),
            })
            .collect();

        ErrorResponse {
            class: ResponseClass::BadRequest,
            report: ErrorReport {
                error_code: VALIDATION_ERROR.to_string(),
                message: message.clone(),
                timestamp: now(),
                path: path.to_string(),
                field_errors: Some(entries),
            },
        }
    }

    /// Render an uncharted failure without exposing any detail
    pub fn map_unexpected(&self, err: &(dyn StdError + 'static), path: &str) -> ErrorResponse {
        error!(path, chain = %cause_chain(err), "unexpected failure: {}", err);

        ErrorResponse {
            class: ResponseClass::InternalError,
            report: ErrorReport {
                error_code: INTERNAL_ERROR.to_string(),
                message: self.internal_error_message.clone(),
                timestamp: now(),
                path: path.to_string(),
                field_errors: None,
            },
        }
    }

    /// Render any failure a service can return
    pub fn map_service_error(&self, err: &ServiceError, path: &str) -> ErrorResponse {
        match err {
            ServiceError::Domain(domain) => self.map(domain, path),
            ServiceError::Invalid(failures) => {
                self.map_binding_failures(failures, path, BindingSource::RequestBody)
            }
            ServiceError::Storage(storage) => self.map_unexpected(storage, path),
        }
    }
}

impl Default for ErrorResponseMapper {
    fn default() -> Self {
        Self::new(&ClinicConfig::default())
    }
}

fn cause_chain(err: &(dyn StdError + 'static)) -> String {
    let mut chain = vec![err.to_string()];
    let mut current = err.source();
    while let Some(cause) = current {
        chain.push(cause.to_string());
        current = cause.source();
    }
    chain.join(" <- ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::FieldErrors;
    use crate::validation::ValidationFailure;
    use pretty_assertions::assert_eq;
    use serde_json::json;
    use std::io;
    use test_case::test_case;

    fn mapper() -> ErrorResponseMapper {
        ErrorResponseMapper::default()
    }

    #[test]
    fn test_not_found_has_no_field_list() {
        let err = ClinicError::owner_not_found(999);
        let response = mapper().map(&err, "/api/owners/999");

        assert_eq!(response.status_code(), 404);
        assert_eq!(response.report.error_code, "OWNER_NOT_FOUND");
        assert!(response.report.message.contains("999"));
        assert_eq!(response.report.timestamp, err.timestamp());
        assert_eq!(response.report.field_errors, None);
    }

    #[test]
    fn test_field_validation_flattens_in_order() {
        let mut fields = FieldErrors::new();
        fields.insert("firstName".into(), vec!["required".into()]);
        fields.insert("telephone".into(), vec!["bad format".into(), "too long".into()]);
        let err = ClinicError::owner_validation("Invalid owner", fields);

        let response = mapper().map(&err, "/owners/new");
        let entries: Vec<(String, String)> = response
            .report
            .field_errors
            .unwrap()
            .into_iter()
            .map(|e| (e.field, e.message))
            .collect();

        assert_eq!(response.class, ResponseClass::BadRequest);
        assert_eq!(
            entries,
            vec![
                ("firstName".to_string(), "required".to_string()),
                ("telephone".to_string(), "bad format".to_string()),
                ("telephone".to_string(), "too long".to_string()),
            ]
        );
    }

    #[test]
    fn test_field_validation_without_fields_renders_empty_list() {
        let err = ClinicError::pet_validation("Invalid pet", FieldErrors::new(), Some(3));
        let response = mapper().map(&err, "/pets/3");
        assert_eq!(response.report.field_errors, Some(vec![]));
    }

    #[test]
    fn test_business_rule_is_bad_request() {
        let err = ClinicError::business_rule_with_code("Pet too old", "AGE_LIMIT");
        let response = mapper().map(&err, "/pets");

        assert_eq!(response.status_code(), 400);
        assert_eq!(response.report.error_code, "BUSINESS_RULE_VIOLATION");
        assert_eq!(response.report.field_errors, None);
    }

    #[test]
    fn test_mapping_leaves_error_untouched() {
        let err = ClinicError::pet_not_found(5).with_cause(io::Error::new(io::ErrorKind::Other, "db"));
        let before = err.describe();
        let _ = mapper().map(&err, "/pets/5");
        assert_eq!(err.describe(), before);
        assert!(err.cause().is_some());
    }

    #[test_case(BindingSource::RequestBody, "Validation failed for request" ; "request body")]
    #[test_case(BindingSource::Form, "Form validation failed" ; "form")]
    fn test_binding_failures_carry_rejected_values(source: BindingSource, message: &str) {
        let mut failures = ValidationFailures::new();
        failures.push(ValidationFailure::new("telephone", "pattern", "bad").rejecting("12-34"));
        failures.push(ValidationFailure::required("city"));

        let response = mapper().map_binding_failures(&failures, "/owners", source);

        assert_eq!(response.status_code(), 400);
        assert_eq!(response.report.error_code, VALIDATION_ERROR);
        assert_eq!(response.report.message, message);
        assert_eq!(
            response.report.field_errors.unwrap(),
            vec![
                FieldErrorEntry {
                    field: "telephone".into(),
                    message: "bad".into(),
                    rejected_value: Some("12-34".into()),
                },
                FieldErrorEntry {
                    field: "city".into(),
                    message: "required".into(),
                    rejected_value: None,
                },
            ]
        );
    }

    #[test]
    fn test_unexpected_hides_detail() {
        let err = io::Error::new(io::ErrorKind::Other, "password=hunter2");
        let response = mapper().map_unexpected(&err, "/owners");

        assert_eq!(response.status_code(), 500);
        assert_eq!(response.report.error_code, INTERNAL_ERROR);
        assert_eq!(response.report.message, "An unexpected error occurred");
        assert!(!serde_json::to_string(&response.report).unwrap().contains("hunter2"));
    }

    #[test]
    fn test_configured_messages_are_used() {
        let config = ClinicConfig {
            internal_error_message: "Try again later".into(),
            ..ClinicConfig::default()
        };
        let err = io::Error::new(io::ErrorKind::Other, "boom");
        let response = ErrorResponseMapper::new(&config).map_unexpected(&err, "/");
        assert_eq!(response.report.message, "Try again later");
    }

    #[test_case("uri=/owners/1", "/owners/1" ; "prefixed")]
    #[test_case("/owners/1", "/owners/1" ; "bare")]
    #[test_case("uri=", "" ; "empty path")]
    fn test_request_path(description: &str, expected: &str) {
        assert_eq!(request_path(description), expected);
    }

    #[test]
    fn test_report_wire_shape() {
        let report = ErrorReport {
            error_code: "OWNER_NOT_FOUND".into(),
            message: "gone".into(),
            timestamp: chrono::NaiveDate::from_ymd_opt(2024, 3, 9)
                .unwrap()
                .and_hms_milli_opt(8, 5, 7, 250)
                .unwrap(),
            path: "/owners/1".into(),
            field_errors: None,
        };

        assert_eq!(
            serde_json::to_value(&report).unwrap(),
            json!({
                "errorCode": "OWNER_NOT_FOUND",
                "message": "gone",
                "timestamp": "2024-03-09T08:05:07",
                "path": "/owners/1"
            })
        );
    }

    #[test]
    fn test_report_reads_back() {
        let raw = json!({
            "errorCode": "VALIDATION_ERROR",
            "message": "Form validation failed",
            "timestamp": "2024-03-09T08:05:07",
            "path": "/owners",
            "fieldErrors": [{ "field": "city", "message": "required" }]
        });

        let report: ErrorReport = serde_json::from_value(raw).unwrap();
        assert_eq!(report.field_errors.unwrap()[0].rejected_value, None);
    }

    #[test]
    fn test_schema_names_wire_fields() {
        let schema = serde_json::to_value(ErrorReport::json_schema()).unwrap();
        let properties = schema["properties"].as_object().unwrap();

        for key in ["errorCode", "message", "timestamp", "path", "fieldErrors"] {
            assert!(properties.contains_key(key), "missing {key}");
        }
    }
}
