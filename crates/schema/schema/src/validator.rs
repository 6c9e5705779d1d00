//! Compiled schema validation.
//!
//! A schema document fetched from the registry is compiled once into a
//! [`CompiledSchema`] and reused for every payload submitted under that
//! subject. Validation never fails as an operation; it reports pass/fail
//! plus structured errors.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::{SchemaError, SchemaResult};

/// A schema compiled into a reusable validation predicate.
#[derive(Debug)]
pub struct CompiledSchema {
    validator: jsonschema::Validator,
}

impl CompiledSchema {
    /// Compiles a schema document for a subject.
    ///
    /// Fails with [`SchemaError::SchemaCompileError`] if the document is
    /// structurally invalid.
    pub fn compile(subject: &str, schema: &Value) -> SchemaResult<Self> {
        let validator =
            jsonschema::validator_for(schema).map_err(|e| SchemaError::SchemaCompileError {
                subject: subject.to_string(),
                reason: e.to_string(),
            })?;

        Ok(Self { validator })
    }

    /// Validates a payload, reporting every rule violation.
    ///
    /// Errors are produced in the order the underlying validator reports
    /// them; that order is not guaranteed stable across schema versions.
    pub fn validate(&self, payload: &Value) -> ValidationReport {
        let errors: Vec<ValidationError> = self
            .validator
            .iter_errors(payload)
            .map(|err| ValidationError {
                message: err.to_string(),
                path: err.instance_path.to_string(),
            })
            .collect();

        if errors.is_empty() {
            ValidationReport::valid()
        } else {
            ValidationReport::invalid(errors)
        }
    }

    /// Fast pass/fail check without collecting errors.
    pub fn is_valid(&self, payload: &Value) -> bool {
        self.validator.is_valid(payload)
    }
}

/// Result of validating one payload.
#[derive(Debug, Clone)]
pub struct ValidationReport {
    pub valid: bool,
    pub errors: Vec<ValidationError>,
}

impl ValidationReport {
    pub fn valid() -> Self {
        Self {
            valid: true,
            errors: vec![],
        }
    }

    pub fn invalid(errors: Vec<ValidationError>) -> Self {
        Self {
            valid: false,
            errors,
        }
    }

    pub fn is_valid(&self) -> bool {
        self.valid
    }
}

/// One schema-rule violation.
///
/// `path` is a JSON Pointer into the payload (`"/amount"`, `""` for the
/// payload root).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ValidationError {
    pub message: String,
    pub path: String,
}
