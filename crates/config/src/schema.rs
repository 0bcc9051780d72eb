use jsonschema::Validator;
use serde_json::Value;
use std::fmt;
use std::sync::LazyLock;
use thiserror::Error;

const SCHEMA_JSON: &str = include_str!("../../../assets/hostdir.schema.json");

/// A validation error with path and message.
#[derive(Debug, Clone)]
pub struct ValidationError {
    pub path: String,
    pub message: String,
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.path.is_empty() {
            write!(f, "{}", self.message)
        } else {
            write!(f, "{}: {}", self.path, self.message)
        }
    }
}

/// Result of config validation.
#[derive(Debug)]
pub enum ValidationResult {
    Valid,
    Invalid(Vec<ValidationError>),
}

/// Error type for config parsing.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("validation failed: {}", format_validation_errors(.0))]
    ValidationFailed(Vec<ValidationError>),
}

fn format_validation_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

static VALIDATOR: LazyLock<Validator> = LazyLock::new(|| {
    let schema: Value =
        serde_json::from_str(SCHEMA_JSON).expect("embedded schema should be valid JSON");
    Validator::new(&schema).expect("embedded schema should be a valid JSON Schema")
});

/// Checks a JSON value against the config schema, collecting every
/// violation rather than stopping at the first.
///
/// # Panics
///
/// Panics on first use if the embedded schema is broken.
pub fn validate(value: &Value) -> ValidationResult {
    let errors: Vec<_> = VALIDATOR
        .iter_errors(value)
        .map(|e| ValidationError {
            path: e.instance_path.to_string(),
            message: e.to_string(),
        })
        .collect();

    if errors.is_empty() {
        ValidationResult::Valid
    } else {
        ValidationResult::Invalid(errors)
    }
}
