//! Declarative validation of untyped JSON records.
//!
//! A [`ValidateFn`] holds an ordered list of fields, each with an ordered list of
//! [`Validator`]s. Every validator of every field runs; failures are collected as
//! [`ErrorConfig`]s and returned in field declaration order. Validation outcomes are never
//! returned as errors: a validator that fails to run (returns `Err`) is recorded as a
//! `validation_error` entry for its field.
//!
//! Fields are evaluated concurrently. Validators of one field run sequentially in declaration
//! order and do not short-circuit, so later validators may assume nothing about earlier results.
use async_trait::async_trait;
use chrono::DateTime;
use futures::future::join_all;
use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;
use thiserror::Error;

/// The outcome of a single validator on a single value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Check {
    Valid,
    Invalid { message: String },
}

impl Check {
    pub fn invalid(message: impl Into<String>) -> Self {
        Check::Invalid {
            message: message.into(),
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Check::Valid)
    }
}

/// A validator that could not run to completion, e.g. a failing collaborator.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ValidatorError(pub String);

/// Validates a field `value` (`None` when absent) of a `record`.
#[async_trait]
pub trait Validator: Send + Sync {
    async fn validate(&self, value: Option<&Value>, record: &Value) -> Result<Check, ValidatorError>;
}

/// A shareable validator.
pub type FieldValidator = Arc<dyn Validator>;

#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    /// A field failed a declared rule.
    InvalidParam,
    /// A validator failed to run.
    ValidationError,
}

/// A single validation failure.
#[derive(Serialize, Debug, Clone, PartialEq, Eq)]
pub struct ErrorConfig {
    pub kind: ErrorKind,
    pub key: String,
    pub message: String,
}

impl ErrorConfig {
    pub fn invalid_param(key: &str, message: &str) -> Self {
        Self {
            kind: ErrorKind::InvalidParam,
            key: key.to_string(),
            message: message.to_string(),
        }
    }

    pub fn validation_error(key: &str, message: &str) -> Self {
        Self {
            kind: ErrorKind::ValidationError,
            key: key.to_string(),
            message: message.to_string(),
        }
    }
}

impl fmt::Display for ErrorConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.key, self.message)
    }
}

/// The result of validating a record.
#[derive(Serialize, Debug, Clone, PartialEq)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ValidationResult<T> {
    Valid { data: T },
    Invalid { errors: Vec<ErrorConfig> },
}

impl<T> ValidationResult<T> {
    pub fn is_valid(&self) -> bool {
        matches!(self, ValidationResult::Valid { .. })
    }

    /// The collected errors; empty when valid.
    pub fn errors(&self) -> &[ErrorConfig] {
        match self {
            ValidationResult::Valid { .. } => &[],
            ValidationResult::Invalid { errors } => errors,
        }
    }

    /// Converts into a `Result`, for callers that treat invalid records as errors.
    pub fn into_result(self) -> Result<T, Vec<ErrorConfig>> {
        match self {
            ValidationResult::Valid { data } => Ok(data),
            ValidationResult::Invalid { errors } => Err(errors),
        }
    }
}

impl ValidationResult<Value> {
    /// Reads valid data into a typed model. Data that passed every rule but does not fit the
    /// model becomes a single `validation_error` keyed on `key`.
    pub fn parse<T: DeserializeOwned>(self, key: &str) -> ValidationResult<T> {
        match self {
            ValidationResult::Valid { data } => match serde_json::from_value(data) {
                Ok(data) => ValidationResult::Valid { data },
                Err(err) => ValidationResult::Invalid {
                    errors: vec![ErrorConfig::validation_error(key, &err.to_string())],
                },
            },
            ValidationResult::Invalid { errors } => ValidationResult::Invalid { errors },
        }
    }
}

/// Joins errors into the lines of a single message.
pub fn join_errors(errors: &[ErrorConfig]) -> String {
    errors
        .iter()
        .map(ErrorConfig::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}

/// A validation function over a fixed, ordered set of fields.
pub struct ValidateFn {
    fields: Vec<(String, Vec<FieldValidator>)>,
}

/// Generates a validation function from `(field, validators)` pairs.
pub fn gen_validate_fn(fields: Vec<(&str, Vec<FieldValidator>)>) -> ValidateFn {
    ValidateFn {
        fields: fields
            .into_iter()
            .map(|(key, validators)| (key.to_string(), validators))
            .collect(),
    }
}

impl ValidateFn {
    /// Runs every validator of every field against `data`.
    pub async fn validate(&self, data: &Value) -> ValidationResult<Value> {
        let field_errors = join_all(self.fields.iter().map(|(key, validators)| async move {
            let value = data.get(key.as_str());
            let mut errors = vec![];
            for validator in validators {
                match validator.validate(value, data).await {
                    Ok(Check::Valid) => {}
                    Ok(Check::Invalid { message }) => {
                        errors.push(ErrorConfig::invalid_param(key, &message))
                    }
                    Err(err) => errors.push(ErrorConfig::validation_error(key, &err.to_string())),
                }
            }
            errors
        }))
        .await;

        let errors: Vec<ErrorConfig> = field_errors.into_iter().flatten().collect();
        if errors.is_empty() {
            ValidationResult::Valid { data: data.clone() }
        } else {
            ValidationResult::Invalid { errors }
        }
    }
}

/// A validation function used as the validator of a nested object field: the nested errors fold
/// into one message, one line per nested error.
#[async_trait]
impl Validator for ValidateFn {
    async fn validate(&self, value: Option<&Value>, _record: &Value) -> Result<Check, ValidatorError> {
        match value {
            Some(value @ Value::Object(_)) => Ok(match ValidateFn::validate(self, value).await {
                ValidationResult::Valid { .. } => Check::Valid,
                ValidationResult::Invalid { errors } => Check::invalid(join_errors(&errors)),
            }),
            _ => Ok(Check::invalid("Expected an object")),
        }
    }
}

/// Wraps a validation function as a nested-object validator.
pub fn nested(validate_fn: ValidateFn) -> FieldValidator {
    Arc::new(validate_fn)
}

struct FnValidator<F>(F);

#[async_trait]
impl<F> Validator for FnValidator<F>
where
    F: Fn(Option<&Value>, &Value) -> Check + Send + Sync,
{
    async fn validate(&self, value: Option<&Value>, record: &Value) -> Result<Check, ValidatorError> {
        Ok((self.0)(value, record))
    }
}

/// Adapts a synchronous, infallible closure into a validator.
pub fn check<F>(f: F) -> FieldValidator
where
    F: Fn(Option<&Value>, &Value) -> Check + Send + Sync + 'static,
{
    Arc::new(FnValidator(f))
}

/// JSON value types.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JsonType {
    String,
    Number,
    Boolean,
    Object,
    Array,
    Null,
}

impl JsonType {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::String(_) => JsonType::String,
            Value::Number(_) => JsonType::Number,
            Value::Bool(_) => JsonType::Boolean,
            Value::Object(_) => JsonType::Object,
            Value::Array(_) => JsonType::Array,
            Value::Null => JsonType::Null,
        }
    }
}

impl fmt::Display for JsonType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            JsonType::String => "string",
            JsonType::Number => "number",
            JsonType::Boolean => "boolean",
            JsonType::Object => "object",
            JsonType::Array => "array",
            JsonType::Null => "null",
        };
        f.write_str(name)
    }
}

/// Passes if the value is present and of one of `types`.
pub fn is_type_of(types: &[JsonType]) -> FieldValidator {
    let types = types.to_vec();
    check(move |value, _| match value {
        Some(value) if types.contains(&JsonType::of(value)) => Check::Valid,
        _ => Check::invalid(format!(
            "Expected type {}",
            types
                .iter()
                .map(|t| format!("\"{t}\""))
                .collect::<Vec<_>>()
                .join(" or ")
        )),
    })
}

struct UndefinedOr(FieldValidator);

#[async_trait]
impl Validator for UndefinedOr {
    async fn validate(&self, value: Option<&Value>, record: &Value) -> Result<Check, ValidatorError> {
        match value {
            None => Ok(Check::Valid),
            Some(_) => self.0.validate(value, record).await,
        }
    }
}

/// Passes if the value is absent, otherwise delegates.
pub fn is_undefined_or(validator: FieldValidator) -> FieldValidator {
    Arc::new(UndefinedOr(validator))
}

struct ArrayOf {
    validator: FieldValidator,
    allow_empty: bool,
}

#[async_trait]
impl Validator for ArrayOf {
    async fn validate(&self, value: Option<&Value>, record: &Value) -> Result<Check, ValidatorError> {
        let items = match value {
            Some(Value::Array(items)) => items,
            _ => return Ok(Check::invalid("Expected an array")),
        };
        if items.is_empty() && !self.allow_empty {
            return Ok(Check::invalid("Expected a non-empty array"));
        }
        let mut messages = vec![];
        for (index, item) in items.iter().enumerate() {
            match self.validator.validate(Some(item), record).await {
                Ok(Check::Valid) => {}
                Ok(Check::Invalid { message }) => messages.push(format!("[{index}] {message}")),
                Err(err) => messages.push(format!("[{index}] {err}")),
            }
        }
        if messages.is_empty() {
            Ok(Check::Valid)
        } else {
            Ok(Check::invalid(messages.join("\n")))
        }
    }
}

/// Passes if the value is a non-empty array whose every element passes `validator`.
pub fn is_array_of(validator: FieldValidator) -> FieldValidator {
    Arc::new(ArrayOf {
        validator,
        allow_empty: false,
    })
}

/// As [`is_array_of`], but an empty array passes.
pub fn is_array_of_or_empty(validator: FieldValidator) -> FieldValidator {
    Arc::new(ArrayOf {
        validator,
        allow_empty: true,
    })
}

struct OneOf(Vec<FieldValidator>);

#[async_trait]
impl Validator for OneOf {
    async fn validate(&self, value: Option<&Value>, record: &Value) -> Result<Check, ValidatorError> {
        let mut messages = vec![];
        for validator in &self.0 {
            match validator.validate(value, record).await {
                Ok(Check::Valid) => return Ok(Check::Valid),
                Ok(Check::Invalid { message }) => messages.push(message),
                Err(err) => messages.push(err.to_string()),
            }
        }
        Ok(Check::invalid(messages.join("\n")))
    }
}

/// Passes if any of `validators` passes; otherwise reports every failure.
pub fn is_one_of(validators: Vec<FieldValidator>) -> FieldValidator {
    Arc::new(OneOf(validators))
}

struct OneOrManyOf(FieldValidator);

#[async_trait]
impl Validator for OneOrManyOf {
    async fn validate(&self, value: Option<&Value>, record: &Value) -> Result<Check, ValidatorError> {
        match value {
            Some(Value::Array(_)) => {
                ArrayOf {
                    validator: self.0.clone(),
                    allow_empty: false,
                }
                .validate(value, record)
                .await
            }
            _ => self.0.validate(value, record).await,
        }
    }
}

/// Passes if the value passes `validator`, or is a non-empty array whose every element does.
pub fn is_one_or_many_of(validator: FieldValidator) -> FieldValidator {
    Arc::new(OneOrManyOf(validator))
}

struct AllOf(Vec<FieldValidator>);

#[async_trait]
impl Validator for AllOf {
    async fn validate(&self, value: Option<&Value>, record: &Value) -> Result<Check, ValidatorError> {
        for validator in &self.0 {
            let result = validator.validate(value, record).await?;
            if !result.is_valid() {
                return Ok(result);
            }
        }
        Ok(Check::Valid)
    }
}

/// Passes if all of `validators` pass, stopping at the first failure.
pub fn all_of(validators: Vec<FieldValidator>) -> FieldValidator {
    Arc::new(AllOf(validators))
}

/// Passes if the value equals one of `values`.
pub fn is_enum(values: Vec<Value>) -> FieldValidator {
    check(move |value, _| match value {
        Some(value) if values.contains(value) => Check::Valid,
        _ => Check::invalid(format!(
            "Expected one of: {}",
            values
                .iter()
                .map(Value::to_string)
                .collect::<Vec<_>>()
                .join(", ")
        )),
    })
}

/// Passes if the value is an array containing `item`.
pub fn is_array_including(item: Value) -> FieldValidator {
    check(move |value, _| match value {
        Some(Value::Array(items)) if items.contains(&item) => Check::Valid,
        _ => Check::invalid(format!("Expected an array including {item}")),
    })
}

/// Passes if the value is a string with at least one character.
pub fn is_non_empty_string() -> FieldValidator {
    check(|value, _| match value {
        Some(Value::String(s)) if !s.is_empty() => Check::Valid,
        _ => Check::invalid("Expected non empty string"),
    })
}

/// Passes if the value is a string starting with `prefix`.
pub fn starts_with(prefix: &str) -> FieldValidator {
    let prefix = prefix.to_string();
    check(move |value, _| match value {
        Some(Value::String(s)) if s.starts_with(&prefix) => Check::Valid,
        _ => Check::invalid(format!("Expected to start with \"{prefix}\"")),
    })
}

/// Passes if the value is a string holding an absolute URI.
pub fn is_absolute_uri() -> FieldValidator {
    check(|value, _| match value {
        Some(Value::String(s)) if crate::utils::is_absolute_uri(s) => Check::Valid,
        _ => Check::invalid("Expected absolute URI"),
    })
}

/// Passes if the value is an RFC 3339 date-time string.
pub fn is_date_time() -> FieldValidator {
    check(|value, _| match value {
        Some(Value::String(s)) if DateTime::parse_from_rfc3339(s).is_ok() => Check::Valid,
        _ => Check::invalid("Expected ISO 8601 date-time"),
    })
}
