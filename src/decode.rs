//! Turns raw API responses into typed records or typed errors.
//!
//! Decoding runs in a fixed order:
//!
//! 1. The body is parsed as JSON. Anything that is not JSON becomes
//!    [`Error::MalformedResponse`], whatever the status code.
//! 2. Non-2xx statuses are mapped through [`Error::from_status`].
//! 3. A `{"success": .., "data": .., "error": ..}` envelope is unwrapped. An envelope
//!    reporting `"success": false` becomes [`Error::Api`].
//! 4. The payload is checked against the record's [`Schema`]. Missing or mistyped required
//!    fields and unknown enum values become [`Error::Validation`] naming the field.
//! 5. The payload is deserialized. Unknown keys are ignored.
//! 6. The record's own invariants are checked via [`Record::check`].

use crate::error::ApiErrorBody;
use crate::{Error, RawResponse, Result};
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

/// The JSON shape a field must have.
#[derive(Debug, Clone, Copy)]
pub enum Kind {
    /// A JSON string.
    String,
    /// Any JSON number.
    Number,
    /// A JSON number without a fractional part.
    Integer,
    /// `true` or `false`.
    Boolean,
    /// A JSON object with arbitrary contents.
    Object,
    /// A JSON array with arbitrary contents.
    Array,
    /// A string drawn from a closed set of values.
    Enum(&'static [&'static str]),
    /// An object matching the given schema.
    Nested(&'static Schema),
    /// An array whose items each match the given schema.
    ListOf(&'static Schema),
    /// An object whose values each match the given schema.
    MapOf(&'static Schema),
}

/// One field of a [`Schema`].
#[derive(Debug, Clone, Copy)]
pub struct FieldSpec {
    /// The JSON key.
    pub name: &'static str,
    /// The expected shape.
    pub kind: Kind,
    /// Whether the key must be present and non-null.
    pub required: bool,
}

impl FieldSpec {
    /// A field that must be present and non-null.
    pub const fn required(name: &'static str, kind: Kind) -> Self {
        Self {
            name,
            kind,
            required: true,
        }
    }

    /// A field that is checked only when present and non-null.
    pub const fn optional(name: &'static str, kind: Kind) -> Self {
        Self {
            name,
            kind,
            required: false,
        }
    }
}

/// The declared shape of a record type.
///
/// Fields not listed here are not checked before deserialization; unknown keys in the
/// payload are ignored.
#[derive(Debug)]
pub struct Schema {
    /// Name of the record, used in error messages.
    pub record: &'static str,
    /// The checked fields.
    pub fields: &'static [FieldSpec],
}

/// A record-level problem found while decoding.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    /// Dotted path of the offending field, e.g. `stages[1].prompt`.
    pub field: String,
    /// What was wrong with it.
    pub message: String,
}

impl Violation {
    /// Creates a new `Violation`.
    pub fn new(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            field: field.into(),
            message: message.into(),
        }
    }
}

/// A type that can be decoded from an API response.
pub trait Record: DeserializeOwned {
    /// The shape the payload must have.
    fn schema() -> &'static Schema;

    /// Checks invariants that span several fields. Runs after deserialization.
    fn check(&self) -> std::result::Result<(), Violation> {
        Ok(())
    }
}

/// Decodes a response into a single record.
///
/// # Examples
///
/// ```
/// use callwhiz::{decode, RawResponse, SimpleCredits};
/// use http::{HeaderMap, StatusCode};
/// use std::time::Duration;
///
/// let raw = RawResponse::new(
///     StatusCode::OK,
///     HeaderMap::new(),
///     r#"{"success": true, "data": {"credits_remaining": 42.5}}"#.to_string(),
///     Duration::ZERO,
/// );
///
/// let credits: SimpleCredits = decode::decode(&raw).unwrap();
/// assert_eq!(credits.credits_remaining, 42.5);
/// ```
pub fn decode<T: Record>(raw: &RawResponse) -> Result<T> {
    let payload = payload(raw)?.ok_or_else(|| missing_payload(raw))?;
    decode_value(raw, payload, "")
}

/// Decodes a response whose payload is a JSON array of records.
///
/// Validation errors name the offending item by index, e.g. `[2].id`.
pub fn decode_list<T: Record>(raw: &RawResponse) -> Result<Vec<T>> {
    let payload = payload(raw)?.ok_or_else(|| missing_payload(raw))?;

    let items = match payload {
        Value::Array(items) => items,
        other => {
            return Err(shape_error(
                raw,
                Violation::new(
                    T::schema().record,
                    format!("expected an array of records, got {}", type_name(&other)),
                ),
            ))
        }
    };

    items
        .into_iter()
        .enumerate()
        .map(|(index, item)| decode_value(raw, item, &format!("[{index}]")))
        .collect()
}

/// Checks a response that carries no record, such as the reply to a delete.
///
/// Error statuses, malformed bodies and failed envelopes are still reported.
pub fn decode_empty(raw: &RawResponse) -> Result<()> {
    payload(raw).map(|_| ())
}

fn decode_value<T: Record>(raw: &RawResponse, value: Value, prefix: &str) -> Result<T> {
    check_shape(&value, T::schema(), prefix).map_err(|v| shape_error(raw, v))?;

    let record: T = serde_json::from_value(value).map_err(|e| {
        let field = missing_field_name(&e.to_string())
            .map(|name| join(prefix, name))
            .unwrap_or_else(|| {
                if prefix.is_empty() {
                    T::schema().record.to_string()
                } else {
                    prefix.to_string()
                }
            });
        shape_error(raw, Violation::new(field, e.to_string()))
    })?;

    record.check().map_err(|v| {
        shape_error(
            raw,
            Violation::new(join(prefix, &v.field), v.message),
        )
    })?;

    Ok(record)
}

/// Parses the body, maps error statuses and unwraps the envelope.
///
/// Returns `None` when the response legitimately carried no payload.
fn payload(raw: &RawResponse) -> Result<Option<Value>> {
    let parsed = if raw.is_empty() {
        None
    } else {
        match serde_json::from_str::<Value>(&raw.body) {
            Ok(value) => Some(value),
            Err(e) => {
                tracing::error!(
                    error = %e,
                    status = raw.status.as_u16(),
                    raw_response = %raw.body,
                    "Response body is not valid JSON"
                );
                return Err(Error::MalformedResponse {
                    raw_response: raw.body.clone(),
                    serde_error: e.to_string(),
                    status: raw.status,
                });
            }
        }
    };

    if !raw.is_success() {
        return Err(Error::from_status(
            raw.status,
            &raw.headers,
            &raw.body,
            parsed.as_ref(),
        ));
    }

    match parsed {
        Some(value) => unwrap_envelope(raw, value),
        None => Ok(None),
    }
}

fn unwrap_envelope(raw: &RawResponse, value: Value) -> Result<Option<Value>> {
    let mut map = match value {
        Value::Object(map) if matches!(map.get("success"), Some(Value::Bool(_))) => map,
        other => return Ok(Some(other)),
    };

    if map.get("success") == Some(&Value::Bool(false)) {
        let body = ApiErrorBody::from_value(&Value::Object(map));
        let message = body
            .message()
            .unwrap_or_else(|| "Unknown error".to_string());
        tracing::error!(
            status = raw.status.as_u16(),
            code = ?body.code(),
            message = %message,
            "API reported failure"
        );
        return Err(Error::Api {
            status: raw.status,
            code: body.code(),
            message,
            raw_response: raw.body.clone(),
        });
    }

    Ok(map.remove("data"))
}

fn missing_payload(raw: &RawResponse) -> Error {
    if raw.is_empty() {
        Error::MalformedResponse {
            raw_response: raw.body.clone(),
            serde_error: "expected a JSON body, got an empty response".to_string(),
            status: raw.status,
        }
    } else {
        shape_error(raw, Violation::new("data", "missing required field"))
    }
}

fn shape_error(raw: &RawResponse, violation: Violation) -> Error {
    tracing::error!(
        field = %violation.field,
        error = %violation.message,
        raw_response = %raw.body,
        "Response does not match the expected shape"
    );

    Error::Validation {
        field: Some(violation.field),
        message: violation.message,
        status: Some(raw.status),
        raw_response: Some(raw.body.clone()),
    }
}

/// Checks `value` against `schema`. `prefix` is the path of `value` itself.
pub(crate) fn check_shape(
    value: &Value,
    schema: &Schema,
    prefix: &str,
) -> std::result::Result<(), Violation> {
    let object = match value {
        Value::Object(object) => object,
        other => {
            let field = if prefix.is_empty() {
                schema.record
            } else {
                prefix
            };
            return Err(Violation::new(
                field,
                format!("expected {} object, got {}", schema.record, type_name(other)),
            ));
        }
    };

    for field in schema.fields {
        let path = join(prefix, field.name);
        match object.get(field.name) {
            None if field.required => {
                return Err(Violation::new(path, "missing required field"));
            }
            Some(Value::Null) if field.required => {
                return Err(Violation::new(path, "required field is null"));
            }
            None | Some(Value::Null) => {}
            Some(found) => check_kind(found, field.kind, &path)?,
        }
    }

    Ok(())
}

fn check_kind(value: &Value, kind: Kind, path: &str) -> std::result::Result<(), Violation> {
    let expected = match kind {
        Kind::String if value.is_string() => return Ok(()),
        Kind::Number if value.is_number() => return Ok(()),
        Kind::Integer if value.is_i64() || value.is_u64() => return Ok(()),
        Kind::Boolean if value.is_boolean() => return Ok(()),
        Kind::Object if value.is_object() => return Ok(()),
        Kind::Array if value.is_array() => return Ok(()),
        Kind::Enum(allowed) => {
            return match value.as_str() {
                Some(found) if allowed.contains(&found) => Ok(()),
                Some(found) => Err(Violation::new(
                    path,
                    format!(
                        "unknown value `{}`, expected one of: {}",
                        found,
                        allowed.join(", ")
                    ),
                )),
                None => Err(Violation::new(
                    path,
                    format!("expected string, got {}", type_name(value)),
                )),
            };
        }
        Kind::Nested(schema) => return check_shape(value, schema, path),
        Kind::ListOf(schema) => {
            return match value {
                Value::Array(items) => items
                    .iter()
                    .enumerate()
                    .try_for_each(|(i, item)| check_shape(item, schema, &format!("{path}[{i}]"))),
                other => Err(Violation::new(
                    path,
                    format!("expected array, got {}", type_name(other)),
                )),
            };
        }
        Kind::MapOf(schema) => {
            return match value {
                Value::Object(entries) => check_entries(entries, schema, path),
                other => Err(Violation::new(
                    path,
                    format!("expected object, got {}", type_name(other)),
                )),
            };
        }
        Kind::String => "string",
        Kind::Number => "number",
        Kind::Integer => "integer",
        Kind::Boolean => "boolean",
        Kind::Object => "object",
        Kind::Array => "array",
    };

    Err(Violation::new(
        path,
        format!("expected {}, got {}", expected, type_name(value)),
    ))
}

fn check_entries(
    entries: &Map<String, Value>,
    schema: &Schema,
    path: &str,
) -> std::result::Result<(), Violation> {
    entries
        .iter()
        .try_for_each(|(key, item)| check_shape(item, schema, &join(path, key)))
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}.{name}")
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Pulls `name` out of serde's "missing field `name`" message.
fn missing_field_name(message: &str) -> Option<&str> {
    let rest = message.strip_prefix("missing field `")?;
    rest.split('`').next()
}
