//! Request contract

use std::collections::HashMap;
use std::fmt;

use serde::de::DeserializeOwned;
use serde_json::Value;
use thiserror::Error;
use url::Url;

/// HTTP methods a contract may declare
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// GET request
    Get,
    /// POST request
    Post,
    /// PUT request
    Put,
    /// DELETE request
    Delete,
}

impl HttpMethod {
    /// The wire-level method token
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Post => "POST",
            HttpMethod::Put => "PUT",
            HttpMethod::Delete => "DELETE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declarative description of one HTTP call.
///
/// A contract is pure data: read-only accessors over endpoint, method,
/// headers and body, plus the response shape bound at the type level through
/// [`ApiRequest::Response`]. Any caller-defined type implementing this trait
/// is accepted by [`ApiClient::perform`](crate::ApiClient::perform), which is
/// the extension point for new endpoint types.
///
/// Body priority: a [`raw_body`](ApiRequest::raw_body) is sent verbatim and
/// wins over [`parameters`](ApiRequest::parameters); parameters are
/// JSON-encoded; with neither, the outgoing body is empty.
pub trait ApiRequest: Send + Sync {
    /// The shape a successful response body decodes into
    type Response: DeserializeOwned;

    /// Absolute URL of the resource, or `None` for an unroutable contract
    fn endpoint(&self) -> Option<Url>;

    /// HTTP method for the call
    fn method(&self) -> HttpMethod;

    /// Headers to append to the outgoing request
    fn headers(&self) -> Option<HashMap<String, String>> {
        None
    }

    /// JSON body fields, used only when [`raw_body`](ApiRequest::raw_body) is absent
    fn parameters(&self) -> Option<HashMap<String, ParamValue>> {
        None
    }

    /// Pre-encoded body payload, sent verbatim when present
    fn raw_body(&self) -> Option<Vec<u8>> {
        None
    }
}

/// Loosely typed value for JSON body fields.
///
/// A closed variant covering what a JSON body can carry. Conversion to
/// `serde_json::Value` is explicit via [`ParamValue::to_json`]; the one
/// non-encodable input is a non-finite number, which JSON has no
/// representation for.
#[derive(Debug, Clone, PartialEq)]
pub enum ParamValue {
    /// JSON null
    Null,
    /// Boolean field
    Bool(bool),
    /// Numeric field; must be finite to encode
    Number(f64),
    /// String field
    String(String),
    /// Array of values
    Array(Vec<ParamValue>),
    /// Nested object
    Object(HashMap<String, ParamValue>),
}

impl ParamValue {
    /// Convert into a `serde_json::Value`.
    ///
    /// # Errors
    ///
    /// Returns [`NonFiniteNumber`] when the value (or any nested value) is a
    /// NaN or infinite number.
    pub fn to_json(&self) -> Result<Value, NonFiniteNumber> {
        Ok(match self {
            ParamValue::Null => Value::Null,
            ParamValue::Bool(value) => Value::Bool(*value),
            ParamValue::Number(value) => serde_json::Number::from_f64(*value)
                .map(Value::Number)
                .ok_or(NonFiniteNumber { value: *value })?,
            ParamValue::String(value) => Value::String(value.clone()),
            ParamValue::Array(items) => Value::Array(
                items
                    .iter()
                    .map(ParamValue::to_json)
                    .collect::<Result<_, _>>()?,
            ),
            ParamValue::Object(fields) => {
                let mut map = serde_json::Map::with_capacity(fields.len());
                for (name, value) in fields {
                    map.insert(name.clone(), value.to_json()?);
                }
                Value::Object(map)
            }
        })
    }
}

impl From<bool> for ParamValue {
    fn from(value: bool) -> Self {
        ParamValue::Bool(value)
    }
}

impl From<f64> for ParamValue {
    fn from(value: f64) -> Self {
        ParamValue::Number(value)
    }
}

impl From<i32> for ParamValue {
    fn from(value: i32) -> Self {
        ParamValue::Number(value.into())
    }
}

impl From<&str> for ParamValue {
    fn from(value: &str) -> Self {
        ParamValue::String(value.to_string())
    }
}

impl From<String> for ParamValue {
    fn from(value: String) -> Self {
        ParamValue::String(value)
    }
}

impl From<Vec<ParamValue>> for ParamValue {
    fn from(items: Vec<ParamValue>) -> Self {
        ParamValue::Array(items)
    }
}

impl From<HashMap<String, ParamValue>> for ParamValue {
    fn from(fields: HashMap<String, ParamValue>) -> Self {
        ParamValue::Object(fields)
    }
}

/// A number that cannot be represented in JSON
#[derive(Debug, Clone, Copy, PartialEq, Error)]
#[error("non-finite number {value} is not representable in JSON")]
pub struct NonFiniteNumber {
    /// The offending value
    pub value: f64,
}
