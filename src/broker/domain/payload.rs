//! Structured message payloads.

use super::BrokerDomainError;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Non-empty JSON object carried by a message.
///
/// Values inside the object may be of any JSON type, including `null`,
/// booleans and empty strings; only the object itself must have a key.
///
/// # Examples
///
/// ```
/// use cursorlog::broker::domain::Payload;
/// use serde_json::json;
///
/// let payload = Payload::try_from(json!({"msg": "hello"})).expect("valid payload");
/// assert_eq!(payload.get("msg"), Some(&json!("hello")));
/// assert!(Payload::try_from(json!({})).is_err());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Payload(Map<String, Value>);

impl Payload {
    /// Creates a payload from a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`BrokerDomainError::EmptyPayload`] when the object has no keys.
    pub fn new(object: Map<String, Value>) -> Result<Self, BrokerDomainError> {
        if object.is_empty() {
            return Err(BrokerDomainError::EmptyPayload);
        }
        Ok(Self(object))
    }

    /// Looks up a top-level field.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Returns the payload as a JSON object.
    #[must_use]
    pub const fn as_object(&self) -> &Map<String, Value> {
        &self.0
    }

    /// Converts the payload into a JSON value.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.0)
    }
}

impl TryFrom<Value> for Payload {
    type Error = BrokerDomainError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(object) => Self::new(object),
            _ => Err(BrokerDomainError::PayloadNotObject),
        }
    }
}

impl From<Payload> for Value {
    fn from(payload: Payload) -> Self {
        payload.into_value()
    }
}
