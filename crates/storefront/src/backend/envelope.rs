//! The `{success, data, message, errors}` envelope used by the REST service.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use super::BackendError;

/// Per-field validation messages, e.g. `{"email": ["Email is already taken"]}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FieldErrors(BTreeMap<String, Vec<String>>);

impl FieldErrors {
    /// Add a message for a field.
    pub fn insert(&mut self, field: &str, message: impl Into<String>) {
        self.0
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    /// Messages for one field (empty when the field is valid).
    #[must_use]
    pub fn get(&self, field: &str) -> &[String] {
        self.0.get(field).map_or(&[], Vec::as_slice)
    }

    /// Whether the field has at least one message.
    #[must_use]
    pub fn has(&self, field: &str) -> bool {
        !self.get(field).is_empty()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.values().all(Vec::is_empty)
    }

    /// First message of the first invalid field.
    #[must_use]
    pub fn first_message(&self) -> Option<&str> {
        self.0.values().flatten().next().map(String::as_str)
    }

    /// Merge another set of errors into this one.
    pub fn extend(&mut self, other: Self) {
        for (field, messages) in other.0 {
            self.0.entry(field).or_default().extend(messages);
        }
    }
}

impl fmt::Display for FieldErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .filter(|(_, messages)| !messages.is_empty())
            .map(|(field, messages)| format!("{field}: {}", messages.join(", ")))
            .collect();
        write!(f, "{}", parts.join("; "))
    }
}

/// Response wrapper for every REST endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    #[serde(default)]
    pub success: bool,
    pub data: Option<T>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub errors: Option<FieldErrors>,
}

impl<T> Envelope<T> {
    /// Unwrap the envelope, keeping `data` optional.
    ///
    /// # Errors
    ///
    /// Non-empty `errors` become [`BackendError::Validation`]; otherwise
    /// `success: false` becomes [`BackendError::Envelope`] with the message.
    pub fn into_result(self) -> Result<Option<T>, BackendError> {
        if let Some(errors) = self.errors.filter(|errors| !errors.is_empty()) {
            return Err(BackendError::Validation(errors));
        }
        if !self.success {
            return Err(BackendError::Envelope(
                self.message
                    .unwrap_or_else(|| "The request could not be completed".to_string()),
            ));
        }
        Ok(self.data)
    }

    /// Unwrap the envelope and require a payload.
    ///
    /// # Errors
    ///
    /// As [`Envelope::into_result`], plus [`BackendError::Envelope`] when
    /// `data` is missing.
    pub fn into_data(self) -> Result<T, BackendError> {
        self.into_result()?
            .ok_or_else(|| BackendError::Envelope("Response contained no data".to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn parse<T: serde::de::DeserializeOwned>(json: &str) -> Envelope<T> {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_success_with_data() {
        let envelope: Envelope<Vec<u32>> = parse(r#"{"success":true,"data":[1,2,3]}"#);
        assert_eq!(envelope.into_data().unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_success_without_data() {
        let envelope: Envelope<serde_json::Value> =
            parse(r#"{"success":true,"message":"Marked as read"}"#);
        assert!(envelope.clone().into_result().unwrap().is_none());
        assert!(matches!(
            envelope.into_data(),
            Err(BackendError::Envelope(_))
        ));
    }

    #[test]
    fn test_failure_carries_message() {
        let envelope: Envelope<u32> =
            parse(r#"{"success":false,"message":"Return window has closed"}"#);
        match envelope.into_result() {
            Err(BackendError::Envelope(message)) => {
                assert_eq!(message, "Return window has closed");
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_field_errors_become_validation() {
        let envelope: Envelope<u32> = parse(
            r#"{"success":false,"message":"Invalid","errors":{"email":["Email is already taken"],"phone":["Too short","Digits only"]}}"#,
        );
        match envelope.into_result() {
            Err(BackendError::Validation(errors)) => {
                assert_eq!(errors.get("email"), ["Email is already taken".to_string()]);
                assert_eq!(errors.get("phone").len(), 2);
                assert!(errors.get("name").is_empty());
                assert!(errors.has("phone"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_empty_errors_object_is_ignored() {
        let envelope: Envelope<u32> = parse(r#"{"success":true,"data":7,"errors":{}}"#);
        assert_eq!(envelope.into_data().unwrap(), 7);
    }

    #[test]
    fn test_field_errors_display_and_merge() {
        let mut errors = FieldErrors::default();
        errors.insert("name", "Name is required");
        let mut more = FieldErrors::default();
        more.insert("email", "Enter a valid email");
        errors.extend(more);
        assert_eq!(
            errors.to_string(),
            "email: Enter a valid email; name: Name is required"
        );
        assert_eq!(errors.first_message(), Some("Enter a valid email"));
    }
}
