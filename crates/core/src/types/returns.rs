//! Product returns (RMA requests).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::id::{ProductId, ReturnId};
use super::status::ReturnStatus;

/// A return request as tracked by the returns service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductReturn {
    pub id: ReturnId,
    /// RMA number shown to the customer and printed on the parcel.
    pub return_number: String,
    pub product_id: ProductId,
    pub status: ReturnStatus,
    pub reason: String,
    pub quantity: u32,
    pub requested_at: DateTime<Utc>,
    #[serde(default)]
    pub description: Option<String>,
}

/// Longest free-text description accepted with a return request.
pub const MAX_DESCRIPTION_LENGTH: usize = 2000;

/// Validation failures for a new return request.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReturnRequestError {
    #[error("quantity must be at least 1")]
    ZeroQuantity,
    #[error("please tell us why you are returning the item")]
    MissingReason,
    #[error("description must be at most {MAX_DESCRIPTION_LENGTH} characters")]
    DescriptionTooLong,
}

/// Payload sent to the returns service when a customer opens a return.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReturnRequest {
    pub product_id: ProductId,
    pub quantity: u32,
    pub reason: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ReturnRequest {
    /// Validate and normalize form input.
    ///
    /// # Errors
    ///
    /// Returns the first [`ReturnRequestError`] the input violates.
    pub fn new(
        product_id: ProductId,
        quantity: u32,
        reason: &str,
        description: Option<&str>,
    ) -> Result<Self, ReturnRequestError> {
        if quantity == 0 {
            return Err(ReturnRequestError::ZeroQuantity);
        }
        let reason = reason.trim();
        if reason.is_empty() {
            return Err(ReturnRequestError::MissingReason);
        }
        let description = description
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .map(str::to_string);
        if description
            .as_ref()
            .is_some_and(|d| d.chars().count() > MAX_DESCRIPTION_LENGTH)
        {
            return Err(ReturnRequestError::DescriptionTooLong);
        }

        Ok(Self {
            product_id,
            quantity,
            reason: reason.to_string(),
            description,
        })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_request_is_trimmed() {
        let request =
            ReturnRequest::new(ProductId::new(3), 2, "  Wrong size  ", Some("   ")).unwrap();
        assert_eq!(request.reason, "Wrong size");
        assert_eq!(request.description, None);
        let json = serde_json::to_value(&request).unwrap();
        assert!(json.get("description").is_none());
    }

    #[test]
    fn test_rejects_bad_input() {
        let id = ProductId::new(1);
        assert_eq!(
            ReturnRequest::new(id, 0, "Broken", None),
            Err(ReturnRequestError::ZeroQuantity)
        );
        assert_eq!(
            ReturnRequest::new(id, 1, "  ", None),
            Err(ReturnRequestError::MissingReason)
        );
        let long = "x".repeat(MAX_DESCRIPTION_LENGTH + 1);
        assert_eq!(
            ReturnRequest::new(id, 1, "Broken", Some(&long)),
            Err(ReturnRequestError::DescriptionTooLong)
        );
    }

    #[test]
    fn test_deserialize_return() {
        let json = r#"{"id":4,"return_number":"RMA-2026-0004","product_id":9,"status":"approved",
            "reason":"Defective","quantity":1,"requested_at":"2026-09-01T10:00:00Z"}"#;
        let ret: ProductReturn = serde_json::from_str(json).unwrap();
        assert_eq!(ret.status, ReturnStatus::Approved);
        assert_eq!(ret.description, None);
    }
}
