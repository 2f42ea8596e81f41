//! Flutterwave v3 REST client.

use reqwest::header::{HeaderMap, HeaderValue};
use rust_decimal::Decimal;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};
use tracing::instrument;
use url::Url;
use uuid::Uuid;

use kivu_core::CurrencyCode;

use super::PaymentError;
use crate::config::FlutterwaveConfig;

/// Generate a unique transaction reference.
#[must_use]
pub fn new_tx_ref() -> String {
    format!("KIVU-{}", Uuid::new_v4())
}

/// Customer details pre-filled on the hosted checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentCustomer {
    pub email: String,
    #[serde(rename = "phonenumber", skip_serializing_if = "Option::is_none")]
    pub phone_number: Option<String>,
    pub name: String,
}

/// Branding shown on the hosted checkout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentCustomizations {
    pub title: String,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo: Option<String>,
}

/// Body of `POST /v3/payments`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PaymentRequest {
    pub tx_ref: String,
    pub amount: Decimal,
    pub currency: CurrencyCode,
    pub redirect_url: String,
    pub payment_options: String,
    pub customer: PaymentCustomer,
    pub customizations: PaymentCustomizations,
}

/// What the session remembers between redirecting to Flutterwave and the
/// callback coming back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingPayment {
    pub tx_ref: String,
    pub amount: Decimal,
    pub currency: CurrencyCode,
    pub cart_token: String,
}

/// Transaction details from `GET /v3/transactions/{id}/verify`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct VerifiedTransaction {
    pub id: u64,
    pub tx_ref: String,
    pub status: String,
    pub amount: Decimal,
    pub currency: String,
}

impl VerifiedTransaction {
    /// Check the transaction against the payment the customer started.
    ///
    /// # Errors
    ///
    /// Returns [`PaymentError::Mismatch`] naming the first field that differs.
    pub fn check(&self, pending: &PendingPayment) -> Result<(), PaymentError> {
        if self.status != "successful" {
            return Err(PaymentError::Mismatch(format!("status {}", self.status)));
        }
        if self.tx_ref != pending.tx_ref {
            return Err(PaymentError::Mismatch("tx_ref".to_string()));
        }
        if !self.currency.eq_ignore_ascii_case(pending.currency.code()) {
            return Err(PaymentError::Mismatch(format!("currency {}", self.currency)));
        }
        if self.amount != pending.amount {
            return Err(PaymentError::Mismatch(format!(
                "amount {} != {}",
                self.amount, pending.amount
            )));
        }
        Ok(())
    }
}

/// Query string Flutterwave appends to the redirect URL.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PaymentCallback {
    #[serde(default)]
    pub status: String,
    #[serde(default)]
    pub tx_ref: Option<String>,
    #[serde(default)]
    pub transaction_id: Option<u64>,
}

/// The three ways a hosted checkout can end.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaymentOutcome {
    /// Paid; still needs verification before it is trusted.
    Success { tx_ref: String, transaction_id: u64 },
    /// Customer closed the checkout.
    Closed,
    /// Anything else, including a success redirect missing its ids.
    Failed(String),
}

impl PaymentCallback {
    /// Classify the redirect.
    #[must_use]
    pub fn outcome(&self) -> PaymentOutcome {
        match self.status.trim().to_ascii_lowercase().as_str() {
            "successful" | "completed" => match (&self.tx_ref, self.transaction_id) {
                (Some(tx_ref), Some(transaction_id)) => PaymentOutcome::Success {
                    tx_ref: tx_ref.clone(),
                    transaction_id,
                },
                _ => PaymentOutcome::Failed("missing transaction reference".to_string()),
            },
            "cancelled" => PaymentOutcome::Closed,
            "" => PaymentOutcome::Failed("no status".to_string()),
            other => PaymentOutcome::Failed(other.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct FlutterwaveResponse<T> {
    status: String,
    #[serde(default)]
    message: String,
    data: Option<T>,
}

#[derive(Debug, Deserialize)]
struct HostedLink {
    link: String,
}

/// Flutterwave API client.
#[derive(Clone)]
pub struct FlutterwaveClient {
    client: reqwest::Client,
    base_url: Url,
}

impl FlutterwaveClient {
    /// Create a new Flutterwave client authenticated with the secret key.
    ///
    /// # Errors
    ///
    /// Returns error if the key is not a valid header value or the HTTP
    /// client fails to build.
    pub fn new(config: &FlutterwaveConfig) -> Result<Self, PaymentError> {
        let mut headers = HeaderMap::new();
        let auth_value = format!("Bearer {}", config.secret_key.expose_secret());
        let mut auth = HeaderValue::from_str(&auth_value)
            .map_err(|e| PaymentError::Parse(format!("Invalid secret key format: {e}")))?;
        auth.set_sensitive(true);
        headers.insert("Authorization", auth);

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(std::time::Duration::from_secs(15))
            .build()?;

        Ok(Self {
            client,
            base_url: config.base_url.clone(),
        })
    }

    fn endpoint(&self, path: &str) -> Result<Url, PaymentError> {
        self.base_url
            .join(path)
            .map_err(|e| PaymentError::Parse(format!("invalid endpoint {path}: {e}")))
    }

    /// Start a hosted payment and return the checkout link.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or Flutterwave rejects it.
    #[instrument(skip(self, request), fields(tx_ref = %request.tx_ref, amount = %request.amount))]
    pub async fn initiate(&self, request: &PaymentRequest) -> Result<Url, PaymentError> {
        let response = self
            .client
            .post(self.endpoint("/v3/payments")?)
            .json(request)
            .send()
            .await?;

        let link: HostedLink = Self::decode(response).await?;
        Url::parse(&link.link).map_err(|e| PaymentError::Parse(format!("checkout link: {e}")))
    }

    /// Look a transaction up by Flutterwave id.
    ///
    /// # Errors
    ///
    /// Returns error if the request fails or the transaction is unknown.
    #[instrument(skip(self))]
    pub async fn verify(&self, transaction_id: u64) -> Result<VerifiedTransaction, PaymentError> {
        let response = self
            .client
            .get(self.endpoint(&format!("/v3/transactions/{transaction_id}/verify"))?)
            .send()
            .await?;

        Self::decode(response).await
    }

    async fn decode<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, PaymentError> {
        let status = response.status();
        let body = response.text().await?;

        let parsed: FlutterwaveResponse<T> = serde_json::from_str(&body).map_err(|e| {
            if status.is_success() {
                PaymentError::Parse(e.to_string())
            } else {
                PaymentError::Api {
                    status: status.as_u16(),
                    message: body.chars().take(200).collect(),
                }
            }
        })?;

        if !status.is_success() || parsed.status != "success" {
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message: parsed.message,
            });
        }

        parsed
            .data
            .ok_or_else(|| PaymentError::Parse("response contained no data".to_string()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn pending() -> PendingPayment {
        PendingPayment {
            tx_ref: "KIVU-123".to_string(),
            amount: Decimal::from(26_285),
            currency: CurrencyCode::RWF,
            cart_token: "cart-abc".to_string(),
        }
    }

    fn verified(status: &str, tx_ref: &str, amount: i64, currency: &str) -> VerifiedTransaction {
        VerifiedTransaction {
            id: 99,
            tx_ref: tx_ref.to_string(),
            status: status.to_string(),
            amount: Decimal::from(amount),
            currency: currency.to_string(),
        }
    }

    #[test]
    fn test_tx_ref_format() {
        let a = new_tx_ref();
        let b = new_tx_ref();
        assert!(a.starts_with("KIVU-"));
        assert_eq!(a.len(), "KIVU-".len() + 36);
        assert_ne!(a, b);
    }

    #[test]
    fn test_outcome_mapping() {
        let callback = |status: &str| PaymentCallback {
            status: status.to_string(),
            tx_ref: Some("KIVU-123".to_string()),
            transaction_id: Some(99),
        };

        assert_eq!(
            callback("successful").outcome(),
            PaymentOutcome::Success {
                tx_ref: "KIVU-123".to_string(),
                transaction_id: 99
            }
        );
        assert!(matches!(
            callback("completed").outcome(),
            PaymentOutcome::Success { .. }
        ));
        assert_eq!(callback("cancelled").outcome(), PaymentOutcome::Closed);
        assert_eq!(
            callback("failed").outcome(),
            PaymentOutcome::Failed("failed".to_string())
        );
    }

    #[test]
    fn test_success_without_ids_is_failure() {
        let callback = PaymentCallback {
            status: "successful".to_string(),
            tx_ref: None,
            transaction_id: None,
        };
        assert!(matches!(callback.outcome(), PaymentOutcome::Failed(_)));
        assert!(matches!(
            PaymentCallback::default().outcome(),
            PaymentOutcome::Failed(_)
        ));
    }

    #[test]
    fn test_verification_checks() {
        let pending = pending();
        assert!(verified("successful", "KIVU-123", 26_285, "RWF").check(&pending).is_ok());
        assert!(verified("successful", "KIVU-123", 26_285, "rwf").check(&pending).is_ok());
        assert!(verified("pending", "KIVU-123", 26_285, "RWF").check(&pending).is_err());
        assert!(verified("successful", "KIVU-999", 26_285, "RWF").check(&pending).is_err());
        assert!(verified("successful", "KIVU-123", 100, "RWF").check(&pending).is_err());
        assert!(verified("successful", "KIVU-123", 30_000, "RWF").check(&pending).is_err());
        assert!(verified("successful", "KIVU-123", 26_285, "USD").check(&pending).is_err());
    }

    #[test]
    fn test_payment_request_wire_format() {
        let request = PaymentRequest {
            tx_ref: "KIVU-123".to_string(),
            amount: Decimal::from(26_285),
            currency: CurrencyCode::RWF,
            redirect_url: "https://kivuimports.rw/checkout/callback".to_string(),
            payment_options: "card,mobilemoneyrwanda".to_string(),
            customer: PaymentCustomer {
                email: "amina@example.rw".to_string(),
                phone_number: Some("+250788000000".to_string()),
                name: "Amina Uwase".to_string(),
            },
            customizations: PaymentCustomizations {
                title: "Kivu Imports".to_string(),
                description: "Order payment".to_string(),
                logo: None,
            },
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["currency"], "RWF");
        assert_eq!(json["customer"]["phonenumber"], "+250788000000");
        assert!(json["customizations"].get("logo").is_none());
    }

    #[test]
    fn test_verify_response_parses() {
        let body = r#"{"status":"success","message":"Transaction fetched successfully","data":{
            "id":99,"tx_ref":"KIVU-123","flw_ref":"FLW-1","amount":26285,"currency":"RWF",
            "charged_amount":26285,"status":"successful"}}"#;
        let parsed: FlutterwaveResponse<VerifiedTransaction> = serde_json::from_str(body).unwrap();
        let tx = parsed.data.unwrap();
        assert!(tx.check(&pending()).is_ok());
    }
}
