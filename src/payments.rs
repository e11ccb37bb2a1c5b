//! Thin client for the PayMongo REST API. Everything money-related crosses
//! this boundary in centavos; callers convert from decimal pesos first.

use hmac::{Hmac, Mac};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sha2::Sha256;

#[derive(Debug, thiserror::Error)]
pub enum PaymentError {
    #[error("payment provider request failed: {0}")]
    Transport(#[from] reqwest::Error),
    #[error("payment provider rejected the request ({status}): {detail}")]
    Provider { status: u16, detail: String },
    #[error("unexpected payment provider response: {0}")]
    Decode(String),
}

/// Provider responses arrive as `{"data": {"id": ..., "attributes": {...}}}`.
#[derive(Deserialize)]
struct Document<T> {
    data: Resource<T>,
}

#[derive(Deserialize)]
struct Resource<T> {
    id: String,
    attributes: T,
}

#[derive(Serialize)]
struct Envelope<T> {
    data: EnvelopeData<T>,
}

#[derive(Serialize)]
struct EnvelopeData<T> {
    attributes: T,
}

fn envelope<T>(attributes: T) -> Envelope<T> {
    Envelope {
        data: EnvelopeData { attributes },
    }
}

#[derive(Deserialize)]
struct ErrorDocument {
    errors: Vec<ProviderError>,
}

#[derive(Deserialize)]
struct ProviderError {
    detail: String,
}

#[derive(Deserialize)]
struct PaymentIntentAttrs {
    amount: i64,
    currency: String,
    status: String,
    client_key: Option<String>,
    next_action: Option<serde_json::Value>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntent {
    pub id: String,
    pub status: String,
    pub amount: i64,
    pub currency: String,
    pub client_key: Option<String>,
    pub next_action: Option<serde_json::Value>,
}

impl PaymentIntent {
    fn from_resource(resource: Resource<PaymentIntentAttrs>) -> Self {
        PaymentIntent {
            id: resource.id,
            status: resource.attributes.status,
            amount: resource.attributes.amount,
            currency: resource.attributes.currency,
            client_key: resource.attributes.client_key,
            next_action: resource.attributes.next_action,
        }
    }
}

#[derive(Deserialize)]
struct SourceAttrs {
    amount: i64,
    currency: String,
    status: String,
    redirect: SourceRedirect,
}

#[derive(Deserialize)]
struct SourceRedirect {
    checkout_url: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentSource {
    pub id: String,
    pub status: String,
    pub amount: i64,
    pub currency: String,
    pub checkout_url: Option<String>,
}

#[derive(Deserialize)]
struct PayoutAttrs {
    amount: i64,
    currency: String,
    status: String,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Payout {
    pub id: String,
    pub status: String,
    pub amount: i64,
    pub currency: String,
}

#[derive(Clone)]
pub struct PayMongoClient {
    http: reqwest::Client,
    base_url: String,
    secret_key: String,
}

impl PayMongoClient {
    pub fn new(base_url: &str, secret_key: &str) -> Self {
        PayMongoClient {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            secret_key: secret_key.to_string(),
        }
    }

    pub async fn create_payment_intent(
        &self,
        amount: i64,
        currency: &str,
        description: &str,
        metadata: serde_json::Value,
    ) -> Result<PaymentIntent, PaymentError> {
        let body = envelope(serde_json::json!({
            "amount": amount,
            "currency": currency,
            "description": description,
            "payment_method_allowed": ["card", "gcash", "grab_pay", "paymaya"],
            "metadata": metadata,
        }));
        let response = self
            .http
            .post(format!("{}/payment_intents", self.base_url))
            .basic_auth(&self.secret_key, Some(""))
            .json(&body)
            .send()
            .await?;
        let resource = parse::<PaymentIntentAttrs>(response).await?;
        Ok(PaymentIntent::from_resource(resource))
    }

    pub async fn get_payment_intent(&self, id: &str) -> Result<PaymentIntent, PaymentError> {
        let response = self
            .http
            .get(format!("{}/payment_intents/{id}", self.base_url))
            .basic_auth(&self.secret_key, Some(""))
            .send()
            .await?;
        let resource = parse::<PaymentIntentAttrs>(response).await?;
        Ok(PaymentIntent::from_resource(resource))
    }

    pub async fn attach_payment_method(
        &self,
        intent_id: &str,
        payment_method: &str,
        client_key: Option<&str>,
    ) -> Result<PaymentIntent, PaymentError> {
        let mut attributes = serde_json::json!({ "payment_method": payment_method });
        if let Some(key) = client_key {
            attributes["client_key"] = serde_json::Value::String(key.to_string());
        }
        let body = envelope(attributes);
        let response = self
            .http
            .post(format!(
                "{}/payment_intents/{intent_id}/attach",
                self.base_url
            ))
            .basic_auth(&self.secret_key, Some(""))
            .json(&body)
            .send()
            .await?;
        let resource = parse::<PaymentIntentAttrs>(response).await?;
        Ok(PaymentIntent::from_resource(resource))
    }

    /// E-wallet checkout flow: the caller redirects the payer to
    /// `checkout_url` and the outcome arrives later on the webhook.
    pub async fn create_source(
        &self,
        amount: i64,
        currency: &str,
        kind: &str,
        success_url: &str,
        failed_url: &str,
    ) -> Result<PaymentSource, PaymentError> {
        let body = envelope(serde_json::json!({
            "amount": amount,
            "currency": currency,
            "type": kind,
            "redirect": { "success": success_url, "failed": failed_url },
        }));
        let response = self
            .http
            .post(format!("{}/sources", self.base_url))
            .basic_auth(&self.secret_key, Some(""))
            .json(&body)
            .send()
            .await?;
        let resource = parse::<SourceAttrs>(response).await?;
        Ok(PaymentSource {
            id: resource.id,
            status: resource.attributes.status,
            amount: resource.attributes.amount,
            currency: resource.attributes.currency,
            checkout_url: resource.attributes.redirect.checkout_url,
        })
    }

    pub async fn create_payout(
        &self,
        amount: i64,
        currency: &str,
        destination: &str,
        description: &str,
    ) -> Result<Payout, PaymentError> {
        let body = envelope(serde_json::json!({
            "amount": amount,
            "currency": currency,
            "destination": destination,
            "description": description,
        }));
        let response = self
            .http
            .post(format!("{}/payouts", self.base_url))
            .basic_auth(&self.secret_key, Some(""))
            .json(&body)
            .send()
            .await?;
        let resource = parse::<PayoutAttrs>(response).await?;
        Ok(Payout {
            id: resource.id,
            status: resource.attributes.status,
            amount: resource.attributes.amount,
            currency: resource.attributes.currency,
        })
    }
}

async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> Result<Resource<T>, PaymentError> {
    let status = response.status();
    let text = response.text().await?;
    if !status.is_success() {
        let detail = serde_json::from_str::<ErrorDocument>(&text)
            .ok()
            .and_then(|doc| doc.errors.into_iter().next())
            .map(|e| e.detail)
            .unwrap_or(text);
        return Err(PaymentError::Provider {
            status: status.as_u16(),
            detail,
        });
    }
    let document = serde_json::from_str::<Document<T>>(&text)
        .map_err(|e| PaymentError::Decode(e.to_string()))?;
    Ok(document.data)
}

/// Checks a webhook payload against its HMAC-SHA256 signature. Fails closed:
/// malformed input of any kind is an invalid signature, not an error.
pub fn verify_webhook_signature(payload: &[u8], signature: &str, secret: &str) -> bool {
    let Ok(expected) = hex::decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = Hmac::<Sha256>::new_from_slice(secret.as_bytes()) else {
        return false;
    };
    mac.update(payload);
    mac.verify_slice(&expected).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const INTENT_JSON: &str = r#"{
        "data": {
            "id": "pi_123",
            "type": "payment_intent",
            "attributes": {
                "amount": 150000,
                "currency": "PHP",
                "status": "awaiting_payment_method",
                "client_key": "pi_123_client_abc",
                "next_action": null
            }
        }
    }"#;

    #[tokio::test]
    async fn create_payment_intent_sends_envelope_and_basic_auth() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/payment_intents"))
            .and(header("authorization", "Basic c2tfdGVzdF9hYmM6"))
            .and(body_partial_json(serde_json::json!({
                "data": { "attributes": { "amount": 150000, "currency": "PHP" } }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string(INTENT_JSON))
            .mount(&server)
            .await;

        let client = PayMongoClient::new(&server.uri(), "sk_test_abc");
        let intent = client
            .create_payment_intent(150000, "PHP", "Wallet deposit", serde_json::json!({}))
            .await
            .unwrap();

        assert_eq!(intent.id, "pi_123");
        assert_eq!(intent.status, "awaiting_payment_method");
        assert_eq!(intent.amount, 150000);
        assert_eq!(intent.client_key.as_deref(), Some("pi_123_client_abc"));
    }

    #[tokio::test]
    async fn provider_errors_surface_status_and_detail() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/payment_intents"))
            .respond_with(ResponseTemplate::new(400).set_body_string(
                r#"{"errors":[{"code":"parameter_below_minimum","detail":"amount must be at least 2000"}]}"#,
            ))
            .mount(&server)
            .await;

        let client = PayMongoClient::new(&server.uri(), "sk_test_abc");
        let err = client
            .create_payment_intent(100, "PHP", "Wallet deposit", serde_json::json!({}))
            .await
            .unwrap_err();

        match err {
            PaymentError::Provider { status, detail } => {
                assert_eq!(status, 400);
                assert_eq!(detail, "amount must be at least 2000");
            }
            other => panic!("expected provider error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn source_checkout_url_is_extracted() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/sources"))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"data":{"id":"src_9","attributes":{"amount":50000,"currency":"PHP","status":"pending","redirect":{"checkout_url":"https://pay.example/checkout/src_9","success":"https://app.example/ok","failed":"https://app.example/fail"}}}}"#,
            ))
            .mount(&server)
            .await;

        let client = PayMongoClient::new(&server.uri(), "sk_test_abc");
        let source = client
            .create_source(50000, "PHP", "gcash", "https://app.example/ok", "https://app.example/fail")
            .await
            .unwrap();

        assert_eq!(source.id, "src_9");
        assert_eq!(
            source.checkout_url.as_deref(),
            Some("https://pay.example/checkout/src_9")
        );
    }

    #[tokio::test]
    async fn attach_forwards_the_client_key_when_present() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/payment_intents/pi_123/attach"))
            .and(body_partial_json(serde_json::json!({
                "data": {
                    "attributes": {
                        "payment_method": "pm_7",
                        "client_key": "pi_123_client_abc"
                    }
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string(INTENT_JSON))
            .mount(&server)
            .await;

        let client = PayMongoClient::new(&server.uri(), "sk_test_abc");
        let intent = client
            .attach_payment_method("pi_123", "pm_7", Some("pi_123_client_abc"))
            .await
            .unwrap();
        assert_eq!(intent.id, "pi_123");
    }

    #[tokio::test]
    async fn payout_posts_destination_and_description() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/payouts"))
            .and(body_partial_json(serde_json::json!({
                "data": {
                    "attributes": {
                        "amount": 250000,
                        "destination": "gcash:09171234567",
                        "description": "VeriFund wallet withdrawal"
                    }
                }
            })))
            .respond_with(ResponseTemplate::new(200).set_body_string(
                r#"{"data":{"id":"po_1","attributes":{"amount":250000,"currency":"PHP","status":"pending"}}}"#,
            ))
            .mount(&server)
            .await;

        let client = PayMongoClient::new(&server.uri(), "sk_test_abc");
        let payout = client
            .create_payout(250000, "PHP", "gcash:09171234567", "VeriFund wallet withdrawal")
            .await
            .unwrap();
        assert_eq!(payout.id, "po_1");
        assert_eq!(payout.status, "pending");
    }

    #[tokio::test]
    async fn malformed_success_body_is_a_decode_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/payment_intents/pi_404"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .mount(&server)
            .await;

        let client = PayMongoClient::new(&server.uri(), "sk_test_abc");
        let err = client.get_payment_intent("pi_404").await.unwrap_err();
        assert!(matches!(err, PaymentError::Decode(_)));
    }

    // RFC 4231 test case 2: key "Jefe", data "what do ya want for nothing?".
    const RFC4231_SIG: &str = "5bdcc146bf60754e6a042426089575c75a003f089d2739839dec58b964ec3843";

    #[test]
    fn accepts_a_valid_signature() {
        assert!(verify_webhook_signature(
            b"what do ya want for nothing?",
            RFC4231_SIG,
            "Jefe"
        ));
    }

    #[test]
    fn rejects_tampered_payload_and_wrong_secret() {
        assert!(!verify_webhook_signature(
            b"what do ya want for something?",
            RFC4231_SIG,
            "Jefe"
        ));
        assert!(!verify_webhook_signature(
            b"what do ya want for nothing?",
            RFC4231_SIG,
            "Jeff"
        ));
    }

    #[test]
    fn fails_closed_on_malformed_signatures() {
        assert!(!verify_webhook_signature(b"payload", "", "secret"));
        assert!(!verify_webhook_signature(b"payload", "zz-not-hex", "secret"));
        assert!(!verify_webhook_signature(b"payload", "5bdcc1", "secret"));
    }
}
