use serde::Deserialize;

/// Envelope PayMongo posts to the webhook endpoint.
#[derive(Debug, Clone, Deserialize)]
pub struct WebhookRequest {
    pub data: WebhookEvent,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEvent {
    pub id: String,
    #[serde(rename = "type")]
    pub resource_type: String,
    pub attributes: WebhookEventAttributes,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookEventAttributes {
    /// Event kind, e.g. "payment.paid" or "payment.failed".
    #[serde(rename = "type")]
    pub event_type: String,
    pub data: WebhookResource,
}

#[derive(Debug, Clone, Deserialize)]
pub struct WebhookResource {
    pub id: String,
    #[serde(default)]
    pub attributes: WebhookResourceAttributes,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct WebhookResourceAttributes {
    pub amount: Option<i64>,
    pub status: Option<String>,
    pub payment_intent_id: Option<String>,
}

impl WebhookRequest {
    pub fn event_type(&self) -> &str {
        &self.data.attributes.event_type
    }

    /// Payment-intent reference for matching against our ledger. Payment
    /// events carry it as an attribute; intent events carry it as the
    /// resource id itself.
    pub fn intent_ref(&self) -> Option<&str> {
        let resource = &self.data.attributes.data;
        resource
            .attributes
            .payment_intent_id
            .as_deref()
            .or_else(|| {
                self.data
                    .attributes
                    .event_type
                    .starts_with("payment_intent.")
                    .then_some(resource.id.as_str())
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn payment_event_resolves_intent_from_attribute() {
        let raw = serde_json::json!({
            "data": {
                "id": "evt_1",
                "type": "event",
                "attributes": {
                    "type": "payment.paid",
                    "data": {
                        "id": "pay_1",
                        "attributes": {
                            "amount": 10000,
                            "status": "paid",
                            "payment_intent_id": "pi_abc"
                        }
                    }
                }
            }
        });
        let event: WebhookRequest = serde_json::from_value(raw).unwrap();
        assert_eq!(event.event_type(), "payment.paid");
        assert_eq!(event.intent_ref(), Some("pi_abc"));
    }

    #[test]
    fn intent_event_resolves_intent_from_resource_id() {
        let raw = serde_json::json!({
            "data": {
                "id": "evt_2",
                "type": "event",
                "attributes": {
                    "type": "payment_intent.succeeded",
                    "data": { "id": "pi_xyz" }
                }
            }
        });
        let event: WebhookRequest = serde_json::from_value(raw).unwrap();
        assert_eq!(event.intent_ref(), Some("pi_xyz"));
    }

    #[test]
    fn unrelated_event_has_no_intent_ref() {
        let raw = serde_json::json!({
            "data": {
                "id": "evt_3",
                "type": "event",
                "attributes": {
                    "type": "source.chargeable",
                    "data": { "id": "src_1" }
                }
            }
        });
        let event: WebhookRequest = serde_json::from_value(raw).unwrap();
        assert_eq!(event.intent_ref(), None);
    }
}
