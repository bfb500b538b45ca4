//! Stripe webhook signature verification and event parsing.
//!
//! Signatures are HMAC-SHA256 over `"{timestamp}.{payload}"`, compared in
//! constant time, with a bounded timestamp window against replays.

use hmac::{Hmac, Mac};
use serde::Deserialize;
use sha2::Sha256;
use std::collections::HashMap;
use subtle::ConstantTimeEq;
use tutorhub_core::gateway::{EventData, GatewayError, GatewayEvent};
use uuid::Uuid;

type HmacSha256 = Hmac<Sha256>;

/// Maximum allowed age for webhook events (5 minutes).
const MAX_EVENT_AGE_SECS: i64 = 300;

/// Clock skew tolerance for events stamped in the future.
const MAX_CLOCK_SKEW_SECS: i64 = 60;

/// Parsed `Stripe-Signature` header: `t=<timestamp>,v1=<hex signature>`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    pub timestamp: i64,
    pub v1_signature: Vec<u8>,
}

impl SignatureHeader {
    pub fn parse(header: &str) -> Result<Self, GatewayError> {
        let mut timestamp: Option<i64> = None;
        let mut v1_signature: Option<Vec<u8>> = None;

        for part in header.split(',') {
            let Some((key, value)) = part.split_once('=') else {
                return Err(GatewayError::InvalidSignature);
            };
            match key {
                "t" => {
                    timestamp =
                        Some(value.parse().map_err(|_| GatewayError::InvalidSignature)?);
                }
                "v1" => {
                    v1_signature =
                        Some(hex::decode(value).map_err(|_| GatewayError::InvalidSignature)?);
                }
                // Unknown schemes are ignored for forward compatibility.
                _ => {}
            }
        }

        match (timestamp, v1_signature) {
            (Some(timestamp), Some(v1_signature)) => Ok(Self {
                timestamp,
                v1_signature,
            }),
            _ => Err(GatewayError::InvalidSignature),
        }
    }
}

/// Verify the signature over the raw payload and parse the event.
pub fn verify_and_parse(
    webhook_secret: &str,
    payload: &[u8],
    signature: &str,
) -> Result<GatewayEvent, GatewayError> {
    verify_and_parse_at(webhook_secret, payload, signature, chrono::Utc::now().timestamp())
}

fn verify_and_parse_at(
    webhook_secret: &str,
    payload: &[u8],
    signature: &str,
    now: i64,
) -> Result<GatewayEvent, GatewayError> {
    let header = SignatureHeader::parse(signature)?;

    let age = now - header.timestamp;
    if age > MAX_EVENT_AGE_SECS || age < -MAX_CLOCK_SKEW_SECS {
        return Err(GatewayError::InvalidSignature);
    }

    let expected = compute_signature(webhook_secret, header.timestamp, payload);
    if !constant_time_compare(&expected, &header.v1_signature) {
        return Err(GatewayError::InvalidSignature);
    }

    parse_event(payload)
}

fn compute_signature(secret: &str, timestamp: i64, payload: &[u8]) -> Vec<u8> {
    let signed_payload = format!("{}.{}", timestamp, String::from_utf8_lossy(payload));
    let mut mac =
        HmacSha256::new_from_slice(secret.as_bytes()).expect("HMAC accepts any key length");
    mac.update(signed_payload.as_bytes());
    mac.finalize().into_bytes().to_vec()
}

fn constant_time_compare(a: &[u8], b: &[u8]) -> bool {
    if a.len() != b.len() {
        return false;
    }
    a.ct_eq(b).into()
}

#[derive(Debug, Deserialize)]
struct StripeEvent {
    id: String,
    #[serde(rename = "type")]
    event_type: String,
    data: StripeEventData,
}

#[derive(Debug, Deserialize)]
struct StripeEventData {
    object: serde_json::Value,
}

#[derive(Debug, Deserialize)]
struct PaymentIntentObject {
    id: String,
    #[serde(default)]
    metadata: HashMap<String, String>,
    latest_charge: Option<serde_json::Value>,
    last_payment_error: Option<LastPaymentError>,
}

#[derive(Debug, Deserialize)]
struct LastPaymentError {
    message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChargeObject {
    id: String,
    payment_intent: Option<String>,
    #[serde(default)]
    metadata: HashMap<String, String>,
    failure_message: Option<String>,
}

#[derive(Debug, Deserialize)]
struct RefundObject {
    payment_intent: Option<String>,
    #[serde(default)]
    metadata: HashMap<String, String>,
    failure_reason: Option<String>,
}

fn parse_event(payload: &[u8]) -> Result<GatewayEvent, GatewayError> {
    let event: StripeEvent = serde_json::from_slice(payload)
        .map_err(|e| GatewayError::Response(format!("invalid webhook payload: {e}")))?;

    tracing::debug!(event_id = %event.id, event_type = %event.event_type, "parsed webhook event");

    let parsed = match event.event_type.as_str() {
        "payment_intent.succeeded" => {
            GatewayEvent::PaymentSucceeded(payment_intent_data(&event)?)
        }
        "payment_intent.payment_failed" => {
            GatewayEvent::PaymentFailed(payment_intent_data(&event)?)
        }
        "charge.refunded" => {
            let charge: ChargeObject = object(&event)?;
            GatewayEvent::ChargeRefunded(EventData {
                booking_id: booking_id_from(&charge.metadata),
                payment_intent_id: charge.payment_intent,
                charge_id: Some(charge.id),
                failure_reason: charge.failure_message,
            })
        }
        "refund.created" | "refund.failed" => {
            let refund: RefundObject = object(&event)?;
            let data = EventData {
                booking_id: booking_id_from(&refund.metadata),
                payment_intent_id: refund.payment_intent,
                charge_id: None,
                failure_reason: refund.failure_reason,
            };
            if event.event_type == "refund.created" {
                GatewayEvent::RefundCreated(data)
            } else {
                GatewayEvent::RefundFailed(data)
            }
        }
        other => GatewayEvent::Unrecognized {
            event_type: other.to_string(),
        },
    };
    Ok(parsed)
}

fn object<T: serde::de::DeserializeOwned>(event: &StripeEvent) -> Result<T, GatewayError> {
    serde_json::from_value(event.data.object.clone())
        .map_err(|e| GatewayError::Response(format!("invalid {} object: {e}", event.event_type)))
}

fn payment_intent_data(event: &StripeEvent) -> Result<EventData, GatewayError> {
    let intent: PaymentIntentObject = object(event)?;
    let charge_id = intent.latest_charge.as_ref().and_then(|c| match c {
        serde_json::Value::String(id) => Some(id.clone()),
        serde_json::Value::Object(map) => map
            .get("id")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string()),
        _ => None,
    });
    Ok(EventData {
        booking_id: booking_id_from(&intent.metadata),
        payment_intent_id: Some(intent.id),
        charge_id,
        failure_reason: intent.last_payment_error.and_then(|e| e.message),
    })
}

fn booking_id_from(metadata: &HashMap<String, String>) -> Option<Uuid> {
    metadata
        .get("booking_id")
        .and_then(|raw| Uuid::parse_str(raw).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    const TEST_SECRET: &str = "whsec_test_secret_12345";

    fn sign(secret: &str, timestamp: i64, payload: &str) -> String {
        hex::encode(compute_signature(secret, timestamp, payload.as_bytes()))
    }

    fn signed_header(payload: &str, timestamp: i64) -> String {
        format!("t={},v1={}", timestamp, sign(TEST_SECRET, timestamp, payload))
    }

    fn succeeded_payload(booking_id: &str) -> String {
        json!({
            "id": "evt_1",
            "type": "payment_intent.succeeded",
            "data": {
                "object": {
                    "id": "pi_1",
                    "metadata": { "booking_id": booking_id },
                    "latest_charge": "ch_1"
                }
            }
        })
        .to_string()
    }

    #[test]
    fn parses_header_with_v1() {
        let header = SignatureHeader::parse("t=1234567890,v1=aa11").unwrap();
        assert_eq!(header.timestamp, 1234567890);
        assert_eq!(header.v1_signature, vec![0xaa, 0x11]);
    }

    #[test]
    fn header_missing_parts_fails() {
        assert!(SignatureHeader::parse("t=1234567890").is_err());
        assert!(SignatureHeader::parse("v1=aa11").is_err());
        assert!(SignatureHeader::parse("t=abc,v1=aa11").is_err());
        assert!(SignatureHeader::parse("t=1,v1=zz").is_err());
        assert!(SignatureHeader::parse("garbage").is_err());
    }

    #[test]
    fn valid_signature_yields_typed_event() {
        let booking_id = Uuid::new_v4();
        let payload = succeeded_payload(&booking_id.to_string());
        let now = 1_900_000_000;
        let event =
            verify_and_parse_at(TEST_SECRET, payload.as_bytes(), &signed_header(&payload, now), now)
                .unwrap();

        match event {
            GatewayEvent::PaymentSucceeded(data) => {
                assert_eq!(data.booking_id, Some(booking_id));
                assert_eq!(data.payment_intent_id.as_deref(), Some("pi_1"));
                assert_eq!(data.charge_id.as_deref(), Some("ch_1"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn tampered_payload_is_rejected() {
        let payload = succeeded_payload(&Uuid::new_v4().to_string());
        let now = 1_900_000_000;
        let header = signed_header(&payload, now);
        let tampered = payload.replace("pi_1", "pi_2");
        assert!(matches!(
            verify_and_parse_at(TEST_SECRET, tampered.as_bytes(), &header, now),
            Err(GatewayError::InvalidSignature)
        ));
    }

    #[test]
    fn wrong_secret_is_rejected() {
        let payload = succeeded_payload(&Uuid::new_v4().to_string());
        let now = 1_900_000_000;
        let header = format!("t={},v1={}", now, sign("whsec_other", now, &payload));
        assert!(matches!(
            verify_and_parse_at(TEST_SECRET, payload.as_bytes(), &header, now),
            Err(GatewayError::InvalidSignature)
        ));
    }

    #[test]
    fn stale_and_future_timestamps_are_rejected() {
        let payload = succeeded_payload(&Uuid::new_v4().to_string());
        let now = 1_900_000_000;

        let stale = now - MAX_EVENT_AGE_SECS - 1;
        assert!(verify_and_parse_at(
            TEST_SECRET,
            payload.as_bytes(),
            &signed_header(&payload, stale),
            now
        )
        .is_err());

        let future = now + MAX_CLOCK_SKEW_SECS + 1;
        assert!(verify_and_parse_at(
            TEST_SECRET,
            payload.as_bytes(),
            &signed_header(&payload, future),
            now
        )
        .is_err());

        // Within the window on both sides.
        let recent = now - 120;
        assert!(verify_and_parse_at(
            TEST_SECRET,
            payload.as_bytes(),
            &signed_header(&payload, recent),
            now
        )
        .is_ok());
    }

    #[test]
    fn unknown_event_types_are_passed_through() {
        let payload = json!({
            "id": "evt_2",
            "type": "customer.created",
            "data": { "object": {} }
        })
        .to_string();
        let now = 1_900_000_000;
        let event =
            verify_and_parse_at(TEST_SECRET, payload.as_bytes(), &signed_header(&payload, now), now)
                .unwrap();
        assert!(matches!(
            event,
            GatewayEvent::Unrecognized { event_type } if event_type == "customer.created"
        ));
    }

    #[test]
    fn refund_failed_carries_reason_and_missing_booking_id_is_none() {
        let payload = json!({
            "id": "evt_3",
            "type": "refund.failed",
            "data": {
                "object": {
                    "id": "re_1",
                    "payment_intent": "pi_9",
                    "metadata": {},
                    "failure_reason": "expired_or_canceled_card"
                }
            }
        })
        .to_string();
        let now = 1_900_000_000;
        let event =
            verify_and_parse_at(TEST_SECRET, payload.as_bytes(), &signed_header(&payload, now), now)
                .unwrap();
        match event {
            GatewayEvent::RefundFailed(data) => {
                assert_eq!(data.booking_id, None);
                assert_eq!(
                    data.failure_reason.as_deref(),
                    Some("expired_or_canceled_card")
                );
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }

    #[test]
    fn charge_refunded_extracts_charge_and_booking() {
        let booking_id = Uuid::new_v4();
        let payload = json!({
            "id": "evt_4",
            "type": "charge.refunded",
            "data": {
                "object": {
                    "id": "ch_7",
                    "payment_intent": "pi_7",
                    "metadata": { "booking_id": booking_id.to_string() }
                }
            }
        })
        .to_string();
        let now = 1_900_000_000;
        let event =
            verify_and_parse_at(TEST_SECRET, payload.as_bytes(), &signed_header(&payload, now), now)
                .unwrap();
        match event {
            GatewayEvent::ChargeRefunded(data) => {
                assert_eq!(data.booking_id, Some(booking_id));
                assert_eq!(data.charge_id.as_deref(), Some("ch_7"));
            }
            other => panic!("unexpected event: {other:?}"),
        }
    }
}
