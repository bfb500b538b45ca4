//! Webhook reducer: maps verified gateway events onto booking status
//! transitions. Events may arrive late, twice, or out of order; the reducer
//! checks the expected pre-status and acknowledges anything it cannot apply
//! so the gateway stops retrying delivered work.

use serde_json::json;
use tutorhub_db::queries::{bookings, payments};
use tutorhub_types::{BookingError, BookingStatus};

use crate::booking::BookingEngine;
use crate::gateway::{EventData, GatewayError, GatewayEvent};

/// What an event does to a booking in its current status.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reduction {
    /// Move to the new status and record the event's payment details.
    Transition(BookingStatus),
    /// Target status already holds; acknowledge without touching the row.
    AlreadyApplied,
    /// Pre-status does not match; acknowledge and let the gateway re-emit
    /// anything that still has pending work.
    OutOfOrder,
}

/// Event kinds the reducer consumes, with their §4.1 pre/post statuses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventKind {
    PaymentSucceeded,
    PaymentFailed,
    ChargeRefunded,
    RefundCreated,
    RefundFailed,
}

impl EventKind {
    fn expected_pre_status(&self) -> BookingStatus {
        match self {
            Self::PaymentSucceeded | Self::PaymentFailed => BookingStatus::AwaitingPayment,
            Self::ChargeRefunded | Self::RefundCreated | Self::RefundFailed => {
                BookingStatus::AwaitingRefund
            }
        }
    }

    fn target_status(&self) -> BookingStatus {
        match self {
            Self::PaymentSucceeded => BookingStatus::Scheduled,
            Self::PaymentFailed => BookingStatus::PaymentFailed,
            Self::ChargeRefunded => BookingStatus::Refunded,
            // refund.created confirms work in progress without advancing.
            Self::RefundCreated => BookingStatus::AwaitingRefund,
            Self::RefundFailed => BookingStatus::RefundFailed,
        }
    }
}

/// Pure reduction decision; the command applies it transactionally.
pub fn reduce(kind: EventKind, current: BookingStatus) -> Reduction {
    let target = kind.target_status();
    if current == target {
        return Reduction::AlreadyApplied;
    }
    if current == kind.expected_pre_status() {
        return Reduction::Transition(target);
    }
    Reduction::OutOfOrder
}

impl BookingEngine {
    /// Verify, parse and apply one webhook delivery. Returns `Ok` only when
    /// the event has been fully absorbed; the gateway redelivers on error.
    pub async fn handle_webhook(
        &self,
        payload: &[u8],
        signature: &str,
    ) -> Result<(), BookingError> {
        let event = self
            .gateway
            .verify_and_parse_webhook(payload, signature)
            .map_err(|e| match e {
                GatewayError::InvalidSignature => BookingError::InvalidSignature,
                other => BookingError::Internal(other.to_string()),
            })?;

        let (kind, data) = match event {
            GatewayEvent::PaymentSucceeded(data) => (EventKind::PaymentSucceeded, data),
            GatewayEvent::PaymentFailed(data) => (EventKind::PaymentFailed, data),
            GatewayEvent::ChargeRefunded(data) => (EventKind::ChargeRefunded, data),
            GatewayEvent::RefundCreated(data) => (EventKind::RefundCreated, data),
            GatewayEvent::RefundFailed(data) => (EventKind::RefundFailed, data),
            GatewayEvent::Unrecognized { event_type } => {
                tracing::debug!(event_type, "ignoring unhandled webhook event");
                return Ok(());
            }
        };

        self.apply_event(kind, data).await
    }

    async fn apply_event(&self, kind: EventKind, data: EventData) -> Result<(), BookingError> {
        let booking_id = data.booking_id.ok_or(BookingError::InvalidMetadata)?;

        let mut tx = self.pool.begin().await?;

        let booking = bookings::find_by_id_for_update(&mut tx, booking_id)
            .await?
            .ok_or(BookingError::BookingNotFound)?;

        let target = match reduce(kind, booking.status) {
            Reduction::Transition(target) => target,
            Reduction::AlreadyApplied => {
                tracing::debug!(
                    booking_id = %booking_id,
                    ?kind,
                    "webhook event already applied"
                );
                return Ok(());
            }
            Reduction::OutOfOrder => {
                tracing::debug!(
                    booking_id = %booking_id,
                    ?kind,
                    status = booking.status.as_str(),
                    "webhook event does not match booking status, acknowledging"
                );
                return Ok(());
            }
        };

        match kind {
            EventKind::PaymentSucceeded | EventKind::PaymentFailed => {
                payments::record_gateway_ids(
                    &mut tx,
                    booking_id,
                    data.payment_intent_id.as_deref(),
                    data.charge_id.as_deref(),
                )
                .await?;
            }
            _ => {}
        }
        if let Some(reason) = &data.failure_reason {
            payments::merge_metadata(&mut tx, booking_id, json!({ "failure_reason": reason }))
                .await?;
        }

        bookings::update_status(&mut tx, booking_id, target).await?;
        tx.commit().await?;

        tracing::info!(
            booking_id = %booking_id,
            ?kind,
            status = target.as_str(),
            "webhook event applied"
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tutorhub_types::BookingStatus::*;

    #[test]
    fn payment_events_apply_from_awaiting_payment() {
        assert_eq!(
            reduce(EventKind::PaymentSucceeded, AwaitingPayment),
            Reduction::Transition(Scheduled)
        );
        assert_eq!(
            reduce(EventKind::PaymentFailed, AwaitingPayment),
            Reduction::Transition(PaymentFailed)
        );
    }

    #[test]
    fn redelivered_events_are_no_ops() {
        assert_eq!(
            reduce(EventKind::PaymentSucceeded, Scheduled),
            Reduction::AlreadyApplied
        );
        assert_eq!(
            reduce(EventKind::ChargeRefunded, Refunded),
            Reduction::AlreadyApplied
        );
        assert_eq!(
            reduce(EventKind::RefundFailed, RefundFailed),
            Reduction::AlreadyApplied
        );
    }

    #[test]
    fn refund_created_confirms_without_advancing() {
        assert_eq!(
            reduce(EventKind::RefundCreated, AwaitingRefund),
            Reduction::AlreadyApplied
        );
        assert_eq!(
            reduce(EventKind::RefundCreated, Scheduled),
            Reduction::OutOfOrder
        );
    }

    #[test]
    fn mismatched_pre_status_is_acknowledged_but_ignored() {
        assert_eq!(
            reduce(EventKind::PaymentSucceeded, Canceled),
            Reduction::OutOfOrder
        );
        assert_eq!(
            reduce(EventKind::ChargeRefunded, AwaitingPayment),
            Reduction::OutOfOrder
        );
        assert_eq!(
            reduce(EventKind::PaymentFailed, Scheduled),
            Reduction::OutOfOrder
        );
    }

    #[test]
    fn refund_lifecycle_transitions() {
        assert_eq!(
            reduce(EventKind::ChargeRefunded, AwaitingRefund),
            Reduction::Transition(Refunded)
        );
        assert_eq!(
            reduce(EventKind::RefundFailed, AwaitingRefund),
            Reduction::Transition(RefundFailed)
        );
    }
}
