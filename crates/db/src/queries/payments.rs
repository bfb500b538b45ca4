use crate::models::Payment;
use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

/// Find the payment owned by a booking.
pub async fn find_by_booking_id(
    tx: &mut Transaction<'_, Postgres>,
    booking_id: Uuid,
) -> sqlx::Result<Option<Payment>> {
    sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE booking_id = $1")
        .bind(booking_id)
        .fetch_optional(&mut **tx)
        .await
}

pub async fn find_by_booking_id_with_pool(
    pool: &PgPool,
    booking_id: Uuid,
) -> sqlx::Result<Option<Payment>> {
    sqlx::query_as::<_, Payment>("SELECT * FROM payments WHERE booking_id = $1")
        .bind(booking_id)
        .fetch_optional(pool)
        .await
}

/// Store the checkout session for a booking, replacing any previous one.
/// Confirm retries after a failed commit land here again, so the row is
/// keyed by booking_id and upserted.
pub async fn upsert_checkout_session(
    tx: &mut Transaction<'_, Postgres>,
    booking_id: Uuid,
    session_id: &str,
    session_url: &str,
) -> sqlx::Result<Payment> {
    sqlx::query_as::<_, Payment>(
        r#"
        INSERT INTO payments (id, booking_id, session_id, session_url)
        VALUES ($1, $2, $3, $4)
        ON CONFLICT (booking_id) DO UPDATE
        SET session_id = EXCLUDED.session_id,
            session_url = EXCLUDED.session_url,
            updated_at = NOW()
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(booking_id)
    .bind(session_id)
    .bind(session_url)
    .fetch_one(&mut **tx)
    .await
}

/// Record gateway identifiers delivered by a webhook.
pub async fn record_gateway_ids(
    tx: &mut Transaction<'_, Postgres>,
    booking_id: Uuid,
    payment_intent_id: Option<&str>,
    charge_id: Option<&str>,
) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        UPDATE payments
        SET payment_intent_id = COALESCE($2, payment_intent_id),
            charge_id = COALESCE($3, charge_id),
            updated_at = NOW()
        WHERE booking_id = $1
        "#,
    )
    .bind(booking_id)
    .bind(payment_intent_id)
    .bind(charge_id)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

/// Merge key/value details (e.g. a failure reason) into the payment metadata.
pub async fn merge_metadata(
    tx: &mut Transaction<'_, Postgres>,
    booking_id: Uuid,
    patch: serde_json::Value,
) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        UPDATE payments
        SET metadata = metadata || $2,
            updated_at = NOW()
        WHERE booking_id = $1
        "#,
    )
    .bind(booking_id)
    .bind(patch)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
