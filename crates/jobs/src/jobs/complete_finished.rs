use chrono::Utc;
use tutorhub_db::{queries::bookings, PgPool};

/// Mark SCHEDULED bookings whose end time has passed as COMPLETED.
/// Runs every 1 minute.
pub async fn complete_finished_bookings(pool: &PgPool) -> anyhow::Result<()> {
    let swept = bookings::mark_completed(pool, Utc::now()).await?;

    if swept > 0 {
        tracing::info!("Marked {} finished bookings as completed", swept);
    }

    Ok(())
}
