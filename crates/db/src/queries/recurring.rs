use crate::models::{RecurringTemplate, RecurringTimeSlot};
use chrono::NaiveTime;
use sqlx::{Postgres, Transaction};
use tutorhub_types::{RecurrencePattern, TemplateStatus, Weekday};
use uuid::Uuid;

/// Time slots of every ACTIVE template for a host. Used to reject new
/// templates whose weekly windows would overlap an existing one.
pub async fn active_slots_for_host(
    tx: &mut Transaction<'_, Postgres>,
    host_id: Uuid,
) -> sqlx::Result<Vec<RecurringTimeSlot>> {
    sqlx::query_as::<_, RecurringTimeSlot>(
        r#"
        SELECT s.id, s.template_id, s.weekday, s.time_of_day
        FROM recurring_time_slots s
        JOIN recurring_templates t ON t.id = s.template_id
        WHERE t.host_id = $1 AND t.status = $2
        "#,
    )
    .bind(host_id)
    .bind(TemplateStatus::Active)
    .fetch_all(&mut **tx)
    .await
}

pub async fn insert_template(
    tx: &mut Transaction<'_, Postgres>,
    host_id: Uuid,
    pattern: RecurrencePattern,
    duration_minutes: i32,
) -> sqlx::Result<RecurringTemplate> {
    sqlx::query_as::<_, RecurringTemplate>(
        r#"
        INSERT INTO recurring_templates (id, host_id, recurrence_pattern, duration_minutes, status)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(host_id)
    .bind(pattern)
    .bind(duration_minutes)
    .bind(TemplateStatus::Active)
    .fetch_one(&mut **tx)
    .await
}

pub async fn insert_time_slot(
    tx: &mut Transaction<'_, Postgres>,
    template_id: Uuid,
    weekday: Weekday,
    time_of_day: NaiveTime,
) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        INSERT INTO recurring_time_slots (id, template_id, weekday, time_of_day)
        VALUES ($1, $2, $3, $4)
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(template_id)
    .bind(weekday)
    .bind(time_of_day)
    .execute(&mut **tx)
    .await?;
    Ok(())
}
