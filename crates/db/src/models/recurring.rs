use chrono::{DateTime, NaiveTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use tutorhub_types::{RecurrencePattern, TemplateStatus, Weekday};
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecurringTemplate {
    pub id: Uuid,
    pub host_id: Uuid,
    pub recurrence_pattern: RecurrencePattern,
    pub duration_minutes: i32,
    pub status: TemplateStatus,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct RecurringTimeSlot {
    pub id: Uuid,
    pub template_id: Uuid,
    pub weekday: Weekday,
    pub time_of_day: NaiveTime,
}
