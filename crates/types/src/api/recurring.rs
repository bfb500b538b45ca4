use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;
use validator::Validate;

use crate::enums::{RecurrencePattern, Weekday};
use crate::time::TimeOfDay;

/// One weekday/time-of-day slot of a recurring template request.
#[derive(Debug, Clone, Copy, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlotInput {
    pub weekday: Weekday,
    /// HH:mm on a 15-minute grid.
    #[schema(value_type = String)]
    pub time: TimeOfDay,
}

/// Per-instance directive resolving a previously reported conflict.
#[derive(Debug, Clone, Deserialize, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct OverrideInput {
    /// The conflicting instant as previously returned, in wire format.
    pub conflict_time: String,
    #[schema(value_type = Option<String>)]
    pub new_time_of_day: Option<TimeOfDay>,
    #[serde(default)]
    pub cancel: bool,
}

#[derive(Debug, Clone, Deserialize, Validate, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateRecurringRequest {
    #[validate(length(min = 1, max = 200))]
    pub title: String,
    #[validate(length(max = 2000))]
    pub description: Option<String>,
    pub host_id: Uuid,
    pub recurrence_pattern: RecurrencePattern,
    pub time_slots: Vec<TimeSlotInput>,
    pub overrides: Option<Vec<OverrideInput>>,
}

/// A generated instance that collides with an existing booking, together
/// with nearby free HH:mm starts on the same day.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TimeSlotConflict {
    pub conflict_time: String,
    pub alternative_times: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum RecurringBookingResponse {
    #[serde(rename_all = "camelCase")]
    Created { recurring_template_id: Uuid },
    Conflicts { conflicts: Vec<TimeSlotConflict> },
}
