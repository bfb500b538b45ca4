use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::enums::{BookingStatus, BookingType, SortDirection, SortField};
use crate::time::serde_utc_millis;

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CreateBookingRequest {
    /// ISO-8601 UTC instant; validated by the engine.
    pub start_time: String,
    pub to_user_id: Uuid,
    pub service_id: Option<Uuid>,
}

#[derive(Debug, Clone, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct RescheduleBookingRequest {
    pub start_time: String,
}

/// Query parameters for the bookings list endpoint.
#[derive(Debug, Clone, Default, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingListQuery {
    pub page: Option<i64>,
    pub limit: Option<i64>,
    /// Comma-separated status filter, e.g. `SCHEDULED,AWAITING_PAYMENT`.
    pub status: Option<String>,
    #[serde(rename = "type")]
    pub booking_type: Option<BookingType>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    /// Case-insensitive match against the booking title.
    pub search: Option<String>,
    pub sort_field: Option<SortField>,
    pub sort_direction: Option<SortDirection>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[serde(with = "serde_utc_millis")]
    #[schema(value_type = String)]
    pub start_time: DateTime<Utc>,
    #[serde(with = "serde_utc_millis")]
    #[schema(value_type = String)]
    pub end_time: DateTime<Utc>,
    #[serde(rename = "type")]
    pub booking_type: BookingType,
    pub status: BookingStatus,
    pub host_id: Uuid,
    pub participant_ids: Vec<Uuid>,
    pub service_id: Option<Uuid>,
    pub recurring_template_id: Option<Uuid>,
    #[serde(with = "serde_utc_millis")]
    #[schema(value_type = String)]
    pub created_at: DateTime<Utc>,
    #[serde(with = "serde_utc_millis")]
    #[schema(value_type = String)]
    pub updated_at: DateTime<Utc>,
}

/// A user as shown inside a booking detail (host or participant).
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantInfo {
    pub id: Uuid,
    pub name: String,
    pub image: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct PaymentInfo {
    pub session_id: Option<String>,
    pub session_url: Option<String>,
    pub payment_intent_id: Option<String>,
    pub charge_id: Option<String>,
    pub metadata: serde_json::Value,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct BookingDetailResponse {
    pub id: Uuid,
    pub title: String,
    pub description: Option<String>,
    #[serde(with = "serde_utc_millis")]
    #[schema(value_type = String)]
    pub start_time: DateTime<Utc>,
    #[serde(with = "serde_utc_millis")]
    #[schema(value_type = String)]
    pub end_time: DateTime<Utc>,
    #[serde(rename = "type")]
    pub booking_type: BookingType,
    pub status: BookingStatus,
    pub host: ParticipantInfo,
    pub participants: Vec<ParticipantInfo>,
    pub service_id: Option<Uuid>,
    pub recurring_template_id: Option<Uuid>,
    pub payment: Option<PaymentInfo>,
    #[serde(with = "serde_utc_millis")]
    #[schema(value_type = String)]
    pub created_at: DateTime<Utc>,
    #[serde(with = "serde_utc_millis")]
    #[schema(value_type = String)]
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct PageMetadata {
    pub total: i64,
    pub page: i64,
    pub limit: i64,
    pub pages: i64,
}

#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct BookingListResponse {
    pub items: Vec<BookingResponse>,
    pub metadata: PageMetadata,
}

/// Body returned by mutations that create a single row.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
pub struct CreatedResponse {
    pub id: Uuid,
}
