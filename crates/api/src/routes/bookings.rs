use axum::{
    extract::{Path, Query, State},
    Json,
};
use tutorhub_types::api::{
    BookingDetailResponse, BookingListQuery, BookingListResponse, CreateBookingRequest,
    CreateRecurringRequest, CreatedResponse, RecurringBookingResponse, RescheduleBookingRequest,
};
use uuid::Uuid;
use validator::Validate;

use crate::middleware::{AppState, AuthUser};
use crate::response::{self, ApiError};

/// List bookings visible to the current user, filtered and paginated.
pub async fn list_bookings(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Query(query): Query<BookingListQuery>,
) -> Result<Json<BookingListResponse>, ApiError> {
    let response = state.engine.list_bookings(&user, &query).await?;
    Ok(Json(response))
}

/// Get booking by ID with host, participants and payment.
pub async fn get_booking(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<BookingDetailResponse>, ApiError> {
    let response = state.engine.get_booking(&user, id).await?;
    Ok(Json(response))
}

/// Create booking
pub async fn create_booking(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateBookingRequest>,
) -> Result<Json<CreatedResponse>, ApiError> {
    let id = state.engine.create_booking(&user, &payload).await?;
    Ok(Json(CreatedResponse { id }))
}

/// Reschedule a pending booking.
pub async fn reschedule_booking(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RescheduleBookingRequest>,
) -> Result<Json<CreatedResponse>, ApiError> {
    state.engine.reschedule_booking(&user, id, &payload).await?;
    Ok(Json(CreatedResponse { id }))
}

/// Cancel booking
pub async fn cancel_booking(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CreatedResponse>, ApiError> {
    state.engine.cancel_booking(&user, id).await?;
    Ok(Json(CreatedResponse { id }))
}

/// Request a refund for a scheduled lesson.
pub async fn refund_booking(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CreatedResponse>, ApiError> {
    state.engine.request_refund(&user, id).await?;
    Ok(Json(CreatedResponse { id }))
}

/// Confirm a pending booking.
pub async fn confirm_booking(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CreatedResponse>, ApiError> {
    state.engine.confirm_booking(&user, id).await?;
    Ok(Json(CreatedResponse { id }))
}

/// Create a recurring template with its child bookings, or report conflicts.
pub async fn create_recurring(
    AuthUser(user): AuthUser,
    State(state): State<AppState>,
    Json(payload): Json<CreateRecurringRequest>,
) -> Result<Json<RecurringBookingResponse>, ApiError> {
    payload
        .validate()
        .map_err(|e| response::bad_request(format!("Validation error: {e}")))?;
    let response = state.engine.create_recurring_bookings(&user, &payload).await?;
    Ok(Json(response))
}
