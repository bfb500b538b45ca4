use tutorhub_db::{
    models::User,
    queries::{bookings, payments, users},
};
use tutorhub_types::{
    api::{
        BookingDetailResponse, BookingListQuery, BookingListResponse, BookingResponse,
        PageMetadata, ParticipantInfo,
    },
    parse_utc,
    validation::{normalize_limit, normalize_page, validate_date_range, validate_sort},
    BookingError, BookingStatus,
};
use uuid::Uuid;

use super::BookingEngine;

impl BookingEngine {
    /// Full booking with host, participants and payment.
    pub async fn get_booking(
        &self,
        actor: &User,
        booking_id: Uuid,
    ) -> Result<BookingDetailResponse, BookingError> {
        let booking = bookings::find_by_id(&self.pool, booking_id)
            .await?
            .ok_or(BookingError::BookingNotFound)?;

        if !booking.involves(actor.id) && !actor.is_admin() {
            return Err(BookingError::Unauthorized);
        }

        let mut user_ids = booking.participant_ids.clone();
        user_ids.push(booking.host_id);
        let related = users::find_many_by_ids(&self.pool, &user_ids).await?;

        let host = related
            .iter()
            .find(|u| u.id == booking.host_id)
            .map(ParticipantInfo::from)
            .ok_or_else(|| BookingError::Internal("booking host row missing".into()))?;
        let participants: Vec<ParticipantInfo> = related
            .iter()
            .filter(|u| booking.participant_ids.contains(&u.id))
            .map(ParticipantInfo::from)
            .collect();

        let payment = payments::find_by_booking_id_with_pool(&self.pool, booking.id)
            .await?
            .map(Into::into);

        Ok(BookingDetailResponse {
            id: booking.id,
            title: booking.title,
            description: booking.description,
            start_time: booking.start_time,
            end_time: booking.end_time,
            booking_type: booking.booking_type,
            status: booking.status,
            host,
            participants,
            service_id: booking.service_id,
            recurring_template_id: booking.recurring_template_id,
            payment,
            created_at: booking.created_at,
            updated_at: booking.updated_at,
        })
    }

    /// Paginated bookings visible to the actor. Admins see everything,
    /// everyone else only bookings they host or attend.
    pub async fn list_bookings(
        &self,
        actor: &User,
        query: &BookingListQuery,
    ) -> Result<BookingListResponse, BookingError> {
        let statuses = parse_status_filter(query.status.as_deref())?;

        let start_date = query
            .start_date
            .as_deref()
            .map(|s| parse_utc(s).ok_or(BookingError::InvalidDate))
            .transpose()?;
        let end_date = query
            .end_date
            .as_deref()
            .map(|s| parse_utc(s).ok_or(BookingError::InvalidDate))
            .transpose()?;
        validate_date_range(start_date, end_date).map_err(BookingError::InvalidInput)?;

        let (sort_field, sort_direction) = validate_sort(query.sort_field, query.sort_direction)
            .map_err(BookingError::InvalidInput)?;

        let page = normalize_page(query.page);
        let limit = normalize_limit(query.limit);

        let filter = bookings::BookingListFilter {
            viewer_id: if actor.is_admin() { None } else { Some(actor.id) },
            statuses,
            booking_type: query.booking_type,
            start_date,
            end_date,
            search: query.search.clone(),
            sort_field,
            sort_direction,
            page,
            limit,
        };

        let (rows, total) = bookings::list(&self.pool, &filter).await?;
        let pages = if total == 0 { 0 } else { (total + limit - 1) / limit };

        Ok(BookingListResponse {
            items: rows.into_iter().map(BookingResponse::from).collect(),
            metadata: PageMetadata {
                total,
                page,
                limit,
                pages,
            },
        })
    }
}

fn parse_status_filter(raw: Option<&str>) -> Result<Vec<BookingStatus>, BookingError> {
    let Some(raw) = raw else {
        return Ok(Vec::new());
    };
    raw.split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| {
            s.parse::<BookingStatus>()
                .map_err(|_| BookingError::InvalidInput(format!("unknown status: {s}")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_comma_separated_statuses() {
        let parsed = parse_status_filter(Some("SCHEDULED, AWAITING_PAYMENT")).unwrap();
        assert_eq!(
            parsed,
            vec![BookingStatus::Scheduled, BookingStatus::AwaitingPayment]
        );
        assert!(parse_status_filter(None).unwrap().is_empty());
        assert!(parse_status_filter(Some("NOT_A_STATUS")).is_err());
    }
}
