use crate::models::{Booking, NewBooking};
use chrono::{DateTime, Utc};
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use tutorhub_types::{BookingStatus, BookingType, SortDirection, SortField, ACTIVE_STATUSES};
use uuid::Uuid;

/// Base SQL for selecting a booking with its participant set.
/// Reused across query functions to avoid duplication.
const BOOKING_SELECT: &str = r#"
    SELECT
        b.id,
        b.title,
        b.description,
        b.start_time,
        b.end_time,
        b.type,
        b.status,
        b.host_id,
        b.service_id,
        b.recurring_template_id,
        b.price_cents,
        ARRAY(
            SELECT p.user_id
            FROM booking_participants p
            WHERE p.booking_id = b.id
            ORDER BY p.user_id
        ) AS participant_ids,
        b.created_at,
        b.updated_at
    FROM bookings b
"#;

/// Filter for the paginated bookings list.
#[derive(Debug, Clone)]
pub struct BookingListFilter {
    /// Restrict to bookings this user hosts or participates in.
    /// `None` lists everything (admin view).
    pub viewer_id: Option<Uuid>,
    pub statuses: Vec<BookingStatus>,
    pub booking_type: Option<BookingType>,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub search: Option<String>,
    pub sort_field: SortField,
    pub sort_direction: SortDirection,
    pub page: i64,
    pub limit: i64,
}

/// Find booking by ID
pub async fn find_by_id(pool: &PgPool, id: Uuid) -> sqlx::Result<Option<Booking>> {
    let query = format!("{BOOKING_SELECT} WHERE b.id = $1");
    sqlx::query_as::<_, Booking>(&query)
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Find booking by ID inside a transaction, locking the row.
/// Commands re-read the booking through this before mutating it so racing
/// requests serialize on the row lock.
pub async fn find_by_id_for_update(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
) -> sqlx::Result<Option<Booking>> {
    let query = format!("{BOOKING_SELECT} WHERE b.id = $1 FOR UPDATE OF b");
    sqlx::query_as::<_, Booking>(&query)
        .bind(id)
        .fetch_optional(&mut **tx)
        .await
}

/// Load, in one round trip, every booking between a (tutor, student) pair
/// that the create command needs: rows whose status is active or completed,
/// plus any row overlapping the candidate interval.
pub async fn find_between_pair(
    tx: &mut Transaction<'_, Postgres>,
    tutor_id: Uuid,
    student_id: Uuid,
    candidate_start: DateTime<Utc>,
    candidate_end: DateTime<Utc>,
) -> sqlx::Result<Vec<Booking>> {
    let mut statuses: Vec<BookingStatus> = ACTIVE_STATUSES.to_vec();
    statuses.push(BookingStatus::Completed);

    let query = format!(
        r#"{BOOKING_SELECT}
        JOIN booking_participants bp ON bp.booking_id = b.id
        WHERE b.host_id = $1
          AND bp.user_id = $2
          AND (b.status = ANY($3) OR (b.start_time < $5 AND b.end_time > $4))
        ORDER BY b.start_time"#
    );
    sqlx::query_as::<_, Booking>(&query)
        .bind(tutor_id)
        .bind(student_id)
        .bind(statuses)
        .bind(candidate_start)
        .bind(candidate_end)
        .fetch_all(&mut **tx)
        .await
}

/// Existing bookings with an active status whose `[start, end)` interval
/// overlaps any of `intervals`, matching the host or the optional
/// participant. Single round trip: the intervals become one OR chain.
pub async fn find_conflicts(
    tx: &mut Transaction<'_, Postgres>,
    host_id: Uuid,
    participant_id: Option<Uuid>,
    intervals: &[(DateTime<Utc>, DateTime<Utc>)],
    exclude_booking: Option<Uuid>,
) -> sqlx::Result<Vec<Booking>> {
    if intervals.is_empty() {
        return Ok(Vec::new());
    }

    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(BOOKING_SELECT);
    qb.push(" WHERE b.status = ANY(");
    qb.push_bind(ACTIVE_STATUSES.to_vec());
    qb.push(") AND (b.host_id = ");
    qb.push_bind(host_id);
    if let Some(participant_id) = participant_id {
        qb.push(
            " OR EXISTS (SELECT 1 FROM booking_participants p \
             WHERE p.booking_id = b.id AND p.user_id = ",
        );
        qb.push_bind(participant_id);
        qb.push(")");
    }
    qb.push(") AND (");
    for (i, (start, end)) in intervals.iter().enumerate() {
        if i > 0 {
            qb.push(" OR ");
        }
        qb.push("(b.start_time < ");
        qb.push_bind(*end);
        qb.push(" AND b.end_time > ");
        qb.push_bind(*start);
        qb.push(")");
    }
    qb.push(")");
    if let Some(exclude) = exclude_booking {
        qb.push(" AND b.id <> ");
        qb.push_bind(exclude);
    }
    qb.push(" ORDER BY b.start_time");

    qb.build_query_as::<Booking>().fetch_all(&mut **tx).await
}

/// Whether the pair already has a COMPLETED or SCHEDULED booking. Gatekeeps
/// recurring templates and tutor-initiated lessons.
pub async fn exists_prior_booking(
    tx: &mut Transaction<'_, Postgres>,
    tutor_id: Uuid,
    student_id: Uuid,
) -> sqlx::Result<bool> {
    let (exists,): (bool,) = sqlx::query_as(
        r#"
        SELECT EXISTS (
            SELECT 1
            FROM bookings b
            JOIN booking_participants bp ON bp.booking_id = b.id
            WHERE b.host_id = $1
              AND bp.user_id = $2
              AND b.status = ANY($3)
        )
        "#,
    )
    .bind(tutor_id)
    .bind(student_id)
    .bind(vec![BookingStatus::Completed, BookingStatus::Scheduled])
    .fetch_one(&mut **tx)
    .await?;

    Ok(exists)
}

/// Insert a booking and its participants, returning the stored row.
pub async fn insert(
    tx: &mut Transaction<'_, Postgres>,
    new: &NewBooking,
) -> sqlx::Result<Booking> {
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO bookings (
            id, title, description, start_time, end_time,
            type, status, host_id, service_id, recurring_template_id, price_cents
        )
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
        "#,
    )
    .bind(id)
    .bind(&new.title)
    .bind(&new.description)
    .bind(new.start_time)
    .bind(new.end_time)
    .bind(new.booking_type)
    .bind(new.status)
    .bind(new.host_id)
    .bind(new.service_id)
    .bind(new.recurring_template_id)
    .bind(new.price_cents)
    .execute(&mut **tx)
    .await?;

    for user_id in &new.participant_ids {
        sqlx::query("INSERT INTO booking_participants (booking_id, user_id) VALUES ($1, $2)")
            .bind(id)
            .bind(user_id)
            .execute(&mut **tx)
            .await?;
    }

    let query = format!("{BOOKING_SELECT} WHERE b.id = $1");
    sqlx::query_as::<_, Booking>(&query)
        .bind(id)
        .fetch_one(&mut **tx)
        .await
}

/// Update booking status
pub async fn update_status(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    status: BookingStatus,
) -> sqlx::Result<()> {
    sqlx::query("UPDATE bookings SET status = $2, updated_at = NOW() WHERE id = $1")
        .bind(id)
        .bind(status)
        .execute(&mut **tx)
        .await?;
    Ok(())
}

/// Move a booking to a new interval and flip the awaiting direction.
pub async fn reschedule(
    tx: &mut Transaction<'_, Postgres>,
    id: Uuid,
    start_time: DateTime<Utc>,
    end_time: DateTime<Utc>,
    status: BookingStatus,
) -> sqlx::Result<()> {
    sqlx::query(
        r#"
        UPDATE bookings
        SET start_time = $2,
            end_time = $3,
            status = $4,
            updated_at = NOW()
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(start_time)
    .bind(end_time)
    .bind(status)
    .execute(&mut **tx)
    .await?;
    Ok(())
}

fn push_list_filters(qb: &mut QueryBuilder<'_, Postgres>, filter: &BookingListFilter) {
    qb.push(" WHERE TRUE");
    if let Some(viewer_id) = filter.viewer_id {
        qb.push(" AND (b.host_id = ");
        qb.push_bind(viewer_id);
        qb.push(
            " OR EXISTS (SELECT 1 FROM booking_participants p \
             WHERE p.booking_id = b.id AND p.user_id = ",
        );
        qb.push_bind(viewer_id);
        qb.push("))");
    }
    if !filter.statuses.is_empty() {
        qb.push(" AND b.status = ANY(");
        qb.push_bind(filter.statuses.clone());
        qb.push(")");
    }
    if let Some(booking_type) = filter.booking_type {
        qb.push(" AND b.type = ");
        qb.push_bind(booking_type);
    }
    if let Some(start_date) = filter.start_date {
        qb.push(" AND b.start_time >= ");
        qb.push_bind(start_date);
    }
    if let Some(end_date) = filter.end_date {
        qb.push(" AND b.start_time <= ");
        qb.push_bind(end_date);
    }
    if let Some(search) = &filter.search {
        qb.push(" AND b.title ILIKE ");
        qb.push_bind(format!("%{}%", search));
    }
}

/// Paginated bookings list with total count (two round trips).
pub async fn list(
    pool: &PgPool,
    filter: &BookingListFilter,
) -> sqlx::Result<(Vec<Booking>, i64)> {
    let mut count_qb: QueryBuilder<Postgres> =
        QueryBuilder::new("SELECT COUNT(*) FROM bookings b");
    push_list_filters(&mut count_qb, filter);
    let (total,): (i64,) = count_qb.build_query_as().fetch_one(pool).await?;

    let mut qb: QueryBuilder<Postgres> = QueryBuilder::new(BOOKING_SELECT);
    push_list_filters(&mut qb, filter);

    qb.push(" ORDER BY b.");
    qb.push(filter.sort_field.column());
    qb.push(" ");
    qb.push(filter.sort_direction.sql());
    if filter.sort_field != SortField::CreatedAt {
        qb.push(", b.created_at ");
        qb.push(filter.sort_direction.sql());
    }
    qb.push(" LIMIT ");
    qb.push_bind(filter.limit);
    qb.push(" OFFSET ");
    qb.push_bind((filter.page - 1) * filter.limit);

    let bookings = qb.build_query_as::<Booking>().fetch_all(pool).await?;
    Ok((bookings, total))
}

/// Completion sweep: SCHEDULED bookings whose end time has passed become
/// COMPLETED. Returns the number of rows swept.
pub async fn mark_completed(pool: &PgPool, now: DateTime<Utc>) -> sqlx::Result<u64> {
    let result = sqlx::query(
        r#"
        UPDATE bookings
        SET status = $1, updated_at = NOW()
        WHERE status = $2 AND end_time < $3
        "#,
    )
    .bind(BookingStatus::Completed)
    .bind(BookingStatus::Scheduled)
    .bind(now)
    .execute(pool)
    .await?;
    Ok(result.rows_affected())
}
