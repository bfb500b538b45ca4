pub mod expand;

use chrono::{DateTime, Utc};
use sqlx::{Postgres, Transaction};
use tutorhub_db::{
    models::{NewBooking, User},
    queries::{bookings, recurring, users},
};
use tutorhub_types::{
    api::{CreateRecurringRequest, RecurringBookingResponse, TimeSlotConflict},
    format_utc_millis,
    time::LESSON_MINUTES,
    BookingError, BookingStatus, BookingType,
};
use uuid::Uuid;

use crate::booking::{conflict, BookingEngine, DEFAULT_LESSON_PRICE_CENTS};
use self::expand::OverrideOutcome;

impl BookingEngine {
    /// Expand a recurring template request into concrete lesson bookings
    /// over the one-month horizon.
    ///
    /// Conflicting instances are reported back with alternative times
    /// instead of failing the request; the caller resolves them with
    /// overrides and resubmits. Nothing is written unless every instance is
    /// clean.
    pub async fn create_recurring_bookings(
        &self,
        actor: &User,
        req: &CreateRecurringRequest,
    ) -> Result<RecurringBookingResponse, BookingError> {
        if actor.is_tutor() {
            return Err(BookingError::InvalidInput(
                "recurring bookings are created by students".to_string(),
            ));
        }
        if actor.id == req.host_id {
            return Err(BookingError::InvalidInput(
                "host and student must differ".to_string(),
            ));
        }
        expand::validate_slots(&req.time_slots)?;

        let now = self.clock.now();
        let horizon = expand::horizon_end(now)
            .ok_or_else(|| BookingError::Internal("horizon overflow".into()))?;

        let mut tx = self.pool.begin().await?;

        let host = users::find_by_id_in_tx(&mut tx, req.host_id)
            .await?
            .ok_or(BookingError::UserNotFound)?;
        if !host.is_tutor() {
            return Err(BookingError::InvalidHost);
        }

        if !bookings::exists_prior_booking(&mut tx, host.id, actor.id).await? {
            return Err(BookingError::NoPriorBooking);
        }

        let active_slots = recurring::active_slots_for_host(&mut tx, host.id).await?;
        if expand::overlaps_active_templates(&req.time_slots, &active_slots) {
            return Err(BookingError::RecurringTemplateConflict);
        }

        let mut instances: Vec<DateTime<Utc>> = req
            .time_slots
            .iter()
            .flat_map(|s| {
                expand::expand_slot(now, horizon, req.recurrence_pattern, s.weekday, s.time)
            })
            .collect();
        instances.sort();

        let intervals: Vec<_> = instances.iter().map(|s| conflict::lesson_interval(*s)).collect();
        let existing =
            bookings::find_conflicts(&mut tx, host.id, Some(actor.id), &intervals, None).await?;
        let conflict_starts = conflict::conflicting_starts(&intervals, &existing);

        let final_instances = if conflict_starts.is_empty() {
            instances
        } else {
            let Some(overrides) = &req.overrides else {
                let conflicts = self
                    .conflicts_with_alternatives(&mut tx, host.id, actor.id, &conflict_starts)
                    .await?;
                return Ok(RecurringBookingResponse::Conflicts { conflicts });
            };
            match expand::apply_overrides(instances, &conflict_starts, overrides)? {
                OverrideOutcome::Unhandled(unhandled) => {
                    let conflicts = self
                        .conflicts_with_alternatives(&mut tx, host.id, actor.id, &unhandled)
                        .await?;
                    return Ok(RecurringBookingResponse::Conflicts { conflicts });
                }
                OverrideOutcome::Resolved(resolved) => {
                    let intervals: Vec<_> =
                        resolved.iter().map(|s| conflict::lesson_interval(*s)).collect();
                    let still = bookings::find_conflicts(
                        &mut tx,
                        host.id,
                        Some(actor.id),
                        &intervals,
                        None,
                    )
                    .await?;
                    if !conflict::conflicting_starts(&intervals, &still).is_empty() {
                        return Err(BookingError::OverrideConflict);
                    }
                    resolved
                }
            }
        };

        let template = recurring::insert_template(
            &mut tx,
            host.id,
            req.recurrence_pattern,
            LESSON_MINUTES as i32,
        )
        .await?;
        for slot in &req.time_slots {
            recurring::insert_time_slot(&mut tx, template.id, slot.weekday, slot.time.to_naive_time())
                .await?;
        }
        for start in &final_instances {
            let (start_time, end_time) = conflict::lesson_interval(*start);
            let new = NewBooking {
                title: req.title.clone(),
                description: req.description.clone(),
                start_time,
                end_time,
                booking_type: BookingType::Lesson,
                status: BookingStatus::AwaitingStudentConfirmation,
                host_id: host.id,
                participant_ids: vec![actor.id],
                service_id: None,
                recurring_template_id: Some(template.id),
                price_cents: DEFAULT_LESSON_PRICE_CENTS,
            };
            bookings::insert(&mut tx, &new).await?;
        }

        tx.commit().await?;

        tracing::debug!(
            template_id = %template.id,
            instances = final_instances.len(),
            "recurring template created"
        );
        Ok(RecurringBookingResponse::Created {
            recurring_template_id: template.id,
        })
    }

    /// Build the conflict report: for every conflicting instant, the ±1h/±2h
    /// same-day alternatives that are free. One batched query covers the
    /// alternative candidates of all conflicts.
    async fn conflicts_with_alternatives(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        host_id: Uuid,
        participant_id: Uuid,
        conflict_starts: &[DateTime<Utc>],
    ) -> Result<Vec<TimeSlotConflict>, BookingError> {
        let candidates: Vec<(DateTime<Utc>, Vec<DateTime<Utc>>)> = conflict_starts
            .iter()
            .map(|start| (*start, conflict::alternative_starts(*start)))
            .collect();

        let all_intervals: Vec<_> = candidates
            .iter()
            .flat_map(|(_, alts)| alts.iter().map(|a| conflict::lesson_interval(*a)))
            .collect();
        let busy =
            bookings::find_conflicts(tx, host_id, Some(participant_id), &all_intervals, None)
                .await?;

        Ok(candidates
            .into_iter()
            .map(|(start, alts)| {
                let alternative_times = alts
                    .into_iter()
                    .filter(|alt| {
                        let (s, e) = conflict::lesson_interval(*alt);
                        !busy.iter().any(|b| b.overlaps(s, e))
                    })
                    .map(|alt| alt.format("%H:%M").to_string())
                    .collect();
                TimeSlotConflict {
                    conflict_time: format_utc_millis(start),
                    alternative_times,
                }
            })
            .collect())
    }
}
