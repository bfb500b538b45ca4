//! Pure expansion of a recurring template request into concrete lesson
//! instants, plus override resolution. No I/O here; the command module owns
//! the transaction and the conflict queries.

use chrono::{DateTime, Datelike, Duration, Months, NaiveTime, Utc};
use std::collections::HashMap;
use tutorhub_db::models::RecurringTimeSlot;
use tutorhub_types::{
    api::{OverrideInput, TimeSlotInput},
    format_utc_millis,
    time::LESSON_MINUTES,
    BookingError, RecurrencePattern, TimeOfDay, Weekday,
};

/// End of the expansion window: one month after today's midnight UTC.
pub fn horizon_end(now: DateTime<Utc>) -> Option<DateTime<Utc>> {
    now.date_naive()
        .and_time(NaiveTime::MIN)
        .and_utc()
        .checked_add_months(Months::new(1))
}

/// First instant at or after `now` falling on `weekday` at `time` (UTC).
pub fn first_occurrence(now: DateTime<Utc>, weekday: Weekday, time: TimeOfDay) -> DateTime<Utc> {
    let today = now.date_naive();
    let days_ahead = (weekday.to_chrono().num_days_from_monday() as i64
        - today.weekday().num_days_from_monday() as i64)
        .rem_euclid(7);
    let candidate = (today + Duration::days(days_ahead))
        .and_time(time.to_naive_time())
        .and_utc();
    if candidate < now {
        candidate + Duration::days(7)
    } else {
        candidate
    }
}

/// All instants of one slot within `[now, horizon)` stepped by the pattern.
pub fn expand_slot(
    now: DateTime<Utc>,
    horizon: DateTime<Utc>,
    pattern: RecurrencePattern,
    weekday: Weekday,
    time: TimeOfDay,
) -> Vec<DateTime<Utc>> {
    let mut out = Vec::new();
    let mut current = first_occurrence(now, weekday, time);
    while current < horizon {
        out.push(current);
        current = match pattern {
            RecurrencePattern::Weekly => current + Duration::weeks(1),
            RecurrencePattern::Biweekly => current + Duration::weeks(2),
            RecurrencePattern::Monthly => match current.checked_add_months(Months::new(1)) {
                Some(next) => next,
                None => break,
            },
        };
    }
    out
}

/// Request-level slot validation: non-empty, on the grid, inside the day,
/// and no two slots of the same weekday within one lesson of each other.
pub fn validate_slots(slots: &[TimeSlotInput]) -> Result<(), BookingError> {
    if slots.is_empty() {
        return Err(BookingError::InvalidTimeSlot);
    }
    if slots.iter().any(|s| !s.time.is_valid_slot()) {
        return Err(BookingError::InvalidTimeSlot);
    }
    for (i, a) in slots.iter().enumerate() {
        for b in &slots[i + 1..] {
            if a.weekday == b.weekday && windows_overlap(a.time, b.time) {
                return Err(BookingError::OverlappingTimeSlots);
            }
        }
    }
    Ok(())
}

/// Whether any requested slot overlaps the 60-minute window of an ACTIVE
/// template slot on the same weekday.
pub fn overlaps_active_templates(
    slots: &[TimeSlotInput],
    existing: &[RecurringTimeSlot],
) -> bool {
    slots.iter().any(|s| {
        existing.iter().any(|e| {
            e.weekday == s.weekday
                && windows_overlap(s.time, TimeOfDay::from_naive_time(e.time_of_day))
        })
    })
}

fn windows_overlap(a: TimeOfDay, b: TimeOfDay) -> bool {
    let a = a.minutes_from_midnight() as i64;
    let b = b.minutes_from_midnight() as i64;
    (a - b).abs() < LESSON_MINUTES as i64
}

/// Result of matching conflicts against the supplied overrides.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OverrideOutcome {
    /// Conflicts the caller did not address; reported back, nothing written.
    Unhandled(Vec<DateTime<Utc>>),
    /// Final instance list with every conflict dropped or moved.
    Resolved(Vec<DateTime<Utc>>),
}

/// Apply user-supplied overrides to the expanded instances.
///
/// Override keys are the conflicting instants in wire format; every conflict
/// must be addressed or the whole set is returned as unhandled. A move stays
/// on the same date and must land on a valid slot.
pub fn apply_overrides(
    instances: Vec<DateTime<Utc>>,
    conflicts: &[DateTime<Utc>],
    overrides: &[OverrideInput],
) -> Result<OverrideOutcome, BookingError> {
    let by_key: HashMap<&str, &OverrideInput> = overrides
        .iter()
        .map(|o| (o.conflict_time.as_str(), o))
        .collect();

    let mut handled: HashMap<DateTime<Utc>, &OverrideInput> = HashMap::new();
    let mut unhandled = Vec::new();
    for conflict in conflicts {
        match by_key.get(format_utc_millis(*conflict).as_str()) {
            Some(o) => {
                handled.insert(*conflict, o);
            }
            None => unhandled.push(*conflict),
        }
    }
    if !unhandled.is_empty() {
        return Ok(OverrideOutcome::Unhandled(unhandled));
    }

    let mut resolved = Vec::with_capacity(instances.len());
    for instance in instances {
        let Some(o) = handled.get(&instance) else {
            resolved.push(instance);
            continue;
        };
        if o.cancel {
            continue;
        }
        let new_time = o
            .new_time_of_day
            .ok_or_else(|| {
                BookingError::InvalidInput(
                    "override must either cancel or supply newTimeOfDay".to_string(),
                )
            })?;
        if !new_time.is_valid_slot() {
            return Err(BookingError::InvalidOverrideTime);
        }
        resolved.push(
            instance
                .date_naive()
                .and_time(new_time.to_naive_time())
                .and_utc(),
        );
    }
    resolved.sort();
    Ok(OverrideOutcome::Resolved(resolved))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn slot(weekday: Weekday, time: &str) -> TimeSlotInput {
        TimeSlotInput {
            weekday,
            time: time.parse().unwrap(),
        }
    }

    // 2030-01-15 is a Tuesday.
    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, 15, 12, 0, 0).unwrap()
    }

    fn monday(day: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, day, h, 0, 0).unwrap()
    }

    #[test]
    fn horizon_is_one_month_after_midnight() {
        let horizon = horizon_end(now()).unwrap();
        assert_eq!(horizon, Utc.with_ymd_and_hms(2030, 2, 15, 0, 0, 0).unwrap());
    }

    #[test]
    fn first_occurrence_skips_to_next_week_when_passed() {
        // Tuesday 09:00 already passed today at 12:00.
        let first = first_occurrence(now(), Weekday::Tuesday, "09:00".parse().unwrap());
        assert_eq!(first, Utc.with_ymd_and_hms(2030, 1, 22, 9, 0, 0).unwrap());
        // Tuesday 14:00 is still ahead today.
        let first = first_occurrence(now(), Weekday::Tuesday, "14:00".parse().unwrap());
        assert_eq!(first, Utc.with_ymd_and_hms(2030, 1, 15, 14, 0, 0).unwrap());
    }

    #[test]
    fn weekly_expansion_fills_the_horizon() {
        let horizon = horizon_end(now()).unwrap();
        let instances = expand_slot(
            now(),
            horizon,
            RecurrencePattern::Weekly,
            Weekday::Monday,
            "10:00".parse().unwrap(),
        );
        assert_eq!(
            instances,
            vec![
                monday(21, 10),
                monday(28, 10),
                Utc.with_ymd_and_hms(2030, 2, 4, 10, 0, 0).unwrap(),
                Utc.with_ymd_and_hms(2030, 2, 11, 10, 0, 0).unwrap(),
            ]
        );
        // Every instance starts before the horizon.
        assert!(instances.iter().all(|i| *i < horizon));
    }

    #[test]
    fn biweekly_and_monthly_step_sizes() {
        let horizon = horizon_end(now()).unwrap();
        let biweekly = expand_slot(
            now(),
            horizon,
            RecurrencePattern::Biweekly,
            Weekday::Monday,
            "10:00".parse().unwrap(),
        );
        assert_eq!(
            biweekly,
            vec![monday(21, 10), Utc.with_ymd_and_hms(2030, 2, 4, 10, 0, 0).unwrap()]
        );

        let monthly = expand_slot(
            now(),
            horizon,
            RecurrencePattern::Monthly,
            Weekday::Monday,
            "10:00".parse().unwrap(),
        );
        assert_eq!(monthly, vec![monday(21, 10)]);
    }

    #[test]
    fn slot_validation_rejects_bad_grids_and_overlaps() {
        assert!(matches!(
            validate_slots(&[]),
            Err(BookingError::InvalidTimeSlot)
        ));
        assert!(matches!(
            validate_slots(&[slot(Weekday::Monday, "10:10")]),
            Err(BookingError::InvalidTimeSlot)
        ));
        assert!(matches!(
            validate_slots(&[slot(Weekday::Monday, "23:30")]),
            Err(BookingError::InvalidTimeSlot)
        ));
        assert!(matches!(
            validate_slots(&[slot(Weekday::Monday, "10:00"), slot(Weekday::Monday, "10:45")]),
            Err(BookingError::OverlappingTimeSlots)
        ));
        // Same time on different weekdays is fine; an hour apart on the
        // same weekday is fine.
        assert!(validate_slots(&[
            slot(Weekday::Monday, "10:00"),
            slot(Weekday::Friday, "10:00"),
            slot(Weekday::Monday, "11:00"),
        ])
        .is_ok());
    }

    #[test]
    fn template_window_overlap_is_per_weekday() {
        let existing = RecurringTimeSlot {
            id: uuid::Uuid::new_v4(),
            template_id: uuid::Uuid::new_v4(),
            weekday: Weekday::Monday,
            time_of_day: chrono::NaiveTime::from_hms_opt(10, 0, 0).unwrap(),
        };
        assert!(overlaps_active_templates(
            &[slot(Weekday::Monday, "10:45")],
            std::slice::from_ref(&existing)
        ));
        assert!(!overlaps_active_templates(
            &[slot(Weekday::Monday, "11:00")],
            std::slice::from_ref(&existing)
        ));
        assert!(!overlaps_active_templates(
            &[slot(Weekday::Tuesday, "10:00")],
            &[existing]
        ));
    }

    #[test]
    fn overrides_must_cover_every_conflict() {
        let instances = vec![monday(21, 10), monday(28, 10)];
        let conflicts = vec![monday(21, 10)];
        let overrides = vec![OverrideInput {
            conflict_time: "2030-01-28T10:00:00.000Z".to_string(),
            new_time_of_day: None,
            cancel: true,
        }];
        let outcome = apply_overrides(instances, &conflicts, &overrides).unwrap();
        assert_eq!(outcome, OverrideOutcome::Unhandled(vec![monday(21, 10)]));
    }

    #[test]
    fn cancel_override_drops_the_instance() {
        let instances = vec![monday(21, 10), monday(28, 10)];
        let conflicts = vec![monday(21, 10)];
        let overrides = vec![OverrideInput {
            conflict_time: "2030-01-21T10:00:00.000Z".to_string(),
            new_time_of_day: None,
            cancel: true,
        }];
        let outcome = apply_overrides(instances, &conflicts, &overrides).unwrap();
        assert_eq!(outcome, OverrideOutcome::Resolved(vec![monday(28, 10)]));
    }

    #[test]
    fn move_override_stays_on_the_same_date() {
        let instances = vec![monday(21, 10)];
        let conflicts = vec![monday(21, 10)];
        let overrides = vec![OverrideInput {
            conflict_time: "2030-01-21T10:00:00.000Z".to_string(),
            new_time_of_day: Some("12:00".parse().unwrap()),
            cancel: false,
        }];
        let outcome = apply_overrides(instances, &conflicts, &overrides).unwrap();
        assert_eq!(outcome, OverrideOutcome::Resolved(vec![monday(21, 12)]));
    }

    #[test]
    fn move_override_rejects_off_grid_times() {
        let instances = vec![monday(21, 10)];
        let conflicts = vec![monday(21, 10)];
        let overrides = vec![OverrideInput {
            conflict_time: "2030-01-21T10:00:00.000Z".to_string(),
            new_time_of_day: Some("23:30".parse().unwrap()),
            cancel: false,
        }];
        assert!(matches!(
            apply_overrides(instances, &conflicts, &overrides),
            Err(BookingError::InvalidOverrideTime)
        ));
    }

    #[test]
    fn override_without_action_is_invalid() {
        let instances = vec![monday(21, 10)];
        let conflicts = vec![monday(21, 10)];
        let overrides = vec![OverrideInput {
            conflict_time: "2030-01-21T10:00:00.000Z".to_string(),
            new_time_of_day: None,
            cancel: false,
        }];
        assert!(matches!(
            apply_overrides(instances, &conflicts, &overrides),
            Err(BookingError::InvalidInput(_))
        ));
    }
}
