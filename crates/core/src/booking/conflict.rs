//! Conflict detection over candidate intervals.
//!
//! The single-round-trip query lives in the db crate
//! (`queries::bookings::find_conflicts`); this module holds the in-memory
//! matching used to attribute returned rows back to candidates and to
//! propose alternative starts for the recurrence expander.

use chrono::{DateTime, Duration, Utc};
use tutorhub_db::models::Booking;
use tutorhub_types::time::{LESSON_MINUTES, TimeOfDay};

/// Hour offsets tried when proposing alternatives for a conflicting slot.
const ALTERNATIVE_HOUR_SHIFTS: [i32; 4] = [-2, -1, 1, 2];

/// Candidates whose `[start, end)` interval overlaps any of the returned
/// bookings, in candidate order.
pub fn conflicting_starts(
    candidates: &[(DateTime<Utc>, DateTime<Utc>)],
    existing: &[Booking],
) -> Vec<DateTime<Utc>> {
    candidates
        .iter()
        .filter(|(start, end)| existing.iter().any(|b| b.overlaps(*start, *end)))
        .map(|(start, _)| *start)
        .collect()
}

/// Candidate alternative starts for a conflicting instance: the same date
/// shifted by ±1h and ±2h, keeping only starts that stay on the 15-minute
/// grid within the day. Whether they are actually free is decided by one
/// batched conflict query over all candidates.
pub fn alternative_starts(conflict_start: DateTime<Utc>) -> Vec<DateTime<Utc>> {
    let time = TimeOfDay::from_naive_time(conflict_start.time());
    let mut out: Vec<DateTime<Utc>> = ALTERNATIVE_HOUR_SHIFTS
        .iter()
        .filter_map(|&shift| {
            let shifted = time.shifted_by_hours(shift)?;
            shifted
                .is_valid_slot()
                .then(|| conflict_start + Duration::hours(shift as i64))
        })
        .collect();
    out.sort();
    out
}

/// Interval covered by a lesson starting at `start`.
pub fn lesson_interval(start: DateTime<Utc>) -> (DateTime<Utc>, DateTime<Utc>) {
    (start, start + Duration::minutes(LESSON_MINUTES as i64))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tutorhub_types::{BookingStatus, BookingType};
    use uuid::Uuid;

    fn instant(day: u32, h: u32, m: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2030, 1, day, h, m, 0).unwrap()
    }

    fn scheduled(start: DateTime<Utc>) -> Booking {
        Booking {
            id: Uuid::new_v4(),
            title: "busy".into(),
            description: None,
            start_time: start,
            end_time: start + Duration::minutes(60),
            booking_type: BookingType::Lesson,
            status: BookingStatus::Scheduled,
            host_id: Uuid::new_v4(),
            service_id: None,
            recurring_template_id: None,
            price_cents: 0,
            participant_ids: vec![],
            created_at: start,
            updated_at: start,
        }
    }

    #[test]
    fn attributes_existing_rows_back_to_candidates() {
        let busy = scheduled(instant(14, 10, 0));
        let candidates = vec![
            lesson_interval(instant(14, 10, 0)),
            lesson_interval(instant(21, 10, 0)),
        ];
        let conflicts = conflicting_starts(&candidates, std::slice::from_ref(&busy));
        assert_eq!(conflicts, vec![instant(14, 10, 0)]);
    }

    #[test]
    fn alternatives_are_hour_shifts_on_the_same_day() {
        let alts = alternative_starts(instant(14, 10, 0));
        assert_eq!(
            alts,
            vec![
                instant(14, 8, 0),
                instant(14, 9, 0),
                instant(14, 11, 0),
                instant(14, 12, 0),
            ]
        );
    }

    #[test]
    fn alternatives_never_leave_the_day() {
        // 01:00 can only shift forward past -1h; -2h would cross midnight.
        let alts = alternative_starts(instant(14, 1, 0));
        assert_eq!(
            alts,
            vec![instant(14, 0, 0), instant(14, 2, 0), instant(14, 3, 0)]
        );
        // 22:30 +1h starts a lesson that would cross midnight; +2h leaves
        // the day entirely.
        let alts = alternative_starts(instant(14, 22, 30));
        assert_eq!(alts, vec![instant(14, 20, 30), instant(14, 21, 30)]);
    }
}
