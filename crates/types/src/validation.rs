//! Cross-field request refinements evaluated at the command boundary.
//!
//! Field-level rules live on the DTOs (validator derive); anything that
//! relates two fields is an explicit function here.

use crate::enums::{SortDirection, SortField};
use chrono::{DateTime, Utc};

/// Default and maximum page sizes for list endpoints.
pub const DEFAULT_PAGE_SIZE: i64 = 10;
pub const MAX_PAGE_SIZE: i64 = 100;

/// Normalize a requested page number (1-based).
pub fn normalize_page(page: Option<i64>) -> i64 {
    page.unwrap_or(1).max(1)
}

/// Normalize a requested page size into `[1, MAX_PAGE_SIZE]`.
pub fn normalize_limit(limit: Option<i64>) -> i64 {
    limit.unwrap_or(DEFAULT_PAGE_SIZE).clamp(1, MAX_PAGE_SIZE)
}

/// `startDate` must not come after `endDate` when both are present.
pub fn validate_date_range(
    start: Option<DateTime<Utc>>,
    end: Option<DateTime<Utc>>,
) -> Result<(), String> {
    match (start, end) {
        (Some(start), Some(end)) if start > end => {
            Err("startDate must be before or equal to endDate".to_string())
        }
        _ => Ok(()),
    }
}

/// Sort field and direction must be supplied together or not at all.
pub fn validate_sort(
    field: Option<SortField>,
    direction: Option<SortDirection>,
) -> Result<(SortField, SortDirection), String> {
    match (field, direction) {
        (Some(field), Some(direction)) => Ok((field, direction)),
        (None, None) => Ok((SortField::default(), SortDirection::default())),
        _ => Err("sortField and sortDirection must be provided together".to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_pagination() {
        assert_eq!(normalize_page(None), 1);
        assert_eq!(normalize_page(Some(0)), 1);
        assert_eq!(normalize_page(Some(7)), 7);
        assert_eq!(normalize_limit(None), 10);
        assert_eq!(normalize_limit(Some(500)), 100);
        assert_eq!(normalize_limit(Some(-3)), 1);
    }

    #[test]
    fn test_validate_date_range() {
        let earlier = "2030-01-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap();
        let later = "2030-02-01T00:00:00Z".parse::<DateTime<Utc>>().unwrap();
        assert!(validate_date_range(Some(earlier), Some(later)).is_ok());
        assert!(validate_date_range(Some(later), Some(earlier)).is_err());
        assert!(validate_date_range(None, Some(earlier)).is_ok());
        assert!(validate_date_range(Some(earlier), Some(earlier)).is_ok());
    }

    #[test]
    fn test_validate_sort_pairing() {
        assert!(validate_sort(Some(SortField::StartTime), Some(SortDirection::Asc)).is_ok());
        let (field, direction) = validate_sort(None, None).unwrap();
        assert_eq!(field, SortField::StartTime);
        assert_eq!(direction, SortDirection::Desc);
        assert!(validate_sort(Some(SortField::CreatedAt), None).is_err());
        assert!(validate_sort(None, Some(SortDirection::Asc)).is_err());
    }
}
