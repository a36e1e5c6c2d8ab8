//! Consistency checks for insurance rate tables.
//!
//! `get_insurance_price` takes the first matching range, so a table is only
//! order independent when no two ranges intersect. The back office runs
//! these checks before accepting a new range.

use super::models::InsuranceRate;

/// Index of the first range in `existing` that intersects `candidate`.
///
/// Only pairs involving the candidate are compared, so a table that already
/// holds overlapping rows does not get blamed on a new, disjoint range.
pub fn find_overlap_with(existing: &[InsuranceRate], candidate: &InsuranceRate) -> Option<usize> {
    existing
        .iter()
        .position(|r| r.min_days <= candidate.max_days && candidate.min_days <= r.max_days)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn rate(min_days: i64, max_days: i64) -> InsuranceRate {
        InsuranceRate {
            min_days,
            max_days,
            price: dec!(100),
        }
    }

    #[test]
    fn test_adjacent_ranges_do_not_overlap() {
        let existing = vec![rate(1, 90), rate(181, 365)];
        assert_eq!(find_overlap_with(&existing, &rate(91, 180)), None);
    }

    #[test]
    fn test_shared_boundary_day_overlaps() {
        let existing = vec![rate(1, 90)];
        assert_eq!(find_overlap_with(&existing, &rate(90, 180)), Some(0));
    }

    #[test]
    fn test_overlap_detected_regardless_of_order() {
        let existing = vec![rate(181, 365), rate(1, 90)];
        assert_eq!(find_overlap_with(&existing, &rate(60, 120)), Some(1));
    }

    #[test]
    fn test_nested_range_overlaps() {
        assert_eq!(find_overlap_with(&[rate(1, 365)], &rate(30, 60)), Some(0));
        assert_eq!(find_overlap_with(&[rate(30, 60)], &rate(1, 365)), Some(0));
    }

    #[test]
    fn test_existing_overlaps_are_not_blamed_on_candidate() {
        let existing = vec![rate(1, 90), rate(60, 120)];
        assert_eq!(find_overlap_with(&existing, &rate(200, 365)), None);
        assert_eq!(find_overlap_with(&existing, &rate(100, 150)), Some(1));
    }

    #[test]
    fn test_empty_table_never_overlaps() {
        assert_eq!(find_overlap_with(&[], &rate(1, 30)), None);
    }
}
