use chrono::{Datelike, Months, NaiveDate};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

use crate::error::AppError;

/// Inclusive calendar bounds used to filter every report and list query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
pub struct DateRange {
    #[schema(example = "2024-02-01", value_type = String, format = "date")]
    pub start_date: NaiveDate,
    #[schema(example = "2024-02-29", value_type = String, format = "date")]
    pub end_date: NaiveDate,
}

impl DateRange {
    /// `"YYYY-MM"` of the month the range starts in.
    pub fn month_token(&self) -> String {
        self.start_date.format("%Y-%m").to_string()
    }

    #[cfg(test)]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// Parses a `"YYYY-MM"` token into the full calendar month.
pub fn month_range(token: &str) -> Result<DateRange, AppError> {
    let invalid = || AppError::validation(format!("Invalid month {token:?}, expected YYYY-MM"));

    let (year, month) = token.trim().split_once('-').ok_or_else(invalid)?;
    let digits = |s: &str| s.chars().all(|c| c.is_ascii_digit());
    if year.len() != 4 || month.len() != 2 || !digits(year) || !digits(month) {
        return Err(invalid());
    }
    let year: i32 = year.parse().map_err(|_| invalid())?;
    let month: u32 = month.parse().map_err(|_| invalid())?;

    let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
    Ok(month_range_of(first))
}

/// Start-of-month / end-of-month for an already parsed date.
pub fn month_range_of(date: NaiveDate) -> DateRange {
    // Day 1 always exists for a valid date's month.
    let start_date = date.with_day(1).unwrap_or(date);
    let end_date = start_date
        .checked_add_months(Months::new(1))
        .and_then(|next| next.pred_opt())
        .unwrap_or(NaiveDate::MAX);

    DateRange {
        start_date,
        end_date,
    }
}

/// The `count` months ending with the anchor's month, oldest first.
pub fn trailing_months(anchor: &DateRange, count: u32) -> Vec<DateRange> {
    (0..count)
        .rev()
        .filter_map(|offset| {
            anchor
                .start_date
                .checked_sub_months(Months::new(offset))
                .map(month_range_of)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ymd(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    #[test]
    fn leap_february_ends_on_29th() {
        let range = month_range("2024-02").unwrap();
        assert_eq!(range.start_date, ymd(2024, 2, 1));
        assert_eq!(range.end_date, ymd(2024, 2, 29));
    }

    #[test]
    fn common_february_and_thirty_day_months() {
        assert_eq!(month_range("2023-02").unwrap().end_date, ymd(2023, 2, 28));
        assert_eq!(month_range("2023-04").unwrap().end_date, ymd(2023, 4, 30));
        assert_eq!(month_range("2023-11").unwrap().end_date, ymd(2023, 11, 30));
    }

    #[test]
    fn december_rolls_over_year() {
        let range = month_range("2023-12").unwrap();
        assert_eq!(range.end_date, ymd(2023, 12, 31));
        assert_eq!(range.month_token(), "2023-12");
    }

    #[test]
    fn every_month_ends_the_day_before_the_next_starts() {
        for year in [1900, 2000, 2023, 2024] {
            for month in 1..=12 {
                let range = month_range(&format!("{year:04}-{month:02}")).unwrap();
                let next = range.end_date.succ_opt().unwrap();
                assert_eq!(next.day(), 1, "{year}-{month}");
                assert_ne!(next.month(), month);
            }
        }
    }

    #[test]
    fn rejects_malformed_tokens() {
        for token in [
            "", "2024", "2024-13", "2024-00", "24-01", "2024-1", "abcd-ef", "2024/01",
            "+202-01", "2024-+1", "-024-01", "2024- 1",
        ] {
            assert!(month_range(token).is_err(), "{token} should be rejected");
        }
    }

    #[test]
    fn parsed_date_variant_matches_token_variant() {
        assert_eq!(month_range_of(ymd(2024, 2, 17)), month_range("2024-02").unwrap());
    }

    #[test]
    fn contains_is_inclusive() {
        let range = month_range("2023-04").unwrap();
        assert!(range.contains(ymd(2023, 4, 1)));
        assert!(range.contains(ymd(2023, 4, 30)));
        assert!(!range.contains(ymd(2023, 5, 1)));
    }

    #[test]
    fn trailing_months_cross_year_boundary() {
        let anchor = month_range("2024-03").unwrap();
        let months: Vec<String> = trailing_months(&anchor, 12)
            .iter()
            .map(DateRange::month_token)
            .collect();

        assert_eq!(months.len(), 12);
        assert_eq!(months.first().map(String::as_str), Some("2023-04"));
        assert_eq!(months.last().map(String::as_str), Some("2024-03"));
        assert!(months.contains(&"2024-01".to_string()));
    }
}
