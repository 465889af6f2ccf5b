// Calendar helpers and date expression parsing

use anyhow::Result;
use chrono::{DateTime, Datelike, Duration, NaiveDate, Utc};

/// Parse a date expression into a calendar date.
/// Supports `YYYY-MM-DD`, `today`, `yesterday` and `tomorrow` (UTC).
pub fn parse_date_expr(expr: &str) -> Result<NaiveDate> {
    parse_date_expr_at(expr, Utc::now().date_naive())
}

/// Same as [`parse_date_expr`], relative to a fixed `today`
pub fn parse_date_expr_at(expr: &str, today: NaiveDate) -> Result<NaiveDate> {
    let expr = expr.trim();
    if let Ok(date) = NaiveDate::parse_from_str(expr, "%Y-%m-%d") {
        return Ok(date);
    }

    match expr.to_lowercase().as_str() {
        "today" => Ok(today),
        "yesterday" => Ok(today - Duration::days(1)),
        "tomorrow" => Ok(today + Duration::days(1)),
        _ => anyhow::bail!(
            "Unsupported date expression: {}. Use YYYY-MM-DD, today, yesterday or tomorrow.",
            expr
        ),
    }
}

/// UTC calendar date of an instant
pub fn to_date(ts: DateTime<Utc>) -> NaiveDate {
    ts.date_naive()
}

/// Monday of the week containing `date`
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

/// Every date from `start` to `end` inclusive
pub fn date_range(start: NaiveDate, end: NaiveDate) -> Vec<NaiveDate> {
    start.iter_days().take_while(|d| *d <= end).collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn d(y: i32, m: u32, day: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, day).unwrap()
    }

    #[test]
    fn test_parse_date_expr() {
        let today = d(2024, 5, 15);
        assert_eq!(parse_date_expr_at("2024-01-10", today).unwrap(), d(2024, 1, 10));
        assert_eq!(parse_date_expr_at("today", today).unwrap(), today);
        assert_eq!(parse_date_expr_at("Yesterday", today).unwrap(), d(2024, 5, 14));
        assert_eq!(parse_date_expr_at("tomorrow", today).unwrap(), d(2024, 5, 16));
        assert!(parse_date_expr_at("next week", today).is_err());
        assert!(parse_date_expr_at("2024-13-01", today).is_err());
    }

    #[test]
    fn test_to_date_truncates_time() {
        let ts = Utc.with_ymd_and_hms(2024, 2, 29, 23, 59, 59).unwrap();
        assert_eq!(to_date(ts), d(2024, 2, 29));
    }

    #[test]
    fn test_week_start() {
        // 2024-05-15 is a Wednesday
        assert_eq!(week_start(d(2024, 5, 15)), d(2024, 5, 13));
        assert_eq!(week_start(d(2024, 5, 13)), d(2024, 5, 13));
        assert_eq!(week_start(d(2024, 5, 19)), d(2024, 5, 13));
    }

    #[test]
    fn test_date_range_inclusive() {
        let range = date_range(d(2024, 2, 27), d(2024, 3, 1));
        assert_eq!(range, vec![d(2024, 2, 27), d(2024, 2, 28), d(2024, 2, 29), d(2024, 3, 1)]);
        assert!(date_range(d(2024, 3, 2), d(2024, 3, 1)).is_empty());
    }
}
