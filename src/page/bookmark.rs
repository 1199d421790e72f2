// File: ./src/page/bookmark.rs
use chrono::{Datelike, NaiveDate};
use serde::Serialize;
use std::fmt;

/// Symbolic, document-unique name of a link destination.
///
/// Names are derived from the calendar position of a page only, so the same
/// period always yields the same name:
///
/// - `year_2026_page3` (quarter page), `month_2026_07`, `week_2026_W27`
///   (ISO week-numbering year and week), `day_2026_07_04_schedule`,
///   `day_2026_07_04_tasks`, `notes`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct Bookmark(String);

impl Bookmark {
    pub fn year_quarter(year: i32, quarter: u32) -> Self {
        Self(format!("year_{}_page{}", year, quarter))
    }

    /// Quarter page containing `date` (months 1-3 → 1, ..., 10-12 → 4).
    pub fn quarter_of(date: NaiveDate) -> Self {
        Self::year_quarter(date.year(), quarter_of_month(date.month()))
    }

    pub fn month(year: i32, month: u32) -> Self {
        Self(format!("month_{}_{:02}", year, month))
    }

    pub fn week(iso_year: i32, iso_week: u32) -> Self {
        Self(format!("week_{}_W{:02}", iso_year, iso_week))
    }

    /// Week page of the ISO week containing `date`.
    pub fn week_of(date: NaiveDate) -> Self {
        let iso = date.iso_week();
        Self::week(iso.year(), iso.week())
    }

    pub fn day_schedule(date: NaiveDate) -> Self {
        Self(format!(
            "day_{}_{:02}_{:02}_schedule",
            date.year(),
            date.month(),
            date.day()
        ))
    }

    pub fn day_tasks(date: NaiveDate) -> Self {
        Self(format!(
            "day_{}_{:02}_{:02}_tasks",
            date.year(),
            date.month(),
            date.day()
        ))
    }

    pub fn notes() -> Self {
        Self("notes".to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Bookmark {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

pub fn quarter_of_month(month: u32) -> u32 {
    (month.clamp(1, 12) - 1) / 3 + 1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn names_are_zero_padded() {
        let d = NaiveDate::from_ymd_opt(2026, 7, 4).unwrap();
        assert_eq!(Bookmark::month(2026, 7).as_str(), "month_2026_07");
        assert_eq!(Bookmark::day_schedule(d).as_str(), "day_2026_07_04_schedule");
        assert_eq!(Bookmark::day_tasks(d).as_str(), "day_2026_07_04_tasks");
        assert_eq!(Bookmark::quarter_of(d).as_str(), "year_2026_page3");
    }

    #[test]
    fn week_uses_iso_year() {
        // Monday 2025-12-29 starts ISO week 1 of 2026.
        let d = NaiveDate::from_ymd_opt(2025, 12, 29).unwrap();
        assert_eq!(Bookmark::week_of(d).as_str(), "week_2026_W01");
    }

    #[test]
    fn quarter_boundaries() {
        assert_eq!(quarter_of_month(1), 1);
        assert_eq!(quarter_of_month(3), 1);
        assert_eq!(quarter_of_month(4), 2);
        assert_eq!(quarter_of_month(7), 3);
        assert_eq!(quarter_of_month(12), 4);
    }
}
