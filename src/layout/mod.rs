// File: ./src/layout/mod.rs
//! Page layout engines and the geometry they share.
//!
//! Every engine gets the page geometry and its view model, draws into a
//! `Canvas` and records links by bookmark name. Engines never see page
//! ordinals.
use crate::draw::{Canvas, INCH, Rect};
use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};
use std::ops::RangeInclusive;
use unicode_width::UnicodeWidthChar;

pub mod daily;
pub mod monthly;
pub mod notes;
pub mod weekly;
pub mod yearly;

pub use daily::{DailySchedule, DailyTasks};
pub use monthly::MonthlyOverview;
pub use notes::NotesPage;
pub use weekly::WeeklyPage;
pub use yearly::YearlyOverview;

pub const MINUTES_PER_DAY: u32 = 24 * 60;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageGeometry {
    pub width: f32,
    pub height: f32,
    pub margin: f32,
}

impl PageGeometry {
    /// US Letter with half-inch margins.
    pub fn letter() -> Self {
        Self {
            width: 8.5 * INCH,
            height: 11.0 * INCH,
            margin: 0.5 * INCH,
        }
    }

    pub fn content_width(&self) -> f32 {
        self.width - 2.0 * self.margin
    }

    pub fn right(&self) -> f32 {
        self.width - self.margin
    }

    /// Baseline `offset` below the top edge.
    pub fn from_top(&self, offset: f32) -> f32 {
        self.height - offset
    }
}

impl Default for PageGeometry {
    fn default() -> Self {
        Self::letter()
    }
}

/// Vertical slot an event occupies on a [`TimeGrid`].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Placement {
    /// `floor((start - grid start) / step)` after clipping.
    pub row: u32,
    /// Exact start position in rows.
    pub offset: f32,
    /// Duration in rows after clipping.
    pub span: f32,
    pub clipped: bool,
}

impl Placement {
    /// Rows touched by the event, inclusive.
    pub fn occupied_rows(&self) -> RangeInclusive<u32> {
        let last = ((self.offset + self.span).ceil() as u32).saturating_sub(1).max(self.row);
        self.row..=last
    }
}

/// Rows of fixed duration starting at a time of day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeGrid {
    start_minute: u32,
    step_minutes: u32,
    rows: u32,
}

impl TimeGrid {
    /// The window is cut at midnight when `rows * step` would run past it.
    pub fn new(start: NaiveTime, step_minutes: u32, rows: u32) -> Self {
        let start_minute = start.hour() * 60 + start.minute();
        let step_minutes = step_minutes.clamp(1, MINUTES_PER_DAY);
        let max_rows = (MINUTES_PER_DAY - start_minute).div_ceil(step_minutes);
        Self {
            start_minute,
            step_minutes,
            rows: rows.clamp(1, max_rows.max(1)),
        }
    }

    /// Like [`TimeGrid::new`] but `None` unless the window is non-empty and
    /// ends by midnight.
    pub fn checked(start: NaiveTime, step_minutes: u32, rows: u32) -> Option<Self> {
        if step_minutes == 0 || rows == 0 {
            return None;
        }
        let start_minute = start.hour() * 60 + start.minute();
        let end = step_minutes
            .checked_mul(rows)
            .and_then(|span| span.checked_add(start_minute))?;
        (end <= MINUTES_PER_DAY).then_some(Self {
            start_minute,
            step_minutes,
            rows,
        })
    }

    /// Whole hours from `start_hour` to `end_hour`.
    pub fn hourly(start_hour: u32, end_hour: u32) -> Self {
        let start_hour = start_hour.min(23);
        let end_hour = end_hour.clamp(start_hour + 1, 24);
        Self {
            start_minute: start_hour * 60,
            step_minutes: 60,
            rows: end_hour - start_hour,
        }
    }

    pub fn rows(&self) -> u32 {
        self.rows
    }

    pub fn step_minutes(&self) -> u32 {
        self.step_minutes
    }

    pub fn start_minute(&self) -> u32 {
        self.start_minute
    }

    pub fn end_minute(&self) -> u32 {
        self.step_minutes
            .checked_mul(self.rows)
            .and_then(|span| span.checked_add(self.start_minute))
            .map_or(MINUTES_PER_DAY, |end| end.min(MINUTES_PER_DAY))
    }

    /// "HH:MM-HH:MM" for `row`.
    pub fn row_label(&self, row: u32) -> String {
        let from = self.start_minute + row * self.step_minutes;
        let to = from + self.step_minutes;
        format!("{}-{}", clock(from), clock(to))
    }

    /// "HH:MM" at the top of `row`.
    pub fn row_start_label(&self, row: u32) -> String {
        clock(self.start_minute + row * self.step_minutes)
    }

    /// Places a timed event. Events are clipped to the window of their start
    /// day; anything entirely outside, or empty after clipping, is `None`.
    pub fn place(&self, start: NaiveDateTime, end: NaiveDateTime) -> Option<Placement> {
        if end <= start {
            return None;
        }
        let s = minute_of_day(start.time());
        let e = if end.date() > start.date() {
            MINUTES_PER_DAY as f32
        } else {
            minute_of_day(end.time())
        };

        let window_start = self.start_minute as f32;
        let window_end = self.end_minute() as f32;
        let clipped_start = s.max(window_start);
        let clipped_end = e.min(window_end);
        if clipped_end <= clipped_start {
            return None;
        }

        let step = self.step_minutes as f32;
        let offset = (clipped_start - window_start) / step;
        Some(Placement {
            row: offset.floor() as u32,
            offset,
            span: (clipped_end - clipped_start) / step,
            clipped: clipped_start != s || clipped_end != e,
        })
    }
}

fn minute_of_day(t: NaiveTime) -> f32 {
    t.num_seconds_from_midnight() as f32 / 60.0
}

fn clock(minute: u32) -> String {
    format!("{:02}:{:02}", minute / 60, minute % 60)
}

/// Character budget for a label and how it is cut.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Truncation {
    pub budget: usize,
    pub keep: usize,
    pub marker: &'static str,
}

impl Truncation {
    pub const YEARLY_ITEM: Truncation = Truncation {
        budget: 20,
        keep: 19,
        marker: "..",
    };

    pub const WEEKLY_EVENT: Truncation = Truncation {
        budget: 15,
        keep: 12,
        marker: "...",
    };

    /// Budget for `width` points of Courier at `font_size`.
    pub fn for_width(width: f32, font_size: f32) -> Truncation {
        let budget = (width / (0.6 * font_size)).floor().max(0.0) as usize;
        Truncation {
            budget,
            keep: budget.saturating_sub(3),
            marker: "...",
        }
    }

    /// Display columns count, so wide characters take two.
    pub fn apply(&self, text: &str) -> String {
        if unicode_width::UnicodeWidthStr::width(text) <= self.budget {
            return text.to_string();
        }
        let mut out = String::new();
        let mut used = 0;
        for c in text.chars() {
            let w = c.width().unwrap_or(0);
            if used + w > self.keep {
                break;
            }
            used += w;
            out.push(c);
        }
        out.push_str(self.marker);
        out
    }
}

pub fn days_in_month(year: i32, month: u32) -> u32 {
    let first = NaiveDate::from_ymd_opt(year, month, 1);
    let next = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    };
    match (first, next) {
        (Some(a), Some(b)) => (b - a).num_days() as u32,
        _ => 0,
    }
}

/// Mondays of every week that contains a day of the month, in order.
pub fn month_week_starts(year: i32, month: u32) -> Vec<NaiveDate> {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Vec::new();
    };
    let last = first + Duration::days(days_in_month(year, month) as i64 - 1);
    let mut monday = week_start(first);
    let mut weeks = Vec::new();
    while monday <= last {
        weeks.push(monday);
        monday += Duration::days(7);
    }
    weeks
}

pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(date.weekday().num_days_from_monday() as i64)
}

pub fn is_weekend(date: NaiveDate) -> bool {
    date.weekday().num_days_from_monday() >= 5
}

pub fn month_name(month: u32) -> String {
    NaiveDate::from_ymd_opt(2000, month.clamp(1, 12), 1)
        .map(|d| d.format("%B").to_string())
        .unwrap_or_default()
}

/// Hotspot around a text baseline, sized from the canvas font.
pub(crate) fn text_hotspot(canvas: &Canvas, x: f32, y: f32, text: &str) -> Rect {
    let size = canvas.style().font_size;
    let pad = 0.05 * INCH;
    Rect::new(
        x - pad,
        y - pad,
        x + canvas.text_width(text) + pad,
        y + 0.8 * size + pad,
    )
}

/// The "-> Notes" shortcut at the top right of daily and weekly pages.
pub(crate) fn draw_notes_link(canvas: &mut Canvas, geometry: &PageGeometry, y: f32, size: f32) {
    use crate::draw::{COLOR_LINK, Font};
    use crate::page::Bookmark;

    let x = geometry.right() - INCH;
    canvas.scoped(
        |s| {
            s.fill = COLOR_LINK;
            s.font = Font::Body;
            s.font_size = size;
        },
        |c| {
            c.text(x, y, "-> Notes");
            let hotspot = text_hotspot(c, x, y, "-> Notes");
            c.add_link(hotspot, Bookmark::notes());
        },
    );
}
