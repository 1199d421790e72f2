// File: ./src/model/item.rs
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use strum::{Display, EnumIter};

fn default_priority() -> u8 {
    1
}

/// Label of a primary-calendar event that has no title.
pub const UNTITLED_EVENT: &str = "Untitled";
/// Label of a holiday that has no title.
pub const UNTITLED_HOLIDAY: &str = "Holiday";

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct Task {
    #[serde(default)]
    pub id: String,
    pub content: String,
    /// Todoist convention: 1 (normal) ..= 4 (urgent). Never reordered here.
    #[serde(default = "default_priority")]
    pub priority: u8,
    #[serde(default)]
    pub labels: Vec<String>,
    #[serde(default)]
    pub due: Option<NaiveDate>,
}

impl Task {
    pub fn new(content: &str) -> Self {
        Self {
            id: String::new(),
            content: content.to_string(),
            priority: default_priority(),
            labels: Vec::new(),
            due: None,
        }
    }

    pub fn due_on(mut self, date: NaiveDate) -> Self {
        self.due = Some(date);
        self
    }

    pub fn with_labels(mut self, labels: &[&str]) -> Self {
        self.labels = labels.iter().map(|l| l.to_string()).collect();
        self
    }

    pub fn with_priority(mut self, priority: u8) -> Self {
        self.priority = priority;
        self
    }

    /// Case-insensitive label lookup.
    pub fn has_label(&self, label: &str) -> bool {
        self.labels.iter().any(|l| l.eq_ignore_ascii_case(label))
    }
}

// --- DATE TYPES ---

/// Start or end of a calendar event as delivered by the source.
///
/// `AllDay` means the source carried a bare date with no time of day.
/// `Timed` holds the wall-clock time in the event's own offset.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum EventTime {
    AllDay(NaiveDate),
    Timed(NaiveDateTime),
}

impl EventTime {
    pub fn date(&self) -> NaiveDate {
        match self {
            EventTime::AllDay(d) => *d,
            EventTime::Timed(dt) => dt.date(),
        }
    }

    /// A bare date resolves to midnight, so an all-day event runs from its
    /// start date 00:00 to its (exclusive) end date 00:00.
    pub fn to_naive(&self) -> NaiveDateTime {
        match self {
            EventTime::AllDay(d) => d.and_time(NaiveTime::MIN),
            EventTime::Timed(dt) => *dt,
        }
    }

    pub fn is_all_day(&self) -> bool {
        matches!(self, EventTime::AllDay(_))
    }
}

impl PartialOrd for EventTime {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for EventTime {
    fn cmp(&self, other: &Self) -> Ordering {
        match self.to_naive().cmp(&other.to_naive()) {
            // Same instant: all-day entries come first, like calendar listings.
            Ordering::Equal => other.is_all_day().cmp(&self.is_all_day()),
            ord => ord,
        }
    }
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize, Deserialize)]
pub struct CalendarEvent {
    #[serde(default)]
    pub id: String,
    /// Empty when the source had no title.
    #[serde(default)]
    pub summary: String,
    #[serde(default)]
    pub description: String,
    pub start: EventTime,
    pub end: EventTime,
}

impl CalendarEvent {
    pub fn timed(summary: &str, start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            id: String::new(),
            summary: summary.to_string(),
            description: String::new(),
            start: EventTime::Timed(start),
            end: EventTime::Timed(end),
        }
    }

    /// Single-day all-day event; the end is exclusive, as calendars report it.
    pub fn all_day(summary: &str, date: NaiveDate) -> Self {
        Self {
            id: String::new(),
            summary: summary.to_string(),
            description: String::new(),
            start: EventTime::AllDay(date),
            end: EventTime::AllDay(date.succ_opt().unwrap_or(date)),
        }
    }

    pub fn with_description(mut self, description: &str) -> Self {
        self.description = description.to_string();
        self
    }

    /// Uses `label` as the title when the event has none.
    pub fn with_default_summary(mut self, label: &str) -> Self {
        if self.summary.trim().is_empty() {
            self.summary = label.to_string();
        }
        self
    }

    pub fn is_all_day(&self) -> bool {
        self.start.is_all_day()
    }

    pub fn start_date(&self) -> NaiveDate {
        self.start.date()
    }

    /// True when any part of the event falls on a day in `first..=last`.
    /// Zero-length events count on the day they start.
    pub fn overlaps_days(&self, first: NaiveDate, last: NaiveDate) -> bool {
        let from = first.and_time(NaiveTime::MIN);
        let until = last.succ_opt().unwrap_or(last).and_time(NaiveTime::MIN);
        let start = self.start.to_naive();
        let end = self.end.to_naive();
        start < until && (end > from || start >= from)
    }

    /// Case-insensitive substring match of `marker` in the description.
    pub fn has_marker(&self, marker: &str) -> bool {
        !marker.is_empty()
            && self
                .description
                .to_lowercase()
                .contains(&marker.to_lowercase())
    }
}

// --- VIEW MODELS ---

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct TaskView {
    pub text: String,
    pub priority: u8,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct EventView {
    pub label: String,
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub all_day: bool,
}

impl From<&CalendarEvent> for EventView {
    fn from(event: &CalendarEvent) -> Self {
        Self {
            label: event.summary.clone(),
            start: event.start.to_naive(),
            end: event.end.to_naive(),
            all_day: event.is_all_day(),
        }
    }
}

#[derive(Debug, Clone, Copy, Eq, PartialEq, Hash, Serialize, Display, EnumIter)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum HeadlineKind {
    Event,
    Holiday,
    Task,
}

#[derive(Debug, Clone, Eq, PartialEq, Serialize)]
pub struct HeadlineItem {
    pub date: NaiveDate,
    pub text: String,
    pub kind: HeadlineKind,
}
