// File: ./src/aggregate.rs
//! Builds the per-day, per-week and per-year view models from the task and
//! event sources.
//!
//! Fetch failures propagate to the caller, except for the holiday calendar:
//! that source is optional and degrades to an empty list.
use crate::client::{EventSource, TaskSource};
use crate::error::PlannerResult;
use crate::model::{
    CalendarEvent, EventView, HeadlineItem, HeadlineKind, Task, TaskDisplay, TaskView,
    UNTITLED_EVENT, UNTITLED_HOLIDAY, normalize_text,
};
use chrono::{Duration, NaiveDate};
use std::collections::HashSet;
use std::ops::RangeInclusive;

/// Names and markers that steer aggregation.
#[derive(Debug, Clone)]
pub struct AggregatorSettings {
    pub primary_calendar: String,
    pub holiday_calendar: String,
    /// Substring looked for in event descriptions, case-insensitive.
    pub headline_marker: String,
    /// Task label flagging a headline task, case-insensitive.
    pub headline_label: String,
}

impl Default for AggregatorSettings {
    fn default() -> Self {
        Self {
            primary_calendar: "primary".to_string(),
            holiday_calendar: "en.usa#holiday@group.v.calendar.google.com".to_string(),
            headline_marker: "@headline".to_string(),
            headline_label: "headline".to_string(),
        }
    }
}

impl From<&crate::config::Config> for AggregatorSettings {
    fn from(config: &crate::config::Config) -> Self {
        Self {
            primary_calendar: config.primary_calendar.clone(),
            holiday_calendar: config.holiday_calendar.clone(),
            headline_marker: config.headline_marker.clone(),
            headline_label: config.headline_label.clone(),
        }
    }
}

/// Drops tasks whose normalized text equals a same-day event's normalized
/// label. Exact string equality after normalization; near matches
/// ("Team sync call" vs "Team sync") are kept.
pub fn remove_calendar_duplicates(tasks: Vec<Task>, events: &[CalendarEvent]) -> Vec<Task> {
    let on_calendar: HashSet<String> = events.iter().map(|e| normalize_text(&e.summary)).collect();
    tasks
        .into_iter()
        .filter(|t| {
            let duplicate = on_calendar.contains(&normalize_text(&t.content));
            if duplicate {
                log::debug!("Task '{}' is already on the calendar", t.content);
            }
            !duplicate
        })
        .collect()
}

/// Merges headline candidates into one list sorted by date.
///
/// Events qualify when their description carries `marker`, every holiday
/// qualifies, tasks qualify when labelled `label`. Everything outside
/// `range` is ignored. The sort is stable, so same-day items stay in the
/// order events, holidays, tasks.
pub fn merge_headlines(
    events: &[CalendarEvent],
    holidays: &[CalendarEvent],
    tasks: &[Task],
    range: &RangeInclusive<NaiveDate>,
    marker: &str,
    label: &str,
) -> Vec<HeadlineItem> {
    let mut items = Vec::new();

    for event in events {
        let date = event.start_date();
        if event.has_marker(marker) && range.contains(&date) {
            items.push(HeadlineItem {
                date,
                text: event.summary.clone(),
                kind: HeadlineKind::Event,
            });
        }
    }

    for holiday in holidays {
        let date = holiday.start_date();
        if range.contains(&date) {
            let text = if holiday.summary.is_empty() {
                UNTITLED_HOLIDAY.to_string()
            } else {
                holiday.summary.clone()
            };
            items.push(HeadlineItem {
                date,
                text,
                kind: HeadlineKind::Holiday,
            });
        }
    }

    for task in tasks {
        if !task.has_label(label) {
            continue;
        }
        if let Some(date) = task.due
            && range.contains(&date)
        {
            items.push(HeadlineItem {
                date,
                text: task.content.clone(),
                kind: HeadlineKind::Task,
            });
        }
    }

    items.sort_by_key(|item| item.date);
    items
}

/// Everything the two pages of one day need.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DayView {
    pub events: Vec<EventView>,
    pub tasks: Vec<TaskView>,
    pub headlines: Vec<HeadlineItem>,
}

pub struct DataAggregator<T, E> {
    tasks: T,
    events: E,
    settings: AggregatorSettings,
}

impl<T: TaskSource, E: EventSource> DataAggregator<T, E> {
    pub fn new(tasks: T, events: E, settings: AggregatorSettings) -> Self {
        Self {
            tasks,
            events,
            settings,
        }
    }

    pub fn settings(&self) -> &AggregatorSettings {
        &self.settings
    }

    async fn primary_events(&self, start: NaiveDate, end: NaiveDate) -> PlannerResult<Vec<CalendarEvent>> {
        let events = self
            .events
            .events_in_range(start, end, &self.settings.primary_calendar)
            .await?;
        Ok(events
            .into_iter()
            .map(|e| e.with_default_summary(UNTITLED_EVENT))
            .collect())
    }

    /// Tasks due on `date` that are not already calendar events, in source
    /// order, with their label tags appended.
    pub async fn daily_tasks(&self, date: NaiveDate) -> PlannerResult<Vec<TaskView>> {
        let tasks = self.tasks.tasks_due_on(date).await?;
        let events = self.primary_events(date, date).await?;

        Ok(remove_calendar_duplicates(tasks, &events)
            .iter()
            .map(|t| TaskView {
                text: t.display_text(),
                priority: t.priority,
            })
            .collect())
    }

    pub async fn daily_events(&self, date: NaiveDate) -> PlannerResult<Vec<EventView>> {
        let events = self.primary_events(date, date).await?;
        Ok(events.iter().map(EventView::from).collect())
    }

    /// Events of the seven days starting at `week_start`.
    pub async fn weekly_events(&self, week_start: NaiveDate) -> PlannerResult<Vec<EventView>> {
        let week_end = week_start + Duration::days(6);
        let events = self.primary_events(week_start, week_end).await?;
        Ok(events.iter().map(EventView::from).collect())
    }

    pub async fn yearly_headline_items(&self, year: i32) -> PlannerResult<Vec<HeadlineItem>> {
        let (Some(start), Some(end)) = (
            NaiveDate::from_ymd_opt(year, 1, 1),
            NaiveDate::from_ymd_opt(year, 12, 31),
        ) else {
            return Ok(Vec::new());
        };

        let events = self.primary_events(start, end).await?;

        let holidays = match self
            .events
            .events_in_range(start, end, &self.settings.holiday_calendar)
            .await
        {
            Ok(h) => h
                .into_iter()
                .map(|e| e.with_default_summary(UNTITLED_HOLIDAY))
                .collect(),
            Err(e) => {
                log::warn!("Holiday calendar unavailable, continuing without it: {}", e);
                Vec::new()
            }
        };

        let tasks = self.tasks.all_tasks(None).await?;

        let items = merge_headlines(
            &events,
            &holidays,
            &tasks,
            &(start..=end),
            &self.settings.headline_marker,
            &self.settings.headline_label,
        );
        log::info!("Collected {} headline item(s) for {}", items.len(), year);
        Ok(items)
    }

    /// Same result as `daily_events`, `daily_tasks` and
    /// `headline_events_for_day` combined, with a single event fetch.
    pub async fn day_view(&self, date: NaiveDate) -> PlannerResult<DayView> {
        let events = self.primary_events(date, date).await?;
        let tasks = self.tasks.tasks_due_on(date).await?;

        let headlines = events
            .iter()
            .filter(|e| e.has_marker(&self.settings.headline_marker))
            .map(|e| HeadlineItem {
                date,
                text: e.summary.clone(),
                kind: HeadlineKind::Event,
            })
            .collect();
        let tasks = remove_calendar_duplicates(tasks, &events)
            .iter()
            .map(|t| TaskView {
                text: t.display_text(),
                priority: t.priority,
            })
            .collect();

        Ok(DayView {
            events: events.iter().map(EventView::from).collect(),
            tasks,
            headlines,
        })
    }

    pub async fn headline_events_for_day(&self, date: NaiveDate) -> PlannerResult<Vec<HeadlineItem>> {
        let events = self.primary_events(date, date).await?;
        Ok(events
            .iter()
            .filter(|e| e.has_marker(&self.settings.headline_marker))
            .map(|e| HeadlineItem {
                date,
                text: e.summary.clone(),
                kind: HeadlineKind::Event,
            })
            .collect())
    }
}
