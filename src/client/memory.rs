// File: src/client/memory.rs
// In-memory task/event source. Backs offline runs (`--fixture`) and tests.
use crate::client::{EventSource, PRIMARY_CALENDAR, TaskSource};
use crate::error::{PlannerError, PlannerResult};
use crate::model::{CalendarEvent, Task};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};
use std::fs;
use std::path::Path;

const SERVICE: &str = "fixture";

/// On-disk fixture layout:
///
/// ```json
/// { "tasks": [...], "calendars": { "primary": [...], "<holiday id>": [...] } }
/// ```
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Fixture {
    #[serde(default)]
    pub tasks: Vec<Task>,
    #[serde(default)]
    pub calendars: HashMap<String, Vec<CalendarEvent>>,
}

#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    tasks: Vec<Task>,
    calendars: HashMap<String, Vec<CalendarEvent>>,
    failing_calendars: HashSet<String>,
    fail_tasks: bool,
}

impl MemorySource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_fixture(fixture: Fixture) -> Self {
        Self {
            tasks: fixture.tasks,
            calendars: fixture.calendars,
            ..Self::default()
        }
    }

    pub fn load(path: &Path) -> PlannerResult<Self> {
        let contents = fs::read_to_string(path).map_err(|e| {
            PlannerError::Config(format!("Failed to read fixture '{}': {}", path.display(), e))
        })?;
        let fixture: Fixture = serde_json::from_str(&contents).map_err(|e| {
            PlannerError::Config(format!("Failed to parse fixture '{}': {}", path.display(), e))
        })?;
        Ok(Self::from_fixture(fixture))
    }

    pub fn with_task(mut self, task: Task) -> Self {
        self.tasks.push(task);
        self
    }

    pub fn with_event(self, event: CalendarEvent) -> Self {
        self.with_calendar_event(PRIMARY_CALENDAR, event)
    }

    pub fn with_calendar_event(mut self, calendar_id: &str, event: CalendarEvent) -> Self {
        self.calendars
            .entry(calendar_id.to_string())
            .or_default()
            .push(event);
        self
    }

    /// Every fetch from `calendar_id` fails with an upstream error.
    pub fn with_failing_calendar(mut self, calendar_id: &str) -> Self {
        self.failing_calendars.insert(calendar_id.to_string());
        self
    }

    /// Every task fetch fails with an upstream error.
    pub fn with_failing_tasks(mut self) -> Self {
        self.fail_tasks = true;
        self
    }

    fn check_tasks(&self) -> PlannerResult<()> {
        if self.fail_tasks {
            return Err(PlannerError::upstream(SERVICE, "task source unavailable"));
        }
        Ok(())
    }
}

impl TaskSource for MemorySource {
    async fn tasks_due_on(&self, date: NaiveDate) -> PlannerResult<Vec<Task>> {
        self.check_tasks()?;
        Ok(self
            .tasks
            .iter()
            .filter(|t| t.due == Some(date))
            .cloned()
            .collect())
    }

    /// `filter` is a plain label name here (`@` prefix optional).
    async fn all_tasks(&self, filter: Option<&str>) -> PlannerResult<Vec<Task>> {
        self.check_tasks()?;
        let label = filter.map(|f| f.trim_start_matches('@'));
        Ok(self
            .tasks
            .iter()
            .filter(|t| label.is_none_or(|l| t.has_label(l)))
            .cloned()
            .collect())
    }
}

impl EventSource for MemorySource {
    async fn events_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        calendar_id: &str,
    ) -> PlannerResult<Vec<CalendarEvent>> {
        if self.failing_calendars.contains(calendar_id) {
            return Err(PlannerError::upstream(
                SERVICE,
                format!("calendar '{}' unavailable", calendar_id),
            ));
        }

        let mut events: Vec<CalendarEvent> = self
            .calendars
            .get(calendar_id)
            .map(|list| {
                list.iter()
                    .filter(|e| e.overlaps_days(start, end))
                    .cloned()
                    .collect()
            })
            .unwrap_or_default();
        // Stable: same-start events keep insertion order.
        events.sort_by(|a, b| a.start.cmp(&b.start));
        Ok(events)
    }
}
