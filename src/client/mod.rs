// File: ./src/client/mod.rs
//! Task and event sources consumed by the aggregator.
//!
//! Sources hand back records in their own order; the aggregator relies on
//! events arriving sorted by start time.
pub mod auth;
pub mod core;
pub mod gcal;
pub mod memory;
pub mod todoist;

use crate::error::PlannerResult;
use crate::model::{CalendarEvent, Task};
use chrono::NaiveDate;

pub use crate::client::core::HttpClient;
pub use crate::client::gcal::GoogleCalendarClient;
pub use crate::client::memory::MemorySource;
pub use crate::client::todoist::TodoistClient;

pub const PRIMARY_CALENDAR: &str = "primary";

#[allow(async_fn_in_trait)]
pub trait TaskSource {
    /// Tasks due on `date`, in source order.
    async fn tasks_due_on(&self, date: NaiveDate) -> PlannerResult<Vec<Task>>;

    /// All open tasks, optionally narrowed by a source-specific filter.
    async fn all_tasks(&self, filter: Option<&str>) -> PlannerResult<Vec<Task>>;
}

#[allow(async_fn_in_trait)]
pub trait EventSource {
    /// Events overlapping `[start, end]` (inclusive dates) ordered by start.
    async fn events_in_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        calendar_id: &str,
    ) -> PlannerResult<Vec<CalendarEvent>>;

    async fn events_on_day(&self, date: NaiveDate) -> PlannerResult<Vec<CalendarEvent>> {
        self.events_in_range(date, date, PRIMARY_CALENDAR).await
    }
}
