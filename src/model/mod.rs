// File: ./src/model/mod.rs
pub mod display;
pub mod item;

pub use display::{TaskDisplay, format_task_labels, normalize_text};
pub use item::{
    CalendarEvent, EventTime, EventView, HeadlineItem, HeadlineKind, Task, TaskView,
    UNTITLED_EVENT, UNTITLED_HOLIDAY,
};
