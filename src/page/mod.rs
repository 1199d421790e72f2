// File: ./src/page/mod.rs
//! Page variants and their bookmark names.
use crate::draw::Canvas;
use crate::layout::{
    DailySchedule, DailyTasks, MonthlyOverview, NotesPage, PageGeometry, WeeklyPage,
    YearlyOverview,
};
use strum::Display;

pub mod bookmark;

pub use bookmark::{Bookmark, quarter_of_month};

#[derive(Debug, Clone, PartialEq, Display)]
pub enum PageKind {
    #[strum(to_string = "yearly overview")]
    YearlyOverview(YearlyOverview),
    #[strum(to_string = "monthly overview")]
    MonthlyOverview(MonthlyOverview),
    #[strum(to_string = "weekly")]
    Weekly(WeeklyPage),
    #[strum(to_string = "daily schedule")]
    DailySchedule(DailySchedule),
    #[strum(to_string = "daily tasks")]
    DailyTasks(DailyTasks),
    #[strum(to_string = "notes")]
    Notes(NotesPage),
}

impl PageKind {
    /// Bookmark this page registers, if any.
    pub fn anchor(&self) -> Option<Bookmark> {
        match self {
            PageKind::YearlyOverview(p) => Some(p.anchor()),
            PageKind::MonthlyOverview(p) => Some(p.anchor()),
            PageKind::Weekly(p) => Some(p.anchor()),
            PageKind::DailySchedule(p) => Some(p.anchor()),
            PageKind::DailyTasks(p) => Some(p.anchor()),
            PageKind::Notes(p) => p.anchor(),
        }
    }

    pub fn render(&self, geometry: &PageGeometry, canvas: &mut Canvas) {
        match self {
            PageKind::YearlyOverview(p) => p.render(geometry, canvas),
            PageKind::MonthlyOverview(p) => p.render(geometry, canvas),
            PageKind::Weekly(p) => p.render(geometry, canvas),
            PageKind::DailySchedule(p) => p.render(geometry, canvas),
            PageKind::DailyTasks(p) => p.render(geometry, canvas),
            PageKind::Notes(p) => p.render(geometry, canvas),
        }
    }
}
