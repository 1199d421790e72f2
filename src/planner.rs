// File: ./src/planner.rs
//! Assembles monthly planner documents from aggregated data.
//!
//! Page order of one month: four quarter overviews, the month overview, one
//! page per Monday-start week touching the month, a schedule and a tasks page
//! per day, then the notes pages.
use crate::aggregate::DataAggregator;
use crate::client::{EventSource, TaskSource};
use crate::config::Config;
use crate::document::{DocumentBuilder, SealedDocument};
use crate::error::{PlannerError, PlannerResult};
use crate::layout::{
    DailySchedule, DailyTasks, MonthlyOverview, NotesPage, PageGeometry, TimeGrid, WeeklyPage,
    YearlyOverview, days_in_month, month_name, month_week_starts,
};
use crate::model::HeadlineItem;
use crate::page::PageKind;
use crate::writer::DocumentWriter;
use chrono::{NaiveDate, NaiveTime};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, PartialEq)]
pub struct PlannerOptions {
    pub geometry: PageGeometry,
    pub week_grid: TimeGrid,
    pub day_grid: TimeGrid,
    pub notes_pages: usize,
}

impl Default for PlannerOptions {
    fn default() -> Self {
        Self {
            geometry: PageGeometry::letter(),
            week_grid: TimeGrid::new(NaiveTime::MIN, 30, 38),
            day_grid: TimeGrid::hourly(5, 23),
            notes_pages: 10,
        }
    }
}

impl PlannerOptions {
    pub fn from_config(config: &Config) -> PlannerResult<Self> {
        let layout = &config.layout;
        let start = NaiveTime::parse_from_str(&layout.week_grid_start, "%H:%M").map_err(|e| {
            PlannerError::Config(format!(
                "layout.week_grid_start '{}' is not HH:MM: {}",
                layout.week_grid_start, e
            ))
        })?;
        if layout.day_start_hour >= layout.day_end_hour || layout.day_end_hour > 24 {
            return Err(PlannerError::Config(format!(
                "layout day hours {}..{} are not a valid range",
                layout.day_start_hour, layout.day_end_hour
            )));
        }

        let week_grid = TimeGrid::checked(start, layout.week_grid_step_minutes, layout.week_grid_rows)
            .ok_or_else(|| {
                PlannerError::Config(format!(
                    "layout week grid of {} x {} minutes from {} must be non-empty and end by midnight",
                    layout.week_grid_rows, layout.week_grid_step_minutes, layout.week_grid_start
                ))
            })?;

        Ok(Self {
            geometry: PageGeometry::letter(),
            week_grid,
            day_grid: TimeGrid::hourly(layout.day_start_hour, layout.day_end_hour),
            notes_pages: config.notes_pages,
        })
    }
}

/// `2026_07_July.pdf`
pub fn planner_file_name(year: i32, month: u32) -> String {
    format!("{}_{:02}_{}.pdf", year, month, month_name(month))
}

fn month_bounds(year: i32, month: u32) -> PlannerResult<(NaiveDate, NaiveDate)> {
    let first = NaiveDate::from_ymd_opt(year, month, 1);
    let last = NaiveDate::from_ymd_opt(year, month, days_in_month(year, month));
    match (first, last) {
        (Some(first), Some(last)) => Ok((first, last)),
        _ => Err(PlannerError::Config(format!("{}-{:02} is not a valid month", year, month))),
    }
}

/// Builds and seals the planner of one month. `yearly_items` feed the
/// quarter overview pages.
pub async fn build_month_document<T: TaskSource, E: EventSource>(
    aggregator: &DataAggregator<T, E>,
    year: i32,
    month: u32,
    yearly_items: &[HeadlineItem],
    options: &PlannerOptions,
) -> PlannerResult<SealedDocument> {
    let (first, last) = month_bounds(year, month)?;
    let mut builder = DocumentBuilder::new(options.geometry)
        .with_title(format!("{} {} Planner", month_name(month), year));

    for quarter in 1..=4 {
        builder.push(PageKind::YearlyOverview(YearlyOverview::new(
            year,
            quarter,
            Some(month),
            yearly_items.to_vec(),
        )))?;
    }

    builder.push(PageKind::MonthlyOverview(MonthlyOverview::new(year, month)))?;

    for monday in month_week_starts(year, month) {
        let events = aggregator.weekly_events(monday).await?;
        let page = WeeklyPage::new(monday, events)
            .with_grid(options.week_grid)
            .with_linked_days(first..=last);
        builder.push(PageKind::Weekly(page))?;
    }

    for date in first.iter_days().take_while(|d| *d <= last) {
        let day = aggregator.day_view(date).await?;
        log::debug!(
            "{}: {} event(s), {} task(s), {} headline(s)",
            date,
            day.events.len(),
            day.tasks.len(),
            day.headlines.len()
        );
        builder.push(PageKind::DailySchedule(
            DailySchedule::new(date, day.events).with_grid(options.day_grid),
        ))?;
        builder.push(PageKind::DailyTasks(DailyTasks::new(date, day.tasks, day.headlines)))?;
    }

    for number in 1..=options.notes_pages {
        builder.push(PageKind::Notes(NotesPage::new(number, options.notes_pages)))?;
    }

    let document = builder.seal();
    log::info!(
        "{} {}: {} pages, {} links",
        month_name(month),
        year,
        document.page_count(),
        document.link_count()
    );
    Ok(document)
}

/// Generates one file per entry of `months` into `output_dir` and returns
/// their paths. Headline items are fetched once for the whole run.
pub async fn generate_year<T: TaskSource, E: EventSource>(
    aggregator: &DataAggregator<T, E>,
    year: i32,
    months: &[u32],
    options: &PlannerOptions,
    writer: &dyn DocumentWriter,
    output_dir: &Path,
) -> PlannerResult<Vec<PathBuf>> {
    for &month in months {
        month_bounds(year, month)?;
    }

    let yearly_items = aggregator.yearly_headline_items(year).await?;
    std::fs::create_dir_all(output_dir)?;

    let mut written = Vec::with_capacity(months.len());
    for &month in months {
        log::info!("Generating {} {}", month_name(month), year);
        let document = build_month_document(aggregator, year, month, &yearly_items, options).await?;
        let path = output_dir.join(planner_file_name(year, month));
        writer.write(&document, &path)?;
        written.push(path);
    }
    Ok(written)
}
