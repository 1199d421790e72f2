// File: ./src/layout/daily.rs
// Daily schedule and daily tasks pages, which share one header.
use super::{PageGeometry, TimeGrid, Truncation, draw_notes_link, text_hotspot};
use crate::draw::{COLOR_EVENT, COLOR_EVENT_FILL, COLOR_LINK, COLOR_TEXT, Canvas, Font, INCH, Rect};
use crate::model::{EventView, HeadlineItem, TaskView};
use crate::page::Bookmark;
use chrono::{Datelike, Duration, NaiveDate, NaiveTime};

pub const PRIORITY_LINES: usize = 3;
pub const TASK_LINES: usize = 8;
pub const HEADLINE_LINES: usize = 2;

const HEADER_SIZE: f32 = 14.0;

/// Draws "Weekday, Month DD, YYYY (WW)" with month, year and week as links,
/// then the notes shortcut and `cross_link` (label, destination) if given.
fn draw_day_header(
    canvas: &mut Canvas,
    geometry: &PageGeometry,
    date: NaiveDate,
    cross_link: (&str, Bookmark),
) {
    let y = geometry.from_top(0.6 * INCH);
    let segments = [
        (date.format("%A, ").to_string(), None),
        (date.format("%B").to_string(), Some(Bookmark::month(date.year(), date.month()))),
        (date.format(" %d, ").to_string(), None),
        (date.year().to_string(), Some(Bookmark::quarter_of(date))),
        (" ".to_string(), None),
        (format!("({})", date.iso_week().week()), Some(Bookmark::week_of(date))),
    ];

    canvas.set_font(Font::Header, HEADER_SIZE);
    let mut x = geometry.margin;
    for (text, destination) in segments {
        let width = canvas.text_width(&text);
        match destination {
            Some(destination) => canvas.scoped(
                |s| s.fill = COLOR_LINK,
                |c| {
                    c.text(x, y, text.as_str());
                    let hotspot = Rect::new(x, y - 0.05 * INCH, x + width, y + 0.15 * INCH);
                    c.add_link(hotspot, destination);
                },
            ),
            None => canvas.text(x, y, text),
        }
        x += width;
    }

    let (label, destination) = cross_link;
    let cross_x = geometry.right() - 2.1 * INCH;
    canvas.scoped(
        |s| {
            s.fill = COLOR_LINK;
            s.font = Font::Body;
            s.font_size = 11.0;
        },
        |c| {
            c.text(cross_x, y, label);
            let hotspot = text_hotspot(c, cross_x, y, label);
            c.add_link(hotspot, destination);
        },
    );

    draw_notes_link(canvas, geometry, y, 11.0);
}

/// Boxed section with a title and `lines` evenly spaced writing lines.
/// Returns the y of the first writing line's top and the line height.
fn draw_section(canvas: &mut Canvas, area: Rect, title: &str, lines: usize) -> (f32, f32) {
    canvas.scoped(
        |s| {
            s.font = Font::Header;
            s.font_size = 11.0;
            s.fill = COLOR_TEXT;
        },
        |c| c.text(area.x1, area.y2 - 0.2 * INCH, title),
    );
    canvas.stroke_rect(area);

    let body_top = area.y2 - 0.3 * INCH;
    if lines == 0 {
        return (body_top, 0.0);
    }
    let line_height = (body_top - area.y1) / lines as f32;
    for i in 1..lines {
        let y = body_top - i as f32 * line_height;
        canvas.line(area.x1, y, area.x2, y);
    }
    (body_top, line_height)
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailySchedule {
    pub date: NaiveDate,
    pub events: Vec<EventView>,
    pub grid: TimeGrid,
}

impl DailySchedule {
    pub fn new(date: NaiveDate, events: Vec<EventView>) -> Self {
        Self {
            date,
            events,
            grid: TimeGrid::hourly(5, 23),
        }
    }

    pub fn with_grid(mut self, grid: TimeGrid) -> Self {
        self.grid = grid;
        self
    }

    pub fn anchor(&self) -> Bookmark {
        Bookmark::day_schedule(self.date)
    }

    pub fn render(&self, geometry: &PageGeometry, canvas: &mut Canvas) {
        draw_day_header(canvas, geometry, self.date, ("Tasks ->", Bookmark::day_tasks(self.date)));

        let x = geometry.margin;
        let width = geometry.content_width();
        let bottom = geometry.margin + 0.5 * INCH;
        let top = geometry.from_top(INCH);
        let time_width = 0.6 * INCH;
        let row_height = (top - bottom) / self.grid.rows() as f32;

        let all_day: Vec<&str> = self
            .events
            .iter()
            .filter(|e| e.all_day)
            .map(|e| e.label.as_str())
            .collect();
        if !all_day.is_empty() {
            let line = format!("All day: {}", all_day.join(", "));
            canvas.scoped(
                |s| {
                    s.font = Font::Body;
                    s.font_size = 10.0;
                    s.fill = COLOR_EVENT;
                },
                |c| {
                    let fit = Truncation::for_width(width, 10.0).apply(&line);
                    c.text(x, top + 0.1 * INCH, fit);
                },
            );
        }

        canvas.set_font(Font::Body, 11.0);
        for row in 0..=self.grid.rows() {
            let y = top - row as f32 * row_height;
            canvas.line(x, y, x + width, y);
        }
        canvas.line(x + time_width, bottom, x + time_width, top);
        for row in 0..self.grid.rows() {
            let y = top - row as f32 * row_height - 0.15 * INCH;
            canvas.text(x + 0.05 * INCH, y, self.grid.row_start_label(row));
        }

        let event_x = x + time_width + 0.05 * INCH;
        let event_width = width - time_width - 0.1 * INCH;
        let midnight = self.date.and_time(NaiveTime::MIN);
        let next_midnight = midnight + Duration::days(1);
        for event in self.events.iter().filter(|e| !e.all_day) {
            // Overnight events show the part that falls on this day.
            let start = event.start.max(midnight);
            let end = event.end.min(next_midnight);
            let Some(placement) = self.grid.place(start, end) else {
                log::debug!("'{}' falls outside the daily schedule", event.label);
                continue;
            };
            let event_top = top - placement.offset * row_height;
            let height = placement.span * row_height;
            canvas.scoped(
                |s| {
                    s.fill = COLOR_EVENT_FILL;
                    s.font = Font::Body;
                    s.font_size = 9.0;
                },
                |c| {
                    c.fill_rect(Rect::new(event_x, event_top - height, event_x + event_width, event_top));
                    c.set_fill(COLOR_EVENT);
                    let label = format!(
                        "{}-{} {}",
                        event.start.format("%H:%M"),
                        event.end.format("%H:%M"),
                        event.label
                    );
                    let fit = Truncation::for_width(event_width - 0.1 * INCH, 9.0).apply(&label);
                    c.text(event_x + 0.05 * INCH, event_top - 0.15 * INCH, fit);
                },
            );
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct DailyTasks {
    pub date: NaiveDate,
    pub tasks: Vec<TaskView>,
    pub headlines: Vec<HeadlineItem>,
}

impl DailyTasks {
    pub fn new(date: NaiveDate, tasks: Vec<TaskView>, headlines: Vec<HeadlineItem>) -> Self {
        Self {
            date,
            tasks,
            headlines,
        }
    }

    pub fn anchor(&self) -> Bookmark {
        Bookmark::day_tasks(self.date)
    }

    pub fn render(&self, geometry: &PageGeometry, canvas: &mut Canvas) {
        draw_day_header(
            canvas,
            geometry,
            self.date,
            ("<- Schedule", Bookmark::day_schedule(self.date)),
        );

        let x = geometry.margin;
        let width = geometry.content_width();
        let gap = 0.2 * INCH;
        let mut section_top = geometry.from_top(1.2 * INCH);

        if !self.headlines.is_empty() {
            let height = 0.6 * INCH;
            self.draw_headlines(canvas, Rect::new(x, section_top - height, x + width, section_top));
            section_top -= height + gap;
        }

        let section_height = (section_top - geometry.margin - gap) / 3.0 - gap;

        let priorities = Rect::new(x, section_top - section_height, x + width, section_top);
        draw_section(canvas, priorities, "Top 3 Priorities", PRIORITY_LINES);
        section_top -= section_height + gap;

        let tasks = Rect::new(x, section_top - section_height, x + width, section_top);
        self.draw_tasks(canvas, tasks);
        section_top -= section_height + gap;

        let summary = Rect::new(x, section_top - section_height, x + width, section_top);
        draw_section(canvas, summary, "Daily Summary", 0);
    }

    fn draw_headlines(&self, canvas: &mut Canvas, area: Rect) {
        canvas.scoped(
            |s| {
                s.font = Font::Header;
                s.font_size = 11.0;
                s.fill = COLOR_EVENT;
            },
            |c| c.text(area.x1 + 0.1 * INCH, area.y2 - 0.2 * INCH, "* Headline Events"),
        );
        canvas.stroke_rect(area);

        let fit = Truncation::for_width(area.width() - 0.2 * INCH, 11.0);
        canvas.scoped(
            |s| {
                s.font = Font::Body;
                s.font_size = 11.0;
                s.fill = COLOR_TEXT;
            },
            |c| {
                for (i, item) in self.headlines.iter().take(HEADLINE_LINES).enumerate() {
                    let y = area.y2 - 0.4 * INCH - i as f32 * 0.15 * INCH;
                    c.text(area.x1 + 0.1 * INCH, y, fit.apply(&format!("- {}", item.text)));
                }
            },
        );
    }

    fn draw_tasks(&self, canvas: &mut Canvas, area: Rect) {
        let (body_top, line_height) = draw_section(canvas, area, "Today's Tasks", TASK_LINES);
        if self.tasks.len() > TASK_LINES {
            log::debug!(
                "{} task(s) on {} do not fit the tasks page",
                self.tasks.len() - TASK_LINES,
                self.date
            );
        }

        let fit = Truncation::for_width(area.width() - 0.2 * INCH, 10.0);
        canvas.scoped(
            |s| {
                s.font = Font::Body;
                s.font_size = 10.0;
                s.fill = COLOR_TEXT;
            },
            |c| {
                for (i, task) in self.tasks.iter().take(TASK_LINES).enumerate() {
                    let y = body_top - i as f32 * line_height - 0.15 * INCH;
                    c.text(area.x1 + 0.1 * INCH, y, fit.apply(&format!("[ ] {}", task.text)));
                }
            },
        );
    }
}
