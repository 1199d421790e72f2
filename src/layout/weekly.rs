// File: ./src/layout/weekly.rs
// Weekly time-budget worksheet.
use super::{PageGeometry, TimeGrid, Truncation, draw_notes_link, text_hotspot};
use crate::draw::{COLOR_EVENT, COLOR_EVENT_FILL, COLOR_LINK, COLOR_WEEKEND, Canvas, Font, INCH, Rect};
use crate::model::EventView;
use crate::page::Bookmark;
use chrono::{Datelike, Duration, NaiveDate, NaiveTime};
use std::ops::RangeInclusive;

#[derive(Debug, Clone, PartialEq)]
pub struct WeeklyPage {
    /// Monday of the week.
    pub week_start: NaiveDate,
    pub events: Vec<EventView>,
    pub grid: TimeGrid,
    /// Days whose header links to their schedule page. `None` links all
    /// seven.
    pub linked_days: Option<RangeInclusive<NaiveDate>>,
}

impl WeeklyPage {
    pub fn new(week_start: NaiveDate, events: Vec<EventView>) -> Self {
        Self {
            week_start: super::week_start(week_start),
            events,
            grid: TimeGrid::new(NaiveTime::MIN, 30, 38),
            linked_days: None,
        }
    }

    pub fn with_grid(mut self, grid: TimeGrid) -> Self {
        self.grid = grid;
        self
    }

    pub fn with_linked_days(mut self, days: RangeInclusive<NaiveDate>) -> Self {
        self.linked_days = Some(days);
        self
    }

    pub fn anchor(&self) -> Bookmark {
        Bookmark::week_of(self.week_start)
    }

    pub fn week_end(&self) -> NaiveDate {
        self.week_start + Duration::days(6)
    }

    fn links_day(&self, date: NaiveDate) -> bool {
        self.linked_days.as_ref().is_none_or(|r| r.contains(&date))
    }

    pub fn render(&self, geometry: &PageGeometry, canvas: &mut Canvas) {
        let header_y = geometry.from_top(0.6 * INCH);
        canvas.set_font(Font::Header, 16.0);
        canvas.text(
            geometry.margin,
            header_y,
            format!(
                "Week ({}), {} -> {}",
                self.week_start.iso_week().week(),
                self.week_start.format("%b %d"),
                self.week_end().format("%b %d, %Y")
            ),
        );
        draw_notes_link(canvas, geometry, header_y, 12.0);

        let x = geometry.margin;
        let bottom = geometry.margin + 0.5 * INCH;
        let top = geometry.from_top(INCH);
        let time_width = 0.65 * INCH;
        let day_width = (geometry.content_width() - time_width) / 7.0;
        let row_height = (top - bottom) / self.grid.rows() as f32;

        for day in 5..7 {
            canvas.scoped(
                |s| s.fill = COLOR_WEEKEND,
                |c| {
                    c.fill_rect(Rect::new(
                        x + time_width + day as f32 * day_width,
                        bottom,
                        x + time_width + (day + 1) as f32 * day_width,
                        top,
                    ))
                },
            );
        }

        canvas.set_font(Font::Header, 12.0);
        let labels_y = top + 0.1 * INCH;
        canvas.text(x + 0.02 * INCH, labels_y, "Time");
        for day in 0..7 {
            let date = self.week_start + Duration::days(day);
            let label_x = x + time_width + day as f32 * day_width + 0.05 * INCH;
            let label = date.format("%a %d").to_string();
            if self.links_day(date) {
                canvas.scoped(
                    |s| s.fill = COLOR_LINK,
                    |c| {
                        c.text(label_x, labels_y, label.as_str());
                        let hotspot = text_hotspot(c, label_x, labels_y, &label);
                        c.add_link(hotspot, Bookmark::day_schedule(date));
                    },
                );
            } else {
                canvas.text(label_x, labels_y, label);
            }
        }

        canvas.set_font(Font::Body, 8.0);
        for row in 0..self.grid.rows() {
            let baseline = top - (row as f32 + 0.5) * row_height - 0.05 * INCH;
            canvas.text(x + 0.02 * INCH, baseline, self.grid.row_label(row));
        }

        for row in 0..=self.grid.rows() {
            let y = top - row as f32 * row_height;
            canvas.line(x, y, geometry.right(), y);
        }
        for col in 0..=7 {
            let line_x = x + time_width + col as f32 * day_width;
            canvas.line(line_x, bottom, line_x, top);
        }
        canvas.line(x, bottom, x, top);

        self.draw_events(canvas, x + time_width, top, day_width, row_height);
    }

    fn draw_events(&self, canvas: &mut Canvas, days_x: f32, top: f32, day_width: f32, row_height: f32) {
        for event in &self.events {
            if event.all_day {
                continue;
            }
            let day = (event.start.date() - self.week_start).num_days();
            if !(0..7).contains(&day) {
                continue;
            }
            let Some(placement) = self.grid.place(event.start, event.end) else {
                log::debug!("'{}' falls outside the weekly grid", event.label);
                continue;
            };

            let event_x = days_x + day as f32 * day_width + 0.02 * INCH;
            let event_top = top - placement.offset * row_height;
            let height = placement.span * row_height;
            let width = day_width - 0.04 * INCH;

            canvas.scoped(
                |s| {
                    s.fill = COLOR_EVENT_FILL;
                    s.font = Font::Body;
                    s.font_size = 8.0;
                },
                |c| {
                    c.fill_rect(Rect::new(event_x, event_top - height, event_x + width, event_top));
                    c.set_fill(COLOR_EVENT);
                    c.text(
                        event_x + 0.02 * INCH,
                        event_top - 0.1 * INCH,
                        Truncation::WEEKLY_EVENT.apply(&event.label),
                    );
                },
            );
        }
    }
}
