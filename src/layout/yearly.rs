// File: ./src/layout/yearly.rs
// Quarter overview: three month columns with one row per day.
use super::{PageGeometry, Truncation, days_in_month, month_name, month_week_starts, text_hotspot};
use crate::draw::{
    COLOR_EVENT, COLOR_LINK, COLOR_TEXT, COLOR_WEEKEND, Canvas, Font, INCH, Rect,
};
use crate::model::HeadlineItem;
use crate::page::Bookmark;
use chrono::{Datelike, NaiveDate};
use std::collections::BTreeMap;

/// Enough rows for a month starting on Sunday with 31 days.
pub const DAY_ROWS: u32 = 37;
const DAY_LETTERS: [&str; 7] = ["M", "T", "W", "R", "F", "S", "U"];
const MONTHS_PER_PAGE: u32 = 3;

#[derive(Debug, Clone, PartialEq)]
pub struct YearlyOverview {
    pub year: i32,
    /// 1..=4
    pub quarter: u32,
    /// Month of the planner being built. Only its days are links.
    pub current_month: Option<u32>,
    pub items: Vec<HeadlineItem>,
}

impl YearlyOverview {
    pub fn new(year: i32, quarter: u32, current_month: Option<u32>, items: Vec<HeadlineItem>) -> Self {
        Self {
            year,
            quarter: quarter.clamp(1, 4),
            current_month,
            items,
        }
    }

    pub fn anchor(&self) -> Bookmark {
        Bookmark::year_quarter(self.year, self.quarter)
    }

    pub fn first_month(&self) -> u32 {
        (self.quarter - 1) * MONTHS_PER_PAGE + 1
    }

    /// Row of `day` within a month column: day index shifted by the weekday
    /// of the 1st, so equal weekdays line up across months.
    pub fn row_of(date: NaiveDate) -> u32 {
        let first_weekday = date
            .with_day(1)
            .map(|d| d.weekday().num_days_from_monday())
            .unwrap_or(0);
        date.day() - 1 + first_weekday
    }

    pub fn render(&self, geometry: &PageGeometry, canvas: &mut Canvas) {
        canvas.set_font(Font::Header, 16.0);
        canvas.text(
            geometry.margin,
            geometry.from_top(0.5 * INCH),
            format!("{} Overview (Page {}/4)", self.year, self.quarter),
        );

        let dow_width = 0.15 * INCH;
        let grid_x = geometry.margin + dow_width;
        let grid_bottom = geometry.margin + 0.3 * INCH;
        let grid_top = geometry.from_top(INCH);
        let grid_width = geometry.content_width() - dow_width;
        // One header row for the month names.
        let row_height = (grid_top - grid_bottom) / (DAY_ROWS + 1) as f32;
        let rows_top = grid_top - row_height;
        let month_width = grid_width / MONTHS_PER_PAGE as f32;

        let first_items = first_item_per_day(&self.items);
        // Week pages exist only for the weeks of the current month.
        let linked_weeks = self
            .current_month
            .map(|m| month_week_starts(self.year, m))
            .unwrap_or_default();

        for i in 0..MONTHS_PER_PAGE {
            let month = self.first_month() + i;
            let x = grid_x + i as f32 * month_width;
            self.draw_month_column(
                canvas,
                month,
                x,
                month_width,
                rows_top,
                row_height,
                &first_items,
                &linked_weeks,
            );
        }

        canvas.scoped(
            |s| {
                s.font = Font::Header;
                s.font_size = 11.0;
            },
            |c| {
                for i in 0..MONTHS_PER_PAGE {
                    let x = grid_x + i as f32 * month_width + 0.1 * INCH;
                    c.text(x, rows_top + 0.3 * row_height, month_name(self.first_month() + i));
                }
            },
        );

        canvas.set_font(Font::Body, 10.0);
        canvas.set_fill(COLOR_TEXT);
        for row in 0..DAY_ROWS {
            let baseline = rows_top - (row as f32 + 0.5) * row_height - 0.05 * INCH;
            canvas.text(
                geometry.margin + 0.03 * INCH,
                baseline,
                DAY_LETTERS[(row % 7) as usize],
            );
        }

        for row in 0..=DAY_ROWS + 1 {
            let y = grid_top - row as f32 * row_height;
            canvas.line(geometry.margin, y, geometry.right(), y);
        }
        canvas.line(grid_x, grid_bottom, grid_x, rows_top);
        for i in 0..=MONTHS_PER_PAGE {
            let x = grid_x + i as f32 * month_width;
            canvas.line(x, grid_bottom, x, grid_top);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn draw_month_column(
        &self,
        canvas: &mut Canvas,
        month: u32,
        x: f32,
        width: f32,
        rows_top: f32,
        row_height: f32,
        first_items: &BTreeMap<NaiveDate, &HeadlineItem>,
        linked_weeks: &[NaiveDate],
    ) {
        let date_width = width * 0.08;
        let item_width = width - date_width;
        let is_current = self.current_month == Some(month);

        canvas.line(x + date_width, rows_top - DAY_ROWS as f32 * row_height, x + date_width, rows_top);

        for day in 1..=days_in_month(self.year, month) {
            let Some(date) = NaiveDate::from_ymd_opt(self.year, month, day) else {
                continue;
            };
            let row = Self::row_of(date);
            let cell_top = rows_top - row as f32 * row_height;
            let baseline = cell_top - row_height / 2.0 - 0.05 * INCH;

            if super::is_weekend(date) {
                canvas.scoped(
                    |s| s.fill = COLOR_WEEKEND,
                    |c| c.fill_rect(Rect::from_origin(x, cell_top - row_height, width, row_height)),
                );
            }

            let label = day.to_string();
            let text_x = x + 0.02 * INCH;
            canvas.scoped(
                |s| {
                    s.font = Font::Body;
                    s.font_size = 10.0;
                    s.fill = if is_current { COLOR_LINK } else { COLOR_TEXT };
                },
                |c| {
                    c.text(text_x, baseline, label.as_str());
                    if is_current {
                        let hotspot = text_hotspot(c, text_x, baseline, &label);
                        c.add_link(hotspot, Bookmark::day_schedule(date));
                    }
                },
            );

            if let Some(item) = first_items.get(&date) {
                canvas.scoped(
                    |s| {
                        s.font = Font::Body;
                        s.font_size = 9.0;
                        s.fill = COLOR_EVENT;
                    },
                    |c| {
                        c.text(
                            x + date_width + 0.02 * INCH,
                            baseline,
                            Truncation::YEARLY_ITEM.apply(&item.text),
                        );
                    },
                );
            }

            if date.weekday().num_days_from_monday() == 0 {
                let badge = format!("({})", date.iso_week().week());
                let linked = linked_weeks.contains(&date);
                let right = x + date_width + item_width - 0.02 * INCH;
                canvas.scoped(
                    |s| {
                        s.font = Font::Body;
                        s.font_size = 9.0;
                        s.fill = if linked { COLOR_LINK } else { COLOR_TEXT };
                    },
                    |c| {
                        let left = right - c.text_width(&badge);
                        c.text_right(right, baseline, badge.as_str());
                        if linked {
                            let hotspot = text_hotspot(c, left, baseline, &badge);
                            c.add_link(hotspot, Bookmark::week_of(date));
                        }
                    },
                );
            }
        }
    }
}

fn first_item_per_day(items: &[HeadlineItem]) -> BTreeMap<NaiveDate, &HeadlineItem> {
    let mut first = BTreeMap::new();
    for item in items {
        first.entry(item.date).or_insert(item);
    }
    first
}
