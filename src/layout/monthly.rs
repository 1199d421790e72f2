// File: ./src/layout/monthly.rs
use super::{PageGeometry, month_name, month_week_starts, text_hotspot};
use crate::draw::{COLOR_LINK, COLOR_WEEKEND, Canvas, Font, INCH, Rect};
use crate::page::Bookmark;
use chrono::{Datelike, Duration};

const DAY_NAMES: [&str; 7] = ["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

/// Month calendar, Monday-first, one row per week.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MonthlyOverview {
    pub year: i32,
    pub month: u32,
}

impl MonthlyOverview {
    pub fn new(year: i32, month: u32) -> Self {
        Self { year, month }
    }

    pub fn anchor(&self) -> Bookmark {
        Bookmark::month(self.year, self.month)
    }

    pub fn render(&self, geometry: &PageGeometry, canvas: &mut Canvas) {
        canvas.set_font(Font::Header, 16.0);
        canvas.text(
            geometry.margin,
            geometry.from_top(0.6 * INCH),
            format!("{} {}", month_name(self.month), self.year),
        );

        let weeks = month_week_starts(self.year, self.month);
        let grid_x = geometry.margin;
        let grid_bottom = geometry.margin + 0.5 * INCH;
        let grid_top = geometry.from_top(INCH);
        let col_width = geometry.content_width() / 7.0;
        let row_height = (grid_top - grid_bottom) / (weeks.len() + 1) as f32;
        let weeks_top = grid_top - row_height;

        for col in 5..7 {
            canvas.scoped(
                |s| s.fill = COLOR_WEEKEND,
                |c| {
                    c.fill_rect(Rect::new(
                        grid_x + col as f32 * col_width,
                        grid_bottom,
                        grid_x + (col + 1) as f32 * col_width,
                        weeks_top,
                    ))
                },
            );
        }

        canvas.scoped(
            |s| {
                s.font = Font::Header;
                s.font_size = 12.0;
            },
            |c| {
                for (i, name) in DAY_NAMES.iter().enumerate() {
                    c.text(
                        grid_x + i as f32 * col_width + 0.1 * INCH,
                        weeks_top + 0.35 * row_height,
                        *name,
                    );
                }
            },
        );

        for (row, monday) in weeks.iter().enumerate() {
            let row_top = weeks_top - row as f32 * row_height;
            let baseline = row_top - 0.25 * INCH;

            for col in 0..7 {
                let date = *monday + Duration::days(col);
                if date.month() != self.month {
                    continue;
                }
                let x = grid_x + col as f32 * col_width + 0.1 * INCH;
                let label = date.day().to_string();
                canvas.scoped(
                    |s| {
                        s.font = Font::Body;
                        s.font_size = 12.0;
                        s.fill = COLOR_LINK;
                    },
                    |c| {
                        c.text(x, baseline, label.as_str());
                        // The whole top strip of the cell is clickable.
                        let hotspot = Rect::new(
                            x - 0.05 * INCH,
                            baseline - 0.05 * INCH,
                            x + col_width - 0.15 * INCH,
                            baseline + 0.2 * INCH,
                        );
                        c.add_link(hotspot, Bookmark::day_schedule(date));
                    },
                );
            }

            let badge = format!("({})", monday.iso_week().week());
            let badge_x = grid_x + 0.05 * INCH;
            let badge_y = row_top - row_height + 0.08 * INCH;
            canvas.scoped(
                |s| {
                    s.font = Font::Body;
                    s.font_size = 10.0;
                    s.fill = COLOR_LINK;
                },
                |c| {
                    c.text(badge_x, badge_y, badge.as_str());
                    let hotspot = text_hotspot(c, badge_x, badge_y, &badge);
                    c.add_link(hotspot, Bookmark::week_of(*monday));
                },
            );
        }

        for row in 0..=weeks.len() + 1 {
            let y = grid_top - row as f32 * row_height;
            canvas.line(grid_x, y, geometry.right(), y);
        }
        for col in 0..=7 {
            let x = grid_x + col as f32 * col_width;
            canvas.line(x, grid_bottom, x, grid_top);
        }
    }
}
