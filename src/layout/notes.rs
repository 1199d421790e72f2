// File: ./src/layout/notes.rs
use super::PageGeometry;
use crate::draw::{COLOR_GRID, Canvas, Font, INCH};
use crate::page::Bookmark;

const DOT_PITCH: f32 = 0.2 * INCH;
const DOT_RADIUS: f32 = 0.5;

/// Dot-grid page. Only the first of a run carries the `notes` bookmark.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NotesPage {
    /// 1-based
    pub number: usize,
    pub total: usize,
}

impl NotesPage {
    pub fn new(number: usize, total: usize) -> Self {
        Self { number, total }
    }

    pub fn anchor(&self) -> Option<Bookmark> {
        (self.number == 1).then(Bookmark::notes)
    }

    pub fn render(&self, geometry: &PageGeometry, canvas: &mut Canvas) {
        canvas.set_font(Font::Header, 12.0);
        canvas.text(
            geometry.margin,
            geometry.from_top(0.5 * INCH),
            format!("Notes ({}/{})", self.number, self.total),
        );

        let right = geometry.right();
        let bottom = geometry.margin + 0.5 * INCH;
        let top = geometry.from_top(0.8 * INCH);

        canvas.set_fill(COLOR_GRID);
        let mut x = geometry.margin;
        while x <= right {
            let mut y = bottom;
            while y <= top {
                canvas.dot(x, y, DOT_RADIUS);
                y += DOT_PITCH;
            }
            x += DOT_PITCH;
        }
    }
}
