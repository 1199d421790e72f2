// File: ./src/writer/pdf.rs
/*! Minimal PDF 1.4 serializer for sealed documents.

Uses the standard Courier and Courier-Bold Type1 fonts (no embedding), one
uncompressed content stream per page and one `/Link` annotation per resolved
link. Every bookmark also becomes a named destination in the catalog.

Object layout:
  1 catalog, 2 page tree, 3 Courier, 4 Courier-Bold, 5 info,
  then per page: page, content stream, link annotations.
*/

use super::DocumentWriter;
use crate::document::{SealedDocument, SealedPage};
use crate::draw::{Align, Color, DrawOp, Font, string_width};
use crate::error::PlannerResult;
use crate::storage::LocalStorage;
use std::fmt::Write as _;
use std::path::Path;

const FIRST_PAGE_OBJECT: usize = 6;
/// Control point distance for a quarter circle drawn as a cubic Bézier.
const KAPPA: f32 = 0.552_284_8;

#[derive(Debug, Clone, Copy, Default)]
pub struct PdfWriter;

struct PageObjects {
    page: usize,
    content: usize,
    first_annotation: usize,
}

impl PdfWriter {
    pub fn new() -> Self {
        Self
    }

    /// Complete file contents for `document`.
    pub fn render(&self, document: &SealedDocument) -> Vec<u8> {
        let mut next = FIRST_PAGE_OBJECT;
        let layout: Vec<PageObjects> = document
            .pages()
            .iter()
            .map(|page| {
                let objects = PageObjects {
                    page: next,
                    content: next + 1,
                    first_annotation: next + 2,
                };
                next += 2 + page.links.len();
                objects
            })
            .collect();
        let object_count = next - 1;

        let mut out = PdfBuffer::new();
        out.raw("%PDF-1.4\n%\u{e2}\u{e3}\u{cf}\u{d3}\n");

        let mut dests = String::new();
        for page in document.pages() {
            if let Some(anchor) = &page.anchor {
                let _ = write!(
                    dests,
                    " /{} [{} 0 R /Fit]",
                    anchor,
                    layout[page.ordinal - 1].page
                );
            }
        }
        out.object(1, &format!("<< /Type /Catalog /Pages 2 0 R /Dests <<{} >> >>", dests));

        let kids: Vec<String> = layout.iter().map(|o| format!("{} 0 R", o.page)).collect();
        out.object(
            2,
            &format!(
                "<< /Type /Pages /Kids [{}] /Count {} >>",
                kids.join(" "),
                layout.len()
            ),
        );
        out.object(3, &font_dictionary(Font::Body));
        out.object(4, &font_dictionary(Font::Header));

        let mut info = String::from("<< /Producer (paperplan)");
        if let Some(title) = document.title() {
            let _ = write!(info, " /Title {}", pdf_string(title));
        }
        info.push_str(" >>");
        out.object(5, &info);

        let geometry = document.geometry();
        for (page, objects) in document.pages().iter().zip(&layout) {
            let annotations: Vec<String> = (0..page.links.len())
                .map(|i| format!("{} 0 R", objects.first_annotation + i))
                .collect();
            out.object(
                objects.page,
                &format!(
                    "<< /Type /Page /Parent 2 0 R /MediaBox [0 0 {} {}] \
                     /Resources << /Font << /F1 3 0 R /F2 4 0 R >> >> \
                     /Contents {} 0 R /Annots [{}] >>",
                    num(geometry.width),
                    num(geometry.height),
                    objects.content,
                    annotations.join(" ")
                ),
            );

            let stream = content_stream(page);
            out.stream(objects.content, stream.as_bytes());

            for (i, link) in page.links.iter().enumerate() {
                let target = layout[link.destination - 1].page;
                out.object(
                    objects.first_annotation + i,
                    &format!(
                        "<< /Type /Annot /Subtype /Link /Rect [{} {} {} {}] \
                         /Border [0 0 0] /Dest [{} 0 R /Fit] >>",
                        num(link.rect.x1.min(link.rect.x2)),
                        num(link.rect.y1.min(link.rect.y2)),
                        num(link.rect.x1.max(link.rect.x2)),
                        num(link.rect.y1.max(link.rect.y2)),
                        target
                    ),
                );
            }
        }

        out.finish(object_count)
    }
}

impl DocumentWriter for PdfWriter {
    fn write(&self, document: &SealedDocument, path: &Path) -> PlannerResult<()> {
        let bytes = self.render(document);
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
        {
            std::fs::create_dir_all(parent)?;
        }
        LocalStorage::atomic_write(path, &bytes)?;
        log::info!(
            "Wrote {} ({} pages, {} bytes)",
            path.display(),
            document.page_count(),
            bytes.len()
        );
        Ok(())
    }
}

struct PdfBuffer {
    bytes: Vec<u8>,
    offsets: Vec<usize>,
}

impl PdfBuffer {
    fn new() -> Self {
        Self {
            bytes: Vec::new(),
            offsets: Vec::new(),
        }
    }

    fn raw(&mut self, text: &str) {
        self.bytes.extend_from_slice(text.as_bytes());
    }

    /// Objects must be written in ascending id order starting at 1.
    fn begin(&mut self, id: usize) {
        debug_assert_eq!(self.offsets.len() + 1, id);
        self.offsets.push(self.bytes.len());
        self.raw(&format!("{} 0 obj\n", id));
    }

    fn object(&mut self, id: usize, body: &str) {
        self.begin(id);
        self.raw(body);
        self.raw("\nendobj\n");
    }

    fn stream(&mut self, id: usize, data: &[u8]) {
        self.begin(id);
        self.raw(&format!("<< /Length {} >>\nstream\n", data.len()));
        self.bytes.extend_from_slice(data);
        self.raw("\nendstream\nendobj\n");
    }

    fn finish(mut self, object_count: usize) -> Vec<u8> {
        let xref_offset = self.bytes.len();
        let mut xref = format!("xref\n0 {}\n0000000000 65535 f \n", object_count + 1);
        for offset in &self.offsets {
            let _ = writeln!(xref, "{:010} 00000 n ", offset);
        }
        let _ = write!(
            xref,
            "trailer\n<< /Size {} /Root 1 0 R /Info 5 0 R >>\nstartxref\n{}\n%%EOF\n",
            object_count + 1,
            xref_offset
        );
        self.raw(&xref);
        self.bytes
    }
}

fn font_dictionary(font: Font) -> String {
    format!(
        "<< /Type /Font /Subtype /Type1 /BaseFont /{} /Encoding /WinAnsiEncoding >>",
        font.base_font()
    )
}

fn font_resource(font: Font) -> &'static str {
    match font {
        Font::Body => "F1",
        Font::Header => "F2",
    }
}

fn content_stream(page: &SealedPage) -> String {
    let mut s = String::new();
    for op in &page.ops {
        match op {
            DrawOp::Text {
                x,
                y,
                text,
                font,
                size,
                color,
                align,
            } => {
                let x = match align {
                    Align::Left => *x,
                    Align::Right => x - string_width(text, *size),
                };
                let _ = writeln!(
                    s,
                    "BT /{} {} Tf {} rg {} {} Td {} Tj ET",
                    font_resource(*font),
                    num(*size),
                    rgb(color),
                    num(x),
                    num(*y),
                    pdf_string(text)
                );
            }
            DrawOp::Line {
                x1,
                y1,
                x2,
                y2,
                color,
                width,
            } => {
                let _ = writeln!(
                    s,
                    "q {} RG {} w {} {} m {} {} l S Q",
                    rgb(color),
                    num(*width),
                    num(*x1),
                    num(*y1),
                    num(*x2),
                    num(*y2)
                );
            }
            DrawOp::Rect { rect, fill, stroke } => {
                let path = format!(
                    "{} {} {} {} re",
                    num(rect.x1),
                    num(rect.y1),
                    num(rect.width()),
                    num(rect.height())
                );
                let _ = match (fill, stroke) {
                    (Some(f), Some((c, w))) => writeln!(
                        s,
                        "q {} rg {} RG {} w {} B Q",
                        rgb(f),
                        rgb(c),
                        num(*w),
                        path
                    ),
                    (Some(f), None) => writeln!(s, "q {} rg {} f Q", rgb(f), path),
                    (None, Some((c, w))) => {
                        writeln!(s, "q {} RG {} w {} S Q", rgb(c), num(*w), path)
                    }
                    (None, None) => Ok(()),
                };
            }
            DrawOp::Dot {
                x,
                y,
                radius,
                color,
            } => {
                let (x, y, r) = (*x, *y, *radius);
                let k = KAPPA * r;
                let _ = writeln!(
                    s,
                    "q {} rg {} {} m {} {} {} {} {} {} c {} {} {} {} {} {} c \
                     {} {} {} {} {} {} c {} {} {} {} {} {} c f Q",
                    rgb(color),
                    num(x + r),
                    num(y),
                    num(x + r),
                    num(y + k),
                    num(x + k),
                    num(y + r),
                    num(x),
                    num(y + r),
                    num(x - k),
                    num(y + r),
                    num(x - r),
                    num(y + k),
                    num(x - r),
                    num(y),
                    num(x - r),
                    num(y - k),
                    num(x - k),
                    num(y - r),
                    num(x),
                    num(y - r),
                    num(x + k),
                    num(y - r),
                    num(x + r),
                    num(y - k),
                    num(x + r),
                    num(y)
                );
            }
        }
    }
    s
}

fn rgb(color: &Color) -> String {
    format!("{} {} {}", num(color.r), num(color.g), num(color.b))
}

/// Shortest decimal with at most three fractional digits.
fn num(value: f32) -> String {
    let s = format!("{:.3}", value);
    let s = s.trim_end_matches('0').trim_end_matches('.');
    if s == "-0" || s.is_empty() {
        "0".to_string()
    } else {
        s.to_string()
    }
}

/// Literal string in WinAnsi. Characters outside Latin-1 become `?`.
fn pdf_string(text: &str) -> String {
    let mut out = String::with_capacity(text.len() + 2);
    out.push('(');
    for c in text.chars() {
        match c {
            '\\' | '(' | ')' => {
                out.push('\\');
                out.push(c);
            }
            ' '..='~' => out.push(c),
            '\u{a0}'..='\u{ff}' => {
                let _ = write!(out, "\\{:03o}", c as u32);
            }
            c if c.is_control() => out.push(' '),
            _ => out.push('?'),
        }
    }
    out.push(')');
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbers_are_compact() {
        assert_eq!(num(36.0), "36");
        assert_eq!(num(0.5), "0.5");
        assert_eq!(num(-0.0001), "0");
        assert_eq!(num(12.3456), "12.346");
    }

    #[test]
    fn strings_are_escaped() {
        assert_eq!(pdf_string("a(b)\\"), "(a\\(b\\)\\\\)");
        assert_eq!(pdf_string("Café"), "(Caf\\351)");
        assert_eq!(pdf_string("日"), "(?)");
    }
}
