// File: ./src/document.rs
/*! Two-phase document assembly.

`DocumentBuilder` renders pages as they are pushed and registers their
bookmarks. Links are recorded by name only. `seal()` consumes the builder,
numbers the pages 1..=N in push order and resolves every link against the
bookmark registry. Links whose bookmark was never registered are dropped and
counted.

A `SealedDocument` cannot take more pages, so ordinals never move after
links point at them.
*/

use crate::draw::{Canvas, DrawOp, LinkRequest, Rect};
use crate::error::{PlannerError, PlannerResult};
use crate::layout::PageGeometry;
use crate::page::{Bookmark, PageKind};
use serde::Serialize;
use std::collections::HashMap;

struct OpenPage {
    label: String,
    anchor: Option<Bookmark>,
    ops: Vec<DrawOp>,
    links: Vec<LinkRequest>,
}

pub struct DocumentBuilder {
    geometry: PageGeometry,
    title: Option<String>,
    pages: Vec<OpenPage>,
    /// Bookmark → index into `pages`.
    anchors: HashMap<Bookmark, usize>,
}

impl Default for DocumentBuilder {
    fn default() -> Self {
        Self::new(PageGeometry::letter())
    }
}

impl DocumentBuilder {
    pub fn new(geometry: PageGeometry) -> Self {
        Self {
            geometry,
            title: None,
            pages: Vec::new(),
            anchors: HashMap::new(),
        }
    }

    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn len(&self) -> usize {
        self.pages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pages.is_empty()
    }

    /// Renders `kind` as the next page. Fails without adding the page if its
    /// bookmark is already registered.
    pub fn push(&mut self, kind: PageKind) -> PlannerResult<()> {
        let anchor = kind.anchor();
        if let Some(name) = &anchor
            && self.anchors.contains_key(name)
        {
            return Err(PlannerError::Layout(format!(
                "Bookmark '{}' is already registered",
                name
            )));
        }

        let mut canvas = Canvas::new();
        kind.render(&self.geometry, &mut canvas);
        let (ops, links) = canvas.into_parts();

        if let Some(name) = &anchor {
            self.anchors.insert(name.clone(), self.pages.len());
        }
        self.pages.push(OpenPage {
            label: kind.to_string(),
            anchor,
            ops,
            links,
        });
        Ok(())
    }

    pub fn extend(&mut self, kinds: impl IntoIterator<Item = PageKind>) -> PlannerResult<()> {
        for kind in kinds {
            self.push(kind)?;
        }
        Ok(())
    }

    /// Numbers the pages and resolves links.
    pub fn seal(self) -> SealedDocument {
        let anchors: HashMap<Bookmark, usize> = self
            .anchors
            .into_iter()
            .map(|(name, index)| (name, index + 1))
            .collect();

        let mut dropped_links = 0;
        let mut pages = Vec::with_capacity(self.pages.len());

        for (index, page) in self.pages.into_iter().enumerate() {
            let ordinal = index + 1;
            let mut links = Vec::with_capacity(page.links.len());
            for request in page.links {
                match anchors.get(&request.destination) {
                    Some(&destination) => links.push(ResolvedLink {
                        rect: request.rect,
                        destination,
                        bookmark: request.destination,
                    }),
                    None => {
                        log::debug!(
                            "Dropping link on page {} to unknown bookmark '{}'",
                            ordinal,
                            request.destination
                        );
                        dropped_links += 1;
                    }
                }
            }
            pages.push(SealedPage {
                ordinal,
                label: page.label,
                anchor: page.anchor,
                ops: page.ops,
                links,
            });
        }

        if dropped_links > 0 {
            log::info!("{} link(s) had no destination in this document", dropped_links);
        }

        SealedDocument {
            geometry: self.geometry,
            title: self.title,
            pages,
            anchors,
            dropped_links,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ResolvedLink {
    pub rect: Rect,
    /// 1-based ordinal of the target page.
    pub destination: usize,
    pub bookmark: Bookmark,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SealedPage {
    pub ordinal: usize,
    pub label: String,
    pub anchor: Option<Bookmark>,
    pub ops: Vec<DrawOp>,
    pub links: Vec<ResolvedLink>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct SealedDocument {
    geometry: PageGeometry,
    title: Option<String>,
    pages: Vec<SealedPage>,
    anchors: HashMap<Bookmark, usize>,
    dropped_links: usize,
}

impl SealedDocument {
    pub fn geometry(&self) -> &PageGeometry {
        &self.geometry
    }

    pub fn title(&self) -> Option<&str> {
        self.title.as_deref()
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    pub fn pages(&self) -> &[SealedPage] {
        &self.pages
    }

    /// `ordinal` is 1-based.
    pub fn page(&self, ordinal: usize) -> Option<&SealedPage> {
        ordinal.checked_sub(1).and_then(|i| self.pages.get(i))
    }

    pub fn ordinal_of(&self, bookmark: &Bookmark) -> Option<usize> {
        self.anchors.get(bookmark).copied()
    }

    pub fn dropped_links(&self) -> usize {
        self.dropped_links
    }

    pub fn link_count(&self) -> usize {
        self.pages.iter().map(|p| p.links.len()).sum()
    }
}
