//! Page geometry and pagination
//!
//! All lengths are millimetres measured from the top-left corner of the
//! page. Referee rows use a check-before-draw rule: a row starts a new page
//! when the running cursor has already passed `page_height - bottom_safe_margin`.
//! The cover page therefore holds fewer rows than a continuation page.

use crate::{ReportError, Result};
use serde::{Deserialize, Serialize};
use std::ops::Range;

/// Report geometry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportLayout {
    pub page_width: f64,
    pub page_height: f64,
    pub margin: f64,

    /// Height of the colored band behind section headers
    pub header_band_height: f64,

    pub cover_band_height: f64,
    pub cover_title_y: f64,
    pub info_box_y: f64,
    pub info_box_height: f64,
    pub stats_y: f64,
    pub stats_height: f64,

    /// Top of the "Referee List" header on the cover
    pub referee_header_y: f64,
    /// Distance from a section header to its first row
    pub header_gap: f64,
    /// Cursor position after a continuation page is started, before the header gap
    pub continuation_top_offset: f64,
    pub row_height: f64,
    pub bottom_safe_margin: f64,

    pub items_per_page: usize,
    /// Offset of the first poster slot from the top of the page
    pub item_base_offset: f64,
    /// Vertical distance between poster slots
    pub slot_height: f64,
    pub slot_box_height: f64,
    pub qr_size: f64,
    pub url_box_height: f64,

    /// Distance of the footer rule from the bottom edge
    pub footer_line_offset: f64,
    /// Distance of the footer baseline from the bottom edge
    pub footer_text_offset: f64,
}

impl Default for ReportLayout {
    fn default() -> Self {
        Self {
            page_width: 210.0,
            page_height: 297.0,
            margin: 20.0,
            header_band_height: 12.0,
            cover_band_height: 80.0,
            cover_title_y: 50.0,
            info_box_y: 90.0,
            info_box_height: 50.0,
            stats_y: 150.0,
            stats_height: 35.0,
            referee_header_y: 195.0,
            header_gap: 20.0,
            continuation_top_offset: 30.0,
            row_height: 8.0,
            bottom_safe_margin: 30.0,
            items_per_page: 2,
            item_base_offset: 45.0,
            slot_height: 120.0,
            slot_box_height: 105.0,
            qr_size: 60.0,
            url_box_height: 20.0,
            footer_line_offset: 20.0,
            footer_text_offset: 10.0,
        }
    }
}

impl ReportLayout {
    pub fn content_width(&self) -> f64 {
        self.page_width - 2.0 * self.margin
    }

    /// Lowest cursor position at which a referee row may still be drawn
    pub fn row_limit(&self) -> f64 {
        self.page_height - self.bottom_safe_margin
    }

    /// Y of the first referee row on the cover
    pub fn first_row_y(&self) -> f64 {
        self.referee_header_y + self.header_gap
    }

    /// Y of the first referee row on a continuation page
    pub fn continuation_row_y(&self) -> f64 {
        self.continuation_top_offset + self.header_gap
    }

    /// Top of the shaded band behind a referee row, centred on its baseline
    pub fn row_band_y(&self, row_y: f64) -> f64 {
        row_y - self.row_height / 2.0
    }

    /// Top of the slot box for the `slot`-th poster on a page
    pub fn item_slot_y(&self, slot: usize) -> f64 {
        self.item_base_offset + slot as f64 * self.slot_height
    }

    /// Place `count` referee rows
    pub fn referee_rows(&self, count: usize) -> RefereeRows<'_> {
        RefereeRows {
            layout: self,
            index: 0,
            count,
            y: self.first_row_y(),
        }
    }

    /// Number of rows that fit on the cover
    pub fn cover_capacity(&self) -> usize {
        rows_until(self.first_row_y(), self.row_limit(), self.row_height)
    }

    /// Number of rows that fit on each continuation page
    pub fn continuation_capacity(&self) -> usize {
        rows_until(self.continuation_row_y(), self.row_limit(), self.row_height).max(1)
    }

    /// Split `count` posters into per-page index ranges
    pub fn item_batches(&self, count: usize) -> impl Iterator<Item = Range<usize>> + '_ {
        let per_page = self.items_per_page.max(1);
        (0..count)
            .step_by(per_page)
            .map(move |start| start..(start + per_page).min(count))
    }

    pub fn validate(&self) -> Result<()> {
        if self.items_per_page == 0 {
            return Err(ReportError::LayoutError("items_per_page must be at least 1".to_string()));
        }
        if self.row_height <= 0.0 {
            return Err(ReportError::LayoutError("row_height must be positive".to_string()));
        }
        if self.page_width <= 2.0 * self.margin || self.page_height <= 0.0 {
            return Err(ReportError::LayoutError(format!(
                "page {}x{} leaves no room inside a {} margin",
                self.page_width, self.page_height, self.margin
            )));
        }
        Ok(())
    }
}

fn rows_until(start: f64, limit: f64, step: f64) -> usize {
    if start > limit || step <= 0.0 {
        return 0;
    }
    ((limit - start) / step).floor() as usize + 1
}

/// Where a referee row lands
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RowPlacement {
    /// 0-based position in the referee list
    pub index: usize,
    /// Baseline of the row on its page
    pub y: f64,
    /// The row opens a continuation page
    pub starts_page: bool,
}

/// Iterator over referee row placements
///
/// Used by both the planner and the renderer so the two always agree.
#[derive(Debug, Clone)]
pub struct RefereeRows<'a> {
    layout: &'a ReportLayout,
    index: usize,
    count: usize,
    y: f64,
}

impl Iterator for RefereeRows<'_> {
    type Item = RowPlacement;

    fn next(&mut self) -> Option<Self::Item> {
        if self.index >= self.count {
            return None;
        }

        let starts_page = self.y > self.layout.row_limit();
        if starts_page {
            self.y = self.layout.continuation_row_y();
        }

        let row = RowPlacement {
            index: self.index,
            y: self.y,
            starts_page,
        };
        self.y += self.layout.row_height;
        self.index += 1;
        Some(row)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = self.count - self.index;
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for RefereeRows<'_> {}

/// What a page of the report shows
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PageContent {
    /// Title band, event info, counts and the first referee rows
    Cover { referees: Range<usize> },
    /// Overflow of the referee list
    RefereeContinuation { referees: Range<usize> },
    /// Poster slots with their QR codes
    Items { items: Range<usize> },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportPage {
    /// 1-based page number
    pub number: usize,
    pub content: PageContent,
    /// "Page i of N"
    pub footer: String,
}

/// The page structure of a report
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportDocument {
    pub pages: Vec<ReportPage>,
}

impl ReportDocument {
    /// Compute the pages for `referee_count` referees and `item_count` posters
    pub fn plan(layout: &ReportLayout, referee_count: usize, item_count: usize) -> Self {
        let mut contents = Vec::new();
        let mut start = 0;
        let mut continued = false;

        for row in layout.referee_rows(referee_count) {
            if row.starts_page {
                contents.push(referee_page(continued, start..row.index));
                start = row.index;
                continued = true;
            }
        }
        contents.push(referee_page(continued, start..referee_count));

        contents.extend(layout.item_batches(item_count).map(|items| PageContent::Items { items }));
        Self::from_contents(contents)
    }

    /// Number the pages and attach footers
    pub fn from_contents(contents: Vec<PageContent>) -> Self {
        let total = contents.len();
        let pages = contents
            .into_iter()
            .enumerate()
            .map(|(i, content)| ReportPage {
                number: i + 1,
                content,
                footer: format!("Page {} of {}", i + 1, total),
            })
            .collect();
        Self { pages }
    }

    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Cover plus continuation pages
    pub fn referee_page_count(&self) -> usize {
        self.pages
            .iter()
            .filter(|page| !matches!(page.content, PageContent::Items { .. }))
            .count()
    }

    pub fn item_page_count(&self) -> usize {
        self.page_count() - self.referee_page_count()
    }

    pub fn referee_count(&self) -> usize {
        self.pages
            .iter()
            .map(|page| match &page.content {
                PageContent::Cover { referees }
                | PageContent::RefereeContinuation { referees } => referees.len(),
                PageContent::Items { .. } => 0,
            })
            .sum()
    }

    pub fn item_count(&self) -> usize {
        self.pages
            .iter()
            .map(|page| match &page.content {
                PageContent::Items { items } => items.len(),
                _ => 0,
            })
            .sum()
    }
}

pub(crate) fn referee_page(continued: bool, referees: Range<usize>) -> PageContent {
    if continued {
        PageContent::RefereeContinuation { referees }
    } else {
        PageContent::Cover { referees }
    }
}
