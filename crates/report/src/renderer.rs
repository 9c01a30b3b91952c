//! Local report rendering

use crate::layout::{referee_page, PageContent, ReportDocument, ReportLayout};
use crate::model::{ExportRequest, Item};
use crate::qr::QrRasterizer;
use crate::settings::ReportSettings;
use crate::Result;
use chrono::NaiveDate;
use pdf_core::{Align, Color, FontStyle, FontWeight, PageSize, PaintMode, PdfDocument, Unit};

// Palette (sRGB 0-255)
const PRIMARY: [u8; 3] = [103, 126, 234];
const SECONDARY: [u8; 3] = [138, 246, 255];
const TEXT: [u8; 3] = [51, 51, 51];
const LIGHT_GRAY: [u8; 3] = [245, 245, 245];
const MUTED: [u8; 3] = [128, 128, 128];
const LINK: [u8; 3] = [0, 0, 255];

const EMPTY_REFEREES: &str = "No referees have been added to this event.";
const SCAN_CAPTION: &str = "Scan this QR code to access the questionnaire";

fn color([r, g, b]: [u8; 3]) -> Color {
    Color::from_rgb(r, g, b)
}

/// A finished local rendering
#[derive(Debug, Clone)]
pub struct RenderedReport {
    pub filename: String,
    pub bytes: Vec<u8>,
    pub document: ReportDocument,
}

/// Renders an [`ExportRequest`] into PDF bytes without any network access
pub struct LocalRenderer {
    settings: ReportSettings,
    rasterizer: Box<dyn QrRasterizer>,
    generated_on: Option<NaiveDate>,
}

impl LocalRenderer {
    pub fn new(settings: ReportSettings) -> Self {
        let rasterizer = Box::new(settings.qr);
        Self {
            settings,
            rasterizer,
            generated_on: None,
        }
    }

    /// Replace the QR rasterizer
    pub fn with_rasterizer(mut self, rasterizer: impl QrRasterizer + 'static) -> Self {
        self.rasterizer = Box::new(rasterizer);
        self
    }

    /// Fix the "Generated" date instead of using today
    pub fn with_generated_on(mut self, date: NaiveDate) -> Self {
        self.generated_on = Some(date);
        self
    }

    pub fn settings(&self) -> &ReportSettings {
        &self.settings
    }

    /// Render the cover, referee list, poster pages and footers
    pub fn render(&self, request: &ExportRequest) -> Result<RenderedReport> {
        let layout = &self.settings.layout;
        layout.validate()?;

        let mut doc = PdfDocument::new(PageSize::from_mm(layout.page_width, layout.page_height))
            .with_unit(Unit::Millimeter);
        doc.set_compression(self.settings.compress);
        doc.set_info("Title", &self.settings.report_title);
        doc.set_info("Creator", &self.settings.product_label);

        let cover = doc.add_page();
        self.draw_cover(&mut doc, cover, request)?;

        let mut contents = self.draw_referees(&mut doc, cover, &request.referees)?;
        contents.extend(self.draw_items(&mut doc, &request.items)?);

        let document = ReportDocument::from_contents(contents);
        self.draw_footers(&mut doc, &document)?;

        let bytes = doc.finish()?;
        let filename = self.settings.filename(request.event.event_id());

        tracing::info!(
            filename = %filename,
            pages = document.page_count(),
            referees = request.referees.len(),
            posters = request.items.len(),
            "rendered report locally"
        );

        Ok(RenderedReport {
            filename,
            bytes,
            document,
        })
    }

    /// Colored band with a white bold label
    fn draw_section_header(
        &self,
        doc: &mut PdfDocument,
        page: usize,
        label: &str,
        y: f64,
    ) -> Result<()> {
        let layout = &self.settings.layout;
        doc.set_fill_color(color(PRIMARY));
        doc.fill_rect(page, layout.margin, y, layout.content_width(), layout.header_band_height)?;

        doc.set_text_color(Color::white());
        doc.set_font(FontWeight::Bold, FontStyle::Normal, 14.0);
        doc.insert_text(label, page, layout.margin + 5.0, y + 8.0, Align::Left)?;
        Ok(())
    }

    fn draw_cover(
        &self,
        doc: &mut PdfDocument,
        page: usize,
        request: &ExportRequest,
    ) -> Result<()> {
        let layout = &self.settings.layout;
        let margin = layout.margin;
        let width = layout.content_width();

        doc.set_fill_color(color(PRIMARY));
        doc.fill_rect(page, 0.0, 0.0, layout.page_width, layout.cover_band_height)?;
        doc.set_text_color(Color::white());
        doc.set_font(FontWeight::Bold, FontStyle::Normal, 28.0);
        doc.insert_text(
            &self.settings.report_title,
            page,
            layout.page_width / 2.0,
            layout.cover_title_y,
            Align::Center,
        )?;

        // Event information
        let info_y = layout.info_box_y;
        doc.set_fill_color(color(LIGHT_GRAY));
        doc.fill_rect(page, margin, info_y, width, layout.info_box_height)?;

        doc.set_text_color(color(TEXT));
        doc.set_font(FontWeight::Bold, FontStyle::Normal, 16.0);
        doc.insert_text("Event Information", page, margin + 10.0, info_y + 13.0, Align::Left)?;

        let generated_on = self
            .generated_on
            .unwrap_or_else(|| chrono::Local::now().date_naive());
        let lines = [
            format!("Event ID: {}", request.event.event_id().unwrap_or("N/A")),
            format!("Status: {}", request.event.status().unwrap_or("Pending")),
            format!("Generated: {}", generated_on.format("%Y-%m-%d")),
        ];
        doc.set_font(FontWeight::Regular, FontStyle::Normal, 12.0);
        for (line, offset) in lines.iter().zip([25.0, 34.0, 43.0]) {
            doc.insert_text(line, page, margin + 10.0, info_y + offset, Align::Left)?;
        }

        // Count tiles
        let tile_width = width / 2.0 - 5.0;
        let tiles = [
            ("QR Codes", request.items.len(), margin),
            ("Referees", request.referees.len(), margin + width / 2.0 + 5.0),
        ];
        for (label, count, x) in tiles {
            doc.set_fill_color(color(SECONDARY));
            doc.fill_rect(page, x, layout.stats_y, tile_width, layout.stats_height)?;

            doc.set_text_color(color(TEXT));
            doc.set_font(FontWeight::Bold, FontStyle::Normal, 14.0);
            doc.insert_text(label, page, x + 10.0, layout.stats_y + 13.0, Align::Left)?;
            doc.set_font_size(20.0);
            let count = count.to_string();
            doc.insert_text(&count, page, x + 10.0, layout.stats_y + 27.0, Align::Left)?;
        }

        Ok(())
    }

    /// Draw the referee list starting on the cover
    ///
    /// Returns the content of the cover and of every continuation page.
    fn draw_referees(
        &self,
        doc: &mut PdfDocument,
        cover: usize,
        referees: &[String],
    ) -> Result<Vec<PageContent>> {
        let layout = &self.settings.layout;
        self.draw_section_header(doc, cover, "Referee List", layout.referee_header_y)?;

        if referees.is_empty() {
            doc.set_text_color(color(MUTED));
            doc.set_font(FontWeight::Regular, FontStyle::Italic, 11.0);
            doc.insert_text(
                EMPTY_REFEREES,
                cover,
                layout.margin + 5.0,
                layout.first_row_y(),
                Align::Left,
            )?;
            return Ok(vec![PageContent::Cover { referees: 0..0 }]);
        }

        let mut contents = Vec::new();
        let mut page = cover;
        let mut start = 0;
        let mut continued = false;

        for row in layout.referee_rows(referees.len()) {
            if row.starts_page {
                contents.push(referee_page(continued, start..row.index));
                start = row.index;
                continued = true;

                page = doc.add_page();
                self.draw_section_header(doc, page, "Referee List (continued)", layout.margin)?;
            }

            if row.index % 2 == 0 {
                doc.set_fill_color(color(LIGHT_GRAY));
                doc.fill_rect(
                    page,
                    layout.margin,
                    layout.row_band_y(row.y),
                    layout.content_width(),
                    layout.row_height,
                )?;
            }

            doc.set_text_color(color(TEXT));
            doc.set_font(FontWeight::Regular, FontStyle::Normal, 11.0);
            let number = format!("{}.", row.index + 1);
            doc.insert_text(&number, page, layout.margin + 5.0, row.y, Align::Left)?;
            doc.insert_text(&referees[row.index], page, layout.margin + 15.0, row.y, Align::Left)?;
        }
        contents.push(referee_page(continued, start..referees.len()));

        tracing::debug!(
            rows = referees.len(),
            pages = contents.len(),
            "laid out referee list"
        );
        Ok(contents)
    }

    fn draw_items(&self, doc: &mut PdfDocument, items: &[Item]) -> Result<Vec<PageContent>> {
        let layout = &self.settings.layout;
        let mut contents = Vec::new();

        for batch in layout.item_batches(items.len()) {
            let page = doc.add_page();
            self.draw_section_header(doc, page, "QR Codes", layout.margin)?;

            for (slot, index) in batch.clone().enumerate() {
                self.draw_item(doc, page, &items[index], index, layout.item_slot_y(slot))?;
            }
            contents.push(PageContent::Items { items: batch });
        }

        Ok(contents)
    }

    /// One poster slot: QR code, title, caption and the clickable URL
    fn draw_item(
        &self,
        doc: &mut PdfDocument,
        page: usize,
        item: &Item,
        position: usize,
        top: f64,
    ) -> Result<()> {
        let layout: &ReportLayout = &self.settings.layout;
        let margin = layout.margin;
        let qr_size = layout.qr_size;
        let url = item.destination(&self.settings.questionnaire_base_url);

        doc.set_fill_color(color(LIGHT_GRAY));
        doc.fill_rect(page, margin, top, layout.content_width(), layout.slot_box_height)?;

        // White frame behind the code
        doc.set_fill_color(Color::white());
        doc.set_draw_color(color(TEXT));
        doc.set_line_width(0.5);
        let frame = qr_size + 4.0;
        doc.draw_rect(page, margin + 10.0, top + 10.0, frame, frame, PaintMode::FillStroke)?;

        let png = self.rasterizer.rasterize(&url)?;
        doc.insert_image(&png, page, margin + 12.0, top + 12.0, qr_size, qr_size)?;

        let text_x = margin + qr_size + 25.0;
        doc.set_text_color(color(TEXT));
        doc.set_font(FontWeight::Bold, FontStyle::Normal, 16.0);
        doc.insert_text(&item.display_title(position), page, text_x, top + 25.0, Align::Left)?;
        doc.set_font(FontWeight::Regular, FontStyle::Normal, 10.0);
        doc.insert_text(SCAN_CAPTION, page, text_x, top + 40.0, Align::Left)?;

        // URL box
        let box_y = top + qr_size + 20.0;
        doc.set_fill_color(Color::white());
        doc.set_draw_color(color(PRIMARY));
        doc.draw_rect(
            page,
            margin + 10.0,
            box_y,
            layout.content_width() - 20.0,
            layout.url_box_height,
            PaintMode::FillStroke,
        )?;

        doc.set_text_color(color(PRIMARY));
        doc.set_font(FontWeight::Bold, FontStyle::Normal, 9.0);
        doc.insert_text("URL:", page, margin + 15.0, box_y + 8.0, Align::Left)?;

        let url_x = margin + 15.0;
        let url_y = box_y + 16.0;
        doc.set_text_color(color(LINK));
        doc.set_font(FontWeight::Regular, FontStyle::Normal, 9.0);
        doc.insert_text(&url, page, url_x, url_y, Align::Left)?;

        let url_width = doc.get_text_width(&url);
        doc.set_draw_color(color(LINK));
        doc.set_line_width(0.3);
        doc.draw_line(page, url_x, url_y + 1.0, url_x + url_width, url_y + 1.0)?;
        doc.add_link(page, url_x, url_y - 3.2, url_width, 4.2, &url)?;

        Ok(())
    }

    fn draw_footers(&self, doc: &mut PdfDocument, document: &ReportDocument) -> Result<()> {
        let layout = &self.settings.layout;
        let line_y = layout.page_height - layout.footer_line_offset;
        let text_y = layout.page_height - layout.footer_text_offset;

        for page in &document.pages {
            doc.set_draw_color(color(PRIMARY));
            doc.set_line_width(0.5);
            let right = layout.page_width - layout.margin;
            doc.draw_line(page.number, layout.margin, line_y, right, line_y)?;

            doc.set_text_color(color(MUTED));
            doc.set_font(FontWeight::Regular, FontStyle::Normal, 9.0);
            doc.insert_text(
                &self.settings.product_label,
                page.number,
                layout.margin,
                text_y,
                Align::Left,
            )?;
            doc.insert_text(
                &page.footer,
                page.number,
                layout.page_width - layout.margin,
                text_y,
                Align::Right,
            )?;
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::EventMeta;
    use pretty_assertions::assert_eq;

    fn request(referees: usize, items: usize) -> ExportRequest {
        ExportRequest {
            event: EventMeta::new("42"),
            items: (0..items as u32).map(|id| Item::new(id, format!("P{}", id + 1))).collect(),
            referees: (0..referees).map(|i| format!("r{i}@example.com")).collect(),
        }
    }

    #[test]
    fn test_rendered_structure_matches_plan() {
        let renderer = LocalRenderer::new(ReportSettings::default());
        for (referees, items) in [(1, 1), (2, 3), (7, 2), (8, 2), (40, 5)] {
            let rendered = renderer.render(&request(referees, items)).unwrap();
            let planned = ReportDocument::plan(&renderer.settings().layout, referees, items);
            assert_eq!(rendered.document, planned, "{referees} referees, {items} posters");
        }
    }

    #[test]
    fn test_filename_uses_event_id() {
        let renderer = LocalRenderer::new(ReportSettings::default());
        let rendered = renderer.render(&request(1, 1)).unwrap();
        assert_eq!(rendered.filename, "EventRate-Pro-Export-42.pdf");
        assert!(rendered.bytes.starts_with(b"%PDF-"));
    }

    #[test]
    fn test_invalid_layout_is_rejected() {
        let mut settings = ReportSettings::default();
        settings.layout.items_per_page = 0;
        let result = LocalRenderer::new(settings).render(&request(1, 1));
        assert!(matches!(result, Err(crate::ReportError::LayoutError(_))));
    }
}
