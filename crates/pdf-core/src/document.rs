//! PDF Document writer

use crate::font::{BuiltinFont, FontStyle, FontWeight};
use crate::graphics::{line_operators, rect_operators, PaintMode};
use crate::image::{generate_image_operators, ImageXObject};
use crate::text::{encode_win_ansi, generate_text_operators, TextRenderContext};
use crate::{Align, PdfError, Result};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream, StringFormat};
use std::collections::hash_map::DefaultHasher;
use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::hash::{Hash, Hasher};
use std::io::Write;
use std::path::Path;

/// RGB Color (values 0.0 - 1.0)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Color {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Color {
    /// Create a new RGB color (values 0.0 - 1.0)
    pub fn rgb(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create color from RGB values (0-255)
    pub fn from_rgb(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    pub fn black() -> Self {
        Self::rgb(0.0, 0.0, 0.0)
    }

    pub fn white() -> Self {
        Self::rgb(1.0, 1.0, 1.0)
    }
}

impl Default for Color {
    fn default() -> Self {
        Self::black()
    }
}

/// Page dimensions in points
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PageSize {
    pub width: f64,
    pub height: f64,
}

impl PageSize {
    /// ISO A4 portrait
    pub const A4: PageSize = PageSize {
        width: 595.28,
        height: 841.89,
    };

    /// Build a page size from millimetres
    pub fn from_mm(width: f64, height: f64) -> Self {
        Self {
            width: width * Unit::Millimeter.points(),
            height: height * Unit::Millimeter.points(),
        }
    }
}

/// Unit for all coordinates passed to the drawing API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Unit {
    #[default]
    Point,
    Millimeter,
}

impl Unit {
    /// Number of points in one unit
    pub fn points(&self) -> f64 {
        match self {
            Unit::Point => 1.0,
            Unit::Millimeter => 72.0 / 25.4,
        }
    }
}

/// A clickable URI region
#[derive(Debug, Clone)]
struct LinkAnnotation {
    /// [x1 y1 x2 y2] in PDF coordinates
    rect: [f64; 4],
    uri: String,
}

impl LinkAnnotation {
    fn to_object(&self) -> Object {
        let rect = self.rect.iter().map(|v| Object::Real(*v as f32)).collect::<Vec<_>>();
        Object::Dictionary(dictionary! {
            "Type" => "Annot",
            "Subtype" => "Link",
            "Rect" => rect,
            "Border" => vec![Object::Integer(0), Object::Integer(0), Object::Integer(0)],
            "A" => dictionary! {
                "Type" => "Action",
                "S" => "URI",
                "URI" => Object::String(self.uri.as_bytes().to_vec(), StringFormat::Literal),
            },
        })
    }
}

/// Everything buffered for one page until the document is written
#[derive(Debug)]
struct PageState {
    id: ObjectId,
    content: Vec<u8>,
    fonts: BTreeSet<BuiltinFont>,
    images: BTreeMap<String, ObjectId>,
    links: Vec<LinkAnnotation>,
}

/// PDF Document writer providing high-level drawing operations
///
/// Drawing calls only buffer content; page objects, fonts and the page
/// tree are assembled once in [`PdfDocument::finish`]. Pages can be drawn
/// on in any order, which is what makes a trailing "page X of N" pass
/// possible.
pub struct PdfDocument {
    /// The underlying lopdf document
    inner: Document,
    /// Pre-allocated ID of the page tree root
    pages_id: ObjectId,
    page_size: PageSize,
    unit: Unit,
    pages: Vec<PageState>,
    current_weight: FontWeight,
    current_style: FontStyle,
    current_font_size: f32,
    current_text_color: Color,
    fill_color: Color,
    draw_color: Color,
    /// Line width in document units
    line_width: f64,
    /// Embedded images (data hash -> object ID, pixel width, pixel height)
    embedded_images: HashMap<u64, ObjectId>,
    next_image_resource: u32,
    compress: bool,
    info: BTreeMap<String, String>,
}

impl PdfDocument {
    /// Create an empty document; add pages with [`PdfDocument::add_page`]
    pub fn new(page_size: PageSize) -> Self {
        let mut inner = Document::with_version("1.5");
        let pages_id = inner.new_object_id();

        Self {
            inner,
            pages_id,
            page_size,
            unit: Unit::default(),
            pages: Vec::new(),
            current_weight: FontWeight::default(),
            current_style: FontStyle::default(),
            current_font_size: 12.0,
            current_text_color: Color::default(),
            fill_color: Color::white(),
            draw_color: Color::black(),
            line_width: 0.2,
            embedded_images: HashMap::new(),
            next_image_resource: 1,
            compress: true,
            info: BTreeMap::new(),
        }
    }

    /// Measure all coordinates in `unit`
    pub fn with_unit(mut self, unit: Unit) -> Self {
        self.unit = unit;
        self
    }

    /// Enable or disable flate compression of page content streams
    pub fn set_compression(&mut self, compress: bool) {
        self.compress = compress;
    }

    /// Set a document information entry (e.g., "Title", "Creator")
    pub fn set_info(&mut self, key: &str, value: &str) {
        self.info.insert(key.to_string(), value.to_string());
    }

    /// Get the number of pages in the document
    pub fn page_count(&self) -> usize {
        self.pages.len()
    }

    /// Page width in document units
    pub fn page_width(&self) -> f64 {
        self.page_size.width / self.unit.points()
    }

    /// Page height in document units
    pub fn page_height(&self) -> f64 {
        self.page_size.height / self.unit.points()
    }

    /// Append a blank page
    ///
    /// # Returns
    /// New page number (1-indexed)
    pub fn add_page(&mut self) -> usize {
        let id = self.inner.new_object_id();
        self.pages.push(PageState {
            id,
            content: Vec::new(),
            fonts: BTreeSet::new(),
            images: BTreeMap::new(),
            links: Vec::new(),
        });
        self.pages.len()
    }

    fn page_mut(&mut self, page: usize) -> Result<&mut PageState> {
        let page_count = self.pages.len();
        if page == 0 || page > page_count {
            return Err(PdfError::InvalidPage(page, page_count));
        }
        Ok(&mut self.pages[page - 1])
    }

    /// Set font weight, style and size in one call
    pub fn set_font(&mut self, weight: FontWeight, style: FontStyle, size: f32) {
        self.current_weight = weight;
        self.current_style = style;
        self.current_font_size = size;
    }

    /// Set only the font size in points (keeps weight/style)
    pub fn set_font_size(&mut self, size: f32) {
        self.current_font_size = size;
    }

    /// The built-in font selected by the current weight and style
    pub fn current_font(&self) -> BuiltinFont {
        BuiltinFont::from_variant(self.current_weight, self.current_style)
    }

    /// Set the text color
    pub fn set_text_color(&mut self, color: Color) {
        self.current_text_color = color;
    }

    /// Set the color used by filled shapes
    pub fn set_fill_color(&mut self, color: Color) {
        self.fill_color = color;
    }

    /// Set the color used by outlines and lines
    pub fn set_draw_color(&mut self, color: Color) {
        self.draw_color = color;
    }

    /// Set the line width in document units
    pub fn set_line_width(&mut self, width: f64) {
        self.line_width = width;
    }

    /// Width of `text` in document units with the current font
    pub fn get_text_width(&self, text: &str) -> f64 {
        let points = self
            .current_font()
            .text_width_points(text, self.current_font_size) as f64;
        points / self.unit.points()
    }

    /// Convert a top-origin y coordinate to PDF bottom-origin points
    fn to_pdf_y(&self, y: f64) -> f64 {
        self.page_size.height - y * self.unit.points()
    }

    fn append_content(&mut self, page: usize, content: &[u8]) -> Result<()> {
        self.page_mut(page)?.content.extend_from_slice(content);
        Ok(())
    }

    /// Insert text with its baseline at `y`
    ///
    /// # Arguments
    /// * `text` - Text to insert
    /// * `page` - Page number (1-indexed)
    /// * `x` - X anchor (see `align`)
    /// * `y` - Baseline, measured from the top of the page
    /// * `align` - Text alignment relative to `x`
    pub fn insert_text(
        &mut self,
        text: &str,
        page: usize,
        x: f64,
        y: f64,
        align: Align,
    ) -> Result<()> {
        let font = self.current_font();
        self.page_mut(page)?.fonts.insert(font);

        if text.is_empty() {
            return Ok(());
        }

        let ctx = TextRenderContext {
            font_name: font.resource_name().to_string(),
            font_size: self.current_font_size,
            text_width: font.text_width_points(text, self.current_font_size) as f64,
            color: self.current_text_color,
        };
        let operators = generate_text_operators(
            &encode_win_ansi(text),
            x * self.unit.points(),
            self.to_pdf_y(y),
            align,
            &ctx,
        );
        self.append_content(page, &operators)
    }

    /// Draw a rectangle whose top-left corner is at (`x`, `y`)
    pub fn draw_rect(
        &mut self,
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        mode: PaintMode,
    ) -> Result<()> {
        let k = self.unit.points();
        let operators = rect_operators(
            x * k,
            self.to_pdf_y(y + height),
            width * k,
            height * k,
            mode,
            self.fill_color,
            self.draw_color,
            self.line_width * k,
        );
        self.append_content(page, &operators)
    }

    /// Shorthand for a filled rectangle
    pub fn fill_rect(
        &mut self,
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<()> {
        self.draw_rect(page, x, y, width, height, PaintMode::Fill)
    }

    /// Draw a line with the current draw color and line width
    pub fn draw_line(&mut self, page: usize, x1: f64, y1: f64, x2: f64, y2: f64) -> Result<()> {
        let k = self.unit.points();
        let operators = line_operators(
            x1 * k,
            self.to_pdf_y(y1),
            x2 * k,
            self.to_pdf_y(y2),
            self.draw_color,
            self.line_width * k,
        );
        self.append_content(page, &operators)
    }

    /// Insert a PNG image stretched to the given box
    ///
    /// Identical image data is embedded once and shared between pages.
    pub fn insert_image(
        &mut self,
        data: &[u8],
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
    ) -> Result<()> {
        let page_count = self.pages.len();
        if page == 0 || page > page_count {
            return Err(PdfError::InvalidPage(page, page_count));
        }

        let resource_name = self.get_or_create_image_ref(data, page)?;
        let k = self.unit.points();
        let operators = generate_image_operators(
            &resource_name,
            x * k,
            self.to_pdf_y(y + height),
            width * k,
            height * k,
        );
        self.append_content(page, &operators)
    }

    /// Get or create an image resource on a page
    ///
    /// Returns the resource name (e.g., "Im1").
    fn get_or_create_image_ref(&mut self, data: &[u8], page: usize) -> Result<String> {
        let mut hasher = DefaultHasher::new();
        data.hash(&mut hasher);
        let data_hash = hasher.finish();

        let object_id = match self.embedded_images.get(&data_hash).copied() {
            Some(object_id) => object_id,
            None => {
                let xobject = ImageXObject::from_png(data)?;
                let object_id = self.inner.add_object(xobject.to_pdf_stream());
                self.embedded_images.insert(data_hash, object_id);
                object_id
            }
        };

        let existing = self.pages[page - 1]
            .images
            .iter()
            .find(|(_, id)| **id == object_id)
            .map(|(name, _)| name.clone());
        if let Some(name) = existing {
            return Ok(name);
        }

        let resource_name = format!("Im{}", self.next_image_resource);
        self.next_image_resource += 1;
        self.pages[page - 1]
            .images
            .insert(resource_name.clone(), object_id);

        Ok(resource_name)
    }

    /// Make a rectangular region open `uri` when clicked
    pub fn add_link(
        &mut self,
        page: usize,
        x: f64,
        y: f64,
        width: f64,
        height: f64,
        uri: &str,
    ) -> Result<()> {
        let k = self.unit.points();
        let rect = [
            x * k,
            self.to_pdf_y(y + height),
            (x + width) * k,
            self.to_pdf_y(y),
        ];
        self.page_mut(page)?.links.push(LinkAnnotation {
            rect,
            uri: uri.to_string(),
        });
        Ok(())
    }

    /// Write the document to a file
    pub fn save<P: AsRef<Path>>(self, path: P) -> Result<()> {
        let bytes = self.finish()?;
        std::fs::write(path, bytes)?;
        Ok(())
    }

    /// Assemble all buffered pages and serialize the document
    pub fn finish(mut self) -> Result<Vec<u8>> {
        self.write_objects()?;

        let mut buffer = Vec::new();
        self.inner
            .save_to(&mut buffer)
            .map_err(|e| PdfError::SaveError(e.to_string()))?;

        Ok(buffer)
    }

    fn content_stream(&self, content: Vec<u8>) -> Result<Stream> {
        if !self.compress {
            return Ok(Stream::new(Dictionary::new(), content));
        }

        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&content)?;
        let compressed = encoder.finish()?;
        Ok(Stream::new(dictionary! { "Filter" => "FlateDecode" }, compressed))
    }

    /// Build page, font, catalog and info objects from the buffered state
    fn write_objects(&mut self) -> Result<()> {
        if self.pages.is_empty() {
            return Err(PdfError::EmptyDocument);
        }

        let mut font_ids: BTreeMap<BuiltinFont, ObjectId> = BTreeMap::new();
        let media_box: Vec<Object> = [0.0, 0.0, self.page_size.width, self.page_size.height]
            .iter()
            .map(|v| Object::Real(*v as f32))
            .collect();

        let pages = std::mem::take(&mut self.pages);
        let mut kids = Vec::with_capacity(pages.len());

        for page in pages {
            let mut font_dict = Dictionary::new();
            for font in &page.fonts {
                let font_id = match font_ids.get(font) {
                    Some(id) => *id,
                    None => {
                        let id = self.inner.add_object(font.to_pdf_dictionary());
                        font_ids.insert(*font, id);
                        id
                    }
                };
                font_dict.set(font.resource_name(), Object::Reference(font_id));
            }

            let mut xobject_dict = Dictionary::new();
            for (name, id) in &page.images {
                xobject_dict.set(name.as_str(), Object::Reference(*id));
            }

            let mut resources = Dictionary::new();
            if !font_dict.is_empty() {
                resources.set("Font", font_dict);
            }
            if !xobject_dict.is_empty() {
                resources.set("XObject", xobject_dict);
            }

            let stream = self.content_stream(page.content)?;
            let contents_id = self.inner.add_object(stream);

            let mut page_dict = dictionary! {
                "Type" => "Page",
                "Parent" => self.pages_id,
                "MediaBox" => media_box.clone(),
                "Resources" => resources,
                "Contents" => contents_id,
            };
            if !page.links.is_empty() {
                let annots = page.links.iter().map(LinkAnnotation::to_object).collect::<Vec<_>>();
                page_dict.set("Annots", annots);
            }

            self.inner.objects.insert(page.id, Object::Dictionary(page_dict));
            kids.push(Object::Reference(page.id));
        }

        let count = kids.len() as i64;
        self.inner.objects.insert(
            self.pages_id,
            Object::Dictionary(dictionary! {
                "Type" => "Pages",
                "Kids" => kids,
                "Count" => count,
            }),
        );

        let catalog_id = self.inner.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.inner.trailer.set("Root", catalog_id);

        if !self.info.is_empty() {
            let mut info = Dictionary::new();
            for (key, value) in &self.info {
                info.set(
                    key.as_str(),
                    Object::String(encode_win_ansi(value), StringFormat::Literal),
                );
            }
            let info_id = self.inner.add_object(info);
            self.inner.trailer.set("Info", info_id);
        }

        Ok(())
    }
}
