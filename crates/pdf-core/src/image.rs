//! Image handling for PDF documents

use crate::{PdfError, Result};
use image::{DynamicImage, ImageFormat};
use lopdf::{dictionary, Stream};
use std::io::Write;

impl From<image::ImageError> for PdfError {
    fn from(err: image::ImageError) -> Self {
        PdfError::ImageError(err.to_string())
    }
}

const PNG_MAGIC: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];

/// Check for the PNG signature
pub fn is_png(data: &[u8]) -> bool {
    data.len() >= PNG_MAGIC.len() && data[..PNG_MAGIC.len()] == PNG_MAGIC
}

/// Image XObject for PDF embedding
#[derive(Debug, Clone)]
pub struct ImageXObject {
    pub width: u32,
    pub height: u32,
    /// "DeviceRGB" or "DeviceGray"
    pub color_space: &'static str,
    /// Flate-compressed samples, 8 bits per component
    pub data: Vec<u8>,
}

/// Blend a sample over a white background
fn over_white(sample: u8, alpha: u8) -> u8 {
    let a = alpha as f32 / 255.0;
    (sample as f32 * a + 255.0 * (1.0 - a)) as u8
}

impl ImageXObject {
    /// Create XObject from PNG data
    ///
    /// Grayscale stays grayscale, everything else becomes RGB. Alpha is
    /// flattened onto white since the report never layers images.
    pub fn from_png(data: &[u8]) -> Result<Self> {
        if !is_png(data) {
            return Err(PdfError::ImageError("Unknown image format".to_string()));
        }

        let image = image::load_from_memory_with_format(data, ImageFormat::Png)?;
        let (width, height) = (image.width(), image.height());
        let has_alpha = image.color().has_alpha();

        let (raw, color_space) = match image {
            DynamicImage::ImageLuma8(_) | DynamicImage::ImageLuma16(_) => {
                (image.to_luma8().into_raw(), "DeviceGray")
            }
            DynamicImage::ImageLumaA8(_) | DynamicImage::ImageLumaA16(_) => {
                let raw = image
                    .to_luma_alpha8()
                    .pixels()
                    .map(|p| over_white(p[0], p[1]))
                    .collect();
                (raw, "DeviceGray")
            }
            _ if has_alpha => {
                let raw = image
                    .to_rgba8()
                    .pixels()
                    .flat_map(|p| {
                        let alpha = p[3];
                        [over_white(p[0], alpha), over_white(p[1], alpha), over_white(p[2], alpha)]
                    })
                    .collect();
                (raw, "DeviceRGB")
            }
            _ => (image.to_rgb8().into_raw(), "DeviceRGB"),
        };

        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder.write_all(&raw)?;
        let data = encoder.finish()?;

        Ok(Self {
            width,
            height,
            color_space,
            data,
        })
    }

    /// Convert to lopdf Stream object
    pub fn to_pdf_stream(&self) -> Stream {
        let dict = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => self.width as i64,
            "Height" => self.height as i64,
            "ColorSpace" => self.color_space,
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        };
        Stream::new(dict, self.data.clone())
    }
}

/// Generate operators to draw an image XObject
///
/// All values are in points, `y` is the bottom edge in PDF coordinates.
pub fn generate_image_operators(
    image_name: &str,
    x: f64,
    y: f64,
    width: f64,
    height: f64,
) -> Vec<u8> {
    format!("q\n{width} 0 0 {height} {x} {y} cm\n/{image_name} Do\nQ\n").into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, Luma, Rgba, RgbaImage};
    use std::io::Cursor;

    fn encode_png(image: DynamicImage) -> Vec<u8> {
        let mut bytes = Vec::new();
        image.write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png).unwrap();
        bytes
    }

    #[test]
    fn test_is_png() {
        assert!(is_png(&PNG_MAGIC));
        assert!(!is_png(&[0xFF, 0xD8, 0xFF, 0xE0, 0x00, 0x10, 0x4A, 0x46]));
        assert!(!is_png(&[0x89, 0x50]));
    }

    #[test]
    fn test_from_png_grayscale() {
        let png = encode_png(DynamicImage::ImageLuma8(GrayImage::from_pixel(4, 3, Luma([0]))));
        let xobject = ImageXObject::from_png(&png).unwrap();

        assert_eq!(xobject.width, 4);
        assert_eq!(xobject.height, 3);
        assert_eq!(xobject.color_space, "DeviceGray");
        assert!(!xobject.data.is_empty());
    }

    #[test]
    fn test_from_png_rgba_is_flattened() {
        let transparent = RgbaImage::from_pixel(2, 2, Rgba([0, 0, 0, 0]));
        let png = encode_png(DynamicImage::ImageRgba8(transparent));
        let xobject = ImageXObject::from_png(&png).unwrap();
        assert_eq!(xobject.color_space, "DeviceRGB");

        let mut decoder = flate2::read::ZlibDecoder::new(&xobject.data[..]);
        let mut raw = Vec::new();
        std::io::Read::read_to_end(&mut decoder, &mut raw).unwrap();
        // Fully transparent black over white is white
        assert_eq!(raw, vec![255; 12]);
    }

    #[test]
    fn test_from_png_rejects_other_formats() {
        let result = ImageXObject::from_png(b"GIF89a......");
        assert!(matches!(result, Err(PdfError::ImageError(_))));
    }

    #[test]
    fn test_image_operators() {
        let ops = generate_image_operators("Im1", 10.0, 20.0, 60.0, 60.0);
        let ops = String::from_utf8(ops).unwrap();
        assert_eq!(ops, "q\n60 0 0 60 10 20 cm\n/Im1 Do\nQ\n");
    }
}
