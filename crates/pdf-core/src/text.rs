//! Text rendering utilities

use crate::document::Color;
use crate::Align;

/// Context for rendering text
pub struct TextRenderContext {
    /// PDF font resource name (e.g., "F1")
    pub font_name: String,
    /// Font size in points
    pub font_size: f32,
    /// Text width in points (for alignment)
    pub text_width: f64,
    /// Text color (RGB)
    pub color: Color,
}

/// Encode text for a WinAnsi-encoded built-in font
///
/// Latin-1 characters map to themselves, a handful of common typographic
/// characters map to their cp1252 slots, everything else becomes `?`.
pub fn encode_win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .map(|c| match c {
            '€' => 0x80,
            '…' => 0x85,
            '‘' => 0x91,
            '’' => 0x92,
            '“' => 0x93,
            '”' => 0x94,
            '•' => 0x95,
            '–' => 0x96,
            '—' => 0x97,
            c if (c as u32) < 0x80 || (0xA0..=0xFF).contains(&(c as u32)) => c as u8,
            _ => b'?',
        })
        .collect()
}

/// Escape bytes for use inside a PDF literal string
fn escape_literal(bytes: &[u8]) -> Vec<u8> {
    let mut escaped = Vec::with_capacity(bytes.len() + 2);
    for &b in bytes {
        if matches!(b, b'(' | b')' | b'\\') {
            escaped.push(b'\\');
        }
        escaped.push(b);
    }
    escaped
}

/// Generate PDF operators for text insertion
///
/// Creates the PDF text operators (BT, Tf, Td, Tj, ET) to render text
/// at a specific position with alignment support.
///
/// # Arguments
/// * `encoded` - WinAnsi-encoded text (see [`encode_win_ansi`])
/// * `x` - X anchor in points (PDF coordinates, from left)
/// * `y` - Baseline in points (PDF coordinates, from bottom)
/// * `align` - How the text sits relative to `x`
/// * `ctx` - Text rendering context
pub fn generate_text_operators(
    encoded: &[u8],
    x: f64,
    y: f64,
    align: Align,
    ctx: &TextRenderContext,
) -> Vec<u8> {
    let x_offset = match align {
        Align::Left => 0.0,
        Align::Center => -ctx.text_width / 2.0,
        Align::Right => -ctx.text_width,
    };
    let final_x = x + x_offset;

    let mut ops = Vec::new();
    ops.extend_from_slice(b"BT\n");
    ops.extend_from_slice(
        format!("{} {} {} rg\n", ctx.color.r, ctx.color.g, ctx.color.b).as_bytes(),
    );
    ops.extend_from_slice(format!("/{} {} Tf\n", ctx.font_name, ctx.font_size).as_bytes());
    ops.extend_from_slice(format!("{final_x} {y} Td\n").as_bytes());
    ops.push(b'(');
    ops.extend_from_slice(&escape_literal(encoded));
    ops.extend_from_slice(b") Tj\n");
    ops.extend_from_slice(b"ET\n");
    ops
}
