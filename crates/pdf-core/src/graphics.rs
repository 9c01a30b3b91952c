//! Vector drawing operators

use crate::document::Color;

/// How a closed shape is painted
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PaintMode {
    /// Fill with the current fill color
    #[default]
    Fill,
    /// Outline with the current draw color and line width
    Stroke,
    /// Fill, then outline
    FillStroke,
}

impl PaintMode {
    fn operator(&self) -> &'static str {
        match self {
            PaintMode::Fill => "f",
            PaintMode::Stroke => "S",
            PaintMode::FillStroke => "B",
        }
    }
}

/// Generate operators for a rectangle
///
/// All values are in points, `y` is the bottom edge in PDF coordinates.
#[allow(clippy::too_many_arguments)]
pub fn rect_operators(
    x: f64,
    y: f64,
    width: f64,
    height: f64,
    mode: PaintMode,
    fill: Color,
    stroke: Color,
    line_width: f64,
) -> Vec<u8> {
    let mut ops = String::from("q\n");
    if mode != PaintMode::Stroke {
        ops.push_str(&format!("{} {} {} rg\n", fill.r, fill.g, fill.b));
    }
    if mode != PaintMode::Fill {
        ops.push_str(&format!("{} {} {} RG\n", stroke.r, stroke.g, stroke.b));
        ops.push_str(&format!("{line_width} w\n"));
    }
    ops.push_str(&format!("{x} {y} {width} {height} re\n"));
    ops.push_str(mode.operator());
    ops.push_str("\nQ\n");
    ops.into_bytes()
}

/// Generate operators for a straight line between two points (PDF coordinates)
pub fn line_operators(
    x1: f64,
    y1: f64,
    x2: f64,
    y2: f64,
    color: Color,
    line_width: f64,
) -> Vec<u8> {
    format!(
        "q\n{} {} {} RG\n{line_width} w\n{x1} {y1} m\n{x2} {y2} l\nS\nQ\n",
        color.r, color.g, color.b
    )
    .into_bytes()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fill_rect_has_no_stroke_state() {
        let (white, black) = (Color::white(), Color::black());
        let ops = rect_operators(10.0, 20.0, 30.0, 40.0, PaintMode::Fill, white, black, 1.0);
        let ops = String::from_utf8(ops).unwrap();

        assert_eq!(ops, "q\n1 1 1 rg\n10 20 30 40 re\nf\nQ\n");
    }

    #[test]
    fn test_stroke_rect() {
        let (white, black) = (Color::white(), Color::black());
        let ops = rect_operators(0.0, 0.0, 5.0, 5.0, PaintMode::Stroke, white, black, 0.5);
        let ops = String::from_utf8(ops).unwrap();

        assert!(!ops.contains(" rg\n"));
        assert!(ops.contains("0 0 0 RG\n0.5 w\n"));
        assert!(ops.contains("0 0 5 5 re\nS\n"));
    }

    #[test]
    fn test_fill_stroke_rect() {
        let (white, black) = (Color::white(), Color::black());
        let ops = rect_operators(0.0, 0.0, 1.0, 1.0, PaintMode::FillStroke, white, black, 1.0);
        let ops = String::from_utf8(ops).unwrap();

        assert!(ops.contains("1 1 1 rg"));
        assert!(ops.contains("0 0 0 RG"));
        assert!(ops.contains("re\nB\n"));
    }

    #[test]
    fn test_line_operators() {
        let ops = line_operators(1.0, 2.0, 3.0, 4.0, Color::rgb(0.0, 0.0, 1.0), 0.3);
        let ops = String::from_utf8(ops).unwrap();

        assert_eq!(ops, "q\n0 0 1 RG\n0.3 w\n1 2 m\n3 4 l\nS\nQ\n");
    }
}
