use serde::{Deserialize, Serialize};

pub mod codec;
mod color;

pub use codec::{decode, encode, MalformedMessage};
pub use color::normalize_color;

pub const DEFAULT_BRUSH_COLOR: &str = "#000000";
pub const DEFAULT_BRUSH_SIZE: f64 = 10.0;
pub const MIN_BRUSH_SIZE: f64 = 1.0;
pub const MAX_BRUSH_SIZE: f64 = 100.0;

/// Surface-local position in pixels, origin at the top-left corner.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn is_finite(self) -> bool {
        self.x.is_finite() && self.y.is_finite()
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct BrushSettings {
    /// Canonical lowercase `#rrggbb`.
    pub color: String,
    pub size: f64,
}

impl Default for BrushSettings {
    fn default() -> Self {
        Self {
            color: DEFAULT_BRUSH_COLOR.to_string(),
            size: DEFAULT_BRUSH_SIZE,
        }
    }
}

impl BrushSettings {
    /// Returns `None` unless the color parses and the size is within the slider range.
    pub fn new(color: &str, size: f64) -> Option<Self> {
        let color = normalize_color(color)?;
        if !is_valid_brush_size(size) {
            return None;
        }
        Some(Self { color, size })
    }
}

pub fn is_valid_brush_size(size: f64) -> bool {
    (MIN_BRUSH_SIZE..=MAX_BRUSH_SIZE).contains(&size)
}

pub fn clamp_brush_size(size: f64) -> f64 {
    if !size.is_finite() {
        return DEFAULT_BRUSH_SIZE;
    }
    size.clamp(MIN_BRUSH_SIZE, MAX_BRUSH_SIZE)
}

/// One straight segment plus the brush used to draw it.
///
/// A segment with `from == to` is a dot: it is painted as a filled disc so a
/// click without movement still leaves a mark on every participant.
#[derive(Clone, Debug, PartialEq)]
pub struct StrokeMessage {
    pub from: Point,
    pub to: Point,
    pub brush_size: f64,
    pub brush_color: String,
}

impl StrokeMessage {
    pub fn segment(from: Point, to: Point, brush: &BrushSettings) -> Self {
        Self {
            from,
            to,
            brush_size: brush.size,
            brush_color: brush.color.clone(),
        }
    }

    pub fn dot(at: Point, brush: &BrushSettings) -> Self {
        Self::segment(at, at, brush)
    }

    pub fn is_dot(&self) -> bool {
        self.from == self.to
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn brush_rejects_out_of_range_size() {
        assert!(BrushSettings::new("#112233", 0.5).is_none());
        assert!(BrushSettings::new("#112233", 101.0).is_none());
        assert_eq!(
            BrushSettings::new("#AABBCC", 100.0),
            Some(BrushSettings {
                color: "#aabbcc".to_string(),
                size: 100.0
            })
        );
    }

    #[test]
    fn valid_brush_size_is_the_slider_range() {
        assert!(is_valid_brush_size(MIN_BRUSH_SIZE));
        assert!(is_valid_brush_size(MAX_BRUSH_SIZE));
        assert!(!is_valid_brush_size(0.99));
        assert!(!is_valid_brush_size(f64::NAN));
        assert!(!is_valid_brush_size(f64::INFINITY));
    }

    #[test]
    fn clamp_brush_size_handles_extremes() {
        assert_eq!(clamp_brush_size(0.0), MIN_BRUSH_SIZE);
        assert_eq!(clamp_brush_size(250.0), MAX_BRUSH_SIZE);
        assert_eq!(clamp_brush_size(f64::NAN), DEFAULT_BRUSH_SIZE);
        assert_eq!(clamp_brush_size(42.0), 42.0);
    }

    #[test]
    fn dot_has_identical_endpoints() {
        let brush = BrushSettings::default();
        let dot = StrokeMessage::dot(Point::new(3.0, 4.0), &brush);
        assert!(dot.is_dot());
        assert_eq!(dot.brush_color, DEFAULT_BRUSH_COLOR);
        assert_eq!(dot.brush_size, DEFAULT_BRUSH_SIZE);
    }
}
