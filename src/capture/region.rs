//! Card-shaped region geometry
//!
//! The rectangle detector upstream only hands over regions whose aspect ratio
//! looks like an ID-1 payment card, and the preview draws a centred guide of
//! the same proportions.

use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in view coordinates
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

/// Physical card proportions and the tolerance for detected rectangles
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CardRegion {
    /// Card width in millimetres
    pub width_mm: f32,
    /// Card height in millimetres
    pub height_mm: f32,
    /// Lower bound on the detected ratio, as a factor of the card ratio
    pub min_aspect_factor: f32,
    /// Upper bound on the detected ratio, as a factor of the card ratio
    pub max_aspect_factor: f32,
}

impl Default for CardRegion {
    fn default() -> Self {
        Self {
            width_mm: 85.60,
            height_mm: 53.98,
            min_aspect_factor: 0.95,
            max_aspect_factor: 1.10,
        }
    }
}

impl CardRegion {
    /// Width over height of the physical card
    pub fn aspect_ratio(&self) -> f32 {
        self.width_mm / self.height_mm
    }

    /// Accepted (min, max) aspect ratio for a detected rectangle
    pub fn aspect_bounds(&self) -> (f32, f32) {
        let ratio = self.aspect_ratio();
        (ratio * self.min_aspect_factor, ratio * self.max_aspect_factor)
    }

    /// Whether a detected rectangle of this size could be a card
    pub fn accepts_aspect(&self, width: f32, height: f32) -> bool {
        if width <= 0.0 || height <= 0.0 {
            return false;
        }
        let (min, max) = self.aspect_bounds();
        let ratio = width / height;
        ratio >= min && ratio <= max
    }

    /// Centred scan guide for a preview of the given size
    pub fn guide_rect(&self, view_width: f32, view_height: f32) -> Rect {
        let width = view_width * self.width_mm / 100.0;
        let height = width * self.height_mm / 100.0;
        Rect {
            x: (view_width - width) / 2.0,
            y: (view_height - height) / 2.0,
            width,
            height,
        }
    }
}
