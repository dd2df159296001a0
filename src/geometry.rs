//! Coordinate spaces and the conversions between them.
//!
//! Boxes are edited in *display* space (canvas pixels after shrinking the
//! image to fit the display bounds) and exported in *original* space (pixels
//! of the full-resolution image). The two are kept as separate types so a
//! conversion always goes through the image's [`ScaleRatio`].

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum GeometryError {
    #[error("image dimensions must be non-zero, got {width}x{height}")]
    EmptyImage { width: u32, height: u32 },
    #[error("display bounds must be non-zero, got {max_width}x{max_height}")]
    EmptyBounds { max_width: u32, max_height: u32 },
}

/// Factor converting original-space lengths into display-space lengths.
///
/// Always in `(0, 1]`: images are shrunk to fit, never enlarged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ScaleRatio(f32);

impl ScaleRatio {
    pub const IDENTITY: ScaleRatio = ScaleRatio(1.0);

    /// Ratio that fits a `width` x `height` image inside `max_width` x
    /// `max_height` while preserving its aspect ratio.
    pub fn fit(
        width: u32,
        height: u32,
        max_width: u32,
        max_height: u32,
    ) -> Result<Self, GeometryError> {
        if width == 0 || height == 0 {
            return Err(GeometryError::EmptyImage { width, height });
        }
        if max_width == 0 || max_height == 0 {
            return Err(GeometryError::EmptyBounds {
                max_width,
                max_height,
            });
        }

        if width <= max_width && height <= max_height {
            return Ok(Self::IDENTITY);
        }

        let width_ratio = max_width as f32 / width as f32;
        let height_ratio = max_height as f32 / height as f32;
        Ok(Self(width_ratio.min(height_ratio)))
    }

    /// Wraps a previously computed ratio, e.g. one read back from a session
    /// file. Returns `None` for anything outside `(0, 1]`.
    pub fn from_raw(ratio: f32) -> Option<Self> {
        (ratio.is_finite() && ratio > 0.0 && ratio <= 1.0).then_some(Self(ratio))
    }

    pub fn get(self) -> f32 {
        self.0
    }

    /// Display size of an image with the given original size.
    pub fn display_size(self, width: u32, height: u32) -> (u32, u32) {
        (
            (width as f32 * self.0).round() as u32,
            (height as f32 * self.0).round() as u32,
        )
    }

    pub fn to_original(self, display: f32) -> i32 {
        (display / self.0).round() as i32
    }

    pub fn to_display(self, original: i32) -> f32 {
        original as f32 * self.0
    }
}

/// A pointer position on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DisplayPoint {
    pub x: f32,
    pub y: f32,
}

impl DisplayPoint {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

/// One of the four resize handles of a box.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    BottomRight,
}

impl Corner {
    /// Hit-testing order within a single box.
    pub const ALL: [Corner; 4] = [
        Corner::TopLeft,
        Corner::TopRight,
        Corner::BottomLeft,
        Corner::BottomRight,
    ];
}

/// Axis-aligned rectangle in display space.
///
/// `width` and `height` are only allowed to be negative while a resize is in
/// progress; see [`DisplayRect::normalized`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct DisplayRect {
    pub x: f32,
    pub y: f32,
    pub width: f32,
    pub height: f32,
}

impl DisplayRect {
    pub fn new(x: f32, y: f32, width: f32, height: f32) -> Self {
        Self {
            x,
            y,
            width,
            height,
        }
    }

    /// Rectangle spanned by two points, whichever direction they were
    /// dragged in.
    pub fn from_corners(a: DisplayPoint, b: DisplayPoint) -> Self {
        Self {
            x: a.x.min(b.x),
            y: a.y.min(b.y),
            width: (b.x - a.x).abs(),
            height: (b.y - a.y).abs(),
        }
    }

    pub fn corner(&self, corner: Corner) -> DisplayPoint {
        match corner {
            Corner::TopLeft => DisplayPoint::new(self.x, self.y),
            Corner::TopRight => DisplayPoint::new(self.x + self.width, self.y),
            Corner::BottomLeft => DisplayPoint::new(self.x, self.y + self.height),
            Corner::BottomRight => {
                DisplayPoint::new(self.x + self.width, self.y + self.height)
            }
        }
    }

    /// Flips negative extents so `(x, y)` is the true top-left corner.
    pub fn normalized(self) -> Self {
        let mut rect = self;
        if rect.width < 0.0 {
            rect.x += rect.width;
            rect.width = -rect.width;
        }
        if rect.height < 0.0 {
            rect.y += rect.height;
            rect.height = -rect.height;
        }
        rect
    }

    /// Grows each extent up to `min_size`, keeping the top-left corner.
    pub fn with_min_size(self, min_size: f32) -> Self {
        Self {
            width: self.width.max(min_size),
            height: self.height.max(min_size),
            ..self
        }
    }

    pub fn to_original(&self, ratio: ScaleRatio) -> OriginalRect {
        OriginalRect {
            x_min: ratio.to_original(self.x),
            y_min: ratio.to_original(self.y),
            x_max: ratio.to_original(self.x + self.width),
            y_max: ratio.to_original(self.y + self.height),
        }
    }
}

/// Pixel bounds in the full-resolution image.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OriginalRect {
    pub x_min: i32,
    pub y_min: i32,
    pub x_max: i32,
    pub y_max: i32,
}

impl OriginalRect {
    pub fn width(&self) -> i32 {
        self.x_max - self.x_min
    }

    pub fn height(&self) -> i32 {
        self.y_max - self.y_min
    }

    pub fn to_display(&self, ratio: ScaleRatio) -> DisplayRect {
        let x = ratio.to_display(self.x_min);
        let y = ratio.to_display(self.y_min);
        DisplayRect {
            x,
            y,
            width: ratio.to_display(self.x_max) - x,
            height: ratio.to_display(self.y_max) - y,
        }
    }

    /// Center and size as fractions of the image size, each clamped into
    /// `[0, 1]`. Returns `None` when any value is not finite.
    pub fn to_normalized(&self, image_width: u32, image_height: u32) -> Option<NormalizedBox> {
        let img_w = image_width as f64;
        let img_h = image_height as f64;

        let x_center = (self.x_min as f64 + self.x_max as f64) / 2.0 / img_w;
        let y_center = (self.y_min as f64 + self.y_max as f64) / 2.0 / img_h;
        let width = self.width() as f64 / img_w;
        let height = self.height() as f64 / img_h;

        let values = [x_center, y_center, width, height];
        if values.iter().any(|v| !v.is_finite()) {
            return None;
        }

        Some(NormalizedBox {
            x_center: x_center.clamp(0.0, 1.0),
            y_center: y_center.clamp(0.0, 1.0),
            width: width.clamp(0.0, 1.0),
            height: height.clamp(0.0, 1.0),
        })
    }
}

/// Center-relative box geometry as used by YOLO label files.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NormalizedBox {
    pub x_center: f64,
    pub y_center: f64,
    pub width: f64,
    pub height: f64,
}
