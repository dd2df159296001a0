//! Core data types shared by the engine, gestures and export code.

use crate::geometry::{Corner, DisplayPoint, DisplayRect, ScaleRatio};
use serde::{Deserialize, Serialize};

/// Label assigned to boxes when no label exists or was chosen.
pub const UNLABELED: &str = "unlabeled";

/// Tunables for display fitting and box editing.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EngineSettings {
    pub max_display_width: u32,
    pub max_display_height: u32,
    /// Smallest width/height a finished box may have, in display pixels.
    pub min_box_size: f32,
    /// Half the side of the square hit region around each corner handle.
    pub handle_size: f32,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            max_display_width: 640,
            max_display_height: 480,
            min_box_size: 5.0,
            handle_size: 6.0,
        }
    }
}

/// A single rectangular annotation, stored in display space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BoxAnnotation {
    #[serde(flatten)]
    pub rect: DisplayRect,
    pub label: String,
}

impl BoxAnnotation {
    pub fn new(rect: DisplayRect, label: impl Into<String>) -> Self {
        Self {
            rect,
            label: label.into(),
        }
    }

    pub fn is_unlabeled(&self) -> bool {
        self.label == UNLABELED
    }
}

/// What the caller hands over after decoding an image file.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodedImage {
    /// Path or URI the renderer uses to fetch pixels.
    pub source: String,
    pub filename: String,
    pub width: u32,
    pub height: u32,
}

/// One loaded image with its boxes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub source: String,
    pub filename: String,
    pub width: u32,
    pub height: u32,
    pub scale_ratio: ScaleRatio,
    #[serde(default)]
    pub boxes: Vec<BoxAnnotation>,
}

impl ImageRecord {
    pub fn display_size(&self) -> (u32, u32) {
        self.scale_ratio.display_size(self.width, self.height)
    }
}

/// Active pointer tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Tool {
    #[default]
    Draw,
    Edit,
}

/// Pointer gesture in progress on the active image.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Gesture {
    #[default]
    Idle,
    Drawing {
        anchor: DisplayPoint,
        current: DisplayPoint,
    },
    Resizing {
        box_index: usize,
        corner: Corner,
        anchor: DisplayPoint,
    },
}

impl Gesture {
    pub fn is_idle(&self) -> bool {
        matches!(self, Gesture::Idle)
    }
}

/// A corner handle under the pointer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandleHit {
    pub box_index: usize,
    pub corner: Corner,
}

/// Result of feeding one pointer event to the engine.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GestureOutcome {
    /// The event had no effect in the current state.
    Ignored,
    DrawStarted,
    ResizeStarted(HandleHit),
    /// Preview or box geometry changed; the caller should redraw.
    Updated,
    /// A new box was appended at this index.
    Created(usize),
    /// The draw gesture ended below the minimum size.
    Discarded,
    /// A resize finished and the box at this index was normalized.
    Resized(usize),
    /// The pointer left the canvas mid-draw.
    Cancelled,
}

/// An image the caller could not decode.
#[derive(Debug, Clone, PartialEq)]
pub struct DecodeFailure {
    pub filename: String,
    pub reason: String,
}

impl DecodeFailure {
    pub fn new(filename: impl Into<String>, reason: impl ToString) -> Self {
        Self {
            filename: filename.into(),
            reason: reason.to_string(),
        }
    }
}
