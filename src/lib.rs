//! Bounding-box image annotation engine.
//!
//! Images are shown shrunk to fit a display area; boxes are drawn and
//! resized in that display space and exported back in original pixels,
//! either as one JSON document or as YOLO label files.

pub mod config;
pub mod export;
pub mod geometry;
pub mod gestures;
pub mod intake;
pub mod labels;
pub mod logging;
pub mod state;
pub mod utils;

pub use geometry::{Corner, DisplayPoint, DisplayRect, OriginalRect, ScaleRatio};
pub use labels::{Label, LabelSet};
pub use state::{
    AnnotationEngine, BoxAnnotation, DecodeFailure, DecodedImage, EngineError, EngineSettings,
    Gesture, GestureOutcome, HandleHit, ImageRecord, Tool, UNLABELED,
};
