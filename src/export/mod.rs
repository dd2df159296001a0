//! Export of annotations to external formats.
//!
//! - `json` - absolute pixel bounds for every image in one document
//! - `yolo` - one normalized center-relative text file per image

pub mod json;
pub mod yolo;

use serde::{Deserialize, Serialize};
use thiserror::Error;

pub use json::{AnnotationExport, ExportedBox, ImageAnnotations};
pub use yolo::{YoloExport, YoloFile};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no images loaded, nothing to export")]
    NothingToExport,
    #[error("no annotations to export")]
    NoAnnotations,
    #[error("failed to serialize export: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("failed to write {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
}

/// Export format types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    Json,
    Yolo,
    #[default]
    All,
}

impl ExportFormat {
    pub fn name(&self) -> &'static str {
        match self {
            ExportFormat::Json => "Annotation JSON",
            ExportFormat::Yolo => "YOLO text",
            ExportFormat::All => "JSON and YOLO",
        }
    }

    pub fn includes_json(&self) -> bool {
        matches!(self, ExportFormat::Json | ExportFormat::All)
    }

    pub fn includes_yolo(&self) -> bool {
        matches!(self, ExportFormat::Yolo | ExportFormat::All)
    }
}

/// Export result with statistics
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct ExportSummary {
    pub images_exported: usize,
    pub annotations_exported: usize,
    pub annotations_skipped: usize,
}
