// Annotation JSON export: boxes as absolute pixel bounds in original space.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use tracing::info;

use super::{ExportError, ExportSummary};
use crate::labels::{Label, LabelSet};
use crate::state::ImageRecord;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportedBox {
    pub x_min: i32,
    pub y_min: i32,
    pub x_max: i32,
    pub y_max: i32,
    pub label: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageAnnotations {
    pub image_filename: String,
    pub image_width: u32,
    pub image_height: u32,
    pub boxes: Vec<ExportedBox>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AnnotationExport {
    pub labels: Vec<Label>,
    pub annotations_by_image: Vec<ImageAnnotations>,
}

impl AnnotationExport {
    /// Converts every box of every image to original-space bounds.
    ///
    /// Images without boxes are listed with an empty `boxes` array. Fails
    /// only when there is nothing at all to export.
    pub fn build(images: &[ImageRecord], labels: &LabelSet) -> Result<Self, ExportError> {
        if images.is_empty() {
            return Err(ExportError::NothingToExport);
        }
        if images.iter().all(|img| img.boxes.is_empty()) {
            return Err(ExportError::NoAnnotations);
        }

        let annotations_by_image = images
            .iter()
            .map(|img| ImageAnnotations {
                image_filename: img.filename.clone(),
                image_width: img.width,
                image_height: img.height,
                boxes: img
                    .boxes
                    .iter()
                    .map(|b| {
                        let r = b.rect.to_original(img.scale_ratio);
                        ExportedBox {
                            x_min: r.x_min,
                            y_min: r.y_min,
                            x_max: r.x_max,
                            y_max: r.y_max,
                            label: b.label.clone(),
                        }
                    })
                    .collect(),
            })
            .collect();

        Ok(Self {
            labels: labels.as_slice().to_vec(),
            annotations_by_image,
        })
    }

    pub fn summary(&self) -> ExportSummary {
        ExportSummary {
            images_exported: self.annotations_by_image.len(),
            annotations_exported: self.annotations_by_image.iter().map(|i| i.boxes.len()).sum(),
            annotations_skipped: 0,
        }
    }

    pub fn to_json_string(&self) -> Result<String, ExportError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn save(&self, path: &Path) -> Result<(), ExportError> {
        let json = self.to_json_string()?;
        fs::write(path, json).map_err(|source| ExportError::Write {
            path: path.display().to_string(),
            source,
        })?;
        info!(path = %path.display(), "wrote annotation JSON");
        Ok(())
    }
}
