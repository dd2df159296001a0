// YOLO text export: one `<class> <cx> <cy> <w> <h>` line per box, one file
// per image, all values relative to the original image size.

use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{info, warn};

use super::{ExportError, ExportSummary};
use crate::geometry::NormalizedBox;
use crate::labels::LabelSet;
use crate::state::ImageRecord;
use crate::utils::file_stem;

#[derive(Debug, Clone, PartialEq)]
pub struct YoloFile {
    /// `<image stem>.txt`
    pub file_name: String,
    pub image_filename: String,
    pub lines: Vec<String>,
}

impl YoloFile {
    pub fn contents(&self) -> String {
        self.lines.join("\n")
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct YoloExport {
    pub files: Vec<YoloFile>,
    pub exported: usize,
    /// Boxes left out because their label has no class index or their
    /// geometry did not normalize to finite values.
    pub skipped: usize,
}

pub fn format_line(class_index: usize, b: &NormalizedBox) -> String {
    format!(
        "{class_index} {:.6} {:.6} {:.6} {:.6}",
        b.x_center, b.y_center, b.width, b.height
    )
}

impl YoloExport {
    /// Builds label files for every image that has at least one exportable
    /// box. Skipped boxes are counted, never fatal.
    pub fn build(images: &[ImageRecord], labels: &LabelSet) -> Result<Self, ExportError> {
        if images.is_empty() {
            return Err(ExportError::NothingToExport);
        }
        if images.iter().all(|img| img.boxes.is_empty()) {
            return Err(ExportError::NoAnnotations);
        }

        let class_ids = labels.index_map();
        let mut used_names = HashSet::new();
        let mut export = YoloExport::default();

        for img in images {
            let mut lines = Vec::new();
            for (idx, b) in img.boxes.iter().enumerate() {
                let Some(&class_index) = class_ids.get(b.label.as_str()) else {
                    warn!(
                        image = %img.filename,
                        box_index = idx,
                        label = %b.label,
                        "skipping box with unknown label"
                    );
                    export.skipped += 1;
                    continue;
                };

                let original = b.rect.to_original(img.scale_ratio);
                let Some(normalized) = original.to_normalized(img.width, img.height) else {
                    warn!(
                        image = %img.filename,
                        box_index = idx,
                        width = img.width,
                        height = img.height,
                        "skipping box with non-finite normalized geometry"
                    );
                    export.skipped += 1;
                    continue;
                };

                lines.push(format_line(class_index, &normalized));
            }

            if lines.is_empty() {
                continue;
            }

            export.exported += lines.len();
            export.files.push(YoloFile {
                file_name: unique_file_name(&img.filename, &mut used_names),
                image_filename: img.filename.clone(),
                lines,
            });
        }

        Ok(export)
    }

    pub fn summary(&self) -> ExportSummary {
        ExportSummary {
            images_exported: self.files.len(),
            annotations_exported: self.exported,
            annotations_skipped: self.skipped,
        }
    }

    /// Writes every file into `dir`, creating it if needed.
    pub fn save_all(&self, dir: &Path) -> Result<Vec<PathBuf>, ExportError> {
        fs::create_dir_all(dir).map_err(|source| ExportError::Write {
            path: dir.display().to_string(),
            source,
        })?;

        let mut written = Vec::with_capacity(self.files.len());
        for file in &self.files {
            let path = dir.join(&file.file_name);
            fs::write(&path, file.contents()).map_err(|source| ExportError::Write {
                path: path.display().to_string(),
                source,
            })?;
            written.push(path);
        }

        info!(
            files = written.len(),
            skipped = self.skipped,
            dir = %dir.display(),
            "wrote YOLO labels"
        );
        Ok(written)
    }
}

/// `<stem>.txt`, with `_2`, `_3`... appended when two images share a stem.
fn unique_file_name(image_filename: &str, used: &mut HashSet<String>) -> String {
    let stem = file_stem(image_filename);
    let mut candidate = format!("{stem}.txt");
    let mut n = 2;
    while !used.insert(candidate.clone()) {
        candidate = format!("{stem}_{n}.txt");
        n += 1;
    }
    candidate
}
