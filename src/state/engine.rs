//! The annotation engine: images, labels, active tool and the pointer
//! gesture state machine.
//!
//! The engine is driven by one caller. Each pointer event or command runs to
//! completion and returns what changed; rendering and file I/O stay with the
//! caller.

use thiserror::Error;
use tracing::{debug, info};

use crate::export::{AnnotationExport, ExportError, YoloExport};
use crate::geometry::{DisplayPoint, DisplayRect, GeometryError, ScaleRatio};
use crate::gestures::drawing::preview_rect;
use crate::gestures::{finish_draw, finish_resize, hit_test_handles, resize_from_corner};
use crate::labels::{Label, LabelError, LabelSet};
use crate::state::types::{
    BoxAnnotation, DecodeFailure, DecodedImage, EngineSettings, Gesture, GestureOutcome,
    HandleHit, ImageRecord, Tool, UNLABELED,
};

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("{} of {total} image(s) failed to load", .failures.len())]
    BatchDecode {
        total: usize,
        failures: Vec<DecodeFailure>,
    },
    #[error("no images in batch")]
    EmptyBatch,
    #[error("image index {0} out of range")]
    ImageOutOfRange(usize),
    #[error("box index {0} out of range")]
    BoxOutOfRange(usize),
    #[error("no active image")]
    NoActiveImage,
    #[error(transparent)]
    Geometry(#[from] GeometryError),
    #[error(transparent)]
    Label(#[from] LabelError),
}

pub type EngineResult<T> = Result<T, EngineError>;

#[derive(Debug, Clone)]
pub struct AnnotationEngine {
    pub(super) settings: EngineSettings,
    pub(super) images: Vec<ImageRecord>,
    pub(super) active_index: usize,
    pub(super) labels: LabelSet,
    pub(super) tool: Tool,
    pub(super) gesture: Gesture,
}

impl Default for AnnotationEngine {
    fn default() -> Self {
        Self::new(EngineSettings::default())
    }
}

impl AnnotationEngine {
    pub fn new(settings: EngineSettings) -> Self {
        Self::with_labels(settings, LabelSet::new())
    }

    pub fn with_labels(settings: EngineSettings, labels: LabelSet) -> Self {
        Self {
            settings,
            images: Vec::new(),
            active_index: 0,
            labels,
            tool: Tool::default(),
            gesture: Gesture::Idle,
        }
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    // ------------------------------------------------------------------
    // Images
    // ------------------------------------------------------------------

    fn make_record(&self, decoded: DecodedImage) -> Result<ImageRecord, GeometryError> {
        let scale_ratio = ScaleRatio::fit(
            decoded.width,
            decoded.height,
            self.settings.max_display_width,
            self.settings.max_display_height,
        )?;
        Ok(ImageRecord {
            source: decoded.source,
            filename: decoded.filename,
            width: decoded.width,
            height: decoded.height,
            scale_ratio,
            boxes: Vec::new(),
        })
    }

    /// Replaces the whole working set with a freshly loaded batch.
    ///
    /// All or nothing: if any entry failed to decode (or has zero size) the
    /// current images are left untouched and every failure is reported.
    pub fn install_batch<I>(&mut self, results: I) -> EngineResult<usize>
    where
        I: IntoIterator<Item = Result<DecodedImage, DecodeFailure>>,
    {
        let mut records = Vec::new();
        let mut failures = Vec::new();
        let mut total = 0;

        for result in results {
            total += 1;
            match result {
                Ok(decoded) => {
                    let filename = decoded.filename.clone();
                    match self.make_record(decoded) {
                        Ok(record) => records.push(record),
                        Err(e) => failures.push(DecodeFailure::new(filename, e)),
                    }
                }
                Err(failure) => failures.push(failure),
            }
        }

        if total == 0 {
            return Err(EngineError::EmptyBatch);
        }
        if !failures.is_empty() {
            return Err(EngineError::BatchDecode { total, failures });
        }

        self.gesture = Gesture::Idle;
        self.images = records;
        self.active_index = 0;
        info!(images = total, "installed image batch");
        Ok(total)
    }

    /// Appends one image to the working set without touching the others.
    pub fn add_image(&mut self, decoded: DecodedImage) -> EngineResult<usize> {
        let record = self.make_record(decoded)?;
        self.images.push(record);
        Ok(self.images.len() - 1)
    }

    pub fn remove_image(&mut self, index: usize) -> EngineResult<ImageRecord> {
        if index >= self.images.len() {
            return Err(EngineError::ImageOutOfRange(index));
        }
        self.abandon_gesture();
        let removed = self.images.remove(index);

        if self.active_index > index || self.active_index >= self.images.len() {
            self.active_index = self.active_index.saturating_sub(1);
        }
        Ok(removed)
    }

    pub fn set_active_image(&mut self, index: usize) -> EngineResult<()> {
        if index >= self.images.len() {
            return Err(EngineError::ImageOutOfRange(index));
        }
        if index != self.active_index {
            self.abandon_gesture();
            self.active_index = index;
        }
        Ok(())
    }

    pub fn images(&self) -> &[ImageRecord] {
        &self.images
    }

    pub fn active_index(&self) -> Option<usize> {
        (self.active_index < self.images.len()).then_some(self.active_index)
    }

    pub fn active_image(&self) -> Option<&ImageRecord> {
        self.images.get(self.active_index)
    }

    fn active_image_mut(&mut self) -> Option<&mut ImageRecord> {
        self.images.get_mut(self.active_index)
    }

    /// Boxes of the active image, empty when nothing is loaded.
    pub fn boxes(&self) -> &[BoxAnnotation] {
        self.active_image()
            .map(|img| img.boxes.as_slice())
            .unwrap_or(&[])
    }

    // ------------------------------------------------------------------
    // Tool and gestures
    // ------------------------------------------------------------------

    pub fn tool(&self) -> Tool {
        self.tool
    }

    pub fn set_tool(&mut self, tool: Tool) {
        if tool != self.tool {
            self.abandon_gesture();
            self.tool = tool;
        }
    }

    pub fn gesture(&self) -> Gesture {
        self.gesture
    }

    /// Rectangle to draw while a new box is being dragged out.
    pub fn preview(&self) -> Option<DisplayRect> {
        match self.gesture {
            Gesture::Drawing { anchor, current } => Some(preview_rect(anchor, current)),
            _ => None,
        }
    }

    pub fn hit_test(&self, point: DisplayPoint) -> Option<HandleHit> {
        hit_test_handles(self.boxes(), point, self.settings.handle_size)
    }

    pub fn pointer_down(&mut self, point: DisplayPoint) -> GestureOutcome {
        if self.active_image().is_none() || !self.gesture.is_idle() {
            return GestureOutcome::Ignored;
        }

        match self.tool {
            Tool::Draw => {
                self.gesture = Gesture::Drawing {
                    anchor: point,
                    current: point,
                };
                debug!(x = point.x, y = point.y, "draw started");
                GestureOutcome::DrawStarted
            }
            Tool::Edit => match self.hit_test(point) {
                Some(hit) => {
                    self.gesture = Gesture::Resizing {
                        box_index: hit.box_index,
                        corner: hit.corner,
                        anchor: point,
                    };
                    debug!(box_index = hit.box_index, corner = ?hit.corner, "resize started");
                    GestureOutcome::ResizeStarted(hit)
                }
                None => GestureOutcome::Ignored,
            },
        }
    }

    pub fn pointer_move(&mut self, point: DisplayPoint) -> GestureOutcome {
        match self.gesture {
            Gesture::Idle => GestureOutcome::Ignored,
            Gesture::Drawing { anchor, .. } => {
                self.gesture = Gesture::Drawing {
                    anchor,
                    current: point,
                };
                GestureOutcome::Updated
            }
            Gesture::Resizing {
                box_index, corner, ..
            } => match self.box_mut(box_index) {
                Some(b) => {
                    b.rect = resize_from_corner(b.rect, corner, point);
                    GestureOutcome::Updated
                }
                None => {
                    self.gesture = Gesture::Idle;
                    GestureOutcome::Ignored
                }
            },
        }
    }

    pub fn pointer_up(&mut self, point: DisplayPoint) -> GestureOutcome {
        match self.gesture {
            Gesture::Idle => GestureOutcome::Ignored,
            Gesture::Drawing { anchor, .. } => {
                self.gesture = Gesture::Idle;
                self.finish_drawing(anchor, point)
            }
            Gesture::Resizing { .. } => {
                self.pointer_move(point);
                self.end_resize()
            }
        }
    }

    /// Pointer left the canvas: a draw is cancelled, a resize is finished
    /// where it stands.
    pub fn pointer_leave(&mut self) -> GestureOutcome {
        match self.gesture {
            Gesture::Idle => GestureOutcome::Ignored,
            Gesture::Drawing { .. } => {
                self.gesture = Gesture::Idle;
                debug!("draw cancelled, pointer left canvas");
                GestureOutcome::Cancelled
            }
            Gesture::Resizing { .. } => self.end_resize(),
        }
    }

    /// Back to idle without leaving a box inside out.
    fn abandon_gesture(&mut self) {
        if !self.gesture.is_idle() {
            self.pointer_leave();
        }
    }

    fn finish_drawing(&mut self, anchor: DisplayPoint, end: DisplayPoint) -> GestureOutcome {
        let min_size = self.settings.min_box_size;
        let Some(rect) = finish_draw(anchor, end, min_size) else {
            debug!(min_size, "draw discarded, box too small");
            return GestureOutcome::Discarded;
        };

        let label = self.labels.default_name().to_string();
        let Some(img) = self.active_image_mut() else {
            return GestureOutcome::Ignored;
        };
        img.boxes.push(BoxAnnotation::new(rect, label));
        let index = img.boxes.len() - 1;
        debug!(index, ?rect, "box created");
        GestureOutcome::Created(index)
    }

    fn end_resize(&mut self) -> GestureOutcome {
        let Gesture::Resizing { box_index, .. } = self.gesture else {
            return GestureOutcome::Ignored;
        };
        self.gesture = Gesture::Idle;

        let min_size = self.settings.min_box_size;
        match self.box_mut(box_index) {
            Some(b) => {
                b.rect = finish_resize(b.rect, min_size);
                debug!(box_index, rect = ?b.rect, "resize finished");
                GestureOutcome::Resized(box_index)
            }
            None => GestureOutcome::Ignored,
        }
    }

    fn box_mut(&mut self, index: usize) -> Option<&mut BoxAnnotation> {
        self.active_image_mut()
            .and_then(|img| img.boxes.get_mut(index))
    }

    // ------------------------------------------------------------------
    // Boxes
    // ------------------------------------------------------------------

    /// Removes a box from the active image.
    pub fn delete_box(&mut self, index: usize) -> EngineResult<BoxAnnotation> {
        self.abandon_gesture();
        let img = self.active_image_mut().ok_or(EngineError::NoActiveImage)?;
        if index >= img.boxes.len() {
            return Err(EngineError::BoxOutOfRange(index));
        }
        Ok(img.boxes.remove(index))
    }

    /// Assigns `label` (an existing label or [`UNLABELED`]) to a box of the
    /// active image.
    pub fn set_box_label(&mut self, index: usize, label: &str) -> EngineResult<()> {
        if label != UNLABELED && !self.labels.contains(label) {
            return Err(LabelError::NotFound(label.to_string()).into());
        }
        let b = self.box_mut(index).ok_or(EngineError::BoxOutOfRange(index))?;
        b.label = label.to_string();
        Ok(())
    }

    // ------------------------------------------------------------------
    // Labels
    // ------------------------------------------------------------------

    pub fn labels(&self) -> &LabelSet {
        &self.labels
    }

    /// Adds a label. When it is the first one, every unlabeled box in every
    /// image takes it.
    pub fn add_label(&mut self, name: &str, color: Option<&str>) -> EngineResult<Label> {
        let was_empty = self.labels.is_empty();
        let label = self.labels.add(name, color)?.clone();

        if was_empty {
            let adopted = self.relabel_all(UNLABELED, &label.name);
            if adopted > 0 {
                debug!(label = %label.name, adopted, "unlabeled boxes adopted first label");
            }
        }
        Ok(label)
    }

    /// Deletes a label and moves its boxes to the new first label, or to
    /// [`UNLABELED`] when none are left. Returns how many boxes moved.
    pub fn delete_label(&mut self, name: &str) -> EngineResult<usize> {
        let removed = self.labels.remove(name)?;
        let replacement = self.labels.default_name().to_string();
        let moved = self.relabel_all(&removed.name, &replacement);
        info!(label = %removed.name, %replacement, moved, "label deleted");
        Ok(moved)
    }

    fn relabel_all(&mut self, from: &str, to: &str) -> usize {
        let mut count = 0;
        for b in self.images.iter_mut().flat_map(|img| img.boxes.iter_mut()) {
            if b.label == from {
                b.label = to.to_string();
                count += 1;
            }
        }
        count
    }

    // ------------------------------------------------------------------
    // Export
    // ------------------------------------------------------------------

    pub fn export_json(&self) -> Result<AnnotationExport, ExportError> {
        AnnotationExport::build(&self.images, &self.labels)
    }

    pub fn export_yolo(&self) -> Result<YoloExport, ExportError> {
        YoloExport::build(&self.images, &self.labels)
    }
}
