//! Session files: the whole working set (labels, images, boxes) as JSON so
//! work can be resumed later.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;
use tracing::{info, warn};

use super::engine::AnnotationEngine;
use super::types::{EngineSettings, Gesture, ImageRecord, Tool, UNLABELED};
use crate::geometry::ScaleRatio;
use crate::labels::{Label, LabelError, LabelSet};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("failed to read session {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to write session {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
    #[error("invalid session JSON: {0}")]
    Json(#[from] serde_json::Error),
    #[error("invalid label in session: {0}")]
    Label(#[from] LabelError),
    #[error("image {filename} has an invalid scale ratio {ratio}")]
    InvalidScale { filename: String, ratio: f32 },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    #[serde(default)]
    pub labels: Vec<Label>,
    #[serde(default)]
    pub images: Vec<ImageRecord>,
    #[serde(default)]
    pub active_index: usize,
}

impl AnnotationEngine {
    pub fn to_session(&self) -> Session {
        Session {
            labels: self.labels.as_slice().to_vec(),
            images: self.images.clone(),
            active_index: self.active_index,
        }
    }

    /// Rebuilds an engine from a session. Stored scale ratios are kept as
    /// they are; boxes are normalized and labels that no longer exist become
    /// [`UNLABELED`].
    pub fn from_session(session: Session, settings: EngineSettings) -> Result<Self, SessionError> {
        let mut labels = LabelSet::new();
        for label in &session.labels {
            labels.add(&label.name, Some(&label.color))?;
        }

        let mut images = session.images;
        let mut orphaned = 0;
        for img in &mut images {
            if ScaleRatio::from_raw(img.scale_ratio.get()).is_none() {
                return Err(SessionError::InvalidScale {
                    filename: img.filename.clone(),
                    ratio: img.scale_ratio.get(),
                });
            }
            for b in &mut img.boxes {
                b.rect = b.rect.normalized();
                if b.label != UNLABELED && !labels.contains(&b.label) {
                    b.label = UNLABELED.to_string();
                    orphaned += 1;
                }
            }
        }
        if orphaned > 0 {
            warn!(orphaned, "boxes referenced unknown labels and were reset");
        }

        let active_index = if session.active_index < images.len() {
            session.active_index
        } else {
            0
        };

        Ok(Self {
            settings,
            images,
            active_index,
            labels,
            tool: Tool::default(),
            gesture: Gesture::Idle,
        })
    }
}

pub fn save_session(engine: &AnnotationEngine, path: &Path) -> Result<(), SessionError> {
    let json = serde_json::to_string_pretty(&engine.to_session())?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|source| SessionError::Write {
            path: parent.display().to_string(),
            source,
        })?;
    }
    fs::write(path, json).map_err(|source| SessionError::Write {
        path: path.display().to_string(),
        source,
    })?;
    info!(path = %path.display(), images = engine.images().len(), "session saved");
    Ok(())
}

pub fn load_session(path: &Path, settings: EngineSettings) -> Result<AnnotationEngine, SessionError> {
    let content = fs::read_to_string(path).map_err(|source| SessionError::Read {
        path: path.display().to_string(),
        source,
    })?;
    let session: Session = serde_json::from_str(&content)?;
    AnnotationEngine::from_session(session, settings)
}
