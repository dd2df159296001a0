use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tracing::{debug, warn};

use crate::state::UNLABELED;
use crate::utils::parse_color;

/// Colors handed out to labels added without one, in order.
pub const PALETTE: [&str; 10] = [
    "#ff0000", "#00ff00", "#0000ff", "#ffff00", "#ff00ff", "#00ffff", "#ff8000", "#8000ff",
    "#0080ff", "#80ff00",
];

#[derive(Debug, Error)]
pub enum LabelError {
    #[error("label name is empty")]
    EmptyName,
    #[error("\"{0}\" is reserved for boxes without a label")]
    Reserved(String),
    #[error("label \"{0}\" already exists")]
    Duplicate(String),
    #[error("label \"{0}\" does not exist")]
    NotFound(String),
    #[error("invalid color \"{0}\", expected #rrggbb")]
    InvalidColor(String),
    #[error("failed to read label file {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to write label file {path}: {source}")]
    Write {
        path: String,
        source: std::io::Error,
    },
    #[error("yaml error in label file: {0}")]
    Yaml(#[from] serde_yaml::Error),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Label {
    pub name: String,
    pub color: String,
}

/// Label entry as written in a label file; color is optional there.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LabelDefinition {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LabelFile {
    pub labels: Vec<LabelDefinition>,
}

/// Ordered, name-unique set of labels shared by every image.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LabelSet {
    labels: Vec<Label>,
    /// Number of labels ever added; drives the palette so colors don't
    /// repeat right after a deletion.
    added: usize,
}

impl LabelSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_definitions(defs: &[LabelDefinition]) -> Result<Self, LabelError> {
        let mut set = Self::new();
        for def in defs {
            set.add(&def.name, def.color.as_deref())?;
        }
        Ok(set)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Label> {
        self.labels.iter()
    }

    pub fn as_slice(&self) -> &[Label] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.labels.iter().any(|l| l.name == name)
    }

    pub fn get(&self, name: &str) -> Option<&Label> {
        self.labels.iter().find(|l| l.name == name)
    }

    /// Name new boxes get: the first label, or [`UNLABELED`].
    pub fn default_name(&self) -> &str {
        self.labels
            .first()
            .map(|l| l.name.as_str())
            .unwrap_or(UNLABELED)
    }

    /// Appends a label. The name is trimmed; a missing color is taken from
    /// [`PALETTE`].
    pub fn add(&mut self, name: &str, color: Option<&str>) -> Result<&Label, LabelError> {
        let name = name.trim();
        if name.is_empty() {
            return Err(LabelError::EmptyName);
        }
        if name == UNLABELED {
            return Err(LabelError::Reserved(name.to_string()));
        }
        if self.contains(name) {
            return Err(LabelError::Duplicate(name.to_string()));
        }

        let color = match color {
            Some(hex) => {
                if parse_color(hex).is_none() {
                    return Err(LabelError::InvalidColor(hex.to_string()));
                }
                hex.to_lowercase()
            }
            None => PALETTE[self.added % PALETTE.len()].to_string(),
        };

        debug!(name, color = %color, "label added");
        self.added += 1;
        self.labels.push(Label {
            name: name.to_string(),
            color,
        });
        Ok(&self.labels[self.labels.len() - 1])
    }

    pub fn remove(&mut self, name: &str) -> Result<Label, LabelError> {
        let idx = self
            .labels
            .iter()
            .position(|l| l.name == name)
            .ok_or_else(|| LabelError::NotFound(name.to_string()))?;
        Ok(self.labels.remove(idx))
    }

    /// Label name to class index, in current label order.
    pub fn index_map(&self) -> HashMap<&str, usize> {
        self.labels
            .iter()
            .enumerate()
            .map(|(idx, l)| (l.name.as_str(), idx))
            .collect()
    }

    pub fn to_definitions(&self) -> Vec<LabelDefinition> {
        self.labels
            .iter()
            .map(|l| LabelDefinition {
                name: l.name.clone(),
                color: Some(l.color.clone()),
            })
            .collect()
    }
}

/// Parse label YAML, accepting either a bare list or a `labels:` mapping.
pub fn parse_label_content(content: &str) -> Result<Vec<LabelDefinition>, LabelError> {
    if let Ok(list) = serde_yaml::from_str::<Vec<LabelDefinition>>(content) {
        return Ok(list);
    }
    let file: LabelFile = serde_yaml::from_str(content)?;
    Ok(file.labels)
}

/// Load label definitions from a YAML file. `~` is expanded.
pub fn load_label_file(path: &str) -> Result<LabelSet, LabelError> {
    let expanded = shellexpand::tilde(path);
    let content =
        std::fs::read_to_string(expanded.as_ref()).map_err(|source| LabelError::Read {
            path: expanded.to_string(),
            source,
        })?;

    let defs = parse_label_content(&content)?;
    LabelSet::from_definitions(&defs)
}

/// Try the configured label file, then `./labels.yaml`; fall back to an
/// empty set.
pub fn load_labels(path: Option<&str>) -> LabelSet {
    let mut search_paths: Vec<&str> = Vec::new();
    if let Some(p) = path {
        search_paths.push(p);
    }
    search_paths.push("./labels.yaml");

    for candidate in search_paths {
        let expanded = shellexpand::tilde(candidate);
        if !Path::new(expanded.as_ref()).exists() {
            continue;
        }
        match load_label_file(candidate) {
            Ok(set) => return set,
            Err(e) => warn!("Failed to parse label file '{}': {}", expanded, e),
        }
    }

    LabelSet::new()
}

pub fn save_label_file(labels: &LabelSet, path: &str) -> Result<(), LabelError> {
    let expanded = shellexpand::tilde(path);
    let target = Path::new(expanded.as_ref());

    if let Some(parent) = target.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(|source| LabelError::Write {
            path: parent.display().to_string(),
            source,
        })?;
    }

    let yaml = serde_yaml::to_string(&LabelFile {
        labels: labels.to_definitions(),
    })?;
    std::fs::write(target, yaml).map_err(|source| LabelError::Write {
        path: target.display().to_string(),
        source,
    })
}
