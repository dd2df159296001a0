//! Reading image files from disk into [`DecodedImage`]s for the engine.
//!
//! Only the header is decoded; the engine needs dimensions, not pixels.

use std::io;
use std::path::{Path, PathBuf};
use tracing::warn;

use crate::state::{DecodeFailure, DecodedImage};
use crate::utils::is_image_path;

/// Expand folders into their image files (sorted by name) and keep image
/// files as given. Anything else is skipped with a warning.
pub fn collect_images(inputs: &[PathBuf]) -> io::Result<Vec<PathBuf>> {
    let mut files = Vec::new();
    for input in inputs {
        if input.is_dir() {
            let mut found = Vec::new();
            for entry in std::fs::read_dir(input)? {
                let path = entry?.path();
                if path.is_file() && is_image_path(&path) {
                    found.push(path);
                }
            }
            found.sort();
            files.extend(found);
        } else if is_image_path(input) {
            files.push(input.clone());
        } else {
            warn!("Ignoring non-image file {}", input.display());
        }
    }
    Ok(files)
}

pub fn decode_file(path: &Path) -> Result<DecodedImage, DecodeFailure> {
    let filename = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| path.display().to_string());

    let (width, height) =
        image::image_dimensions(path).map_err(|e| DecodeFailure::new(filename.clone(), e))?;

    Ok(DecodedImage {
        source: path.display().to_string(),
        filename,
        width,
        height,
    })
}

/// Decode every file, keeping each outcome so the engine can decide whether
/// the batch is usable.
pub fn decode_all(paths: &[PathBuf]) -> Vec<Result<DecodedImage, DecodeFailure>> {
    paths.iter().map(|p| decode_file(p)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn write_png(path: &Path, width: u32, height: u32) {
        image::RgbImage::new(width, height).save(path).unwrap();
    }

    #[test]
    fn collects_sorted_images_from_folders() {
        let dir = tempfile::tempdir().unwrap();
        write_png(&dir.path().join("b.png"), 4, 4);
        write_png(&dir.path().join("a.png"), 4, 4);
        std::fs::write(dir.path().join("notes.txt"), "hi").unwrap();

        let files = collect_images(&[dir.path().to_path_buf()]).unwrap();
        let names: Vec<_> = files
            .iter()
            .map(|f| f.file_name().unwrap().to_str().unwrap())
            .collect();
        assert_eq!(names, ["a.png", "b.png"]);
    }

    #[test]
    fn skips_explicit_non_images() {
        let dir = tempfile::tempdir().unwrap();
        let txt = dir.path().join("readme.md");
        std::fs::write(&txt, "x").unwrap();
        assert!(collect_images(&[txt]).unwrap().is_empty());
    }

    #[test]
    fn decodes_dimensions() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.png");
        write_png(&path, 1000, 500);

        let decoded = decode_file(&path).unwrap();
        assert_eq!(decoded.filename, "wide.png");
        assert_eq!((decoded.width, decoded.height), (1000, 500));
    }

    #[test]
    fn corrupt_file_is_a_decode_failure() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("broken.png");
        std::fs::write(&path, b"not really a png").unwrap();

        let failure = decode_file(&path).unwrap_err();
        assert_eq!(failure.filename, "broken.png");
        assert!(!failure.reason.is_empty());
    }
}
