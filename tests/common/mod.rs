// Helper functions for building test scenarios
#![allow(dead_code)]

use box_annotator::{
    AnnotationEngine, DecodeFailure, DecodedImage, DisplayPoint, EngineSettings, GestureOutcome,
};

pub fn decoded(filename: &str, width: u32, height: u32) -> DecodedImage {
    DecodedImage {
        source: format!("/images/{filename}"),
        filename: filename.to_string(),
        width,
        height,
    }
}

pub fn p(x: f32, y: f32) -> DisplayPoint {
    DisplayPoint::new(x, y)
}

/// Engine with a single 1000x500 image (displayed at 640x320).
pub fn create_wide_scene() -> AnnotationEngine {
    create_scene(&[("wide.jpg", 1000, 500)])
}

pub fn create_scene(images: &[(&str, u32, u32)]) -> AnnotationEngine {
    let mut engine = AnnotationEngine::new(EngineSettings::default());
    let batch: Vec<Result<DecodedImage, DecodeFailure>> = images
        .iter()
        .map(|&(name, w, h)| Ok(decoded(name, w, h)))
        .collect();
    engine.install_batch(batch).unwrap();
    engine
}

/// Full draw gesture: down, one move, up.
pub fn drag(engine: &mut AnnotationEngine, from: DisplayPoint, to: DisplayPoint) -> GestureOutcome {
    engine.pointer_down(from);
    engine.pointer_move(to);
    engine.pointer_up(to)
}

/// Tiny deterministic generator so property-style loops stay reproducible.
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Self(seed)
    }

    pub fn next_f32(&mut self, max: f32) -> f32 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        ((self.0 >> 33) as f32 / (1u64 << 31) as f32) * max
    }

    pub fn next_u32(&mut self, lo: u32, hi: u32) -> u32 {
        lo + (self.next_f32((hi - lo) as f32) as u32).min(hi - lo - 1)
    }
}
