use crate::geometry::{Corner, DisplayPoint};
use crate::state::{BoxAnnotation, HandleHit};

/// Finds the corner handle under `point`.
///
/// The most recently added box wins on overlap; within a box corners are
/// checked in [`Corner::ALL`] order. Each handle is a square of half-side
/// `handle_size` centred on the corner.
pub fn hit_test_handles(
    boxes: &[BoxAnnotation],
    point: DisplayPoint,
    handle_size: f32,
) -> Option<HandleHit> {
    boxes.iter().enumerate().rev().find_map(|(box_index, ann)| {
        Corner::ALL.into_iter().find_map(|corner| {
            let handle = ann.rect.corner(corner);
            let inside = (point.x - handle.x).abs() <= handle_size
                && (point.y - handle.y).abs() <= handle_size;
            inside.then_some(HandleHit { box_index, corner })
        })
    })
}
