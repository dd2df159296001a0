//! Corner resizing.
//!
//! While the pointer is down the opposite corner stays fixed and the box may
//! turn inside out (negative width/height). [`finish_resize`] turns it back
//! into a well-formed rectangle when the gesture ends.

use crate::geometry::{Corner, DisplayPoint, DisplayRect};

/// Moves `corner` of `rect` to `pointer`, keeping the opposite corner fixed.
pub fn resize_from_corner(rect: DisplayRect, corner: Corner, pointer: DisplayPoint) -> DisplayRect {
    let right = rect.x + rect.width;
    let bottom = rect.y + rect.height;
    let (px, py) = (pointer.x, pointer.y);

    match corner {
        Corner::TopLeft => DisplayRect::new(px, py, right - px, bottom - py),
        Corner::TopRight => DisplayRect::new(rect.x, py, px - rect.x, bottom - py),
        Corner::BottomLeft => DisplayRect::new(px, rect.y, right - px, py - rect.y),
        Corner::BottomRight => DisplayRect::new(rect.x, rect.y, px - rect.x, py - rect.y),
    }
}

/// Normalizes negative extents, then grows each side to at least `min_size`.
pub fn finish_resize(rect: DisplayRect, min_size: f32) -> DisplayRect {
    rect.normalized().with_min_size(min_size)
}
