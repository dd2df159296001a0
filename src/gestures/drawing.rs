//! Drawing a new box by dragging.

use crate::geometry::{DisplayPoint, DisplayRect};

/// Rectangle shown while the pointer is still down.
pub fn preview_rect(anchor: DisplayPoint, current: DisplayPoint) -> DisplayRect {
    DisplayRect::from_corners(anchor, current)
}

/// Final rectangle for a drag from `anchor` to `end`, or `None` when either
/// side is shorter than `min_size`. A side exactly `min_size` long is kept.
pub fn finish_draw(anchor: DisplayPoint, end: DisplayPoint, min_size: f32) -> Option<DisplayRect> {
    let rect = DisplayRect::from_corners(anchor, end);
    if rect.width < min_size || rect.height < min_size {
        return None;
    }
    Some(rect)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reverse_drag_at_minimum_is_kept() {
        let rect = finish_draw(
            DisplayPoint::new(10.0, 10.0),
            DisplayPoint::new(5.0, 5.0),
            5.0,
        );
        assert_eq!(rect, Some(DisplayRect::new(5.0, 5.0, 5.0, 5.0)));
    }

    #[test]
    fn thin_drag_is_dropped() {
        let rect = finish_draw(
            DisplayPoint::new(100.0, 100.0),
            DisplayPoint::new(103.0, 120.0),
            5.0,
        );
        assert_eq!(rect, None);
    }

    #[test]
    fn preview_follows_pointer_in_any_quadrant() {
        let anchor = DisplayPoint::new(50.0, 50.0);
        assert_eq!(
            preview_rect(anchor, DisplayPoint::new(20.0, 80.0)),
            DisplayRect::new(20.0, 50.0, 30.0, 30.0)
        );
        assert_eq!(
            preview_rect(anchor, DisplayPoint::new(80.0, 20.0)),
            DisplayRect::new(50.0, 20.0, 30.0, 30.0)
        );
    }
}
