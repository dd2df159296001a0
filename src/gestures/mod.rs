//! Pointer gesture math, independent of the engine that owns the state.
//!
//! - `drawing` - new box from a drag between two points
//! - `handles` - corner handle hit-testing
//! - `resize` - per-corner resize and end-of-gesture normalization

pub mod drawing;
pub mod handles;
pub mod resize;

pub use drawing::finish_draw;
pub use handles::hit_test_handles;
pub use resize::{finish_resize, resize_from_corner};
