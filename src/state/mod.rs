//! State management for the annotation engine.
//!
//! This module contains:
//! - Image, box, tool and gesture types
//! - The engine owning the working set and the gesture state machine
//! - Session files for saving and restoring the working set

mod types;
mod engine;
pub mod session;

pub use types::*;
pub use engine::*;
pub use session::{load_session, save_session, Session, SessionError};
