//! Interactive region selection, driven by discrete events.

pub mod editor;
pub mod polygon;

pub use editor::{EditSession, SessionError, SessionEvent, SessionOutcome, SessionState};
pub use polygon::{Point, Polygon};
