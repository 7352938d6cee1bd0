//! Design canvas engine
pub mod geometry;
pub mod canvas;
pub mod draft;

pub use canvas::{DesignCanvas, DesignPlacement, Gesture, Hit, PointerEvent, ScaleStep};
pub use draft::{DesignDraft, DraftSummary};
pub use geometry::{BoundaryBox, Point, Size};
