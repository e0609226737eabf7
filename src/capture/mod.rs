//! Capture Boundary
//!
//! Types describing what the camera and OCR collaborators hand to the scanner.
//! Capture itself, rectangle tracking and text recognition happen outside this
//! crate; only their outputs cross this boundary.

pub mod frame;
pub mod region;

pub use frame::{ObservedFrame, TextObservation};
pub use region::{CardRegion, Rect};
