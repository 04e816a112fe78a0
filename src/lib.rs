//! annot-rs: chart annotation engine for time-series price data.
//!
//! This crate provides the artifact data model, the scene/domain coordinate
//! transforms, and the interactive tool state machine used to place and edit
//! annotations on a price chart. Rendering stays outside the crate by
//! design: hosts consume positions, label strings, and bounding rectangles.

pub mod api;
pub mod artifacts;
pub mod core;
pub mod error;
pub mod interaction;
pub mod telemetry;

pub use api::{AnnotationEngine, AnnotationEngineConfig};
pub use error::{AnnotError, AnnotResult};
