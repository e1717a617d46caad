//! Rendering subsystem.
//!
//! [`protocol`] defines the messages exchanged with the fetch worker, [`service`] holds the
//! poll loop state machine, and [`ui`] turns the view state into terminal frames.

pub mod protocol;
pub mod service;
pub mod ui;

pub use service::{IngestStats, LoopControl, LoopPhase, RenderLoopState};
