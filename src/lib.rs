//! # lttview - Live Terminal Event Viewer
//!
//! A terminal viewer for structured trace event streams. Records arrive continuously from a
//! pipe, file or child process, are decoded into titled list items, and can be narrowed with
//! an incremental fuzzy filter while new events keep appending.
//!
//! ## Architecture
//!
//! - [`source`] - Event sources: stdin, files and child processes, framed into raw records
//! - [`fetch`] - Blocking worker that owns the source and answers poll requests
//! - [`decode`] - Raw record to display item conversion
//! - [`list`] - Append-only item store with filtering, pagination and selection
//! - [`input`] - Key and mouse input mapped to viewer actions
//! - [`render`] - Poll loop state machine and terminal rendering
//! - [`app`] - Application core and component coordination
//! - [`config`] - Viewer settings and optional config file loading
//! - [`error`] - Centralized error types

pub mod config;
pub mod decode;
pub mod error;
pub mod list;
pub mod source;

pub mod fetch;
pub mod input;
pub mod render;

pub mod app;

pub use error::{DecodeError, LttviewError, Result};

pub use app::Application;
pub use config::ViewerConfig;
pub use list::{DisplayItem, FilterState, ItemStore, MatchPolicy};
pub use source::{EventSource, RecordFraming, SourceSpec};

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
