//! Terminal input: raw crossterm events in, list actions out.

pub mod raw;
pub mod service;

pub use raw::ScrollDirection;
pub use service::{InputAction, InputService, InputState, InputStateMachine};
