//! Terminal rendering components.
//!
//! The delegate styles single rows, the composer lays out whole frames, and the terminal UI
//! draws them with ratatui.

pub mod compose;
pub mod delegate;
pub mod renderer;
pub mod state;
pub mod terminal;
pub mod theme;

pub use compose::compose_frame;
pub use delegate::{EventDelegate, ItemDelegate, RowContext, Tier};
pub use renderer::UIRenderer;
pub use state::{StatusLine, ViewState};
pub use terminal::TerminalUI;
pub use theme::ColorTheme;

#[cfg(test)]
pub use renderer::tests::MockUIRenderer;
