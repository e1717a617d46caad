//! View state owned by the control loop and read by the renderer.

use crate::config::ViewerConfig;
use crate::list::{FilterEngine, ItemStore};
use crate::render::ui::compose;
use crate::render::ui::delegate::{EventDelegate, ItemDelegate};

/// Everything a frame is composed from.
#[derive(Debug)]
pub struct ViewState {
    /// Items, filter, selection and pagination
    pub store: ItemStore,

    pub delegate: EventDelegate,

    pub status_line: StatusLine,

    /// Header text
    pub title: String,

    /// Where events come from, shown next to the title
    pub source_label: String,

    pub viewport_width: u16,
    pub viewport_height: u16,
}

impl ViewState {
    pub fn new(config: &ViewerConfig, source_label: impl Into<String>) -> Self {
        let delegate = EventDelegate::from_config(config);
        let store = ItemStore::new(
            FilterEngine::new(config.match_policy),
            delegate.height(),
            delegate.spacing(),
        );
        Self {
            store,
            delegate,
            status_line: StatusLine::new(),
            title: config.title.clone(),
            source_label: source_label.into(),
            viewport_width: 0,
            viewport_height: 0,
        }
    }

    /// Rows available to the list once the chrome is laid out.
    pub fn list_height(&self) -> u16 {
        compose::list_height(self.viewport_height)
    }

    /// Record new terminal dimensions and repaginate.
    /// Returns true if dimensions actually changed.
    pub fn update_terminal_size(&mut self, width: u16, height: u16) -> bool {
        let changed = self.viewport_width != width || self.viewport_height != height;
        self.viewport_width = width;
        self.viewport_height = height;
        self.store.resize(width, self.list_height());
        changed
    }
}

/// Counters and transient message shown in the footer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StatusLine {
    pub message: Option<String>,
    /// Records skipped because they failed to decode
    pub malformed: usize,
    /// The source will not produce any more records
    pub stream_ended: bool,
}

impl StatusLine {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a temporary message
    pub fn set_message(&mut self, message: String) {
        self.message = Some(message);
    }

    /// Clear any temporary message
    pub fn clear_message(&mut self) {
        self.message = None;
    }

    /// Footer text after the selection position, e.g. `3 malformed skipped · stream ended`.
    pub fn format_notes(&self) -> Vec<String> {
        let mut notes = Vec::new();
        if self.malformed > 0 {
            notes.push(format!("{} malformed skipped", self.malformed));
        }
        if self.stream_ended {
            notes.push("stream ended".to_string());
        }
        if let Some(message) = &self.message {
            notes.push(message.clone());
        }
        notes
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::list::{DisplayItem, MatchPolicy};

    #[test]
    fn test_view_state_creation() {
        let config = ViewerConfig {
            match_policy: MatchPolicy::Substring,
            ..ViewerConfig::default()
        };
        let state = ViewState::new(&config, "stdin");

        assert_eq!(state.title, "lttview");
        assert_eq!(state.source_label, "stdin");
        assert!(state.store.is_empty());
        assert_eq!(state.store.engine().policy(), MatchPolicy::Substring);
        assert_eq!(state.viewport_width, 0);
    }

    #[test]
    fn test_terminal_resize_repaginates() {
        let mut state = ViewState::new(&ViewerConfig::default(), "stdin");
        assert!(state.update_terminal_size(80, 24));
        assert!(!state.update_terminal_size(80, 24));

        let per_page = state.store.per_page();
        assert!(per_page > 1);
        state
            .store
            .append_batch((0..50).map(|n| DisplayItem::new("ev", n.to_string())));
        let pages_before = state.store.total_pages();

        assert!(state.update_terminal_size(80, 60));
        assert!(state.store.per_page() > per_page);
        assert!(state.store.total_pages() < pages_before);
    }

    #[test]
    fn test_hidden_descriptions_fit_more_rows() {
        let with = {
            let mut state = ViewState::new(&ViewerConfig::default(), "stdin");
            state.update_terminal_size(80, 30);
            state.store.per_page()
        };
        let without = {
            let config = ViewerConfig {
                show_description: false,
                ..ViewerConfig::default()
            };
            let mut state = ViewState::new(&config, "stdin");
            state.update_terminal_size(80, 30);
            state.store.per_page()
        };
        assert!(without > with);
    }

    #[test]
    fn test_status_notes() {
        let mut status = StatusLine::new();
        assert!(status.format_notes().is_empty());

        status.malformed = 2;
        status.stream_ended = true;
        status.set_message("poll failed".to_string());
        assert_eq!(
            status.format_notes(),
            vec!["2 malformed skipped", "stream ended", "poll failed"]
        );

        status.clear_message();
        assert_eq!(status.format_notes().len(), 2);
    }
}
