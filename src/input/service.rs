//! High-level input service.
//!
//! Runs primitive events through the list key bindings and yields [`InputAction`]s for the
//! poll loop. The query text itself lives in the item store; this state machine only tracks
//! whether keystrokes are navigation or query edits.

use crate::error::Result;
use crate::input::raw::{RawInputCollector, RawInputEvent, ScrollDirection};
use ratatui::crossterm::event::{Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use std::time::Duration;

/// Which bindings apply to the next key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InputState {
    #[default]
    Navigation,
    FilterEditing,
}

/// Actions consumed by the poll loop.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputAction {
    Scroll {
        direction: ScrollDirection,
        rows: u64,
    },
    NextPage,
    PrevPage,
    GoToTop,
    GoToBottom,
    Quit,
    StartFilter,
    FilterInput(char),
    FilterBackspace,
    ApplyFilter,
    CancelFilter,
    /// Drop an applied filter from navigation mode.
    ClearFilter,
    Resize {
        width: u16,
        height: u16,
    },
    NoAction,
    InvalidInput,
}

impl InputAction {
    fn step(direction: ScrollDirection) -> Self {
        InputAction::Scroll { direction, rows: 1 }
    }
}

/// Key bindings for the event list.
#[derive(Debug, Default)]
pub struct InputStateMachine {
    state: InputState,
}

impl InputStateMachine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> InputState {
        self.state
    }

    pub fn handle_key_event(&mut self, key: KeyEvent) -> InputAction {
        if key.kind != KeyEventKind::Press {
            return InputAction::NoAction;
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
            return InputAction::Quit;
        }
        match self.state {
            InputState::Navigation => self.navigation_key(key),
            InputState::FilterEditing => self.editing_key(key),
        }
    }

    fn navigation_key(&mut self, key: KeyEvent) -> InputAction {
        let plain = !key
            .modifiers
            .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT);

        match key.code {
            KeyCode::Down => InputAction::step(ScrollDirection::Down),
            KeyCode::Up => InputAction::step(ScrollDirection::Up),
            KeyCode::Right | KeyCode::PageDown => InputAction::NextPage,
            KeyCode::Left | KeyCode::PageUp => InputAction::PrevPage,
            KeyCode::Home => InputAction::GoToTop,
            KeyCode::End => InputAction::GoToBottom,
            KeyCode::Esc => InputAction::ClearFilter,
            KeyCode::Char(ch) if plain => match ch {
                'j' => InputAction::step(ScrollDirection::Down),
                'k' => InputAction::step(ScrollDirection::Up),
                'l' | 'f' => InputAction::NextPage,
                'h' | 'b' => InputAction::PrevPage,
                'g' => InputAction::GoToTop,
                'G' => InputAction::GoToBottom,
                'q' => InputAction::Quit,
                '/' => {
                    self.state = InputState::FilterEditing;
                    InputAction::StartFilter
                }
                _ => InputAction::InvalidInput,
            },
            _ => InputAction::InvalidInput,
        }
    }

    fn editing_key(&mut self, key: KeyEvent) -> InputAction {
        match key.code {
            KeyCode::Enter => {
                self.state = InputState::Navigation;
                InputAction::ApplyFilter
            }
            KeyCode::Esc => {
                self.state = InputState::Navigation;
                InputAction::CancelFilter
            }
            KeyCode::Backspace => InputAction::FilterBackspace,
            KeyCode::Down => InputAction::step(ScrollDirection::Down),
            KeyCode::Up => InputAction::step(ScrollDirection::Up),
            KeyCode::Char(ch)
                if !ch.is_control()
                    && !key
                        .modifiers
                        .intersects(KeyModifiers::CONTROL | KeyModifiers::ALT) =>
            {
                InputAction::FilterInput(ch)
            }
            _ => InputAction::InvalidInput,
        }
    }
}

/// Produces [`InputAction`]s from terminal events.
#[derive(Debug, Default)]
pub struct InputService {
    state_machine: InputStateMachine,
    raw_input: RawInputCollector,
}

impl InputService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wait up to `timeout` for input and return every action that became ready.
    pub fn poll_actions(&mut self, timeout: Option<Duration>) -> Result<Vec<InputAction>> {
        let mut actions = Vec::new();
        if let Some(event) = self.raw_input.poll_event(timeout)? {
            actions.extend(self.translate(event));
            while let Some(event) = self.raw_input.next_ready() {
                actions.extend(self.translate(event));
            }
        }
        Ok(actions)
    }

    /// Feed one terminal event directly.
    pub fn process_event(&mut self, event: Event) -> Vec<InputAction> {
        self.raw_input.process_event(event);
        let mut actions = Vec::new();
        while let Some(event) = self.raw_input.next_ready() {
            actions.extend(self.translate(event));
        }
        actions
    }

    fn translate(&mut self, event: RawInputEvent) -> Option<InputAction> {
        let action = match event {
            RawInputEvent::Key(key) => self.state_machine.handle_key_event(key),
            RawInputEvent::Resize { width, height } => InputAction::Resize { width, height },
            RawInputEvent::Scroll { direction, rows } => InputAction::Scroll { direction, rows },
        };
        match action {
            InputAction::NoAction | InputAction::InvalidInput => None,
            action => Some(action),
        }
    }
}
