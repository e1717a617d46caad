//! Terminal UI implementation using ratatui
//!
//! Draws composed frames with the crossterm backend. Input is read separately by the input
//! thread, so this type only owns the screen.

use crate::error::{LttviewError, Result};
use crate::render::ui::compose::compose_frame;
use crate::render::ui::renderer::UIRenderer;
use crate::render::ui::state::ViewState;
use crate::render::ui::theme::ColorTheme;
use ratatui::crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, widgets::Paragraph, Terminal};
use std::io::{self, Stdout};

type CrosstermTerminal = Terminal<CrosstermBackend<Stdout>>;

/// Terminal UI implementation with ratatui backend
pub struct TerminalUI {
    terminal: Option<CrosstermTerminal>,
    theme: ColorTheme,
}

impl TerminalUI {
    pub fn new() -> Result<Self> {
        Self::with_theme(ColorTheme::default())
    }

    pub fn with_theme(theme: ColorTheme) -> Result<Self> {
        Ok(Self {
            terminal: None,
            theme,
        })
    }

    pub fn theme(&self) -> &ColorTheme {
        &self.theme
    }
}

impl UIRenderer for TerminalUI {
    fn render(&mut self, view_state: &ViewState) -> Result<()> {
        if let Some(ref mut terminal) = self.terminal {
            let lines = compose_frame(view_state, &self.theme);
            terminal.draw(move |frame| {
                let area = frame.size();
                frame.render_widget(Paragraph::new(lines), area);
            })?;
        }
        Ok(())
    }

    fn initialize(&mut self) -> Result<()> {
        enable_raw_mode()
            .map_err(|e| LttviewError::ui(format!("cannot enter raw mode: {e}")))?;
        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen, EnableMouseCapture) {
            let _ = disable_raw_mode();
            return Err(LttviewError::ui(format!("cannot enter alternate screen: {e}")));
        }

        let backend = CrosstermBackend::new(stdout);
        let mut terminal = Terminal::new(backend)?;
        terminal.hide_cursor()?;
        self.terminal = Some(terminal);

        Ok(())
    }

    fn cleanup(&mut self) -> Result<()> {
        if let Some(mut terminal) = self.terminal.take() {
            disable_raw_mode()?;
            execute!(
                terminal.backend_mut(),
                LeaveAlternateScreen,
                DisableMouseCapture
            )?;
            terminal.show_cursor()?;
        }
        Ok(())
    }

    fn get_terminal_size(&self) -> Result<(u16, u16)> {
        let (cols, rows) = ratatui::crossterm::terminal::size()?;
        Ok((cols, rows))
    }
}

impl Drop for TerminalUI {
    fn drop(&mut self) {
        let _ = self.cleanup();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ratatui::style::Modifier;

    #[test]
    fn test_terminal_ui_creation() {
        let ui = TerminalUI::new().unwrap();
        assert!(ui.terminal.is_none());

        let mono = TerminalUI::with_theme(ColorTheme::monochrome()).unwrap();
        assert!(mono.terminal.is_none());
        assert!(mono
            .theme()
            .title_bar
            .add_modifier
            .contains(Modifier::REVERSED));
    }

    #[test]
    fn test_render_before_initialize_is_noop() {
        let mut ui = TerminalUI::new().unwrap();
        let view = ViewState::new(&crate::config::ViewerConfig::default(), "stdin");
        ui.render(&view).unwrap();
        ui.cleanup().unwrap();
    }
}
