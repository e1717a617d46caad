//! Viewer configuration.
//!
//! Defaults are usable as-is; the binary overrides them from command-line flags. With the
//! `config` feature a TOML file can provide the same settings:
//!
//! ```toml
//! tick_interval_ms = 5
//! show_description = true
//! match_policy = "substring"
//! framing = "json"
//! ```

use crate::error::{LttviewError, Result};
use crate::list::MatchPolicy;
use crate::source::RecordFraming;
use std::time::Duration;

/// Upper bound for both polling intervals; anything slower stops feeling live.
const MAX_INTERVAL_MS: u64 = 1000;

/// Settings shared by the poll loop, the renderer and the input thread.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "config", derive(serde::Deserialize))]
#[cfg_attr(feature = "config", serde(default, deny_unknown_fields))]
pub struct ViewerConfig {
    /// Delay between polls of the event source
    pub tick_interval_ms: u64,
    /// Crossterm poll timeout used by the input thread
    pub input_poll_interval_ms: u64,
    /// Render a description line under each title
    pub show_description: bool,
    /// Blank lines between rows
    pub row_spacing: usize,
    pub match_policy: MatchPolicy,
    pub framing: RecordFraming,
    /// Text shown in the title bar
    pub title: String,
}

impl Default for ViewerConfig {
    fn default() -> Self {
        Self {
            tick_interval_ms: 5,
            input_poll_interval_ms: 25,
            show_description: true,
            row_spacing: 1,
            match_policy: MatchPolicy::Fuzzy,
            framing: RecordFraming::Lines,
            title: "lttview".to_string(),
        }
    }
}

impl ViewerConfig {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }

    pub fn input_poll_interval(&self) -> Duration {
        Duration::from_millis(self.input_poll_interval_ms)
    }

    /// Rows are two lines tall when descriptions are shown.
    pub fn row_height(&self) -> usize {
        if self.show_description {
            2
        } else {
            1
        }
    }

    pub fn validate(&self) -> Result<()> {
        if !(1..=MAX_INTERVAL_MS).contains(&self.tick_interval_ms) {
            return Err(LttviewError::invalid_argument(format!(
                "tick interval must be between 1 and {MAX_INTERVAL_MS} ms, got {}",
                self.tick_interval_ms
            )));
        }
        if !(1..=MAX_INTERVAL_MS).contains(&self.input_poll_interval_ms) {
            return Err(LttviewError::invalid_argument(format!(
                "input poll interval must be between 1 and {MAX_INTERVAL_MS} ms, got {}",
                self.input_poll_interval_ms
            )));
        }
        Ok(())
    }

    /// Default location of the configuration file, if a config directory exists.
    #[cfg(feature = "config")]
    pub fn default_path() -> Option<std::path::PathBuf> {
        dirs::config_dir().map(|dir| dir.join("lttview").join("config.toml"))
    }

    /// Load and validate a TOML configuration file.
    #[cfg(feature = "config")]
    pub fn load(path: &std::path::Path) -> Result<Self> {
        let text = std::fs::read_to_string(path).map_err(|e| {
            LttviewError::config(format!("cannot read {}: {}", path.display(), e))
        })?;
        let config: Self = toml::from_str(&text)
            .map_err(|e| LttviewError::config(format!("{}: {}", path.display(), e)))?;
        config
            .validate()
            .map_err(|e| LttviewError::config(format!("{}: {}", path.display(), e)))?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid_and_sub_10ms() {
        let config = ViewerConfig::default();
        config.validate().unwrap();
        assert!(config.tick_interval() < Duration::from_millis(10));
        assert_eq!(config.row_height(), 2);
    }

    #[test]
    fn row_height_follows_description_toggle() {
        let config = ViewerConfig {
            show_description: false,
            ..ViewerConfig::default()
        };
        assert_eq!(config.row_height(), 1);
    }

    #[test]
    fn rejects_out_of_range_intervals() {
        let zero_tick = ViewerConfig {
            tick_interval_ms: 0,
            ..ViewerConfig::default()
        };
        assert!(matches!(
            zero_tick.validate(),
            Err(LttviewError::InvalidArgument { .. })
        ));

        let slow_input = ViewerConfig {
            input_poll_interval_ms: 5000,
            ..ViewerConfig::default()
        };
        assert!(slow_input.validate().is_err());
    }

    #[cfg(feature = "config")]
    #[test]
    fn loads_partial_toml_over_defaults() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "tick_interval_ms = 8").unwrap();
        writeln!(file, "match_policy = \"substring\"").unwrap();
        writeln!(file, "framing = \"json\"").unwrap();

        let config = ViewerConfig::load(file.path()).unwrap();
        assert_eq!(config.tick_interval_ms, 8);
        assert_eq!(config.match_policy, MatchPolicy::Substring);
        assert_eq!(config.framing, RecordFraming::Json);
        assert!(config.show_description);
    }

    #[cfg(feature = "config")]
    #[test]
    fn invalid_toml_values_are_config_errors() {
        use std::io::Write;

        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "tick_interval_ms = 0").unwrap();
        assert!(matches!(
            ViewerConfig::load(file.path()),
            Err(LttviewError::ConfigError { .. })
        ));
    }
}
