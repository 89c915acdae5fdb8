//! Debugger settings, read from an optional JSON file.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Upper bound on `heap_size + stack_size`, in cells.
pub const MAX_MEMORY_CELLS: usize = 1 << 24;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DebuggerConfig {
    /// Addressable heap cells of the machine.
    pub heap_size: usize,
    /// Stack cells above the heap.
    pub stack_size: usize,
    /// Rows of the source view, status line included.
    pub view_height: usize,
    /// Columns of the source view and message log.
    pub wrap_width: usize,
    /// Rows kept in the message log.
    pub scrollback_lines: usize,
    /// Default tracing filter when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Default for DebuggerConfig {
    fn default() -> Self {
        Self {
            heap_size: 256,
            stack_size: 256,
            view_height: 20,
            wrap_width: 100,
            scrollback_lines: 200,
            log_level: "warn".to_string(),
        }
    }
}

impl DebuggerConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let sizes = [
            ("stack_size", self.stack_size),
            ("view_height", self.view_height),
            ("wrap_width", self.wrap_width),
            ("scrollback_lines", self.scrollback_lines),
        ];
        if let Some((name, _)) = sizes.into_iter().find(|(_, value)| *value == 0) {
            return Err(ConfigError::Zero(name));
        }

        let cells = self.heap_size.checked_add(self.stack_size);
        if cells.map_or(true, |cells| cells > MAX_MEMORY_CELLS) {
            return Err(ConfigError::TooLarge {
                heap_size: self.heap_size,
                stack_size: self.stack_size,
                max: MAX_MEMORY_CELLS,
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let config: DebuggerConfig = serde_json::from_str(r#"{ "heap_size": 16 }"#).unwrap();
        assert_eq!(config.heap_size, 16);
        assert_eq!(config.stack_size, DebuggerConfig::default().stack_size);
        assert_eq!(config.log_level, "warn");
    }

    #[test]
    fn unknown_fields_are_rejected() {
        assert!(serde_json::from_str::<DebuggerConfig>(r#"{ "heap": 16 }"#).is_err());
    }

    #[test]
    fn zero_sizes_are_invalid() {
        let config = DebuggerConfig {
            view_height: 0,
            ..DebuggerConfig::default()
        };
        assert!(matches!(config.validate(), Err(ConfigError::Zero("view_height"))));
        assert!(DebuggerConfig::default().validate().is_ok());
    }

    #[test]
    fn oversized_memory_is_rejected() {
        let config = DebuggerConfig {
            heap_size: usize::MAX,
            ..DebuggerConfig::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::TooLarge { heap_size: usize::MAX, .. })
        ));

        let config = DebuggerConfig {
            heap_size: MAX_MEMORY_CELLS,
            stack_size: 1,
            ..DebuggerConfig::default()
        };
        assert!(config.validate().is_err());

        let config = DebuggerConfig {
            heap_size: MAX_MEMORY_CELLS - 1,
            stack_size: 1,
            ..DebuggerConfig::default()
        };
        assert!(config.validate().is_ok());
    }
}
