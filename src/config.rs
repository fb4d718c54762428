// SPDX-License-Identifier: MIT
//
// Configuration: `halfblock.toml` plus command-line overrides.
//
// Lookup order for the file:
//
//   1. `--config PATH` (must exist)
//   2. `$XDG_CONFIG_HOME/halfblock/halfblock.toml`
//   3. `~/.config/halfblock/halfblock.toml`
//
// A missing file in (2) or (3) is not an error; every field has a default.
// Flags given on the command line win over values from the file.

use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use hb_term::color::ColorValue;
use hb_term::event_loop::LoopConfig;
use serde::{Deserialize, Deserializer};
use thiserror::Error;

pub const FILE_NAME: &str = "halfblock.toml";

/// Accepted range for `frame_rate`.
pub const FRAME_RATE_RANGE: std::ops::RangeInclusive<u32> = 1..=240;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("frame_rate must be within 1..=240, got {0}")]
    FrameRate(u32),
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Frames per second.
    pub frame_rate: u32,
    /// Canvas background, in `ColorValue` string syntax.
    #[serde(deserialize_with = "color_from_str")]
    pub background: ColorValue,
    /// Ctrl+this key quits. `q` always quits too.
    pub quit_key: char,
    /// SGR mouse reporting.
    pub mouse: bool,
    /// Where log output goes. Logging is off without one.
    pub log_file: Option<PathBuf>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            frame_rate: 60,
            background: ColorValue::DEFAULT,
            quit_key: 'c',
            mouse: true,
            log_file: None,
        }
    }
}

fn color_from_str<'de, D: Deserializer<'de>>(deserializer: D) -> Result<ColorValue, D::Error> {
    let text = String::deserialize(deserializer)?;
    text.parse().map_err(serde::de::Error::custom)
}

/// Values from the command line that replace file values when present.
#[derive(Debug, Clone, Default)]
pub struct Overrides {
    pub frame_rate: Option<u32>,
    pub background: Option<ColorValue>,
    pub log_file: Option<PathBuf>,
    pub no_mouse: bool,
}

impl Config {
    /// Parse and validate TOML text. `path` is only used in errors.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Parse`] on malformed TOML, unknown keys or bad color
    /// strings, [`ConfigError::FrameRate`] when the rate is out of range.
    pub fn from_toml(text: &str, path: &Path) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Read and validate a config file.
    ///
    /// # Errors
    ///
    /// [`ConfigError::Io`] if the file cannot be read, otherwise as
    /// [`from_toml`](Self::from_toml).
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&text, path)
    }

    /// Load from `explicit` if given, else from the first discovered file,
    /// else defaults.
    ///
    /// # Errors
    ///
    /// As [`load`](Self::load). An explicit path that does not exist is an
    /// error.
    pub fn discover(explicit: Option<&Path>) -> Result<Self, ConfigError> {
        let path = match explicit {
            Some(path) => Some(path.to_path_buf()),
            None => default_paths().into_iter().find(|p| p.is_file()),
        };
        match path {
            Some(path) => {
                let config = Self::load(&path)?;
                log::info!("loaded config from {}", path.display());
                Ok(config)
            }
            None => Ok(Self::default()),
        }
    }

    /// Apply command-line overrides and validate the result.
    ///
    /// # Errors
    ///
    /// [`ConfigError::FrameRate`] when `--fps` is out of range.
    pub fn with_overrides(mut self, overrides: Overrides) -> Result<Self, ConfigError> {
        if let Some(rate) = overrides.frame_rate {
            self.frame_rate = rate;
        }
        if let Some(bg) = overrides.background {
            self.background = bg;
        }
        if overrides.log_file.is_some() {
            self.log_file = overrides.log_file;
        }
        if overrides.no_mouse {
            self.mouse = false;
        }
        self.validate()?;
        Ok(self)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if FRAME_RATE_RANGE.contains(&self.frame_rate) {
            Ok(())
        } else {
            Err(ConfigError::FrameRate(self.frame_rate))
        }
    }

    #[must_use]
    pub const fn loop_config(&self) -> LoopConfig {
        LoopConfig {
            frame_rate: self.frame_rate,
            mouse: self.mouse,
        }
    }
}

/// Candidate config locations, most specific first.
fn default_paths() -> Vec<PathBuf> {
    let mut paths = Vec::with_capacity(2);
    if let Some(xdg) = env::var_os("XDG_CONFIG_HOME").filter(|v| !v.is_empty()) {
        paths.push(PathBuf::from(xdg).join("halfblock").join(FILE_NAME));
    }
    if let Some(home) = env::var_os("HOME").filter(|v| !v.is_empty()) {
        paths.push(
            PathBuf::from(home)
                .join(".config")
                .join("halfblock")
                .join(FILE_NAME),
        );
    }
    paths
}

// ─── Tests ──────────────────────────────────────────────────────────────────
