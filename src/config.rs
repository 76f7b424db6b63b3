//! Validated run configuration.
//!
//! Configuration is collected once (flags or wizard), validated here,
//! and immutable for the rest of the run.

use std::path::{Path, PathBuf};

use thiserror::Error;

use crate::event::Event;

/// Errors produced while validating a run configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The download target must be a positive count.
    #[error("download limit must be a positive integer")]
    ZeroMax,

    /// The output directory must already exist.
    #[error("output directory does not exist: {path}")]
    MissingOutputDir {
        /// The directory that was not found.
        path: PathBuf,
    },
}

/// How saved avatar files are named.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NamingMode {
    /// Name files by the user's numeric id (default).
    UserId,
    /// Name files by the user's screen name.
    ScreenName,
}

/// Immutable configuration for one collection run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    /// Total number of avatars to save before stopping.
    pub max: usize,
    /// Only admit events whose user language matches; `None` disables.
    pub language_filter: Option<String>,
    /// Directory downloaded images are written into. Must exist.
    pub output_dir: PathBuf,
    /// Filename scheme for saved avatars.
    pub naming: NamingMode,
}

impl RunConfig {
    /// Builds a validated configuration.
    ///
    /// An empty language filter string is treated as disabled, matching
    /// the optional wizard field.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::ZeroMax`] when `max` is zero and
    /// [`ConfigError::MissingOutputDir`] when `output_dir` does not
    /// exist.
    pub fn new(
        max: usize,
        language_filter: Option<String>,
        output_dir: impl Into<PathBuf>,
        naming: NamingMode,
    ) -> Result<Self, ConfigError> {
        if max == 0 {
            return Err(ConfigError::ZeroMax);
        }
        let output_dir = output_dir.into();
        if !output_dir.is_dir() {
            return Err(ConfigError::MissingOutputDir { path: output_dir });
        }
        let language_filter = language_filter.filter(|lang| !lang.is_empty());
        Ok(Self {
            max,
            language_filter,
            output_dir,
            naming,
        })
    }

    /// The filename stem for an event's avatar under the configured
    /// naming mode.
    #[must_use]
    pub fn file_key<'a>(&self, event: &'a Event) -> &'a str {
        match self.naming {
            NamingMode::UserId => &event.user_key,
            NamingMode::ScreenName => &event.screen_name,
        }
    }

    /// The configured output directory.
    #[must_use]
    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }
}
