// Copyright (c) The trx-playlist Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration for trx-playlist.

use crate::{
    errors::{ConfigParseError, ConfigParseErrorKind},
    rules::ProjectGrouping,
    serialize::SerializeOptions,
};
use camino::Utf8Path;
use config::{Config, ConfigBuilder, ConfigError, File, FileFormat, builder::DefaultState};
use serde::{Deserialize, Serialize};
use std::{collections::BTreeSet, fmt};
use tracing::warn;

/// Handles warnings produced while reading configuration.
///
/// The CLI logs warnings through [`DefaultConfigWarnings`]. Tests collect them instead.
pub trait ConfigWarnings {
    /// Handle unknown configuration keys found in a config file.
    fn unknown_config_keys(
        &mut self,
        config_file: &Utf8Path,
        cwd: &Utf8Path,
        unknown: &BTreeSet<String>,
    );
}

/// Logs configuration warnings with `tracing`.
#[derive(Clone, Copy, Debug, Default)]
pub struct DefaultConfigWarnings;

impl ConfigWarnings for DefaultConfigWarnings {
    fn unknown_config_keys(
        &mut self,
        config_file: &Utf8Path,
        cwd: &Utf8Path,
        unknown: &BTreeSet<String>,
    ) {
        let mut unknown_str = String::new();
        if let [key] = unknown.iter().collect::<Vec<_>>().as_slice() {
            unknown_str.push_str("key: ");
            unknown_str.push_str(key);
        } else {
            unknown_str.push_str("keys:");
            for key in unknown {
                unknown_str.push_str("\n  - ");
                unknown_str.push_str(key);
            }
        }

        warn!(
            "in config file {}, ignoring unknown configuration {unknown_str}",
            config_file.strip_prefix(cwd).unwrap_or(config_file),
        );
    }
}

/// What to do when a report contains no failed tests.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum NoFailuresBehavior {
    /// Write nothing and succeed silently.
    Pass,

    /// Write nothing, warn, and succeed.
    Warn,

    /// Write nothing and fail.
    #[default]
    Fail,
}

impl fmt::Display for NoFailuresBehavior {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Pass => write!(f, "pass"),
            Self::Warn => write!(f, "warn"),
            Self::Fail => write!(f, "fail"),
        }
    }
}

/// Settings for generating playlists, read from the `[playlist]` section.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct PlaylistConfig {
    /// How failed tests are grouped under project and namespace rules.
    pub grouping: ProjectGrouping,

    /// The indentation width. `0` writes the playlist on one line.
    pub indent: usize,

    /// Whether to emit an XML declaration.
    pub xml_declaration: bool,

    /// What to do when the report has no failed tests.
    pub no_failures: NoFailuresBehavior,
}

impl PlaylistConfig {
    /// Returns the serializer options selected by this config.
    pub fn serialize_options(&self) -> SerializeOptions {
        SerializeOptions {
            indent: self.indent,
            xml_declaration: self.xml_declaration,
        }
    }
}

/// Overall configuration for trx-playlist.
#[derive(Clone, Debug, Eq, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "kebab-case")]
pub struct TrxPlaylistConfig {
    playlist: PlaylistConfig,
}

impl TrxPlaylistConfig {
    /// The location of the user config, relative to the current directory.
    pub const CONFIG_PATH: &'static str = ".config/trx-playlist.toml";

    /// Contains the default config as a TOML file.
    ///
    /// The defaults are:
    ///
    /// ```toml
    #[doc = include_str!("../default-config.toml")]
    /// ```
    ///
    /// User configuration is layered on top of the default config.
    pub const DEFAULT_CONFIG: &'static str = include_str!("../default-config.toml");

    /// Reads the config from the given file, or if not present from `.config/trx-playlist.toml`
    /// in the given directory.
    ///
    /// If the file isn't specified and the directory doesn't have `.config/trx-playlist.toml`,
    /// uses the default config options. A file that is specified must exist.
    pub fn from_sources(
        config_file: Option<&Utf8Path>,
        cwd: &Utf8Path,
        warnings: &mut impl ConfigWarnings,
    ) -> Result<Self, ConfigParseError> {
        let (config_file, source) = match config_file {
            Some(file) => (file.to_owned(), File::new(file.as_str(), FileFormat::Toml)),
            None => {
                let config_file = cwd.join(Self::CONFIG_PATH);
                let source = File::new(config_file.as_str(), FileFormat::Toml).required(false);
                (config_file, source)
            }
        };

        let builder = Self::make_default_config().add_source(source);
        let (config, unknown) = Self::build_and_deserialize_config(&builder)
            .map_err(|kind| ConfigParseError::new(&config_file, kind))?;

        if !unknown.is_empty() {
            warnings.unknown_config_keys(&config_file, cwd, &unknown);
        }

        Ok(config)
    }

    /// Returns the default configuration.
    pub fn default_config() -> Self {
        let (config, _unknown) = Self::build_and_deserialize_config(&Self::make_default_config())
            .expect("default config is always valid");
        config
    }

    /// Returns the `[playlist]` settings.
    pub fn playlist(&self) -> &PlaylistConfig {
        &self.playlist
    }

    /// Returns the `[playlist]` settings for modification, e.g. to apply command-line overrides.
    pub fn playlist_mut(&mut self) -> &mut PlaylistConfig {
        &mut self.playlist
    }

    /// Renders the effective configuration as TOML.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    // ---
    // Helper methods
    // ---

    fn make_default_config() -> ConfigBuilder<DefaultState> {
        Config::builder().add_source(File::from_str(Self::DEFAULT_CONFIG, FileFormat::Toml))
    }

    /// This returns a tuple of (config, ignored paths).
    fn build_and_deserialize_config(
        builder: &ConfigBuilder<DefaultState>,
    ) -> Result<(Self, BTreeSet<String>), ConfigParseErrorKind> {
        let config = builder
            .build_cloned()
            .map_err(|error| ConfigParseErrorKind::BuildError(Box::new(error)))?;

        let mut ignored = BTreeSet::new();
        let mut cb = |path: serde_ignored::Path| {
            ignored.insert(path.to_string());
        };
        let ignored_de = serde_ignored::Deserializer::new(config, &mut cb);
        let config: Self = serde_path_to_error::deserialize(ignored_de).map_err(|error| {
            // The config crate also reports the key: drop it so that it's only printed once.
            let path = error.path().clone();
            let error = match error.into_inner() {
                ConfigError::At { error, .. } => *error,
                other => other,
            };
            ConfigParseErrorKind::DeserializeError(Box::new(serde_path_to_error::Error::new(
                path, error,
            )))
        })?;

        Ok((config, ignored))
    }
}
