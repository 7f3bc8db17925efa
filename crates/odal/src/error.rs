//! Result and Error types for the crate.
use std::fmt;

use miette::Diagnostic;
use thiserror::Error;

/// Result containing an error variant from this module.
pub type Result<T> = std::result::Result<T, Error>;

/// Which of the two layers of a config failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConfigKind {
    Main,
    Overlay,
}

impl fmt::Display for ConfigKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConfigKind::Main => f.write_str("main"),
            ConfigKind::Overlay => f.write_str("overlay"),
        }
    }
}

/// Error while loading the config stored at [`Config::PATH`](crate::Config::PATH).
#[derive(Debug, Error, Diagnostic)]
#[error("failed to load config `{name}`")]
pub struct Error {
    /// File name of the config, relative to its root.
    pub name: &'static str,
    #[source]
    #[diagnostic_source]
    pub kind: ErrorKind,
}

/// Configuration error variants
#[derive(Debug, Error, Diagnostic)]
pub enum ErrorKind {
    /// The file could not be read, this wraps a [`std::io::Error`]
    #[error("failed to read {config_kind} config from `{path}`")]
    #[diagnostic(code(odal::load))]
    Load {
        path: String,
        config_kind: ConfigKind,
        #[source]
        source: std::io::Error,
    },

    /// The file is not valid TOML, this wraps a [`toml::de::Error`]
    #[error("failed to parse {config_kind} config `{path}`")]
    #[diagnostic(code(odal::parse))]
    Parse {
        path: String,
        config_kind: ConfigKind,
        #[source]
        source: toml::de::Error,
    },

    /// The merged table does not match the config struct, this wraps a [`toml::de::Error`]
    #[error(transparent)]
    #[diagnostic(
        code(odal::deserialize),
        help("check the main and overlay files for misspelled or missing keys")
    )]
    Deserialize(toml::de::Error),
}
