//! Layered TOML configuration.
//!
//! A config lives in a main file under a config root, e.g. `config/rcnn.toml`. An overlay
//! root, e.g. `config/overlay/vgg16/`, may hold a file with the same name that only contains
//! the keys that differ from the main file.
//!
//! ```no_run
//! use odal::Config;
//! use serde::Deserialize;
//!
//! #[derive(Debug, Deserialize)]
//! #[serde(deny_unknown_fields)]
//! struct MeowConfig {
//!     count: u32,
//! }
//!
//! impl Config for MeowConfig {
//!     const PATH: &'static str = "meow.toml";
//! }
//!
//! let _config = MeowConfig::load_with_overlay("config", "config/overlay/cat")?;
//! # Ok::<(), odal::Error>(())
//! ```

mod error;

use std::{fs, path::Path};

use serde::de::DeserializeOwned;
use toml::Table;

pub use error::{ConfigKind, Error, ErrorKind, Result};

/// A struct that can be loaded from a (layered) TOML file.
pub trait Config: DeserializeOwned {
    /// Path of the config file, relative to a config root.
    const PATH: &'static str;

    /// Load the config from `root` only.
    fn load(root: impl AsRef<Path>) -> Result<Self> {
        let main = read_table::<Self>(root.as_ref(), ConfigKind::Main)?;
        deserialize::<Self>(main)
    }

    /// Load the config from `root`, with the overlay in `overlay_root` merged on top.
    ///
    /// Returns an [`ErrorKind::Load`] with [`ConfigKind::Overlay`] if the overlay file can't be
    /// read, callers that treat the overlay as optional can fall back to [`Config::load`].
    fn load_with_overlay(root: impl AsRef<Path>, overlay_root: impl AsRef<Path>) -> Result<Self> {
        let main = read_table::<Self>(root.as_ref(), ConfigKind::Main)?;
        let overlay = read_table::<Self>(overlay_root.as_ref(), ConfigKind::Overlay)?;

        deserialize::<Self>(merge_tables(main, overlay))
    }
}

fn read_table<T: Config>(root: &Path, config_kind: ConfigKind) -> Result<Table> {
    let path = root.join(T::PATH);
    let error = |kind| Error {
        name: T::PATH,
        kind,
    };

    let contents = fs::read_to_string(&path).map_err(|source| {
        error(ErrorKind::Load {
            path: path.display().to_string(),
            config_kind,
            source,
        })
    })?;

    contents.parse::<Table>().map_err(|source| {
        error(ErrorKind::Parse {
            path: path.display().to_string(),
            config_kind,
            source,
        })
    })
}

fn deserialize<T: Config>(table: Table) -> Result<T> {
    toml::Value::Table(table).try_into().map_err(|source| Error {
        name: T::PATH,
        kind: ErrorKind::Deserialize(source),
    })
}

/// Merge `overlay` into `main`.
///
/// Tables present in both are merged recursively, any other value in `overlay` replaces the
/// one in `main`. Keys that only exist in `overlay` are kept, so a misspelled overlay key is
/// caught when deserializing into a struct that denies unknown fields.
#[must_use]
pub fn merge_tables(mut main: Table, overlay: Table) -> Table {
    for (key, overlay_value) in overlay {
        let merged = match (main.remove(&key), overlay_value) {
            (Some(toml::Value::Table(main_table)), toml::Value::Table(overlay_table)) => {
                toml::Value::Table(merge_tables(main_table, overlay_table))
            }
            (_, overlay_value) => overlay_value,
        };

        main.insert(key, merged);
    }

    main
}
