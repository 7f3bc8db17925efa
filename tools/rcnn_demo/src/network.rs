use std::path::{Path, PathBuf};

use clap::ValueEnum;
use strum::{Display, EnumIter};

/// Backbone a set of network outputs was produced with.
///
/// Each backbone may ship an overlay config in `<config_dir>/overlay/<network>/`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum, Display, EnumIter)]
pub enum Network {
    #[value(name = "vgg16")]
    #[strum(serialize = "vgg16")]
    Vgg16,
    #[value(name = "resnet50")]
    #[strum(serialize = "resnet50")]
    Resnet50,
    #[value(name = "resnet101")]
    #[strum(serialize = "resnet101")]
    Resnet101,
}

impl Network {
    /// Directory holding the overlay configs of this network.
    #[must_use]
    pub fn overlay_dir(self, config_dir: &Path) -> PathBuf {
        config_dir.join("overlay").join(self.to_string())
    }
}
