//! Target server environment: which core runs and on which game version.

mod store;

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::PacmineError;

pub use store::EnvStore;

/// Server runtime or mod loader family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Core {
    Velocity,
    Bungeecord,
    Bukkit,
    Spigot,
    Paper,
    Purpur,
    Fabric,
    Forge,
    Neoforge,
    Quilt,
}

impl Core {
    pub const ALL: [Core; 10] = [
        Core::Velocity,
        Core::Bungeecord,
        Core::Bukkit,
        Core::Spigot,
        Core::Paper,
        Core::Purpur,
        Core::Fabric,
        Core::Forge,
        Core::Neoforge,
        Core::Quilt,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Core::Velocity => "velocity",
            Core::Bungeecord => "bungeecord",
            Core::Bukkit => "bukkit",
            Core::Spigot => "spigot",
            Core::Paper => "paper",
            Core::Purpur => "purpur",
            Core::Fabric => "fabric",
            Core::Forge => "forge",
            Core::Neoforge => "neoforge",
            Core::Quilt => "quilt",
        }
    }

    /// Loader names whose artifacts this core can run, itself first.
    pub fn loader_categories(&self) -> &'static [&'static str] {
        match self {
            Core::Velocity => &["velocity"],
            Core::Bungeecord => &["bungeecord"],
            Core::Bukkit => &["bukkit"],
            Core::Spigot => &["spigot", "bukkit"],
            Core::Paper => &["paper", "spigot", "bukkit"],
            Core::Purpur => &["purpur", "paper", "spigot", "bukkit"],
            Core::Fabric => &["fabric"],
            Core::Forge => &["forge"],
            Core::Neoforge => &["neoforge"],
            Core::Quilt => &["quilt", "fabric"],
        }
    }

    pub fn is_mod_loader(&self) -> bool {
        matches!(
            self,
            Core::Fabric | Core::Forge | Core::Neoforge | Core::Quilt
        )
    }

    /// Directory (relative to the server root) the core loads artifacts from.
    pub fn install_dir_name(&self) -> &'static str {
        if self.is_mod_loader() { "mods" } else { "plugins" }
    }
}

impl fmt::Display for Core {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Core {
    type Err = PacmineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_lowercase();
        Core::ALL
            .into_iter()
            .find(|core| core.as_str() == wanted)
            .ok_or_else(|| {
                let known: Vec<&str> = Core::ALL.iter().map(Core::as_str).collect();
                PacmineError::UnsupportedCore(s.to_string(), known.join(", "))
            })
    }
}

/// Persisted `{version, core}` selection for one server directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Environment {
    /// Target game version, e.g. "1.20.1". Empty means "latest available".
    pub version: String,
    pub core: Core,
}

impl Environment {
    pub fn new(version: impl Into<String>, core: Core) -> Self {
        Self {
            version: version.into(),
            core,
        }
    }
}
