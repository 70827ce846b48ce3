//! Server configuration, read from a JSON file at startup.

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use ashfall_core::config::{SpawnPoint, ZoneConfig};
use ashfall_core::constants::TICK_RATE;
use ashfall_core::types::Position;

use crate::error::ServerError;

/// Environment variable consulted when no config path is given on the
/// command line.
pub const CONFIG_ENV: &str = "ASHFALL_CONFIG";

/// One minute at the fixed tick rate.
pub const DEFAULT_AUTOSAVE_TICKS: u64 = 60 * TICK_RATE as u64;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub zones: Vec<ZoneConfig>,
    /// JSON definition tables. The built-in tables are used when unset.
    pub definitions: Option<PathBuf>,
    /// Ticks between autosaves of every character in a zone. Zero disables
    /// autosave; characters are still saved when they leave.
    pub autosave_interval_ticks: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            zones: vec![starter_zone()],
            definitions: None,
            autosave_interval_ticks: DEFAULT_AUTOSAVE_TICKS,
        }
    }
}

impl ServerConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ServerError> {
        let config: ServerConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: &Path) -> Result<Self, ServerError> {
        let json = std::fs::read_to_string(path).map_err(|source| ServerError::ConfigIo {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&json)
    }

    /// Load from the path named by the first CLI argument or `ASHFALL_CONFIG`,
    /// falling back to the defaults when neither is set.
    pub fn from_args_or_env(arg: Option<String>) -> Result<Self, ServerError> {
        match config_path(arg, std::env::var(CONFIG_ENV).ok()) {
            Some(path) => Self::load(&path),
            None => {
                tracing::info!("no config file given, using defaults");
                Ok(Self::default())
            }
        }
    }

    fn validate(&self) -> Result<(), ServerError> {
        let mut seen = HashSet::new();
        for zone in &self.zones {
            if !seen.insert(zone.zone_id) {
                return Err(ServerError::DuplicateZone(zone.zone_id));
            }
        }
        Ok(())
    }
}

/// The CLI argument wins over the environment.
pub fn config_path(arg: Option<String>, env: Option<String>) -> Option<PathBuf> {
    arg.or(env)
        .filter(|path| !path.trim().is_empty())
        .map(PathBuf::from)
}

/// A small zone populated from the built-in monster table.
fn starter_zone() -> ZoneConfig {
    let point = |type_id, x, z, respawn_delay| SpawnPoint {
        type_id,
        origin: Position::ground(x, z),
        respawn_delay,
    };
    ZoneConfig {
        spawn_points: vec![
            point(1, 20.0, 10.0, 10.0),
            point(1, 24.0, 14.0, 10.0),
            point(2, -18.0, 22.0, 15.0),
            point(3, 40.0, -35.0, 45.0),
        ],
        ..ZoneConfig::default()
    }
}
