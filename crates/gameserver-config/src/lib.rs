pub mod deployment;
pub mod error;
pub mod reader;

pub use deployment::DeploymentConfig;
pub use error::*;
pub use reader::ConfigReader;

use std::path::PathBuf;

/// Environment variable naming the config file directly
pub const CONFIG_PATH_ENV: &str = "GAMESERVER_CONFIG_PATH";

const CANDIDATES: [&str; 2] = ["gameserver.local.yaml", "gameserver.yaml"];

/// Directory holding the global config file (`~/.config/gameserver`)
pub fn get_config_dir() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join("gameserver"))
}

/// Locates the deployment config file.
///
/// Search order:
/// 1. `GAMESERVER_CONFIG_PATH` (must exist when set)
/// 2. current directory: gameserver.local.yaml, gameserver.yaml
/// 3. `./.gameserver/` with the same names
/// 4. `~/.config/gameserver/gameserver.yaml`
///
/// Returns `Ok(None)` when nothing is found; every key then takes its default.
pub fn find_config_file() -> Result<Option<PathBuf>> {
    if let Ok(config_path) = std::env::var(CONFIG_PATH_ENV) {
        let path = PathBuf::from(config_path);
        if path.exists() {
            return Ok(Some(path));
        }
        return Err(ConfigError::FileNotFound(path));
    }

    let current_dir = std::env::current_dir()?;

    for filename in &CANDIDATES {
        let path = current_dir.join(filename);
        if path.exists() {
            return Ok(Some(path));
        }
    }

    let project_dir = current_dir.join(".gameserver");
    if project_dir.is_dir() {
        for filename in &CANDIDATES {
            let path = project_dir.join(filename);
            if path.exists() {
                return Ok(Some(path));
            }
        }
    }

    if let Some(config_dir) = get_config_dir() {
        let global_config = config_dir.join("gameserver.yaml");
        if global_config.exists() {
            return Ok(Some(global_config));
        }
    }

    Ok(None)
}
