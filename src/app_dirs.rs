use directories::ProjectDirs;
use std::path::PathBuf;

pub const CONFIG_ENV: &str = "BACKAT_CONFIG";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    pub fn config_path() -> Option<PathBuf> {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return Some(PathBuf::from(path));
        }
        ProjectDirs::from("", "", "backat").map(|pd| pd.config_dir().join("config.json"))
    }
}
