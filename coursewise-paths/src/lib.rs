//! XDG Base Directory paths for coursewise.
//!
//! The CLI and server resolve their config file and the preference database
//! through XDG paths on every platform, the same way tools like gh and
//! kubectl do.

use std::path::PathBuf;

/// Application directory name shared by config and data paths.
const APP_DIR: &str = "coursewise";

/// File name of the preference database inside [`data_dir`].
pub const STORE_FILE: &str = "coursewise.db";

/// Get the coursewise config directory.
///
/// Returns `$XDG_CONFIG_HOME/coursewise` if set, otherwise `~/.config/coursewise`.
///
/// # Examples
///
/// ```
/// use coursewise_paths::config_dir;
///
/// let config = config_dir();
/// let file = config.join("config.toml");
/// ```
pub fn config_dir() -> PathBuf {
    if let Ok(xdg_config) = std::env::var("XDG_CONFIG_HOME") {
        PathBuf::from(xdg_config).join(APP_DIR)
    } else if let Some(home) = dirs::home_dir() {
        home.join(".config").join(APP_DIR)
    } else {
        PathBuf::from(".config").join(APP_DIR)
    }
}

/// Get the coursewise data directory.
///
/// Returns `$XDG_DATA_HOME/coursewise` if set, otherwise `~/.local/share/coursewise`.
/// User profiles and the interaction log live here.
pub fn data_dir() -> PathBuf {
    if let Ok(xdg_data) = std::env::var("XDG_DATA_HOME") {
        PathBuf::from(xdg_data).join(APP_DIR)
    } else if let Some(home) = dirs::home_dir() {
        home.join(".local/share").join(APP_DIR)
    } else {
        PathBuf::from(".local/share").join(APP_DIR)
    }
}

/// Path of the user config file.
pub fn config_file() -> PathBuf {
    config_dir().join("config.toml")
}

/// Default location of the preference database.
pub fn default_store_path() -> PathBuf {
    data_dir().join(STORE_FILE)
}
