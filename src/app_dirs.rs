use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "wordsprint";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// `$HOME/.local/state/wordsprint`, or the platform data dir without HOME
    pub fn state_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join(APP_NAME),
            )
        } else {
            ProjectDirs::from("", "", APP_NAME).map(|pd| pd.data_local_dir().to_path_buf())
        }
    }

    pub fn config_path() -> PathBuf {
        ProjectDirs::from("", "", APP_NAME)
            .map(|pd| pd.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from("wordsprint_config.json"))
    }

    pub fn users_db_path() -> PathBuf {
        Self::in_state_dir("users.db")
    }

    pub fn history_path() -> PathBuf {
        Self::in_state_dir("history.csv")
    }

    pub fn log_path() -> PathBuf {
        Self::in_state_dir("wordsprint.log")
    }

    fn in_state_dir(file_name: &str) -> PathBuf {
        Self::state_dir()
            .map(|dir| dir.join(file_name))
            .unwrap_or_else(|| PathBuf::from(file_name))
    }
}
