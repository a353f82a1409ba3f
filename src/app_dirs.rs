use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "typequote";

/// Centralized application directory resolution. Falls back to the working
/// directory when the platform has no home.
pub struct AppDirs;

impl AppDirs {
    fn project() -> Option<ProjectDirs> {
        ProjectDirs::from("", "", APP_NAME)
    }

    pub fn config_path() -> PathBuf {
        Self::project()
            .map(|pd| pd.config_dir().join("config.json"))
            .unwrap_or_else(|| PathBuf::from(format!("{APP_NAME}_config.json")))
    }

    pub fn history_path() -> PathBuf {
        Self::project()
            .map(|pd| pd.data_local_dir().join("history.csv"))
            .unwrap_or_else(|| PathBuf::from(format!("{APP_NAME}_history.csv")))
    }

    pub fn log_path() -> PathBuf {
        Self::project()
            .map(|pd| pd.data_local_dir().join(format!("{APP_NAME}.log")))
            .unwrap_or_else(|| PathBuf::from(format!("{APP_NAME}.log")))
    }
}
