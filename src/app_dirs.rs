use directories::ProjectDirs;
use std::path::PathBuf;

const APP_NAME: &str = "activity-timeline";

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    /// Directory backing the local session store
    pub fn storage_dir() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            Some(
                PathBuf::from(home)
                    .join(".local")
                    .join("state")
                    .join(APP_NAME),
            )
        } else {
            ProjectDirs::from("", "", APP_NAME).map(|proj_dirs| proj_dirs.data_local_dir().to_path_buf())
        }
    }
}
