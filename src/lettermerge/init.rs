use crate::api::{MergeApi, MergePaths};
use crate::config::MergeConfig;
use crate::error::{MergeError, Result};
use crate::store::fs::FileStore;
use directories::ProjectDirs;
use std::path::{Path, PathBuf};

/// Overrides the data directory when `--data-dir` is not given.
pub const HOME_ENV: &str = "LETTERMERGE_HOME";

pub struct MergeContext {
    pub api: MergeApi<FileStore>,
    pub config: MergeConfig,
}

/// Picks the data directory: the explicit flag, then `$LETTERMERGE_HOME`,
/// then the platform data directory.
pub fn resolve_data_dir(explicit: Option<&Path>, env_value: Option<&str>) -> Result<PathBuf> {
    if let Some(dir) = explicit {
        return Ok(dir.to_path_buf());
    }
    if let Some(dir) = env_value.filter(|v| !v.trim().is_empty()) {
        return Ok(PathBuf::from(dir));
    }
    ProjectDirs::from("com", "lettermerge", "lettermerge")
        .map(|dirs| dirs.data_dir().to_path_buf())
        .ok_or_else(|| MergeError::Store("Could not determine a data directory".to_string()))
}

pub fn initialize(data_dir: PathBuf) -> Result<MergeContext> {
    let config = match MergeConfig::load(&data_dir) {
        Ok(config) => config,
        Err(e) => {
            tracing::warn!(error = %e, "unreadable config, using defaults");
            MergeConfig::default()
        }
    };
    tracing::debug!(data_dir = %data_dir.display(), "initializing");

    let store = FileStore::new(data_dir.clone());
    let api = MergeApi::new(store, MergePaths::new(data_dir));
    Ok(MergeContext { api, config })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn explicit_dir_wins() {
        let dir = resolve_data_dir(Some(Path::new("/a")), Some("/b")).unwrap();
        assert_eq!(dir, PathBuf::from("/a"));
    }

    #[test]
    fn env_is_used_when_no_flag() {
        let dir = resolve_data_dir(None, Some("/b")).unwrap();
        assert_eq!(dir, PathBuf::from("/b"));
    }

    #[test]
    fn blank_env_is_ignored() {
        let dir = resolve_data_dir(None, Some("  "));
        if let Ok(dir) = dir {
            assert_ne!(dir, PathBuf::from("  "));
        }
    }

    #[test]
    fn initialize_loads_config_from_data_dir() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("config.json"), r#"{"signature": "Yours,"}"#).unwrap();

        let ctx = initialize(temp.path().to_path_buf()).unwrap();
        assert_eq!(ctx.config.signature, "Yours,");
        assert_eq!(ctx.api.paths().data_dir, temp.path());
    }

    #[test]
    fn broken_config_falls_back_to_defaults() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("config.json"), "{{{").unwrap();
        let ctx = initialize(temp.path().to_path_buf()).unwrap();
        assert_eq!(ctx.config, MergeConfig::default());
    }
}
