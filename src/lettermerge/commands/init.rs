use crate::commands::{CmdMessage, CmdResult, MergePaths};
use crate::config::MergeConfig;
use crate::error::Result;
use crate::store::DataStore;
use std::fs;

/// Creates the data directory and writes default config and categories
/// where none exist yet. Existing files are left alone.
pub fn run<S: DataStore>(store: &mut S, paths: &MergePaths) -> Result<CmdResult> {
    let dir = &paths.data_dir;
    fs::create_dir_all(dir)?;

    if !dir.join("config.json").exists() {
        MergeConfig::default().save(dir)?;
    }
    let categories = store.load_categories()?;
    store.save_categories(&categories)?;

    let mut result = CmdResult::default();
    result.add_message(CmdMessage::success(format!(
        "Initialized lettermerge store at {}",
        dir.display()
    )));
    Ok(result)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::fs::FileStore;
    use tempfile::TempDir;

    #[test]
    fn creates_config_and_categories() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().join("data");
        let paths = MergePaths::new(&dir);
        let mut store = FileStore::new(&dir);

        run(&mut store, &paths).unwrap();
        assert!(dir.join("config.json").exists());
        assert!(dir.join("categories.json").exists());
    }

    #[test]
    fn keeps_existing_config() {
        let temp = TempDir::new().unwrap();
        let paths = MergePaths::new(temp.path());
        let mut config = MergeConfig::default();
        config.set("signature", "Regards,").unwrap();
        config.save(temp.path()).unwrap();

        let mut store = FileStore::new(temp.path());
        run(&mut store, &paths).unwrap();
        assert_eq!(MergeConfig::load(temp.path()).unwrap().signature, "Regards,");
    }
}
