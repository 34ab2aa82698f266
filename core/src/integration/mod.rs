//! Integration tests for the retrogym environment layer
//!
//! Tests full episodes across the collaborators, journal recording and
//! rotation, and deterministic replay.


#[cfg(test)]
pub(crate) mod test_utils {
    use tempfile::TempDir;

    use crate::config::EnvConfig;
    use crate::test_utils::level1_config;

    /// `Level1` config recording into a fresh temporary directory
    pub fn recording_config() -> (TempDir, EnvConfig) {
        let temp = TempDir::new().unwrap();
        let mut config = level1_config();
        config.record = Some(temp.path().to_path_buf());
        (temp, config)
    }

    /// Journal file names in `dir`, sorted
    pub fn journal_names(dir: &std::path::Path) -> Vec<String> {
        let mut names: Vec<String> = std::fs::read_dir(dir)
            .unwrap()
            .map(|entry| entry.unwrap().file_name().to_string_lossy().into_owned())
            .collect();
        names.sort();
        names
    }
}
