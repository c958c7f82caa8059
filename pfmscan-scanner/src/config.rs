//! Motif database configuration.
//!
//! The configuration is loaded once per invocation and passed explicitly to the motif
//! resolver; nothing reads it from global state afterwards.
//!
//! ```toml
//! motif_db = "JASPAR2024_vertebrates.pfm"
//! motif_dir = "~/.pfmscan/motif_databases"
//! ```
use std::env;
use std::fs::read_to_string;
use std::path::{Path, PathBuf};

use dirs::{config_dir, home_dir};
use serde::{Deserialize, Serialize};

use crate::consts::{
    DEFAULT_CONFIG_FILE, DEFAULT_MOTIF_SUBFOLDER, PFMSCAN_CONFIG_ENV, PFMSCAN_MOTIF_DB_ENV,
    PFMSCAN_MOTIF_DIR_ENV,
};
use crate::errors::{Result, ScanError};

#[derive(Deserialize, Serialize, Debug, Clone, PartialEq)]
pub struct MotifConfig {
    /// File name of the default motif database, relative to `motif_dir`.
    pub motif_db: Option<String>,

    /// Directory holding the motif databases.
    #[serde(default = "get_default_motif_dir")]
    pub motif_dir: PathBuf,
}

impl Default for MotifConfig {
    fn default() -> Self {
        MotifConfig {
            motif_db: None,
            motif_dir: get_default_motif_dir(),
        }
    }
}

impl TryFrom<&Path> for MotifConfig {
    type Error = ScanError;

    fn try_from(path: &Path) -> Result<Self> {
        let toml_str = read_to_string(path)?;
        let mut config: MotifConfig = toml::from_str(&toml_str).map_err(|e| ScanError::Config {
            path: path.display().to_string(),
            message: e.to_string(),
        })?;
        config.motif_dir = expand_path(&config.motif_dir);
        Ok(config)
    }
}

impl MotifConfig {
    pub fn new(motif_db: Option<String>, motif_dir: impl Into<PathBuf>) -> Self {
        MotifConfig {
            motif_db,
            motif_dir: expand_path(&motif_dir.into()),
        }
    }

    ///
    /// Load the configuration of this process: the config file named by `PFMSCAN_CONFIG`
    /// (or the user config file when present), then the `PFMSCAN_MOTIF_DB` and
    /// `PFMSCAN_MOTIF_DIR` overrides.
    ///
    pub fn load() -> Result<Self> {
        let explicit = env::var(PFMSCAN_CONFIG_ENV).ok().map(PathBuf::from);
        let config_file = match explicit {
            Some(path) => Some(path),
            None => config_dir()
                .map(|dir| dir.join(DEFAULT_CONFIG_FILE))
                .filter(|path| path.exists()),
        };

        Self::from_sources(
            config_file.as_deref(),
            env::var(PFMSCAN_MOTIF_DB_ENV).ok(),
            env::var(PFMSCAN_MOTIF_DIR_ENV).ok(),
        )
    }

    ///
    /// Build a configuration from an optional config file and optional overrides, later
    /// sources winning.
    ///
    pub fn from_sources(
        config_file: Option<&Path>,
        motif_db: Option<String>,
        motif_dir: Option<String>,
    ) -> Result<Self> {
        let mut config = match config_file {
            Some(path) => MotifConfig::try_from(path)?,
            None => MotifConfig::default(),
        };

        if let Some(db) = motif_db.filter(|db| !db.is_empty()) {
            config.motif_db = Some(db);
        }
        if let Some(dir) = motif_dir.filter(|dir| !dir.is_empty()) {
            config.motif_dir = expand_path(Path::new(&dir));
        }

        Ok(config)
    }

    pub fn default_motif_db(&self) -> Option<&str> {
        self.motif_db.as_deref()
    }

    pub fn motif_dir(&self) -> &Path {
        &self.motif_dir
    }
}

/// Get default motif folder, `~/.pfmscan/motif_databases`
pub fn get_default_motif_dir() -> PathBuf {
    let home = home_dir().unwrap_or_else(|| PathBuf::from("/tmp"));
    home.join(DEFAULT_MOTIF_SUBFOLDER)
}

fn expand_path(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&raw).into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    use pretty_assertions::assert_eq;
    use rstest::rstest;
    use tempfile::NamedTempFile;

    #[rstest]
    fn test_try_from_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "motif_db = \"test.pfm\"\nmotif_dir = \"/data/motifs\"").unwrap();

        let config = MotifConfig::try_from(file.path()).unwrap();
        assert_eq!(config.default_motif_db(), Some("test.pfm"));
        assert_eq!(config.motif_dir(), Path::new("/data/motifs"));
    }

    #[rstest]
    fn test_missing_motif_dir_uses_default() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "motif_db = \"test.pfm\"").unwrap();

        let config = MotifConfig::try_from(file.path()).unwrap();
        assert_eq!(config.motif_dir, get_default_motif_dir());
    }

    #[rstest]
    fn test_invalid_toml() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "motif_db = [").unwrap();

        let result = MotifConfig::try_from(file.path());
        assert!(matches!(result, Err(ScanError::Config { .. })));
    }

    #[rstest]
    fn test_overrides_win() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "motif_db = \"file.pfm\"\nmotif_dir = \"/from/file\"").unwrap();

        let config = MotifConfig::from_sources(
            Some(file.path()),
            Some("env.pfm".to_string()),
            Some("/from/env".to_string()),
        )
        .unwrap();
        assert_eq!(config.default_motif_db(), Some("env.pfm"));
        assert_eq!(config.motif_dir(), Path::new("/from/env"));
    }

    #[rstest]
    fn test_no_sources_has_no_default_db() {
        let config = MotifConfig::from_sources(None, None, Some(String::new())).unwrap();
        assert_eq!(config, MotifConfig::default());
    }
}
