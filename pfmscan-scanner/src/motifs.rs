//! Resolution of the motif source of a scan.
use std::fmt::{self, Display};
use std::path::{Path, PathBuf};

use pfmscan_core::models::Motif;
use pfmscan_core::utils::read_motifs;

use crate::config::MotifConfig;
use crate::errors::{Result, ScanError};

///
/// Motif source as requested by a caller.
///
#[derive(Debug, Clone, PartialEq, Default)]
pub enum MotifInput {
    /// Motifs that are already in memory.
    Motifs(Vec<Motif>),
    /// A motif file, taken literally.
    Path(String),
    /// Use the default motif database of the configuration.
    #[default]
    Default,
}

impl From<Vec<Motif>> for MotifInput {
    fn from(value: Vec<Motif>) -> Self {
        MotifInput::Motifs(value)
    }
}

impl From<&str> for MotifInput {
    fn from(value: &str) -> Self {
        MotifInput::Path(value.to_string())
    }
}

impl From<String> for MotifInput {
    fn from(value: String) -> Self {
        MotifInput::Path(value)
    }
}

impl From<&Path> for MotifInput {
    fn from(value: &Path) -> Self {
        MotifInput::Path(value.to_string_lossy().into_owned())
    }
}

impl From<PathBuf> for MotifInput {
    fn from(value: PathBuf) -> Self {
        MotifInput::from(value.as_path())
    }
}

impl<T: Into<MotifInput>> From<Option<T>> for MotifInput {
    fn from(value: Option<T>) -> Self {
        value.map_or(MotifInput::Default, Into::into)
    }
}

///
/// A validated motif source: either in-memory motifs or an existing motif file.
///
#[derive(Debug, Clone, PartialEq)]
pub enum MotifSource {
    Motifs(Vec<Motif>),
    File(PathBuf),
}

impl MotifSource {
    ///
    /// Materialize the motifs, reading the file when needed. Motif order is the order of the
    /// list or of the file and is kept by every consumer.
    ///
    pub fn load(&self) -> Result<Vec<Motif>> {
        match self {
            MotifSource::Motifs(motifs) => Ok(motifs.clone()),
            MotifSource::File(path) => {
                let motifs = read_motifs(path)?;
                if motifs.is_empty() {
                    return Err(ScanError::InvalidInput(format!(
                        "no motifs found in {}",
                        path.display()
                    )));
                }
                Ok(motifs)
            }
        }
    }
}

impl Display for MotifSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MotifSource::File(path) => write!(f, "{}", path.display()),
            MotifSource::Motifs(motifs) => {
                let ids: Vec<&str> = motifs.iter().map(|m| m.id()).collect();
                write!(f, "{}", ids.join(","))
            }
        }
    }
}

///
/// Check the motif source of a scan and normalize it.
///
/// A list is accepted when its first element is a valid motif; the rest of the list is not
/// inspected. A path is taken literally, and without a source the default database of the
/// configuration is used. Resolved paths must exist.
///
/// # Arguments
///
/// - input: the requested motif source
/// - config: configuration providing the default motif database
///
pub fn check_motifs(input: MotifInput, config: &MotifConfig) -> Result<MotifSource> {
    let path = match input {
        MotifInput::Motifs(motifs) => {
            return match motifs.first() {
                Some(first) if first.is_valid() => Ok(MotifSource::Motifs(motifs)),
                Some(_) => Err(ScanError::InvalidMotifInput(
                    "The input list does not contain valid motifs".to_string(),
                )),
                None => Err(ScanError::InvalidMotifInput(
                    "The input list of motifs is empty".to_string(),
                )),
            };
        }
        MotifInput::Path(path) => PathBuf::from(path),
        MotifInput::Default => {
            let motif_db = config
                .default_motif_db()
                .ok_or(ScanError::NoDefaultMotifDatabase)?;
            config.motif_dir().join(motif_db)
        }
    };

    if !path.exists() {
        return Err(ScanError::MotifFileNotFound(path));
    }

    Ok(MotifSource::File(path))
}
