//! Constants shared by the scan entry points.

/// Version written into the header of every streamed scan.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// False positive rate used when neither a rate nor a cutoff is requested.
pub const DEFAULT_FPR: f64 = 0.01;

/// Matches reported per motif per sequence unless asked otherwise.
pub const DEFAULT_NREPORT: usize = 1;

/// Matches counted per motif per region in a count table.
pub const DEFAULT_COUNT_NREPORT: usize = 100;

/// Regions drawn to estimate a representative background sequence length.
pub const BACKGROUND_SAMPLE_SIZE: usize = 1000;

/// Decimal digits of the scores in a score table.
pub const SCORE_PRECISION: usize = 4;

// annotation output

/// Source column of the 9-field annotation format.
pub const ANNOTATION_SOURCE: &str = "pfmscan";

/// Feature column of the 9-field annotation format.
pub const ANNOTATION_FEATURE: &str = "misc_feature";

// Environment variable names

/// Path of the TOML configuration file.
///
/// # Example
///
/// ```bash
/// export PFMSCAN_CONFIG=/etc/pfmscan/pfmscan.toml
/// ```
pub const PFMSCAN_CONFIG_ENV: &str = "PFMSCAN_CONFIG";

/// Overrides the default motif database file name.
pub const PFMSCAN_MOTIF_DB_ENV: &str = "PFMSCAN_MOTIF_DB";

/// Overrides the directory the default motif database is looked up in.
pub const PFMSCAN_MOTIF_DIR_ENV: &str = "PFMSCAN_MOTIF_DIR";

/// Config file looked up under the user config directory when `PFMSCAN_CONFIG` is unset.
pub const DEFAULT_CONFIG_FILE: &str = "pfmscan/pfmscan.toml";

/// Motif directory under the home folder when nothing else is configured.
pub const DEFAULT_MOTIF_SUBFOLDER: &str = ".pfmscan/motif_databases";
