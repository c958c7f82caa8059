//! Scan sequences for motif occurrences.
//!
//! This crate drives a motif scanning engine and renders what it finds. There are three entry
//! points, sharing one setup sequence (resolve the motifs, configure the engine with motifs,
//! genome, background and threshold, then consume one result stream):
//!
//! - [`scan_to_file`]: stream annotation lines (GFF-like or BED) or a count/score table to
//!   stdout, a file or any writer
//! - [`scan_regionfile_to_table`]: build a region by motif table of counts or scores
//! - [`scan_to_best_match`]: collect the best score or match of each motif per sequence
//!
//! Each entry point has a `_with` variant taking any [`ScanEngine`]; the plain variants use
//! the bundled [`PwmScanner`].
//!
//! # Example
//!
//! ```no_run
//! use pfmscan_scanner::{scan_to_file, OutputMode, OutputTarget, ScanOptions};
//! use pfmscan_scanner::formatter::AnnotationFormat;
//!
//! let options = ScanOptions {
//!     mode: OutputMode::Annotation { format: AnnotationFormat::Bed, nreport: 1 },
//!     genome: Some("hg38.fa".into()),
//!     ..Default::default()
//! };
//! scan_to_file("peaks.bed", "motifs.pfm", OutputTarget::Stdout, &options).unwrap();
//! ```
pub mod aggregate;
pub mod background;
pub mod config;
pub mod consts;
pub mod engine;
pub mod errors;
pub mod formatter;
pub mod motifs;
pub mod pipeline;
pub mod table;

// re-exports
pub use aggregate::{BestBy, BestMatchOptions, BestMatches, scan_to_best_match};
pub use config::MotifConfig;
pub use engine::{Match, PwmScanner, ScanEngine, Strand};
pub use errors::{Result, ScanError};
pub use motifs::{MotifInput, MotifSource, check_motifs};
pub use pipeline::{OutputMode, OutputTarget, ScanOptions, scan_to_file};
pub use table::{MotifTable, TableOptions, TableScoring, scan_regionfile_to_table};
