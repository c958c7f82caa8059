//! # Core models for pfmscan
//!
//! Shared building blocks for the pfmscan workspace:
//!
//! - [`models::Motif`]: a position frequency matrix with an identifier
//! - [`models::Region`]: a `chr:start-end` genomic interval
//! - [`models::Sequence`] and [`models::SequenceSet`]: named residues, loaded from FASTA, BED
//!   or region lists
//! - [`models::Genome`]: an in-memory reference used to resolve regions
//!
//! # Example
//!
//! ```no_run
//! use std::path::Path;
//! use pfmscan_core::models::{Genome, SequenceSet};
//!
//! let genome = Genome::try_from("hg38.fa").unwrap();
//! let seqs = SequenceSet::from_input(Path::new("peaks.bed"), Some(&genome)).unwrap();
//! println!("median length: {}", seqs.median_length().unwrap());
//! ```
pub mod errors;
pub mod models;
pub mod utils;

// re-exports
pub use errors::{CoreError, Result};
