//! The scanning engine contract.
//!
//! The scan entry points drive an engine through [`ScanEngine`] only: they configure it in
//! the fixed order motifs, genome, background, threshold and then consume exactly one result
//! stream. [`PwmScanner`] is the engine bundled with this crate.
use std::fmt::{self, Display};
use std::path::Path;
use std::sync::Arc;

use pfmscan_core::models::{Genome, Motif, SequenceSet};

use crate::errors::{Result, ScanError};

pub mod model;
pub mod pwm;
#[cfg(test)]
pub(crate) mod recording;

pub use pwm::PwmScanner;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strand {
    Forward,
    Reverse,
}

impl Strand {
    pub fn as_i8(&self) -> i8 {
        match self {
            Strand::Forward => 1,
            Strand::Reverse => -1,
        }
    }
}

impl TryFrom<i8> for Strand {
    type Error = ScanError;

    fn try_from(value: i8) -> Result<Self> {
        match value {
            1 => Ok(Strand::Forward),
            -1 => Ok(Strand::Reverse),
            _ => Err(ScanError::InvalidInput(format!("invalid strand: {}", value))),
        }
    }
}

impl Display for Strand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Strand::Forward => write!(f, "+"),
            Strand::Reverse => write!(f, "-"),
        }
    }
}

///
/// One motif occurrence: score, 0-based offset into the sequence and strand.
///
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Match {
    pub score: f64,
    pub pos: usize,
    pub strand: Strand,
}

impl Match {
    pub fn new(score: f64, pos: usize, strand: Strand) -> Self {
        Match { score, pos, strand }
    }
}

/// Per motif, in motif order, the matches of one sequence.
pub type ScanResult = Vec<Vec<Match>>;

///
/// A finite, single-pass stream of per-sequence results, in input order.
///
/// The stream is consumed exactly once; it cannot be cloned or restarted. Each item is the
/// result for one input sequence, or the engine error that ended the stream.
///
pub struct ResultStream<'a, T> {
    inner: Box<dyn Iterator<Item = Result<T>> + 'a>,
}

impl<'a, T> ResultStream<'a, T> {
    pub fn new<I>(iter: I) -> Self
    where
        I: Iterator<Item = Result<T>> + 'a,
    {
        ResultStream {
            inner: Box::new(iter),
        }
    }

    /// A stream over results that were already computed.
    pub fn from_results(results: Vec<T>) -> Self
    where
        T: 'a,
    {
        ResultStream::new(results.into_iter().map(Ok))
    }
}

impl<T> Iterator for ResultStream<'_, T> {
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        self.inner.next()
    }
}

///
/// A motif scanning engine.
///
/// Configuration calls are made once per entry point, in this order: [`set_motifs`],
/// [`set_genome`], [`set_background`], [`set_threshold`]. An FPR based threshold depends on
/// the background, which must therefore be set first.
///
/// [`set_motifs`]: ScanEngine::set_motifs
/// [`set_genome`]: ScanEngine::set_genome
/// [`set_background`]: ScanEngine::set_background
/// [`set_threshold`]: ScanEngine::set_threshold
pub trait ScanEngine {
    fn set_motifs(&mut self, motifs: &[Motif]) -> Result<()>;

    /// Genome used to resolve regions and to draw background sequences.
    fn set_genome(&mut self, genome: Option<Arc<Genome>>) -> Result<()>;

    /// Background sequences from a FASTA file, or `size` bp windows drawn from a genome.
    /// With `gc`, the background is stratified by GC content.
    fn set_background(
        &mut self,
        bgfile: Option<&Path>,
        genome: Option<Arc<Genome>>,
        size: usize,
        gc: bool,
    ) -> Result<()>;

    /// Detection threshold from a false positive rate, or from an explicit cutoff which
    /// takes precedence.
    fn set_threshold(&mut self, fpr: Option<f64>, threshold: Option<f64>) -> Result<()>;

    /// Motif ids in the fixed motif order.
    fn motif_ids(&self) -> Vec<String>;

    /// Per sequence, the number of matches of each motif, capped at `nreport`.
    fn count<'a>(
        &'a self,
        seqs: &'a SequenceSet,
        nreport: usize,
        scan_rc: bool,
    ) -> Result<ResultStream<'a, Vec<usize>>>;

    /// Per sequence, the best score of each motif. Never thresholded.
    fn best_score<'a>(
        &'a self,
        seqs: &'a SequenceSet,
        scan_rc: bool,
        zscore: bool,
        gc: bool,
    ) -> Result<ResultStream<'a, Vec<f64>>>;

    /// Per sequence, the best match of each motif, on either strand. `None` when the
    /// sequence is shorter than the motif.
    fn best_match<'a>(
        &'a self,
        seqs: &'a SequenceSet,
        zscore: bool,
        gc: bool,
    ) -> Result<ResultStream<'a, Vec<Option<Match>>>>;

    /// Per sequence, up to `nreport` matches above the threshold for each motif, best first.
    fn scan<'a>(
        &'a self,
        seqs: &'a SequenceSet,
        nreport: usize,
        scan_rc: bool,
        zscore: bool,
        gc: bool,
    ) -> Result<ResultStream<'a, ScanResult>>;
}
