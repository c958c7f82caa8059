//! Best score or best match of every motif in every sequence.
use std::path::{Path, PathBuf};

use log::debug;

use pfmscan_core::models::SequenceSet;

use crate::config::MotifConfig;
use crate::engine::{Match, PwmScanner, ScanEngine};
use crate::errors::Result;
use crate::motifs::{MotifInput, check_motifs};
use crate::pipeline::{configure_background, load_genome};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum BestBy {
    Score,
    #[default]
    Match,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BestMatchOptions {
    pub best_by: BestBy,
    pub genome: Option<PathBuf>,
    pub zscore: bool,
    pub gc: bool,
    pub ncpus: Option<usize>,
    pub seed: Option<u64>,
    pub progress: bool,
    pub motif_config: MotifConfig,
}

impl Default for BestMatchOptions {
    fn default() -> Self {
        BestMatchOptions {
            best_by: BestBy::default(),
            genome: None,
            zscore: false,
            gc: false,
            ncpus: None,
            seed: None,
            progress: false,
            motif_config: MotifConfig::default(),
        }
    }
}

///
/// Per motif, in motif order, one value per input sequence in input order.
///
#[derive(Debug, Clone, PartialEq)]
pub struct PerMotif<T> {
    entries: Vec<(String, Vec<T>)>,
}

impl<T> PerMotif<T> {
    fn new(ids: Vec<String>) -> Self {
        PerMotif {
            entries: ids.into_iter().map(|id| (id, Vec::new())).collect(),
        }
    }

    fn push_row(&mut self, row: Vec<T>) {
        for ((_, values), value) in self.entries.iter_mut().zip(row) {
            values.push(value);
        }
    }

    pub fn get(&self, motif: &str) -> Option<&[T]> {
        self.entries
            .iter()
            .find(|(id, _)| id == motif)
            .map(|(_, values)| values.as_slice())
    }

    pub fn motif_ids(&self) -> Vec<&str> {
        self.entries.iter().map(|(id, _)| id.as_str()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &[T])> {
        self.entries
            .iter()
            .map(|(id, values)| (id.as_str(), values.as_slice()))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BestMatches {
    Scores(PerMotif<f64>),
    /// `None` for a sequence shorter than the motif.
    Matches(PerMotif<Option<Match>>),
}

impl BestMatches {
    pub fn motif_ids(&self) -> Vec<&str> {
        match self {
            BestMatches::Scores(s) => s.motif_ids(),
            BestMatches::Matches(m) => m.motif_ids(),
        }
    }
}

///
/// Best score or best match of every motif in every sequence of a file. No detection
/// threshold applies, so every sequence contributes one value per motif.
///
/// # Arguments
///
/// - input: FASTA file, or BED/region file when a genome is given
/// - motifs: motif list, motif file, or `None` for the configured default database
/// - options: best match options
///
pub fn scan_to_best_match(
    input: impl AsRef<Path>,
    motifs: impl Into<MotifInput>,
    options: &BestMatchOptions,
) -> Result<BestMatches> {
    let mut engine = PwmScanner::new(options.ncpus, options.seed, options.progress)?;
    scan_to_best_match_with(&mut engine, input, motifs, options)
}

///
/// [`scan_to_best_match`] with a caller provided engine.
///
pub fn scan_to_best_match_with<E: ScanEngine + ?Sized>(
    engine: &mut E,
    input: impl AsRef<Path>,
    motifs: impl Into<MotifInput>,
    options: &BestMatchOptions,
) -> Result<BestMatches> {
    let input = input.as_ref();
    let source = check_motifs(motifs.into(), &options.motif_config)?;
    let motifs = source.load()?;
    let genome = load_genome(options.genome.as_deref())?;

    engine.set_motifs(&motifs)?;
    engine.set_genome(genome.clone())?;

    let seqs = SequenceSet::from_input(input, genome.as_deref())?;
    if options.zscore {
        configure_background(
            engine,
            genome.as_ref(),
            None,
            || Ok(seqs.median_length()?),
            options.gc,
        )?;
    }
    engine.set_threshold(None, Some(0.0))?;

    debug!("Scanning {}", input.display());
    let ids = engine.motif_ids();
    match options.best_by {
        BestBy::Score => {
            let mut result = PerMotif::new(ids);
            for scores in engine.best_score(&seqs, true, options.zscore, options.gc)? {
                result.push_row(scores?);
            }
            Ok(BestMatches::Scores(result))
        }
        BestBy::Match => {
            let mut result = PerMotif::new(ids);
            for matches in engine.best_match(&seqs, options.zscore, options.gc)? {
                result.push_row(matches?);
            }
            Ok(BestMatches::Matches(result))
        }
    }
}
