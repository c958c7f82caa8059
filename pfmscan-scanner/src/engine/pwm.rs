//! Position weight matrix scanner.
use std::path::Path;
use std::sync::Arc;

use indicatif::{ProgressBar, ProgressStyle};
use log::{debug, info};
use rand::rngs::StdRng;
use rayon::prelude::*;
use rayon::{ThreadPool, ThreadPoolBuilder};

use pfmscan_core::models::{Genome, Motif, Sequence, SequenceSet};

use super::model::{Background, MotifModel, MotifStats};
use super::{Match, ResultStream, ScanEngine, ScanResult};
use crate::background::seeded_rng;
use crate::errors::{Result, ScanError};

/// Background sequences drawn from a genome.
pub const DEFAULT_BACKGROUND_SEQS: usize = 1000;

/// Sequences scored per parallel batch of a result stream.
pub const DEFAULT_CHUNK_SIZE: usize = 1024;

///
/// Scores sequences with log-odds position weight matrices.
///
/// Results are produced lazily, one batch of sequences at a time, on a dedicated thread
/// pool. Batches are evaluated in parallel but yielded in input order.
///
pub struct PwmScanner {
    models: Vec<MotifModel>,
    genome: Option<Arc<Genome>>,
    background: Option<Background>,
    stats: Option<Vec<MotifStats>>,
    thresholds: Option<Vec<f64>>,
    pool: ThreadPool,
    rng: StdRng,
    progress: bool,
    background_seqs: usize,
    chunk_size: usize,
}

impl PwmScanner {
    ///
    /// Create a scanner.
    ///
    /// # Arguments
    ///
    /// - ncpus: worker threads, all available cores when `None`
    /// - seed: seed of the background sampling, random when `None`
    /// - progress: show a progress bar while streaming results
    ///
    pub fn new(ncpus: Option<usize>, seed: Option<u64>, progress: bool) -> Result<Self> {
        let pool = ThreadPoolBuilder::new()
            .num_threads(ncpus.unwrap_or(0))
            .build()
            .map_err(|e| ScanError::Engine(e.to_string()))?;

        Ok(PwmScanner {
            models: Vec::new(),
            genome: None,
            background: None,
            stats: None,
            thresholds: None,
            pool,
            rng: seeded_rng(seed),
            progress,
            background_seqs: DEFAULT_BACKGROUND_SEQS,
            chunk_size: DEFAULT_CHUNK_SIZE,
        })
    }

    pub fn with_background_seqs(mut self, n: usize) -> Self {
        self.background_seqs = n.max(1);
        self
    }

    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }

    pub fn genome(&self) -> Option<&Genome> {
        self.genome.as_deref()
    }

    pub fn thresholds(&self) -> Option<&[f64]> {
        self.thresholds.as_deref()
    }

    fn require_thresholds(&self) -> Result<&[f64]> {
        self.thresholds
            .as_deref()
            .ok_or_else(|| ScanError::Engine("no detection threshold has been set".to_string()))
    }

    fn normalizer(&self, zscore: bool, gc: bool) -> Result<Option<Normalizer<'_>>> {
        if !zscore {
            return Ok(None);
        }
        match &self.stats {
            Some(stats) => Ok(Some(Normalizer { stats, gc })),
            None => Err(ScanError::Engine(
                "z-score normalization requires a background".to_string(),
            )),
        }
    }

    fn progress_bar(&self, len: usize) -> Result<ProgressBar> {
        if !self.progress {
            return Ok(ProgressBar::hidden());
        }
        let pb = ProgressBar::new(len as u64);
        pb.set_style(
            ProgressStyle::default_bar()
                .template("[{elapsed_precise}] {bar:40.cyan/blue} {pos}/{len} sequences scanned")
                .map_err(|e| ScanError::Engine(e.to_string()))?,
        );
        Ok(pb)
    }

    fn stream<'a, T, F>(&'a self, seqs: &'a SequenceSet, f: F) -> Result<ResultStream<'a, T>>
    where
        T: Send + 'a,
        F: Fn(&Sequence) -> T + Send + Sync + 'a,
    {
        let pb = self.progress_bar(seqs.len())?;
        Ok(ResultStream::new(Batches {
            pool: &self.pool,
            seqs: seqs.sequences(),
            next: 0,
            chunk_size: self.chunk_size,
            buffer: Vec::new().into_iter(),
            f,
            pb,
        }))
    }

    fn update_stats(&mut self) -> Result<()> {
        self.stats = match &self.background {
            Some(bg) if !self.models.is_empty() => Some(
                self.models
                    .iter()
                    .map(|m| bg.stats(m))
                    .collect::<Result<Vec<_>>>()?,
            ),
            _ => None,
        };
        Ok(())
    }
}

#[derive(Clone, Copy)]
struct Normalizer<'a> {
    stats: &'a [MotifStats],
    gc: bool,
}

impl Normalizer<'_> {
    fn seq_gc(&self, seq: &Sequence) -> Option<f64> {
        self.gc.then(|| seq.gc_content())
    }

    fn apply(&self, motif: usize, gc: Option<f64>, score: f64) -> f64 {
        self.stats[motif].for_gc(gc).zscore(score)
    }
}

struct Batches<'a, T, F> {
    pool: &'a ThreadPool,
    seqs: &'a [Sequence],
    next: usize,
    chunk_size: usize,
    buffer: std::vec::IntoIter<T>,
    f: F,
    pb: ProgressBar,
}

impl<T, F> Iterator for Batches<'_, T, F>
where
    T: Send,
    F: Fn(&Sequence) -> T + Send + Sync,
{
    type Item = Result<T>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            if let Some(item) = self.buffer.next() {
                self.pb.inc(1);
                return Some(Ok(item));
            }
            if self.next >= self.seqs.len() {
                self.pb.finish_and_clear();
                return None;
            }

            let end = (self.next + self.chunk_size).min(self.seqs.len());
            let batch = &self.seqs[self.next..end];
            let f = &self.f;
            let results: Vec<T> = self.pool.install(|| batch.par_iter().map(f).collect());

            self.buffer = results.into_iter();
            self.next = end;
        }
    }
}

impl ScanEngine for PwmScanner {
    fn set_motifs(&mut self, motifs: &[Motif]) -> Result<()> {
        if let Some(motif) = motifs.iter().find(|m| !m.is_valid()) {
            return Err(ScanError::Engine(format!("invalid motif: {}", motif.id())));
        }
        self.models = motifs.iter().map(MotifModel::new).collect();
        self.thresholds = None;
        self.update_stats()?;
        debug!("Loaded {} motifs", self.models.len());
        Ok(())
    }

    fn set_genome(&mut self, genome: Option<Arc<Genome>>) -> Result<()> {
        self.genome = genome;
        Ok(())
    }

    fn set_background(
        &mut self,
        bgfile: Option<&Path>,
        genome: Option<Arc<Genome>>,
        size: usize,
        gc: bool,
    ) -> Result<()> {
        let background = match (bgfile, genome.or_else(|| self.genome.clone())) {
            (Some(path), _) => {
                info!("Reading background sequences from {}", path.display());
                let seqs = SequenceSet::from_fasta(path)?;
                Background::from_sequences(seqs.sequences().to_vec())?
            }
            (None, Some(genome)) => {
                info!(
                    "Drawing {} background sequences of {} bp from the genome",
                    self.background_seqs, size
                );
                Background::from_genome(&genome, size, self.background_seqs, gc, &mut self.rng)?
            }
            (None, None) => {
                return Err(ScanError::Engine(
                    "a background file or a genome is required for a background".to_string(),
                ));
            }
        };

        debug!("Background holds {} sequences", background.len());
        self.background = Some(background);
        self.update_stats()
    }

    fn set_threshold(&mut self, fpr: Option<f64>, threshold: Option<f64>) -> Result<()> {
        if self.models.is_empty() {
            return Err(ScanError::Engine(
                "motifs must be set before the threshold".to_string(),
            ));
        }

        let thresholds = match (threshold, fpr) {
            (Some(cutoff), _) => self
                .models
                .iter()
                .map(|m| m.relative_threshold(cutoff))
                .collect(),
            (None, Some(fpr)) => {
                if !(0.0..=1.0).contains(&fpr) {
                    return Err(ScanError::Engine(format!(
                        "false positive rate must be between 0 and 1, got {}",
                        fpr
                    )));
                }
                let bg = self.background.as_ref().ok_or_else(|| {
                    ScanError::Engine("an FPR threshold requires a background".to_string())
                })?;
                self.models
                    .iter()
                    .map(|m| bg.fpr_threshold(m, fpr))
                    .collect::<Result<Vec<_>>>()?
            }
            (None, None) => {
                return Err(ScanError::Engine(
                    "either a false positive rate or a threshold is required".to_string(),
                ));
            }
        };

        self.thresholds = Some(thresholds);
        Ok(())
    }

    fn motif_ids(&self) -> Vec<String> {
        self.models.iter().map(|m| m.id().to_string()).collect()
    }

    fn count<'a>(
        &'a self,
        seqs: &'a SequenceSet,
        nreport: usize,
        scan_rc: bool,
    ) -> Result<ResultStream<'a, Vec<usize>>> {
        let thresholds = self.require_thresholds()?;
        let models = &self.models;

        self.stream(seqs, move |seq| {
            models
                .iter()
                .zip(thresholds)
                .map(|(m, t)| m.matches(&seq.seq, scan_rc, *t).len().min(nreport))
                .collect()
        })
    }

    fn best_score<'a>(
        &'a self,
        seqs: &'a SequenceSet,
        scan_rc: bool,
        zscore: bool,
        gc: bool,
    ) -> Result<ResultStream<'a, Vec<f64>>> {
        let norm = self.normalizer(zscore, gc)?;
        let models = &self.models;

        self.stream(seqs, move |seq| {
            let seq_gc = norm.and_then(|n| n.seq_gc(seq));
            models
                .iter()
                .enumerate()
                .map(|(i, m)| {
                    let score = m.best(&seq.seq, scan_rc).map_or(m.min_score(), |b| b.score);
                    match norm {
                        Some(n) => n.apply(i, seq_gc, score),
                        None => score,
                    }
                })
                .collect()
        })
    }

    fn best_match<'a>(
        &'a self,
        seqs: &'a SequenceSet,
        zscore: bool,
        gc: bool,
    ) -> Result<ResultStream<'a, Vec<Option<Match>>>> {
        let norm = self.normalizer(zscore, gc)?;
        let models = &self.models;

        self.stream(seqs, move |seq| {
            let seq_gc = norm.and_then(|n| n.seq_gc(seq));
            models
                .iter()
                .enumerate()
                .map(|(i, m)| {
                    m.best(&seq.seq, true).map(|mut best| {
                        if let Some(n) = norm {
                            best.score = n.apply(i, seq_gc, best.score);
                        }
                        best
                    })
                })
                .collect()
        })
    }

    fn scan<'a>(
        &'a self,
        seqs: &'a SequenceSet,
        nreport: usize,
        scan_rc: bool,
        zscore: bool,
        gc: bool,
    ) -> Result<ResultStream<'a, ScanResult>> {
        let thresholds = self.require_thresholds()?;
        let norm = self.normalizer(zscore, gc)?;
        let models = &self.models;

        self.stream(seqs, move |seq| {
            let seq_gc = norm.and_then(|n| n.seq_gc(seq));
            models
                .iter()
                .zip(thresholds)
                .enumerate()
                .map(|(i, (m, t))| {
                    let mut matches = m.matches(&seq.seq, scan_rc, *t);
                    matches.truncate(nreport);
                    if let Some(n) = norm {
                        for hit in matches.iter_mut() {
                            hit.score = n.apply(i, seq_gc, hit.score);
                        }
                    }
                    matches
                })
                .collect()
        })
    }
}
