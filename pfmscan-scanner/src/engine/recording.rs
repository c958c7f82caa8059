//! An engine that records its configuration and returns canned results.
use std::path::{Path, PathBuf};
use std::sync::Arc;

use pfmscan_core::models::{Genome, Motif, SequenceSet};

use super::{Match, ResultStream, ScanEngine, ScanResult, Strand};
use crate::errors::{Result, ScanError};

#[derive(Debug, Default)]
pub struct RecordingEngine {
    pub calls: Vec<&'static str>,
    pub ids: Vec<String>,
    pub genome: Option<Arc<Genome>>,
    pub background: Option<(Option<PathBuf>, bool, usize, bool)>,
    pub threshold: Option<(Option<f64>, Option<f64>)>,
    /// Fail on the second sequence of every result stream.
    pub fail_stream: bool,
}

impl RecordingEngine {
    fn stream<'a, T: 'a>(&self, results: Vec<T>) -> ResultStream<'a, T> {
        if self.fail_stream {
            let items: Vec<Result<T>> = results
                .into_iter()
                .enumerate()
                .map(|(i, r)| {
                    if i == 1 {
                        Err(ScanError::Engine("engine failure".to_string()))
                    } else {
                        Ok(r)
                    }
                })
                .collect();
            ResultStream::new(items.into_iter())
        } else {
            ResultStream::from_results(results)
        }
    }
}

impl ScanEngine for RecordingEngine {
    fn set_motifs(&mut self, motifs: &[Motif]) -> Result<()> {
        self.calls.push("set_motifs");
        self.ids = motifs.iter().map(|m| m.id().to_string()).collect();
        Ok(())
    }

    fn set_genome(&mut self, genome: Option<Arc<Genome>>) -> Result<()> {
        self.calls.push("set_genome");
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
        self.calls.push("set_background");
        self.background = Some((bgfile.map(Path::to_path_buf), genome.is_some(), size, gc));
        Ok(())
    }

    fn set_threshold(&mut self, fpr: Option<f64>, threshold: Option<f64>) -> Result<()> {
        self.calls.push("set_threshold");
        self.threshold = Some((fpr, threshold));
        Ok(())
    }

    fn motif_ids(&self) -> Vec<String> {
        self.ids.clone()
    }

    /// Every motif counts the sequence length, capped at `nreport`.
    fn count<'a>(
        &'a self,
        seqs: &'a SequenceSet,
        nreport: usize,
        _scan_rc: bool,
    ) -> Result<ResultStream<'a, Vec<usize>>> {
        let results = seqs
            .iter()
            .map(|s| vec![s.len().min(nreport); self.ids.len()])
            .collect();
        Ok(self.stream(results))
    }

    /// Motif `i` scores `len + i / 4` on every sequence.
    fn best_score<'a>(
        &'a self,
        seqs: &'a SequenceSet,
        _scan_rc: bool,
        _zscore: bool,
        _gc: bool,
    ) -> Result<ResultStream<'a, Vec<f64>>> {
        let results = seqs
            .iter()
            .map(|s| {
                (0..self.ids.len())
                    .map(|i| s.len() as f64 + i as f64 / 4.0)
                    .collect()
            })
            .collect();
        Ok(self.stream(results))
    }

    /// The best match of motif `i` sits at position `i` on the reverse strand.
    fn best_match<'a>(
        &'a self,
        seqs: &'a SequenceSet,
        _zscore: bool,
        _gc: bool,
    ) -> Result<ResultStream<'a, Vec<Option<Match>>>> {
        let results = seqs
            .iter()
            .map(|s| {
                (0..self.ids.len())
                    .map(|i| Some(Match::new(s.len() as f64, i, Strand::Reverse)))
                    .collect()
            })
            .collect();
        Ok(self.stream(results))
    }

    /// Every motif matches at position 0 on the forward strand and, when `nreport > 1`, at
    /// position 1 on the reverse strand.
    fn scan<'a>(
        &'a self,
        seqs: &'a SequenceSet,
        nreport: usize,
        _scan_rc: bool,
        _zscore: bool,
        _gc: bool,
    ) -> Result<ResultStream<'a, ScanResult>> {
        let matches = vec![
            Match::new(2.5, 0, Strand::Forward),
            Match::new(1.0, 1, Strand::Reverse),
        ];
        let results = seqs
            .iter()
            .map(|_| {
                (0..self.ids.len())
                    .map(|_| matches.iter().take(nreport).copied().collect())
                    .collect()
            })
            .collect();
        Ok(self.stream(results))
    }
}
