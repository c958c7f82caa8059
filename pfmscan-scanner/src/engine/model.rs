//! Log-odds motif models and background score statistics used by [`super::PwmScanner`].
use rand::Rng;
use rand::seq::IndexedRandom;

use pfmscan_core::models::{Genome, Motif, Region, Sequence};

use super::{Match, Strand};
use crate::errors::{Result, ScanError};

/// Added to every normalized frequency before taking log-odds.
pub const PSEUDOCOUNT: f64 = 1e-3;

/// Uniform nucleotide background probability.
const BG_PROB: f64 = 0.25;

pub const GC_BIN_WIDTH: f64 = 0.1;
pub const N_GC_BINS: usize = 10;

/// A GC bin needs this many background sequences to get its own statistics.
pub const MIN_SEQS_PER_GC_BIN: usize = 5;

/// Largest fraction of `N` tolerated in a background window.
const MAX_N_FRACTION: f64 = 0.1;

fn base_index(base: u8) -> Option<usize> {
    match base {
        b'A' | b'a' => Some(0),
        b'C' | b'c' => Some(1),
        b'G' | b'g' => Some(2),
        b'T' | b't' => Some(3),
        _ => None,
    }
}

pub fn gc_bin(gc: f64) -> usize {
    ((gc / GC_BIN_WIDTH) as usize).min(N_GC_BINS - 1)
}

///
/// Log-odds scoring matrix of one motif, with its reverse complement.
///
#[derive(Debug, Clone)]
pub struct MotifModel {
    id: String,
    forward: Vec<[f64; 4]>,
    reverse: Vec<[f64; 4]>,
    min_score: f64,
    max_score: f64,
}

impl MotifModel {
    pub fn new(motif: &Motif) -> Self {
        let forward: Vec<[f64; 4]> = motif
            .ppm()
            .iter()
            .map(|row| row.map(|p| ((p + PSEUDOCOUNT) / (1.0 + 4.0 * PSEUDOCOUNT) / BG_PROB).ln()))
            .collect();

        // reversed rows, A<->T and C<->G
        let reverse = forward
            .iter()
            .rev()
            .map(|row| [row[3], row[2], row[1], row[0]])
            .collect();

        let min_score = forward
            .iter()
            .map(|row| row.iter().cloned().fold(f64::INFINITY, f64::min))
            .sum();
        let max_score = forward
            .iter()
            .map(|row| row.iter().cloned().fold(f64::NEG_INFINITY, f64::max))
            .sum();

        MotifModel {
            id: motif.id().to_string(),
            forward,
            reverse,
            min_score,
            max_score,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn len(&self) -> usize {
        self.forward.len()
    }

    pub fn is_empty(&self) -> bool {
        self.forward.is_empty()
    }

    pub fn min_score(&self) -> f64 {
        self.min_score
    }

    pub fn max_score(&self) -> f64 {
        self.max_score
    }

    /// Absolute threshold for a cutoff relative to the score range of this motif.
    pub fn relative_threshold(&self, cutoff: f64) -> f64 {
        self.min_score + cutoff * (self.max_score - self.min_score)
    }

    fn window_score(matrix: &[[f64; 4]], window: &[u8]) -> f64 {
        matrix
            .iter()
            .zip(window)
            .map(|(row, base)| match base_index(*base) {
                Some(idx) => row[idx],
                // ambiguous bases score the row mean
                None => row.iter().sum::<f64>() / 4.0,
            })
            .sum()
    }

    ///
    /// Score every window of a sequence on one strand, as `(position, score)`.
    ///
    pub fn window_scores<'a>(
        &'a self,
        seq: &'a [u8],
        strand: Strand,
    ) -> impl Iterator<Item = (usize, f64)> + 'a {
        let matrix = match strand {
            Strand::Forward => &self.forward,
            Strand::Reverse => &self.reverse,
        };
        let n_windows = (seq.len() + 1).saturating_sub(self.len());
        (0..n_windows).map(move |pos| (pos, Self::window_score(matrix, &seq[pos..pos + self.len()])))
    }

    fn strands(scan_rc: bool) -> &'static [Strand] {
        if scan_rc {
            &[Strand::Forward, Strand::Reverse]
        } else {
            &[Strand::Forward]
        }
    }

    ///
    /// All matches scoring at least `threshold`, best first. Ties keep position order,
    /// forward strand before reverse.
    ///
    pub fn matches(&self, seq: &[u8], scan_rc: bool, threshold: f64) -> Vec<Match> {
        let mut matches: Vec<Match> = Self::strands(scan_rc)
            .iter()
            .flat_map(|strand| {
                self.window_scores(seq, *strand)
                    .filter(|(_, score)| *score >= threshold)
                    .map(move |(pos, score)| Match::new(score, pos, *strand))
            })
            .collect();

        matches.sort_by(|a, b| {
            b.score
                .total_cmp(&a.score)
                .then(a.pos.cmp(&b.pos))
                .then(b.strand.as_i8().cmp(&a.strand.as_i8()))
        });
        matches
    }

    /// Best scoring window, `None` when the sequence is shorter than the motif.
    pub fn best(&self, seq: &[u8], scan_rc: bool) -> Option<Match> {
        let mut best: Option<Match> = None;
        for strand in Self::strands(scan_rc) {
            for (pos, score) in self.window_scores(seq, *strand) {
                let better = match best {
                    Some(current) => {
                        score > current.score || (score == current.score && pos < current.pos)
                    }
                    None => true,
                };
                if better {
                    best = Some(Match::new(score, pos, *strand));
                }
            }
        }
        best
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoreStats {
    pub mean: f64,
    pub std: f64,
}

impl ScoreStats {
    pub fn from_scores(scores: &[f64]) -> Option<Self> {
        if scores.is_empty() {
            return None;
        }
        let n = scores.len() as f64;
        let mean = scores.iter().sum::<f64>() / n;
        let var = scores.iter().map(|s| (s - mean).powi(2)).sum::<f64>() / n;
        Some(ScoreStats {
            mean,
            std: var.sqrt(),
        })
    }

    pub fn zscore(&self, score: f64) -> f64 {
        if self.std > 0.0 {
            (score - self.mean) / self.std
        } else {
            score - self.mean
        }
    }
}

///
/// Background score statistics of one motif: over all background windows, and per GC bin.
///
#[derive(Debug, Clone)]
pub struct MotifStats {
    pub global: ScoreStats,
    pub by_gc: Vec<Option<ScoreStats>>,
}

impl MotifStats {
    /// Statistics for a sequence of the given GC content; sparse bins use the global ones.
    pub fn for_gc(&self, gc: Option<f64>) -> &ScoreStats {
        gc.and_then(|gc| self.by_gc.get(gc_bin(gc)).and_then(|s| s.as_ref()))
            .unwrap_or(&self.global)
    }
}

///
/// Background sequences with their GC bin.
///
#[derive(Debug, Clone)]
pub struct Background {
    seqs: Vec<Sequence>,
    gc_bins: Vec<usize>,
}

impl Background {
    pub fn from_sequences(seqs: Vec<Sequence>) -> Result<Self> {
        if seqs.is_empty() {
            return Err(ScanError::Engine("the background is empty".to_string()));
        }
        let gc_bins = seqs.iter().map(|s| gc_bin(s.gc_content())).collect();
        Ok(Background { seqs, gc_bins })
    }

    ///
    /// Draw `n` random `size` bp windows from a genome. Contigs are picked proportionally to
    /// their length and windows with too many `N` are rejected. With `gc`, every GC bin
    /// receives at most an equal share of the windows.
    ///
    pub fn from_genome<R: Rng>(
        genome: &Genome,
        size: usize,
        n: usize,
        gc: bool,
        rng: &mut R,
    ) -> Result<Self> {
        let size = size.max(1);
        let contigs: Vec<(&str, &[u8])> = genome
            .contigs()
            .filter(|(_, seq)| seq.len() >= size)
            .collect();

        if contigs.is_empty() {
            return Err(ScanError::Engine(format!(
                "no contig in the genome is at least {} bp long",
                size
            )));
        }

        let quota = if gc { n.div_ceil(N_GC_BINS) } else { n };
        let mut per_bin = [0usize; N_GC_BINS];
        let mut seqs = Vec::with_capacity(n);
        let max_attempts = n.saturating_mul(20);

        for _ in 0..max_attempts {
            if seqs.len() >= n {
                break;
            }
            let (chr, contig) = contigs
                .choose_weighted(rng, |(_, seq)| seq.len())
                .map_err(|e| ScanError::Engine(e.to_string()))?;
            let start = rng.random_range(0..=contig.len() - size);
            let window = &contig[start..start + size];

            let n_count = window.iter().filter(|b| base_index(**b).is_none()).count();
            if n_count as f64 > MAX_N_FRACTION * size as f64 {
                continue;
            }

            let seq = Sequence::new(
                Region::new(*chr, start as u32, (start + size) as u32).as_locus(),
                window.to_vec(),
            );
            let bin = gc_bin(seq.gc_content());
            if per_bin[bin] >= quota {
                continue;
            }
            per_bin[bin] += 1;
            seqs.push(seq);
        }

        Background::from_sequences(seqs)
    }

    pub fn len(&self) -> usize {
        self.seqs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seqs.is_empty()
    }

    pub fn sequences(&self) -> &[Sequence] {
        &self.seqs
    }

    /// Best score of the motif on every background sequence long enough to hold it.
    pub fn best_scores(&self, model: &MotifModel, scan_rc: bool) -> Vec<f64> {
        self.seqs
            .iter()
            .filter_map(|s| model.best(&s.seq, scan_rc).map(|m| m.score))
            .collect()
    }

    ///
    /// Score at the `(1 - fpr)` quantile of the best background scores.
    ///
    pub fn fpr_threshold(&self, model: &MotifModel, fpr: f64) -> Result<f64> {
        let mut scores = self.best_scores(model, true);
        if scores.is_empty() {
            return Err(ScanError::Engine(format!(
                "background sequences are shorter than motif {}",
                model.id()
            )));
        }
        scores.sort_by(|a, b| a.total_cmp(b));
        let idx = (((1.0 - fpr) * scores.len() as f64).floor() as usize).min(scores.len() - 1);
        Ok(scores[idx])
    }

    pub fn stats(&self, model: &MotifModel) -> Result<MotifStats> {
        let mut all = Vec::new();
        let mut per_bin: Vec<Vec<f64>> = vec![Vec::new(); N_GC_BINS];
        let mut seqs_per_bin = [0usize; N_GC_BINS];

        for (seq, bin) in self.seqs.iter().zip(self.gc_bins.iter()) {
            seqs_per_bin[*bin] += 1;
            for strand in [Strand::Forward, Strand::Reverse] {
                for (_, score) in model.window_scores(&seq.seq, strand) {
                    all.push(score);
                    per_bin[*bin].push(score);
                }
            }
        }

        let global = ScoreStats::from_scores(&all).ok_or_else(|| {
            ScanError::Engine(format!(
                "background sequences are shorter than motif {}",
                model.id()
            ))
        })?;

        let by_gc = per_bin
            .iter()
            .zip(seqs_per_bin.iter())
            .map(|(scores, count)| {
                if *count >= MIN_SEQS_PER_GC_BIN {
                    ScoreStats::from_scores(scores)
                } else {
                    None
                }
            })
            .collect();

        Ok(MotifStats { global, by_gc })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rand::SeedableRng;
    use rand::rngs::StdRng;
    use rstest::*;

    #[fixture]
    fn gata() -> MotifModel {
        MotifModel::new(&Motif::from_consensus("gata", "GATA"))
    }

    #[rstest]
    fn test_exact_match_scores_max(gata: MotifModel) {
        let best = gata.best(b"CCCCGATACCCC", false).unwrap();
        assert_eq!(best.pos, 4);
        assert_eq!(best.strand, Strand::Forward);
        assert!((best.score - gata.max_score()).abs() < 1e-9);
    }

    #[rstest]
    fn test_reverse_complement_match(gata: MotifModel) {
        // TATC is the reverse complement of GATA
        let best = gata.best(b"CCCCTATCCCCC", true).unwrap();
        assert_eq!(best.pos, 4);
        assert_eq!(best.strand, Strand::Reverse);

        let forward_only = gata.best(b"CCCCTATCCCCC", false).unwrap();
        assert!(forward_only.score < gata.max_score());
    }

    #[rstest]
    fn test_matches_above_threshold(gata: MotifModel) {
        let threshold = gata.relative_threshold(0.99);
        let matches = gata.matches(b"GATAGGGATA", true, threshold);
        let positions: Vec<usize> = matches.iter().map(|m| m.pos).collect();
        assert_eq!(positions, vec![0, 6]);
    }

    #[rstest]
    fn test_relative_threshold_bounds(gata: MotifModel) {
        assert_eq!(gata.relative_threshold(0.0), gata.min_score());
        assert!((gata.relative_threshold(1.0) - gata.max_score()).abs() < 1e-9);
    }

    #[rstest]
    fn test_short_sequence_has_no_best(gata: MotifModel) {
        assert_eq!(gata.best(b"GAT", true), None);
    }

    #[rstest]
    fn test_zscore() {
        let stats = ScoreStats::from_scores(&[1.0, 3.0]).unwrap();
        assert_eq!(stats.mean, 2.0);
        assert_eq!(stats.zscore(3.0), 1.0);
    }

    #[rstest]
    #[case(0.0, 0)]
    #[case(0.45, 4)]
    #[case(1.0, 9)]
    fn test_gc_bin(#[case] gc: f64, #[case] bin: usize) {
        assert_eq!(gc_bin(gc), bin);
    }

    #[rstest]
    fn test_background_from_genome_is_seeded() {
        let genome = Genome::from_contigs(vec![(
            "chr1".to_string(),
            b"ACGTTGCAAGGCTTACGATCGATCGGGCTAGCTAACGT".repeat(20),
        )]);
        let a = Background::from_genome(&genome, 20, 50, false, &mut StdRng::seed_from_u64(3))
            .unwrap();
        let b = Background::from_genome(&genome, 20, 50, false, &mut StdRng::seed_from_u64(3))
            .unwrap();

        assert_eq!(a.len(), 50);
        assert_eq!(a.sequences(), b.sequences());
        assert!(a.sequences().iter().all(|s| s.len() == 20));
    }

    #[rstest]
    fn test_background_needs_long_contigs() {
        let genome = Genome::from_contigs(vec![("chr1".to_string(), b"ACGT".to_vec())]);
        let result = Background::from_genome(&genome, 20, 10, false, &mut StdRng::seed_from_u64(0));
        assert!(matches!(result, Err(ScanError::Engine(_))));
    }
}
