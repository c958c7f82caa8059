//! Estimate a representative length for background sequences.
use rand::rngs::StdRng;
use rand::seq::index::sample;
use rand::{Rng, SeedableRng};

use pfmscan_core::models::{Genome, SequenceSet};

use crate::consts::BACKGROUND_SAMPLE_SIZE;
use crate::errors::{Result, ScanError};

/// Random source for sampling, reproducible when seeded.
pub fn seeded_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_os_rng(),
    }
}

///
/// Pick the region ids used to estimate the background size: all of them when there are
/// fewer than [`BACKGROUND_SAMPLE_SIZE`], otherwise exactly that many, drawn uniformly
/// without replacement.
///
pub fn sample_regions<'a, S, R>(regions: &'a [S], rng: &mut R) -> Vec<&'a str>
where
    S: AsRef<str>,
    R: Rng + ?Sized,
{
    if regions.len() >= BACKGROUND_SAMPLE_SIZE {
        sample(rng, regions.len(), BACKGROUND_SAMPLE_SIZE)
            .into_iter()
            .map(|i| regions[i].as_ref())
            .collect()
    } else {
        regions.iter().map(|r| r.as_ref()).collect()
    }
}

///
/// Median length of the sequences behind a (sampled) list of region ids.
///
/// This estimate only sizes the background sequences; it never changes which regions are
/// scanned.
///
/// # Arguments
///
/// - regions: `chr:start-end` region ids
/// - genome: genome the regions are resolved against
/// - rng: random source, seed it for reproducible estimates
///
pub fn estimate_background_size<S, R>(regions: &[S], genome: &Genome, rng: &mut R) -> Result<usize>
where
    S: AsRef<str>,
    R: Rng + ?Sized,
{
    if regions.is_empty() {
        return Err(ScanError::InvalidInput(
            "cannot estimate a background size without regions".to_string(),
        ));
    }

    let check_regions = sample_regions(regions, rng);
    let seqs = SequenceSet::from_region_ids(&check_regions, genome)?;

    Ok(seqs.median_length()?)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::collections::HashSet;

    use pretty_assertions::assert_eq;
    use rstest::*;

    fn region_ids(n: usize) -> Vec<String> {
        (0..n).map(|i| format!("chr1:{}-{}", i, i + 10 + i % 7)).collect()
    }

    #[fixture]
    fn genome() -> Genome {
        Genome::from_contigs(vec![("chr1".to_string(), vec![b'A'; 5000])])
    }

    #[rstest]
    #[case(1)]
    #[case(999)]
    fn test_small_inputs_use_every_region(#[case] n: usize) {
        let regions = region_ids(n);
        let mut rng = StdRng::seed_from_u64(1);
        let sampled = sample_regions(&regions, &mut rng);
        assert_eq!(sampled.len(), n);
        assert_eq!(sampled[0], regions[0]);
    }

    #[rstest]
    #[case(1000)]
    #[case(2500)]
    fn test_large_inputs_sample_without_replacement(#[case] n: usize) {
        let regions = region_ids(n);
        let mut rng = StdRng::seed_from_u64(7);
        let sampled = sample_regions(&regions, &mut rng);

        assert_eq!(sampled.len(), BACKGROUND_SAMPLE_SIZE);
        let unique: HashSet<&str> = sampled.iter().copied().collect();
        assert_eq!(unique.len(), BACKGROUND_SAMPLE_SIZE);
    }

    #[rstest]
    fn test_seeded_estimates_are_reproducible(genome: Genome) {
        let regions = region_ids(3000);

        let first = sample_regions(&regions, &mut StdRng::seed_from_u64(42));
        let second = sample_regions(&regions, &mut StdRng::seed_from_u64(42));
        assert_eq!(first, second);

        let a = estimate_background_size(&regions, &genome, &mut StdRng::seed_from_u64(42));
        let b = estimate_background_size(&regions, &genome, &mut StdRng::seed_from_u64(42));
        assert_eq!(a.unwrap(), b.unwrap());
    }

    #[rstest]
    fn test_median_of_region_lengths(genome: Genome) {
        let regions = vec!["chr1:0-100", "chr1:0-200", "chr1:0-50"];
        let size = estimate_background_size(&regions, &genome, &mut StdRng::seed_from_u64(0));
        assert_eq!(size.unwrap(), 100);
    }

    #[rstest]
    fn test_empty_regions(genome: Genome) {
        let regions: Vec<String> = vec![];
        let size = estimate_background_size(&regions, &genome, &mut StdRng::seed_from_u64(0));
        assert!(matches!(size, Err(ScanError::InvalidInput(_))));
    }
}
