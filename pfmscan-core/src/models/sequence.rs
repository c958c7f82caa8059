use std::io::BufRead;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use bio::io::fasta;

use crate::errors::{CoreError, Result};
use crate::models::{Genome, Region};
use crate::utils::{get_dynamic_reader, median};

///
/// A named stretch of residues.
///
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Sequence {
    pub id: String,
    pub seq: Vec<u8>,
}

impl Sequence {
    pub fn new(id: impl Into<String>, seq: impl Into<Vec<u8>>) -> Self {
        Sequence {
            id: id.into(),
            seq: seq.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.seq.len()
    }

    pub fn is_empty(&self) -> bool {
        self.seq.is_empty()
    }

    ///
    /// Residues in `[start, end)` as text; the range is clamped to the sequence.
    ///
    pub fn slice(&self, start: usize, end: usize) -> String {
        let end = end.min(self.seq.len());
        let start = start.min(end);
        String::from_utf8_lossy(&self.seq[start..end]).into_owned()
    }

    ///
    /// Fraction of G/C among the unambiguous (A, C, G, T) residues. Sequences without
    /// unambiguous residues report 0.
    ///
    pub fn gc_content(&self) -> f64 {
        let mut gc = 0usize;
        let mut acgt = 0usize;
        for base in self.seq.iter() {
            match base.to_ascii_uppercase() {
                b'G' | b'C' => {
                    gc += 1;
                    acgt += 1;
                }
                b'A' | b'T' => acgt += 1,
                _ => {}
            }
        }
        if acgt == 0 {
            0.0
        } else {
            gc as f64 / acgt as f64
        }
    }
}

///
/// How the lines of an input file were interpreted.
///
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Fasta,
    Bed,
    Regions,
}

///
/// An ordered collection of sequences; order is the order of the input file.
///
#[derive(Debug, Clone, Default)]
pub struct SequenceSet {
    sequences: Vec<Sequence>,
    path: Option<PathBuf>,
}

impl SequenceSet {
    pub fn new(sequences: Vec<Sequence>) -> Self {
        SequenceSet {
            sequences,
            path: None,
        }
    }

    ///
    /// Read all records of a (optionally gzipped) FASTA file.
    ///
    pub fn from_fasta(path: &Path) -> Result<Self> {
        let reader = get_dynamic_reader(path)?;
        let mut sequences = Vec::new();
        for record in fasta::Reader::new(reader).records() {
            let record = record.map_err(|e| {
                CoreError::FileReadError(format!("{}: {}", path.display(), e))
            })?;
            sequences.push(Sequence::new(record.id(), record.seq().to_owned()));
        }

        Ok(SequenceSet {
            sequences,
            path: Some(path.to_path_buf()),
        })
    }

    ///
    /// Resolve regions against a genome. Sequence ids are the `chr:start-end` loci.
    ///
    pub fn from_regions(regions: &[Region], genome: &Genome) -> Result<Self> {
        let sequences = regions
            .iter()
            .map(|region| {
                genome
                    .fetch(region)
                    .map(|seq| Sequence::new(region.as_locus(), seq.to_owned()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(SequenceSet::new(sequences))
    }

    ///
    /// Resolve `chr:start-end` region identifiers against a genome, keeping the identifiers
    /// exactly as given.
    ///
    pub fn from_region_ids<S: AsRef<str>>(ids: &[S], genome: &Genome) -> Result<Self> {
        let sequences = ids
            .iter()
            .map(|id| {
                let region = Region::from_str(id.as_ref())?;
                let seq = genome.fetch(&region)?;
                Ok(Sequence::new(id.as_ref(), seq.to_owned()))
            })
            .collect::<Result<Vec<_>>>()?;

        Ok(SequenceSet::new(sequences))
    }

    ///
    /// Load the sequences of an input file that is either FASTA, BED, or a list of
    /// `chr:start-end` regions (one per line). BED and region inputs are resolved against
    /// the genome, which is then required.
    ///
    /// # Arguments
    ///
    /// - path: the input file, may be gzipped
    /// - genome: genome used to resolve regions
    ///
    pub fn from_input(path: &Path, genome: Option<&Genome>) -> Result<Self> {
        let kind = sniff_input_kind(path)?;

        let mut set = match kind {
            InputKind::Fasta => return SequenceSet::from_fasta(path),
            InputKind::Bed | InputKind::Regions => {
                let genome =
                    genome.ok_or_else(|| CoreError::GenomeRequired(path.display().to_string()))?;
                let regions = read_regions(path, kind)?;
                SequenceSet::from_regions(&regions, genome)?
            }
        };

        set.path = Some(path.to_path_buf());
        Ok(set)
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.sequences.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sequences.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Sequence> {
        self.sequences.get(index)
    }

    pub fn ids(&self) -> Vec<&str> {
        self.sequences.iter().map(|s| s.id.as_str()).collect()
    }

    pub fn sequences(&self) -> &[Sequence] {
        &self.sequences
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Sequence> {
        self.sequences.iter()
    }

    ///
    /// Median sequence length. For an even number of sequences this is the mean of the two
    /// middle lengths, truncated.
    ///
    pub fn median_length(&self) -> Result<usize> {
        let lengths: Vec<usize> = self.sequences.iter().map(|s| s.len()).collect();
        median(&lengths).ok_or_else(|| {
            CoreError::EmptySequenceSet(
                self.path
                    .as_ref()
                    .map(|p| p.display().to_string())
                    .unwrap_or_default(),
            )
        })
    }
}

impl<'a> IntoIterator for &'a SequenceSet {
    type Item = &'a Sequence;
    type IntoIter = std::slice::Iter<'a, Sequence>;

    fn into_iter(self) -> Self::IntoIter {
        self.sequences.iter()
    }
}

///
/// Decide how to interpret an input file from its first informative line.
///
pub fn sniff_input_kind(path: &Path) -> Result<InputKind> {
    let reader = get_dynamic_reader(path)?;
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with("track") {
            continue;
        }
        if line.starts_with('>') {
            return Ok(InputKind::Fasta);
        }
        if parse_bed_line(line).is_some() {
            return Ok(InputKind::Bed);
        }
        return Ok(InputKind::Regions);
    }

    Err(CoreError::EmptySequenceSet(path.display().to_string()))
}

/// Parses the first three fields of a tab separated BED line.
fn parse_bed_line(line: &str) -> Option<Region> {
    let mut fields = line.split('\t');
    let chr = fields.next()?;
    let start = fields.next()?.trim().parse::<u32>().ok()?;
    let end = fields.next()?.trim().parse::<u32>().ok()?;
    Some(Region::new(chr, start, end))
}

fn read_regions(path: &Path, kind: InputKind) -> Result<Vec<Region>> {
    let reader = get_dynamic_reader(path)?;
    let mut regions = Vec::new();

    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') || line.starts_with("track") {
            continue;
        }
        let region = match kind {
            InputKind::Bed => parse_bed_line(line)
                .ok_or_else(|| CoreError::RegionParseError(line.to_string()))?,
            _ => Region::from_str(line)?,
        };
        regions.push(region);
    }

    Ok(regions)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::io::Write;

    use pretty_assertions::assert_eq;
    use rstest::*;
    use tempfile::NamedTempFile;

    #[fixture]
    fn genome() -> Genome {
        Genome::from_contigs(vec![("chr1".to_string(), b"AAAACCCCGGGGTTTT".to_vec())])
    }

    fn write_tmp(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file
    }

    #[rstest]
    fn test_input_from_fasta() {
        let file = write_tmp(">s1\nACGT\nAC\n>s2\nGG\n");
        let set = SequenceSet::from_input(file.path(), None).unwrap();
        assert_eq!(set.ids(), vec!["s1", "s2"]);
        assert_eq!(set.get(0).unwrap().seq, b"ACGTAC".to_vec());
    }

    #[rstest]
    fn test_input_from_bed(genome: Genome) {
        let file = write_tmp("chr1\t0\t4\tname\nchr1\t4\t8\n");
        let set = SequenceSet::from_input(file.path(), Some(&genome)).unwrap();
        assert_eq!(set.ids(), vec!["chr1:0-4", "chr1:4-8"]);
        assert_eq!(set.get(1).unwrap().seq, b"CCCC".to_vec());
    }

    #[rstest]
    fn test_input_from_region_list(genome: Genome) {
        let file = write_tmp("chr1:8-12\n\nchr1:12-16\n");
        let set = SequenceSet::from_input(file.path(), Some(&genome)).unwrap();
        assert_eq!(set.len(), 2);
        assert_eq!(set.get(0).unwrap().seq, b"GGGG".to_vec());
    }

    #[rstest]
    fn test_regions_need_genome() {
        let file = write_tmp("chr1:8-12\n");
        let result = SequenceSet::from_input(file.path(), None);
        assert!(matches!(result, Err(CoreError::GenomeRequired(_))));
    }

    #[rstest]
    #[case(vec![5], 5)]
    #[case(vec![3, 9, 4], 4)]
    #[case(vec![10, 20, 31, 40], 25)]
    fn test_median_length(#[case] lengths: Vec<usize>, #[case] expected: usize) {
        let sequences = lengths
            .iter()
            .enumerate()
            .map(|(i, len)| Sequence::new(format!("s{}", i), vec![b'A'; *len]))
            .collect();
        let set = SequenceSet::new(sequences);
        assert_eq!(set.median_length().unwrap(), expected);
    }

    #[rstest]
    fn test_gc_content_ignores_ambiguous_bases() {
        let seq = Sequence::new("s", b"GCNNAT".to_vec());
        assert_eq!(seq.gc_content(), 0.5);
        assert_eq!(Sequence::new("n", b"NNN".to_vec()).gc_content(), 0.0);
    }
}
