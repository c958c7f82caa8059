use std::collections::HashMap;
use std::path::{Path, PathBuf};

use bio::io::fasta;

use crate::errors::{CoreError, Result};
use crate::models::Region;
use crate::utils::get_dynamic_reader;

///
/// An in-memory reference genome: contig name to residues, in FASTA order.
///
#[derive(Debug, Clone)]
pub struct Genome {
    contigs: Vec<(String, Vec<u8>)>,
    index: HashMap<String, usize>,
    path: Option<PathBuf>,
}

impl TryFrom<&str> for Genome {
    type Error = CoreError;

    fn try_from(value: &str) -> Result<Self> {
        Genome::try_from(Path::new(value))
    }
}

impl TryFrom<&Path> for Genome {
    type Error = CoreError;

    ///
    /// Create a new [Genome] from a (optionally gzipped) fasta file
    ///
    fn try_from(value: &Path) -> Result<Genome> {
        let reader = get_dynamic_reader(value)?;
        let records = fasta::Reader::new(reader).records();

        let mut contigs = Vec::new();
        for record in records {
            let record = record.map_err(|e| {
                CoreError::FileReadError(format!(
                    "Error reading genome file {}: {}",
                    value.display(),
                    e
                ))
            })?;
            contigs.push((record.id().to_string(), record.seq().to_owned()));
        }

        let mut genome = Genome::from_contigs(contigs);
        genome.path = Some(value.to_path_buf());
        Ok(genome)
    }
}

impl Genome {
    pub fn from_contigs(contigs: Vec<(String, Vec<u8>)>) -> Self {
        let index = contigs
            .iter()
            .enumerate()
            .map(|(i, (name, _))| (name.clone(), i))
            .collect();

        Genome {
            contigs,
            index,
            path: None,
        }
    }

    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    pub fn len(&self) -> usize {
        self.contigs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contigs.is_empty()
    }

    pub fn contains_chr(&self, chr: &str) -> bool {
        self.index.contains_key(chr)
    }

    pub fn contig(&self, chr: &str) -> Option<&[u8]> {
        self.index.get(chr).map(|i| self.contigs[*i].1.as_slice())
    }

    /// Contig names and residues in file order.
    pub fn contigs(&self) -> impl Iterator<Item = (&str, &[u8])> {
        self.contigs
            .iter()
            .map(|(name, seq)| (name.as_str(), seq.as_slice()))
    }

    ///
    /// Fetch the residues of a region. The end is clamped to the contig length, a start past
    /// the end of the contig is an error.
    ///
    pub fn fetch(&self, region: &Region) -> Result<&[u8]> {
        let seq = self
            .contig(&region.chr)
            .ok_or_else(|| CoreError::UnknownContig(region.to_string()))?;

        let start = region.start as usize;
        let end = (region.end as usize).min(seq.len());

        if start > end {
            return Err(CoreError::InvalidRange {
                chr: region.chr.clone(),
                start: region.start,
                end: region.end,
                len: seq.len(),
            });
        }

        Ok(&seq[start..end])
    }
}
