use std::fmt::{self, Display};

/// Column order of every position frequency matrix row.
pub const NUCLEOTIDES: [u8; 4] = *b"ACGT";

///
/// A sequence motif, stored as a position frequency matrix with one `[A, C, G, T]` row per
/// motif position. Rows may hold raw counts or frequencies.
///
#[derive(Debug, Clone, PartialEq)]
pub struct Motif {
    id: String,
    pfm: Vec<[f64; 4]>,
}

impl Motif {
    pub fn new(id: impl Into<String>, pfm: Vec<[f64; 4]>) -> Self {
        Motif { id: id.into(), pfm }
    }

    /// Build a motif that matches a plain nucleotide string exactly (one-hot rows).
    /// Any character outside `ACGT` becomes a uniform row.
    pub fn from_consensus(id: impl Into<String>, consensus: &str) -> Self {
        let pfm = consensus
            .bytes()
            .map(|base| match NUCLEOTIDES
                .iter()
                .position(|n| *n == base.to_ascii_uppercase())
            {
                Some(idx) => {
                    let mut row = [0.0; 4];
                    row[idx] = 1.0;
                    row
                }
                None => [0.25; 4],
            })
            .collect();
        Motif::new(id, pfm)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn len(&self) -> usize {
        self.pfm.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pfm.is_empty()
    }

    pub fn pfm(&self) -> &[[f64; 4]] {
        &self.pfm
    }

    ///
    /// Whether this value is a usable motif: at least one position, and every row made of
    /// finite, non-negative numbers with a positive sum.
    ///
    pub fn is_valid(&self) -> bool {
        !self.pfm.is_empty()
            && self.pfm.iter().all(|row| {
                row.iter().all(|v| v.is_finite() && *v >= 0.0) && row.iter().sum::<f64>() > 0.0
            })
    }

    ///
    /// Position probability matrix: every row normalized to sum to one.
    ///
    pub fn ppm(&self) -> Vec<[f64; 4]> {
        self.pfm
            .iter()
            .map(|row| {
                let total: f64 = row.iter().sum();
                if total > 0.0 {
                    row.map(|v| v / total)
                } else {
                    [0.25; 4]
                }
            })
            .collect()
    }

    ///
    /// Most frequent base per position.
    ///
    pub fn consensus(&self) -> String {
        self.pfm
            .iter()
            .map(|row| {
                let best = row
                    .iter()
                    .enumerate()
                    .fold((0, f64::MIN), |acc, (i, v)| if *v > acc.1 { (i, *v) } else { acc });
                NUCLEOTIDES[best.0] as char
            })
            .collect()
    }
}

impl Display for Motif {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}_{}", self.id, self.consensus())
    }
}
