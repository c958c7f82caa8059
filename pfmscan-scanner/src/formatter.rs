//! Rendering of single matches as annotation lines.
use std::fmt::{self, Display};

use pfmscan_core::models::{Region, Sequence};

use crate::consts::{ANNOTATION_FEATURE, ANNOTATION_SOURCE};
use crate::engine::Match;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AnnotationFormat {
    /// 9-field, 1-based inclusive coordinates.
    #[default]
    Gff,
    /// 6 columns, 0-based half-open coordinates.
    Bed,
}

impl Display for AnnotationFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AnnotationFormat::Gff => write!(f, "gff"),
            AnnotationFormat::Bed => write!(f, "bed"),
        }
    }
}

/// Shortest representation that reads back to the same value, always with a decimal point.
/// Very small or large values keep the exponent form, with a point in the mantissa (`1.0e-7`).
pub fn format_score(score: f64) -> String {
    let repr = format!("{:?}", score);
    match repr.split_once('e') {
        Some((mantissa, exp)) if !mantissa.contains('.') => format!("{}.0e{}", mantissa, exp),
        _ => repr,
    }
}

///
/// Render one match of a motif in a sequence.
///
/// In BED format, a sequence id holding a `chr:start-end` locus is translated back to
/// genomic coordinates; any other id keeps coordinates relative to the sequence.
///
/// # Arguments
///
/// - seq: the scanned sequence
/// - motif_id: id of the matching motif
/// - motif_len: length of the matching motif
/// - hit: the match
/// - format: output format
///
pub fn format_line(
    seq: &Sequence,
    motif_id: &str,
    motif_len: usize,
    hit: &Match,
    format: AnnotationFormat,
) -> String {
    let score = format_score(hit.score);
    let pos = hit.pos;

    match format {
        AnnotationFormat::Bed => match Region::find_locus(&seq.id) {
            Some((chr, offset, _)) => {
                let start = offset + pos as u64;
                format!(
                    "{}\t{}\t{}\t{}\t{}\t{}",
                    chr,
                    start,
                    start + motif_len as u64,
                    motif_id,
                    score,
                    hit.strand
                )
            }
            None => format!(
                "{}\t{}\t{}\t{}\t{}\t{}",
                seq.id,
                pos,
                pos + motif_len,
                motif_id,
                score,
                hit.strand
            ),
        },
        AnnotationFormat::Gff => format!(
            "{}\t{}\t{}\t{}\t{}\t{}\t{}\t.\tmotif_name \"{}\" ; motif_instance \"{}\"",
            seq.id,
            ANNOTATION_SOURCE,
            ANNOTATION_FEATURE,
            pos + 1,
            pos + motif_len,
            score,
            hit.strand,
            motif_id,
            seq.slice(pos, pos + motif_len)
        ),
    }
}
