use std::ffi::OsStr;
use std::fs::File;
use std::io::prelude::*;
use std::io::{BufRead, BufReader};
use std::path::Path;

use flate2::read::MultiGzDecoder;

use crate::errors::{CoreError, Result};
use crate::models::Motif;

///
/// Get a reader for either a gzip'd or non-gzip'd file.
///
/// # Arguments
///
/// - path: path to the file to read
///
pub fn get_dynamic_reader(path: &Path) -> Result<BufReader<Box<dyn Read>>> {
    let is_gzipped = path.extension() == Some(OsStr::new("gz"));
    let file = File::open(path)
        .map_err(|e| CoreError::FileReadError(format!("{}: {}", path.display(), e)))?;
    let file: Box<dyn Read> = match is_gzipped {
        true => Box::new(MultiGzDecoder::new(file)),
        false => Box::new(file),
    };

    Ok(BufReader::new(file))
}

///
/// Read every motif of a PFM file.
///
/// The format is a `>` header line with the motif id, followed by one row per motif position
/// holding four whitespace separated numbers (A, C, G and T counts or frequencies). Blank
/// lines and lines starting with `#` are skipped.
///
/// # Arguments
///
/// - path: path to the motif file, may be gzipped
///
pub fn read_motifs(path: &Path) -> Result<Vec<Motif>> {
    let reader = get_dynamic_reader(path)?;
    let parse_error = |message: String| CoreError::MotifParseError {
        path: path.display().to_string(),
        message,
    };

    let mut motifs = Vec::new();
    let mut current: Option<(String, Vec<[f64; 4]>)> = None;

    for (line_num, line) in reader.lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        if let Some(header) = line.strip_prefix('>') {
            if let Some((id, rows)) = current.take() {
                motifs.push(Motif::new(id, rows));
            }
            let id = header.split_whitespace().next().unwrap_or_default();
            if id.is_empty() {
                return Err(parse_error(format!("empty motif id on line {}", line_num + 1)));
            }
            current = Some((id.to_string(), Vec::new()));
            continue;
        }

        let Some((_, rows)) = current.as_mut() else {
            return Err(parse_error(format!(
                "matrix row before any motif header on line {}",
                line_num + 1
            )));
        };

        let values = line
            .split_whitespace()
            .map(|v| v.parse::<f64>())
            .collect::<std::result::Result<Vec<f64>, _>>()
            .map_err(|e| parse_error(format!("line {}: {}", line_num + 1, e)))?;

        let row: [f64; 4] = values.try_into().map_err(|v: Vec<f64>| {
            parse_error(format!(
                "line {}: expected 4 columns, found {}",
                line_num + 1,
                v.len()
            ))
        })?;
        rows.push(row);
    }

    if let Some((id, rows)) = current.take() {
        motifs.push(Motif::new(id, rows));
    }

    Ok(motifs)
}

///
/// Integer median of a list of lengths. The mean of the two middle values is truncated
/// for even-sized input. Returns `None` for empty input.
///
pub fn median(values: &[usize]) -> Option<usize> {
    if values.is_empty() {
        return None;
    }

    let mut sorted = values.to_vec();
    sorted.sort_unstable();

    let count = sorted.len();
    let median = if count % 2 == 0 {
        (sorted[count / 2 - 1] + sorted[count / 2]) / 2
    } else {
        sorted[count / 2]
    };

    Some(median)
}
