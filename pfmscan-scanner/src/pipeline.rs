//! Streaming scans: one header block followed by annotation lines or a table, written to a
//! sink.
use std::fs::{File, create_dir_all};
use std::io::{BufWriter, StdoutLock, Write, stdout};
use std::path::{Path, PathBuf};
use std::sync::Arc;

use log::{debug, info};

use pfmscan_core::models::{Genome, SequenceSet};

use crate::config::MotifConfig;
use crate::consts::{DEFAULT_FPR, DEFAULT_NREPORT, SCORE_PRECISION, VERSION};
use crate::engine::{PwmScanner, ScanEngine};
use crate::errors::Result;
use crate::formatter::{AnnotationFormat, format_line};
use crate::motifs::{MotifInput, MotifSource, check_motifs};

///
/// What a streaming scan writes after its header.
///
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum OutputMode {
    /// One line per reported match.
    Annotation {
        format: AnnotationFormat,
        nreport: usize,
    },
    /// Per sequence, the number of matches of each motif.
    CountTable { nreport: usize },
    /// Per sequence, the best score of each motif. No detection threshold is applied.
    ScoreTable,
}

impl Default for OutputMode {
    fn default() -> Self {
        OutputMode::Annotation {
            format: AnnotationFormat::Gff,
            nreport: DEFAULT_NREPORT,
        }
    }
}

///
/// Options of a scan. Genome and background file are mutually exclusive background sources;
/// the genome wins when both are given.
///
#[derive(Debug, Clone, PartialEq)]
pub struct ScanOptions {
    pub mode: OutputMode,
    /// False positive rate in `[0, 1]`.
    pub fpr: Option<f64>,
    /// Explicit score cutoff, takes precedence over `fpr`.
    pub cutoff: Option<f64>,
    pub scan_rc: bool,
    pub genome: Option<PathBuf>,
    pub bgfile: Option<PathBuf>,
    pub zscore: bool,
    pub gc: bool,
    pub ncpus: Option<usize>,
    pub seed: Option<u64>,
    pub progress: bool,
    pub motif_config: MotifConfig,
}

impl Default for ScanOptions {
    fn default() -> Self {
        ScanOptions {
            mode: OutputMode::default(),
            fpr: None,
            cutoff: None,
            scan_rc: true,
            genome: None,
            bgfile: None,
            zscore: true,
            gc: true,
            ncpus: None,
            seed: None,
            progress: false,
            motif_config: MotifConfig::default(),
        }
    }
}

impl ScanOptions {
    /// False positive rate the detection threshold is calibrated with, if any.
    pub fn effective_fpr(&self) -> Option<f64> {
        match self.mode {
            OutputMode::ScoreTable => None,
            OutputMode::CountTable { .. } => Some(self.fpr.unwrap_or(DEFAULT_FPR)),
            OutputMode::Annotation { .. } => match (self.fpr, self.cutoff) {
                (None, None) => Some(DEFAULT_FPR),
                (fpr, _) => fpr,
            },
        }
    }

    /// Cutoff passed to the engine. Count tables always calibrate on the false positive rate.
    pub fn effective_cutoff(&self) -> Option<f64> {
        match self.mode {
            OutputMode::Annotation { .. } => self.cutoff,
            _ => None,
        }
    }
}

///
/// Where a streaming scan writes to.
///
pub enum OutputTarget<'a> {
    Stdout,
    /// A stream owned by the caller. It is flushed, never closed.
    Writer(&'a mut dyn Write),
    /// A file created by the scan, parent directories included.
    Path(PathBuf),
}

impl From<PathBuf> for OutputTarget<'_> {
    fn from(value: PathBuf) -> Self {
        OutputTarget::Path(value)
    }
}

impl From<&Path> for OutputTarget<'_> {
    fn from(value: &Path) -> Self {
        OutputTarget::Path(value.to_path_buf())
    }
}

impl<'a, P: Into<OutputTarget<'a>>> From<Option<P>> for OutputTarget<'a> {
    fn from(value: Option<P>) -> Self {
        value.map_or(OutputTarget::Stdout, Into::into)
    }
}

enum Handle<'a> {
    Stdout(StdoutLock<'static>),
    Borrowed(&'a mut dyn Write),
    Owned(BufWriter<File>),
}

///
/// An open output. Files opened here are closed on every exit path; stdout and caller
/// streams are left open.
///
pub(crate) struct Sink<'a> {
    handle: Handle<'a>,
}

impl<'a> Sink<'a> {
    pub(crate) fn open(target: OutputTarget<'a>) -> Result<Self> {
        let handle = match target {
            OutputTarget::Stdout => Handle::Stdout(stdout().lock()),
            OutputTarget::Writer(writer) => Handle::Borrowed(writer),
            OutputTarget::Path(path) => {
                let path = PathBuf::from(shellexpand::tilde(&path.to_string_lossy()).into_owned());
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    create_dir_all(parent)?;
                }
                Handle::Owned(BufWriter::new(File::create(&path)?))
            }
        };
        Ok(Sink { handle })
    }

    pub(crate) fn owns_handle(&self) -> bool {
        matches!(self.handle, Handle::Owned(_))
    }

    fn writer(&mut self) -> &mut dyn Write {
        match &mut self.handle {
            Handle::Stdout(lock) => lock,
            Handle::Borrowed(writer) => &mut **writer,
            Handle::Owned(writer) => writer,
        }
    }

    pub(crate) fn write_line(&mut self, line: &str) -> Result<()> {
        writeln!(self.writer(), "{}", line)?;
        Ok(())
    }

    /// Flush everything written. A file opened by this sink is closed afterwards; a failure
    /// to close it is logged and ignored.
    pub(crate) fn finish(self) -> Result<()> {
        match self.handle {
            Handle::Stdout(mut lock) => lock.flush()?,
            Handle::Borrowed(writer) => writer.flush()?,
            Handle::Owned(writer) => {
                let file = writer.into_inner().map_err(|e| e.into_error())?;
                if let Err(e) = file.sync_all() {
                    debug!("Ignoring error while closing the output file: {}", e);
                }
            }
        }
        Ok(())
    }
}

///
/// Header comment block of a streaming scan.
///
pub fn header_lines(input: &Path, source: &MotifSource, options: &ScanOptions) -> Vec<String> {
    let mut lines = vec![
        format!("# pfmscan version {}", VERSION),
        format!("# Input: {}", input.display()),
        format!("# Motifs: {}", source),
    ];

    let bg_source = options.genome.as_ref().or(options.bgfile.as_ref());
    if let (Some(fpr), Some(bg)) = (options.effective_fpr(), bg_source) {
        lines.push(format!("# FPR: {} ({})", fpr, bg.display()));
    }
    if let Some(cutoff) = options.effective_cutoff() {
        lines.push(format!("# Threshold: {}", cutoff));
    }

    let scoring = match (options.zscore, options.gc) {
        (true, true) => "GC frequency normalized z-score",
        (true, false) => "normalized z-score",
        (false, _) => "logodds score",
    };
    lines.push(format!("# Scoring: {}", scoring));
    lines
}

pub(crate) fn load_genome(path: Option<&Path>) -> Result<Option<Arc<Genome>>> {
    match path {
        Some(path) => {
            info!("Loading genome {}", path.display());
            Ok(Some(Arc::new(Genome::try_from(path)?)))
        }
        None => Ok(None),
    }
}

///
/// Set the background of an engine from a genome or, failing that, a background file.
/// Backgrounds from a file are never GC stratified. Without either source the engine keeps
/// no background.
///
/// # Arguments
///
/// - engine: the engine to configure
/// - genome: genome to draw background windows from
/// - bgfile: FASTA file of background sequences
/// - size: representative sequence length, computed only when a background is set
/// - gc: stratify genomic background by GC content
///
pub(crate) fn configure_background<E, F>(
    engine: &mut E,
    genome: Option<&Arc<Genome>>,
    bgfile: Option<&Path>,
    size: F,
    gc: bool,
) -> Result<()>
where
    E: ScanEngine + ?Sized,
    F: FnOnce() -> Result<usize>,
{
    match (genome, bgfile) {
        (Some(genome), _) => engine.set_background(None, Some(genome.clone()), size()?, gc),
        (None, Some(bgfile)) => engine.set_background(Some(bgfile), None, size()?, false),
        (None, None) => {
            debug!("No genome or background file, scanning without a background");
            Ok(())
        }
    }
}

pub(crate) fn table_header(ids: &[String]) -> String {
    format!("\t{}", ids.join("\t"))
}

///
/// Scan a sequence file and stream the results to an output.
///
/// The motif source is resolved first and a header block is written, then the bundled
/// [`PwmScanner`] is configured and the results are written in input order.
///
/// # Arguments
///
/// - input: FASTA, BED or region file
/// - motifs: motif list, motif file, or `None` for the configured default database
/// - target: output, stdout when `None`
/// - options: scan options
///
/// # Examples
///
/// ```no_run
/// use pfmscan_scanner::pipeline::{scan_to_file, OutputTarget, ScanOptions};
///
/// let options = ScanOptions::default();
/// scan_to_file("peaks.fa", "motifs.pfm", OutputTarget::Stdout, &options).unwrap();
/// ```
pub fn scan_to_file<'a>(
    input: impl AsRef<Path>,
    motifs: impl Into<MotifInput>,
    target: impl Into<OutputTarget<'a>>,
    options: &ScanOptions,
) -> Result<()> {
    let mut engine = PwmScanner::new(options.ncpus, options.seed, options.progress)?;
    scan_to_file_with(&mut engine, input, motifs, target, options)
}

///
/// [`scan_to_file`] with a caller provided engine.
///
pub fn scan_to_file_with<'a, E: ScanEngine + ?Sized>(
    engine: &mut E,
    input: impl AsRef<Path>,
    motifs: impl Into<MotifInput>,
    target: impl Into<OutputTarget<'a>>,
    options: &ScanOptions,
) -> Result<()> {
    let input = input.as_ref();
    let source = check_motifs(motifs.into(), &options.motif_config)?;

    let mut sink = Sink::open(target.into())?;
    for line in header_lines(input, &source, options) {
        sink.write_line(&line)?;
    }

    let motifs = source.load()?;
    let genome = load_genome(options.genome.as_deref())?;
    engine.set_motifs(&motifs)?;
    engine.set_genome(genome.clone())?;

    info!("Reading input sequences from {}", input.display());
    let seqs = SequenceSet::from_input(input, genome.as_deref())?;

    configure_background(
        engine,
        genome.as_ref(),
        options.bgfile.as_deref(),
        || Ok(seqs.median_length()?),
        options.gc,
    )?;

    if options.mode != OutputMode::ScoreTable {
        info!("Setting threshold");
        engine.set_threshold(options.effective_fpr(), options.effective_cutoff())?;
    }

    match options.mode {
        OutputMode::CountTable { nreport } => {
            sink.write_line(&table_header(&engine.motif_ids()))?;
            for (seq, counts) in seqs.iter().zip(engine.count(&seqs, nreport, options.scan_rc)?) {
                let counts: Vec<String> = counts?.iter().map(|c| c.to_string()).collect();
                sink.write_line(&format!("{}\t{}", seq.id, counts.join("\t")))?;
            }
        }
        OutputMode::ScoreTable => {
            sink.write_line(&table_header(&engine.motif_ids()))?;
            let stream = engine.best_score(&seqs, options.scan_rc, options.zscore, options.gc)?;
            for (seq, scores) in seqs.iter().zip(stream) {
                let scores: Vec<String> = scores?
                    .iter()
                    .map(|s| format!("{:.*}", SCORE_PRECISION, s))
                    .collect();
                sink.write_line(&format!("{}\t{}", seq.id, scores.join("\t")))?;
            }
        }
        OutputMode::Annotation { format, nreport } => {
            let stream = engine.scan(
                &seqs,
                nreport,
                options.scan_rc,
                options.zscore,
                options.gc,
            )?;
            for (seq, result) in seqs.iter().zip(stream) {
                for (motif, matches) in motifs.iter().zip(result?) {
                    for hit in matches.iter() {
                        sink.write_line(&format_line(seq, motif.id(), motif.len(), hit, format))?;
                    }
                }
            }
        }
    }

    if sink.owns_handle() {
        debug!("Closing the output file");
    }
    sink.finish()
}
