//! Region by motif tables of counts or best scores.
use std::collections::HashSet;
use std::fmt::{self, Display};
use std::fs::{File, create_dir_all};
use std::io::{BufRead, BufWriter, Write};
use std::path::Path;
use std::str::FromStr;

use arrow::array::{Array, StringArray};
use arrow::compute::cast;
use arrow::datatypes::DataType;
use arrow::ipc::reader::FileReader;
use arrow::record_batch::RecordBatch;
use flate2::Compression;
use flate2::write::GzEncoder;
use log::info;
use ndarray::{Array2, ArrayView1, Axis};
use parquet::arrow::arrow_reader::ParquetRecordBatchReaderBuilder;

use pfmscan_core::models::SequenceSet;
use pfmscan_core::utils::get_dynamic_reader;

use crate::background::{estimate_background_size, seeded_rng};
use crate::config::MotifConfig;
use crate::consts::{DEFAULT_COUNT_NREPORT, DEFAULT_FPR, SCORE_PRECISION};
use crate::engine::{PwmScanner, ScanEngine};
use crate::errors::{Result, ScanError};
use crate::motifs::{MotifInput, check_motifs};
use crate::pipeline::load_genome;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TableScoring {
    /// Matches per motif, at the default false positive rate.
    #[default]
    Count,
    /// Best score per motif.
    Score,
}

impl FromStr for TableScoring {
    type Err = ScanError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "count" => Ok(TableScoring::Count),
            "score" => Ok(TableScoring::Score),
            other => Err(ScanError::InvalidInput(format!(
                "unknown scoring {}, expected count or score",
                other
            ))),
        }
    }
}

impl Display for TableScoring {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableScoring::Count => write!(f, "count"),
            TableScoring::Score => write!(f, "score"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TableOptions {
    pub scoring: TableScoring,
    /// Only used for score tables.
    pub zscore: bool,
    pub gc: bool,
    pub ncpus: Option<usize>,
    pub seed: Option<u64>,
    pub progress: bool,
    pub motif_config: MotifConfig,
}

impl Default for TableOptions {
    fn default() -> Self {
        TableOptions {
            scoring: TableScoring::default(),
            zscore: true,
            gc: true,
            ncpus: None,
            seed: None,
            progress: false,
            motif_config: MotifConfig::default(),
        }
    }
}

/// A cell value of a [`RegionTable`].
pub trait TableValue: Copy {
    fn render(&self) -> String;
}

impl TableValue for u32 {
    fn render(&self) -> String {
        self.to_string()
    }
}

impl TableValue for f32 {
    fn render(&self) -> String {
        format!("{:.*}", SCORE_PRECISION, self)
    }
}

fn check_unique(keys: &[String], axis: &'static str) -> Result<()> {
    let mut seen = HashSet::with_capacity(keys.len());
    for key in keys {
        if !seen.insert(key.as_str()) {
            return Err(ScanError::DuplicateKey {
                axis,
                key: key.clone(),
            });
        }
    }
    Ok(())
}

///
/// A dense table with one row per region and one column per motif. Row and column keys are
/// unique and keep the order they were given in.
///
#[derive(Debug, Clone, PartialEq)]
pub struct RegionTable<T> {
    index: Vec<String>,
    columns: Vec<String>,
    data: Array2<T>,
}

impl<T: TableValue> RegionTable<T> {
    pub fn new(index: Vec<String>, columns: Vec<String>, data: Array2<T>) -> Result<Self> {
        if data.dim() != (index.len(), columns.len()) {
            return Err(ScanError::InvalidInput(format!(
                "table data of shape {:?} does not match {} rows and {} columns",
                data.dim(),
                index.len(),
                columns.len()
            )));
        }
        check_unique(&index, "row")?;
        check_unique(&columns, "column")?;

        Ok(RegionTable {
            index,
            columns,
            data,
        })
    }

    pub fn from_rows(index: Vec<String>, columns: Vec<String>, rows: Vec<Vec<T>>) -> Result<Self> {
        let shape = (rows.len(), columns.len());
        if let Some(row) = rows.iter().find(|r| r.len() != columns.len()) {
            return Err(ScanError::InvalidInput(format!(
                "table row has {} values, expected {}",
                row.len(),
                columns.len()
            )));
        }
        let flat: Vec<T> = rows.into_iter().flatten().collect();
        let data = Array2::from_shape_vec(shape, flat)
            .map_err(|e| ScanError::InvalidInput(e.to_string()))?;
        RegionTable::new(index, columns, data)
    }

    pub fn index(&self) -> &[String] {
        &self.index
    }

    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    pub fn data(&self) -> &Array2<T> {
        &self.data
    }

    pub fn shape(&self) -> (usize, usize) {
        self.data.dim()
    }

    pub fn get(&self, region: &str, motif: &str) -> Option<T> {
        let row = self.index.iter().position(|r| r == region)?;
        let col = self.columns.iter().position(|c| c == motif)?;
        self.data.get((row, col)).copied()
    }

    pub fn column(&self, motif: &str) -> Option<ArrayView1<'_, T>> {
        let col = self.columns.iter().position(|c| c == motif)?;
        Some(self.data.index_axis(Axis(1), col))
    }

    ///
    /// Write the table as tab separated text: a header of motif ids after an empty cell,
    /// then one line per region.
    ///
    pub fn write_tsv<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        writeln!(writer, "\t{}", self.columns.join("\t"))?;
        for (region, row) in self.index.iter().zip(self.data.rows()) {
            let values: Vec<String> = row.iter().map(|v| v.render()).collect();
            writeln!(writer, "{}\t{}", region, values.join("\t"))?;
        }
        Ok(())
    }
}

///
/// Result of [`scan_regionfile_to_table`]: integer counts or reduced precision scores.
///
#[derive(Debug, Clone, PartialEq)]
pub enum MotifTable {
    Counts(RegionTable<u32>),
    Scores(RegionTable<f32>),
}

impl MotifTable {
    pub fn index(&self) -> &[String] {
        match self {
            MotifTable::Counts(t) => t.index(),
            MotifTable::Scores(t) => t.index(),
        }
    }

    pub fn columns(&self) -> &[String] {
        match self {
            MotifTable::Counts(t) => t.columns(),
            MotifTable::Scores(t) => t.columns(),
        }
    }

    pub fn shape(&self) -> (usize, usize) {
        match self {
            MotifTable::Counts(t) => t.shape(),
            MotifTable::Scores(t) => t.shape(),
        }
    }

    pub fn write_tsv<W: Write + ?Sized>(&self, writer: &mut W) -> Result<()> {
        match self {
            MotifTable::Counts(t) => t.write_tsv(writer),
            MotifTable::Scores(t) => t.write_tsv(writer),
        }
    }

    pub fn to_tsv(&self) -> Result<String> {
        let mut buffer: Vec<u8> = Vec::new();
        self.write_tsv(&mut buffer)?;
        String::from_utf8(buffer).map_err(|e| ScanError::InvalidInput(e.to_string()))
    }

    ///
    /// Write the table to a file, gzip compressed when the path ends with `.gz`.
    ///
    pub fn write_to_file<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            create_dir_all(parent)?;
        }

        let file = File::create(path)?;
        if path.extension().is_some_and(|ext| ext == "gz") {
            let mut encoder = GzEncoder::new(BufWriter::new(file), Compression::default());
            self.write_tsv(&mut encoder)?;
            encoder.finish()?.flush()?;
        } else {
            let mut writer = BufWriter::new(file);
            self.write_tsv(&mut writer)?;
            writer.flush()?;
        }
        Ok(())
    }
}

fn push_first_column(batch: &RecordBatch, ids: &mut Vec<String>) -> Result<()> {
    if batch.num_columns() == 0 {
        return Err(ScanError::InvalidInput("region table has no columns".to_string()));
    }
    let column = cast(batch.column(0), &DataType::Utf8)?;
    let values = column
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| ScanError::InvalidInput("unreadable region id column".to_string()))?;

    for value in values.iter() {
        match value {
            Some(id) => ids.push(id.to_string()),
            None => return Err(ScanError::InvalidInput("missing region id".to_string())),
        }
    }
    Ok(())
}

fn read_text_ids(path: &Path) -> Result<Vec<String>> {
    let reader = get_dynamic_reader(path)?;
    let mut ids = Vec::new();
    let mut header = true;

    for line in reader.lines() {
        let line = line?;
        let line = line.split('#').next().unwrap_or_default();
        if line.trim().is_empty() {
            continue;
        }
        // first line holds the column names
        if header {
            header = false;
            continue;
        }
        let id = line.split('\t').next().unwrap_or_default().trim();
        ids.push(id.to_string());
    }

    Ok(ids)
}

///
/// Read the region ids of a region table, in file order.
///
/// Feather (Arrow IPC) and Parquet files use their first column. Any other file is read as
/// tab separated text with a header line, `#` comments and the ids in the first column.
///
pub fn read_region_ids<P: AsRef<Path>>(path: P) -> Result<Vec<String>> {
    let path = path.as_ref();
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();

    match ext.as_str() {
        "feather" | "arrow" | "ipc" => {
            let reader = FileReader::try_new(File::open(path)?, None)?;
            let mut ids = Vec::new();
            for batch in reader {
                push_first_column(&batch?, &mut ids)?;
            }
            Ok(ids)
        }
        "parquet" => {
            let reader = ParquetRecordBatchReaderBuilder::try_new(File::open(path)?)?.build()?;
            let mut ids = Vec::new();
            for batch in reader {
                push_first_column(&batch?, &mut ids)?;
            }
            Ok(ids)
        }
        _ => read_text_ids(path),
    }
}

///
/// Scan the regions of a region table and build a region by motif table.
///
/// # Arguments
///
/// - input_table: region table, ids in the first column
/// - genome: genome FASTA the regions are resolved against
/// - motifs: motif list, motif file, or `None` for the configured default database
/// - options: table options
///
/// # Returns
///
/// Counts at the default false positive rate, or best scores, per region and motif.
///
pub fn scan_regionfile_to_table(
    input_table: impl AsRef<Path>,
    genome: impl AsRef<Path>,
    motifs: impl Into<MotifInput>,
    options: &TableOptions,
) -> Result<MotifTable> {
    let mut engine = PwmScanner::new(options.ncpus, options.seed, options.progress)?;
    scan_regionfile_to_table_with(&mut engine, input_table, genome, motifs, options)
}

///
/// [`scan_regionfile_to_table`] with a caller provided engine.
///
pub fn scan_regionfile_to_table_with<E: ScanEngine + ?Sized>(
    engine: &mut E,
    input_table: impl AsRef<Path>,
    genome: impl AsRef<Path>,
    motifs: impl Into<MotifInput>,
    options: &TableOptions,
) -> Result<MotifTable> {
    let source = check_motifs(motifs.into(), &options.motif_config)?;

    info!("Reading table");
    let regions = read_region_ids(input_table)?;
    check_unique(&regions, "row")?;

    let genome = load_genome(Some(genome.as_ref()))?
        .ok_or_else(|| ScanError::InvalidInput("a genome is required".to_string()))?;
    let size = estimate_background_size(&regions, &genome, &mut seeded_rng(options.seed))?;

    let motifs = source.load()?;
    engine.set_motifs(&motifs)?;
    engine.set_genome(Some(genome.clone()))?;
    engine.set_background(None, Some(genome.clone()), size, options.gc)?;

    let seqs = SequenceSet::from_region_ids(&regions, &genome)?;

    let table = match options.scoring {
        TableScoring::Count => {
            info!("Setting threshold");
            engine.set_threshold(Some(DEFAULT_FPR), None)?;
            info!("Creating count table");
            let rows = engine
                .count(&seqs, DEFAULT_COUNT_NREPORT, true)?
                .map(|r| r.map(|counts| counts.into_iter().map(|c| c as u32).collect::<Vec<u32>>()))
                .collect::<Result<Vec<Vec<u32>>>>()?;
            MotifTable::Counts(RegionTable::from_rows(regions, engine.motif_ids(), rows)?)
        }
        TableScoring::Score => {
            let scoring = match (options.zscore, options.gc) {
                (true, true) => "z-score, GC%",
                (true, false) => "z-score",
                (false, _) => "logodds",
            };
            info!("Creating score table ({})", scoring);
            let rows = engine
                .best_score(&seqs, true, options.zscore, options.gc)?
                .map(|r| r.map(|scores| scores.into_iter().map(|s| s as f32).collect::<Vec<f32>>()))
                .collect::<Result<Vec<Vec<f32>>>>()?;
            MotifTable::Scores(RegionTable::from_rows(regions, engine.motif_ids(), rows)?)
        }
    };

    info!("Done");
    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::fs::{read_to_string, write};
    use std::io::Read;
    use std::sync::Arc;

    use arrow::array::{ArrayRef, Int64Array};
    use arrow::datatypes::{Field, Schema};
    use arrow::ipc::writer::FileWriter;
    use flate2::read::GzDecoder;
    use parquet::arrow::ArrowWriter;
    use pfmscan_core::models::Motif;
    use pretty_assertions::assert_eq;
    use rstest::*;
    use tempfile::{TempDir, tempdir};

    use crate::engine::recording::RecordingEngine;

    struct Fixture {
        dir: TempDir,
        genome: std::path::PathBuf,
        regions: std::path::PathBuf,
    }

    #[fixture]
    fn fixture() -> Fixture {
        let dir = tempdir().unwrap();
        let genome = dir.path().join("genome.fa");
        write(
            &genome,
            format!(">chr1\n{}\n>chr2\n{}\n", "ACGTGATAC".repeat(30), "TTGCA".repeat(40)),
        )
        .unwrap();

        let regions = dir.path().join("regions.tsv");
        write(
            &regions,
            "# peaks\n\tsignal\nchr1:10-30\t1.5\nchr2:0-50\t2.0\nchr1:100-110\t0.3\n",
        )
        .unwrap();

        Fixture {
            dir,
            genome,
            regions,
        }
    }

    fn motifs() -> Vec<Motif> {
        vec![
            Motif::from_consensus("m1", "GATA"),
            Motif::from_consensus("m2", "TTGCA"),
        ]
    }

    fn table_with(fixture: &Fixture, options: &TableOptions) -> (RecordingEngine, MotifTable) {
        let mut engine = RecordingEngine::default();
        let table = scan_regionfile_to_table_with(
            &mut engine,
            &fixture.regions,
            &fixture.genome,
            motifs(),
            options,
        )
        .unwrap();
        (engine, table)
    }

    #[rstest]
    fn test_read_text_ids(fixture: Fixture) {
        let ids = read_region_ids(&fixture.regions).unwrap();
        assert_eq!(ids, vec!["chr1:10-30", "chr2:0-50", "chr1:100-110"]);
    }

    #[rstest]
    fn test_read_feather_ids() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("regions.feather");

        let schema = Arc::new(Schema::new(vec![Field::new("loc", DataType::Utf8, false)]));
        let column: ArrayRef = Arc::new(StringArray::from(vec!["chr1:0-10", "chr1:20-30"]));
        let batch = RecordBatch::try_new(schema.clone(), vec![column]).unwrap();

        let mut writer = FileWriter::try_new(File::create(&path).unwrap(), &schema).unwrap();
        writer.write(&batch).unwrap();
        writer.finish().unwrap();

        assert_eq!(read_region_ids(&path).unwrap(), vec!["chr1:0-10", "chr1:20-30"]);
    }

    #[rstest]
    fn test_read_parquet_ids_casts_first_column() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("regions.parquet");

        let schema = Arc::new(Schema::new(vec![Field::new("id", DataType::Int64, false)]));
        let column: ArrayRef = Arc::new(Int64Array::from(vec![3, 1, 2]));
        let batch = RecordBatch::try_new(schema.clone(), vec![column]).unwrap();

        let mut writer = ArrowWriter::try_new(File::create(&path).unwrap(), schema, None).unwrap();
        writer.write(&batch).unwrap();
        writer.close().unwrap();

        assert_eq!(read_region_ids(&path).unwrap(), vec!["3", "1", "2"]);
    }

    #[rstest]
    fn test_count_table(fixture: Fixture) {
        let (engine, table) = table_with(&fixture, &TableOptions::default());

        assert_eq!(
            engine.calls,
            vec!["set_motifs", "set_genome", "set_background", "set_threshold"]
        );
        assert_eq!(engine.threshold, Some((Some(DEFAULT_FPR), None)));
        // median region length of 20, 50 and 10
        assert_eq!(engine.background, Some((None, true, 20, true)));

        match &table {
            MotifTable::Counts(counts) => {
                assert_eq!(counts.shape(), (3, 2));
                assert_eq!(counts.get("chr2:0-50", "m2"), Some(50));
                assert_eq!(counts.column("m1").unwrap().to_vec(), vec![20, 50, 10]);
            }
            other => panic!("expected a count table, got {:?}", other),
        }
        assert_eq!(table.index(), ["chr1:10-30", "chr2:0-50", "chr1:100-110"]);
        assert_eq!(table.columns(), ["m1", "m2"]);
    }

    #[rstest]
    fn test_score_table(fixture: Fixture) {
        let options = TableOptions {
            scoring: TableScoring::Score,
            ..Default::default()
        };
        let (engine, table) = table_with(&fixture, &options);

        assert_eq!(engine.threshold, None);
        match &table {
            MotifTable::Scores(scores) => {
                assert_eq!(scores.shape(), (3, 2));
                assert_eq!(scores.get("chr1:10-30", "m2"), Some(20.25f32));
            }
            other => panic!("expected a score table, got {:?}", other),
        }
        assert_eq!(
            table.to_tsv().unwrap(),
            "\tm1\tm2\nchr1:10-30\t20.0000\t20.2500\nchr2:0-50\t50.0000\t50.2500\nchr1:100-110\t10.0000\t10.2500\n"
        );
    }

    #[rstest]
    fn test_duplicate_regions(fixture: Fixture) {
        write(&fixture.regions, "\tsignal\nchr1:10-30\t1\nchr1:10-30\t2\n").unwrap();
        let mut engine = RecordingEngine::default();
        let result = scan_regionfile_to_table_with(
            &mut engine,
            &fixture.regions,
            &fixture.genome,
            motifs(),
            &TableOptions::default(),
        );

        assert!(matches!(
            result,
            Err(ScanError::DuplicateKey { axis: "row", .. })
        ));
    }

    #[rstest]
    fn test_duplicate_motif_ids() {
        let result = RegionTable::from_rows(
            vec!["r1".to_string()],
            vec!["m1".to_string(), "m1".to_string()],
            vec![vec![1u32, 2]],
        );
        assert!(matches!(
            result,
            Err(ScanError::DuplicateKey { axis: "column", .. })
        ));
    }

    #[rstest]
    fn test_ragged_rows() {
        let result = RegionTable::from_rows(
            vec!["r1".to_string()],
            vec!["m1".to_string(), "m2".to_string()],
            vec![vec![1u32]],
        );
        assert!(matches!(result, Err(ScanError::InvalidInput(_))));
    }

    #[rstest]
    #[case("counts.tsv")]
    #[case("counts.tsv.gz")]
    fn test_write_to_file(fixture: Fixture, #[case] name: &str) {
        let (_, table) = table_with(&fixture, &TableOptions::default());
        let path = fixture.dir.path().join("out").join(name);
        table.write_to_file(&path).unwrap();

        let text = if name.ends_with(".gz") {
            let mut text = String::new();
            GzDecoder::new(File::open(&path).unwrap())
                .read_to_string(&mut text)
                .unwrap();
            text
        } else {
            read_to_string(&path).unwrap()
        };
        assert_eq!(text, table.to_tsv().unwrap());
    }

    #[rstest]
    fn test_count_table_with_pwm_scanner(fixture: Fixture) {
        let options = TableOptions {
            seed: Some(11),
            ncpus: Some(1),
            ..Default::default()
        };
        let table = scan_regionfile_to_table(
            &fixture.regions,
            &fixture.genome,
            motifs(),
            &options,
        )
        .unwrap();

        assert_eq!(table.shape(), (3, 2));
        assert!(matches!(table, MotifTable::Counts(_)));
    }

    #[rstest]
    #[case("count", TableScoring::Count)]
    #[case("score", TableScoring::Score)]
    fn test_scoring_from_str(#[case] s: &str, #[case] scoring: TableScoring) {
        assert_eq!(s.parse::<TableScoring>().unwrap(), scoring);
        assert_eq!(scoring.to_string(), s);
    }
}
