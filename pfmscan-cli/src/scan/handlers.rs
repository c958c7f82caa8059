use std::path::PathBuf;

use anyhow::Result;
use clap::ArgMatches;
use log::info;

use pfmscan_scanner::consts::DEFAULT_NREPORT;
use pfmscan_scanner::formatter::AnnotationFormat;
use pfmscan_scanner::{MotifConfig, OutputMode, ScanOptions, scan_to_file};

pub fn run_scan(matches: &ArgMatches) -> Result<()> {
    // get arguments from CLI
    let input = matches
        .get_one::<String>("input")
        .expect("An input file is required.");

    let pfmfile = matches.get_one::<String>("pfmfile").cloned();
    let output = matches.get_one::<String>("output").map(PathBuf::from);
    let nreport = matches
        .get_one::<usize>("nreport")
        .copied()
        .unwrap_or(DEFAULT_NREPORT);

    let fpr = matches.get_one::<f64>("fpr").copied();
    if let Some(fpr) = fpr {
        if !(0.0..=1.0).contains(&fpr) {
            anyhow::bail!("The false positive rate should be between 0 and 1, got {}", fpr);
        }
    }

    let mode = if matches.get_flag("table") {
        OutputMode::CountTable { nreport }
    } else if matches.get_flag("score-table") {
        OutputMode::ScoreTable
    } else {
        let format = if matches.get_flag("bed") {
            AnnotationFormat::Bed
        } else {
            AnnotationFormat::Gff
        };
        OutputMode::Annotation { format, nreport }
    };

    let options = ScanOptions {
        mode,
        fpr,
        cutoff: matches.get_one::<f64>("cutoff").copied(),
        scan_rc: !matches.get_flag("no-rc"),
        genome: matches.get_one::<String>("genome").map(PathBuf::from),
        bgfile: matches.get_one::<String>("bgfile").map(PathBuf::from),
        zscore: !matches.get_flag("no-zscore"),
        gc: !matches.get_flag("no-gc"),
        ncpus: matches.get_one::<usize>("ncpus").copied(),
        seed: matches.get_one::<u64>("seed").copied(),
        progress: matches.get_flag("progress"),
        motif_config: MotifConfig::load()?,
    };

    if let Some(output) = &output {
        info!("Writing results to {}", output.display());
    }
    scan_to_file(input, pfmfile, output, &options)?;

    Ok(())
}
