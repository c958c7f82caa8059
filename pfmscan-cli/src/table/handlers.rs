use std::io::{Write, stdout};
use std::str::FromStr;

use anyhow::Result;
use clap::ArgMatches;
use log::info;

use pfmscan_scanner::{MotifConfig, TableOptions, TableScoring, scan_regionfile_to_table};

pub fn run_table(matches: &ArgMatches) -> Result<()> {
    // get arguments from CLI
    let regions = matches
        .get_one::<String>("regions")
        .expect("A region file is required.");

    let genome = matches
        .get_one::<String>("genome")
        .expect("A genome is required.");

    let pfmfile = matches.get_one::<String>("pfmfile").cloned();
    let scoring = match matches.get_one::<String>("scoring") {
        Some(scoring) => match TableScoring::from_str(scoring) {
            Ok(scoring) => scoring,
            Err(_err) => anyhow::bail!("Unknown scoring supplied: {}", scoring),
        },
        None => TableScoring::default(),
    };

    let options = TableOptions {
        scoring,
        zscore: !matches.get_flag("no-zscore"),
        gc: !matches.get_flag("no-gc"),
        ncpus: matches.get_one::<usize>("ncpus").copied(),
        seed: matches.get_one::<u64>("seed").copied(),
        progress: matches.get_flag("progress"),
        motif_config: MotifConfig::load()?,
    };

    let table = scan_regionfile_to_table(regions, genome, pfmfile, &options)?;

    match matches.get_one::<String>("output") {
        Some(output) => {
            info!("Writing table to {}", output);
            table.write_to_file(output)?;
        }
        None => {
            let mut handle = stdout().lock();
            table.write_tsv(&mut handle)?;
            handle.flush()?;
        }
    }

    Ok(())
}
