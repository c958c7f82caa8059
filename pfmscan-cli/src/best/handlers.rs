use std::io::{Write, stdout};
use std::path::PathBuf;

use anyhow::Result;
use clap::ArgMatches;

use pfmscan_scanner::formatter::format_score;
use pfmscan_scanner::{BestBy, BestMatchOptions, BestMatches, MotifConfig, scan_to_best_match};

/// One line per motif: the motif id followed by one value per sequence.
fn render(result: &BestMatches) -> Vec<String> {
    match result {
        BestMatches::Scores(scores) => scores
            .iter()
            .map(|(id, values)| {
                let values: Vec<String> = values.iter().map(|s| format_score(*s)).collect();
                format!("{}\t{}", id, values.join("\t"))
            })
            .collect(),
        BestMatches::Matches(matches) => matches
            .iter()
            .map(|(id, values)| {
                let values: Vec<String> = values
                    .iter()
                    .map(|m| match m {
                        Some(m) => format!("{}:{}:{}", format_score(m.score), m.pos, m.strand),
                        None => "NA".to_string(),
                    })
                    .collect();
                format!("{}\t{}", id, values.join("\t"))
            })
            .collect(),
    }
}

pub fn run_best(matches: &ArgMatches) -> Result<()> {
    // get arguments from CLI
    let input = matches
        .get_one::<String>("input")
        .expect("An input file is required.");

    let pfmfile = matches.get_one::<String>("pfmfile").cloned();
    let best_by = if matches.get_flag("score") {
        BestBy::Score
    } else {
        BestBy::Match
    };

    let options = BestMatchOptions {
        best_by,
        genome: matches.get_one::<String>("genome").map(PathBuf::from),
        zscore: matches.get_flag("zscore"),
        gc: matches.get_flag("gc"),
        ncpus: matches.get_one::<usize>("ncpus").copied(),
        seed: matches.get_one::<u64>("seed").copied(),
        progress: false,
        motif_config: MotifConfig::load()?,
    };

    let result = scan_to_best_match(input, pfmfile, &options)?;

    let mut handle = stdout().lock();
    for line in render(&result) {
        writeln!(handle, "{}", line)?;
    }
    handle.flush()?;

    Ok(())
}
