mod best;
mod scan;
mod table;

use anyhow::Result;
use clap::Command;

pub mod consts {
    pub const VERSION: &str = env!("CARGO_PKG_VERSION");
    pub const PKG_NAME: &str = "pfmscan";
    pub const BIN_NAME: &str = "pfmscan";
}

fn build_parser() -> Command {
    Command::new(consts::BIN_NAME)
        .bin_name(consts::BIN_NAME)
        .version(consts::VERSION)
        .author("Databio")
        .about("Scan sequences and genomic regions for transcription factor motifs.")
        .subcommand_required(true)
        .subcommand(scan::cli::create_scan_cli())
        .subcommand(table::cli::create_table_cli())
        .subcommand(best::cli::create_best_cli())
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let app = build_parser();
    let matches = app.get_matches();

    match matches.subcommand() {
        //
        // SCAN
        //
        Some((scan::cli::SCAN_CMD, matches)) => {
            scan::handlers::run_scan(matches)?;
        }

        //
        // REGION TABLE
        //
        Some((table::cli::TABLE_CMD, matches)) => {
            table::handlers::run_table(matches)?;
        }

        //
        // BEST MATCH
        //
        Some((best::cli::BEST_CMD, matches)) => {
            best::handlers::run_best(matches)?;
        }

        _ => unreachable!("Subcommand not found"),
    };

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parser_is_valid() {
        build_parser().debug_assert();
    }

    #[test]
    fn test_scan_modes_conflict() {
        let result =
            build_parser().try_get_matches_from(["pfmscan", "scan", "in.fa", "--table", "--score-table"]);
        assert!(result.is_err());
    }
}
