use clap::{Arg, ArgAction, Command, arg, value_parser};

pub const TABLE_CMD: &str = "table";

pub fn create_table_cli() -> Command {
    Command::new(TABLE_CMD)
        .about("Create a table of motif counts or scores for the regions of a region file.")
        .arg(
            Arg::new("regions")
                .required(true)
                .help("Region table (text, feather or parquet) with regions in the first column"),
        )
        .arg(
            arg!(-g --genome <GENOME>)
                .required(true)
                .help("Genome FASTA the regions are resolved against"),
        )
        .arg(arg!(-p --pfmfile <PFMFILE>).help("PFM file with motifs (default: configured motif database)"))
        .arg(
            arg!(--scoring <SCORING>)
                .value_parser(["count", "score"])
                .default_value("count")
                .help("Count matches or report the best score per motif"),
        )
        .arg(arg!(-o --output <OUTPUT>).help("Output file, gzipped when ending with .gz (default: stdout)"))
        .arg(
            arg!(--"no-zscore")
                .action(ArgAction::SetTrue)
                .help("Report log-odds scores instead of z-scores"),
        )
        .arg(
            arg!(--"no-gc")
                .action(ArgAction::SetTrue)
                .help("Do not normalize by GC content"),
        )
        .arg(
            arg!(-N --ncpus <NCPUS>)
                .value_parser(value_parser!(usize))
                .help("Number of threads"),
        )
        .arg(
            arg!(--seed <SEED>)
                .value_parser(value_parser!(u64))
                .help("Seed for region and background sampling"),
        )
        .arg(
            arg!(--progress)
                .action(ArgAction::SetTrue)
                .help("Show a progress bar"),
        )
}
