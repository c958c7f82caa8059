use clap::{Arg, ArgAction, Command, arg, value_parser};

pub const SCAN_CMD: &str = "scan";

pub fn create_scan_cli() -> Command {
    Command::new(SCAN_CMD)
        .about("Scan a FASTA, BED or region file for motif matches.")
        .arg(
            Arg::new("input")
                .required(true)
                .help("FASTA, BED or region file (chr:start-end per line)"),
        )
        .arg(arg!(-p --pfmfile <PFMFILE>).help("PFM file with motifs (default: configured motif database)"))
        .arg(arg!(-o --output <OUTPUT>).help("Output file (default: stdout)"))
        .arg(
            arg!(-n --nreport <NREPORT>)
                .value_parser(value_parser!(usize))
                .default_value("1")
                .help("Maximum number of matches to report per motif and sequence"),
        )
        .arg(
            arg!(-f --fpr <FPR>)
                .value_parser(value_parser!(f64))
                .help("False positive rate for motif detection (default: 0.01)"),
        )
        .arg(
            arg!(-c --cutoff <CUTOFF>)
                .value_parser(value_parser!(f64))
                .help("Motif score cutoff, relative to the score range of each motif"),
        )
        .arg(
            arg!(-b --bed)
                .action(ArgAction::SetTrue)
                .help("Report matches in BED format"),
        )
        .arg(
            arg!(-t --table)
                .action(ArgAction::SetTrue)
                .conflicts_with("score-table")
                .help("Report a table of match counts per sequence"),
        )
        .arg(
            arg!(-T --"score-table")
                .action(ArgAction::SetTrue)
                .help("Report a table of best scores per sequence"),
        )
        .arg(
            arg!(--"no-rc")
                .action(ArgAction::SetTrue)
                .help("Do not scan the reverse complement"),
        )
        .arg(arg!(-g --genome <GENOME>).help("Genome FASTA, used to resolve regions and as background"))
        .arg(arg!(--bgfile <BGFILE>).help("FASTA file with background sequences"))
        .arg(
            arg!(--"no-zscore")
                .action(ArgAction::SetTrue)
                .help("Report log-odds scores instead of z-scores"),
        )
        .arg(
            arg!(--"no-gc")
                .action(ArgAction::SetTrue)
                .help("Do not normalize z-scores by GC content"),
        )
        .arg(
            arg!(-N --ncpus <NCPUS>)
                .value_parser(value_parser!(usize))
                .help("Number of threads"),
        )
        .arg(
            arg!(--seed <SEED>)
                .value_parser(value_parser!(u64))
                .help("Seed for background sampling"),
        )
        .arg(
            arg!(--progress)
                .action(ArgAction::SetTrue)
                .help("Show a progress bar"),
        )
}
