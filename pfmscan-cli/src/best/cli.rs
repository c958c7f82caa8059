use clap::{Arg, ArgAction, Command, arg, value_parser};

pub const BEST_CMD: &str = "best";

pub fn create_best_cli() -> Command {
    Command::new(BEST_CMD)
        .about("Report the best match of every motif in every sequence.")
        .arg(
            Arg::new("input")
                .required(true)
                .help("FASTA file, or BED/region file together with a genome"),
        )
        .arg(arg!(-p --pfmfile <PFMFILE>).help("PFM file with motifs (default: configured motif database)"))
        .arg(arg!(-g --genome <GENOME>).help("Genome FASTA, used to resolve regions and as background"))
        .arg(
            arg!(--score)
                .action(ArgAction::SetTrue)
                .help("Report the best score instead of the best match"),
        )
        .arg(
            arg!(--zscore)
                .action(ArgAction::SetTrue)
                .help("Report z-scores, requires a genome"),
        )
        .arg(
            arg!(--gc)
                .action(ArgAction::SetTrue)
                .help("Normalize z-scores by GC content"),
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
}
