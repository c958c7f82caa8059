use std::path::PathBuf;

use pretty_assertions::assert_eq;
use rstest::*;

use pfmscan_core::CoreError;
use pfmscan_core::models::sequence::{InputKind, sniff_input_kind};
use pfmscan_core::models::{Genome, Region, SequenceSet};
use pfmscan_core::utils::read_motifs;

#[fixture]
fn path_to_data() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../tests/data")
}

#[fixture]
fn genome(path_to_data: PathBuf) -> Genome {
    Genome::try_from(path_to_data.join("genome.fa").as_path()).unwrap()
}

#[rstest]
fn test_genome_contigs(genome: Genome) {
    assert_eq!(genome.len(), 2);
    assert_eq!(genome.contig("chr1").map(|s| s.len()), Some(3000));
    assert_eq!(genome.contig("chr2").map(|s| s.len()), Some(2000));
}

#[rstest]
fn test_genome_fetch(genome: Genome) {
    let site = genome.fetch(&Region::new("chr1", 120, 124)).unwrap();
    assert_eq!(site, b"GATA");

    let clamped = genome.fetch(&Region::new("chr2", 1990, 2500)).unwrap();
    assert_eq!(clamped.len(), 10);

    assert!(matches!(
        genome.fetch(&Region::new("chrX", 0, 10)),
        Err(CoreError::UnknownContig(_))
    ));
}

#[rstest]
#[case("peaks.fa", InputKind::Fasta)]
#[case("peaks.bed", InputKind::Bed)]
#[case("peaks.txt", InputKind::Regions)]
fn test_sniff_input_kind(path_to_data: PathBuf, #[case] file: &str, #[case] kind: InputKind) {
    assert_eq!(sniff_input_kind(&path_to_data.join(file)).unwrap(), kind);
}

#[rstest]
fn test_inputs_resolve_to_same_sequences(path_to_data: PathBuf, genome: Genome) {
    let fasta = SequenceSet::from_input(&path_to_data.join("peaks.fa"), None).unwrap();
    let bed = SequenceSet::from_input(&path_to_data.join("peaks.bed"), Some(&genome)).unwrap();
    let regions = SequenceSet::from_input(&path_to_data.join("peaks.txt"), Some(&genome)).unwrap();

    assert_eq!(fasta.len(), 6);
    assert_eq!(fasta.ids(), bed.ids());
    assert_eq!(fasta.sequences(), bed.sequences());
    assert_eq!(bed.sequences(), regions.sequences());
    assert_eq!(fasta.ids()[0], "chr1:100-200");
}

#[rstest]
fn test_regions_need_a_genome(path_to_data: PathBuf) {
    let result = SequenceSet::from_input(&path_to_data.join("peaks.bed"), None);
    assert!(matches!(result, Err(CoreError::GenomeRequired(_))));
}

#[rstest]
fn test_median_length(path_to_data: PathBuf) {
    let fasta = SequenceSet::from_input(&path_to_data.join("peaks.fa"), None).unwrap();
    // widths 100, 120, 80, 100, 130, 100
    assert_eq!(fasta.median_length().unwrap(), 100);
}

#[rstest]
fn test_read_motif_file(path_to_data: PathBuf) {
    let motifs = read_motifs(&path_to_data.join("motifs.pfm")).unwrap();

    let ids: Vec<&str> = motifs.iter().map(|m| m.id()).collect();
    assert_eq!(ids, vec!["GATA_like", "Ebox"]);
    assert_eq!(motifs[0].consensus(), "GATA");
    assert_eq!(motifs[1].consensus(), "CACGTG");
    assert!(motifs.iter().all(|m| m.is_valid()));
}
