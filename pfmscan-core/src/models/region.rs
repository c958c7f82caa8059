use std::fmt::{self, Display};
use std::str::FromStr;
use std::sync::LazyLock;

use regex::Regex;

use crate::errors::CoreError;

/// `contig:start-end`, contig without whitespace or colons.
static LOCUS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"([^\s:]+):(\d+)-(\d+)").expect("valid locus pattern"));

static EXACT_LOCUS_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([^\s:]+):(\d+)-(\d+)$").expect("valid locus pattern"));

///
/// Region struct, a genomic interval in 0-based, half-open coordinates
///
#[derive(Eq, PartialEq, Hash, Debug, Clone)]
pub struct Region {
    pub chr: String,
    pub start: u32,
    pub end: u32,
}

impl Region {
    pub fn new(chr: impl Into<String>, start: u32, end: u32) -> Self {
        Region {
            chr: chr.into(),
            start,
            end,
        }
    }

    ///
    /// Get width of the region
    ///
    pub fn width(&self) -> u32 {
        self.end.saturating_sub(self.start)
    }

    ///
    /// Get the `chr:start-end` identifier of the region
    ///
    pub fn as_locus(&self) -> String {
        format!("{}:{}-{}", self.chr, self.start, self.end)
    }

    ///
    /// Find a `contig:start-end` locus anywhere inside a sequence identifier, as contig,
    /// start and end.
    ///
    /// Unlike [`Region::from_str`] the identifier may carry extra text around the locus,
    /// e.g. `peak_1 chr1:100-200`. Coordinates are read as `u64`, so loci past the `u32`
    /// range of a [`Region`] are still found.
    ///
    pub fn find_locus(id: &str) -> Option<(&str, u64, u64)> {
        let caps = LOCUS_PATTERN.captures(id)?;
        let start = caps.get(2)?.as_str().parse::<u64>().ok()?;
        let end = caps.get(3)?.as_str().parse::<u64>().ok()?;
        Some((caps.get(1)?.as_str(), start, end))
    }

    ///
    /// [`Region::find_locus`] as a [`Region`]. `None` when the coordinates do not fit in a
    /// `u32`.
    ///
    pub fn find_in(id: &str) -> Option<Region> {
        let (chr, start, end) = Region::find_locus(id)?;
        Some(Region::new(
            chr,
            u32::try_from(start).ok()?,
            u32::try_from(end).ok()?,
        ))
    }
}

impl FromStr for Region {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        let caps = EXACT_LOCUS_PATTERN
            .captures(s)
            .ok_or_else(|| CoreError::RegionParseError(s.to_string()))?;

        let start = caps[2]
            .parse::<u32>()
            .map_err(|_| CoreError::RegionParseError(s.to_string()))?;
        let end = caps[3]
            .parse::<u32>()
            .map_err(|_| CoreError::RegionParseError(s.to_string()))?;

        if end < start {
            return Err(CoreError::RegionParseError(s.to_string()));
        }

        Ok(Region::new(&caps[1], start, end))
    }
}

impl Display for Region {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_locus())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use pretty_assertions::assert_eq;
    use rstest::rstest;

    #[rstest]
    #[case("chr1:1000-2000", Region::new("chr1", 1000, 2000))]
    #[case("chrUn_KI270302v1:0-15", Region::new("chrUn_KI270302v1", 0, 15))]
    #[case("  chrX:5-6\n", Region::new("chrX", 5, 6))]
    fn test_parse_locus(#[case] input: &str, #[case] expected: Region) {
        let region = Region::from_str(input).unwrap();
        assert_eq!(region, expected);
    }

    #[rstest]
    #[case("seq42")]
    #[case("chr1:2000-1000")]
    #[case("chr1 1000 2000")]
    #[case("chr1:10-99999999999")]
    fn test_parse_locus_rejects(#[case] input: &str) {
        assert!(Region::from_str(input).is_err());
    }

    #[rstest]
    fn test_find_locus_in_identifier() {
        let region = Region::find_in("peak_7 chr2:300-450 some description").unwrap();
        assert_eq!(region, Region::new("chr2", 300, 450));
        assert_eq!(Region::find_in("seq42"), None);
    }

    #[rstest]
    fn test_find_locus_past_u32() {
        let id = "chrUn:5000000000-5000000100";
        assert_eq!(Region::find_locus(id), Some(("chrUn", 5_000_000_000, 5_000_000_100)));
        assert_eq!(Region::find_in(id), None);
        assert_eq!(Region::find_locus("seq42"), None);
    }

    #[rstest]
    fn test_display_round_trips_locus() {
        let region = Region::new("chr3", 10, 20);
        assert_eq!(region.to_string(), "chr3:10-20");
        assert_eq!(region.width(), 10);
    }
}
