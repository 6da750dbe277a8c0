//! Microhaplotype allele strings.
//!
//! An allele holds one base call per marker site joined by [`SITE_SEPARATOR`],
//! e.g. `A-T-A-G-T`. A site the read did not cover is written as [`MISSING_SITE`].

use itertools::Itertools;

pub const SITE_SEPARATOR: char = '-';
pub const MISSING_SITE: &str = ".";

pub fn sites(allele: &str) -> impl Iterator<Item = &str> {
    allele.split(SITE_SEPARATOR)
}

pub fn site_count(allele: &str) -> usize {
    sites(allele).count()
}

pub fn join_sites<I, S>(calls: I) -> String
where
    I: IntoIterator<Item = S>,
    S: std::fmt::Display,
{
    calls.into_iter().join(&SITE_SEPARATOR.to_string())
}

/// Index of the first unobserved site, if any.
pub fn first_missing_site(allele: &str) -> Option<usize> {
    sites(allele).position(|s| s == MISSING_SITE)
}

/// An allele is complete when every site was observed.
pub fn is_complete(allele: &str) -> bool {
    first_missing_site(allele).is_none()
}

/// Counts the sites of `candidate` that agree with `known`, allowing the candidate
/// to overhang the marker on one side.
///
/// Leading missing sites (left overhang) are skipped. The first missing site after
/// a match (right overhang) ends the scan. Any disagreement between observed
/// sites, or a differing site count, makes the pair incompatible (`None`).
pub fn match_sites(candidate: &str, known: &str) -> Option<usize> {
    if site_count(candidate) != site_count(known) {
        return None;
    }

    let mut matches = 0;
    for (new, exist) in sites(candidate).zip(sites(known)) {
        if new == MISSING_SITE {
            if matches == 0 {
                continue;
            }
            return Some(matches);
        }
        if new != exist {
            return None;
        }
        matches += 1;
    }
    Some(matches)
}

#[cfg(test)]
mod tests {
    use super::*;

    const KNOWN: &str = "A-T-A-G-T";

    #[test]
    fn identical_alleles_match_every_site() {
        assert_eq!(match_sites(KNOWN, KNOWN), Some(5));
    }

    #[test]
    fn left_overhang_counts_trailing_sites() {
        assert_eq!(match_sites(".-.-.-G-T", KNOWN), Some(2));
    }

    #[test]
    fn right_overhang_counts_leading_sites() {
        assert_eq!(match_sites("A-T-A-.-.", KNOWN), Some(3));
    }

    #[test]
    fn mismatch_is_incompatible() {
        assert_eq!(match_sites("A-T-T-G-T", KNOWN), None);
    }

    #[test]
    fn mismatch_after_left_overhang_is_incompatible() {
        assert_eq!(match_sites(".-.-.-A-T", KNOWN), None);
    }

    #[test]
    fn overhang_direction_is_not_symmetric() {
        assert_eq!(match_sites(".-.-A-G-T", "A-T-A-.-."), None);
        assert_eq!(match_sites("A-T-A-.-.", ".-.-A-G-T"), None);
        assert_eq!(match_sites("A-T-A-.-.", "A-T-A-G-T"), Some(3));
        assert_eq!(match_sites("A-T-A-G-T", "A-T-A-.-."), None);
    }

    #[test]
    fn observed_sites_after_a_gap_are_ignored() {
        assert_eq!(match_sites("A-.-C-G-T", KNOWN), Some(1));
    }

    #[test]
    fn unobserved_allele_matches_nothing() {
        assert_eq!(match_sites(".-.-.-.-.", KNOWN), Some(0));
    }

    #[test]
    fn differing_site_counts_are_incompatible() {
        assert_eq!(match_sites("A-T-A", KNOWN), None);
    }

    #[test]
    fn completeness_and_missing_sites() {
        assert!(is_complete(KNOWN));
        assert!(!is_complete("A-T-.-G-T"));
        assert_eq!(first_missing_site("A-T-.-G-T"), Some(2));
        assert_eq!(first_missing_site(".-T-A-G-T"), Some(0));
        assert_eq!(site_count(KNOWN), 5);
        assert_eq!(join_sites(["A", ".", "G"]), "A-.-G");
    }
}
