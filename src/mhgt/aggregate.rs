//! Accumulation of per-read allele observations into per-marker depth tables.
//!

use super::{
    alleles::{self, match_sites},
    marker::{MhMarker, SnpMarker, SNP_BASES},
};
use itertools::Itertools;
use std::collections::BTreeMap;

/// Alleles at or below this fraction of the classified depth are treated as noise.
pub const NOISE_FRACTION: f64 = 0.1;

/// Counts one read base. Bases other than A, T, C and G are ignored.
pub fn accumulate_single_site(marker: &mut SnpMarker, base: u8) {
    if let Some(index) = SNP_BASES.iter().position(|b| *b == base) {
        marker.depths[index] += 1;
    }
}

/// Credits one read allele to the marker's depth tables.
///
/// An exact match to a known allele adds 1 to it. Otherwise every known allele
/// compatible under the overhang rule is credited with the number of matching
/// sites, so an ambiguous partial read can support several alleles. A complete
/// allele that is compatible with no known allele is recorded as rare with a
/// weight equal to its site count.
pub fn accumulate_microhaplotype(marker: &mut MhMarker, allele: &str) {
    if let Some(depth) = marker.known.get_mut(allele) {
        *depth += 1.0;
        return;
    }

    let mut credited = false;
    for (known, depth) in marker.known.iter_mut() {
        if let Some(n) = match_sites(allele, known).filter(|n| *n > 0) {
            *depth += n as f64;
            credited = true;
        }
    }

    if !credited && alleles::is_complete(allele) {
        *marker
            .rare
            .entry(allele.to_string())
            .or_insert(0.0) += alleles::site_count(allele) as f64;
    }
}

/// Folds partial (overhang) alleles into the complete alleles they are a prefix of,
/// then drops noise alleles.
///
/// A partial allele with depth `v` whose first missing site is `i` adds
/// `v * i / site_count` to each complete allele sharing its first `i` sites, and
/// is removed. A table without complete alleles is left untouched.
pub fn classify(table: &mut BTreeMap<String, f64>) {
    let (complete, partial): (Vec<String>, Vec<String>) =
        table.keys().cloned().partition(|a| alleles::is_complete(a));
    if complete.is_empty() {
        return;
    }

    let site_count = alleles::site_count(&complete[0]) as f64;
    for key in partial {
        let Some(depth) = table.remove(&key) else {
            continue;
        };
        let Some(prefix_len) = alleles::first_missing_site(&key) else {
            continue;
        };
        let prefix = alleles::sites(&key).take(prefix_len).collect_vec();
        let credit = depth * prefix_len as f64 / site_count;
        for allele in &complete {
            if alleles::sites(allele).take(prefix_len).eq(prefix.iter().copied()) {
                if let Some(d) = table.get_mut(allele) {
                    *d += credit;
                }
            }
        }
    }

    prune_noise(table, NOISE_FRACTION);
}

/// Removes every allele whose depth is at most `fraction` of the table total.
pub fn prune_noise(table: &mut BTreeMap<String, f64>, fraction: f64) {
    let total: f64 = table.values().sum();
    table.retain(|_, depth| *depth > fraction * total);
}
