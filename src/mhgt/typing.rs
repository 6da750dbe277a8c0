//! Extraction of the allele an aligned read supports at a marker.
//!

use super::{
    alleles::{self, MISSING_SITE},
    marker::{MhMarker, SnpMarker},
    reads::{is_clean_match, is_mappable, ref_offset_to_read_index, AlignmentRecord},
};

/// Quality gate applied to a read before it is typed at a microhaplotype.
pub trait ReadFilter: Send + Sync {
    fn accept(&self, record: &AlignmentRecord) -> bool;
}

/// Accepts every read.
#[derive(Debug, Default, Clone, Copy)]
pub struct AcceptAll;

impl ReadFilter for AcceptAll {
    fn accept(&self, _record: &AlignmentRecord) -> bool {
        true
    }
}

/// Rejects reads whose `NM` edit distance exceeds the limit. Reads without an
/// `NM` tag are accepted.
#[derive(Debug, Clone, Copy)]
pub struct MaxMismatches(pub u32);

impl ReadFilter for MaxMismatches {
    fn accept(&self, record: &AlignmentRecord) -> bool {
        match record.tag("NM").and_then(|nm| nm.parse::<u32>().ok()) {
            Some(nm) => nm <= self.0,
            None => true,
        }
    }
}

/// Base the read carries at a single-site marker, or `None` for a no-call.
pub fn type_single_site(record: &AlignmentRecord, marker: &SnpMarker) -> Option<u8> {
    if record.contig != marker.contig || !is_mappable(&record.ops) {
        return None;
    }

    let coord = marker.pos as i64;
    let offset = coord - record.start;
    if offset > record.seq.len() as i64 || coord - 1 < record.start {
        return None;
    }

    let index = ref_offset_to_read_index(&record.ops, offset)?;
    if index < 0 || index >= record.seq.len() as i64 {
        return None;
    }
    Some(record.seq[index as usize])
}

/// Allele the read carries at a microhaplotype, or `None` when the read does not
/// overlap the marker or cannot be typed there.
///
/// Only reads aligned without indels or clips are typed. Sites outside the read
/// are reported as missing.
pub fn type_microhaplotype(
    record: &AlignmentRecord,
    marker: &MhMarker,
    filter: &dyn ReadFilter,
) -> Option<String> {
    if record.contig != marker.contig || !is_clean_match(&record.ops) {
        return None;
    }

    let read_len = record.seq.len() as i64;
    if marker.pos as i64 - record.start >= read_len || (marker.last_pos() as i64) < record.start
    {
        return None;
    }

    if !filter.accept(record) {
        return None;
    }

    let calls = marker.site_positions().map(|site| {
        let index = site as i64 - record.start;
        if (0..read_len).contains(&index) {
            (record.seq[index as usize] as char).to_string()
        } else {
            MISSING_SITE.to_string()
        }
    });
    Some(alleles::join_sites(calls))
}
