//! Minimal view of an aligned read, holding only what marker typing consumes.
//!

use super::cigar::{CigarOp, CigarOpExt};
use rust_htslib::bam::{self, record::Aux};
use std::collections::HashMap;

/// One aligned read.
#[derive(Debug, PartialEq, Clone)]
pub struct AlignmentRecord {
    /// Read name.
    pub name: String,
    /// Reference sequence the read is aligned to.
    pub contig: String,
    /// 1-based reference coordinate of the first aligned base.
    pub start: i64,
    /// Alignment edit operations.
    pub ops: Vec<CigarOp>,
    /// Read bases.
    pub seq: Vec<u8>,
    /// Mapping quality.
    pub mapq: u8,
    /// Scalar auxiliary tags rendered as text.
    pub tags: HashMap<String, String>,
}

impl AlignmentRecord {
    /// Creates an `AlignmentRecord` from an HTSlib record.
    ///
    /// Returns `None` for unmapped records since they have no reference placement.
    pub fn from_hts_rec(rec: &bam::Record, header: &bam::HeaderView) -> Option<AlignmentRecord> {
        if rec.is_unmapped() || rec.tid() < 0 {
            return None;
        }

        let contig = String::from_utf8_lossy(header.tid2name(rec.tid() as u32)).into_owned();
        let tags = rec
            .aux_iter()
            .filter_map(|entry| entry.ok())
            .filter_map(|(key, aux)| {
                aux_to_string(&aux).map(|value| (String::from_utf8_lossy(key).into_owned(), value))
            })
            .collect();

        Some(AlignmentRecord {
            name: String::from_utf8_lossy(rec.qname()).into_owned(),
            contig,
            start: rec.pos() + 1,
            ops: rec.cigar().take().to_vec(),
            seq: rec.seq().as_bytes(),
            mapq: rec.mapq(),
            tags,
        })
    }

    /// 1-based reference coordinate of the last aligned base.
    pub fn end(&self) -> i64 {
        self.start + self.ops.iter().map(|op| op.get_ref_len()).sum::<i64>() - 1
    }

    pub fn tag(&self, key: &str) -> Option<&str> {
        self.tags.get(key).map(|s| s.as_str())
    }
}

fn aux_to_string(aux: &Aux) -> Option<String> {
    match aux {
        Aux::Char(c) => Some((*c as char).to_string()),
        Aux::I8(v) => Some(v.to_string()),
        Aux::U8(v) => Some(v.to_string()),
        Aux::I16(v) => Some(v.to_string()),
        Aux::U16(v) => Some(v.to_string()),
        Aux::I32(v) => Some(v.to_string()),
        Aux::U32(v) => Some(v.to_string()),
        Aux::Float(v) => Some(v.to_string()),
        Aux::Double(v) => Some(v.to_string()),
        Aux::String(s) | Aux::HexByteArray(s) => Some(s.to_string()),
        _ => None,
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use rust_htslib::bam::record::CigarString;

    /// Builds a record directly, bypassing htslib.
    pub(crate) fn make_record(contig: &str, start: i64, cigar: &str, seq: &str) -> AlignmentRecord {
        AlignmentRecord {
            name: "read".to_string(),
            contig: contig.to_string(),
            start,
            ops: CigarString::try_from(cigar).unwrap().0,
            seq: seq.as_bytes().to_vec(),
            mapq: 60,
            tags: HashMap::new(),
        }
    }

    #[test]
    fn end_accounts_for_deletions_and_insertions() {
        let record = make_record("chr1", 100, "5M2D3M1I2M", "ACGTACGTACGT");
        assert_eq!(record.end(), 100 + 5 + 2 + 3 + 2 - 1);
    }

    #[test]
    fn tags_are_looked_up_by_name() {
        let mut record = make_record("chr1", 1, "4M", "ACGT");
        record.tags.insert("NM".to_string(), "2".to_string());
        assert_eq!(record.tag("NM"), Some("2"));
        assert_eq!(record.tag("MD"), None);
    }

    #[test]
    fn scalar_aux_values_render_as_text() {
        assert_eq!(aux_to_string(&Aux::I32(-4)), Some("-4".to_string()));
        assert_eq!(aux_to_string(&Aux::Char(b'P')), Some("P".to_string()));
        assert_eq!(aux_to_string(&Aux::String("CP")), Some("CP".to_string()));
    }
}
