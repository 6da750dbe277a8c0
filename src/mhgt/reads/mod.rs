mod cigar;
mod record;
mod source;

pub use cigar::{is_clean_match, is_mappable, ref_offset_to_read_index, CigarOp, CigarOpExt};
pub use record::AlignmentRecord;
pub use source::{AlignmentSource, ScanStats};

#[cfg(test)]
pub(crate) use record::tests::make_record;
