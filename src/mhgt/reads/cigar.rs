pub type CigarOp = rust_htslib::bam::record::Cigar;

pub trait CigarOpExt {
    fn get_ref_len(&self) -> i64;
    fn get_query_len(&self) -> i64;
    fn is_match(&self) -> bool;
}

impl CigarOpExt for CigarOp {
    fn get_ref_len(&self) -> i64 {
        match self {
            CigarOp::Match(len)
            | CigarOp::RefSkip(len)
            | CigarOp::Del(len)
            | CigarOp::Equal(len)
            | CigarOp::Diff(len) => *len as i64,
            CigarOp::Ins(_) | CigarOp::SoftClip(_) | CigarOp::HardClip(_) | CigarOp::Pad(_) => 0,
        }
    }

    fn get_query_len(&self) -> i64 {
        match self {
            CigarOp::Match(len)
            | CigarOp::Equal(len)
            | CigarOp::Diff(len)
            | CigarOp::Ins(len)
            | CigarOp::SoftClip(len) => *len as i64,
            CigarOp::RefSkip(_) | CigarOp::Del(_) | CigarOp::HardClip(_) | CigarOp::Pad(_) => 0,
        }
    }

    fn is_match(&self) -> bool {
        matches!(
            self,
            CigarOp::Match(_) | CigarOp::Equal(_) | CigarOp::Diff(_)
        )
    }
}

/// True if every operation is an aligned match (M, = or X).
pub fn is_clean_match(ops: &[CigarOp]) -> bool {
    ops.iter().all(|op| op.is_match())
}

/// True if the operations can be handled by [`ref_offset_to_read_index`]:
/// matches, insertions and deletions only.
pub fn is_mappable(ops: &[CigarOp]) -> bool {
    ops.iter()
        .all(|op| op.is_match() || matches!(op, CigarOp::Ins(_) | CigarOp::Del(_)))
}

/// Translates an offset relative to the alignment start into a 0-based index into
/// the read sequence.
///
/// Insertions located before the target base shift the index forward, deletions
/// located before it shift the index backward. Operations past the target are
/// ignored. Returns `None` when the target base is deleted in the read or when an
/// operation other than M/=/X/I/D is met before reaching it. The returned index
/// may lie outside the read and must be bounds-checked by the caller.
pub fn ref_offset_to_read_index(ops: &[CigarOp], pos: i64) -> Option<i64> {
    let mut index = pos;
    let mut ref_consumed = 0;
    for op in ops {
        // Target base already covered by the consumed reference span
        if ref_consumed > pos {
            break;
        }
        match op {
            CigarOp::Ins(len) => index += *len as i64,
            CigarOp::Del(len) => {
                let len = *len as i64;
                if ref_consumed + len > pos {
                    return None;
                }
                index -= len;
                ref_consumed += len;
            }
            op if op.is_match() => ref_consumed += op.get_ref_len(),
            _ => return None,
        }
    }
    Some(index)
}
