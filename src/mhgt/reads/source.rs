//! Replayable access to the alignments overlapping a marker.
//!

use super::record::AlignmentRecord;
use crate::utils::{GenomicRegion, Result};
use rust_htslib::bam::{self, Read};
use std::path::{Path, PathBuf};

/// htslib can report the same failure repeatedly on a truncated stream.
const MAX_CONSECUTIVE_ERRORS: usize = 1000;

/// Counters collected while scanning alignments for one marker.
#[derive(Debug, Default, Clone, Copy, PartialEq)]
pub struct ScanStats {
    pub seen: usize,
    pub filtered: usize,
    pub malformed: usize,
}

/// Alignment input that can be replayed once per marker.
///
/// Indexed BAM/CRAM inputs fetch only the marker region. Other inputs, including
/// plain SAM, are reopened and scanned from the start for every marker.
pub enum AlignmentSource {
    Indexed(bam::IndexedReader),
    Sequential(PathBuf),
}

impl AlignmentSource {
    pub fn open(path: &Path) -> Result<Self> {
        match bam::IndexedReader::from_path(path) {
            Ok(reader) => {
                log::trace!("Using index for {}", path.display());
                Ok(AlignmentSource::Indexed(reader))
            }
            Err(_) => {
                bam::Reader::from_path(path)
                    .map_err(|e| format!("Failed to open {}: {}", path.display(), e))?;
                log::trace!("No index for {}, falling back to rescans", path.display());
                Ok(AlignmentSource::Sequential(path.to_path_buf()))
            }
        }
    }

    /// Calls `f` on every mapped record with mapping quality of at least `min_mapq`
    /// that may overlap `region`. Records htslib fails to decode are skipped.
    pub fn for_each_record<F>(
        &mut self,
        region: &GenomicRegion,
        min_mapq: u8,
        mut f: F,
    ) -> Result<ScanStats>
    where
        F: FnMut(AlignmentRecord),
    {
        match self {
            AlignmentSource::Indexed(reader) => {
                let (start, end) = region.fetch_bounds();
                if let Err(e) = reader.fetch((region.contig.as_str(), start, end)) {
                    log::debug!("Region {} not fetchable: {}", region, e);
                    return Ok(ScanStats::default());
                }
                Ok(visit_records(reader, region, min_mapq, &mut f))
            }
            AlignmentSource::Sequential(path) => {
                let mut reader = bam::Reader::from_path(&*path)
                    .map_err(|e| format!("Failed to reopen {}: {}", path.display(), e))?;
                Ok(visit_records(&mut reader, region, min_mapq, &mut f))
            }
        }
    }
}

fn visit_records<R, F>(
    reader: &mut R,
    region: &GenomicRegion,
    min_mapq: u8,
    f: &mut F,
) -> ScanStats
where
    R: Read,
    F: FnMut(AlignmentRecord),
{
    let header = reader.header().clone();
    let mut stats = ScanStats::default();
    let mut consecutive_errors = 0;
    for result in reader.records() {
        let rec = match result {
            Ok(rec) => rec,
            Err(e) => {
                stats.malformed += 1;
                consecutive_errors += 1;
                log::warn!("Skipping malformed alignment record: {}", e);
                if consecutive_errors >= MAX_CONSECUTIVE_ERRORS {
                    log::error!("Too many consecutive malformed records, stopping scan");
                    break;
                }
                continue;
            }
        };
        consecutive_errors = 0;
        stats.seen += 1;
        if rec.mapq() < min_mapq {
            stats.filtered += 1;
            continue;
        }
        match AlignmentRecord::from_hts_rec(&rec, &header) {
            Some(record) if overlaps(&record, region) => f(record),
            Some(_) => {}
            None => stats.filtered += 1,
        }
    }
    stats
}

fn overlaps(record: &AlignmentRecord, region: &GenomicRegion) -> bool {
    record.contig == region.contig
        && record.start <= region.end as i64
        && record.end() >= region.start as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAM: &str = "\
@HD\tVN:1.6\tSO:coordinate
@SQ\tSN:chr1\tLN:1000
@SQ\tSN:chr2\tLN:1000
r1\t0\tchr1\t100\t60\t10M\t*\t0\t0\tACGTACGTAC\t*\tNM:i:1
r2\t0\tchr1\t102\t3\t10M\t*\t0\t0\tACGTACGTAC\t*
r3\t0\tchr1\t500\t60\t10M\t*\t0\t0\tACGTACGTAC\t*
r4\t0\tchr2\t100\t60\t10M\t*\t0\t0\tACGTACGTAC\t*
r5\t4\t*\t0\t0\t*\t*\t0\t0\tACGTACGTAC\t*
";

    #[test]
    fn sequential_scan_yields_overlapping_records() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reads.sam");
        std::fs::write(&path, SAM).unwrap();

        let mut source = AlignmentSource::open(&path).unwrap();
        assert!(matches!(source, AlignmentSource::Sequential(_)));

        let region = GenomicRegion::new("chr1", 105, 105).unwrap();
        for _ in 0..2 {
            let mut names = Vec::new();
            let stats = source
                .for_each_record(&region, 20, |record| names.push(record.name))
                .unwrap();
            assert_eq!(names, vec!["r1".to_string()]);
            assert_eq!(stats.seen, 5);
            assert_eq!(stats.filtered, 2);
            assert_eq!(stats.malformed, 0);
        }
    }

    #[test]
    fn missing_file_is_an_error() {
        assert!(AlignmentSource::open(Path::new("/no/such/reads.bam")).is_err());
    }
}
