//! Marker definitions and per-marker accumulation state.
//!
//! Markers are read from VCF-like lines (`CHROM POS ID REF ALT QUAL FILTER INFO`).
//! A line whose INFO carries `OFFSET=o1,o2,...` defines a microhaplotype; every
//! other line defines a single-site marker.

use super::alleles;
use crate::utils::{open_text_reader, GenomicRegion, Result};
use crossbeam_channel::Sender;
use std::{
    collections::{BTreeMap, HashMap},
    io::BufRead,
    path::Path,
};

/// Order of the per-base depth counters of a single-site marker.
pub const SNP_BASES: [u8; 4] = *b"ATCG";

#[derive(Debug, Clone, PartialEq)]
pub struct SnpMarker {
    pub id: String,
    pub contig: String,
    /// 1-based reference coordinate.
    pub pos: u64,
    /// Read depth per base, in [`SNP_BASES`] order.
    pub depths: [u64; 4],
}

impl SnpMarker {
    pub fn new(id: impl Into<String>, contig: impl Into<String>, pos: u64) -> Self {
        SnpMarker {
            id: id.into(),
            contig: contig.into(),
            pos,
            depths: [0; 4],
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct MhMarker {
    pub id: String,
    pub contig: String,
    /// 1-based reference coordinate of the first site.
    pub pos: u64,
    /// Positions of the remaining sites relative to the first one.
    pub offsets: Vec<u64>,
    /// Weighted depth of the alleles known from the marker definition.
    pub known: BTreeMap<String, f64>,
    /// Weighted depth of complete alleles that matched no known allele.
    pub rare: BTreeMap<String, f64>,
}

impl MhMarker {
    /// Creates a marker with every seed allele at depth 0.
    pub fn new<I, S>(
        id: impl Into<String>,
        contig: impl Into<String>,
        pos: u64,
        offsets: Vec<u64>,
        seeds: I,
    ) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let id = id.into();
        let site_count = offsets.len() + 1;
        let mut known = BTreeMap::new();
        for seed in seeds {
            let seed = seed.into();
            if alleles::site_count(&seed) != site_count {
                return Err(format!(
                    "Allele '{}' of marker {} has {} sites, expected {}",
                    seed,
                    id,
                    alleles::site_count(&seed),
                    site_count
                ));
            }
            known.insert(seed, 0.0);
        }

        Ok(MhMarker {
            id,
            contig: contig.into(),
            pos,
            offsets,
            known,
            rare: BTreeMap::new(),
        })
    }

    pub fn site_count(&self) -> usize {
        self.offsets.len() + 1
    }

    /// 1-based coordinates of every site, first site first.
    pub fn site_positions(&self) -> impl Iterator<Item = u64> + '_ {
        std::iter::once(self.pos).chain(self.offsets.iter().map(move |o| self.pos + o))
    }

    pub fn last_pos(&self) -> u64 {
        self.site_positions().max().unwrap_or(self.pos)
    }
}

/// A genetic marker of either kind.
#[derive(Debug, Clone, PartialEq)]
pub enum Marker {
    SingleSite(SnpMarker),
    Microhaplotype(MhMarker),
}

impl Marker {
    pub fn id(&self) -> &str {
        match self {
            Marker::SingleSite(m) => &m.id,
            Marker::Microhaplotype(m) => &m.id,
        }
    }

    pub fn contig(&self) -> &str {
        match self {
            Marker::SingleSite(m) => &m.contig,
            Marker::Microhaplotype(m) => &m.contig,
        }
    }

    pub fn pos(&self) -> u64 {
        match self {
            Marker::SingleSite(m) => m.pos,
            Marker::Microhaplotype(m) => m.pos,
        }
    }

    /// Reference span covered by the marker's sites.
    pub fn region(&self) -> Result<GenomicRegion> {
        let end = match self {
            Marker::SingleSite(m) => m.pos,
            Marker::Microhaplotype(m) => m.last_pos(),
        };
        GenomicRegion::new(self.contig(), self.pos(), end)
    }

    /// Parses one definition line. Header lines and lines with fewer than 8 fields
    /// yield `Ok(None)`.
    pub fn from_line(line: &str) -> Result<Option<Self>> {
        const MIN_FIELD_COUNT: usize = 8;
        if line.starts_with('#') {
            return Ok(None);
        }
        let fields: Vec<&str> = line.trim_end().split('\t').collect();
        if fields.len() < MIN_FIELD_COUNT {
            return Ok(None);
        }

        let (chrom, pos, id, ref_allele, alt_alleles, info) =
            (fields[0], fields[1], fields[2], fields[3], fields[4], fields[7]);

        let pos: u64 = pos
            .parse()
            .map_err(|_| format!("Invalid position '{}'", pos))?;
        if pos == 0 {
            return Err("Positions are 1-based, found 0".to_string());
        }

        let info = decode_info(info);
        let marker = match info.get("OFFSET") {
            Some(values) => {
                let offsets = values
                    .iter()
                    .map(|v| {
                        v.parse::<u64>()
                            .map_err(|_| format!("Invalid OFFSET value '{}'", v))
                    })
                    .collect::<Result<Vec<_>>>()?;
                let seeds = std::iter::once(ref_allele)
                    .chain(alt_alleles.split(','))
                    .filter(|a| !a.is_empty() && *a != alleles::MISSING_SITE);
                Marker::Microhaplotype(MhMarker::new(id, chrom, pos, offsets, seeds)?)
            }
            None => Marker::SingleSite(SnpMarker::new(id, chrom, pos)),
        };
        Ok(Some(marker))
    }
}

/// Splits an INFO column into `KEY -> [values]`. Flags without `=` are dropped.
fn decode_info(info: &str) -> HashMap<&str, Vec<&str>> {
    info.split(';')
        .filter_map(|field| field.split_once('='))
        .map(|(key, value)| (key, value.split(',').collect()))
        .collect()
}

/// Reads marker definitions, reporting failures with their line number.
pub fn get_markers<R: BufRead>(reader: R) -> impl Iterator<Item = Result<Marker>> {
    reader
        .lines()
        .enumerate()
        .filter_map(|(line_number, result_line)| {
            result_line
                .map_err(|e| format!("Error at marker line {}: {}", line_number + 1, e))
                .and_then(|line| {
                    Marker::from_line(&line)
                        .map_err(|e| format!("Error at marker line {}: {}", line_number + 1, e))
                })
                .transpose()
        })
}

/// Loads every valid marker; invalid definitions are logged and skipped.
pub fn load_markers<R: BufRead>(reader: R) -> Vec<Marker> {
    get_markers(reader)
        .filter_map(|result| match result {
            Ok(marker) => Some(marker),
            Err(e) => {
                log::error!("{}", e);
                None
            }
        })
        .collect()
}

/// Streams valid markers, numbered in definition order, into `sender`. Invalid
/// definitions are logged and skipped.
pub fn stream_markers_into_channel(
    markers_path: &Path,
    sender: Sender<(usize, Marker)>,
) -> Result<usize> {
    let reader = open_text_reader(markers_path)?;
    let mut num_markers = 0;
    for result in get_markers(reader) {
        let marker = match result {
            Ok(marker) => marker,
            Err(e) => {
                log::error!("{}", e);
                continue;
            }
        };
        if sender.send((num_markers, marker)).is_err() {
            return Err("Marker receiver disconnected".to_string());
        }
        num_markers += 1;
    }
    Ok(num_markers)
}

impl std::fmt::Display for Marker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Marker::SingleSite(m) => write!(f, "{} {}:{}", m.id, m.contig, m.pos),
            Marker::Microhaplotype(m) => write!(
                f,
                "{} {}:{} (+{})",
                m.id,
                m.contig,
                m.pos,
                m.offsets
                    .iter()
                    .map(|o| o.to_string())
                    .collect::<Vec<_>>()
                    .join(",")
            ),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const MARKERS: &str = "\
##fileformat=VCFv4.2
#CHROM\tPOS\tID\tREF\tALT\tQUAL\tFILTER\tINFO
chr1\t100\tsnp1\tA\tG\t.\tPASS\tAF=0.5
chr1\t200\tmh1\tA-T-A\tA-C-A,G-T-A\t.\tPASS\tOFFSET=8,22
chr2\t50\tshort\tA
";

    #[test]
    fn parses_both_marker_kinds() {
        let markers: Vec<Marker> = get_markers(Cursor::new(MARKERS))
            .collect::<Result<_>>()
            .unwrap();
        assert_eq!(markers.len(), 2);
        assert_eq!(markers[0], Marker::SingleSite(SnpMarker::new("snp1", "chr1", 100)));

        match &markers[1] {
            Marker::Microhaplotype(mh) => {
                assert_eq!(mh.id, "mh1");
                assert_eq!(mh.offsets, vec![8, 22]);
                assert_eq!(mh.site_positions().collect::<Vec<_>>(), vec![200, 208, 222]);
                assert_eq!(mh.last_pos(), 222);
                assert_eq!(
                    mh.known.keys().cloned().collect::<Vec<_>>(),
                    vec!["A-C-A", "A-T-A", "G-T-A"]
                );
                assert!(mh.known.values().all(|d| *d == 0.0));
                assert!(mh.rare.is_empty());
            }
            other => panic!("Expected microhaplotype, got {:?}", other),
        }
    }

    #[test]
    fn marker_region_spans_all_sites() {
        let marker = Marker::from_line("chr1\t200\tmh1\tA-T-A\tA-C-A\t.\tPASS\tOFFSET=8,22")
            .unwrap()
            .unwrap();
        assert_eq!(
            marker.region().unwrap(),
            GenomicRegion::new("chr1", 200, 222).unwrap()
        );
    }

    #[test]
    fn invalid_lines_report_line_numbers() {
        let data = "chr1\tabc\tsnp1\tA\tG\t.\tPASS\t.\n\
                    chr1\t200\tmh1\tA-T\tA-C\t.\tPASS\tOFFSET=8,22\n\
                    chr1\t300\tmh2\tA-T\tA-C\t.\tPASS\tOFFSET=x\n";
        let results: Vec<_> = get_markers(Cursor::new(data)).collect();
        assert_eq!(results.len(), 3);
        assert!(results[0].as_ref().unwrap_err().contains("line 1"));
        assert!(results[1].as_ref().unwrap_err().contains("expected 3"));
        assert!(results[2].as_ref().unwrap_err().contains("line 3"));
    }

    #[test]
    fn load_markers_skips_invalid_definitions() {
        let data = "chr1\tabc\tsnp1\tA\tG\t.\tPASS\t.\n\
                    chr1\t10\tsnp2\tA\tG\t.\tPASS\t.\n";
        let markers = load_markers(Cursor::new(data));
        assert_eq!(markers.len(), 1);
        assert_eq!(markers[0].id(), "snp2");
    }

    #[test]
    fn streamed_markers_are_numbered_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("markers.vcf");
        std::fs::write(&path, MARKERS).unwrap();

        let (sender, receiver) = crossbeam_channel::unbounded();
        let num_markers = stream_markers_into_channel(&path, sender).unwrap();
        let received: Vec<(usize, String)> = receiver
            .iter()
            .map(|(index, marker)| (index, marker.id().to_string()))
            .collect();
        assert_eq!(num_markers, 2);
        assert_eq!(
            received,
            vec![(0, "snp1".to_string()), (1, "mh1".to_string())]
        );
    }
}
