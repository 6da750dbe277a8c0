//! Defines the `DepthWriter` struct for the verbose per-marker depth report.
//!
//! Single-site lines are `CHROM POS ID A T C G STATUS`. Microhaplotype lines are
//! `CHROM POS ID KNOWN RARE STATUS`, where KNOWN and RARE list `allele:depth`
//! entries by decreasing depth.

use crate::mhgt::{marker::Marker, workflows::MarkerResult};
use crate::utils::Result;
use itertools::Itertools;
use std::{
    collections::BTreeMap,
    fs::File,
    io::{BufWriter, Write},
};

pub struct DepthWriter<W: Write> {
    writer: W,
}

impl DepthWriter<BufWriter<File>> {
    pub fn new(output_path: &str) -> Result<Self> {
        let file =
            File::create(output_path).map_err(|e| format!("Invalid depth output path: {}", e))?;
        Ok(DepthWriter::from_writer(BufWriter::new(file)))
    }
}

impl<W: Write> DepthWriter<W> {
    pub fn from_writer(writer: W) -> Self {
        DepthWriter { writer }
    }

    pub fn write(&mut self, result: &MarkerResult) -> Result<()> {
        let marker = &result.marker;
        let depths = match marker {
            Marker::SingleSite(snp) => snp.depths.iter().join("\t"),
            Marker::Microhaplotype(mh) => {
                format!("{}\t{}", encode_table(&mh.known), encode_table(&mh.rare))
            }
        };
        writeln!(
            self.writer,
            "{}\t{}\t{}\t{}\t{}",
            marker.contig(),
            marker.pos(),
            marker.id(),
            depths,
            result.call.status
        )
        .map_err(|e| e.to_string())
    }

    pub fn finish(mut self) -> Result<W> {
        self.writer.flush().map_err(|e| e.to_string())?;
        Ok(self.writer)
    }
}

fn encode_table(table: &BTreeMap<String, f64>) -> String {
    if table.is_empty() {
        return ".".to_string();
    }
    table
        .iter()
        .sorted_by(|(a1, d1), (a2, d2)| d2.total_cmp(d1).then_with(|| a1.cmp(a2)))
        .map(|(allele, depth)| format!("{}:{:.0}", allele, depth))
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mhgt::{
        genotype::{CallStatus, Genotype, GenotypeCall},
        marker::{MhMarker, SnpMarker},
    };

    #[test]
    fn snp_line_lists_depths_in_base_order() {
        let mut snp = SnpMarker::new("rs1", "chr2", 500);
        snp.depths = [0, 12, 9, 1];
        let result = MarkerResult {
            marker: Marker::SingleSite(snp),
            call: GenotypeCall {
                genotype: Genotype::new("C", "T"),
                status: CallStatus::Heterozygous,
            },
            num_typed: 22,
        };
        let mut writer = DepthWriter::from_writer(Vec::new());
        writer.write(&result).unwrap();
        let text = String::from_utf8(writer.finish().unwrap()).unwrap();
        assert_eq!(text, "chr2\t500\trs1\t0\t12\t9\t1\tHET\n");
    }

    #[test]
    fn mh_line_orders_alleles_by_depth() {
        let mut mh = MhMarker::new("mh1", "chr1", 100, vec![4], ["A-C", "G-C", "A-T"]).unwrap();
        mh.known.insert("A-C".to_string(), 7.6);
        mh.known.insert("G-C".to_string(), 20.0);
        mh.known.insert("A-T".to_string(), 7.6);
        let result = MarkerResult {
            marker: Marker::Microhaplotype(mh),
            call: GenotypeCall {
                genotype: Genotype::missing(),
                status: CallStatus::Ambiguous(3),
            },
            num_typed: 30,
        };
        let mut writer = DepthWriter::from_writer(Vec::new());
        writer.write(&result).unwrap();
        let text = String::from_utf8(writer.finish().unwrap()).unwrap();
        assert_eq!(
            text,
            "chr1\t100\tmh1\tG-C:20 A-C:8 A-T:8\t.\tAMBIGUOUS(3)\n"
        );
    }
}
