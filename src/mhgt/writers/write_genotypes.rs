//! Defines the `GenotypeWriter` struct for writing per-sample genotype tables.
//!
//! The table starts with a `##sample=` line and a column header, followed by one
//! `MARKER ALLELE1 ALLELE2` line per marker.

use crate::mhgt::workflows::MarkerResult;
use crate::utils::Result;
use std::{
    fs::File,
    io::{BufWriter, Write},
};

pub const SAMPLE_HEADER_PREFIX: &str = "##sample=";

pub struct GenotypeWriter<W: Write> {
    writer: W,
}

impl GenotypeWriter<BufWriter<File>> {
    pub fn new(output_path: &str, sample_name: &str) -> Result<Self> {
        let file = File::create(output_path)
            .map_err(|e| format!("Invalid genotype output path: {}", e))?;
        GenotypeWriter::from_writer(BufWriter::new(file), sample_name)
    }
}

impl<W: Write> GenotypeWriter<W> {
    pub fn from_writer(mut writer: W, sample_name: &str) -> Result<Self> {
        writeln!(writer, "{}{}", SAMPLE_HEADER_PREFIX, sample_name).map_err(|e| e.to_string())?;
        writeln!(writer, "#MARKER\tALLELE1\tALLELE2").map_err(|e| e.to_string())?;
        Ok(GenotypeWriter { writer })
    }

    pub fn write(&mut self, result: &MarkerResult) -> Result<()> {
        writeln!(self.writer, "{}\t{}", result.marker.id(), result.call.genotype)
            .map_err(|e| e.to_string())
    }

    pub fn finish(mut self) -> Result<W> {
        self.writer.flush().map_err(|e| e.to_string())?;
        Ok(self.writer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mhgt::{
        genotype::{CallStatus, Genotype, GenotypeCall},
        marker::{Marker, SnpMarker},
    };

    fn result(id: &str, genotype: Genotype, status: CallStatus) -> MarkerResult {
        MarkerResult {
            marker: Marker::SingleSite(SnpMarker::new(id, "chr1", 10)),
            call: GenotypeCall { genotype, status },
            num_typed: 0,
        }
    }

    #[test]
    fn writes_header_and_sorted_alleles() {
        let mut writer = GenotypeWriter::from_writer(Vec::new(), "NA12878").unwrap();
        writer
            .write(&result("rs1", Genotype::new("T", "A"), CallStatus::Heterozygous))
            .unwrap();
        writer
            .write(&result("rs2", Genotype::missing(), CallStatus::NoCandidates))
            .unwrap();
        let text = String::from_utf8(writer.finish().unwrap()).unwrap();
        assert_eq!(
            text,
            "##sample=NA12878\n#MARKER\tALLELE1\tALLELE2\nrs1\tA\tT\nrs2\t.\t.\n"
        );
    }
}
