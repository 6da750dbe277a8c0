//! Writers for the population panel matrix and its per-marker statistics.
//!

use crate::mhgt::population::PopulationPanel;
use crate::utils::Result;
use itertools::Itertools;
use std::io::Write;

/// Writes one row per sample with both genotype slots of every marker, markers in
/// the order given.
pub fn write_panel_matrix<W: Write>(
    writer: &mut W,
    samples: &[String],
    panels: &[(String, PopulationPanel)],
) -> Result<()> {
    let header = panels
        .iter()
        .map(|(id, _)| format!("{}\t{}", id, id))
        .join("\t");
    writeln!(writer, "SAMPLE\t{}", header).map_err(|e| e.to_string())?;

    for sample in samples {
        let row = panels
            .iter()
            .map(|(_, panel)| panel.individual_genotype(sample).to_string())
            .join("\t");
        writeln!(writer, "{}\t{}", sample, row).map_err(|e| e.to_string())?;
    }
    writer.flush().map_err(|e| e.to_string())
}

/// Writes sample count, effective allele count and PIC per marker.
pub fn write_panel_stats<W: Write>(
    writer: &mut W,
    panels: &[(String, PopulationPanel)],
) -> Result<()> {
    writeln!(writer, "#MARKER\tSAMPLES\tAE\tPIC").map_err(|e| e.to_string())?;
    for (id, panel) in panels {
        let pic = match panel.pic() {
            Some(pic) => format!("{:.4}", pic),
            None => ".".to_string(),
        };
        writeln!(
            writer,
            "{}\t{}\t{}\t{}",
            id,
            panel.sample_count(),
            panel.effective_allele_count(),
            pic
        )
        .map_err(|e| e.to_string())?;
    }
    writer.flush().map_err(|e| e.to_string())
}
