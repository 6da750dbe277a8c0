mod write_depths;
mod write_genotypes;
mod write_panel;

pub use write_depths::DepthWriter;
pub use write_genotypes::{GenotypeWriter, SAMPLE_HEADER_PREFIX};
pub use write_panel::{write_panel_matrix, write_panel_stats};
