pub mod genotype;
pub mod panel;
