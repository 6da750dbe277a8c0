pub mod aggregate;
pub mod alleles;
pub mod genotype;
pub mod marker;
pub mod population;
pub mod reads;
pub mod typing;
pub mod workflows;
pub mod writers;
