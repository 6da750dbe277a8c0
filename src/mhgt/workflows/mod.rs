mod scan;

pub use scan::{analyze, call_marker, genotype_records, type_record, MarkerResult, Params};
