use crate::utils::Result;
use rust_htslib::bam::{self, Read};
use std::{collections::HashSet, path::Path};

/// Sample name from the `SM` field of the read groups, or the file stem when the
/// header has none or more than one.
pub fn get_sample_name(reads_path: &Path) -> Result<String> {
    let reader = bam::Reader::from_path(reads_path)
        .map_err(|e| format!("Failed to open {}: {}", reads_path.display(), e))?;
    let header = bam::Header::from_template(reader.header());
    let header_hashmap = header.to_hashmap();
    let mut sample_names = HashSet::new();

    if let Some(rg_fields) = header_hashmap.get("RG") {
        for rg_field in rg_fields {
            if let Some(sample_name) = rg_field.get("SM") {
                sample_names.insert(sample_name.to_owned());
            }
        }
    }

    match sample_names.len() {
        1 => {
            if let Some(name) = sample_names.into_iter().next() {
                return Ok(name);
            }
        }
        0 => log::warn!("No sample names found in read groups"),
        _ => log::warn!("Multiple sample names found in read groups"),
    };

    let sample = reads_path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or("Invalid reads file name")?
        .to_string();

    Ok(sample)
}
