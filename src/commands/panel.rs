use crate::cli::PanelArgs;
use crate::mhgt::{
    genotype::Genotype,
    marker::load_markers,
    population::PopulationPanel,
    writers::{write_panel_matrix, write_panel_stats, SAMPLE_HEADER_PREFIX},
};
use crate::utils::{create_writer, open_text_reader, Result};
use std::{
    collections::{HashMap, HashSet},
    fs::File,
    io::{BufRead, BufWriter},
    path::Path,
};

/// Genotypes of one sample, keyed by marker id.
#[derive(Debug, PartialEq)]
pub struct SampleGenotypes {
    pub sample: String,
    pub genotypes: HashMap<String, Genotype>,
}

pub fn panel(args: PanelArgs) -> Result<()> {
    let markers = load_markers(open_text_reader(&args.markers_path)?);
    log::info!("Loaded {} markers", markers.len());

    let mut tables = Vec::with_capacity(args.genotype_paths.len());
    let mut seen_samples = HashSet::new();
    for path in &args.genotype_paths {
        let table = read_genotype_table(path)?;
        if !seen_samples.insert(table.sample.clone()) {
            return Err(format!(
                "Sample {} appears more than once ({})",
                table.sample,
                path.display()
            ));
        }
        tables.push(table);
    }

    let marker_ids: HashSet<&str> = markers.iter().map(|m| m.id()).collect();
    for table in &tables {
        let num_unknown = table
            .genotypes
            .keys()
            .filter(|id| !marker_ids.contains(id.as_str()))
            .count();
        if num_unknown > 0 {
            log::warn!(
                "Ignoring {} genotypes of {} at undefined markers",
                num_unknown,
                table.sample
            );
        }
    }

    let panels: Vec<(String, PopulationPanel)> = markers
        .iter()
        .map(|marker| {
            let mut panel = PopulationPanel::new();
            for table in &tables {
                let genotype = table
                    .genotypes
                    .get(marker.id())
                    .cloned()
                    .unwrap_or_else(Genotype::missing);
                panel.insert(table.sample.as_str(), genotype);
            }
            (marker.id().to_string(), panel)
        })
        .collect();
    let samples: Vec<String> = tables.into_iter().map(|t| t.sample).collect();

    create_writer(&args.output_prefix, "panel.tab", |path| {
        let mut writer = open_output(path)?;
        write_panel_matrix(&mut writer, &samples, &panels)
    })?;
    create_writer(&args.output_prefix, "stats.tab", |path| {
        let mut writer = open_output(path)?;
        write_panel_stats(&mut writer, &panels)
    })?;

    log::info!(
        "Built panel of {} samples over {} markers",
        samples.len(),
        panels.len()
    );
    Ok(())
}

fn open_output(path: &str) -> Result<BufWriter<File>> {
    File::create(path)
        .map(BufWriter::new)
        .map_err(|e| format!("Invalid output path: {}", e))
}

fn read_genotype_table(path: &Path) -> Result<SampleGenotypes> {
    let default_name = path
        .file_stem()
        .and_then(|stem| stem.to_str())
        .ok_or_else(|| format!("Invalid genotype file name: {}", path.display()))?;
    parse_genotype_table(open_text_reader(path)?, default_name)
        .map_err(|e| format!("{}: {}", path.display(), e))
}

/// Parses a genotype table. Comment lines are skipped except for the sample header,
/// and only lines with exactly three fields are kept.
pub fn parse_genotype_table<R: BufRead>(reader: R, default_name: &str) -> Result<SampleGenotypes> {
    const FIELD_COUNT: usize = 3;
    let mut sample = None;
    let mut genotypes = HashMap::new();
    for (line_number, result_line) in reader.lines().enumerate() {
        let line =
            result_line.map_err(|e| format!("Error at line {}: {}", line_number + 1, e))?;
        if let Some(name) = line.strip_prefix(SAMPLE_HEADER_PREFIX) {
            sample = Some(name.trim().to_string()).filter(|n| !n.is_empty());
            continue;
        }
        if line.starts_with('#') {
            continue;
        }
        let fields: Vec<&str> = line.trim_end().split('\t').collect();
        if fields.len() != FIELD_COUNT {
            continue;
        }
        let genotype = Genotype::new(fields[1], fields[2]);
        if genotypes.insert(fields[0].to_string(), genotype).is_some() {
            log::warn!("Marker {} is listed more than once, keeping the last entry", fields[0]);
        }
    }

    Ok(SampleGenotypes {
        sample: sample.unwrap_or_else(|| default_name.to_string()),
        genotypes,
    })
}
