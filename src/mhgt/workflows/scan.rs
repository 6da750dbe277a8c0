use crate::mhgt::{
    aggregate::{accumulate_microhaplotype, accumulate_single_site, classify},
    genotype::GenotypeCall,
    marker::Marker,
    reads::{AlignmentRecord, AlignmentSource},
    typing::{type_microhaplotype, type_single_site, ReadFilter},
};
use crate::utils::Result;

pub struct Params {
    pub min_freq: f64,
    pub min_mapq: u8,
    pub read_filter: Box<dyn ReadFilter>,
}

/// A marker with its filled depth tables and the resulting call.
#[derive(Debug)]
pub struct MarkerResult {
    pub marker: Marker,
    pub call: GenotypeCall,
    pub num_typed: usize,
}

/// Types one read at the marker and accumulates the observation. Returns whether
/// the read contributed an allele.
pub fn type_record(marker: &mut Marker, record: &AlignmentRecord, filter: &dyn ReadFilter) -> bool {
    match marker {
        Marker::SingleSite(snp) => match type_single_site(record, snp) {
            Some(base) => {
                accumulate_single_site(snp, base);
                true
            }
            None => false,
        },
        Marker::Microhaplotype(mh) => match type_microhaplotype(record, mh, filter) {
            Some(allele) => {
                accumulate_microhaplotype(mh, &allele);
                true
            }
            None => false,
        },
    }
}

/// Classifies microhaplotype alleles and calls the genotype.
pub fn call_marker(marker: &mut Marker, min_freq: f64) -> GenotypeCall {
    match marker {
        Marker::SingleSite(snp) => snp.genotype(min_freq),
        Marker::Microhaplotype(mh) => {
            classify(&mut mh.known);
            mh.genotype(min_freq)
        }
    }
}

/// Runs the full typing pass for a marker over in-memory records.
pub fn genotype_records<'a, I>(mut marker: Marker, records: I, params: &Params) -> MarkerResult
where
    I: IntoIterator<Item = &'a AlignmentRecord>,
{
    let num_typed = records
        .into_iter()
        .filter(|record| record.mapq >= params.min_mapq)
        .filter(|record| type_record(&mut marker, record, params.read_filter.as_ref()))
        .count();
    let call = call_marker(&mut marker, params.min_freq);
    MarkerResult {
        marker,
        call,
        num_typed,
    }
}

/// Runs the full typing pass for a marker over the alignments of `source`.
pub fn analyze(
    mut marker: Marker,
    params: &Params,
    source: &mut AlignmentSource,
) -> Result<MarkerResult> {
    let region = marker.region()?;
    let mut num_typed = 0;
    let stats = source.for_each_record(&region, params.min_mapq, |record| {
        if type_record(&mut marker, &record, params.read_filter.as_ref()) {
            num_typed += 1;
        }
    })?;
    log::debug!(
        "{}: {} reads seen, {} filtered, {} malformed, {} typed",
        marker.id(),
        stats.seen,
        stats.filtered,
        stats.malformed,
        num_typed
    );

    let call = call_marker(&mut marker, params.min_freq);
    log::debug!("{}: {} ({})", marker.id(), call.genotype, call.status);
    Ok(MarkerResult {
        marker,
        call,
        num_typed,
    })
}
