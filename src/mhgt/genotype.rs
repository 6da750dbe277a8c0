//! Diploid genotype calls from accumulated allele depths.
//!

use super::marker::{MhMarker, SnpMarker, SNP_BASES};
use arrayvec::ArrayVec;
use std::fmt;

/// Placeholder for an allele slot without a call.
pub const MISSING_ALLELE: &str = ".";

/// An unordered pair of alleles, stored in lexicographic order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Genotype {
    alleles: [String; 2],
}

impl Genotype {
    pub fn new(first: impl Into<String>, second: impl Into<String>) -> Self {
        let mut alleles = [first.into(), second.into()];
        alleles.sort();
        Genotype { alleles }
    }

    pub fn homozygous(allele: impl Into<String>) -> Self {
        let allele = allele.into();
        Genotype::new(allele.clone(), allele)
    }

    pub fn missing() -> Self {
        Genotype::homozygous(MISSING_ALLELE)
    }

    pub fn alleles(&self) -> [&str; 2] {
        [&self.alleles[0], &self.alleles[1]]
    }

    pub fn is_missing(&self) -> bool {
        self.alleles.iter().all(|a| a == MISSING_ALLELE)
    }

    /// Alleles of the slots that carry a call.
    pub fn called_alleles(&self) -> impl Iterator<Item = &str> {
        self.alleles
            .iter()
            .map(|a| a.as_str())
            .filter(|a| *a != MISSING_ALLELE)
    }
}

impl fmt::Display for Genotype {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}\t{}", self.alleles[0], self.alleles[1])
    }
}

/// How a genotype call was reached.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CallStatus {
    Homozygous,
    Heterozygous,
    /// No allele passed the frequency threshold.
    NoCandidates,
    /// More than two alleles passed the frequency threshold.
    Ambiguous(usize),
}

impl fmt::Display for CallStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CallStatus::Homozygous => write!(f, "HOM"),
            CallStatus::Heterozygous => write!(f, "HET"),
            CallStatus::NoCandidates => write!(f, "NO_CANDIDATES"),
            CallStatus::Ambiguous(n) => write!(f, "AMBIGUOUS({})", n),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct GenotypeCall {
    pub genotype: Genotype,
    pub status: CallStatus,
}

/// Calls a diploid genotype from `(allele, depth)` candidates.
///
/// An allele is retained when its share of the total depth strictly exceeds
/// `min_freq`. One retained allele gives a homozygous call, two a heterozygous
/// call; none or more than two give a missing genotype.
pub fn decide<'a, I>(candidates: I, min_freq: f64) -> GenotypeCall
where
    I: IntoIterator<Item = (&'a str, f64)>,
{
    let candidates: Vec<(&str, f64)> = candidates.into_iter().collect();
    let total: f64 = candidates.iter().map(|(_, depth)| depth).sum();

    let mut retained: ArrayVec<&str, 2> = ArrayVec::new();
    let mut num_retained = 0;
    if total > 0.0 {
        for (allele, depth) in &candidates {
            if depth / total > min_freq {
                num_retained += 1;
                let _ = retained.try_push(*allele);
            }
        }
    }

    match (num_retained, retained.as_slice()) {
        (1, [allele]) => GenotypeCall {
            genotype: Genotype::homozygous(*allele),
            status: CallStatus::Homozygous,
        },
        (2, [first, second]) => GenotypeCall {
            genotype: Genotype::new(*first, *second),
            status: CallStatus::Heterozygous,
        },
        (0, _) => GenotypeCall {
            genotype: Genotype::missing(),
            status: CallStatus::NoCandidates,
        },
        (n, _) => GenotypeCall {
            genotype: Genotype::missing(),
            status: CallStatus::Ambiguous(n),
        },
    }
}

impl SnpMarker {
    pub fn genotype(&self, min_freq: f64) -> GenotypeCall {
        let bases: Vec<String> = SNP_BASES.iter().map(|b| (*b as char).to_string()).collect();
        decide(
            bases
                .iter()
                .zip(self.depths.iter())
                .map(|(base, depth)| (base.as_str(), *depth as f64)),
            min_freq,
        )
    }
}

impl MhMarker {
    pub fn genotype(&self, min_freq: f64) -> GenotypeCall {
        decide(
            self.known.iter().map(|(allele, depth)| (allele.as_str(), *depth)),
            min_freq,
        )
    }
}
