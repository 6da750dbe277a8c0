//! Polymorphism statistics over the genotypes called for one marker across samples.
//!

use super::genotype::Genotype;
use std::collections::BTreeMap;

/// Genotypes of every sample at one marker.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct PopulationPanel {
    genotypes: BTreeMap<String, Genotype>,
}

impl PopulationPanel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, sample: impl Into<String>, genotype: Genotype) {
        self.genotypes.insert(sample.into(), genotype);
    }

    /// Genotype of `sample`, missing when the sample was not typed.
    pub fn individual_genotype(&self, sample: &str) -> Genotype {
        self.genotypes
            .get(sample)
            .cloned()
            .unwrap_or_else(Genotype::missing)
    }

    pub fn sample_count(&self) -> usize {
        self.genotypes.len()
    }

    /// Occurrences of each called allele over both slots of every genotype.
    pub fn allele_counts(&self) -> BTreeMap<&str, usize> {
        let mut counts = BTreeMap::new();
        for allele in self.genotypes.values().flat_map(|g| g.called_alleles()) {
            *counts.entry(allele).or_insert(0) += 1;
        }
        counts
    }

    /// Number of distinct alleles observed in the population (Ae).
    pub fn effective_allele_count(&self) -> usize {
        self.allele_counts().len()
    }

    /// Polymorphism information content, or `None` for an empty panel.
    ///
    /// Missing genotype slots are pooled into one extra frequency class.
    pub fn pic(&self) -> Option<f64> {
        if self.genotypes.is_empty() {
            return None;
        }
        let num_slots = 2 * self.sample_count();
        let counts = self.allele_counts();
        let called: usize = counts.values().sum();

        let mut freqs: Vec<f64> = counts
            .values()
            .map(|c| *c as f64 / num_slots as f64)
            .collect();
        if called < num_slots {
            freqs.push((num_slots - called) as f64 / num_slots as f64);
        }
        Some(pic(&freqs))
    }
}

/// `PIC = 1 - Σp² - (Σp²)² + Σp⁴`
pub fn pic(freqs: &[f64]) -> f64 {
    let sum_of_squares: f64 = freqs.iter().map(|p| p.powi(2)).sum();
    let sum_of_fourth_powers: f64 = freqs.iter().map(|p| p.powi(4)).sum();
    1.0 - sum_of_squares - sum_of_squares.powi(2) + sum_of_fourth_powers
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn monomorphic_population_has_zero_pic() {
        let mut panel = PopulationPanel::new();
        panel.insert("s1", Genotype::homozygous("A"));
        panel.insert("s2", Genotype::homozygous("A"));
        assert_eq!(panel.allele_counts(), BTreeMap::from([("A", 4)]));
        assert_eq!(panel.effective_allele_count(), 1);
        assert_relative_eq!(panel.pic().unwrap(), 0.0);
    }

    #[test]
    fn two_equal_alleles() {
        let mut panel = PopulationPanel::new();
        panel.insert("s1", Genotype::new("A", "G"));
        panel.insert("s2", Genotype::new("A", "G"));
        // p = (0.5, 0.5): 1 - 0.5 - 0.25 + 0.125
        assert_relative_eq!(panel.pic().unwrap(), 0.375);
        assert_eq!(panel.effective_allele_count(), 2);
    }

    #[test]
    fn missing_slots_form_their_own_class() {
        let mut panel = PopulationPanel::new();
        panel.insert("s1", Genotype::homozygous("A"));
        panel.insert("s2", Genotype::missing());
        panel.insert("s3", Genotype::new(".", "A"));
        assert_eq!(panel.allele_counts(), BTreeMap::from([("A", 3)]));

        // p = (3/6, 3/6) where the second class is the missing mass
        assert_relative_eq!(panel.pic().unwrap(), pic(&[0.5, 0.5]));
        assert_eq!(panel.effective_allele_count(), 1);
    }

    #[test]
    fn empty_panel_has_no_pic() {
        assert_eq!(PopulationPanel::new().pic(), None);
        assert_eq!(PopulationPanel::new().effective_allele_count(), 0);
    }

    #[test]
    fn unknown_sample_is_missing() {
        let mut panel = PopulationPanel::new();
        panel.insert("s1", Genotype::homozygous("A"));
        assert_eq!(panel.individual_genotype("s1"), Genotype::homozygous("A"));
        assert!(panel.individual_genotype("s9").is_missing());
    }

    #[test]
    fn pic_closed_form() {
        assert_relative_eq!(pic(&[1.0]), 0.0);
        let freqs = [0.5, 0.25, 0.25];
        let s2 = 0.25 + 0.0625 + 0.0625;
        let s4 = 0.0625 + 0.00390625 + 0.00390625;
        assert_relative_eq!(pic(&freqs), 1.0 - s2 - s2 * s2 + s4);
    }
}
