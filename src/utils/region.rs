use crate::utils::Result;

/// Closed interval of 1-based reference coordinates on one contig.
#[derive(Debug, PartialEq, Clone)]
pub struct GenomicRegion {
    pub contig: String,
    pub start: u64,
    pub end: u64,
}

impl GenomicRegion {
    pub fn new(contig: impl Into<String>, start: u64, end: u64) -> Result<Self> {
        if start == 0 {
            return Err("Invalid region: coordinates are 1-based".to_string());
        }
        if start > end {
            return Err(format!("Invalid region: start {} > end {}", start, end));
        }

        Ok(Self {
            contig: contig.into(),
            start,
            end,
        })
    }

    /// 0-based, half-open bounds as expected by htslib region queries.
    pub fn fetch_bounds(&self) -> (i64, i64) {
        (self.start as i64 - 1, self.end as i64)
    }
}

impl std::fmt::Display for GenomicRegion {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}:{}-{}", self.contig, self.start, self.end)
    }
}
