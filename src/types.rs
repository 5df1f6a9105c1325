use std::collections::BTreeMap;
use std::fmt;

/// Haplotype block a marker belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Block {
    A,
    B,
}

impl Block {
    pub fn label(self) -> &'static str {
        match self {
            Block::A => "A",
            Block::B => "B",
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// A simulated variant. `id` is 1-based and stable across `Panel::exclude`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Marker {
    pub id: usize,
    pub block: Block,
    /// 0-based position within its block.
    pub position: usize,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CausalVariant {
    pub marker: usize,
    pub weight: f64,
}

/// Reference marker for r² computation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Reference {
    Marker(usize),
    /// Marker with the strongest association in the scan.
    TopHit,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AssociationRecord {
    pub marker: usize,
    pub block: Block,
    pub is_causal: bool,
    pub beta: f64,
    pub se: f64,
    pub neg_log10_p: f64,
    /// r² keyed by resolved reference marker id.
    pub rsq: BTreeMap<usize, f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ScanResult {
    pub records: Vec<AssociationRecord>,
    pub references: Vec<usize>,
    pub degenerate: Vec<usize>,
}

impl ScanResult {
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn get(&self, marker: usize) -> Option<&AssociationRecord> {
        self.records
            .binary_search_by_key(&marker, |r| r.marker)
            .ok()
            .map(|idx| &self.records[idx])
    }

    /// Marker with the largest -log10 p (NaN skipped); ties resolve to the lowest id.
    pub fn top_hit(&self) -> Option<usize> {
        top_hit(&self.records)
    }

    pub fn rsq_with(&self, reference: usize) -> Vec<f64> {
        self.records
            .iter()
            .map(|r| r.rsq.get(&reference).copied().unwrap_or(f64::NAN))
            .collect()
    }
}

pub(crate) fn top_hit(records: &[AssociationRecord]) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for record in records {
        // An exact fit scores +inf and still ranks first.
        if record.neg_log10_p.is_nan() {
            continue;
        }
        match best {
            Some((_, score)) if record.neg_log10_p <= score => {}
            _ => best = Some((record.marker, record.neg_log10_p)),
        }
    }
    best.map(|(marker, _)| marker)
}
