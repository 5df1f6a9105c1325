use ndarray::Array2;

use crate::panel::Panel;
use crate::stats::pearson;
use crate::types::Block;

/// Pearson correlation between every pair of panel markers.
#[derive(Debug, Clone, PartialEq)]
pub struct CorrelationMatrix {
    pub ids: Vec<usize>,
    pub values: Array2<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CorrelationEntry {
    pub row: usize,
    pub col: usize,
    pub r: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BlockCorrelationSummary {
    pub within_a: f64,
    pub within_b: f64,
    pub across: f64,
}

/// Constant columns get NaN off the diagonal.
pub fn correlation_matrix(panel: &Panel) -> CorrelationMatrix {
    let p = panel.n_markers();
    let mut values = Array2::<f64>::eye(p);
    for i in 0..p {
        for j in (i + 1)..p {
            let r = pearson(panel.column_at(i), panel.column_at(j)).unwrap_or(f64::NAN);
            values[[i, j]] = r;
            values[[j, i]] = r;
        }
    }
    CorrelationMatrix {
        ids: panel.markers().iter().map(|m| m.id).collect(),
        values,
    }
}

impl CorrelationMatrix {
    pub fn get(&self, row: usize, col: usize) -> Option<f64> {
        let i = self.ids.binary_search(&row).ok()?;
        let j = self.ids.binary_search(&col).ok()?;
        Some(self.values[[i, j]])
    }

    /// Long form, row-major over marker ids.
    pub fn melt(&self) -> Vec<CorrelationEntry> {
        let mut out = Vec::with_capacity(self.ids.len() * self.ids.len());
        for (i, &row) in self.ids.iter().enumerate() {
            for (j, &col) in self.ids.iter().enumerate() {
                out.push(CorrelationEntry {
                    row,
                    col,
                    r: self.values[[i, j]],
                });
            }
        }
        out
    }

    /// Mean off-diagonal r within each block and across blocks.
    pub fn block_summary(&self, panel: &Panel) -> BlockCorrelationSummary {
        let blocks: Vec<Option<Block>> = self
            .ids
            .iter()
            .map(|&id| panel.marker(id).map(|m| m.block))
            .collect();
        let mut sums = [(0.0, 0usize); 3];
        for i in 0..self.ids.len() {
            for j in (i + 1)..self.ids.len() {
                let r = self.values[[i, j]];
                if !r.is_finite() {
                    continue;
                }
                let slot = match (blocks[i], blocks[j]) {
                    (Some(Block::A), Some(Block::A)) => 0,
                    (Some(Block::B), Some(Block::B)) => 1,
                    (Some(_), Some(_)) => 2,
                    _ => continue,
                };
                sums[slot].0 += r;
                sums[slot].1 += 1;
            }
        }
        let mean = |(sum, count): (f64, usize)| {
            if count == 0 {
                f64::NAN
            } else {
                sum / count as f64
            }
        };
        BlockCorrelationSummary {
            within_a: mean(sums[0]),
            within_b: mean(sums[1]),
            across: mean(sums[2]),
        }
    }
}
