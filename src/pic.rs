use ndarray::Array1;
use tracing::{debug, warn};

use crate::stats::simple_ols;
use crate::types::{Block, ScanResult};

/// OLS line of -log10 p on r² within one block.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PicLine {
    pub block: Block,
    pub slope: f64,
    pub intercept: f64,
    pub points: usize,
}

impl PicLine {
    pub fn predict(&self, rsq: f64) -> f64 {
        self.intercept + self.slope * rsq
    }
}

/// One drawable marker on a PIC plot.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PicPoint {
    pub marker: usize,
    pub block: Block,
    pub is_causal: bool,
    pub rsq: f64,
    pub neg_log10_p: f64,
}

/// Markers with finite r² against `reference` and finite -log10 p, in id order.
pub fn pic_points(result: &ScanResult, reference: usize) -> Vec<PicPoint> {
    result
        .records
        .iter()
        .filter_map(|r| {
            let rsq = r.rsq.get(&reference).copied()?;
            (rsq.is_finite() && r.neg_log10_p.is_finite()).then_some(PicPoint {
                marker: r.marker,
                block: r.block,
                is_causal: r.is_causal,
                rsq,
                neg_log10_p: r.neg_log10_p,
            })
        })
        .collect()
}

pub fn fit_pic_lines(result: &ScanResult, reference: usize) -> Vec<PicLine> {
    let all = pic_points(result, reference);
    let mut lines = Vec::new();
    for block in [Block::A, Block::B] {
        let (xs, ys): (Vec<f64>, Vec<f64>) = all
            .iter()
            .filter(|p| p.block == block)
            .map(|p| (p.rsq, p.neg_log10_p))
            .unzip();
        let points = xs.len();
        let x = Array1::from_vec(xs);
        let y = Array1::from_vec(ys);
        match simple_ols(x.view(), y.view()) {
            Ok(fit) => {
                debug!(
                    "block {block}: slope {:.3}, intercept {:.3} over {points} markers",
                    fit.slope, fit.intercept
                );
                lines.push(PicLine {
                    block,
                    slope: fit.slope,
                    intercept: fit.intercept,
                    points,
                });
            }
            Err(err) => warn!("no PIC line for block {block}: {err}"),
        }
    }
    lines
}
