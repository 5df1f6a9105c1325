//! Synthetic two-block genotype panels.
//!
//! Each block is an MVN draw with equicorrelation `rho`. The last column of
//! block A can be partially overwritten by the first column of block B (the
//! bridge), which models a causal variant sitting between the two blocks.
//! Per-column noise then scales with distance from that boundary.

use ndarray::{Array2, ArrayView1, Axis, s};
use rand::Rng;
use tracing::{debug, info};

use crate::error::{PicError, Result};
use crate::matrix::{equicorrelation, mvn_factor, sample_mvn_rows, standard_normal_matrix};
use crate::qc::{check_closed, check_half_open, check_non_negative, check_positive};
use crate::types::{Block, Marker};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DecayDirection {
    /// Noise grows with distance from the A/B boundary.
    AwayFromBoundary,
    /// Noise shrinks with distance from the A/B boundary.
    TowardBoundary,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NoiseProfile {
    pub base_sd: f64,
    pub step_sd: f64,
    pub direction: DecayDirection,
}

impl NoiseProfile {
    pub fn none() -> Self {
        Self {
            base_sd: 0.0,
            step_sd: 0.0,
            direction: DecayDirection::AwayFromBoundary,
        }
    }

    /// Noise SD for a marker `position` steps into a block of `k` markers.
    pub fn sd_for(&self, block: Block, position: usize, k: usize) -> f64 {
        let last = k.saturating_sub(1);
        let distance = match block {
            Block::A => last - position.min(last),
            Block::B => position.min(last),
        };
        let steps = match self.direction {
            DecayDirection::AwayFromBoundary => distance,
            DecayDirection::TowardBoundary => last - distance,
        };
        self.base_sd + self.step_sd * steps as f64
    }
}

impl Default for NoiseProfile {
    fn default() -> Self {
        Self {
            base_sd: 0.0,
            step_sd: 0.15,
            direction: DecayDirection::AwayFromBoundary,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bridge {
    /// Share of individuals (taken from the start) whose last block-A value
    /// is replaced by their first block-B value.
    pub fraction: f64,
}

impl Default for Bridge {
    fn default() -> Self {
        Self { fraction: 0.5 }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PanelConfig {
    pub n_individuals: usize,
    pub markers_per_block: usize,
    pub rho: f64,
    pub noise: NoiseProfile,
    pub bridge: Option<Bridge>,
}

impl Default for PanelConfig {
    fn default() -> Self {
        Self {
            n_individuals: 1000,
            markers_per_block: 10,
            rho: 0.8,
            noise: NoiseProfile::default(),
            bridge: Some(Bridge::default()),
        }
    }
}

impl PanelConfig {
    pub fn validate(&self) -> Result<()> {
        check_positive(self.n_individuals, "n_individuals")?;
        check_positive(self.markers_per_block, "markers_per_block")?;
        check_half_open(self.rho, 0.0, 1.0, "rho")?;
        check_non_negative(self.noise.base_sd, "noise base_sd")?;
        check_non_negative(self.noise.step_sd, "noise step_sd")?;
        if let Some(bridge) = &self.bridge {
            check_closed(bridge.fraction, 0.0, 1.0, "bridge fraction")?;
        }
        Ok(())
    }

    /// Id of the last block-A marker, where the bridge sits.
    pub fn boundary_marker(&self) -> usize {
        self.markers_per_block
    }
}

/// N×P genotype matrix with marker metadata. Immutable once built.
#[derive(Debug, Clone, PartialEq)]
pub struct Panel {
    genotypes: Array2<f64>,
    markers: Vec<Marker>,
    markers_per_block: usize,
}

impl Panel {
    /// Wraps a caller-built N×2K matrix; columns `1..=K` are block A.
    pub fn from_matrix(genotypes: Array2<f64>, markers_per_block: usize) -> Result<Self> {
        check_positive(markers_per_block, "markers_per_block")?;
        check_positive(genotypes.nrows(), "n_individuals")?;
        if genotypes.ncols() != 2 * markers_per_block {
            return Err(PicError::InvalidParameter(format!(
                "panel has {} columns, expected {}",
                genotypes.ncols(),
                2 * markers_per_block
            )));
        }
        let markers = (0..2 * markers_per_block)
            .map(|col| {
                let (block, position) = if col < markers_per_block {
                    (Block::A, col)
                } else {
                    (Block::B, col - markers_per_block)
                };
                Marker {
                    id: col + 1,
                    block,
                    position,
                }
            })
            .collect();
        Ok(Self {
            genotypes,
            markers,
            markers_per_block,
        })
    }

    pub fn n_individuals(&self) -> usize {
        self.genotypes.nrows()
    }

    pub fn n_markers(&self) -> usize {
        self.markers.len()
    }

    pub fn markers_per_block(&self) -> usize {
        self.markers_per_block
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn genotypes(&self) -> &Array2<f64> {
        &self.genotypes
    }

    pub fn contains(&self, id: usize) -> bool {
        self.column_index(id).is_some()
    }

    pub fn marker(&self, id: usize) -> Option<&Marker> {
        self.column_index(id).map(|col| &self.markers[col])
    }

    pub fn column(&self, id: usize) -> Option<ArrayView1<'_, f64>> {
        self.column_index(id).map(|col| self.genotypes.column(col))
    }

    pub(crate) fn column_at(&self, col: usize) -> ArrayView1<'_, f64> {
        self.genotypes.column(col)
    }

    pub(crate) fn column_index(&self, id: usize) -> Option<usize> {
        self.markers.binary_search_by_key(&id, |m| m.id).ok()
    }

    /// Copy of the panel without `ids`; remaining markers keep their ids.
    pub fn exclude(&self, ids: &[usize]) -> Result<Self> {
        for id in ids {
            if !self.contains(*id) {
                return Err(PicError::InvalidParameter(format!(
                    "cannot exclude marker {id}: not in panel"
                )));
            }
        }
        let keep: Vec<usize> = self
            .markers
            .iter()
            .enumerate()
            .filter(|(_, m)| !ids.contains(&m.id))
            .map(|(col, _)| col)
            .collect();
        if keep.is_empty() {
            return Err(PicError::InvalidParameter(
                "excluding every marker leaves an empty panel".into(),
            ));
        }
        Ok(Self {
            genotypes: self.genotypes.select(Axis(1), &keep),
            markers: keep.iter().map(|&col| self.markers[col]).collect(),
            markers_per_block: self.markers_per_block,
        })
    }
}

pub fn generate_panel<R: Rng + ?Sized>(config: &PanelConfig, rng: &mut R) -> Result<Panel> {
    config.validate()?;
    let n = config.n_individuals;
    let k = config.markers_per_block;

    let sigma = equicorrelation(k, config.rho);
    let factor = mvn_factor(&sigma)?;
    let block_a = sample_mvn_rows(n, &factor, rng);
    let block_b = sample_mvn_rows(n, &factor, rng);

    let mut genotypes = Array2::<f64>::zeros((n, 2 * k));
    genotypes.slice_mut(s![.., ..k]).assign(&block_a);
    genotypes.slice_mut(s![.., k..]).assign(&block_b);

    if let Some(bridge) = &config.bridge {
        let rows = (n as f64 * bridge.fraction).floor() as usize;
        let source = block_b.slice(s![..rows, 0]).to_owned();
        genotypes.slice_mut(s![..rows, k - 1]).assign(&source);
        debug!("bridged {rows} individuals between marker {k} and marker {}", k + 1);
    }

    let noise = standard_normal_matrix(n, 2 * k, rng);
    for col in 0..2 * k {
        let (block, position) = if col < k {
            (Block::A, col)
        } else {
            (Block::B, col - k)
        };
        let sd = config.noise.sd_for(block, position, k);
        if sd > 0.0 {
            let scaled = noise.column(col).mapv(|z| z * sd);
            let mut column = genotypes.column_mut(col);
            column += &scaled;
        }
    }

    info!(
        "generated panel: {n} individuals, {} markers (rho={}, bridge={:?})",
        2 * k,
        config.rho,
        config.bridge.map(|b| b.fraction)
    );
    Panel::from_matrix(genotypes, k)
}
