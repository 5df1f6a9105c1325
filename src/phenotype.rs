use ndarray::{Array1, ArrayView1};
use rand::Rng;
use rand_distr::{Distribution, StandardNormal};
use tracing::info;

use crate::error::{PicError, Result};
use crate::panel::Panel;
use crate::qc::{check_finite, check_non_negative};
use crate::types::CausalVariant;

pub const DEFAULT_PHENOTYPE_SD: f64 = 1.0;
const MAX_CAUSAL: usize = 2;

/// One or two distinct causal markers with their effect weights.
#[derive(Debug, Clone, PartialEq)]
pub struct CausalSet {
    variants: Vec<CausalVariant>,
}

impl CausalSet {
    pub fn new(variants: Vec<CausalVariant>) -> Result<Self> {
        if variants.is_empty() || variants.len() > MAX_CAUSAL {
            return Err(PicError::InvalidParameter(format!(
                "causal set must hold 1 to {MAX_CAUSAL} markers, got {}",
                variants.len()
            )));
        }
        for (i, v) in variants.iter().enumerate() {
            check_finite(v.weight, "causal weight")?;
            if variants[..i].iter().any(|other| other.marker == v.marker) {
                return Err(PicError::InvalidParameter(format!(
                    "causal marker {} listed twice",
                    v.marker
                )));
            }
        }
        Ok(Self { variants })
    }

    pub fn single(marker: usize) -> Self {
        Self {
            variants: vec![CausalVariant {
                marker,
                weight: 1.0,
            }],
        }
    }

    pub fn pair(first: CausalVariant, second: CausalVariant) -> Result<Self> {
        Self::new(vec![first, second])
    }

    pub fn variants(&self) -> &[CausalVariant] {
        &self.variants
    }

    pub fn markers(&self) -> Vec<usize> {
        self.variants.iter().map(|v| v.marker).collect()
    }

    pub fn contains(&self, marker: usize) -> bool {
        self.variants.iter().any(|v| v.marker == marker)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Phenotype {
    values: Array1<f64>,
}

impl Phenotype {
    pub fn new(values: Array1<f64>) -> Self {
        Self { values }
    }

    pub fn values(&self) -> ArrayView1<'_, f64> {
        self.values.view()
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// `y = Σ wᵢ xᵢ + ε`, `ε ~ N(0, noise_sd²)`.
pub fn simulate_phenotype<R: Rng + ?Sized>(
    panel: &Panel,
    causal: &CausalSet,
    noise_sd: f64,
    rng: &mut R,
) -> Result<Phenotype> {
    check_non_negative(noise_sd, "phenotype noise_sd")?;
    let n = panel.n_individuals();
    let mut values = Array1::<f64>::zeros(n);
    for variant in causal.variants() {
        let column = panel.column(variant.marker).ok_or_else(|| {
            PicError::InvalidParameter(format!(
                "causal marker {} is outside the panel (1..={})",
                variant.marker,
                panel.n_markers()
            ))
        })?;
        values.scaled_add(variant.weight, &column);
    }
    for v in values.iter_mut() {
        let z: f64 = StandardNormal.sample(&mut *rng);
        *v += noise_sd * z;
    }
    info!(
        "simulated phenotype from {} causal marker(s), noise sd {noise_sd}",
        causal.variants().len()
    );
    Ok(Phenotype { values })
}
