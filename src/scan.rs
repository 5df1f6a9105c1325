//! Single-marker association scan.
//!
//! A constant marker column does not abort the scan: its record carries NaN
//! for every regression statistic and every r² other than self-r², and its id
//! is listed in [`ScanResult::degenerate`].

use std::collections::BTreeMap;

use rayon::prelude::*;
use tracing::{info, warn};

use crate::error::{PicError, Result};
use crate::panel::Panel;
use crate::parallel::{resolve_threads, run_in_pool};
use crate::phenotype::{CausalSet, Phenotype};
use crate::qc::check_equal_length;
use crate::stats::{is_constant, r_squared, simple_ols};
use crate::types::{AssociationRecord, Reference, ScanResult, top_hit};

const MAX_REFERENCES: usize = 2;

#[derive(Debug, Clone, Default)]
pub struct ScanConfig {
    pub parallel: bool,
    pub cores: Option<usize>,
}

struct MarkerFit {
    beta: f64,
    se: f64,
    neg_log10_p: f64,
    degenerate: bool,
}

pub fn scan(
    panel: &Panel,
    phenotype: &Phenotype,
    causal: &CausalSet,
    references: &[Reference],
    config: &ScanConfig,
) -> Result<ScanResult> {
    check_equal_length(
        phenotype.len(),
        panel.n_individuals(),
        "phenotype",
        "panel rows",
    )?;
    if panel.n_individuals() < 3 {
        return Err(PicError::InvalidParameter(format!(
            "association scan needs at least 3 individuals, got {}",
            panel.n_individuals()
        )));
    }
    if references.is_empty() || references.len() > MAX_REFERENCES {
        return Err(PicError::InvalidParameter(format!(
            "scan takes 1 to {MAX_REFERENCES} reference markers, got {}",
            references.len()
        )));
    }
    for reference in references {
        if let Reference::Marker(id) = reference {
            if !panel.contains(*id) {
                return Err(PicError::InvalidParameter(format!(
                    "reference marker {id} is not in the panel"
                )));
            }
        }
    }
    if is_constant(phenotype.values()) {
        return Err(PicError::DegenerateInput("phenotype has zero variance".into()));
    }

    let n_markers = panel.n_markers();
    let columns: Vec<usize> = (0..n_markers).collect();
    let fit_one = |&col: &usize| fit_marker(panel, phenotype, col);

    let fits: Vec<Result<MarkerFit>> = if config.parallel {
        let cores = resolve_threads(config.cores, n_markers);
        run_in_pool(cores, || columns.par_iter().map(fit_one).collect())?
    } else {
        columns.iter().map(fit_one).collect()
    };

    let mut records = Vec::with_capacity(n_markers);
    let mut degenerate = Vec::new();
    for (marker, fit) in panel.markers().iter().zip(fits) {
        let fit = fit?;
        if fit.degenerate {
            degenerate.push(marker.id);
        }
        records.push(AssociationRecord {
            marker: marker.id,
            block: marker.block,
            is_causal: causal.contains(marker.id),
            beta: fit.beta,
            se: fit.se,
            neg_log10_p: fit.neg_log10_p,
            rsq: BTreeMap::new(),
        });
    }
    if !degenerate.is_empty() {
        warn!(
            "{} constant marker(s) reported as NaN: {:?}",
            degenerate.len(),
            degenerate
        );
    }

    let resolved = resolve_references(references, &records)?;
    for &reference in &resolved {
        let ref_col = panel
            .column_index(reference)
            .ok_or_else(|| PicError::InvalidParameter(format!("unknown reference {reference}")))?;
        let rsq_one = |&col: &usize| {
            if col == ref_col {
                1.0
            } else {
                r_squared(panel.column_at(col), panel.column_at(ref_col))
            }
        };
        let rsq: Vec<f64> = if config.parallel {
            let cores = resolve_threads(config.cores, n_markers);
            run_in_pool(cores, || columns.par_iter().map(rsq_one).collect())?
        } else {
            columns.iter().map(rsq_one).collect()
        };
        for (record, value) in records.iter_mut().zip(rsq) {
            record.rsq.insert(reference, value);
        }
    }

    info!(
        "scanned {} markers against references {:?}",
        records.len(),
        resolved
    );
    Ok(ScanResult {
        records,
        references: resolved,
        degenerate,
    })
}

fn fit_marker(panel: &Panel, phenotype: &Phenotype, col: usize) -> Result<MarkerFit> {
    match simple_ols(panel.column_at(col), phenotype.values()) {
        Ok(fit) => Ok(MarkerFit {
            beta: fit.slope,
            se: fit.se,
            neg_log10_p: fit.neg_log10_p,
            degenerate: false,
        }),
        Err(PicError::DegenerateInput(_)) => Ok(MarkerFit {
            beta: f64::NAN,
            se: f64::NAN,
            neg_log10_p: f64::NAN,
            degenerate: true,
        }),
        Err(err) => Err(err),
    }
}

fn resolve_references(
    references: &[Reference],
    records: &[AssociationRecord],
) -> Result<Vec<usize>> {
    let mut resolved = Vec::with_capacity(references.len());
    for reference in references {
        let id = match reference {
            Reference::Marker(id) => *id,
            Reference::TopHit => top_hit(records).ok_or_else(|| {
                PicError::DegenerateInput("no marker has a usable association statistic".into())
            })?,
        };
        if !resolved.contains(&id) {
            resolved.push(id);
        }
    }
    Ok(resolved)
}
