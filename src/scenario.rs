//! End-to-end runs: generate a panel, simulate a phenotype, scan.

use rand::SeedableRng;
use rand::rngs::StdRng;
use tracing::info;

use crate::correlation::{CorrelationMatrix, correlation_matrix};
use crate::error::Result;
use crate::panel::{Panel, PanelConfig, generate_panel};
use crate::phenotype::{CausalSet, DEFAULT_PHENOTYPE_SD, Phenotype, simulate_phenotype};
use crate::pic::{PicLine, fit_pic_lines};
use crate::scan::{ScanConfig, scan};
use crate::types::{CausalVariant, Reference, ScanResult};

pub const DEFAULT_SEED: u64 = 100;

#[derive(Debug, Clone)]
pub struct ScenarioConfig {
    pub seed: u64,
    pub panel: PanelConfig,
    pub causal: CausalSet,
    pub phenotype_sd: f64,
    pub references: Vec<Reference>,
    /// Drop the causal markers from the panel before scanning.
    pub mask_causal: bool,
    pub scan: ScanConfig,
}

#[derive(Debug, Clone)]
pub struct ScenarioOutput {
    /// Panel as scanned (after masking, if any).
    pub panel: Panel,
    pub phenotype: Phenotype,
    pub result: ScanResult,
    /// Lines against the first resolved reference.
    pub lines: Vec<PicLine>,
    pub correlation: CorrelationMatrix,
}

pub fn run_scenario(config: &ScenarioConfig) -> Result<ScenarioOutput> {
    let mut rng = StdRng::seed_from_u64(config.seed);
    let full_panel = generate_panel(&config.panel, &mut rng)?;
    let phenotype = simulate_phenotype(&full_panel, &config.causal, config.phenotype_sd, &mut rng)?;

    let panel = if config.mask_causal {
        info!("masking causal markers {:?}", config.causal.markers());
        full_panel.exclude(&config.causal.markers())?
    } else {
        full_panel
    };

    let result = scan(
        &panel,
        &phenotype,
        &config.causal,
        &config.references,
        &config.scan,
    )?;
    let lines = result
        .references
        .first()
        .map(|&reference| fit_pic_lines(&result, reference))
        .unwrap_or_default();
    let correlation = correlation_matrix(&panel);

    Ok(ScenarioOutput {
        panel,
        phenotype,
        result,
        lines,
        correlation,
    })
}

/// The causal-variant configurations the PIC comparison is built on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Preset {
    /// Single causal marker bridging the two blocks.
    Boundary,
    /// Single causal marker inside block A, no bridge.
    WithinBlock,
    /// Boundary marker (weight 1.0) plus last block-B marker (weight 0.5).
    TwoCausal,
    /// Boundary causal removed from the panel; r² against the top hit.
    Masked,
}

impl Preset {
    pub const ALL: [Preset; 4] = [
        Preset::Boundary,
        Preset::WithinBlock,
        Preset::TwoCausal,
        Preset::Masked,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Preset::Boundary => "boundary",
            Preset::WithinBlock => "within_block",
            Preset::TwoCausal => "two_causal",
            Preset::Masked => "masked",
        }
    }

    pub fn config(self, seed: u64) -> Result<ScenarioConfig> {
        let panel = PanelConfig::default();
        let k = panel.markers_per_block;
        let boundary = panel.boundary_marker();
        let config = match self {
            Preset::Boundary => ScenarioConfig {
                seed,
                causal: CausalSet::single(boundary),
                phenotype_sd: DEFAULT_PHENOTYPE_SD,
                references: vec![Reference::Marker(boundary)],
                mask_causal: false,
                scan: ScanConfig::default(),
                panel,
            },
            Preset::WithinBlock => {
                let inner = k.div_ceil(2);
                ScenarioConfig {
                    seed,
                    causal: CausalSet::single(inner),
                    phenotype_sd: DEFAULT_PHENOTYPE_SD,
                    references: vec![Reference::Marker(inner)],
                    mask_causal: false,
                    scan: ScanConfig::default(),
                    panel: PanelConfig {
                        bridge: None,
                        ..panel
                    },
                }
            }
            Preset::TwoCausal => {
                let second = 2 * k;
                ScenarioConfig {
                    seed,
                    causal: CausalSet::pair(
                        CausalVariant {
                            marker: boundary,
                            weight: 1.0,
                        },
                        CausalVariant {
                            marker: second,
                            weight: 0.5,
                        },
                    )?,
                    phenotype_sd: DEFAULT_PHENOTYPE_SD,
                    references: vec![Reference::Marker(boundary), Reference::Marker(second)],
                    mask_causal: false,
                    scan: ScanConfig::default(),
                    panel,
                }
            }
            Preset::Masked => ScenarioConfig {
                seed,
                causal: CausalSet::single(boundary),
                phenotype_sd: DEFAULT_PHENOTYPE_SD,
                references: vec![Reference::TopHit],
                mask_causal: true,
                scan: ScanConfig::default(),
                panel,
            },
        };
        Ok(config)
    }
}
