use picsim::panel::{Bridge, PanelConfig};
use picsim::phenotype::CausalSet;
use picsim::scan::ScanConfig;
use picsim::scenario::{DEFAULT_SEED, Preset, ScenarioConfig, ScenarioOutput, run_scenario};
use picsim::stats::neg_log10;
use picsim::types::{AssociationRecord, Block, Reference};

fn run(preset: Preset) -> ScenarioOutput {
    let config = preset.config(DEFAULT_SEED).expect("preset config");
    run_scenario(&config).expect("scenario")
}

fn mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values.fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
    sum / count as f64
}

fn records_at<'a>(
    out: &'a ScenarioOutput,
    ids: std::ops::RangeInclusive<usize>,
) -> impl Iterator<Item = &'a AssociationRecord> + 'a {
    ids.filter_map(move |id| out.result.get(id))
}

#[test]
fn boundary_causal_is_the_strongest_association() {
    let out = run(Preset::Boundary);
    assert_eq!(out.result.len(), 20);
    assert_eq!(out.result.top_hit(), Some(10));
    let causal = out.result.get(10).expect("causal record");
    assert!(causal.is_causal);
    assert_eq!(causal.rsq[&10], 1.0);
    assert!(causal.neg_log10_p > 20.0);
}

#[test]
fn boundary_rsq_and_signal_decay_away_from_causal_in_both_blocks() {
    let out = run(Preset::Boundary);
    let rsq = |r: &AssociationRecord| r.rsq[&10];
    let p = |r: &AssociationRecord| r.neg_log10_p;

    // Block A: markers 6..=9 are close to the boundary, 1..=4 far from it.
    let near_a = mean(records_at(&out, 6..=9).map(rsq));
    let far_a = mean(records_at(&out, 1..=4).map(rsq));
    assert!(near_a > far_a, "block A rsq near {near_a} far {far_a}");
    let near_a_p = mean(records_at(&out, 6..=9).map(p));
    let far_a_p = mean(records_at(&out, 1..=4).map(p));
    assert!(near_a_p > far_a_p, "block A p near {near_a_p} far {far_a_p}");

    // Block B: markers 12..=15 near, 17..=20 far.
    let near_b = mean(records_at(&out, 12..=15).map(rsq));
    let far_b = mean(records_at(&out, 17..=20).map(rsq));
    assert!(near_b > far_b, "block B rsq near {near_b} far {far_b}");
    let near_b_p = mean(records_at(&out, 12..=15).map(p));
    let far_b_p = mean(records_at(&out, 17..=20).map(p));
    assert!(near_b_p > far_b_p, "block B p near {near_b_p} far {far_b_p}");

    assert_eq!(out.lines.len(), 2);
    assert!(out.lines.iter().all(|line| line.slope > 0.0));
}

#[test]
fn within_block_causal_leaves_other_block_null() {
    let out = run(Preset::WithinBlock);
    assert_eq!(out.result.references, vec![5]);

    let block_b: Vec<&AssociationRecord> = out
        .result
        .records
        .iter()
        .filter(|r| r.block == Block::B)
        .collect();
    assert_eq!(block_b.len(), 10);
    let b_rsq = mean(block_b.iter().map(|r| r.rsq[&5]));
    let b_p = mean(block_b.iter().map(|r| r.neg_log10_p));
    assert!(b_rsq < 0.02, "block B rsq {b_rsq}");
    assert!(b_p < 1.5, "block B -log10 p {b_p}");

    let a_rsq = mean(
        out.result
            .records
            .iter()
            .filter(|r| r.block == Block::A && !r.is_causal)
            .map(|r| r.rsq[&5]),
    );
    assert!(a_rsq > 0.15, "block A rsq {a_rsq}");
    assert_eq!(out.result.top_hit(), Some(5));
}

#[test]
fn two_causal_variants_superimpose_signal() {
    let boundary = run(Preset::Boundary);
    let out = run(Preset::TwoCausal);
    assert_eq!(out.result.references, vec![10, 20]);

    let causal: Vec<usize> = out
        .result
        .records
        .iter()
        .filter(|r| r.is_causal)
        .map(|r| r.marker)
        .collect();
    assert_eq!(causal, vec![10, 20]);
    for id in [10, 20] {
        let record = out.result.get(id).expect("causal record");
        assert_eq!(record.rsq[&id], 1.0);
        assert!(record.neg_log10_p > 10.0, "marker {id}: {}", record.neg_log10_p);
    }
    assert!(out.result.records.iter().all(|r| r.rsq.len() == 2));

    // The second source lifts block B above the single-causal baseline.
    let b_two = mean(records_at(&out, 11..=19).map(|r| r.neg_log10_p));
    let b_one = mean(records_at(&boundary, 11..=19).map(|r| r.neg_log10_p));
    assert!(b_two > b_one, "two causal {b_two} vs one {b_one}");
}

#[test]
fn masked_causal_uses_best_proxy() {
    let out = run(Preset::Masked);
    assert_eq!(out.result.len(), 19);
    assert!(out.result.get(10).is_none());
    assert!(out.result.records.iter().all(|r| !r.is_causal));

    let top = out.result.top_hit().expect("top hit");
    assert_ne!(top, 10);
    assert_eq!(out.result.references, vec![top]);
    assert_eq!(out.result.get(top).expect("record").rsq[&top], 1.0);
    assert_eq!(out.correlation.ids.len(), 19);
}

#[test]
fn scenarios_are_reproducible() {
    let first = run(Preset::Boundary);
    let second = run(Preset::Boundary);
    assert_eq!(first.result, second.result);
    assert_eq!(first.phenotype, second.phenotype);
    assert_eq!(first.panel, second.panel);
}

#[test]
fn strong_bridge_ranks_causal_above_its_neighbour() {
    let config = ScenarioConfig {
        seed: DEFAULT_SEED,
        panel: PanelConfig {
            bridge: Some(Bridge { fraction: 0.95 }),
            ..PanelConfig::default()
        },
        causal: CausalSet::single(11),
        phenotype_sd: 0.05,
        references: vec![Reference::TopHit],
        mask_causal: false,
        scan: ScanConfig::default(),
    };
    let out = run_scenario(&config).expect("scenario");

    let causal = out.result.get(11).expect("causal").neg_log10_p;
    let neighbour = out.result.get(10).expect("neighbour").neg_log10_p;
    let floor = neg_log10(0.0);
    assert!(neighbour > floor, "marker 10: {neighbour}");
    assert!(causal > neighbour, "causal {causal} vs neighbour {neighbour}");
    assert_eq!(out.result.top_hit(), Some(11));
    assert_eq!(out.result.references, vec![11]);
}
