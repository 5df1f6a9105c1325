use ndarray::Array2;
use rand::SeedableRng;
use rand::rngs::StdRng;

use picsim::correlation::correlation_matrix;
use picsim::error::PicError;
use picsim::panel::{Bridge, DecayDirection, NoiseProfile, Panel, PanelConfig, generate_panel};
use picsim::types::Block;

fn config(n: usize, k: usize, rho: f64) -> PanelConfig {
    PanelConfig {
        n_individuals: n,
        markers_per_block: k,
        rho,
        noise: NoiseProfile::none(),
        bridge: None,
    }
}

#[test]
fn panel_has_two_blocks_of_k_markers() {
    let mut rng = StdRng::seed_from_u64(1);
    let panel = generate_panel(&PanelConfig::default(), &mut rng).expect("panel");
    assert_eq!(panel.n_individuals(), 1000);
    assert_eq!(panel.n_markers(), 20);
    assert_eq!(panel.genotypes().dim(), (1000, 20));

    let ids: Vec<usize> = panel.markers().iter().map(|m| m.id).collect();
    assert_eq!(ids, (1..=20).collect::<Vec<_>>());
    assert_eq!(panel.marker(10).expect("marker 10").block, Block::A);
    assert_eq!(panel.marker(11).expect("marker 11").block, Block::B);
    assert_eq!(panel.marker(11).expect("marker 11").position, 0);
    assert!(panel.column(21).is_none());
    assert!(panel.column(0).is_none());
}

#[test]
fn invalid_shapes_are_rejected() {
    let mut rng = StdRng::seed_from_u64(1);
    let bad = [
        config(0, 5, 0.5),
        config(10, 0, 0.5),
        config(10, 5, 0.0),
        config(10, 5, 1.2),
        config(10, 5, f64::NAN),
        PanelConfig {
            bridge: Some(Bridge { fraction: 1.5 }),
            ..config(10, 5, 0.5)
        },
        PanelConfig {
            noise: NoiseProfile {
                base_sd: -0.1,
                ..NoiseProfile::default()
            },
            ..config(10, 5, 0.5)
        },
    ];
    for cfg in bad {
        let err = generate_panel(&cfg, &mut rng).expect_err("should fail");
        assert!(matches!(err, PicError::InvalidParameter(_)), "{err}");
    }
}

#[test]
fn within_block_correlation_approaches_rho() {
    let mut rng = StdRng::seed_from_u64(7);
    let panel = generate_panel(&config(20_000, 5, 0.6), &mut rng).expect("panel");
    let summary = correlation_matrix(&panel).block_summary(&panel);
    assert!((summary.within_a - 0.6).abs() < 0.03, "{summary:?}");
    assert!((summary.within_b - 0.6).abs() < 0.03, "{summary:?}");
    assert!(summary.across.abs() < 0.03, "{summary:?}");
}

#[test]
fn rho_one_gives_collinear_blocks() {
    let mut rng = StdRng::seed_from_u64(3);
    let panel = generate_panel(&config(500, 4, 1.0), &mut rng).expect("panel");
    let corr = correlation_matrix(&panel);
    for i in 1..=4 {
        for j in 1..=4 {
            let r = corr.get(i, j).expect("entry");
            assert!(r > 0.999, "r({i},{j}) = {r}");
        }
    }
}

#[test]
fn same_seed_same_panel() {
    let cfg = PanelConfig::default();
    let a = generate_panel(&cfg, &mut StdRng::seed_from_u64(100)).expect("panel");
    let b = generate_panel(&cfg, &mut StdRng::seed_from_u64(100)).expect("panel");
    let c = generate_panel(&cfg, &mut StdRng::seed_from_u64(101)).expect("panel");
    assert_eq!(a, b);
    assert_ne!(a, c);
}

#[test]
fn bridge_copies_first_b_marker_into_last_a_marker() {
    let cfg = PanelConfig {
        bridge: Some(Bridge { fraction: 0.5 }),
        ..config(100, 3, 0.8)
    };
    let panel = generate_panel(&cfg, &mut StdRng::seed_from_u64(5)).expect("panel");
    let last_a = panel.column(3).expect("marker 3");
    let first_b = panel.column(4).expect("marker 4");
    for row in 0..50 {
        assert_eq!(last_a[row], first_b[row]);
    }
    let differing = (50..100).filter(|&row| last_a[row] != first_b[row]).count();
    assert_eq!(differing, 50);
}

#[test]
fn noise_grows_with_distance_from_boundary() {
    let profile = NoiseProfile {
        base_sd: 0.1,
        step_sd: 0.15,
        direction: DecayDirection::AwayFromBoundary,
    };
    assert!((profile.sd_for(Block::A, 9, 10) - 0.1).abs() < 1e-12);
    assert!((profile.sd_for(Block::A, 0, 10) - 1.45).abs() < 1e-12);
    assert!((profile.sd_for(Block::B, 0, 10) - 0.1).abs() < 1e-12);
    assert!((profile.sd_for(Block::B, 9, 10) - 1.45).abs() < 1e-12);

    let flipped = NoiseProfile {
        direction: DecayDirection::TowardBoundary,
        ..profile
    };
    assert!((flipped.sd_for(Block::A, 9, 10) - 1.45).abs() < 1e-12);
    assert!((flipped.sd_for(Block::B, 9, 10) - 0.1).abs() < 1e-12);
}

#[test]
fn exclude_keeps_original_ids() {
    let panel = generate_panel(&config(30, 4, 0.5), &mut StdRng::seed_from_u64(2)).expect("panel");
    let masked = panel.exclude(&[3]).expect("exclude");
    assert_eq!(masked.n_markers(), 7);
    assert!(!masked.contains(3));
    assert_eq!(masked.column(4), panel.column(4));
    assert_eq!(masked.marker(8).expect("marker 8").block, Block::B);
    assert!(matches!(
        panel.exclude(&[9]),
        Err(PicError::InvalidParameter(_))
    ));
}

#[test]
fn from_matrix_checks_column_count() {
    let genotypes = Array2::<f64>::zeros((10, 5));
    assert!(matches!(
        Panel::from_matrix(genotypes, 2),
        Err(PicError::InvalidParameter(_))
    ));
    let genotypes = Array2::<f64>::zeros((10, 4));
    let panel = Panel::from_matrix(genotypes, 2).expect("panel");
    assert_eq!(panel.marker(3).expect("marker 3").block, Block::B);
}
