use std::fs;
use std::io::Read;

use flate2::read::GzDecoder;
use rand::SeedableRng;
use rand::rngs::StdRng;

use picsim::io::{correlation_table, pic_line_table, scan_result_table, write_dataframe};
use picsim::panel::{Panel, PanelConfig, generate_panel};
use picsim::phenotype::{CausalSet, simulate_phenotype};
use picsim::pic::{fit_pic_lines, pic_points};
use picsim::plot::{write_correlation_heatmap, write_pic_plot};
use picsim::plot_utils::{ensure_plots_dir, plot_path};
use picsim::scan::{ScanConfig, scan};
use picsim::scenario::{DEFAULT_SEED, Preset, ScenarioOutput, run_scenario};
use picsim::types::Reference;

fn two_causal() -> ScenarioOutput {
    let config = Preset::TwoCausal.config(DEFAULT_SEED).expect("config");
    run_scenario(&config).expect("scenario")
}

#[test]
fn scan_table_has_one_row_per_marker_and_rsq_per_reference() {
    let out = two_causal();
    let df = scan_result_table(&out.result).expect("table");
    assert_eq!(df.height(), 20);
    let names: Vec<String> = df
        .get_column_names()
        .iter()
        .map(|n| n.to_string())
        .collect();
    assert_eq!(
        names,
        vec![
            "marker",
            "block",
            "causal",
            "beta",
            "se",
            "neg_log10_p",
            "rsq_10",
            "rsq_20"
        ]
    );
}

#[test]
fn tables_are_written_plain_and_gzipped() {
    let out = two_causal();
    let dir = tempfile::tempdir().expect("tempdir");
    let df = scan_result_table(&out.result).expect("table");

    let plain = write_dataframe(&df, &dir.path().join("scan.tsv"), false).expect("write");
    let text = fs::read_to_string(&plain).expect("read");
    let mut lines = text.lines();
    assert!(lines.next().expect("header").starts_with("marker\tblock\tcausal"));
    assert_eq!(lines.count(), 20);

    let gz = write_dataframe(&df, &dir.path().join("nested/scan.tsv"), true).expect("write gz");
    assert!(gz.to_string_lossy().ends_with("scan.tsv.gz"));
    let mut decoded = String::new();
    GzDecoder::new(fs::File::open(&gz).expect("open gz"))
        .read_to_string(&mut decoded)
        .expect("decode");
    assert_eq!(decoded, text);
}

#[test]
fn correlation_and_line_tables_have_expected_shape() {
    let out = two_causal();
    let corr = correlation_table(&out.correlation).expect("corr table");
    assert_eq!(corr.height(), 400);
    let melted = out.correlation.melt();
    assert_eq!(melted[0].row, 1);
    assert_eq!(melted[0].col, 1);
    assert_eq!(melted[0].r, 1.0);

    let lines = pic_line_table(&out.lines).expect("line table");
    assert_eq!(lines.height(), out.lines.len());
}

#[test]
fn plots_are_written_as_html() {
    let out = two_causal();
    let dir = tempfile::tempdir().expect("tempdir");
    let plots = ensure_plots_dir(&dir.path().join("Plots")).expect("plots dir");

    let pic = plot_path(&plots, Some("two_causal"), "pic_ref10");
    assert!(pic.ends_with("two_causal_pic_ref10.html"));
    write_pic_plot(&out.result, 10, &out.lines, &pic, "PIC").expect("pic plot");
    assert!(fs::metadata(&pic).expect("pic file").len() > 0);

    let heat = plot_path(&plots, None, "correlation");
    write_correlation_heatmap(&out.correlation, &heat, "Correlation").expect("heatmap");
    assert!(fs::metadata(&heat).expect("heatmap file").len() > 0);

    assert!(write_pic_plot(&out.result, 3, &out.lines, &pic, "PIC").is_err());
}

#[test]
fn constant_causal_marker_is_left_off_the_pic_plot() {
    let config = PanelConfig {
        n_individuals: 300,
        markers_per_block: 5,
        ..PanelConfig::default()
    };
    let panel = generate_panel(&config, &mut StdRng::seed_from_u64(7)).expect("panel");
    let mut genotypes = panel.genotypes().clone();
    genotypes.column_mut(2).fill(2.5);
    let panel = Panel::from_matrix(genotypes, 5).expect("panel");
    let causal = CausalSet::single(3);
    let phenotype =
        simulate_phenotype(&panel, &causal, 1.0, &mut StdRng::seed_from_u64(8)).expect("phenotype");
    let result = scan(
        &panel,
        &phenotype,
        &causal,
        &[Reference::Marker(5)],
        &ScanConfig::default(),
    )
    .expect("scan");
    assert_eq!(result.degenerate, vec![3]);

    let points = pic_points(&result, 5);
    assert_eq!(points.len(), 9);
    assert!(points.iter().all(|p| p.marker != 3 && !p.is_causal));
    assert!(
        points
            .iter()
            .all(|p| p.rsq.is_finite() && p.neg_log10_p.is_finite())
    );

    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("pic.html");
    let lines = fit_pic_lines(&result, 5);
    write_pic_plot(&result, 5, &lines, &path, "PIC").expect("pic plot");
    let html = fs::read_to_string(&path).expect("html");
    assert!(!html.contains("causal marker 3"));
}
