use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::{Parser, Subcommand};
use rand::SeedableRng;
use rand::rngs::StdRng;

use picsim::correlation::correlation_matrix;
use picsim::io::{correlation_table, pic_line_table, scan_result_table, write_dataframe};
use picsim::logging::{init_tracing, log_line, open_run_log, warn_line};
use picsim::panel::{Bridge, DecayDirection, NoiseProfile, PanelConfig, generate_panel};
use picsim::phenotype::CausalSet;
use picsim::pic::PicLine;
use picsim::plot::{write_correlation_heatmap, write_pic_plot};
use picsim::plot_utils::{ensure_plots_dir, plot_path};
use picsim::scan::ScanConfig;
use picsim::scenario::{DEFAULT_SEED, Preset, ScenarioConfig, ScenarioOutput, run_scenario};
use picsim::types::{CausalVariant, Reference};

#[derive(Parser)]
#[command(name = "picsim")]
#[command(about = "Simulate block-correlated panels and reproduce PIC-plot patterns", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Args, Clone)]
struct PanelArgs {
    #[arg(long, default_value_t = 1000)]
    n: usize,
    #[arg(long, default_value_t = 10)]
    k: usize,
    #[arg(long, default_value_t = 0.8)]
    rho: f64,
    #[arg(long, default_value_t = DEFAULT_SEED)]
    seed: u64,
    #[arg(long, default_value_t = 0.0)]
    noise_base: f64,
    #[arg(long, default_value_t = 0.15)]
    noise_step: f64,
    #[arg(long)]
    noise_toward_boundary: bool,
    #[arg(long, default_value_t = 0.5)]
    bridge_fraction: f64,
    #[arg(long)]
    no_bridge: bool,
}

impl PanelArgs {
    fn config(&self) -> PanelConfig {
        PanelConfig {
            n_individuals: self.n,
            markers_per_block: self.k,
            rho: self.rho,
            noise: NoiseProfile {
                base_sd: self.noise_base,
                step_sd: self.noise_step,
                direction: if self.noise_toward_boundary {
                    DecayDirection::TowardBoundary
                } else {
                    DecayDirection::AwayFromBoundary
                },
            },
            bridge: (!self.no_bridge).then_some(Bridge {
                fraction: self.bridge_fraction,
            }),
        }
    }
}

#[derive(Subcommand)]
enum Command {
    /// Run one scenario with explicit parameters.
    Simulate {
        #[command(flatten)]
        panel: PanelArgs,
        /// Causal markers as `id:weight[,id:weight]`; defaults to the boundary marker.
        #[arg(long)]
        causal: Option<String>,
        #[arg(long, default_value_t = 1.0)]
        pheno_sd: f64,
        /// `causal`, `top`, or a marker id. Repeat for a second reference.
        #[arg(long = "reference")]
        references: Vec<String>,
        #[arg(long)]
        mask_causal: bool,
        #[arg(long)]
        parallel: bool,
        #[arg(long)]
        cores: Option<usize>,
        #[arg(long, default_value = "picsim_scan.tsv")]
        output: PathBuf,
        #[arg(long)]
        gzip: bool,
        #[arg(long)]
        plots: Option<PathBuf>,
        #[arg(long)]
        prefix: Option<String>,
        #[arg(long)]
        log_name: Option<String>,
    },
    /// Run every preset scenario.
    Scenarios {
        #[arg(long, default_value_t = DEFAULT_SEED)]
        seed: u64,
        #[arg(long, default_value = "picsim_out")]
        out_dir: PathBuf,
        #[arg(long)]
        plots: Option<PathBuf>,
        #[arg(long)]
        gzip: bool,
        #[arg(long)]
        log_name: Option<String>,
    },
    /// Write the melted correlation matrix of a generated panel.
    Correlation {
        #[command(flatten)]
        panel: PanelArgs,
        #[arg(long, default_value = "picsim_correlation.tsv")]
        output: PathBuf,
        #[arg(long)]
        gzip: bool,
        #[arg(long)]
        plots: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    init_tracing();
    let cli = Cli::parse();

    match cli.command {
        Command::Simulate {
            panel,
            causal,
            pheno_sd,
            references,
            mask_causal,
            parallel,
            cores,
            output,
            gzip,
            plots,
            prefix,
            log_name,
        } => {
            let mut log = open_run_log(log_name.as_deref())?;
            let panel_config = panel.config();
            let causal = match causal {
                Some(list) => parse_causal_list(&list)?,
                None => CausalSet::single(panel_config.boundary_marker()),
            };
            let references = if references.is_empty() {
                let default = if mask_causal { "top" } else { "causal" };
                vec![default.to_string()]
            } else {
                references
            };
            let references = parse_references(&references, &causal)?;
            let config = ScenarioConfig {
                seed: panel.seed,
                panel: panel_config,
                causal,
                phenotype_sd: pheno_sd,
                references,
                mask_causal,
                scan: ScanConfig { parallel, cores },
            };
            let out = run_scenario(&config)?;
            report(&mut log, "simulate", &out)?;
            write_outputs(
                &mut log,
                &out,
                &output,
                gzip,
                plots.as_deref(),
                prefix.as_deref(),
                "simulate",
            )?;
        }
        Command::Scenarios {
            seed,
            out_dir,
            plots,
            gzip,
            log_name,
        } => {
            let mut log = open_run_log(log_name.as_deref())?;
            for preset in Preset::ALL {
                let config = preset.config(seed)?;
                let out = run_scenario(&config)
                    .with_context(|| format!("scenario {}", preset.name()))?;
                report(&mut log, preset.name(), &out)?;
                let output = out_dir.join(format!("{}_scan.tsv", preset.name()));
                write_outputs(
                    &mut log,
                    &out,
                    &output,
                    gzip,
                    plots.as_deref(),
                    Some(preset.name()),
                    preset.name(),
                )?;
            }
        }
        Command::Correlation {
            panel,
            output,
            gzip,
            plots,
        } => {
            let mut rng = StdRng::seed_from_u64(panel.seed);
            let generated = generate_panel(&panel.config(), &mut rng)?;
            let correlation = correlation_matrix(&generated);
            let summary = correlation.block_summary(&generated);
            println!(
                "mean r: within A {:.3}, within B {:.3}, across {:.3}",
                summary.within_a, summary.within_b, summary.across
            );
            let written = write_dataframe(&correlation_table(&correlation)?, &output, gzip)?;
            println!("Wrote {}", written.display());
            if let Some(dir) = plots {
                let dir = ensure_plots_dir(&dir)?;
                write_correlation_heatmap(
                    &correlation,
                    &plot_path(&dir, None, "correlation"),
                    "Panel correlation",
                )?;
            }
        }
    }

    Ok(())
}

fn report(
    log: &mut Option<std::fs::File>,
    label: &str,
    out: &ScenarioOutput,
) -> anyhow::Result<()> {
    let result = &out.result;
    log_line(
        log,
        &format!(
            "[{label}] {} markers, {} individuals, references {:?}",
            result.len(),
            out.panel.n_individuals(),
            result.references
        ),
    )?;
    if let Some(top) = result.top_hit().and_then(|id| result.get(id)) {
        log_line(
            log,
            &format!(
                "[{label}] top hit: marker {} (block {}, -log10 p {:.2}, causal {})",
                top.marker, top.block, top.neg_log10_p, top.is_causal
            ),
        )?;
    }
    for line in &out.lines {
        log_line(
            log,
            &format!(
                "[{label}] PIC line block {}: slope {:.3}, intercept {:.3}, {} markers",
                line.block, line.slope, line.intercept, line.points
            ),
        )?;
    }
    if !result.degenerate.is_empty() {
        warn_line(
            log,
            &format!(
                "[{label}] constant markers reported as NaN: {:?}",
                result.degenerate
            ),
        )?;
    }
    Ok(())
}

fn write_outputs(
    log: &mut Option<std::fs::File>,
    out: &ScenarioOutput,
    output: &Path,
    gzip: bool,
    plots: Option<&Path>,
    prefix: Option<&str>,
    title: &str,
) -> anyhow::Result<()> {
    let written = write_dataframe(&scan_result_table(&out.result)?, output, gzip)?;
    log_line(log, &format!("Wrote {}", written.display()))?;
    if !out.lines.is_empty() {
        let lines_path = output.with_extension("lines.tsv");
        let written = write_dataframe(&pic_line_table(&out.lines)?, &lines_path, gzip)?;
        log_line(log, &format!("Wrote {}", written.display()))?;
    }

    if let Some(dir) = plots {
        let dir = ensure_plots_dir(dir)?;
        for (idx, &reference) in out.result.references.iter().enumerate() {
            // Lines are fitted against the first reference only.
            let lines: &[PicLine] = if idx == 0 { &out.lines } else { &[] };
            write_pic_plot(
                &out.result,
                reference,
                lines,
                &plot_path(&dir, prefix, &format!("pic_ref{reference}")),
                &format!("{title}: PIC plot against marker {reference}"),
            )?;
        }
        write_correlation_heatmap(
            &out.correlation,
            &plot_path(&dir, prefix, "correlation"),
            &format!("{title}: panel correlation"),
        )?;
    }
    Ok(())
}

fn split_string_list(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect()
}

fn parse_causal_list(input: &str) -> anyhow::Result<CausalSet> {
    let mut variants = Vec::new();
    for item in split_string_list(input) {
        let (id, weight) = match item.split_once(':') {
            Some((id, weight)) => (id, weight.trim().parse::<f64>()?),
            None => (item.as_str(), 1.0),
        };
        let marker = id
            .trim()
            .parse::<usize>()
            .with_context(|| format!("causal marker id {id:?}"))?;
        variants.push(CausalVariant { marker, weight });
    }
    Ok(CausalSet::new(variants)?)
}

fn parse_references(items: &[String], causal: &CausalSet) -> anyhow::Result<Vec<Reference>> {
    let mut out = Vec::new();
    for item in items {
        match item.trim() {
            "causal" => out.extend(causal.markers().into_iter().map(Reference::Marker)),
            "top" => out.push(Reference::TopHit),
            id => out.push(Reference::Marker(
                id.parse::<usize>()
                    .with_context(|| format!("reference {id:?}"))?,
            )),
        }
    }
    Ok(out)
}
