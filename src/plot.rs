use std::path::Path;

use anyhow::{Result, bail};
use plotly::common::color::NamedColor;
use plotly::common::{DashType, Line, Marker, MarkerSymbol, Mode};
use plotly::layout::Axis;
use plotly::{HeatMap, Layout, Plot, Scatter};
use tracing::info;

use crate::correlation::CorrelationMatrix;
use crate::pic::{PicLine, pic_points};
use crate::types::{Block, ScanResult};

fn block_color(block: Block) -> NamedColor {
    match block {
        Block::A => NamedColor::SteelBlue,
        Block::B => NamedColor::DarkOrange,
    }
}

/// Scatter of r² with `reference` against -log10 p, one trace per block,
/// causal markers drawn on top and each block's PIC line overlaid.
pub fn write_pic_plot(
    result: &ScanResult,
    reference: usize,
    lines: &[PicLine],
    path: &Path,
    title: &str,
) -> Result<()> {
    if !result.references.contains(&reference) {
        bail!("reference {reference} was not part of the scan");
    }
    let mut plot = Plot::new();
    let all = pic_points(result, reference);

    for block in [Block::A, Block::B] {
        let points: Vec<(f64, f64, String)> = all
            .iter()
            .filter(|p| p.block == block && !p.is_causal)
            .map(|p| (p.rsq, p.neg_log10_p, format!("marker {}", p.marker)))
            .collect();
        if points.is_empty() {
            continue;
        }
        let (x, rest): (Vec<f64>, Vec<(f64, String)>) =
            points.into_iter().map(|(x, y, t)| (x, (y, t))).unzip();
        let (y, text): (Vec<f64>, Vec<String>) = rest.into_iter().unzip();
        let trace = Scatter::new(x, y)
            .mode(Mode::Markers)
            .name(format!("Block {block}"))
            .text_array(text)
            .marker(Marker::new().size(9).color(block_color(block)));
        plot.add_trace(trace);
    }

    let causal: Vec<(f64, f64, String)> = all
        .iter()
        .filter(|p| p.is_causal)
        .map(|p| (p.rsq, p.neg_log10_p, format!("causal marker {}", p.marker)))
        .collect();
    if !causal.is_empty() {
        let x = causal.iter().map(|c| c.0).collect::<Vec<_>>();
        let y = causal.iter().map(|c| c.1).collect::<Vec<_>>();
        let text = causal.into_iter().map(|c| c.2).collect::<Vec<_>>();
        let trace = Scatter::new(x, y)
            .mode(Mode::Markers)
            .name("Causal")
            .text_array(text)
            .marker(
                Marker::new()
                    .size(13)
                    .symbol(MarkerSymbol::Diamond)
                    .color(NamedColor::Red),
            );
        plot.add_trace(trace);
    }

    for line in lines {
        let trace = Scatter::new(vec![0.0, 1.0], vec![line.predict(0.0), line.predict(1.0)])
            .mode(Mode::Lines)
            .name(format!("Block {} (slope {:.2})", line.block, line.slope))
            .line(
                Line::new()
                    .color(block_color(line.block))
                    .dash(DashType::Dash),
            );
        plot.add_trace(trace);
    }

    let layout = Layout::new()
        .title(title)
        .x_axis(Axis::new().title(format!("r² with marker {reference}")).range(vec![0.0, 1.0]))
        .y_axis(Axis::new().title("-log10(p)"));
    plot.set_layout(layout);
    plot.write_html(path);
    info!("Wrote {}", path.display());
    Ok(())
}

pub fn write_correlation_heatmap(matrix: &CorrelationMatrix, path: &Path, title: &str) -> Result<()> {
    let labels = matrix
        .ids
        .iter()
        .map(|id| id.to_string())
        .collect::<Vec<_>>();
    let z = matrix
        .values
        .rows()
        .into_iter()
        .map(|row| row.to_vec())
        .collect::<Vec<_>>();
    let heatmap = HeatMap::new(labels.clone(), labels, z).name("Pearson r");
    let mut plot = Plot::new();
    plot.add_trace(heatmap);
    plot.set_layout(
        Layout::new()
            .title(title)
            .x_axis(Axis::new().title("marker"))
            .y_axis(Axis::new().title("marker")),
    );
    plot.write_html(path);
    info!("Wrote {}", path.display());
    Ok(())
}
