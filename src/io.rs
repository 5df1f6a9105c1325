use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use flate2::Compression;
use flate2::write::GzEncoder;
use polars::prelude::*;

use crate::correlation::CorrelationMatrix;
use crate::pic::PicLine;
use crate::types::ScanResult;

pub fn scan_result_table(result: &ScanResult) -> Result<DataFrame> {
    let records = &result.records;
    let mut columns: Vec<Column> = vec![
        Column::new(
            "marker".into(),
            records.iter().map(|r| r.marker as u32).collect::<Vec<_>>(),
        ),
        Column::new(
            "block".into(),
            records.iter().map(|r| r.block.label()).collect::<Vec<_>>(),
        ),
        Column::new(
            "causal".into(),
            records.iter().map(|r| r.is_causal).collect::<Vec<_>>(),
        ),
        Column::new(
            "beta".into(),
            records.iter().map(|r| r.beta).collect::<Vec<_>>(),
        ),
        Column::new("se".into(), records.iter().map(|r| r.se).collect::<Vec<_>>()),
        Column::new(
            "neg_log10_p".into(),
            records.iter().map(|r| r.neg_log10_p).collect::<Vec<_>>(),
        ),
    ];
    for &reference in &result.references {
        columns.push(Column::new(
            format!("rsq_{reference}").into(),
            result.rsq_with(reference),
        ));
    }
    DataFrame::new(columns).context("build scan result table")
}

pub fn correlation_table(matrix: &CorrelationMatrix) -> Result<DataFrame> {
    let melted = matrix.melt();
    DataFrame::new(vec![
        Column::new(
            "row".into(),
            melted.iter().map(|e| e.row as u32).collect::<Vec<_>>(),
        ),
        Column::new(
            "col".into(),
            melted.iter().map(|e| e.col as u32).collect::<Vec<_>>(),
        ),
        Column::new("r".into(), melted.iter().map(|e| e.r).collect::<Vec<_>>()),
    ])
    .context("build correlation table")
}

pub fn pic_line_table(lines: &[PicLine]) -> Result<DataFrame> {
    DataFrame::new(vec![
        Column::new(
            "block".into(),
            lines.iter().map(|l| l.block.label()).collect::<Vec<_>>(),
        ),
        Column::new(
            "slope".into(),
            lines.iter().map(|l| l.slope).collect::<Vec<_>>(),
        ),
        Column::new(
            "intercept".into(),
            lines.iter().map(|l| l.intercept).collect::<Vec<_>>(),
        ),
        Column::new(
            "points".into(),
            lines.iter().map(|l| l.points as u32).collect::<Vec<_>>(),
        ),
    ])
    .context("build PIC line table")
}

/// Writes `df` tab-separated; with `gzip` the output goes to `<path>.gz`.
/// Returns the path actually written.
pub fn write_dataframe(df: &DataFrame, path: &Path, gzip_output: bool) -> Result<PathBuf> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("create {}", parent.display()))?;
        }
    }
    let mut df = df.clone();
    if gzip_output {
        let mut gz_path = path.as_os_str().to_owned();
        gz_path.push(".gz");
        let gz_path = PathBuf::from(gz_path);
        let file =
            File::create(&gz_path).with_context(|| format!("create {}", gz_path.display()))?;
        let encoder = GzEncoder::new(file, Compression::default());
        let mut writer = std::io::BufWriter::new(encoder);
        CsvWriter::new(&mut writer)
            .with_separator(b'\t')
            .finish(&mut df)?;
        writer
            .into_inner()
            .map_err(|e| anyhow::anyhow!(e.to_string()))?
            .finish()?;
        Ok(gz_path)
    } else {
        let mut file = File::create(path).with_context(|| format!("create {}", path.display()))?;
        CsvWriter::new(&mut file)
            .with_separator(b'\t')
            .finish(&mut df)?;
        file.flush()?;
        Ok(path.to_path_buf())
    }
}
