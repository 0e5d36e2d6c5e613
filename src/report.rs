//! Writes a [`ReportBundle`] to a directory of artifacts.
//!
//! Each sheet of the report becomes one file named after the snake-cased
//! sheet title: delimited files for the cleaned data and each aggregate, and
//! a YAML or JSON executive summary. Every artifact is staged in a temporary
//! file inside the output directory and persisted only once fully written.

use std::{
    fs,
    io::Write,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use heck::ToSnakeCase;
use log::{debug, info};
use serde::Serialize;
use tempfile::NamedTempFile;

use crate::{
    aggregate::{GroupedView, SummaryStats, ValueColumn},
    cli::ReportFormat,
    io_utils,
    pipeline::ReportBundle,
};

pub const EXECUTIVE_SUMMARY_SHEET: &str = "Executive Summary";
pub const RAW_DATA_SHEET: &str = "Raw Data";
pub const MONTHLY_SHEET: &str = "Monthly Analysis";
pub const PRODUCT_SHEET: &str = "Product Analysis";
pub const REGIONAL_SHEET: &str = "Regional Analysis";

#[derive(Debug, Serialize)]
struct ExecutiveSummary<'a> {
    domain: String,
    confidence: f64,
    processed_at: &'a str,
    value_column: Option<&'a ValueColumn>,
    summary: &'a SummaryStats,
    insights: &'a [String],
}

impl ReportFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ReportFormat::Yaml => "yaml",
            ReportFormat::Json => "json",
        }
    }
}

/// `"Monthly Analysis"` → `"monthly_analysis.csv"`.
pub fn sheet_file_name(title: &str, extension: &str) -> String {
    format!("{}.{extension}", title.to_snake_case())
}

/// Writes every artifact for `bundle` into `dir`, creating it if needed.
/// Returns the written paths in sheet order.
pub fn write_report(bundle: &ReportBundle, dir: &Path, format: ReportFormat) -> Result<Vec<PathBuf>> {
    fs::create_dir_all(dir).with_context(|| format!("Creating report directory {dir:?}"))?;
    let mut written = Vec::new();

    let summary = ExecutiveSummary {
        domain: bundle.domain.domain.title(),
        confidence: bundle.domain.confidence,
        processed_at: &bundle.processed_at,
        value_column: bundle.aggregations.value_column.as_ref(),
        summary: &bundle.aggregations.summary,
        insights: &bundle.insights,
    };
    let summary_name = sheet_file_name(EXECUTIVE_SUMMARY_SHEET, format.extension());
    written.push(write_artifact(dir, &summary_name, |file| {
        match format {
            ReportFormat::Yaml => serde_yaml::to_writer(file, &summary)?,
            ReportFormat::Json => serde_json::to_writer_pretty(file, &summary)?,
        }
        Ok(())
    })?);

    let headers = bundle
        .data
        .column_names()
        .into_iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    let rows = (0..bundle.data.height()).map(|row| bundle.data.display_row(row));
    written.push(write_artifact(
        dir,
        &sheet_file_name(RAW_DATA_SHEET, "csv"),
        |file| write_delimited(file, &headers, rows),
    )?);

    let views = [
        (MONTHLY_SHEET, &bundle.aggregations.monthly),
        (PRODUCT_SHEET, &bundle.aggregations.product),
        (REGIONAL_SHEET, &bundle.aggregations.regional),
    ];
    for (title, view) in views {
        let Some(view) = view else {
            debug!("No data for sheet '{title}'; skipping");
            continue;
        };
        written.push(write_view(dir, title, view)?);
    }

    info!("Wrote {} report artifact(s) to {dir:?}", written.len());
    Ok(written)
}

fn write_view(dir: &Path, title: &str, view: &GroupedView) -> Result<PathBuf> {
    let headers = view.headers.map(str::to_string);
    write_artifact(dir, &sheet_file_name(title, "csv"), |file| {
        write_delimited(file, &headers, view.display_rows().into_iter())
    })
}

fn write_delimited<W, I>(writer: W, headers: &[String], rows: I) -> Result<()>
where
    W: Write,
    I: Iterator<Item = Vec<String>>,
{
    let mut csv_writer = io_utils::open_csv_writer(writer, io_utils::DEFAULT_CSV_DELIMITER);
    csv_writer.write_record(headers)?;
    for row in rows {
        csv_writer.write_record(&row)?;
    }
    csv_writer.flush()?;
    Ok(())
}

fn write_artifact<F>(dir: &Path, file_name: &str, write: F) -> Result<PathBuf>
where
    F: FnOnce(&mut NamedTempFile) -> Result<()>,
{
    let target = dir.join(file_name);
    let mut staged = NamedTempFile::new_in(dir)
        .with_context(|| format!("Creating temporary file in {dir:?}"))?;
    write(&mut staged).with_context(|| format!("Writing report artifact {target:?}"))?;
    staged
        .persist(&target)
        .with_context(|| format!("Persisting report artifact {target:?}"))?;
    debug!("Wrote {target:?}");
    Ok(target)
}
