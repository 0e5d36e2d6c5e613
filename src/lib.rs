pub mod aggregate;
pub mod clean;
pub mod cli;
pub mod columns;
pub mod config;
pub mod data;
pub mod domain;
pub mod error;
pub mod frame;
pub mod frequency;
pub mod insights;
pub mod io_utils;
pub mod normalize;
pub mod pipeline;
pub mod report;
pub mod stats;
pub mod table;

use std::{env, path::PathBuf, sync::OnceLock};

use anyhow::{Context, Result};
use chrono::Local;
use clap::Parser;
use log::{LevelFilter, debug, info};

use crate::{
    cli::{Cli, Commands},
    config::ReportConfig,
    data::format_grouped,
    frame::Frame,
    pipeline::ReportBundle,
};

static LOGGER: OnceLock<()> = OnceLock::new();

fn init_logging(verbose: bool) {
    LOGGER.get_or_init(|| {
        let mut builder = env_logger::Builder::from_env(env_logger::Env::default());
        if verbose {
            builder.filter_module("csv_report", LevelFilter::Debug);
        } else if env::var("RUST_LOG").is_err() {
            builder.filter_module("csv_report", LevelFilter::Info);
        }
        let _ = builder.format_timestamp_millis().try_init();
    });
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);
    match cli.command {
        Commands::Report(args) => handle_report(&args),
        Commands::Summary(args) => handle_summary(&args),
        Commands::Domain(args) => handle_domain(&args),
    }
}

fn load_input(args: &cli::InputArgs) -> Result<(Frame, ReportConfig)> {
    let mut config = match &args.config {
        Some(path) => ReportConfig::load(path)
            .with_context(|| format!("Loading configuration from {path:?}"))?,
        None => ReportConfig::default(),
    };
    if let Some(label) = &args.input_encoding {
        config.encodings = vec![label.clone()];
    }
    let encodings = config.resolve_encodings()?;
    let delimiter = io_utils::resolve_input_delimiter(&args.input, args.delimiter);
    info!(
        "Loading '{}' with delimiter '{}'",
        args.input.display(),
        io_utils::printable_delimiter(delimiter)
    );
    let (frame, _) = io_utils::load_frame(&args.input, delimiter, &encodings)
        .with_context(|| format!("Loading input {:?}", args.input))?;
    info!(
        "Loaded {} row(s) x {} column(s)",
        frame.height(),
        frame.width()
    );
    Ok((frame, config))
}

fn run_pipeline(args: &cli::InputArgs) -> Result<(ReportBundle, ReportConfig)> {
    let (frame, config) = load_input(args)?;
    let bundle = pipeline::process(&frame, &config)
        .with_context(|| format!("Processing {:?}", args.input))?;
    Ok((bundle, config))
}

fn handle_report(args: &cli::ReportArgs) -> Result<()> {
    let (bundle, config) = run_pipeline(&args.input)?;
    let output = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(config.timestamped_name(Local::now().naive_local())));
    let written = report::write_report(&bundle, &output, args.format)
        .with_context(|| format!("Writing report to {output:?}"))?;
    for path in written {
        println!("{}", path.display());
    }
    Ok(())
}

fn handle_summary(args: &cli::SummaryArgs) -> Result<()> {
    let (bundle, _) = run_pipeline(&args.input)?;
    let summary = &bundle.aggregations.summary;

    let mut metrics = vec![
        ("Total Records".to_string(), format_grouped(summary.total_records as f64, 0)),
        (
            "Date Range".to_string(),
            summary.date_range.clone().unwrap_or_else(|| "n/a".to_string()),
        ),
    ];
    if let Some(value) = &bundle.aggregations.value_column {
        metrics.push(("Value Column".to_string(), value.name.clone()));
    }
    let money = |label: &str, value: Option<f64>| {
        value.map(|v| (label.to_string(), format!("${}", format_grouped(v, 2))))
    };
    let counts = |label: &str, value: Option<usize>| {
        value.map(|v| (label.to_string(), format_grouped(v as f64, 0)))
    };
    metrics.extend(money("Total Sales", summary.total_sales));
    metrics.extend(money("Average Sale", summary.average_sale));
    metrics.extend(counts("Valid Transactions", summary.valid_transactions));
    metrics.extend(counts("Excluded Invalid", summary.excluded_invalid));
    table::print_section(
        report::EXECUTIVE_SUMMARY_SHEET,
        &headers(&["Metric", "Value"]),
        &metrics.into_iter().map(|(k, v)| vec![k, v]).collect::<Vec<_>>(),
    );

    let views = [
        (report::MONTHLY_SHEET, &bundle.aggregations.monthly),
        (report::PRODUCT_SHEET, &bundle.aggregations.product),
        (report::REGIONAL_SHEET, &bundle.aggregations.regional),
    ];
    for (title, view) in views {
        if let Some(view) = view {
            table::print_section(title, &headers(&view.headers), &view.display_rows());
        }
    }

    table::print_section(
        "Domain",
        &headers(&["Domain", "Confidence"]),
        &[vec![
            bundle.domain.domain.title(),
            format!("{:.1}%", bundle.domain.confidence),
        ]],
    );

    let insight_rows = bundle
        .insights
        .iter()
        .enumerate()
        .map(|(idx, insight)| vec![(idx + 1).to_string(), insight.clone()])
        .collect::<Vec<_>>();
    table::print_section("Insights", &headers(&["#", "Insight"]), &insight_rows);

    if args.correlations {
        let rows = insights::analyze_correlations(&bundle.data)
            .into_iter()
            .map(|finding| {
                vec![
                    finding.column1,
                    finding.column2,
                    format!("{:.3}", finding.correlation),
                ]
            })
            .collect::<Vec<_>>();
        debug!("Found {} strong correlation(s)", rows.len());
        table::print_section(
            "Correlations",
            &headers(&["Column 1", "Column 2", "Correlation"]),
            &rows,
        );
    }

    if args.outliers {
        let rows = insights::detect_outliers(&bundle.data)
            .into_iter()
            .map(|report| {
                vec![
                    report.column,
                    report.count.to_string(),
                    format!("{:.1}%", report.percentage),
                    format!("{:.2}", report.lower_bound),
                    format!("{:.2}", report.upper_bound),
                ]
            })
            .collect::<Vec<_>>();
        table::print_section(
            "Outliers",
            &headers(&["Column", "Outliers", "Percent", "Lower", "Upper"]),
            &rows,
        );
    }
    Ok(())
}

fn handle_domain(args: &cli::DomainArgs) -> Result<()> {
    let (frame, _) = load_input(&args.input)?;
    let info = domain::detect_domain(&frame.column_names());
    let rows = info
        .scores
        .iter()
        .map(|score| {
            vec![
                score.domain.title(),
                score.matched.to_string(),
                score.keywords.to_string(),
            ]
        })
        .collect::<Vec<_>>();
    table::print_section(
        "Domain Scores",
        &headers(&["Domain", "Matched", "Keywords"]),
        &rows,
    );
    println!(
        "Detected domain: {} (confidence {:.1}%)",
        info.domain.title(),
        info.confidence
    );
    Ok(())
}

fn headers(names: &[&str]) -> Vec<String> {
    names.iter().map(|name| name.to_string()).collect()
}
