//! Structural failures surfaced to callers.
//!
//! Data-quality problems (unparseable dates, garbage in numeric cells, absent
//! columns) never show up here: every pipeline stage degrades those to a
//! missing or default value. Only conditions that make a run meaningless are
//! modelled as errors.

use std::{io, path::PathBuf};

use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Input file {path:?} not found")]
    NotFound { path: PathBuf },
    #[error("Error loading data from {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Unable to decode {path:?} with any supported encoding (tried {tried})")]
    Encoding { path: PathBuf, tried: String },
    #[error("Error parsing delimited data from {path:?}: {source}")]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Empty dataset provided: {rows} data row(s), at least {required} required")]
    EmptyDataset { rows: usize, required: usize },
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Reading configuration {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("Parsing configuration {path:?}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
    #[error("Unknown encoding '{0}'")]
    UnknownEncoding(String),
    #[error("Configuration must list at least one candidate encoding")]
    NoEncodings,
}
