//! Run configuration loaded from an optional YAML file.

use std::{fs::File, io::BufReader, path::Path};

use chrono::NaiveDateTime;
use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};

use crate::{aggregate::DEFAULT_TOP_PRODUCTS, error::ConfigError, io_utils};

pub const DEFAULT_OUTPUT_PREFIX: &str = "Monthly_Sales_Report";
pub const DEFAULT_ENCODINGS: &[&str] = &["utf-8", "latin-1", "cp1252"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    pub top_products: usize,
    /// Candidate input encodings, tried in order.
    pub encodings: Vec<String>,
    pub output_prefix: String,
    pub min_records: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            top_products: DEFAULT_TOP_PRODUCTS,
            encodings: DEFAULT_ENCODINGS.iter().map(|label| label.to_string()).collect(),
            output_prefix: DEFAULT_OUTPUT_PREFIX.to_string(),
            min_records: 1,
        }
    }
}

impl ReportConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let file = File::open(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        serde_yaml::from_reader(BufReader::new(file)).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Resolves the encoding labels, dropping aliases of an encoding already
    /// listed (`latin-1` and `cp1252` both resolve to windows-1252).
    pub fn resolve_encodings(&self) -> Result<Vec<&'static Encoding>, ConfigError> {
        let mut resolved: Vec<&'static Encoding> = Vec::with_capacity(self.encodings.len());
        for label in &self.encodings {
            let encoding = io_utils::resolve_encoding(label)
                .ok_or_else(|| ConfigError::UnknownEncoding(label.clone()))?;
            if !resolved.contains(&encoding) {
                resolved.push(encoding);
            }
        }
        if resolved.is_empty() {
            return Err(ConfigError::NoEncodings);
        }
        Ok(resolved)
    }

    /// `<prefix>_<YYYYmmdd_HHMMSS>`, used as the default report directory.
    pub fn timestamped_name(&self, now: NaiveDateTime) -> String {
        format!("{}_{}", self.output_prefix, now.format("%Y%m%d_%H%M%S"))
    }
}
