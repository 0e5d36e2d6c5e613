//! I/O utilities for loading delimited input and writing delimited output.
//!
//! - **Delimiter resolution**: extension-based auto-detection (`.tsv` → tab,
//!   anything else → comma) with manual override support.
//! - **Encoding fallback**: the whole input is decoded with each candidate
//!   encoding in turn; the first one that decodes cleanly wins.
//! - **Writers**: `open_csv_writer` builds the writer used for every
//!   delimited artifact.

use std::{
    fs,
    io::{Read, Write},
    path::Path,
};

use csv::QuoteStyle;
use encoding_rs::Encoding;
use log::{debug, info, warn};

use crate::{error::LoadError, frame::Frame};

pub const DEFAULT_CSV_DELIMITER: u8 = b',';
pub const DEFAULT_TSV_DELIMITER: u8 = b'\t';

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Resolves an encoding label. Accepts the WHATWG labels understood by
/// `encoding_rs` plus the common `latin-1`/`latin_1` spellings.
pub fn resolve_encoding(label: &str) -> Option<&'static Encoding> {
    let trimmed = label.trim();
    let normalized = match trimmed.to_ascii_lowercase().as_str() {
        "latin-1" | "latin_1" => "latin1".to_string(),
        "utf_8" => "utf-8".to_string(),
        other => other.to_string(),
    };
    Encoding::for_label(normalized.as_bytes())
}

pub fn resolve_input_delimiter(path: &Path, provided: Option<u8>) -> u8 {
    provided.unwrap_or_else(|| match path.extension().and_then(|ext| ext.to_str()) {
        Some(ext) if ext.eq_ignore_ascii_case("tsv") => DEFAULT_TSV_DELIMITER,
        _ => DEFAULT_CSV_DELIMITER,
    })
}

pub fn printable_delimiter(delimiter: u8) -> String {
    match delimiter {
        b',' => ",".to_string(),
        b'\t' => "\\t".to_string(),
        other => (other as char).to_string(),
    }
}

/// Decodes `bytes` strictly: any malformed sequence rejects the encoding.
pub fn decode_strict(bytes: &[u8], encoding: &'static Encoding) -> Option<String> {
    encoding
        .decode_without_bom_handling_and_without_replacement(bytes)
        .map(|text| text.into_owned())
}

pub fn open_csv_reader<R>(reader: R, delimiter: u8) -> csv::Reader<R>
where
    R: Read,
{
    let mut builder = csv::ReaderBuilder::new();
    builder
        .has_headers(true)
        .delimiter(delimiter)
        .double_quote(true)
        .flexible(true);
    builder.from_reader(reader)
}

/// Loads a delimited file into a [`Frame`], returning the encoding that
/// decoded it.
pub fn load_frame(
    path: &Path,
    delimiter: u8,
    encodings: &[&'static Encoding],
) -> Result<(Frame, &'static Encoding), LoadError> {
    if !path.exists() {
        return Err(LoadError::NotFound {
            path: path.to_path_buf(),
        });
    }
    let bytes = fs::read(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let body = bytes.strip_prefix(UTF8_BOM).unwrap_or(&bytes);

    let Some((text, encoding)) = encodings
        .iter()
        .find_map(|&encoding| decode_strict(body, encoding).map(|text| (text, encoding)))
    else {
        return Err(LoadError::Encoding {
            path: path.to_path_buf(),
            tried: encodings
                .iter()
                .map(|encoding| encoding.name())
                .collect::<Vec<_>>()
                .join(", "),
        });
    };
    info!("Loaded {path:?} using {} encoding", encoding.name());

    let csv_error = |source: csv::Error| LoadError::Csv {
        path: path.to_path_buf(),
        source,
    };
    let mut reader = open_csv_reader(text.as_bytes(), delimiter);
    let headers = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(str::to_string)
        .collect::<Vec<_>>();

    let mut rows = Vec::new();
    let mut truncated = 0usize;
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        let mut row = record.iter().map(str::to_string).collect::<Vec<_>>();
        if row.len() > headers.len() {
            truncated += 1;
            row.truncate(headers.len());
        }
        row.resize(headers.len(), String::new());
        rows.push(row);
    }
    if truncated > 0 {
        warn!("Dropped extra trailing fields from {truncated} row(s) in {path:?}");
    }

    let frame = Frame::from_records(headers, &rows);
    debug!(
        "Parsed {} row(s) x {} column(s) from {path:?}",
        frame.height(),
        frame.width()
    );
    Ok((frame, encoding))
}

pub fn open_csv_writer<W>(writer: W, delimiter: u8) -> csv::Writer<W>
where
    W: Write,
{
    let mut builder = csv::WriterBuilder::new();
    builder
        .delimiter(delimiter)
        .quote_style(QuoteStyle::Necessary)
        .double_quote(true);
    builder.from_writer(writer)
}
