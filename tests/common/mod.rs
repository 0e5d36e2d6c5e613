#![allow(dead_code)]

use std::fs::File;
use std::io::Write;
use std::path::{Path, PathBuf};

use csv_report::frame::{Column, ColumnData, Frame};
use tempfile::{TempDir, tempdir};

/// Scratch directory helper that cleans up files automatically on drop.
pub struct TestWorkspace {
    temp_dir: TempDir,
}

impl TestWorkspace {
    /// Creates a fresh scratch directory for the current test case.
    pub fn new() -> Self {
        Self {
            temp_dir: tempdir().expect("temp dir"),
        }
    }

    /// Returns the root path for all files owned by this workspace.
    pub fn path(&self) -> &Path {
        self.temp_dir.path()
    }

    /// Writes `contents` into a file under the workspace and returns the path.
    pub fn write(&self, name: &str, contents: &str) -> PathBuf {
        self.write_bytes(name, contents.as_bytes())
    }

    /// Writes raw bytes, for inputs that are not valid UTF-8.
    pub fn write_bytes(&self, name: &str, contents: &[u8]) -> PathBuf {
        let path = self.temp_dir.path().join(name);
        let mut file = File::create(&path).expect("create temp file");
        file.write_all(contents).expect("write temp file contents");
        path
    }
}

/// Parses CSV text the same way the loader does, without touching disk.
pub fn frame_from_csv(text: &str) -> Frame {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());
    let headers = reader
        .headers()
        .expect("headers")
        .iter()
        .map(str::to_string)
        .collect::<Vec<_>>();
    let rows = reader
        .records()
        .map(|record| {
            record
                .expect("record")
                .iter()
                .map(str::to_string)
                .collect::<Vec<_>>()
        })
        .collect::<Vec<_>>();
    Frame::from_records(headers, &rows)
}

pub fn number_column(name: &str, values: &[Option<f64>]) -> Column {
    Column::new(name, ColumnData::Number(values.to_vec()))
}

pub fn text_column(name: &str, values: &[Option<&str>]) -> Column {
    Column::new(
        name,
        ColumnData::Text(values.iter().map(|v| v.map(str::to_string)).collect()),
    )
}

pub fn frame(columns: Vec<Column>) -> Frame {
    Frame::new(columns).expect("aligned columns")
}

/// The three-row Widget/Gadget sales table used across stage tests.
pub const WIDGET_SALES: &str = "date,product,sales\n\
2024-01-05,Widget,\"1,200\"\n\
2024-02-10,Widget,800\n\
2024-02-15,Gadget,-\n";
