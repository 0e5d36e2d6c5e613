//! In-memory column store shared by every pipeline stage.
//!
//! A [`Frame`] is an ordered list of named, typed columns that all have the
//! same number of cells. Missing cells are `None` in every column kind.
//! Stages take `&Frame` and hand back a new frame, so a caller's table is
//! never changed behind its back.

use std::collections::HashSet;

use anyhow::{Result, ensure};
use chrono::NaiveDate;
use serde::Serialize;

use crate::data::{Value, is_na_token, parse_number};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ColumnKind {
    Text,
    Number,
    Date,
}

impl ColumnKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            ColumnKind::Text => "text",
            ColumnKind::Number => "number",
            ColumnKind::Date => "date",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "values", rename_all = "snake_case")]
pub enum ColumnData {
    Text(Vec<Option<String>>),
    Number(Vec<Option<f64>>),
    Date(Vec<Option<NaiveDate>>),
}

impl ColumnData {
    pub fn len(&self) -> usize {
        match self {
            ColumnData::Text(values) => values.len(),
            ColumnData::Number(values) => values.len(),
            ColumnData::Date(values) => values.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn kind(&self) -> ColumnKind {
        match self {
            ColumnData::Text(_) => ColumnKind::Text,
            ColumnData::Number(_) => ColumnKind::Number,
            ColumnData::Date(_) => ColumnKind::Date,
        }
    }

    pub fn is_missing(&self, row: usize) -> bool {
        match self {
            ColumnData::Text(values) => values.get(row).is_none_or(Option::is_none),
            ColumnData::Number(values) => values.get(row).is_none_or(Option::is_none),
            ColumnData::Date(values) => values.get(row).is_none_or(Option::is_none),
        }
    }

    pub fn missing_count(&self) -> usize {
        (0..self.len()).filter(|row| self.is_missing(*row)).count()
    }

    pub fn get(&self, row: usize) -> Option<Value> {
        match self {
            ColumnData::Text(values) => values
                .get(row)
                .cloned()
                .flatten()
                .map(Value::String),
            ColumnData::Number(values) => values.get(row).copied().flatten().map(Value::Number),
            ColumnData::Date(values) => values.get(row).copied().flatten().map(Value::Date),
        }
    }

    pub fn as_numbers(&self) -> Option<&[Option<f64>]> {
        match self {
            ColumnData::Number(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_text(&self) -> Option<&[Option<String>]> {
        match self {
            ColumnData::Text(values) => Some(values),
            _ => None,
        }
    }

    pub fn as_dates(&self) -> Option<&[Option<NaiveDate>]> {
        match self {
            ColumnData::Date(values) => Some(values),
            _ => None,
        }
    }

    fn select(&self, rows: &[usize]) -> ColumnData {
        match self {
            ColumnData::Text(values) => {
                ColumnData::Text(rows.iter().map(|idx| values[*idx].clone()).collect())
            }
            ColumnData::Number(values) => {
                ColumnData::Number(rows.iter().map(|idx| values[*idx]).collect())
            }
            ColumnData::Date(values) => {
                ColumnData::Date(rows.iter().map(|idx| values[*idx]).collect())
            }
        }
    }

    fn key(&self, row: usize) -> CellKey<'_> {
        match self {
            ColumnData::Text(values) => values[row]
                .as_deref()
                .map_or(CellKey::Missing, CellKey::Text),
            ColumnData::Number(values) => values[row].map_or(CellKey::Missing, |n| {
                // -0.0 and 0.0 compare equal, so they must hash equal too.
                let n = if n == 0.0 { 0.0 } else { n };
                CellKey::Number(n.to_bits())
            }),
            ColumnData::Date(values) => values[row].map_or(CellKey::Missing, CellKey::Date),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
enum CellKey<'a> {
    Missing,
    Text(&'a str),
    Number(u64),
    Date(NaiveDate),
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    pub data: ColumnData,
}

impl Column {
    pub fn new(name: impl Into<String>, data: ColumnData) -> Self {
        Self {
            name: name.into(),
            data,
        }
    }

    pub fn is_numeric(&self) -> bool {
        self.data.kind() == ColumnKind::Number
    }

    pub fn is_text(&self) -> bool {
        self.data.kind() == ColumnKind::Text
    }

    pub fn lowered_name(&self) -> String {
        self.name.to_lowercase()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Frame {
    columns: Vec<Column>,
    height: usize,
}

impl Frame {
    pub fn new(columns: Vec<Column>) -> Result<Self> {
        let height = columns.first().map_or(0, |column| column.data.len());
        for column in &columns {
            ensure!(
                column.data.len() == height,
                "Column '{}' has {} cell(s) but the table has {} row(s)",
                column.name,
                column.data.len(),
                height
            );
        }
        Ok(Self { columns, height })
    }

    /// Builds a frame from decoded text records, inferring a kind per column.
    ///
    /// Cells equal to a standard NA token become missing. A column whose
    /// every present cell is a finite number becomes numeric; anything else
    /// stays text. Short rows are padded with missing cells.
    pub fn from_records(headers: Vec<String>, rows: &[Vec<String>]) -> Self {
        let height = rows.len();
        let columns = headers
            .into_iter()
            .enumerate()
            .map(|(idx, name)| {
                let raw = rows
                    .iter()
                    .map(|row| {
                        row.get(idx)
                            .map(String::as_str)
                            .filter(|value| !is_na_token(value))
                    })
                    .collect::<Vec<_>>();
                Column::new(name, infer_column(&raw))
            })
            .collect();
        Self { columns, height }
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn width(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.height == 0
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// First column whose lowercased name contains any of `keywords`.
    pub fn find_column(&self, keywords: &[&str]) -> Option<&Column> {
        self.columns.iter().find(|column| {
            let lowered = column.lowered_name();
            keywords.iter().any(|keyword| lowered.contains(keyword))
        })
    }

    pub fn numeric_columns(&self) -> impl Iterator<Item = &Column> {
        self.columns.iter().filter(|c| c.is_numeric())
    }

    pub fn column_at_mut(&mut self, index: usize) -> Option<&mut Column> {
        self.columns.get_mut(index)
    }

    pub fn rename_column(&mut self, index: usize, name: impl Into<String>) {
        if let Some(column) = self.columns.get_mut(index) {
            column.name = name.into();
        }
    }

    /// Replaces the first column called `name`, or appends a new one.
    pub fn set_column(&mut self, name: &str, data: ColumnData) -> Result<()> {
        ensure!(
            self.columns.is_empty() || data.len() == self.height,
            "Column '{name}' has {} cell(s) but the table has {} row(s)",
            data.len(),
            self.height
        );
        if self.columns.is_empty() {
            self.height = data.len();
        }
        match self.columns.iter_mut().find(|c| c.name == name) {
            Some(existing) => existing.data = data,
            None => self.columns.push(Column::new(name, data)),
        }
        Ok(())
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<Value> {
        self.columns.get(column).and_then(|c| c.data.get(row))
    }

    pub fn missing_cells(&self) -> usize {
        self.columns.iter().map(|c| c.data.missing_count()).sum()
    }

    pub fn select_rows(&self, rows: &[usize]) -> Frame {
        Frame {
            columns: self
                .columns
                .iter()
                .map(|column| Column::new(column.name.clone(), column.data.select(rows)))
                .collect(),
            height: rows.len(),
        }
    }

    /// Drops rows whose every cell equals an earlier row. Returns the
    /// deduplicated frame and the number of rows removed.
    pub fn drop_duplicate_rows(&self) -> (Frame, usize) {
        let mut seen = HashSet::with_capacity(self.height);
        let kept = (0..self.height)
            .filter(|row| {
                let key = self
                    .columns
                    .iter()
                    .map(|column| column.data.key(*row))
                    .collect::<Vec<_>>();
                seen.insert(key)
            })
            .collect::<Vec<_>>();
        let removed = self.height - kept.len();
        (self.select_rows(&kept), removed)
    }

    /// Cells of one row rendered for delimited output; missing cells are empty.
    pub fn display_row(&self, row: usize) -> Vec<String> {
        self.columns
            .iter()
            .map(|column| {
                column
                    .data
                    .get(row)
                    .map(|value| value.as_display())
                    .unwrap_or_default()
            })
            .collect()
    }
}

fn infer_column(raw: &[Option<&str>]) -> ColumnData {
    let numbers = raw
        .iter()
        .map(|cell| match cell {
            None => Some(None),
            Some(value) => parse_number(value).map(Some),
        })
        .collect::<Option<Vec<_>>>();
    match numbers {
        Some(values) => ColumnData::Number(values),
        None => ColumnData::Text(raw.iter().map(|cell| cell.map(str::to_string)).collect()),
    }
}
