//! Parsed observation tables.
//!
//! The KNMI services answer with a block of `#` commentary, a final comment
//! line carrying the column names, and then plain comma separated rows:
//!
//! ```text
//! # BRON: KONINKLIJK NEDERLANDS METEOROLOGISCH INSTITUUT (KNMI)
//! # STN,YYYYMMDD,   TG,   TN
//! #
//!   240,20190101,   85,   52
//! ```
//!
//! [`parse_table`] turns such a body into a [`Table`] whose rows are keyed by
//! the second column (the date or date/hour field).

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{Duration, NaiveDate, NaiveDateTime};
use csv::{ReaderBuilder, StringRecord, Trim};
use serde::ser::{SerializeMap, SerializeSeq};
use serde::{Serialize, Serializer};

use crate::constants::{COMMENT_MARKER, DELIMITER, INDEX_COLUMN};
use crate::error::{FetchError, Result};

/// Column KNMI uses for the hour of day in hourly datasets.
const HOUR_COLUMN: &str = "HH";

/// One data line of a [`Table`].
#[derive(Debug, Clone, PartialEq)]
pub struct Row {
    columns: Arc<[String]>,
    values: Vec<String>,
}

impl Row {
    /// Raw value of the index column, exactly as the service sent it.
    pub fn index(&self) -> &str {
        &self.values[INDEX_COLUMN]
    }

    /// Field value by column name. Missing observations are empty strings.
    pub fn get(&self, column: &str) -> Option<&str> {
        let pos = self.columns.iter().position(|c| c == column)?;
        Some(self.values[pos].as_str())
    }

    /// Like [`Row::get`], but treats an empty field as absent.
    pub fn value(&self, column: &str) -> Option<&str> {
        self.get(column).filter(|v| !v.is_empty())
    }

    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Interprets the index as a timestamp.
    ///
    /// Hourly datasets carry the hour in a separate `HH` column; when present
    /// it is folded into the result.
    pub fn timestamp(&self) -> Option<NaiveDateTime> {
        match self.value(HOUR_COLUMN) {
            Some(hour) if self.index().len() == 8 => {
                parse_timestamp(&format!("{}{:0>2}", self.index(), hour))
            }
            _ => parse_timestamp(self.index()),
        }
    }
}

impl Serialize for Row {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.values.len()))?;
        for (column, value) in self.columns.iter().zip(&self.values) {
            map.serialize_entry(column, value)?;
        }
        map.end()
    }
}

/// An immutable table of observations, in the order the service sent them.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    columns: Arc<[String]>,
    rows: Vec<Row>,
    index: HashMap<String, Vec<usize>>,
}

impl Table {
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Name of the column rows are keyed by.
    pub fn index_column(&self) -> &str {
        &self.columns[INDEX_COLUMN]
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter()
    }

    /// All rows whose index equals `key`.
    ///
    /// Hourly data and multi-station queries repeat the same date, so a key
    /// can match many rows. They are yielded in original order.
    pub fn get<'a>(&'a self, key: &str) -> impl Iterator<Item = &'a Row> + 'a {
        self.index
            .get(key)
            .into_iter()
            .flatten()
            .map(move |&i| &self.rows[i])
    }

    pub fn first(&self, key: &str) -> Option<&Row> {
        self.get(key).next()
    }

    /// Values of a single column, top to bottom.
    pub fn column<'a>(&'a self, name: &str) -> Option<impl Iterator<Item = &'a str> + 'a> {
        let pos = self.columns.iter().position(|c| c == name)?;
        Some(self.rows.iter().map(move |row| row.values[pos].as_str()))
    }
}

impl Serialize for Table {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.rows.len()))?;
        for row in &self.rows {
            seq.serialize_element(row)?;
        }
        seq.end()
    }
}

/// Column names from the last non-blank comment line of `body`.
fn parse_header(body: &str) -> Result<Vec<String>> {
    let line = body
        .lines()
        .filter_map(|line| line.strip_prefix(COMMENT_MARKER))
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .last()
        .ok_or_else(|| FetchError::Parse("no column header comment line found".to_string()))?;

    let header: Vec<String> = line
        .split(DELIMITER)
        .map(|name| name.trim().to_string())
        .collect();

    if header.len() <= INDEX_COLUMN {
        return Err(FetchError::Parse(format!(
            "header line {line:?} has no index column"
        )));
    }
    Ok(header)
}

/// A whitespace-only line; csv already drops truly empty ones.
fn is_blank(record: &StringRecord) -> bool {
    record.len() == 1 && record[0].is_empty()
}

/// Parses a comment-annotated CSV body into a [`Table`].
pub fn parse_table(body: &str) -> Result<Table> {
    let header = parse_header(body)?;
    let columns: Arc<[String]> = header.into();

    let mut reader = ReaderBuilder::new()
        .has_headers(false)
        .comment(Some(COMMENT_MARKER as u8))
        .delimiter(DELIMITER as u8)
        .trim(Trim::All)
        .flexible(true)
        .from_reader(body.as_bytes());

    let mut rows = Vec::new();
    let mut index: HashMap<String, Vec<usize>> = HashMap::new();

    for record in reader.records() {
        let record = record?;
        if is_blank(&record) {
            continue;
        }
        if record.len() != columns.len() {
            return Err(FetchError::SchemaMismatch {
                line: record.position().map(|p| p.line()).unwrap_or_default(),
                expected: columns.len(),
                found: record.len(),
            });
        }

        let values: Vec<String> = record.iter().map(str::to_string).collect();
        index
            .entry(values[INDEX_COLUMN].clone())
            .or_default()
            .push(rows.len());
        rows.push(Row {
            columns: Arc::clone(&columns),
            values,
        });
    }

    tracing::debug!(columns = columns.len(), rows = rows.len(), "parsed table");

    Ok(Table {
        columns,
        rows,
        index,
    })
}

/// Parses a KNMI date (`YYYYMMDD`) or date/hour (`YYYYMMDDHH`) stamp.
///
/// KNMI hours run 1 to 24, where hour 24 is midnight of the next day.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    if !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    match raw.len() {
        8 => NaiveDate::parse_from_str(raw, "%Y%m%d")
            .ok()?
            .and_hms_opt(0, 0, 0),
        10 => {
            let hour: i64 = raw[8..].parse().ok()?;
            if hour > 24 {
                return None;
            }
            NaiveDate::parse_from_str(&raw[..8], "%Y%m%d")
                .ok()?
                .and_hms_opt(0, 0, 0)?
                .checked_add_signed(Duration::hours(hour))
        }
        _ => None,
    }
}
