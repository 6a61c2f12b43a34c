//! CSV text <-> rows, using the `csv` crate.

use std::fmt;
use std::str::FromStr;

use csv::{ReaderBuilder, Terminator, WriterBuilder};
use serde::{Deserialize, Serialize};

use crate::domain::Row;

/// Line terminator written after each row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LineEnding {
    Lf,
    Crlf,
    /// CRLF on Windows, LF elsewhere
    #[default]
    Native,
}

impl LineEnding {
    fn terminator(&self) -> Terminator {
        match self {
            LineEnding::Lf => Terminator::Any(b'\n'),
            LineEnding::Crlf => Terminator::CRLF,
            LineEnding::Native if cfg!(windows) => Terminator::CRLF,
            LineEnding::Native => Terminator::Any(b'\n'),
        }
    }
}

impl fmt::Display for LineEnding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LineEnding::Lf => "lf",
            LineEnding::Crlf => "crlf",
            LineEnding::Native => "native",
        };
        f.write_str(s)
    }
}

impl FromStr for LineEnding {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "lf" => Ok(LineEnding::Lf),
            "crlf" => Ok(LineEnding::Crlf),
            "native" => Ok(LineEnding::Native),
            other => Err(format!("unknown line ending '{}' (expected lf, crlf or native)", other)),
        }
    }
}

/// Splits CSV text into rows and joins rows back into text.
///
/// Rows may differ in length; no header row is assumed.
#[derive(Debug, Clone, Copy)]
pub struct CsvRows {
    delimiter: u8,
    line_ending: LineEnding,
}

impl Default for CsvRows {
    fn default() -> Self {
        Self {
            delimiter: b',',
            line_ending: LineEnding::default(),
        }
    }
}

impl CsvRows {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_delimiter(mut self, delimiter: u8) -> Self {
        self.delimiter = delimiter;
        self
    }

    pub fn with_line_ending(mut self, line_ending: LineEnding) -> Self {
        self.line_ending = line_ending;
        self
    }

    /// Parse CSV text into rows; blank lines are skipped.
    pub fn read(&self, content: &str) -> Result<Vec<Row>, csv::Error> {
        let mut reader = ReaderBuilder::new()
            .delimiter(self.delimiter)
            .has_headers(false)
            .flexible(true)
            .from_reader(content.as_bytes());

        reader
            .records()
            .map(|record| record.map(|r| r.iter().map(str::to_string).collect()))
            .collect()
    }

    /// Join rows into CSV text. Empty input yields empty text.
    pub fn write(&self, rows: &[Row]) -> Result<String, csv::Error> {
        let mut writer = WriterBuilder::new()
            .delimiter(self.delimiter)
            .terminator(self.line_ending.terminator())
            .flexible(true)
            .from_writer(Vec::new());

        for row in rows {
            writer.write_record(row)?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| csv::Error::from(e.into_error()))?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }
}
