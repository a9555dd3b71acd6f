//! Data Loader Module
//! Reads the raw transaction file (CSV or workbook) and hands it to the cleaner.

use super::processor::{CleanOutcome, DataProcessor};
use calamine::{open_workbook_auto, Data, Reader};
use polars::prelude::*;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoadError {
    #[error("Source unavailable: {path}: {source}")]
    SourceUnavailable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse {path}: {reason}")]
    ParseFailure { path: PathBuf, reason: String },
    #[error("Required column missing: {0}")]
    MissingColumn(String),
}

/// Coarse failure class shown to the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    SourceUnavailable,
    ParseFailure,
}

impl LoadError {
    pub fn kind(&self) -> FailureKind {
        match self {
            LoadError::SourceUnavailable { .. } => FailureKind::SourceUnavailable,
            LoadError::ParseFailure { .. } | LoadError::MissingColumn(_) => {
                FailureKind::ParseFailure
            }
        }
    }

    /// Pipeline step that failed.
    pub fn step(&self) -> &'static str {
        match self {
            LoadError::SourceUnavailable { .. } | LoadError::ParseFailure { .. } => "read",
            LoadError::MissingColumn(_) => "schema",
        }
    }
}

/// Untyped table exactly as read: header names untouched, every cell as text.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RawTable {
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Option<String>>>,
}

impl RawTable {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<Option<String>>>) -> Self {
        Self { headers, rows }
    }

    /// Build from string literals; empty strings become nulls.
    pub fn from_strs(headers: &[&str], rows: &[&[&str]]) -> Self {
        Self {
            headers: headers.iter().map(|h| h.to_string()).collect(),
            rows: rows
                .iter()
                .map(|row| {
                    row.iter()
                        .map(|cell| (!cell.is_empty()).then(|| cell.to_string()))
                        .collect()
                })
                .collect(),
        }
    }

    /// Convert a Polars DataFrame into row-major text cells.
    pub fn from_dataframe(df: &DataFrame) -> PolarsResult<Self> {
        let headers: Vec<String> = df
            .get_column_names()
            .iter()
            .map(|s| s.to_string())
            .collect();

        let mut columns = Vec::with_capacity(df.width());
        for column in df.get_columns() {
            let text = column.cast(&DataType::String)?;
            let values: Vec<Option<String>> = text
                .as_materialized_series()
                .str()?
                .into_iter()
                .map(|v| v.map(str::to_string))
                .collect();
            columns.push(values.into_iter());
        }

        let rows = (0..df.height())
            .map(|_| columns.iter_mut().map(|c| c.next().flatten()).collect())
            .collect();

        Ok(Self { headers, rows })
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }
}

/// Source formats the loader understands, picked from the file extension.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceFormat {
    Csv,
    Workbook,
}

impl SourceFormat {
    /// `.xlsx`, `.xlsm`, `.xlsb`, `.xls` and `.ods` are workbooks; anything else is CSV.
    pub fn from_path(path: &Path) -> Self {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_ascii_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "xlsx" | "xlsm" | "xlsb" | "xls" | "ods" => SourceFormat::Workbook,
            _ => SourceFormat::Csv,
        }
    }
}

/// Handles source file loading with Polars (CSV) and calamine (workbooks).
pub struct DataLoader;

impl DataLoader {
    /// Read a CSV file or the first sheet of a workbook, every cell as text.
    pub fn read_raw(path: &Path) -> Result<RawTable, LoadError> {
        let file = File::open(path).map_err(|source| LoadError::SourceUnavailable {
            path: path.to_path_buf(),
            source,
        })?;

        match SourceFormat::from_path(path) {
            SourceFormat::Csv => Self::read_csv(path, file),
            SourceFormat::Workbook => Self::read_workbook(path),
        }
    }

    /// The separator is `;` when the header line has more semicolons than
    /// commas, `,` otherwise.
    fn read_csv(path: &Path, file: File) -> Result<RawTable, LoadError> {
        let mut header_line = String::new();
        BufReader::new(file)
            .read_line(&mut header_line)
            .map_err(|source| LoadError::SourceUnavailable {
                path: path.to_path_buf(),
                source,
            })?;
        let separator = Self::detect_separator(&header_line);

        // Schema length 0 keeps every column as String; coercion happens in the processor
        let df = LazyCsvReader::new(path)
            .with_has_header(true)
            .with_separator(separator)
            .with_infer_schema_length(Some(0))
            .finish()
            .and_then(|lazy| lazy.collect())
            .map_err(|e| LoadError::ParseFailure {
                path: path.to_path_buf(),
                reason: e.to_string(),
            })?;

        RawTable::from_dataframe(&df).map_err(|e| LoadError::ParseFailure {
            path: path.to_path_buf(),
            reason: e.to_string(),
        })
    }

    /// First sheet of a workbook; the first row holds the headers.
    fn read_workbook(path: &Path) -> Result<RawTable, LoadError> {
        let parse_failure = |reason: String| LoadError::ParseFailure {
            path: path.to_path_buf(),
            reason,
        };

        let mut workbook = open_workbook_auto(path).map_err(|e| parse_failure(e.to_string()))?;
        let sheet_name = workbook
            .sheet_names()
            .first()
            .cloned()
            .ok_or_else(|| parse_failure("workbook has no sheets".to_string()))?;
        log::debug!("Reading sheet '{}'", sheet_name);

        let range = workbook
            .worksheet_range(&sheet_name)
            .map_err(|e| parse_failure(e.to_string()))?;

        let mut rows = range.rows();
        let headers: Vec<String> = rows
            .next()
            .ok_or_else(|| parse_failure(format!("sheet '{}' is empty", sheet_name)))?
            .iter()
            .map(|cell| Self::cell_text(cell).unwrap_or_default())
            .collect();

        // Blank trailing rows inside the used range are skipped
        let rows = rows
            .map(|row| row.iter().map(Self::cell_text).collect::<Vec<_>>())
            .filter(|row| row.iter().any(Option::is_some))
            .collect();

        Ok(RawTable::new(headers, rows))
    }

    /// Text form of a workbook cell; empty and error cells are null.
    fn cell_text(cell: &Data) -> Option<String> {
        match cell {
            Data::Empty | Data::Error(_) => None,
            Data::String(s) | Data::DateTimeIso(s) | Data::DurationIso(s) => {
                (!s.is_empty()).then(|| s.clone())
            }
            Data::Float(f) => Some(f.to_string()),
            Data::Int(i) => Some(i.to_string()),
            Data::Bool(b) => Some(b.to_string()),
            Data::DateTime(dt) => Some(
                dt.as_datetime()
                    .map(|d| d.format("%Y-%m-%d %H:%M:%S").to_string())
                    .unwrap_or_else(|| dt.as_f64().to_string()),
            ),
        }
    }

    fn detect_separator(header_line: &str) -> u8 {
        let semicolons = header_line.matches(';').count();
        let commas = header_line.matches(',').count();
        if semicolons > commas {
            b';'
        } else {
            b','
        }
    }
}

/// Read and clean a transaction file.
///
/// Either the whole clean table is returned or nothing is.
pub fn load_and_clean(path: &Path) -> Result<CleanOutcome, LoadError> {
    log::info!("Loading transactions from {}", path.display());

    let raw = DataLoader::read_raw(path)?;
    log::debug!(
        "Read {} rows, columns: {:?}",
        raw.row_count(),
        raw.headers
    );

    let outcome = DataProcessor::clean(&raw)?;
    log::info!(
        "Loaded {} clean transactions from {} raw rows",
        outcome.report.clean_rows,
        outcome.report.raw_rows
    );
    Ok(outcome)
}
