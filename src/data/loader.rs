//! Indicator Data Loader Module
//! Resolves the indicator table from an uploaded workbook or the fallback CSV export.

use super::table::{RegionTable, SchemaError};
use calamine::{open_workbook, DataType, Range, Reader, Xlsx, XlsxError};
use polars::prelude::*;
use std::fmt;
use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),
    #[error("Server answered HTTP {status}")]
    HttpStatus { status: u16 },
    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse table: {0}")]
    Parse(#[from] PolarsError),
    #[error("Failed to open workbook: {0}")]
    Excel(#[from] XlsxError),
    #[error("The workbook has no worksheet")]
    EmptyWorkbook,
    #[error("Invalid table: {0}")]
    Schema(#[from] SchemaError),
}

impl LoaderError {
    /// True when the source could not be reached at all.
    pub fn is_network(&self) -> bool {
        matches!(self, LoaderError::Network(_) | LoaderError::HttpStatus { .. })
    }
}

/// Where the indicator table comes from.
#[derive(Debug, Clone, PartialEq)]
pub enum DataSource {
    /// File chosen by the user (`.xlsx`, or `.csv` by extension).
    Upload(PathBuf),
    /// CSV export URL used when nothing was uploaded.
    Fallback(String),
}

impl fmt::Display for DataSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DataSource::Upload(path) => write!(f, "{}", path.display()),
            DataSource::Fallback(url) => f.write_str(url),
        }
    }
}

/// Result of one load attempt.
#[derive(Debug)]
pub enum LoadOutcome {
    Loaded {
        table: RegionTable,
        source: DataSource,
    },
    SourceUnavailable {
        source: DataSource,
        reason: LoaderError,
    },
}

/// Loads and validates indicator tables.
pub struct DataLoader {
    client: reqwest::blocking::Client,
}

impl DataLoader {
    pub fn new(timeout: Duration) -> Result<Self, LoaderError> {
        let client = reqwest::blocking::Client::builder()
            .timeout(timeout)
            .build()?;
        Ok(Self { client })
    }

    /// Load from `source`. Never panics; every failure is reported in the outcome.
    pub fn load(&self, source: DataSource) -> LoadOutcome {
        let result = match &source {
            DataSource::Upload(path) => Self::load_file(path),
            DataSource::Fallback(url) => self.fetch_csv(url),
        };

        match result {
            Ok(table) => {
                log::info!("Loaded {} regions from {}", table.height(), source);
                LoadOutcome::Loaded { table, source }
            }
            Err(reason) => {
                log::warn!("Could not load {}: {}", source, reason);
                LoadOutcome::SourceUnavailable { source, reason }
            }
        }
    }

    /// Read an uploaded file, dispatching on its extension.
    pub fn load_file(path: &Path) -> Result<RegionTable, LoaderError> {
        let is_csv = path
            .extension()
            .map(|ext| ext.eq_ignore_ascii_case("csv"))
            .unwrap_or(false);

        if is_csv {
            let bytes = fs::read(path).map_err(|source| LoaderError::Io {
                path: path.to_path_buf(),
                source,
            })?;
            Self::parse_csv(bytes)
        } else {
            Self::load_xlsx(path)
        }
    }

    /// Read the first worksheet of a workbook.
    pub fn load_xlsx(path: &Path) -> Result<RegionTable, LoaderError> {
        let mut workbook: Xlsx<_> = open_workbook(path)?;
        let (sheet_name, range) = workbook
            .worksheets()
            .into_iter()
            .next()
            .ok_or(LoaderError::EmptyWorkbook)?;
        log::debug!("Reading worksheet '{}' of {}", sheet_name, path.display());

        let raw = Self::range_to_dataframe(&range)?;
        Ok(RegionTable::from_dataframe(&raw)?)
    }

    /// Download and parse the CSV export.
    pub fn fetch_csv(&self, url: &str) -> Result<RegionTable, LoaderError> {
        let response = self.client.get(url).send()?;
        let status = response.status();
        if !status.is_success() {
            return Err(LoaderError::HttpStatus {
                status: status.as_u16(),
            });
        }
        let bytes = response.bytes()?;
        Self::parse_csv(bytes.to_vec())
    }

    pub fn parse_csv(bytes: Vec<u8>) -> Result<RegionTable, LoaderError> {
        let raw = CsvReadOptions::default()
            .with_has_header(true)
            .with_infer_schema_length(Some(10000))
            .into_reader_with_file_handle(Cursor::new(bytes))
            .finish()?;
        Ok(RegionTable::from_dataframe(&raw)?)
    }

    /// Convert a worksheet into a DataFrame of string columns.
    ///
    /// The first row is the header. Fully empty rows are skipped.
    fn range_to_dataframe(range: &Range<DataType>) -> Result<DataFrame, LoaderError> {
        let mut rows = range.rows();
        let Some(header) = rows.next() else {
            return Ok(DataFrame::empty());
        };

        let names: Vec<String> = header
            .iter()
            .enumerate()
            .map(|(i, cell)| cell_text(cell).unwrap_or_else(|| format!("column_{}", i + 1)))
            .collect();
        let mut cells: Vec<Vec<Option<String>>> = vec![Vec::new(); names.len()];

        for row in rows {
            let texts: Vec<Option<String>> = (0..names.len())
                .map(|i| row.get(i).and_then(cell_text))
                .collect();
            if texts.iter().all(Option::is_none) {
                continue;
            }
            for (column, text) in cells.iter_mut().zip(texts) {
                column.push(text);
            }
        }

        let columns: Vec<Column> = names
            .into_iter()
            .zip(cells)
            .map(|(name, values)| Column::new(name.into(), values))
            .collect();
        Ok(DataFrame::new(columns)?)
    }
}

fn cell_text(cell: &DataType) -> Option<String> {
    match cell {
        DataType::String(s) => Some(s.clone()),
        DataType::Float(f) => Some(f.to_string()),
        DataType::Int(i) => Some(i.to_string()),
        DataType::Bool(b) => Some(b.to_string()),
        DataType::DateTime(d) => Some(d.to_string()),
        _ => None,
    }
}
