use std::{
    io::Read,
    path::{Path, PathBuf},
};

use csv::ReaderBuilder;
use thiserror::Error;
use tracing::debug;

pub const INDEX_NAME_COLUMN: &str = "index_name";
pub const INDEX_SIZE_COLUMN: &str = "index_size_bytes";

#[derive(Debug, Error)]
pub enum ResultsError {
    #[error("Read results table {}", .path.display())]
    Csv {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
    #[error("Results table {} has no {column} column", .path.display())]
    MissingColumn { path: PathBuf, column: &'static str },
    #[error(
        "Results table {} row {row}: invalid index_size_bytes value '{value}'",
        .path.display()
    )]
    InvalidSize {
        path: PathBuf,
        row: usize,
        value: String,
    },
}

/// One measurement row of a harness results table
#[derive(Debug, Clone, PartialEq)]
pub struct ResultRow {
    pub index_name: String,
    /// Empty cells are kept as `None` and skipped when averaging
    pub index_size_bytes: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct ResultTable {
    pub path: PathBuf,
    pub rows: Vec<ResultRow>,
}

impl ResultTable {
    pub fn load(path: &Path) -> Result<Self, ResultsError> {
        let reader = ReaderBuilder::new()
            .flexible(true)
            .from_path(path)
            .map_err(|source| ResultsError::Csv {
                path: path.to_path_buf(),
                source,
            })?;
        Self::from_reader(path, reader)
    }

    /// Parses a table from any reader, `path` is only used in errors
    pub fn from_reader<R: Read>(
        path: &Path,
        mut reader: csv::Reader<R>,
    ) -> Result<Self, ResultsError> {
        let csv_err = |source| ResultsError::Csv {
            path: path.to_path_buf(),
            source,
        };
        let headers = reader.headers().map_err(csv_err)?.clone();
        let column = |column: &'static str| {
            headers
                .iter()
                .position(|h| h.trim() == column)
                .ok_or_else(|| ResultsError::MissingColumn {
                    path: path.to_path_buf(),
                    column,
                })
        };
        let name_col = column(INDEX_NAME_COLUMN)?;
        let size_col = column(INDEX_SIZE_COLUMN)?;

        let mut rows = Vec::new();
        for (row, record) in reader.records().enumerate() {
            let record = record.map_err(csv_err)?;
            let index_name = record.get(name_col).unwrap_or_default().trim().to_owned();
            let size = record.get(size_col).unwrap_or_default().trim();
            let index_size_bytes = if size.is_empty() || size.eq_ignore_ascii_case("nan") {
                None
            } else {
                Some(
                    size.parse::<f64>()
                        .map_err(|_| ResultsError::InvalidSize {
                            path: path.to_path_buf(),
                            row: row + 1,
                            value: size.to_owned(),
                        })?,
                )
            };
            rows.push(ResultRow {
                index_name,
                index_size_bytes,
            });
        }
        debug!("Loaded {} rows from {}", rows.len(), path.display());
        Ok(Self {
            path: path.to_path_buf(),
            rows,
        })
    }

    /// Rows whose `index_name` equals `index`
    pub fn rows_for<'a>(&'a self, index: &'a str) -> impl Iterator<Item = &'a ResultRow> + 'a {
        self.rows.iter().filter(move |row| row.index_name == index)
    }
}
