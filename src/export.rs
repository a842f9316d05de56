use std::fmt;
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use csv::Writer;
use tracing::{debug, info};

/// One scalar CSV cell. `Empty` is how every absent upstream value renders.
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Int(i64),
    Float(f64),
    Bool(bool),
    Text(String),
    Empty,
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Int(v) => write!(f, "{v}"),
            // `{:?}` keeps the fractional part: 1.0 renders as "1.0".
            Cell::Float(v) => write!(f, "{v:?}"),
            Cell::Bool(v) => write!(f, "{v}"),
            Cell::Text(v) => f.write_str(v),
            Cell::Empty => Ok(()),
        }
    }
}

impl From<i64> for Cell {
    fn from(v: i64) -> Self {
        Cell::Int(v)
    }
}

impl From<f64> for Cell {
    fn from(v: f64) -> Self {
        Cell::Float(v)
    }
}

impl From<bool> for Cell {
    fn from(v: bool) -> Self {
        Cell::Bool(v)
    }
}

impl From<String> for Cell {
    fn from(v: String) -> Self {
        Cell::Text(v)
    }
}

impl From<&str> for Cell {
    fn from(v: &str) -> Self {
        Cell::Text(v.to_string())
    }
}

impl<T: Into<Cell>> From<Option<T>> for Cell {
    fn from(v: Option<T>) -> Self {
        v.map_or(Cell::Empty, Into::into)
    }
}

/// Ordered field-name/value pairs; the order is the column order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: Vec<(String, Cell)>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, key: impl Into<String>, value: impl Into<Cell>) {
        self.fields.push((key.into(), value.into()));
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Cell>) -> Self {
        self.push(key, value);
        self
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(k, _)| k.as_str())
    }

    pub fn get(&self, key: &str) -> Option<&Cell> {
        self.fields.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    fn values(&self) -> impl Iterator<Item = String> + '_ {
        self.fields.iter().map(|(_, v)| v.to_string())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    #[error("row {row} does not match the header: expected [{expected}], found [{found}]")]
    SchemaMismatch {
        row: usize,
        expected: String,
        found: String,
    },
    #[error("failed to create {path}: {source}")]
    Create {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExportReport {
    pub rows: usize,
    /// `false` when there was nothing to export and no file was created.
    pub written: bool,
}

/// Writes `rows` to `path` as CSV with the first row's keys as header.
///
/// An empty slice writes nothing. Every row must carry the same key
/// sequence as the first; a mismatch is rejected before the file is touched.
pub fn export_csv(rows: &[Record], path: &Path) -> Result<ExportReport, ExportError> {
    let Some(first) = rows.first() else {
        info!(path = %path.display(), "no rows to export, skipping file");
        return Ok(ExportReport {
            rows: 0,
            written: false,
        });
    };

    let header: Vec<&str> = first.keys().collect();
    for (idx, row) in rows.iter().enumerate().skip(1) {
        if !row.keys().eq(header.iter().copied()) {
            return Err(ExportError::SchemaMismatch {
                row: idx,
                expected: header.join(","),
                found: row.keys().collect::<Vec<_>>().join(","),
            });
        }
    }

    if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
        fs::create_dir_all(dir).map_err(|source| ExportError::Create {
            path: dir.to_path_buf(),
            source,
        })?;
    }
    let file = File::create(path).map_err(|source| ExportError::Create {
        path: path.to_path_buf(),
        source,
    })?;
    let mut writer = Writer::from_writer(BufWriter::new(file));
    let write_err = |source: csv::Error| ExportError::Write {
        path: path.to_path_buf(),
        source,
    };

    writer.write_record(&header).map_err(write_err)?;
    for row in rows {
        writer.write_record(row.values()).map_err(write_err)?;
    }
    writer
        .flush()
        .map_err(|e| write_err(csv::Error::from(e)))?;
    debug!(columns = header.len(), "csv header written");
    info!(path = %path.display(), rows = rows.len(), "csv export complete");

    Ok(ExportReport {
        rows: rows.len(),
        written: true,
    })
}
