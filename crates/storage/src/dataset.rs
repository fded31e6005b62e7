use std::{
    fs::File,
    io::{self, Read, Write},
    path::{Path, PathBuf},
};

use serde::{Deserialize, Serialize};
use shared::error::{GraderError, GraderResult};
use thiserror::Error;
use tracing::{debug, info};

use crate::atomic::write_atomically;

#[derive(Debug, Error)]
pub enum DatasetError {
    #[error("io error: {0}")]
    Io(#[from] io::Error),
    #[error("malformed delimited text: {0}")]
    Csv(#[from] csv::Error),
    #[error("record {record} has {cells} cells but the header row defines {columns} columns")]
    RowTooWide {
        record: usize,
        cells: usize,
        columns: usize,
    },
}

/// Delimited-text flavours a dataset may be stored in.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TableFormat {
    #[default]
    Csv,
    Tsv,
}

impl TableFormat {
    /// `.tsv`/`.tab` files are tab separated; everything else is read as CSV.
    pub fn from_path(path: &Path) -> Self {
        match path
            .extension()
            .and_then(|ext| ext.to_str())
            .map(str::to_ascii_lowercase)
            .as_deref()
        {
            Some("tsv") | Some("tab") => Self::Tsv,
            _ => Self::Csv,
        }
    }

    pub fn delimiter(self) -> u8 {
        match self {
            Self::Csv => b',',
            Self::Tsv => b'\t',
        }
    }
}

pub fn is_blank(cell: &str) -> bool {
    cell.trim().is_empty()
}

/// In-memory table of text cells. Every row holds exactly one cell per header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dataset {
    headers: Vec<String>,
    rows: Vec<Vec<String>>,
    format: TableFormat,
    source: Option<PathBuf>,
}

impl Dataset {
    pub fn new(headers: Vec<String>, rows: Vec<Vec<String>>) -> Self {
        let width = headers.len();
        let rows = rows
            .into_iter()
            .map(|mut row| {
                row.resize(width, String::new());
                row
            })
            .collect();
        Self {
            headers,
            rows,
            format: TableFormat::default(),
            source: None,
        }
    }

    /// Reads a whole file, picking the delimiter from its extension.
    pub fn read_path(path: impl AsRef<Path>) -> GraderResult<Self> {
        let path = path.as_ref();
        let format = TableFormat::from_path(path);
        let file = File::open(path).map_err(|err| GraderError::load_failed(path, err))?;
        let mut dataset =
            Self::from_reader(file, format).map_err(|err| GraderError::load_failed(path, err))?;
        dataset.source = Some(path.to_path_buf());
        info!(
            path = %path.display(),
            rows = dataset.row_count(),
            columns = dataset.headers.len(),
            ?format,
            "dataset loaded"
        );
        Ok(dataset)
    }

    pub fn from_reader<R: Read>(reader: R, format: TableFormat) -> Result<Self, DatasetError> {
        let mut reader = csv::ReaderBuilder::new()
            .delimiter(format.delimiter())
            .has_headers(true)
            .flexible(true)
            .from_reader(reader);

        let headers: Vec<String> = reader.headers()?.iter().map(str::to_string).collect();
        let mut rows = Vec::new();
        for (position, record) in reader.records().enumerate() {
            let record = record?;
            if record.len() > headers.len() {
                return Err(DatasetError::RowTooWide {
                    record: position + 1,
                    cells: record.len(),
                    columns: headers.len(),
                });
            }
            let mut row: Vec<String> = record.iter().map(str::to_string).collect();
            row.resize(headers.len(), String::new());
            rows.push(row);
        }

        Ok(Self {
            headers,
            rows,
            format,
            source: None,
        })
    }

    pub fn write_to<W: Write>(&self, writer: W) -> Result<(), DatasetError> {
        let mut writer = csv::WriterBuilder::new()
            .delimiter(self.format.delimiter())
            .from_writer(writer);
        writer.write_record(&self.headers)?;
        for row in &self.rows {
            writer.write_record(row)?;
        }
        writer.flush()?;
        Ok(())
    }

    /// Writes the full table to `path` in the format it was loaded in.
    pub fn write_path(&self, path: impl AsRef<Path>) -> GraderResult<()> {
        let path = path.as_ref();
        write_atomically::<DatasetError, _>(path, |file| self.write_to(file))
            .map_err(|err| GraderError::save_failed(path, err))?;
        debug!(path = %path.display(), rows = self.row_count(), "dataset written");
        Ok(())
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.headers.iter().position(|header| header == name)
    }

    /// Returns the index of `name`, appending it as an all-empty column first
    /// when the table does not have it yet.
    pub fn ensure_column(&mut self, name: &str) -> usize {
        if let Some(index) = self.column_index(name) {
            return index;
        }
        self.headers.push(name.to_string());
        for row in &mut self.rows {
            row.push(String::new());
        }
        self.headers.len() - 1
    }

    pub fn cell(&self, row: usize, column: usize) -> Option<&str> {
        self.rows.get(row)?.get(column).map(String::as_str)
    }

    pub fn set_cell(&mut self, row: usize, column: usize, value: impl Into<String>) -> bool {
        match self.rows.get_mut(row).and_then(|row| row.get_mut(column)) {
            Some(cell) => {
                *cell = value.into();
                true
            }
            None => false,
        }
    }

    pub fn rows(&self) -> impl Iterator<Item = &[String]> {
        self.rows.iter().map(Vec::as_slice)
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Indices of rows whose cell in `column` is blank.
    pub fn blank_rows(&self, column: usize) -> Vec<usize> {
        self.rows
            .iter()
            .enumerate()
            .filter(|(_, row)| row.get(column).map_or(true, |cell| is_blank(cell)))
            .map(|(index, _)| index)
            .collect()
    }

    pub fn filled_count(&self, column: usize) -> usize {
        self.rows
            .iter()
            .filter(|row| row.get(column).is_some_and(|cell| !is_blank(cell)))
            .count()
    }

    pub fn format(&self) -> TableFormat {
        self.format
    }

    pub fn source_path(&self) -> Option<&Path> {
        self.source.as_deref()
    }
}

#[cfg(test)]
#[path = "tests/dataset_tests.rs"]
mod tests;
