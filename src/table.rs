/*!
Column tables of `f64` values read from and written to delimited text.

Input files carry one header row of column names; blank lines and lines
starting with the comment prefix are skipped.
*/

use std::fs;
use std::path::Path;

use serde::Deserialize;

use crate::error::{HydroError, Result};

#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
#[serde(default)]
pub struct CsvConfig {
    pub delimiter: char,
    pub comment_prefix: Option<char>,
}

impl Default for CsvConfig {
    fn default() -> Self {
        Self {
            delimiter: ',',
            comment_prefix: Some('#'),
        }
    }
}

impl CsvConfig {
    pub fn tab_separated() -> Self {
        Self {
            delimiter: '\t',
            ..Default::default()
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Column {
    pub name: String,
    pub values: Vec<f64>,
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Table {
    columns: Vec<Column>,
}

impl Table {
    pub fn new() -> Self {
        Table::default()
    }

    /** Appends a column; every column must have as many rows as the first. */
    pub fn push_column(&mut self, name: impl Into<String>, values: Vec<f64>) -> Result<()> {
        if let Some(first) = self.columns.first() {
            if first.values.len() != values.len() {
                return Err(HydroError::LengthMismatch {
                    left: first.values.len(),
                    right: values.len(),
                });
            }
        }
        self.columns.push(Column {
            name: name.into(),
            values,
        });
        Ok(())
    }

    pub fn with_column(mut self, name: impl Into<String>, values: Vec<f64>) -> Result<Self> {
        self.push_column(name, values)?;
        Ok(self)
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map_or(0, |c| c.values.len())
    }

    pub fn column(&self, name: &str) -> Result<&[f64]> {
        self.columns
            .iter()
            .find(|c| c.name == name)
            .map(|c| c.values.as_slice())
            .ok_or_else(|| HydroError::MissingColumn(name.to_string()))
    }

    pub fn parse(text: &str, config: &CsvConfig, source: &str) -> Result<Self> {
        let table_error = |line: usize, reason: String| HydroError::Table {
            path: source.to_string(),
            line,
            reason,
        };
        let csv_error = |e: csv::Error| {
            let line = e.position().map_or(0, |p| p.line() as usize);
            table_error(line, e.to_string())
        };

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(ascii("delimiter", config.delimiter)?)
            .comment(config.comment_prefix.map(|c| ascii("comment prefix", c)).transpose()?)
            .trim(csv::Trim::All)
            .from_reader(text.as_bytes());

        let header = reader.headers().map_err(csv_error)?;
        if header.is_empty() || header.iter().all(str::is_empty) {
            return Err(table_error(0, "missing header row".to_string()));
        }
        let mut columns: Vec<Column> = header
            .iter()
            .map(|name| Column {
                name: name.to_string(),
                values: Vec::new(),
            })
            .collect();

        for record in reader.records() {
            let record = record.map_err(csv_error)?;
            let line = record.position().map_or(0, |p| p.line() as usize);
            for (column, field) in columns.iter_mut().zip(record.iter()) {
                let value = field.parse::<f64>().map_err(|e| {
                    table_error(line, format!("column '{}': {e}", column.name))
                })?;
                column.values.push(value);
            }
        }

        Ok(Table { columns })
    }

    pub fn read(path: impl AsRef<Path>, config: &CsvConfig) -> Result<Self> {
        let path = path.as_ref();
        let text = fs::read_to_string(path).map_err(|source| HydroError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let table = Self::parse(&text, config, &path.display().to_string())?;
        log::debug!(
            "read {} rows x {} columns from {}",
            table.row_count(),
            table.columns.len(),
            path.display()
        );
        Ok(table)
    }

    /** Header row plus one record per row, quoted where a field needs it. */
    pub fn to_csv(&self) -> Result<String> {
        let write_error = |reason: String| HydroError::Table {
            path: "<csv output>".to_string(),
            line: 0,
            reason,
        };
        let mut writer = csv::WriterBuilder::new()
            .terminator(csv::Terminator::Any(b'\n'))
            .from_writer(Vec::new());

        writer
            .write_record(self.columns.iter().map(|c| c.name.as_str()))
            .map_err(|e| write_error(e.to_string()))?;
        for row in 0..self.row_count() {
            writer
                .write_record(self.columns.iter().map(|c| c.values[row].to_string()))
                .map_err(|e| write_error(e.to_string()))?;
        }

        let bytes = writer
            .into_inner()
            .map_err(|e| write_error(e.error().to_string()))?;
        String::from_utf8(bytes).map_err(|e| write_error(e.to_string()))
    }

    pub fn write(&self, path: impl AsRef<Path>) -> Result<()> {
        let path = path.as_ref();
        fs::write(path, self.to_csv()?).map_err(|source| HydroError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        log::info!("wrote {}", path.display());
        Ok(())
    }
}

// The csv reader only takes single-byte delimiters and comment markers
fn ascii(name: &'static str, c: char) -> Result<u8> {
    u8::try_from(c)
        .ok()
        .filter(u8::is_ascii)
        .ok_or(HydroError::OutOfRange {
            name,
            value: f64::from(u32::from(c)),
            reason: "must be a single ASCII character",
        })
}
