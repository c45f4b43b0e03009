use crate::core::Storage;
use crate::domain::model::{Column, ColumnMap, DataTable};
use crate::utils::error::{Result, SalesError};
use csv::{ReaderBuilder, Trim};
use std::collections::HashSet;
use std::io::{ErrorKind, Read};

/// Cell contents treated as missing.
pub const NA_TOKENS: [&str; 11] = [
    "", "NA", "N/A", "n/a", "NaN", "nan", "null", "NULL", "None", "#N/A", "-",
];

#[derive(Debug, Clone)]
pub struct LoaderOptions {
    pub delimiter: u8,
    pub numeric_columns: Vec<String>,
}

impl Default for LoaderOptions {
    fn default() -> Self {
        let columns = ColumnMap::default();
        Self {
            delimiter: b',',
            numeric_columns: columns.numeric().iter().map(|c| c.to_string()).collect(),
        }
    }
}

fn is_missing(field: &str) -> bool {
    NA_TOKENS.contains(&field)
}

/// Reads the dataset at `path` through `storage` and parses it.
pub fn load_dataset<S: Storage>(storage: &S, path: &str, options: &LoaderOptions) -> Result<DataTable> {
    let bytes = match storage.read_file(path) {
        Ok(bytes) => bytes,
        Err(SalesError::IoError(e)) if e.kind() == ErrorKind::NotFound => {
            return Err(SalesError::InputNotFound {
                path: path.to_string(),
            });
        }
        Err(SalesError::IoError(e)) => {
            return Err(SalesError::InputUnparseable {
                path: path.to_string(),
                message: e.to_string(),
            });
        }
        Err(e) => return Err(e),
    };

    let table = parse_dataset(bytes.as_slice(), path, options)?;

    tracing::info!("✅ Data loaded successfully!");
    tracing::info!("Rows: {}", table.row_count());
    tracing::info!("Columns: {}", table.column_count());
    tracing::info!("Columns in dataset: {:?}", table.column_names());

    Ok(table)
}

/// Parses delimited text into a [`DataTable`]. The configured numeric
/// columns become numeric columns; everything else stays categorical.
pub fn parse_dataset<R: Read>(reader: R, source: &str, options: &LoaderOptions) -> Result<DataTable> {
    let unparseable = |message: String| SalesError::InputUnparseable {
        path: source.to_string(),
        message,
    };

    let mut rdr = ReaderBuilder::new()
        .delimiter(options.delimiter)
        .has_headers(true)
        .trim(Trim::All)
        .from_reader(reader);

    let headers: Vec<String> = rdr
        .headers()
        .map_err(|e| unparseable(e.to_string()))?
        .iter()
        .map(str::to_string)
        .collect();

    if headers.is_empty() || headers.iter().all(|h| h.is_empty()) {
        return Err(unparseable("no header row".to_string()));
    }

    let mut seen = HashSet::new();
    for header in &headers {
        if !seen.insert(header.as_str()) {
            return Err(unparseable(format!("duplicate column '{}'", header)));
        }
    }

    let mut raw: Vec<Vec<Option<String>>> = vec![Vec::new(); headers.len()];
    for result in rdr.records() {
        let record = result.map_err(|e| unparseable(e.to_string()))?;
        for (idx, field) in record.iter().enumerate() {
            let value = if is_missing(field) {
                None
            } else {
                Some(field.to_string())
            };
            raw[idx].push(value);
        }
    }

    let mut columns = Vec::with_capacity(headers.len());
    for (name, values) in headers.into_iter().zip(raw) {
        if options.numeric_columns.iter().any(|c| *c == name) {
            let mut numbers = Vec::with_capacity(values.len());
            for (row, value) in values.into_iter().enumerate() {
                let parsed = match value {
                    None => None,
                    // inf / NaN 無法縮放，視同非數值
                    Some(text) => match text.parse::<f64>() {
                        Ok(number) if number.is_finite() => Some(number),
                        _ => {
                            // 標題列佔第一行
                            return Err(unparseable(format!(
                                "line {}: column '{}' has non-numeric value '{}'",
                                row + 2,
                                name,
                                text
                            )));
                        }
                    },
                };
                numbers.push(parsed);
            }
            columns.push(Column::numeric(name, numbers));
        } else {
            columns.push(Column::categorical(name, values));
        }
    }

    DataTable::new(columns).ok_or_else(|| unparseable("columns have unequal lengths".to_string()))
}

/// Fails fast when a required column is absent. Time of day and date are optional.
pub fn validate_columns(table: &DataTable, columns: &ColumnMap) -> Result<()> {
    for required in columns.required() {
        if !table.has_column(required) {
            return Err(SalesError::MissingColumn {
                column: required.to_string(),
                available: table.column_names().join(", "),
            });
        }
    }

    for numeric in columns.numeric() {
        if let Some(column) = table.column(numeric) {
            if !column.is_numeric() {
                return Err(SalesError::processing(format!(
                    "column '{}' must be numeric",
                    numeric
                )));
            }
        }
    }

    if !table.has_column(&columns.time_of_day) {
        tracing::info!(
            "No '{}' column found, time-of-day analysis will be skipped",
            columns.time_of_day
        );
    }

    Ok(())
}
