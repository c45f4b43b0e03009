use crate::domain::model::{
    CleanedTable, Column, ColumnMap, ColumnScale, ColumnValues, DataTable, FillValue, Imputation,
    SalesRecord, SalesTable,
};
use crate::utils::error::{Result, SalesError};
use chrono::NaiveDate;
use std::collections::BTreeMap;

const DATE_FORMATS: [&str; 4] = ["%d-%b-%Y", "%Y-%m-%d", "%d/%m/%Y", "%m/%d/%Y"];

pub fn parse_sale_date(text: &str) -> Option<NaiveDate> {
    DATE_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(text, format).ok())
}

/// Imputes missing values and min-max scales `scale_columns`, returning a
/// new table. Numeric columns take the column mean, every other column
/// takes its most frequent value.
pub fn clean(table: &DataTable, scale_columns: &[&str]) -> Result<CleanedTable> {
    tracing::info!("🧹 Starting data cleaning process...");

    let mut imputations = Vec::new();
    let mut scaling = Vec::new();
    let mut columns = Vec::with_capacity(table.column_count());

    for column in table.columns() {
        let (filled, imputation) = impute(column)?;
        if let Some(imputation) = imputation {
            tracing::info!(
                "   Filled {} missing value(s) in '{}' with {:?}",
                imputation.filled,
                imputation.column,
                imputation.fill
            );
            imputations.push(imputation);
        }

        if scale_columns.contains(&column.name.as_str()) {
            let ColumnValues::Numeric(values) = &filled.values else {
                return Err(SalesError::processing(format!(
                    "column '{}' cannot be scaled because it is not numeric",
                    column.name
                )));
            };
            let (scaled, scale) = min_max_scale(&column.name, values);
            scaling.push(scale);
            columns.push(Column::numeric(column.name.clone(), scaled));
        } else {
            columns.push(filled);
        }
    }

    let table = DataTable::new(columns)
        .ok_or_else(|| SalesError::processing("cleaning changed column lengths"))?;

    let remaining = table.total_nulls();
    if remaining > 0 {
        return Err(SalesError::processing(format!(
            "{} missing value(s) remain after cleaning",
            remaining
        )));
    }

    tracing::info!("✅ Data cleaning completed, no missing values remain");
    tracing::debug!("Scaled columns: {:?}", scaling);

    Ok(CleanedTable {
        table,
        imputations,
        scaling,
    })
}

fn impute(column: &Column) -> Result<(Column, Option<Imputation>)> {
    let missing = column.null_count();
    if missing == 0 {
        return Ok((column.clone(), None));
    }

    let no_observations = || {
        SalesError::processing(format!(
            "column '{}' has no observed values to impute from",
            column.name
        ))
    };

    match &column.values {
        ColumnValues::Numeric(values) => {
            let observed: Vec<f64> = values.iter().flatten().copied().collect();
            if observed.is_empty() {
                return Err(no_observations());
            }
            let mean = observed.iter().sum::<f64>() / observed.len() as f64;
            let filled = values.iter().map(|v| Some(v.unwrap_or(mean))).collect();
            Ok((
                Column::numeric(column.name.clone(), filled),
                Some(Imputation {
                    column: column.name.clone(),
                    filled: missing,
                    fill: FillValue::Mean(mean),
                }),
            ))
        }
        ColumnValues::Categorical(values) => {
            let mode = mode(values.iter().flatten().map(String::as_str)).ok_or_else(no_observations)?;
            let filled = values
                .iter()
                .map(|v| Some(v.clone().unwrap_or_else(|| mode.clone())))
                .collect();
            Ok((
                Column::categorical(column.name.clone(), filled),
                Some(Imputation {
                    column: column.name.clone(),
                    filled: missing,
                    fill: FillValue::Mode(mode),
                }),
            ))
        }
    }
}

/// Most frequent value; ties go to the smallest value in sort order.
pub fn mode<'a, I>(values: I) -> Option<String>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
    for value in values {
        *counts.entry(value).or_insert(0) += 1;
    }

    let mut best: Option<(&str, usize)> = None;
    for (value, count) in counts {
        if best.map_or(true, |(_, c)| count > c) {
            best = Some((value, count));
        }
    }
    best.map(|(value, _)| value.to_string())
}

/// `(x - min) / (max - min)`. A constant column maps to 0.
pub fn min_max_scale(name: &str, values: &[Option<f64>]) -> (Vec<Option<f64>>, ColumnScale) {
    let observed = values.iter().flatten();
    let min = observed.clone().copied().fold(f64::INFINITY, f64::min);
    let max = observed.copied().fold(f64::NEG_INFINITY, f64::max);

    if min > max {
        // 空欄位
        return (
            values.to_vec(),
            ColumnScale {
                column: name.to_string(),
                min: 0.0,
                max: 0.0,
                constant: true,
            },
        );
    }

    let range = max - min;
    let constant = range == 0.0;
    if constant {
        tracing::warn!(
            "Column '{}' is constant ({}), scaling every value to 0",
            name,
            min
        );
    }

    let scaled = values
        .iter()
        .map(|v| {
            v.map(|x| if constant { 0.0 } else { ((x - min) / range).clamp(0.0, 1.0) })
        })
        .collect();

    (
        scaled,
        ColumnScale {
            column: name.to_string(),
            min,
            max,
            constant,
        },
    )
}

impl SalesTable {
    /// Projects a cleaned table onto typed sales records.
    pub fn from_table(table: &DataTable, columns: &ColumnMap) -> Result<Self> {
        let require = |name: &str| {
            table.column(name).ok_or_else(|| SalesError::MissingColumn {
                column: name.to_string(),
                available: table.column_names().join(", "),
            })
        };

        let region = require(&columns.region)?;
        let group = require(&columns.customer_group)?;
        let units = require(&columns.units)?;
        let sales = require(&columns.sales)?;
        let time = table.column(&columns.time_of_day);
        let date = table.column(&columns.date);

        let missing = |name: &str, row: usize| {
            SalesError::processing(format!("column '{}' is missing a value at row {}", name, row))
        };

        let mut records = Vec::with_capacity(table.row_count());
        for row in 0..table.row_count() {
            records.push(SalesRecord {
                region: region.text(row).ok_or_else(|| missing(&region.name, row))?,
                customer_group: group.text(row).ok_or_else(|| missing(&group.name, row))?,
                time_of_day: match time {
                    Some(column) => Some(column.text(row).ok_or_else(|| missing(&column.name, row))?),
                    None => None,
                },
                units: units.number(row).ok_or_else(|| missing(&units.name, row))?,
                sales: sales.number(row).ok_or_else(|| missing(&sales.name, row))?,
                date: date.and_then(|c| c.text(row)).and_then(|t| parse_sale_date(&t)),
            });
        }

        Ok(Self {
            records,
            has_time_of_day: time.is_some(),
        })
    }
}
