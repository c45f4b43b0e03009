use crate::domain::model::{ColumnQuality, DataTable, QualityReport};

/// Per-column null counts and percentages. Read-only.
pub fn inspect(table: &DataTable) -> QualityReport {
    let rows = table.row_count();
    let columns: Vec<ColumnQuality> = table
        .columns()
        .iter()
        .map(|column| {
            let null_count = column.null_count();
            let null_percentage = if rows == 0 {
                0.0
            } else {
                null_count as f64 / rows as f64 * 100.0
            };
            ColumnQuality {
                name: column.name.clone(),
                null_count,
                null_percentage,
            }
        })
        .collect();

    let report = QualityReport {
        row_count: rows,
        columns,
    };

    let with_nulls = report.columns_with_nulls();
    if with_nulls.is_empty() {
        tracing::info!("🔍 No missing values found");
    } else {
        tracing::info!("🔍 Missing values found in {} column(s):", with_nulls.len());
        for column in with_nulls {
            tracing::info!(
                "   {}: {} ({:.2}%)",
                column.name,
                column.null_count,
                column.null_percentage
            );
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Column;

    #[test]
    fn test_inspect_counts_and_mask() {
        let table = DataTable::new(vec![
            Column::categorical(
                "State",
                vec![Some("WA".into()), None, Some("VIC".into()), None],
            ),
            Column::numeric("Sales", vec![Some(1.0), Some(2.0), Some(3.0), None]),
            Column::numeric("Unit", vec![Some(1.0), Some(2.0), Some(3.0), Some(4.0)]),
        ])
        .unwrap();
        let before = table.clone();

        let report = inspect(&table);

        assert_eq!(report.row_count, 4);
        assert_eq!(report.columns[0].null_count, 2);
        assert!((report.columns[0].null_percentage - 50.0).abs() < 1e-9);
        assert!((report.columns[1].null_percentage - 25.0).abs() < 1e-9);
        assert_eq!(report.null_mask(), vec![true, true, false]);
        assert_eq!(table, before);
    }

    #[test]
    fn test_inspect_empty_table() {
        let table = DataTable::new(vec![Column::numeric("Sales", vec![])]).unwrap();
        let report = inspect(&table);
        assert_eq!(report.columns[0].null_percentage, 0.0);
        assert_eq!(report.null_mask(), vec![false]);
    }
}
