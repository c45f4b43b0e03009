use crate::core::stats;
use crate::domain::model::{Aggregates, GroupValue, GroupedAggregate, SalesTable};

pub const TOP_N: usize = 3;

/// State-wise, group-wise and (when present) time-wise views plus
/// descriptive statistics. Pure: the same table always yields the same result.
pub fn aggregate(table: &SalesTable) -> Aggregates {
    tracing::info!("📈 Performing data analysis...");

    let state_wise =
        GroupedAggregate::sum_by(table.records.iter().map(|r| (r.region.as_str(), r.sales)));
    let group_wise = GroupedAggregate::sum_by(
        table
            .records
            .iter()
            .map(|r| (r.customer_group.as_str(), r.sales)),
    );
    let time_wise = table.has_time_of_day.then(|| {
        GroupedAggregate::mean_by(
            table
                .records
                .iter()
                .filter_map(|r| r.time_of_day.as_deref().map(|t| (t, r.sales))),
        )
    });

    let units: Vec<f64> = table.records.iter().map(|r| r.units).collect();
    let sales: Vec<f64> = table.records.iter().map(|r| r.sales).collect();

    let aggregates = Aggregates {
        state_wise,
        group_wise,
        time_wise,
        unit_stats: stats::describe(&units),
        sales_stats: stats::describe(&sales),
        total_sales: sales.iter().sum(),
        date_range: table.date_range(),
    };

    log_aggregates(&aggregates);
    aggregates
}

fn log_rows(heading: &str, rows: &[GroupValue]) {
    tracing::info!("{}", heading);
    for row in rows {
        tracing::info!("   {:<12} {:.2}", row.key, row.value);
    }
}

fn log_aggregates(aggregates: &Aggregates) {
    log_rows("Top 3 Performing States:", &aggregates.state_wise.top(TOP_N));
    log_rows(
        "Bottom 3 Performing States:",
        &aggregates.state_wise.bottom(TOP_N),
    );
    log_rows("Group Performance:", &aggregates.group_wise.sorted_desc());
    if let Some(time_wise) = &aggregates.time_wise {
        log_rows("Peak Sales Times:", &time_wise.top(TOP_N));
    }

    tracing::info!("Descriptive Statistics:");
    tracing::info!("   {:<6} {:>10} {:>10}", "", "Unit", "Sales");
    for ((metric, unit), (_, sales)) in aggregates
        .unit_stats
        .rows()
        .into_iter()
        .zip(aggregates.sales_stats.rows())
    {
        tracing::info!("   {:<6} {:>10.4} {:>10.4}", metric, unit, sales);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::SalesRecord;

    fn record(region: &str, group: &str, time: Option<&str>, sales: f64) -> SalesRecord {
        SalesRecord {
            region: region.to_string(),
            customer_group: group.to_string(),
            time_of_day: time.map(str::to_string),
            units: sales / 2.0,
            sales,
            date: None,
        }
    }

    fn keys(rows: &[GroupValue]) -> Vec<&str> {
        rows.iter().map(|r| r.key.as_str()).collect()
    }

    #[test]
    fn test_top_and_bottom_regions() {
        let table = SalesTable {
            records: vec![
                record("A", "Kids", None, 100.0),
                record("B", "Kids", None, 50.0),
                record("C", "Men", None, 200.0),
                record("D", "Men", None, 10.0),
                record("E", "Women", None, 75.0),
            ],
            has_time_of_day: false,
        };

        let aggregates = aggregate(&table);
        assert_eq!(keys(&aggregates.state_wise.top(3)), vec!["C", "A", "E"]);
        assert_eq!(keys(&aggregates.state_wise.bottom(3)), vec!["D", "B", "E"]);
        assert!(aggregates.time_wise.is_none());
    }

    #[test]
    fn test_ties_keep_key_order() {
        let table = SalesTable {
            records: vec![
                record("WA", "Kids", None, 1.0),
                record("NSW", "Kids", None, 1.0),
                record("VIC", "Kids", None, 1.0),
                record("QLD", "Kids", None, 1.0),
            ],
            has_time_of_day: false,
        };

        let aggregates = aggregate(&table);
        assert_eq!(
            keys(&aggregates.state_wise.top(3)),
            vec!["NSW", "QLD", "VIC"]
        );
        assert_eq!(
            keys(&aggregates.state_wise.bottom(3)),
            vec!["NSW", "QLD", "VIC"]
        );
    }

    #[test]
    fn test_region_sums_conserve_total() {
        let table = SalesTable {
            records: vec![
                record("WA", "Kids", None, 0.1),
                record("VIC", "Men", None, 0.7),
                record("WA", "Men", None, 0.35),
                record("NSW", "Women", None, 0.9),
                record("VIC", "Kids", None, 0.05),
            ],
            has_time_of_day: false,
        };

        let aggregates = aggregate(&table);
        assert!((aggregates.state_wise.total() - aggregates.total_sales).abs() < 1e-9);
        assert!((aggregates.group_wise.total() - aggregates.total_sales).abs() < 1e-9);
        assert!((aggregates.state_wise.get("WA").unwrap() - 0.45).abs() < 1e-9);
    }

    #[test]
    fn test_group_wise_sorted_desc_and_time_means() {
        let table = SalesTable {
            records: vec![
                record("WA", "Kids", Some("Morning"), 0.2),
                record("WA", "Men", Some("Morning"), 0.4),
                record("VIC", "Men", Some("Evening"), 0.9),
                record("VIC", "Women", Some("Afternoon"), 0.1),
            ],
            has_time_of_day: true,
        };

        let aggregates = aggregate(&table);
        assert_eq!(
            keys(&aggregates.group_wise.sorted_desc()),
            vec!["Men", "Kids", "Women"]
        );

        let time_wise = aggregates.time_wise.unwrap();
        assert_eq!(keys(&time_wise.values), vec!["Afternoon", "Evening", "Morning"]);
        assert!((time_wise.get("Morning").unwrap() - 0.3).abs() < 1e-9);
        assert_eq!(keys(&time_wise.top(3)), vec!["Evening", "Morning", "Afternoon"]);
    }

    #[test]
    fn test_aggregate_is_idempotent() {
        let table = SalesTable {
            records: vec![
                record("WA", "Kids", Some("Morning"), 0.2),
                record("VIC", "Men", Some("Evening"), 0.9),
            ],
            has_time_of_day: true,
        };

        assert_eq!(aggregate(&table), aggregate(&table));
    }
}
