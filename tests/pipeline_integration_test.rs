use sales_analysis::core::Pipeline;
use sales_analysis::domain::model::{ChartKind, ChartStatus};
use sales_analysis::{AnalysisEngine, LocalStorage, SalesError, SalesPipeline, TomlConfig};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

const SALES_CSV: &str = "Date,Time,State,Group,Unit,Sales
1-Oct-2020,Morning,VIC,Kids,2,1000
1-Oct-2020,Afternoon,VIC,Men,6,3000
2-Oct-2020,Evening,VIC,Kids,10,5000
2-Oct-2020,Morning,VIC,Men,22,11000
3-Oct-2020,Afternoon,WA,Kids,12,6000
3-Oct-2020,Evening,WA,Men,4,2000
4-Oct-2020,Morning,WA,Kids,8,4000
4-Oct-2020,Afternoon,WA,Men,14,7000
30-Dec-2020,Evening,WA,Kids,18,9000
30-Dec-2020,,VIC,Men,2,1000
";

const BASE_CONFIG: &str = r#"
[analysis]
report_title = "Integration Sales Report"

[input]
path = "data/sales.csv"

[output]
formats = ["markdown", "json", "csv"]

[charts]
width = 400
height = 300
"#;

fn workspace(csv: &str) -> TempDir {
    let temp_dir = TempDir::new().unwrap();
    let data_dir = temp_dir.path().join("data");
    fs::create_dir_all(&data_dir).unwrap();
    fs::write(data_dir.join("sales.csv"), csv).unwrap();
    temp_dir
}

fn engine_for(
    root: &Path,
    config_toml: &str,
) -> AnalysisEngine<SalesPipeline<LocalStorage, TomlConfig>> {
    let config = TomlConfig::from_toml_str(config_toml).unwrap();
    let pipeline = SalesPipeline::new(LocalStorage::new(root), config);
    AnalysisEngine::new(pipeline)
}

#[test]
fn test_full_run_writes_report_and_outputs() {
    let temp_dir = workspace(SALES_CSV);
    let mut engine = engine_for(temp_dir.path(), BASE_CONFIG);

    let summary = engine.run().unwrap();

    assert_eq!(summary.report_path, "reports/sales_report.md");
    assert_eq!(summary.charts.len(), 5);
    assert_eq!(summary.extra_outputs.len(), 2);

    let report = fs::read_to_string(temp_dir.path().join("reports/sales_report.md")).unwrap();
    assert!(report.starts_with("# Integration Sales Report\n"));
    assert!(report.contains("- Total Records: 10"));
    assert!(report.contains("- Time Period: 2020-10-01 to 2020-12-30"));
    assert!(report.contains("- States Analyzed: 2"));
    assert!(report.contains("- Customer Groups: 2"));

    // Sales scale to (x - 1000) / 10000
    assert!(report.contains("| WA | 2.30 |"));
    assert!(report.contains("| VIC | 1.60 |"));
    assert!(report.contains("| Kids | 2.00 |"));
    assert!(report.contains("| Men | 1.90 |"));
    assert!(report.contains("### Time of Day Analysis"));

    assert!(report.contains("| count | 10.00 |"));
    assert!(report.contains("| mean | 0.39 |"));
    assert!(report.contains("| std | 0.34 |"));
    assert!(report.contains("| min | 0.00 |"));
    assert!(report.contains("| 50% | 0.35 |"));
    assert!(report.contains("| max | 1.00 |"));

    let top = report.find("#### Top Performing States").unwrap();
    assert!(report[top..].find("| WA |").unwrap() < report[top..].find("| VIC |").unwrap());
}

#[test]
fn test_full_run_charts_are_png_files() {
    let temp_dir = workspace(SALES_CSV);
    let mut engine = engine_for(temp_dir.path(), BASE_CONFIG);

    let summary = engine.run().unwrap();

    assert_eq!(summary.charts.len(), 5);
    for outcome in &summary.charts {
        let expected = format!("reports/figures/{}", outcome.chart.file_name());
        assert_eq!(outcome.status, ChartStatus::Written(expected.clone()));

        let file = temp_dir.path().join(&expected);
        assert!(file.is_file(), "missing {}", file.display());
        let bytes = fs::read(file).unwrap();
        assert_eq!(&bytes[..4], b"\x89PNG");
    }

    let figures = fs::read_dir(temp_dir.path().join("reports/figures")).unwrap().count();
    assert_eq!(figures, 5);
}

#[test]
fn test_full_run_extra_outputs() {
    let temp_dir = workspace(SALES_CSV);
    let mut engine = engine_for(temp_dir.path(), BASE_CONFIG);

    engine.run().unwrap();

    let json: serde_json::Value = serde_json::from_str(
        &fs::read_to_string(temp_dir.path().join("reports/sales_summary.json")).unwrap(),
    )
    .unwrap();
    assert_eq!(json["record_count"], 10);
    assert_eq!(json["top_states"][0]["key"], "WA");

    let cleaned = fs::read_to_string(temp_dir.path().join("reports/cleaned_sales.csv")).unwrap();
    let last = cleaned.lines().last().unwrap();
    // Morning, Afternoon and Evening tie; the smallest label fills the gap
    assert!(last.starts_with("30-Dec-2020,Afternoon,VIC,Men,"));
    assert_eq!(cleaned.lines().count(), 11);
}

#[test]
fn test_missing_input_stops_before_output() {
    let temp_dir = TempDir::new().unwrap();
    let mut engine = engine_for(temp_dir.path(), BASE_CONFIG);

    let err = engine.run().unwrap_err();

    assert!(matches!(&err, SalesError::InputNotFound { path } if path == "data/sales.csv"));
    assert!(err.is_load_failure());
    assert!(!temp_dir.path().join("reports").exists());
}

#[test]
fn test_run_without_time_column() {
    let csv = "State,Group,Unit,Sales\nNSW,Seniors,3,10\nNSW,Women,5,30\nQLD,Seniors,,20\n";
    let temp_dir = workspace(csv);
    let mut engine = engine_for(temp_dir.path(), BASE_CONFIG);

    let summary = engine.run().unwrap();

    let time_chart = summary
        .charts
        .iter()
        .find(|c| c.chart == ChartKind::TimeOfDaySales)
        .unwrap();
    assert!(matches!(time_chart.status, ChartStatus::Skipped(_)));
    for outcome in summary.charts.iter().filter(|c| c.chart != ChartKind::TimeOfDaySales) {
        assert!(outcome.is_written(), "{:?}: {:?}", outcome.chart, outcome.status);
        assert!(temp_dir
            .path()
            .join("reports/figures")
            .join(outcome.chart.file_name())
            .is_file());
    }
    assert!(!temp_dir
        .path()
        .join("reports/figures/time_of_day_sales.png")
        .exists());

    let report = fs::read_to_string(temp_dir.path().join("reports/sales_report.md")).unwrap();
    assert!(!report.contains("### Time of Day Analysis"));
    assert!(report.contains("- Time Period: Fourth Quarter"));
    assert!(report.contains("| NSW | 1.00 |"));
    assert!(report.contains("| QLD | 0.50 |"));
}

#[test]
fn test_run_with_mapped_columns() {
    let csv = "Region;Segment;Qty;Revenue\nNorth;A;1;5\nSouth;B;2;15\n";
    let temp_dir = workspace(csv);
    let config = r#"
[input]
path = "data/sales.csv"
delimiter = ";"

[columns]
region = "Region"
customer_group = "Segment"
units = "Qty"
sales = "Revenue"
"#;
    let mut engine = engine_for(temp_dir.path(), config);

    let summary = engine.run().unwrap();

    assert!(summary.extra_outputs.is_empty());
    let report = fs::read_to_string(temp_dir.path().join("reports/sales_report.md")).unwrap();
    assert!(report.contains("| South | 1.00 |"));
    assert!(report.contains("| North | 0.00 |"));
}

#[test]
fn test_missing_column_fails_at_extract() {
    let temp_dir = workspace("State,Unit,Sales\nWA,1,2\n");
    let config = TomlConfig::from_toml_str(BASE_CONFIG).unwrap();
    let pipeline = SalesPipeline::new(LocalStorage::new(temp_dir.path()), config);

    let err = pipeline.extract().unwrap_err();

    assert!(matches!(err, SalesError::MissingColumn { ref column, .. } if column == "Group"));
    assert!(!temp_dir.path().join("reports").exists());
}
