use crate::core::aggregate::TOP_N;
use crate::domain::model::{Aggregates, ChartKind, ChartOutcome, ChartStatus, GroupValue, SalesTable};

pub struct ReportInput<'a> {
    pub title: &'a str,
    pub table: &'a SalesTable,
    pub aggregates: &'a Aggregates,
    pub charts: &'a [ChartOutcome],
    pub figures_dir: &'a str,
}

fn push_table(lines: &mut Vec<String>, key_header: &str, value_header: &str, rows: &[GroupValue]) {
    lines.push(format!("| {} | {} |", key_header, value_header));
    lines.push("|-------|-------|".to_string());
    for row in rows {
        lines.push(format!("| {} | {:.2} |", row.key, row.value));
    }
}

fn chart_line(index: usize, chart: ChartKind, outcome: Option<&ChartOutcome>) -> String {
    let status = match outcome.map(|o| &o.status) {
        Some(ChartStatus::Written(_)) => format!("`{}`", chart.file_name()),
        Some(ChartStatus::Skipped(reason)) => format!("skipped: {}", reason),
        Some(ChartStatus::Failed(_)) | None => "not generated".to_string(),
    };
    format!("{}. {} ({})", index, chart.title(), status)
}

/// Renders the Markdown report. Output depends only on the inputs.
pub fn render_report(input: &ReportInput<'_>) -> String {
    let aggregates = input.aggregates;
    let mut lines = vec![format!("# {}", input.title), String::new()];

    lines.push("## Executive Summary".to_string());
    lines.push("This report analyzes the sales data for the fourth quarter, providing insights into state-wise and group-wise performance.".to_string());
    lines.push(String::new());

    let period = match aggregates.date_range {
        Some((start, end)) => format!("{} to {}", start.format("%Y-%m-%d"), end.format("%Y-%m-%d")),
        None => "Fourth Quarter".to_string(),
    };
    lines.push("## Data Overview".to_string());
    lines.push(format!("- Total Records: {}", input.table.len()));
    lines.push(format!("- Time Period: {}", period));
    lines.push(format!("- States Analyzed: {}", aggregates.state_wise.len()));
    lines.push(format!("- Customer Groups: {}", aggregates.group_wise.len()));
    lines.push(String::new());

    lines.push("## Key Findings".to_string());
    lines.push("### State Performance".to_string());
    lines.push("#### Top Performing States".to_string());
    push_table(&mut lines, "State", "Sales", &aggregates.state_wise.top(TOP_N));
    lines.push(String::new());
    lines.push("#### Lowest Performing States".to_string());
    push_table(&mut lines, "State", "Sales", &aggregates.state_wise.bottom(TOP_N));
    lines.push(String::new());

    lines.push("### Customer Group Analysis".to_string());
    lines.push("Group-wise sales distribution:".to_string());
    push_table(&mut lines, "Group", "Sales", &aggregates.group_wise.sorted_desc());
    lines.push(String::new());

    if let Some(time_wise) = &aggregates.time_wise {
        lines.push("### Time of Day Analysis".to_string());
        lines.push("Peak sales times by average sales:".to_string());
        push_table(&mut lines, "Time", "Average Sales", &time_wise.top(TOP_N));
        lines.push(String::new());
    }

    lines.push("## Recommendations".to_string());
    lines.push("1. Focus Areas:".to_string());
    lines.push("   - Implement targeted marketing in low-performing states".to_string());
    lines.push("   - Develop special promotions for underperforming customer groups".to_string());
    lines.push("   - Optimize inventory based on state-wise demand".to_string());
    lines.push(String::new());
    lines.push("2. Growth Strategies:".to_string());
    lines.push("   - Analyze and replicate successful practices from top-performing states".to_string());
    lines.push("   - Develop customer retention programs".to_string());
    lines.push("   - Enhance online sales channels".to_string());
    lines.push(String::new());

    lines.push("## Statistical Analysis".to_string());
    lines.push("### Sales Statistics".to_string());
    lines.push("| Metric | Value |".to_string());
    lines.push("|--------|-------|".to_string());
    for (metric, value) in aggregates.sales_stats.rows() {
        lines.push(format!("| {} | {:.2} |", metric, value));
    }
    lines.push(String::new());

    lines.push("## Visualizations".to_string());
    lines.push(format!(
        "The following visualizations were generated in `{}`:",
        input.figures_dir
    ));
    for (idx, chart) in ChartKind::ALL.iter().enumerate() {
        let outcome = input.charts.iter().find(|o| o.chart == *chart);
        lines.push(chart_line(idx + 1, *chart, outcome));
    }

    let mut report = lines.join("\n");
    report.push('\n');
    report
}
