use crate::core::aggregate::TOP_N;
use crate::domain::model::{
    AnalysisResult, ColumnScale, ColumnValues, DataTable, DescriptiveStats, GroupValue,
    GroupedAggregate, Imputation, QualityReport,
};
use crate::utils::error::{Result, SalesError};
use serde::Serialize;

#[derive(Debug, Serialize)]
struct AnalysisSummary<'a> {
    record_count: usize,
    total_sales: f64,
    quality: &'a QualityReport,
    imputations: &'a [Imputation],
    scaling: &'a [ColumnScale],
    state_wise: &'a GroupedAggregate,
    top_states: Vec<GroupValue>,
    bottom_states: Vec<GroupValue>,
    group_wise: Vec<GroupValue>,
    time_wise: Option<&'a GroupedAggregate>,
    peak_times: Vec<GroupValue>,
    unit_stats: &'a DescriptiveStats,
    sales_stats: &'a DescriptiveStats,
}

/// Machine-readable companion to the Markdown report.
pub fn summary_json(analysis: &AnalysisResult) -> Result<String> {
    let aggregates = &analysis.aggregates;
    let summary = AnalysisSummary {
        record_count: analysis.sales.len(),
        total_sales: aggregates.total_sales,
        quality: &analysis.quality,
        imputations: &analysis.cleaned.imputations,
        scaling: &analysis.cleaned.scaling,
        state_wise: &aggregates.state_wise,
        top_states: aggregates.state_wise.top(TOP_N),
        bottom_states: aggregates.state_wise.bottom(TOP_N),
        group_wise: aggregates.group_wise.sorted_desc(),
        time_wise: aggregates.time_wise.as_ref(),
        peak_times: aggregates
            .time_wise
            .as_ref()
            .map(|t| t.top(TOP_N))
            .unwrap_or_default(),
        unit_stats: &aggregates.unit_stats,
        sales_stats: &aggregates.sales_stats,
    };
    Ok(serde_json::to_string_pretty(&summary)?)
}

/// Writes the cleaned, scaled table back out as CSV with the original headers.
pub fn cleaned_csv(table: &DataTable) -> Result<Vec<u8>> {
    let mut wtr = csv::Writer::from_writer(Vec::new());
    wtr.write_record(table.column_names())?;

    for row in 0..table.row_count() {
        let record: Vec<String> = table
            .columns()
            .iter()
            .map(|column| match &column.values {
                ColumnValues::Numeric(values) => {
                    values[row].map(|v| v.to_string()).unwrap_or_default()
                }
                ColumnValues::Categorical(values) => values[row].clone().unwrap_or_default(),
            })
            .collect();
        wtr.write_record(&record)?;
    }

    wtr.into_inner()
        .map_err(|e| SalesError::IoError(e.into_error()))
}
