use crate::core::charts::{self, ChartOptions};
use crate::core::loader::{self, LoaderOptions};
use crate::core::report::{self, ReportInput};
use crate::core::{aggregate, cleaner, export, quality};
use crate::core::{AnalysisResult, ConfigProvider, ExtractResult, Pipeline, RunSummary, Storage};
use crate::domain::model::SalesTable;
use crate::utils::error::Result;
use std::path::Path;

pub const SUMMARY_JSON_FILE: &str = "sales_summary.json";
pub const CLEANED_CSV_FILE: &str = "cleaned_sales.csv";

pub struct SalesPipeline<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
}

impl<S: Storage, C: ConfigProvider> SalesPipeline<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self { storage, config }
    }

    fn report_path(&self, file: &str) -> String {
        Path::new(self.config.report_dir())
            .join(file)
            .to_string_lossy()
            .into_owned()
    }

    fn write_output(&self, file: &str, data: &[u8]) -> Result<String> {
        let path = self.report_path(file);
        tracing::debug!("Writing {} ({} bytes)", path, data.len());
        self.storage.write_file(&path, data)?;
        Ok(path)
    }
}

impl<S: Storage, C: ConfigProvider> Pipeline for SalesPipeline<S, C> {
    fn extract(&self) -> Result<ExtractResult> {
        let columns = self.config.columns();
        let options = LoaderOptions {
            delimiter: self.config.delimiter(),
            numeric_columns: columns.numeric().iter().map(|c| c.to_string()).collect(),
        };

        tracing::debug!("Reading dataset from: {}", self.config.data_path());
        let table = loader::load_dataset(&self.storage, self.config.data_path(), &options)?;
        loader::validate_columns(&table, columns)?;

        let quality = quality::inspect(&table);
        Ok(ExtractResult { table, quality })
    }

    fn transform(&self, extracted: ExtractResult) -> Result<AnalysisResult> {
        let columns = self.config.columns();
        let cleaned = cleaner::clean(&extracted.table, &columns.numeric())?;
        let sales = SalesTable::from_table(&cleaned.table, columns)?;
        let aggregates = aggregate::aggregate(&sales);

        Ok(AnalysisResult {
            quality: extracted.quality,
            cleaned,
            sales,
            aggregates,
        })
    }

    fn load(&self, analysis: &AnalysisResult) -> Result<RunSummary> {
        let (width, height) = self.config.chart_size();
        let chart_options = ChartOptions {
            figures_dir: self.config.figures_dir().to_string(),
            width,
            height,
        };
        let chart_outcomes = charts::render_charts(
            &analysis.sales,
            &analysis.aggregates,
            &chart_options,
            &self.storage,
        );

        tracing::info!("📝 Generating analysis report...");
        let report = report::render_report(&ReportInput {
            title: self.config.report_title(),
            table: &analysis.sales,
            aggregates: &analysis.aggregates,
            charts: &chart_outcomes,
            figures_dir: self.config.figures_dir(),
        });
        let report_path = self.write_output(self.config.report_file(), report.as_bytes())?;
        tracing::info!("📄 Report generated and saved as: {}", report_path);

        let mut extra_outputs = Vec::new();
        if self.config.wants_format("json") {
            let json = export::summary_json(analysis)?;
            extra_outputs.push(self.write_output(SUMMARY_JSON_FILE, json.as_bytes())?);
        }
        if self.config.wants_format("csv") {
            let csv = export::cleaned_csv(&analysis.cleaned.table)?;
            extra_outputs.push(self.write_output(CLEANED_CSV_FILE, &csv)?);
        }

        Ok(RunSummary {
            report_path,
            charts: chart_outcomes,
            extra_outputs,
        })
    }
}
