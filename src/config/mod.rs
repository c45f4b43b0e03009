pub mod toml_config;

#[cfg(feature = "cli")]
pub use cli_config::CliConfig;

#[cfg(feature = "cli")]
mod cli_config {
    use super::toml_config::{
        DEFAULT_DATA_PATH, DEFAULT_FIGURES_DIR, DEFAULT_REPORT_DIR, DEFAULT_REPORT_FILE,
        DEFAULT_REPORT_TITLE,
    };
    use crate::core::ConfigProvider;
    use crate::domain::model::ColumnMap;
    use crate::utils::error::Result;
    use crate::utils::validation::{self, Validate};
    use clap::Parser;
    use serde::{Deserialize, Serialize};

    #[derive(Debug, Clone, Serialize, Deserialize, Parser)]
    #[command(name = "sales-analysis")]
    #[command(about = "Quarterly retail sales analysis: clean, aggregate, chart and report")]
    pub struct CliConfig {
        #[arg(long, default_value = DEFAULT_DATA_PATH)]
        pub data_path: String,

        #[arg(long, default_value = DEFAULT_FIGURES_DIR)]
        pub figures_dir: String,

        #[arg(long, default_value = DEFAULT_REPORT_DIR)]
        pub report_dir: String,

        #[arg(long, default_value = DEFAULT_REPORT_FILE)]
        pub report_file: String,

        #[arg(long, default_value = DEFAULT_REPORT_TITLE)]
        pub report_title: String,

        #[arg(long, default_value = ",")]
        pub delimiter: char,

        #[arg(
            long,
            value_delimiter = ',',
            default_value = "markdown",
            help = "Comma separated: markdown, json, csv"
        )]
        pub output_formats: Vec<String>,

        #[arg(long, default_value = "1200")]
        pub chart_width: u32,

        #[arg(long, default_value = "600")]
        pub chart_height: u32,

        #[arg(long, help = "Load settings from a TOML file instead of flags")]
        pub config: Option<String>,

        #[arg(long, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, help = "Emit logs as JSON")]
        pub log_json: bool,

        #[arg(long, help = "Log CPU and memory usage per stage")]
        pub monitor: bool,

        #[arg(skip)]
        #[serde(default)]
        pub columns: ColumnMap,
    }

    impl ConfigProvider for CliConfig {
        fn data_path(&self) -> &str {
            &self.data_path
        }

        fn figures_dir(&self) -> &str {
            &self.figures_dir
        }

        fn report_dir(&self) -> &str {
            &self.report_dir
        }

        fn report_file(&self) -> &str {
            &self.report_file
        }

        fn report_title(&self) -> &str {
            &self.report_title
        }

        fn columns(&self) -> &ColumnMap {
            &self.columns
        }

        fn delimiter(&self) -> u8 {
            self.delimiter as u8
        }

        fn output_formats(&self) -> &[String] {
            &self.output_formats
        }

        fn chart_size(&self) -> (u32, u32) {
            (self.chart_width, self.chart_height)
        }
    }

    impl Validate for CliConfig {
        fn validate(&self) -> Result<()> {
            validation::validate_path("data_path", &self.data_path)?;
            validation::validate_path("figures_dir", &self.figures_dir)?;
            validation::validate_path("report_dir", &self.report_dir)?;
            validation::validate_non_empty_string("report_file", &self.report_file)?;
            validation::validate_delimiter("delimiter", self.delimiter)?;
            validation::validate_output_formats("output_formats", &self.output_formats)?;
            validation::validate_positive_number("chart_width", self.chart_width, 100)?;
            validation::validate_positive_number("chart_height", self.chart_height, 100)?;
            Ok(())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        #[test]
        fn test_cli_defaults() {
            let config = CliConfig::parse_from(["sales-analysis"]);

            assert_eq!(config.data_path(), "data/AusApparalSales4thQrt2020.csv");
            assert_eq!(config.figures_dir(), "reports/figures");
            assert_eq!(config.report_dir(), "reports");
            assert_eq!(config.report_file(), "sales_report.md");
            assert_eq!(config.output_formats(), &["markdown".to_string()]);
            assert_eq!(config.delimiter(), b',');
            assert_eq!(config.chart_size(), (1200, 600));
            assert!(config.config.is_none());
            assert!(config.validate().is_ok());
        }

        #[test]
        fn test_cli_output_formats_are_comma_separated() {
            let config = CliConfig::parse_from([
                "sales-analysis",
                "--output-formats",
                "markdown,json,csv",
                "--data-path",
                "q4.csv",
            ]);

            assert!(config.wants_format("json"));
            assert!(config.wants_format("csv"));
            assert_eq!(config.data_path(), "q4.csv");
        }

        #[test]
        fn test_cli_rejects_unknown_format() {
            let config = CliConfig::parse_from(["sales-analysis", "--output-formats", "pdf"]);
            assert!(config.validate().is_err());
        }

        #[test]
        fn test_cli_rejects_small_chart() {
            let config = CliConfig::parse_from(["sales-analysis", "--chart-width", "10"]);
            assert!(config.validate().is_err());
        }
    }
}
