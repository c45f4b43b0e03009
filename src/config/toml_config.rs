use crate::core::ConfigProvider;
use crate::domain::model::ColumnMap;
use crate::utils::error::{Result, SalesError};
use crate::utils::validation::{self, Validate};
use serde::{Deserialize, Serialize};
use std::path::Path;

pub const DEFAULT_DATA_PATH: &str = "data/AusApparalSales4thQrt2020.csv";
pub const DEFAULT_FIGURES_DIR: &str = "reports/figures";
pub const DEFAULT_REPORT_DIR: &str = "reports";
pub const DEFAULT_REPORT_FILE: &str = "sales_report.md";
pub const DEFAULT_REPORT_TITLE: &str = "AAL Sales Analysis Report";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TomlConfig {
    #[serde(default)]
    pub analysis: AnalysisSection,
    pub input: InputConfig,
    #[serde(default)]
    pub columns: ColumnMap,
    #[serde(default)]
    pub output: OutputConfig,
    pub charts: Option<ChartConfig>,
    pub monitoring: Option<MonitoringConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisSection {
    pub name: Option<String>,
    #[serde(default = "default_report_title")]
    pub report_title: String,
}

impl Default for AnalysisSection {
    fn default() -> Self {
        Self {
            name: None,
            report_title: default_report_title(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InputConfig {
    #[serde(default = "default_data_path")]
    pub path: String,
    pub delimiter: Option<char>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default = "default_report_dir")]
    pub report_dir: String,
    #[serde(default = "default_report_file")]
    pub report_file: String,
    #[serde(default = "default_figures_dir")]
    pub figures_dir: String,
    #[serde(default = "default_formats")]
    pub formats: Vec<String>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            report_dir: default_report_dir(),
            report_file: default_report_file(),
            figures_dir: default_figures_dir(),
            formats: default_formats(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChartConfig {
    pub width: Option<u32>,
    pub height: Option<u32>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MonitoringConfig {
    pub enabled: bool,
    pub log_level: Option<String>,
}

fn default_report_title() -> String {
    DEFAULT_REPORT_TITLE.to_string()
}

fn default_data_path() -> String {
    DEFAULT_DATA_PATH.to_string()
}

fn default_report_dir() -> String {
    DEFAULT_REPORT_DIR.to_string()
}

fn default_report_file() -> String {
    DEFAULT_REPORT_FILE.to_string()
}

fn default_figures_dir() -> String {
    DEFAULT_FIGURES_DIR.to_string()
}

fn default_formats() -> Vec<String> {
    vec!["markdown".to_string()]
}

impl TomlConfig {
    /// 從 TOML 檔案載入配置
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(|e| SalesError::ConfigError {
            message: format!("cannot read {}: {}", path.as_ref().display(), e),
        })?;
        Self::from_toml_str(&content)
    }

    /// 從 TOML 字串解析配置
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;

        toml::from_str(&processed_content).map_err(|e| SalesError::ConfigValidationError {
            field: "toml_parsing".to_string(),
            message: format!("TOML parsing error: {}", e),
        })
    }

    /// 替換環境變數 (例如 ${DATA_DIR})，未設定的變數保持原樣
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = regex::Regex::new(r"\$\{([^}]+)\}").map_err(|e| SalesError::ConfigError {
            message: e.to_string(),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// 驗證配置的合理性
    pub fn validate_config(&self) -> Result<()> {
        validation::validate_path("input.path", &self.input.path)?;
        validation::validate_path("output.report_dir", &self.output.report_dir)?;
        validation::validate_path("output.figures_dir", &self.output.figures_dir)?;
        validation::validate_non_empty_string("output.report_file", &self.output.report_file)?;
        validation::validate_output_formats("output.formats", &self.output.formats)?;
        validation::validate_distinct_columns("columns", &self.columns.all())?;

        if let Some(delimiter) = self.input.delimiter {
            validation::validate_delimiter("input.delimiter", delimiter)?;
        }

        if let Some(level) = self.log_level() {
            validation::validate_log_level("monitoring.log_level", level)?;
        }

        if let Some(charts) = &self.charts {
            if let Some(width) = charts.width {
                validation::validate_positive_number("charts.width", width, 100)?;
            }
            if let Some(height) = charts.height {
                validation::validate_positive_number("charts.height", height, 100)?;
            }
        }

        Ok(())
    }

    pub fn monitoring_enabled(&self) -> bool {
        self.monitoring.as_ref().map(|m| m.enabled).unwrap_or(false)
    }

    pub fn log_level(&self) -> Option<&str> {
        self.monitoring.as_ref().and_then(|m| m.log_level.as_deref())
    }
}

impl ConfigProvider for TomlConfig {
    fn data_path(&self) -> &str {
        &self.input.path
    }

    fn figures_dir(&self) -> &str {
        &self.output.figures_dir
    }

    fn report_dir(&self) -> &str {
        &self.output.report_dir
    }

    fn report_file(&self) -> &str {
        &self.output.report_file
    }

    fn report_title(&self) -> &str {
        &self.analysis.report_title
    }

    fn columns(&self) -> &ColumnMap {
        &self.columns
    }

    fn delimiter(&self) -> u8 {
        // 已在 validate 中確認為 ASCII
        self.input.delimiter.map(|c| c as u8).unwrap_or(b',')
    }

    fn output_formats(&self) -> &[String] {
        &self.output.formats
    }

    fn chart_size(&self) -> (u32, u32) {
        let charts = self.charts.as_ref();
        (
            charts.and_then(|c| c.width).unwrap_or(1200),
            charts.and_then(|c| c.height).unwrap_or(600),
        )
    }
}

impl Validate for TomlConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_parse_minimal_toml_config() {
        let toml_content = r#"
[input]
path = "data/q4.csv"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.data_path(), "data/q4.csv");
        assert_eq!(config.report_dir(), "reports");
        assert_eq!(config.figures_dir(), "reports/figures");
        assert_eq!(config.report_file(), "sales_report.md");
        assert_eq!(config.output_formats(), &["markdown".to_string()]);
        assert_eq!(config.columns(), &ColumnMap::default());
        assert_eq!(config.delimiter(), b',');
        assert_eq!(config.chart_size(), (1200, 600));
        assert!(!config.monitoring_enabled());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_full_toml_config() {
        let toml_content = r#"
[analysis]
name = "q4-2020"
report_title = "Q4 Sales"

[input]
path = "in.tsv"
delimiter = ";"

[columns]
region = "Region"
customer_group = "CustomerGroup"
units = "UnitCount"
sales = "SalesAmount"
time_of_day = "TimeOfDay"

[output]
report_dir = "out"
figures_dir = "out/img"
formats = ["markdown", "json"]

[charts]
width = 800
height = 400

[monitoring]
enabled = true
log_level = "debug"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();

        assert_eq!(config.report_title(), "Q4 Sales");
        assert_eq!(config.delimiter(), b';');
        assert_eq!(config.columns().region, "Region");
        // unspecified mapping keeps its default
        assert_eq!(config.columns().date, "Date");
        assert!(config.wants_format("json"));
        assert!(!config.wants_format("csv"));
        assert_eq!(config.chart_size(), (800, 400));
        assert!(config.monitoring_enabled());
        assert_eq!(config.log_level(), Some("debug"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("SALES_TEST_DATA_DIR", "/srv/sales");

        let toml_content = r#"
[input]
path = "${SALES_TEST_DATA_DIR}/q4.csv"
"#;

        let config = TomlConfig::from_toml_str(toml_content).unwrap();
        assert_eq!(config.input.path, "/srv/sales/q4.csv");

        std::env::remove_var("SALES_TEST_DATA_DIR");
    }

    #[test]
    fn test_config_validation() {
        let bad_format = r#"
[input]
path = "data.csv"

[output]
formats = ["pdf"]
"#;
        let config = TomlConfig::from_toml_str(bad_format).unwrap();
        assert!(config.validate().is_err());

        let aliased_columns = r#"
[input]
path = "data.csv"

[columns]
region = "Sales"
"#;
        let config = TomlConfig::from_toml_str(aliased_columns).unwrap();
        assert!(config.validate().is_err());

        let bad_level = r#"
[input]
path = "data.csv"

[monitoring]
enabled = false
log_level = "loud"
"#;
        let config = TomlConfig::from_toml_str(bad_level).unwrap();
        assert!(config.validate().is_err());

        let tiny_chart = r#"
[input]
path = "data.csv"

[charts]
width = 10
"#;
        let config = TomlConfig::from_toml_str(tiny_chart).unwrap();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[analysis]\nreport_title = \"From File\"\n\n[input]\npath = \"x.csv\"\n")
            .unwrap();

        let config = TomlConfig::from_file(temp_file.path()).unwrap();
        assert_eq!(config.report_title(), "From File");
    }

    #[test]
    fn test_missing_config_file() {
        let err = TomlConfig::from_file("/nonexistent/sales.toml").unwrap_err();
        assert!(matches!(err, SalesError::ConfigError { .. }));
    }
}
