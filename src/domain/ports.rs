use crate::domain::model::{AnalysisResult, ColumnMap, ExtractResult, RunSummary};
use crate::utils::error::Result;

pub trait Storage {
    fn read_file(&self, path: &str) -> Result<Vec<u8>>;
    fn write_file(&self, path: &str, data: &[u8]) -> Result<()>;
}

pub trait ConfigProvider {
    fn data_path(&self) -> &str;
    fn figures_dir(&self) -> &str;
    fn report_dir(&self) -> &str;
    fn report_file(&self) -> &str;
    fn report_title(&self) -> &str;
    fn columns(&self) -> &ColumnMap;
    fn delimiter(&self) -> u8;
    fn output_formats(&self) -> &[String];
    fn chart_size(&self) -> (u32, u32);

    fn wants_format(&self, format: &str) -> bool {
        self.output_formats().iter().any(|f| f == format)
    }
}

/// Three-phase analysis run: extract (load + inspect), transform
/// (clean + aggregate), load (charts + report).
pub trait Pipeline {
    fn extract(&self) -> Result<ExtractResult>;
    fn transform(&self, extracted: ExtractResult) -> Result<AnalysisResult>;
    fn load(&self, analysis: &AnalysisResult) -> Result<RunSummary>;
}
