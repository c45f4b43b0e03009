pub mod aggregate;
pub mod charts;
pub mod cleaner;
pub mod engine;
pub mod export;
pub mod loader;
pub mod pipeline;
pub mod quality;
pub mod report;
pub mod stats;

pub use crate::domain::model::{AnalysisResult, ExtractResult, RunSummary};
pub use crate::domain::ports::{ConfigProvider, Pipeline, Storage};
pub use crate::utils::error::Result;
