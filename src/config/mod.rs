//! Runtime configuration: model access (`config/ai.json`) and scoring defaults
//! (`config/analysis.toml`). Both are explicit values handed to the pipeline;
//! nothing here is global.

pub mod ai;
pub mod analysis;

pub use ai::AiConfig;
pub use analysis::AnalysisDefaults;
