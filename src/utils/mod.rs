pub mod config;
pub mod errors;

pub use config::{output_path_for, ApiConfig, AppConfig, ColumnConfig, PipelineConfig};
pub use errors::{Result, VerifierError};
