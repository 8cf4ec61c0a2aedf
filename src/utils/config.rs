use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub api: ApiConfig,
    pub columns: ColumnConfig,
    pub pipeline: PipelineConfig,
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    pub endpoint: String,
    pub timeout_seconds: u64,
    /// Replaces the executable fingerprint sent as `hash` when set.
    pub identity_token: Option<String>,
}

/// Column identifiers agreed with whatever produces the spreadsheet.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct ColumnConfig {
    pub before: String,
    pub after: String,
    pub status: String,
    pub class: String,
    pub number: String,
    pub name: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    pub poll_interval_ms: u64,
    /// When set, results go to `<stem><suffix>.<ext>` next to the input instead of in place.
    pub output_suffix: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080/api/verify".to_string(),
            timeout_seconds: 30,
            identity_token: None,
        }
    }
}

impl Default for ColumnConfig {
    fn default() -> Self {
        Self {
            before: "before".to_string(),
            after: "after".to_string(),
            status: "status".to_string(),
            class: "class".to_string(),
            number: "number".to_string(),
            name: "name".to_string(),
        }
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: 100,
            output_suffix: None,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl AppConfig {
    pub fn load_from_file(path: &str) -> crate::utils::errors::Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| crate::utils::errors::VerifierError::ConfigError(e.to_string()))?;
        toml::from_str(&content)
            .map_err(|e| crate::utils::errors::VerifierError::ConfigError(e.to_string()))
    }

    pub fn load_or_default(path: Option<&str>) -> Self {
        if let Some(p) = path {
            match Self::load_from_file(p) {
                Ok(config) => config,
                Err(e) => {
                    tracing::warn!(path = p, error = %e, "Falling back to default configuration");
                    Self::default()
                }
            }
        } else {
            Self::default()
        }
    }

    /// Where results for `input` are written.
    pub fn output_path_for(&self, input: &Path) -> PathBuf {
        match &self.pipeline.output_suffix {
            Some(suffix) => output_path_for(input, suffix),
            None => input.to_path_buf(),
        }
    }
}

pub fn output_path_for(input: &Path, suffix: &str) -> PathBuf {
    let stem = input
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let file_name = match input.extension() {
        Some(ext) => format!("{}{}.{}", stem, suffix, ext.to_string_lossy()),
        None => format!("{}{}", stem, suffix),
    };
    input.with_file_name(file_name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn partial_toml_keeps_defaults() {
        let config: AppConfig = toml::from_str(
            r#"
            [api]
            endpoint = "http://verifier.local/check"

            [columns]
            before = "original"
            "#,
        )
        .unwrap();

        assert_eq!(config.api.endpoint, "http://verifier.local/check");
        assert_eq!(config.api.timeout_seconds, 30);
        assert_eq!(config.columns.before, "original");
        assert_eq!(config.columns.after, "after");
        assert_eq!(config.pipeline.poll_interval_ms, 100);
    }

    #[test]
    fn derived_output_path() {
        let path = output_path_for(Path::new("/data/essays.csv"), "_result");
        assert_eq!(path, PathBuf::from("/data/essays_result.csv"));

        let path = output_path_for(Path::new("essays"), "_result");
        assert_eq!(path, PathBuf::from("essays_result"));
    }

    #[test]
    fn missing_file_falls_back() {
        let config = AppConfig::load_or_default(Some("/nonexistent/config.toml"));
        assert_eq!(config.columns, ColumnConfig::default());
        assert_eq!(
            config.output_path_for(Path::new("a.csv")),
            PathBuf::from("a.csv")
        );
    }
}
