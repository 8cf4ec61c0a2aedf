//! Shared fixtures for pipeline integration tests.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use text_verifier::utils::ColumnConfig;
use text_verifier::{
    CorrectionClient, CorrectionRequest, CorrectionResponse, Result, RowStore, VerifierError,
};
use tokio::sync::Notify;

pub const TOKEN: &str = "test-token";

/// Correction service double driven by the row text:
/// `decline:*` is refused by the service, `broken:*` fails in transport,
/// `invalid:*` fails with a non-transport error, `block:*` waits for [`ScriptedClient::release`] and everything else is
/// accepted and upper-cased.
#[derive(Default)]
pub struct ScriptedClient {
    calls: Mutex<Vec<CorrectionRequest>>,
    pub entered: Notify,
    pub release: Notify,
}

impl ScriptedClient {
    pub fn contents(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.content.clone())
            .collect()
    }

    pub fn hashes(&self) -> Vec<String> {
        self.calls
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.hash.clone())
            .collect()
    }
}

impl CorrectionClient for ScriptedClient {
    async fn correct(&self, request: &CorrectionRequest) -> Result<CorrectionResponse> {
        self.calls.lock().unwrap().push(request.clone());

        if request.content.starts_with("block:") {
            self.entered.notify_one();
            self.release.notified().await;
        }

        if request.content.starts_with("broken:") {
            return Err(VerifierError::ApiError {
                status: 503,
                body: "unavailable".to_string(),
            });
        }

        if request.content.starts_with("invalid:") {
            return Err(VerifierError::ConfigError(format!(
                "cannot submit {}",
                request.content
            )));
        }

        if request.content.starts_with("decline:") {
            return Ok(CorrectionResponse {
                success: false,
                message: format!("declined: {}", request.content),
            });
        }

        Ok(CorrectionResponse {
            success: true,
            message: request.content.to_uppercase(),
        })
    }
}

/// Writes a sheet with `name,before` columns only.
pub fn write_sheet(dir: &Path, file: &str, befores: &[&str]) -> PathBuf {
    let path = dir.join(file);
    let mut writer = csv::Writer::from_path(&path).unwrap();
    writer.write_record(["name", "before"]).unwrap();
    for (i, before) in befores.iter().enumerate() {
        writer
            .write_record([format!("student{}", i + 1).as_str(), *before])
            .unwrap();
    }
    writer.flush().unwrap();
    path
}

pub fn load(path: &Path) -> RowStore {
    RowStore::load(path, &ColumnConfig::default()).unwrap()
}
