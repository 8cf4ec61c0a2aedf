use crate::utils::{ApiConfig, Result, VerifierError};
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::future::Future;
use std::time::Duration;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionRequest {
    pub hash: String,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CorrectionResponse {
    pub success: bool,
    pub message: String,
}

/// One request per row against the correction service.
///
/// `Ok` means the service answered, whether or not it accepted the text.
/// `Err` is reserved for a broken channel: network errors, timeouts, non-200
/// statuses and bodies that do not parse.
pub trait CorrectionClient: Send + Sync + 'static {
    fn correct(
        &self,
        request: &CorrectionRequest,
    ) -> impl Future<Output = Result<CorrectionResponse>> + Send;
}

pub struct HttpCorrectionClient {
    client: Client,
    endpoint: String,
}

impl HttpCorrectionClient {
    pub fn new(config: &ApiConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_seconds))
            .build()?;

        Ok(Self {
            client,
            endpoint: config.endpoint.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

impl CorrectionClient for HttpCorrectionClient {
    async fn correct(&self, request: &CorrectionRequest) -> Result<CorrectionResponse> {
        let response = self
            .client
            .post(&self.endpoint)
            .header("Content-Type", "application/json")
            .json(request)
            .send()
            .await?;

        let status = response.status();
        if status != StatusCode::OK {
            let body = response.text().await.unwrap_or_default();
            return Err(VerifierError::ApiError {
                status: status.as_u16(),
                body,
            });
        }

        let body = response.text().await?;
        serde_json::from_str(&body).map_err(|e| VerifierError::MalformedResponse(e.to_string()))
    }
}
