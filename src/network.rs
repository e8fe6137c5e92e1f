use std::time::Duration;

use crate::error::AnalysisError;
use crate::models::{AnalysisRequest, AnalysisResult};

pub const ANALYZE_PATH: &str = "/api/analyze/";

/// Thin wrapper around the one call the analysis service exposes.
#[derive(Debug, Clone)]
pub struct AnalysisClient {
    http: reqwest::Client,
    api_base: String,
}

impl AnalysisClient {
    pub fn new(api_base: &str, timeout: Option<Duration>) -> Result<Self, AnalysisError> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self { http: builder.build()?, api_base: api_base.trim_end_matches('/').to_string() })
    }

    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    pub fn endpoint(&self) -> String {
        format!("{}{}", self.api_base, ANALYZE_PATH)
    }

    /// Posts `{subject, comments}` and returns the parsed result or a typed failure.
    pub async fn analyze(&self, request: &AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        let endpoint = self.endpoint();
        tracing::info!(
            subject = %request.subject,
            comments = request.comments.len(),
            endpoint = %endpoint,
            "Submitting comments for analysis"
        );

        let response = self.http.post(&endpoint).json(request).send().await?;
        let status = response.status();
        let body = response.bytes().await?;

        if !status.is_success() {
            return Err(AnalysisError::from_status(status, &body));
        }
        AnalysisResult::from_body(&body)
    }
}
