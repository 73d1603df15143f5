use async_trait::async_trait;
use reqwest::multipart::{Form, Part};
use reqwest::{Client, StatusCode};
use std::time::Duration;
use thiserror::Error;
use tracing::{debug, error};

use super::types::{DocumentRef, JobId, PageRange, SubmitReceipt, SummaryResult, PDF_MIME};

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("HTTP request error: {0}")]
    Request(#[from] reqwest::Error),

    #[error("API error: {status}: {body}")]
    Status { status: StatusCode, body: String },

    #[error("malformed response: {0}")]
    MalformedResponse(String),

    #[error("failed to read document: {0}")]
    Io(#[from] std::io::Error),
}

impl ApiError {
    /// True when the server answered 404, i.e. the summary does not exist yet.
    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::Status { status, .. } if *status == StatusCode::NOT_FOUND)
    }
}

/// The two operations the summarization service exposes. Orchestrators are
/// written against this trait so tests can substitute an in-memory fake.
#[async_trait]
pub trait SummaryService: Send + Sync {
    /// Uploads the document with its page bounds and returns the job id
    /// the summary can later be fetched under.
    async fn submit_for_summary(
        &self,
        document: &DocumentRef,
        range: &PageRange,
    ) -> Result<JobId, ApiError>;

    /// Fetches the finished summary for a job id.
    async fn fetch_summary(&self, id: &JobId) -> Result<SummaryResult, ApiError>;
}

pub struct RetellerClient {
    client: Client,
    base_url: String,
}

impl RetellerClient {
    pub fn new(base_url: impl Into<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .expect("Failed to create HTTP client");

        let base_url = base_url.into();
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl SummaryService for RetellerClient {
    async fn submit_for_summary(
        &self,
        document: &DocumentRef,
        range: &PageRange,
    ) -> Result<JobId, ApiError> {
        let bytes = tokio::fs::read(&document.path).await?;
        debug!(
            "Uploading {} ({} bytes) to {}/summarize",
            document.name,
            bytes.len(),
            self.base_url
        );

        let part = Part::bytes(bytes)
            .file_name(document.name.clone())
            .mime_str(PDF_MIME)?;
        let mut form = Form::new().part("file", part);
        for (name, value) in page_fields(range) {
            form = form.text(name, value);
        }

        let response = self
            .client
            .post(format!("{}/summarize", self.base_url))
            .multipart(form)
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            error!("Summarize request failed with status {}: {}", status, body);
            return Err(ApiError::Status { status, body });
        }

        let body = response.text().await?;
        parse_submit_receipt(&body)
    }

    async fn fetch_summary(&self, id: &JobId) -> Result<SummaryResult, ApiError> {
        debug!("Fetching summary {} from {}", id, self.base_url);

        let response = self
            .client
            .get(format!("{}/summary/{}", self.base_url, id))
            .send()
            .await?;

        if !response.status().is_success() {
            let status = response.status();
            let body = response.text().await.unwrap_or_default();
            return Err(ApiError::Status { status, body });
        }

        let body = response.text().await?;
        parse_summary(&body)
    }
}

// The start bound is always sent; an unbounded end is omitted entirely
// rather than sent empty.
fn page_fields(range: &PageRange) -> Vec<(&'static str, String)> {
    let mut fields = vec![("start_page", range.start.to_string())];
    if let Some(end) = range.end {
        fields.push(("end_page", end.to_string()));
    }
    fields
}

fn parse_submit_receipt(body: &str) -> Result<JobId, ApiError> {
    let receipt: SubmitReceipt = serde_json::from_str(body)
        .map_err(|e| ApiError::MalformedResponse(format!("expected a file_id field: {}", e)))?;
    Ok(JobId::new(receipt.file_id))
}

fn parse_summary(body: &str) -> Result<SummaryResult, ApiError> {
    serde_json::from_str(body)
        .map_err(|e| ApiError::MalformedResponse(format!("expected a summary field: {}", e)))
}
