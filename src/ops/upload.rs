use thiserror::Error;
use tracing::info;

use crate::api::client::{ApiError, SummaryService};
use crate::api::types::{DocumentRef, JobId, PageRange};

#[derive(Error, Debug)]
pub enum UploadError {
    #[error("no file selected")]
    NoFile,

    #[error("invalid start page {0:?}")]
    BadStart(String),

    #[error("invalid end page {0:?}")]
    BadEnd(String),

    #[error("end page {end} is before start page {start}")]
    BadRange { start: u32, end: u32 },

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Validates the picked document and the raw page-bound strings, then
/// submits the file for summarization. Exactly one transport call is made
/// per invocation and only after every check has passed; there is no retry.
///
/// An empty end bound means "through the last page".
pub async fn submit(
    service: &dyn SummaryService,
    document: Option<&DocumentRef>,
    start_page: &str,
    end_page: &str,
) -> Result<JobId, UploadError> {
    let document = document.ok_or(UploadError::NoFile)?;

    let start: u32 = start_page
        .trim()
        .parse()
        .map_err(|_| UploadError::BadStart(start_page.to_string()))?;

    let end = match end_page.trim() {
        "" => None,
        text => Some(
            text.parse::<u32>()
                .map_err(|_| UploadError::BadEnd(end_page.to_string()))?,
        ),
    };

    if let Some(end) = end {
        if end < start {
            return Err(UploadError::BadRange { start, end });
        }
    }

    let range = PageRange { start, end };
    info!(
        "Submitting {} (start_page={}, end_page={:?})",
        document.name, range.start, range.end
    );

    let id = service.submit_for_summary(document, &range).await?;
    info!("Upload accepted, job id {}", id);
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::types::SummaryResult;
    use async_trait::async_trait;
    use reqwest::StatusCode;
    use std::sync::Mutex;

    struct RecordingService {
        submissions: Mutex<Vec<(String, PageRange)>>,
        fail_with_status: Option<StatusCode>,
    }

    impl RecordingService {
        fn new() -> Self {
            Self {
                submissions: Mutex::new(Vec::new()),
                fail_with_status: None,
            }
        }

        fn failing_with(status: StatusCode) -> Self {
            Self {
                fail_with_status: Some(status),
                ..Self::new()
            }
        }

        fn submissions(&self) -> Vec<(String, PageRange)> {
            self.submissions.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl SummaryService for RecordingService {
        async fn submit_for_summary(
            &self,
            document: &DocumentRef,
            range: &PageRange,
        ) -> Result<JobId, ApiError> {
            self.submissions
                .lock()
                .unwrap()
                .push((document.name.clone(), *range));

            match self.fail_with_status {
                Some(status) => Err(ApiError::Status {
                    status,
                    body: "upload rejected".to_string(),
                }),
                None => Ok(JobId::new("job-1")),
            }
        }

        async fn fetch_summary(&self, _id: &JobId) -> Result<SummaryResult, ApiError> {
            unreachable!("upload never fetches")
        }
    }

    fn book() -> DocumentRef {
        DocumentRef::from_path("/books/book.pdf")
    }

    #[tokio::test]
    async fn valid_input_submits_once_and_returns_the_job_id() {
        let service = RecordingService::new();
        let doc = book();

        let id = submit(&service, Some(&doc), "0", "").await.unwrap();

        assert_eq!(id.as_str(), "job-1");
        assert_eq!(
            service.submissions(),
            vec![(
                "book.pdf".to_string(),
                PageRange {
                    start: 0,
                    end: None
                }
            )]
        );
    }

    #[tokio::test]
    async fn bounded_range_is_forwarded() {
        let service = RecordingService::new();
        let doc = book();

        submit(&service, Some(&doc), "3", "12").await.unwrap();

        assert_eq!(
            service.submissions()[0].1,
            PageRange {
                start: 3,
                end: Some(12)
            }
        );
    }

    #[tokio::test]
    async fn missing_document_is_rejected_before_any_call() {
        let service = RecordingService::new();

        let err = submit(&service, None, "0", "").await.unwrap_err();

        assert!(matches!(err, UploadError::NoFile));
        assert!(service.submissions().is_empty());
    }

    #[tokio::test]
    async fn non_numeric_start_is_rejected_before_any_call() {
        let service = RecordingService::new();
        let doc = book();

        let err = submit(&service, Some(&doc), "abc", "").await.unwrap_err();

        assert!(matches!(err, UploadError::BadStart(_)));
        assert!(service.submissions().is_empty());
    }

    #[tokio::test]
    async fn negative_start_is_rejected() {
        let service = RecordingService::new();
        let doc = book();

        let err = submit(&service, Some(&doc), "-1", "").await.unwrap_err();

        assert!(matches!(err, UploadError::BadStart(_)));
        assert!(service.submissions().is_empty());
    }

    #[tokio::test]
    async fn non_numeric_end_is_rejected_before_any_call() {
        let service = RecordingService::new();
        let doc = book();

        let err = submit(&service, Some(&doc), "0", "ten").await.unwrap_err();

        assert!(matches!(err, UploadError::BadEnd(_)));
        assert!(service.submissions().is_empty());
    }

    #[tokio::test]
    async fn end_before_start_is_rejected() {
        let service = RecordingService::new();
        let doc = book();

        let err = submit(&service, Some(&doc), "5", "2").await.unwrap_err();

        assert!(matches!(err, UploadError::BadRange { start: 5, end: 2 }));
        assert!(service.submissions().is_empty());
    }

    #[tokio::test]
    async fn bounds_tolerate_surrounding_whitespace() {
        let service = RecordingService::new();
        let doc = book();

        submit(&service, Some(&doc), " 1 ", " 4 ").await.unwrap();

        assert_eq!(
            service.submissions()[0].1,
            PageRange {
                start: 1,
                end: Some(4)
            }
        );
    }

    #[tokio::test]
    async fn server_failure_propagates_unchanged() {
        let service = RecordingService::failing_with(StatusCode::INTERNAL_SERVER_ERROR);
        let doc = book();

        let err = submit(&service, Some(&doc), "0", "").await.unwrap_err();

        match err {
            UploadError::Api(ApiError::Status { status, .. }) => {
                assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
            }
            other => panic!("expected a transport error, got {:?}", other),
        }
        assert_eq!(service.submissions().len(), 1);
    }
}
