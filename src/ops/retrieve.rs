use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info};

use crate::api::client::{ApiError, SummaryService};
use crate::api::types::{JobId, SummaryResult};

#[derive(Error, Debug)]
pub enum RetrieveError {
    #[error("summary {id} not ready after {attempts} attempts")]
    NotReady { id: JobId, attempts: u32 },

    #[error(transparent)]
    Api(#[from] ApiError),
}

/// Fetches the summary for a job in a single attempt. Suits callers that
/// already know the job finished; a summary that is still processing
/// surfaces as the server's 404.
pub async fn fetch(
    service: &dyn SummaryService,
    id: &JobId,
) -> Result<SummaryResult, RetrieveError> {
    Ok(service.fetch_summary(id).await?)
}

#[derive(Debug, Clone, Copy)]
pub struct PollConfig {
    pub max_attempts: u32,
    pub initial_delay: Duration,
    pub max_delay: Duration,
}

impl Default for PollConfig {
    fn default() -> Self {
        Self {
            max_attempts: 8,
            initial_delay: Duration::from_millis(500),
            max_delay: Duration::from_secs(10),
        }
    }
}

/// Polls until the remote job has produced a summary. Only a 404 counts as
/// "not ready"; the delay doubles per attempt up to `max_delay`, and any
/// other failure aborts the loop immediately.
pub async fn await_summary(
    service: &dyn SummaryService,
    id: &JobId,
    config: PollConfig,
) -> Result<SummaryResult, RetrieveError> {
    let mut delay = config.initial_delay;
    let mut attempt = 0;

    loop {
        attempt += 1;
        match service.fetch_summary(id).await {
            Ok(result) => {
                info!("Summary {} ready after {} attempt(s)", id, attempt);
                return Ok(result);
            }
            Err(err) if err.is_not_found() => {
                if attempt >= config.max_attempts {
                    return Err(RetrieveError::NotReady {
                        id: id.clone(),
                        attempts: attempt,
                    });
                }
                debug!(
                    "Summary {} not ready (attempt {}/{}), retrying in {:?}",
                    id, attempt, config.max_attempts, delay
                );
                sleep(delay).await;
                delay = (delay * 2).min(config.max_delay);
            }
            Err(err) => return Err(err.into()),
        }
    }
}
