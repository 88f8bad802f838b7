//! Shared utilities for use cases.
//!
//! Cancellation checks and cancellable LLM calls used by the agent loop.

use crate::use_cases::run_agent::RunAgentError;
use std::future::Future;
use tokio_util::sync::CancellationToken;

/// Check if cancellation has been requested.
///
/// Returns `Err(RunAgentError::Cancelled)` if the token exists and is cancelled.
pub(crate) fn check_cancelled(token: &Option<CancellationToken>) -> Result<(), RunAgentError> {
    if let Some(token) = token
        && token.is_cancelled()
    {
        return Err(RunAgentError::Cancelled);
    }
    Ok(())
}

/// Await `fut`, returning early with `Cancelled` if the token fires first.
pub(crate) async fn cancellable<T, F>(
    token: &Option<CancellationToken>,
    fut: F,
) -> Result<T, RunAgentError>
where
    F: Future<Output = Result<T, RunAgentError>>,
{
    check_cancelled(token)?;
    match token {
        Some(token) => {
            tokio::select! {
                biased;
                _ = token.cancelled() => Err(RunAgentError::Cancelled),
                result = fut => result,
            }
        }
        None => fut.await,
    }
}
