//! API handlers for the analysis server.

pub mod analysis;
pub mod static_text;

use std::sync::Arc;

use chess_analysis::{AnalysisError, Analyzer};

use crate::error::ApiError;
use crate::AppState;

/// Runs an analyzer call on the blocking pool, bounded by the request deadline.
///
/// The engine session is synchronous and may block for the whole search
/// budget. On timeout the running search is stopped; the abandoned call then
/// finishes in the background and releases the session.
pub(crate) async fn run_analysis<T, F>(state: &AppState, job: F) -> Result<T, ApiError>
where
    F: FnOnce(&Analyzer) -> Result<T, AnalysisError> + Send + 'static,
    T: Send + 'static,
{
    let analyzer = Arc::clone(&state.analyzer);
    let mut task = tokio::task::spawn_blocking(move || job(analyzer.as_ref()));

    match tokio::time::timeout(state.request_timeout, &mut task).await {
        Err(_) => {
            tracing::warn!(
                timeout_ms = state.request_timeout.as_millis(),
                "Analysis exceeded request deadline"
            );
            if !task.is_finished() {
                state.analyzer.stop_search();
            }
            Err(ApiError::Timeout)
        }
        Ok(Err(join_error)) => Err(ApiError::TaskFailed(join_error.to_string())),
        Ok(Ok(result)) => result.map_err(ApiError::from),
    }
}
