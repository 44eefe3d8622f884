//! Host-facing entry point: schedule a transcription and get called back once.

use std::sync::Arc;
use log::debug;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use crate::dispatch::dispatch;
use crate::orchestrator::Transcriber;

/// Schedules a transcription of `url` and returns immediately
///
/// `callback` receives the JSON string `{"repo_name": …, "markdown": …}`
/// exactly once when the traversal ends. Must be called from within a
/// tokio runtime.
pub fn generate_markdown<F>(
    transcriber: &Arc<Transcriber>,
    url: impl Into<String>,
    callback: F,
    max_depth: Option<i32>,
) -> JoinHandle<()>
where
    F: FnOnce(String) + Send + 'static,
{
    generate_markdown_with_cancel(transcriber, url, callback, max_depth, CancellationToken::new())
}

/// Like [`generate_markdown`], stopping early once `cancel` fires
pub fn generate_markdown_with_cancel<F>(
    transcriber: &Arc<Transcriber>,
    url: impl Into<String>,
    callback: F,
    max_depth: Option<i32>,
    cancel: CancellationToken,
) -> JoinHandle<()>
where
    F: FnOnce(String) + Send + 'static,
{
    let transcriber = Arc::clone(transcriber);
    let url = url.into();
    tokio::spawn(async move {
        debug!("Background transcription started for {}", url);
        let transcript = transcriber.transcribe(&url, max_depth, &cancel).await;
        dispatch(&transcript, callback);
    })
}
