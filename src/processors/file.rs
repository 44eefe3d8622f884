use log::{debug, warn};
use tokio_util::sync::CancellationToken;
use crate::document::Document;
use crate::error::{Result, ScribeError};
use crate::processors::github::TraversalContext;
use crate::processors::language::{fence_label, is_binary_file};
use crate::utils::RetryingFetcher;

/// Fetches one file's raw bytes and renders them as a fenced block
///
/// Every failure other than cancellation becomes an inline notice and the
/// caller carries on with the next entry.
pub struct FileTranscriber<'a> {
    fetcher: &'a RetryingFetcher,
    ctx: &'a TraversalContext,
    cancel: &'a CancellationToken,
}

impl<'a> FileTranscriber<'a> {
    /// Creates a transcriber over the walk's shared state
    pub fn new(fetcher: &'a RetryingFetcher, ctx: &'a TraversalContext, cancel: &'a CancellationToken) -> Self {
        Self { fetcher, ctx, cancel }
    }

    /// Appends the content of the file at `path`, read from `download_url`
    ///
    /// Fails only with [`ScribeError::Cancelled`].
    pub async fn transcribe(&self, path: &str, download_url: &str, doc: &mut Document) -> Result<()> {
        let request_url = self.ctx.endpoints.raw_content(download_url);
        debug!("Fetching raw content for '{}' via {}", path, request_url);

        let response = match self.fetcher.get(&request_url, self.ctx.max_retries, self.cancel).await {
            Ok(response) => response,
            Err(ScribeError::Cancelled) => return Err(ScribeError::Cancelled),
            Err(e) => {
                warn!("Download of '{}' failed: {}", path, e);
                doc.push_fmt(format_args!("Error downloading proxied file '{}': {}\n\n", path, e));
                return Ok(());
            }
        };

        let status = response.status();
        if !status.is_success() {
            let details = response.text().await.unwrap_or_default();
            warn!("Raw content for '{}' returned {}", path, status);
            doc.push_fmt(format_args!(
                "Error: Proxy returned status {} for file '{}' (GitHub Raw URL: {}).\nResponse: {}\n\n",
                status.as_u16(),
                path,
                download_url,
                details
            ));
            return Ok(());
        }

        let bytes = match response.bytes().await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!("Reading '{}' failed: {}", path, e);
                doc.push_fmt(format_args!("Error reading proxied file content for '{}': {}\n\n", path, e));
                return Ok(());
            }
        };

        if self.ctx.detect_binary && is_binary_file(path, &bytes) {
            debug!("'{}' looks binary, omitting", path);
            doc.push_fmt(format_args!(
                "\n[Binary file '{}' ({} bytes) omitted.]\n\n",
                path,
                bytes.len()
            ));
            return Ok(());
        }

        doc.push_fmt(format_args!(
            "```{}\n{}\n```\n\n",
            fence_label(path),
            String::from_utf8_lossy(&bytes)
        ));
        Ok(())
    }
}
