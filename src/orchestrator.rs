use log::{error, info, warn};
use tokio_util::sync::CancellationToken;
use crate::config::Config;
use crate::dispatch::Transcript;
use crate::document::Document;
use crate::error::{Result, ScribeError};
use crate::processors::{RepoReference, TraversalContext, TreeWalker};
use crate::rate_limiter::BackoffPolicy;
use crate::utils::RetryingFetcher;

/// Runs whole transcriptions: resolve, walk, frame
///
/// Holds the one HTTP client shared by every request of every traversal it
/// performs.
#[derive(Debug, Clone)]
pub struct Transcriber {
    config: Config,
    fetcher: RetryingFetcher,
}

impl Transcriber {
    /// Validates `config` and builds the shared client from it
    pub fn new(config: Config) -> Result<Self> {
        config.validate()?;
        let client = config.http_client()?;
        Ok(Self::with_client(client, config))
    }

    /// Uses an existing client instead of building one
    pub fn with_client(client: reqwest::Client, config: Config) -> Self {
        let fetcher = RetryingFetcher::new(client, BackoffPolicy::from(&config.backoff));
        Self { config, fetcher }
    }

    /// Transcribes the repository at `url`
    ///
    /// Never fails: unresolvable URLs produce an `Error: …` document and
    /// traversal failures are annotated inside the document.
    pub async fn transcribe(
        &self,
        url: &str,
        max_depth: Option<i32>,
        cancel: &CancellationToken,
    ) -> Transcript {
        let url = url.trim();
        let reference = match RepoReference::parse(url) {
            Ok(reference) => reference,
            Err(e) => {
                warn!("Rejected repository URL '{}': {}", url, e);
                let reason = match e {
                    ScribeError::InvalidReference(reason) => reason,
                    other => other.to_string(),
                };
                return Transcript {
                    repo_name: String::new(),
                    markdown: format!("Error: {}", reason),
                };
            }
        };

        let listing_url = reference.listing_endpoint(&self.config.api_base);
        let ctx = TraversalContext::new(reference, &self.config, max_depth);
        let repo_name = ctx.reference.display_name().to_string();
        info!(
            "Transcribing {}/{} from {} (max depth {})",
            ctx.reference.owner, ctx.reference.repo, listing_url, ctx.max_depth
        );

        let mut doc = Document::new(&repo_name, url);
        let walker = TreeWalker::new(&self.fetcher, &ctx, cancel);

        match walker.walk(&listing_url, "", 0, &mut doc).await {
            Ok(()) => info!("Finished transcribing {}", repo_name),
            Err(e) => {
                error!("Transcription of {} stopped: {}", repo_name, e);
                // Rate-limit and auth failures already carry their own notice.
                if !e.is_rate_limit() {
                    doc.push_fmt(format_args!(
                        "\n\n--- ERROR DURING PROCESSING ---\n{}\n-----------------------------\n",
                        e
                    ));
                }
            }
        }

        Transcript {
            repo_name,
            markdown: doc.finish(),
        }
    }
}
