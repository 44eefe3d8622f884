use async_recursion::async_recursion;
use log::{debug, error, info, warn};
use serde::Deserialize;
use tokio_util::sync::CancellationToken;
use url::form_urlencoded;
use crate::config::Config;
use crate::document::Document;
use crate::error::{Result, ScribeError};
use crate::processors::file::FileTranscriber;
use crate::processors::language::fence_label;
use crate::processors::reference::RepoReference;
use crate::rate_limiter::Throttle;
use crate::utils::RetryingFetcher;

const PROXY_API_PATH: &str = "/api/proxy_github_api";
const PROXY_RAW_PATH: &str = "/api/proxy_github_raw_content";
const ROOT_DISPLAY: &str = "repository root";

/// Kind of a directory listing record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Regular file
    File,
    /// Directory, listed through its own endpoint
    Dir,
    /// Git submodule
    Submodule,
    /// Anything else (symlinks, unknown types)
    #[serde(other)]
    Other,
}

/// One record returned by a listing call
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct DirectoryEntry {
    /// Base name
    #[serde(default)]
    pub name: String,
    /// Full path from the repository root
    pub path: String,
    /// Record kind
    #[serde(rename = "type")]
    pub kind: EntryKind,
    /// Size in bytes
    #[serde(default)]
    pub size: u64,
    /// Raw content location, present for retrievable files
    #[serde(default)]
    pub download_url: Option<String>,
    /// Listing endpoint for directories, detail endpoint otherwise
    #[serde(rename = "url", default)]
    pub listing_url: String,
}

impl DirectoryEntry {
    /// Content reference, ignoring empty values
    pub fn content_url(&self) -> Option<&str> {
        self.download_url.as_deref().filter(|u| !u.is_empty())
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Listing {
    Many(Vec<DirectoryEntry>),
    One(DirectoryEntry),
}

/// Decodes a listing body; a single object (a file path) becomes a one-entry listing
pub fn parse_listing(body: &[u8]) -> std::result::Result<Vec<DirectoryEntry>, serde_json::Error> {
    Ok(match serde_json::from_slice(body)? {
        Listing::Many(entries) => entries,
        Listing::One(entry) => vec![entry],
    })
}

/// Maps upstream URLs to the URLs actually requested
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoints {
    proxy_base: Option<String>,
}

impl Endpoints {
    /// Routes every request through the proxy at `proxy_base`
    pub fn proxied(proxy_base: impl Into<String>) -> Self {
        Self {
            proxy_base: Some(proxy_base.into().trim_end_matches('/').to_string()),
        }
    }

    /// Requests upstream URLs as they are
    pub fn direct() -> Self {
        Self { proxy_base: None }
    }

    /// URL fetched to list the directory at `upstream`
    pub fn listing(&self, upstream: &str) -> String {
        self.route(PROXY_API_PATH, upstream)
    }

    /// URL fetched to read the raw file at `download_url`
    pub fn raw_content(&self, download_url: &str) -> String {
        self.route(PROXY_RAW_PATH, download_url)
    }

    fn route(&self, proxy_path: &str, upstream: &str) -> String {
        match &self.proxy_base {
            Some(base) => {
                let encoded: String = form_urlencoded::byte_serialize(upstream.as_bytes()).collect();
                format!("{}{}?url={}", base, proxy_path, encoded)
            }
            None => upstream.to_string(),
        }
    }
}

/// Per-invocation settings shared by the whole walk
#[derive(Debug, Clone)]
pub struct TraversalContext {
    /// Resolved repository
    pub reference: RepoReference,
    /// Request routing
    pub endpoints: Endpoints,
    /// Recursion bound; negative means unlimited
    pub max_depth: i32,
    /// Files above this size are omitted
    pub max_file_size: u64,
    /// Retry budget per fetch
    pub max_retries: u32,
    /// Omit content that sniffs as binary
    pub detect_binary: bool,
}

impl TraversalContext {
    /// Builds the context for `reference`, letting `max_depth` override the config
    pub fn new(reference: RepoReference, config: &Config, max_depth: Option<i32>) -> Self {
        let endpoints = match &config.proxy_base {
            Some(base) => Endpoints::proxied(base.as_str()),
            None => Endpoints::direct(),
        };
        Self {
            reference,
            endpoints,
            max_depth: max_depth.unwrap_or(config.max_depth),
            max_file_size: config.max_file_size,
            max_retries: config.max_retries,
            detect_binary: config.detect_binary,
        }
    }

    fn depth_exceeded(&self, depth: u32) -> bool {
        self.max_depth >= 0 && i64::from(depth) > i64::from(self.max_depth)
    }
}

/// Depth-first, strictly sequential walk over a repository's directory tree
pub struct TreeWalker<'a> {
    fetcher: &'a RetryingFetcher,
    ctx: &'a TraversalContext,
    cancel: &'a CancellationToken,
}

impl<'a> TreeWalker<'a> {
    /// Creates a walker over shared, read-only state
    pub fn new(fetcher: &'a RetryingFetcher, ctx: &'a TraversalContext, cancel: &'a CancellationToken) -> Self {
        Self { fetcher, ctx, cancel }
    }

    fn check_cancelled(&self) -> Result<()> {
        if self.cancel.is_cancelled() {
            return Err(ScribeError::Cancelled);
        }
        Ok(())
    }

    /// Transcribes the directory listed at `listing_url` into `doc`
    ///
    /// `current_path` is empty for the root. Failures are annotated in the
    /// document before they are returned; only [`ScribeError::is_fatal`]
    /// failures should abort the caller.
    #[async_recursion]
    pub async fn walk(
        &self,
        listing_url: &str,
        current_path: &str,
        depth: u32,
        doc: &mut Document,
    ) -> Result<()> {
        self.check_cancelled()?;

        let display_path = if current_path.is_empty() { ROOT_DISPLAY } else { current_path };

        if self.ctx.depth_exceeded(depth) {
            doc.push_fmt(format_args!(
                "\n*Skipping directory '{}' due to max recursion depth ({}).*\n",
                display_path, self.ctx.max_depth
            ));
            return Err(ScribeError::DepthExceeded {
                path: display_path.to_string(),
                max_depth: self.ctx.max_depth,
            });
        }

        let request_url = self.ctx.endpoints.listing(listing_url);
        debug!("Depth {}: listing '{}' via {}", depth, display_path, request_url);

        let response = match self.fetcher.get(&request_url, self.ctx.max_retries, self.cancel).await {
            Ok(response) => response,
            Err(ScribeError::Cancelled) => return Err(ScribeError::Cancelled),
            Err(e) => {
                doc.push_fmt(format_args!(
                    "\nError fetching proxied directory contents for '{}' (from {}): {}\n",
                    display_path, request_url, e
                ));
                warn!("Listing request for '{}' failed: {}", display_path, e);
                return Err(e);
            }
        };

        let status = response.status();
        if !status.is_success() {
            let throttle = Throttle::classify(status, response.headers());
            let details = response.text().await.unwrap_or_default();

            if throttle != Throttle::Clear {
                doc.push_fmt(format_args!(
                    "\n⚠️ GitHub API rate limit reached or authentication required for '{}'. \
                     Please try again later or provide a GitHub token.\nDetails: {}\n\n",
                    display_path, details
                ));
                error!("Rate limit or auth failure listing '{}': {}", display_path, status);
                let path = display_path.to_string();
                let status = status.as_u16();
                return Err(match throttle {
                    Throttle::RateLimited => ScribeError::RateLimited { path, status },
                    _ => ScribeError::AuthRequired { path, status },
                });
            }

            doc.push_fmt(format_args!(
                "Error response from GitHub API for '{}'. Status: {}\nDetails: {}\n\n",
                display_path,
                status.as_u16(),
                details
            ));
            warn!("Listing '{}' returned {}", display_path, status);
            return Err(ScribeError::Upstream {
                path: display_path.to_string(),
                status: status.as_u16(),
            });
        }

        let body = match response.bytes().await {
            Ok(body) => body,
            Err(e) => {
                doc.push_fmt(format_args!(
                    "\nError fetching proxied directory contents for '{}' (from {}): {}\n",
                    display_path, request_url, e
                ));
                return Err(ScribeError::Transport(e));
            }
        };

        let entries = match parse_listing(&body) {
            Ok(entries) => entries,
            Err(source) => {
                doc.push_fmt(format_args!(
                    "\nError parsing proxied directory data for '{}' (from {}): {}\n",
                    display_path, request_url, source
                ));
                warn!("Could not decode listing for '{}': {}", display_path, source);
                return Err(ScribeError::Decode {
                    path: display_path.to_string(),
                    source,
                });
            }
        };

        if entries.is_empty() {
            if current_path.is_empty() {
                doc.push_fmt(format_args!(
                    "\n*Repository '{}' appears to be empty or contains no processable items.*\n",
                    self.ctx.reference.display_name()
                ));
            } else {
                doc.push_fmt(format_args!(
                    "\n*Directory `{}` is empty or contains no processable items.*\n",
                    current_path
                ));
            }
            return Ok(());
        }

        for entry in &entries {
            debug!("Depth {}: processing '{}' ({:?})", depth, entry.path, entry.kind);
            match entry.kind {
                EntryKind::File => self.dispatch_file(entry, doc).await?,
                EntryKind::Dir => {
                    if let Err(e) = self.walk(&entry.listing_url, &entry.path, depth + 1, doc).await {
                        if e.is_fatal() {
                            error!("Aborting traversal at '{}': {}", entry.path, e);
                            return Err(e);
                        }
                        warn!("Error processing subdirectory '{}': {}", entry.path, e);
                    }
                }
                EntryKind::Submodule => {
                    info!("Depth {}: encountered submodule {}", depth, entry.path);
                    doc.push_fmt(format_args!(
                        "### [SUBMODULE] {}\n(Content of submodule not transcribed)\n\n",
                        entry.path
                    ));
                }
                EntryKind::Other => {
                    debug!("Depth {}: skipping '{}' of unhandled type", depth, entry.path);
                }
            }
        }

        debug!("Finished '{}' at depth {}", display_path, depth);
        Ok(())
    }

    async fn dispatch_file(&self, entry: &DirectoryEntry, doc: &mut Document) -> Result<()> {
        doc.push_fmt(format_args!("\n## /{}\n", entry.path));

        if entry.size > self.ctx.max_file_size {
            doc.push_fmt(format_args!(
                "\n[File '{}' too large ({} bytes, limit {} bytes), content omitted.]\n\n",
                entry.path, entry.size, self.ctx.max_file_size
            ));
            return Ok(());
        }
        if entry.size == 0 {
            doc.push_fmt(format_args!(
                "```{}\n[Empty File: /{}]\n```\n\n",
                fence_label(&entry.path),
                entry.path
            ));
            return Ok(());
        }
        let Some(content_url) = entry.content_url() else {
            doc.push_fmt(format_args!(
                "\n[File content for '{}' not available (no download URL from GitHub API).]\n\n",
                entry.path
            ));
            return Ok(());
        };

        self.check_cancelled()?;
        FileTranscriber::new(self.fetcher, self.ctx, self.cancel)
            .transcribe(&entry.path, content_url, doc)
            .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_listing_array() {
        let body = br#"[
            {"name": "readme.md", "path": "docs/readme.md", "type": "file", "size": 120,
             "download_url": "https://raw.githubusercontent.com/acme/widgets/main/docs/readme.md",
             "url": "https://api.github.com/repos/acme/widgets/contents/docs/readme.md?ref=main"},
            {"name": "img", "path": "docs/img", "type": "dir", "size": 0, "download_url": null,
             "url": "https://api.github.com/repos/acme/widgets/contents/docs/img?ref=main"},
            {"name": "vendor", "path": "vendor", "type": "submodule", "download_url": null, "url": ""},
            {"name": "link", "path": "link", "type": "symlink", "size": 4}
        ]"#;

        let entries = parse_listing(body).unwrap();
        assert_eq!(entries.len(), 4);
        assert_eq!(entries[0].kind, EntryKind::File);
        assert_eq!(entries[0].size, 120);
        assert!(entries[0].content_url().is_some());
        assert_eq!(entries[1].kind, EntryKind::Dir);
        assert!(entries[1].content_url().is_none());
        assert_eq!(entries[2].kind, EntryKind::Submodule);
        assert_eq!(entries[3].kind, EntryKind::Other);
    }

    #[test]
    fn test_parse_listing_single_object() {
        let body = br#"{"name": "lib.rs", "path": "src/lib.rs", "type": "file", "size": 10,
                        "download_url": "https://raw.githubusercontent.com/a/b/main/src/lib.rs"}"#;
        let entries = parse_listing(body).unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].path, "src/lib.rs");
    }

    #[test]
    fn test_parse_listing_rejects_garbage() {
        assert!(parse_listing(b"<html>oops</html>").is_err());
        assert!(parse_listing(br#"{"message": "Not Found"}"#).is_err());
    }

    #[test]
    fn test_empty_download_url_is_unavailable() {
        let entry = DirectoryEntry {
            name: "a".into(),
            path: "a".into(),
            kind: EntryKind::File,
            size: 1,
            download_url: Some(String::new()),
            listing_url: String::new(),
        };
        assert_eq!(entry.content_url(), None);
    }

    #[test]
    fn test_proxied_endpoints_encode_upstream() {
        let endpoints = Endpoints::proxied("http://localhost:5000/");
        assert_eq!(
            endpoints.listing("https://api.github.com/repos/acme/widgets/contents/docs?ref=main"),
            "http://localhost:5000/api/proxy_github_api?url=https%3A%2F%2Fapi.github.com%2Frepos%2Facme%2Fwidgets%2Fcontents%2Fdocs%3Fref%3Dmain"
        );
        assert_eq!(
            endpoints.raw_content("https://raw.githubusercontent.com/a/b/main/x y.md"),
            "http://localhost:5000/api/proxy_github_raw_content?url=https%3A%2F%2Fraw.githubusercontent.com%2Fa%2Fb%2Fmain%2Fx+y.md"
        );
    }

    #[test]
    fn test_direct_endpoints_pass_through() {
        let endpoints = Endpoints::direct();
        let upstream = "https://api.github.com/repos/acme/widgets/contents";
        assert_eq!(endpoints.listing(upstream), upstream);
        assert_eq!(endpoints.raw_content(upstream), upstream);
    }

    #[test]
    fn test_context_depth_bound() {
        let reference = RepoReference::parse("https://github.com/acme/widgets").unwrap();
        let unlimited = TraversalContext::new(reference.clone(), &Config::default(), None);
        assert!(!unlimited.depth_exceeded(1_000));

        let flat = TraversalContext::new(reference, &Config::default(), Some(0));
        assert!(!flat.depth_exceeded(0));
        assert!(flat.depth_exceeded(1));
    }
}
