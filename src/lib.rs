#![doc = include_str!("../README.md")]
#![warn(missing_docs)]
#![warn(clippy::all)]

//! repo-scribe - Transcribe a GitHub repository into one Markdown document
//!
//! The crate walks a repository through the GitHub contents API (optionally
//! via a relaying proxy), fetches every file and assembles a transcript with
//! a `## /path` heading and a language-tagged code fence per file.
//!
//! ## Features
//! - Depth-bounded, strictly sequential depth-first traversal
//! - Exponential backoff with jitter on throttled responses
//! - Failures contained to the subtree or file where they happen
//! - Background execution with a single completion callback
//!
//! ## Usage
//! ```rust,ignore
//! use std::sync::Arc;
//! use reposcribe::{host, Config, Transcriber};
//!
//! async fn example() -> reposcribe::Result<()> {
//!     let transcriber = Arc::new(Transcriber::new(Config::default())?);
//!     let handle = host::generate_markdown(
//!         &transcriber,
//!         "https://github.com/rust-lang/log",
//!         |payload| println!("{}", payload),
//!         Some(2),
//!     );
//!     handle.await.ok();
//!     Ok(())
//! }
//! ```

/// Configuration module for the application
pub mod config;
/// Result packaging and callback delivery
pub mod dispatch;
/// Append-only transcript buffer
pub mod document;
/// Error handling types and utilities
pub mod error;
pub mod host;
/// Logging configuration and utilities
pub mod logging;
/// Whole-transcription driver
pub mod orchestrator;
/// Repository resolution, traversal and file transcription
pub mod processors;
/// Throttle recognition and backoff policy
pub mod rate_limiter;
/// Utilities (retrying fetcher)
pub mod utils;

// Re-export common types
pub use config::Config;
pub use dispatch::Transcript;
pub use document::Document;
pub use error::{Result, ScribeError};
pub use orchestrator::Transcriber;
pub use processors::RepoReference;
