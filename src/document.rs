use std::fmt;
use chrono::{DateTime, Utc};

/// Attribution appended to every finished document
pub const FOOTER: &str = "\n\n<!-- Generated with repo-scribe -->";

/// Timestamp layout used in the document header
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S UTC";

/// Append-only Markdown transcript of one traversal
///
/// Fragments are only ever pushed to the end; nothing already written is
/// rewritten or removed. The header is written on construction and the
/// footer by [`Document::finish`].
#[derive(Debug)]
pub struct Document {
    buf: String,
}

impl Document {
    /// Starts a document stamped with the current UTC time
    pub fn new(repo_name: &str, original_url: &str) -> Self {
        Self::with_timestamp(repo_name, original_url, Utc::now())
    }

    /// Starts a document stamped with the given time
    pub fn with_timestamp(repo_name: &str, original_url: &str, at: DateTime<Utc>) -> Self {
        let buf = format!(
            "# Repository: {}\nURL: {}\nTranscription Date: {}\n\n",
            repo_name,
            original_url,
            at.format(TIMESTAMP_FORMAT)
        );
        Self { buf }
    }

    /// Appends a formatted fragment
    pub fn push_fmt(&mut self, args: fmt::Arguments<'_>) {
        // Writing into a String cannot fail.
        let _ = fmt::Write::write_fmt(&mut self.buf, args);
    }

    /// Appends the footer and returns the finished text
    pub fn finish(mut self) -> String {
        self.buf.push_str(FOOTER);
        self.buf
    }
}
