use log::error;
use serde::{Deserialize, Serialize};
use serde_json::json;
use crate::error::Result;

/// Placed in the `markdown` field when the real result cannot be serialized
pub const SERIALIZATION_ERROR_MARKER: &str = "Error: Could not serialize transcription result.";

/// Value delivered to the host once a traversal ends
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Transcript {
    /// Repository display name, empty when the URL could not be resolved
    pub repo_name: String,
    /// The finished document
    pub markdown: String,
}

/// Serializes `transcript` and hands it to `callback`
///
/// The callback is consumed, so it runs exactly once, with either the real
/// payload or the fallback.
pub fn dispatch<F>(transcript: &Transcript, callback: F)
where
    F: FnOnce(String),
{
    callback(encode(transcript, &transcript.repo_name));
}

/// JSON for `payload`, or a well-formed fallback naming `repo_name`
pub fn encode<T: Serialize>(payload: &T, repo_name: &str) -> String {
    match try_encode(payload) {
        Ok(encoded) => encoded,
        Err(e) => {
            error!("Failed to package result for '{}': {}", repo_name, e);
            fallback_payload(repo_name)
        }
    }
}

fn try_encode<T: Serialize>(payload: &T) -> Result<String> {
    Ok(serde_json::to_string(payload)?)
}

/// Payload sent in place of a result that failed to serialize
pub fn fallback_payload(repo_name: &str) -> String {
    json!({
        "repo_name": repo_name,
        "markdown": SERIALIZATION_ERROR_MARKER,
    })
    .to_string()
}
