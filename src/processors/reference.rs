use url::Url;
use crate::error::{Result, ScribeError};

/// Domain every accepted repository URL must mention
pub const GITHUB_DOMAIN: &str = "github.com";

/// A repository location resolved from a user-supplied URL
///
/// `https://github.com/acme/widgets/tree/main/docs` resolves to owner
/// `acme`, repo `widgets`, ref `main` and subpath `docs`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepoReference {
    /// Owner or organization
    pub owner: String,
    /// Repository name, also used as the document's display name
    pub repo: String,
    /// Branch, tag or commit named in the URL
    pub git_ref: Option<String>,
    /// Directory (or file) below the repository root
    pub subpath: Option<String>,
}

impl RepoReference {
    /// Resolves a repository URL
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();
        if !input.contains(GITHUB_DOMAIN) {
            return Err(ScribeError::invalid_reference(format!(
                "Invalid GitHub URL. Must contain '{}'.",
                GITHUB_DOMAIN
            )));
        }

        let parsed = Url::parse(input)
            .or_else(|_| Url::parse(&format!("https://{}", input)))
            .map_err(|e| ScribeError::invalid_reference(format!("Invalid URL format: {}", e)))?;

        let segments: Vec<&str> = parsed
            .path_segments()
            .map(|s| s.filter(|seg| !seg.is_empty()).collect())
            .unwrap_or_default();

        if segments.len() < 2 {
            return Err(ScribeError::invalid_reference(
                "Invalid GitHub URL format. Expected github.com/owner/repo",
            ));
        }

        let owner = segments[0].to_string();
        let repo = segments[1].trim_end_matches(".git").to_string();
        if repo.is_empty() {
            return Err(ScribeError::invalid_reference("Repository name is empty"));
        }

        let (git_ref, rest) = if segments.len() > 3 && matches!(segments[2], "tree" | "blob") {
            (Some(segments[3].to_string()), &segments[4..])
        } else {
            (None, &segments[2..])
        };
        let subpath = if rest.is_empty() { None } else { Some(rest.join("/")) };

        Ok(Self {
            owner,
            repo,
            git_ref,
            subpath,
        })
    }

    /// Upstream contents endpoint listing the resolved directory
    pub fn listing_endpoint(&self, api_base: &str) -> String {
        let endpoint = format!(
            "{}/repos/{}/{}/contents/{}",
            api_base.trim_end_matches('/'),
            self.owner,
            self.repo,
            self.subpath.as_deref().unwrap_or("")
        );
        let endpoint = endpoint.trim_end_matches('/');
        match &self.git_ref {
            Some(git_ref) => format!("{}?ref={}", endpoint, git_ref),
            None => endpoint.to_string(),
        }
    }

    /// Name shown in the document header
    pub fn display_name(&self) -> &str {
        &self.repo
    }
}
