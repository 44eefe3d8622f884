use crate::error::{Result, ScribeError};

/// Environment variable naming the proxy origin
pub const PROXY_BASE_VAR: &str = "REPOSCRIBE_PROXY_BASE";
/// Environment variable naming the upstream API origin
pub const API_BASE_VAR: &str = "REPOSCRIBE_API_BASE";
/// Environment variable holding the default recursion bound
pub const MAX_DEPTH_VAR: &str = "REPOSCRIBE_MAX_DEPTH";

/// Environment overrides applied on top of the file configuration
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct EnvOverrides {
    /// Proxy origin override
    pub proxy_base: Option<String>,
    /// Upstream API origin override
    pub api_base: Option<String>,
    /// Recursion bound override
    pub max_depth: Option<i32>,
}

impl EnvOverrides {
    /// Reads the overrides from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(get_env_value)
    }

    /// Reads the overrides through an arbitrary lookup function
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let max_depth = match lookup(MAX_DEPTH_VAR) {
            Some(raw) => Some(raw.trim().parse::<i32>().map_err(|e| {
                ScribeError::Config(format!("{} must be an integer: {}", MAX_DEPTH_VAR, e))
            })?),
            None => None,
        };

        Ok(Self {
            proxy_base: lookup(PROXY_BASE_VAR),
            api_base: lookup(API_BASE_VAR),
            max_depth,
        })
    }
}

/// Returns the value of an environment variable, treating empty values as unset
pub fn get_env_value(key: &str) -> Option<String> {
    let value = std::env::var(key).ok()?;
    if value.is_empty() {
        None
    } else {
        Some(value)
    }
}
