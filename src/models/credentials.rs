//! Platform API tokens.

use std::fmt;

/// Environment variables checked for the GitHub token, in order.
pub const GITHUB_TOKEN_VARS: [&str; 2] = ["GITHUB_API_KEY", "GITHUB_TOKEN"];

/// Environment variables checked for the HuggingFace token, in order.
pub const HUGGINGFACE_TOKEN_VARS: [&str; 2] = ["HF_CLI", "HF_TOKEN"];

/// Optional tokens, one per platform.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct Credentials {
    pub github_token: Option<String>,
    pub huggingface_token: Option<String>,
}

impl Credentials {
    /// Read tokens from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read tokens through an arbitrary lookup. Blank values count as unset.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let first = |keys: &[&str]| {
            keys.iter()
                .filter_map(|key| lookup(key))
                .map(|value| value.trim().to_string())
                .find(|value| !value.is_empty())
        };

        Self {
            github_token: first(&GITHUB_TOKEN_VARS),
            huggingface_token: first(&HUGGINGFACE_TOKEN_VARS),
        }
    }

    /// Whether at least one platform has a token.
    pub fn any(&self) -> bool {
        self.github_token.is_some() || self.huggingface_token.is_some()
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mask = |token: &Option<String>| token.as_ref().map(|_| "<redacted>");
        f.debug_struct("Credentials")
            .field("github_token", &mask(&self.github_token))
            .field("huggingface_token", &mask(&self.huggingface_token))
            .finish()
    }
}
