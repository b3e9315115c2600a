pub mod claude;
pub mod estimate;
pub mod noop;
pub mod prompt_builder;
mod prompts;
pub mod response;

use crate::error::GenerateResult;
use anyhow::{Result, anyhow};

pub use claude::ClaudeCliClient;
pub use noop::NoopClient;

/// Upper bound on the estimated size of any prompt sent to a provider.
pub const MAX_INPUT_TOKENS: usize = 8000;

/// Raw text returned by one provider call, plus the session it belongs to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Completion {
    pub text: String,
    pub session_id: String,
}

/// Trait for talking to an LLM backend.
///
/// One call means at most one request to the backend. Passing a session id asks the backend to
/// continue that conversation instead of starting a new one.
pub trait LlmClient: Send + Sync {
    fn complete(&self, prompt: &str, session_id: Option<&str>) -> GenerateResult<Completion>;
}

/// Which backend a configuration name refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderKind {
    Claude,
    Noop,
}

impl ProviderKind {
    pub fn from_name(name: &str) -> Result<Self> {
        match name.trim().to_lowercase().as_str() {
            "claude" | "claude-code" | "claude-cli" => Ok(ProviderKind::Claude),
            "none" | "noop" => Ok(ProviderKind::Noop),
            other => Err(anyhow!(
                "unknown provider {other:?} (expected \"claude\" or \"none\")"
            )),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Claude => "claude",
            ProviderKind::Noop => "none",
        }
    }
}

/// The configured backend.
pub enum Provider {
    Claude(ClaudeCliClient),
    Noop(NoopClient),
}

impl LlmClient for Provider {
    fn complete(&self, prompt: &str, session_id: Option<&str>) -> GenerateResult<Completion> {
        match self {
            Provider::Claude(client) => client.complete(prompt, session_id),
            Provider::Noop(client) => client.complete(prompt, session_id),
        }
    }
}

/// Truncate long strings for debug logging.
pub(crate) fn truncate(s: &str, max_chars: usize) -> String {
    match s.char_indices().nth(max_chars) {
        None => s.to_string(),
        Some((idx, _)) => format!(
            "{}...\n[truncated {} chars]",
            &s[..idx],
            s[idx..].chars().count()
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn provider_names_map_to_kinds() {
        assert_eq!(ProviderKind::from_name("claude").unwrap(), ProviderKind::Claude);
        assert_eq!(ProviderKind::from_name(" Claude-CLI ").unwrap(), ProviderKind::Claude);
        assert_eq!(ProviderKind::from_name("none").unwrap(), ProviderKind::Noop);
        assert_eq!(ProviderKind::from_name("NOOP").unwrap(), ProviderKind::Noop);
    }

    #[test]
    fn unknown_provider_is_rejected() {
        let err = ProviderKind::from_name("openai").unwrap_err();
        assert!(err.to_string().contains("unknown provider"));
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate("short", 10), "short");
        let cut = truncate("日本語テキスト", 3);
        assert!(cut.starts_with("日本語..."));
        assert!(cut.ends_with("[truncated 4 chars]"));
    }
}
