use std::sync::atomic::{AtomicUsize, Ordering};

use super::{Completion, LlmClient};
use crate::error::GenerateResult;

/// Dummy backend for `--no-model`: answers every prompt with a canned draft.
#[derive(Debug, Default)]
pub struct NoopClient {
    calls: AtomicUsize,
}

impl NoopClient {
    pub fn new() -> Self {
        Self::default()
    }
}

impl LlmClient for NoopClient {
    fn complete(&self, prompt: &str, session_id: Option<&str>) -> GenerateResult<Completion> {
        let round = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        let session_id = session_id
            .filter(|id| !id.is_empty())
            .map(String::from)
            .unwrap_or_else(|| "noop-session".to_string());

        let text = format!(
            "TITLE: Dummy PR title (draft {round})\n\
             BODY:\n\
             Dummy PR body for testing (LLM disabled).\n\n\
             Prompt was {chars} characters.",
            chars = prompt.chars().count()
        );

        Ok(Completion { text, session_id })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm::response::parse_response;

    #[test]
    fn canned_draft_parses() {
        let client = NoopClient::new();
        let completion = client.complete("prompt", None).unwrap();
        let draft = parse_response(&completion.text).unwrap();
        assert_eq!(draft.title, "Dummy PR title (draft 1)");
        assert_eq!(completion.session_id, "noop-session");
    }

    #[test]
    fn keeps_the_given_session() {
        let client = NoopClient::new();
        client.complete("first", None).unwrap();
        let completion = client.complete("again", Some("s-9")).unwrap();
        assert_eq!(completion.session_id, "s-9");
        assert!(completion.text.contains("draft 2"));
    }
}
