use crate::config::Config;
use crate::error::{GenerateError, GenerateResult};
use crate::llm::LlmClient;
use crate::llm::estimate::estimate_tokens;
use crate::llm::prompt_builder;
use crate::llm::response::parse_response;
use crate::summarize::{DiffSummarizer, SUMMARIZE_THRESHOLD};

/// A parsed draft plus the session it came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationResult {
    pub title: String,
    pub body: String,
    pub session_id: String,
}

/// Input to a refine call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefinementContext {
    pub session_id: String,
    pub feedback: String,
}

/// Runs one generate or refine round against a provider.
pub struct Generator<'a> {
    config: &'a Config,
    client: &'a dyn LlmClient,
    summarizer: &'a dyn DiffSummarizer,
}

impl<'a> Generator<'a> {
    pub fn new(
        config: &'a Config,
        client: &'a dyn LlmClient,
        summarizer: &'a dyn DiffSummarizer,
    ) -> Self {
        Generator {
            config,
            client,
            summarizer,
        }
    }

    /// First round: summarize the diff if it is too large, then ask for a fresh draft.
    pub fn generate(&self, diff: &str, background: Option<&str>) -> GenerateResult<GenerationResult> {
        let diff_tokens = estimate_tokens(diff);
        let summarized;
        let diff = if diff_tokens > SUMMARIZE_THRESHOLD {
            log::info!(
                "Diff is ~{diff_tokens} tokens (threshold {SUMMARIZE_THRESHOLD}); summarizing"
            );
            summarized = self
                .summarizer
                .summarize(diff)
                .map_err(|e| GenerateError::DiffFilter(format!("{e:#}")))?;
            summarized.filtered_diff.as_str()
        } else {
            diff
        };

        let prompt = prompt_builder::initial_prompt(self.config, diff, background);
        self.call(&prompt, None)
    }

    /// Later rounds: send only the feedback, resuming the previous session.
    pub fn refine(&self, refinement: &RefinementContext) -> GenerateResult<GenerationResult> {
        let prompt = prompt_builder::refinement_prompt(&refinement.feedback);
        self.call(&prompt, Some(&refinement.session_id))
    }

    fn call(&self, prompt: &str, session_id: Option<&str>) -> GenerateResult<GenerationResult> {
        let completion = self.client.complete(prompt, session_id)?;
        log::trace!("Model response:\n{}", completion.text);

        let draft = parse_response(&completion.text)?;
        Ok(GenerationResult {
            title: draft.title,
            body: draft.body,
            session_id: completion.session_id,
        })
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use crate::llm::Completion;
    use crate::summarize::DiffSummary;
    use anyhow::anyhow;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    /// One recorded provider call.
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub(crate) struct Call {
        pub prompt: String,
        pub session_id: Option<String>,
    }

    /// Provider that replays queued replies and records what it was asked.
    #[derive(Default)]
    pub(crate) struct ScriptedClient {
        replies: Mutex<VecDeque<GenerateResult<Completion>>>,
        calls: Mutex<Vec<Call>>,
    }

    impl ScriptedClient {
        pub fn with_replies(replies: Vec<GenerateResult<Completion>>) -> Self {
            ScriptedClient {
                replies: Mutex::new(replies.into()),
                calls: Mutex::new(Vec::new()),
            }
        }

        pub fn calls(&self) -> Vec<Call> {
            self.calls.lock().unwrap().clone()
        }
    }

    impl LlmClient for ScriptedClient {
        fn complete(&self, prompt: &str, session_id: Option<&str>) -> GenerateResult<Completion> {
            self.calls.lock().unwrap().push(Call {
                prompt: prompt.to_string(),
                session_id: session_id.map(String::from),
            });
            self.replies
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Err(GenerateError::EmptyResponse))
        }
    }

    pub(crate) fn reply(title: &str, body: &str, session: &str) -> GenerateResult<Completion> {
        Ok(Completion {
            text: format!("TITLE: {title}\nBODY:\n{body}"),
            session_id: session.to_string(),
        })
    }

    /// Summarizer that counts calls and returns a fixed summary (or fails).
    pub(crate) struct CountingSummarizer {
        calls: Mutex<usize>,
        fail: bool,
    }

    impl CountingSummarizer {
        pub fn ok() -> Self {
            CountingSummarizer {
                calls: Mutex::new(0),
                fail: false,
            }
        }

        pub fn failing() -> Self {
            CountingSummarizer {
                calls: Mutex::new(0),
                fail: true,
            }
        }

        pub fn calls(&self) -> usize {
            *self.calls.lock().unwrap()
        }
    }

    impl DiffSummarizer for CountingSummarizer {
        fn summarize(&self, _diff: &str) -> anyhow::Result<DiffSummary> {
            *self.calls.lock().unwrap() += 1;
            if self.fail {
                return Err(anyhow!("diff contains no file sections"));
            }
            Ok(DiffSummary {
                filtered_diff: "SUMMARIZED DIFF".to_string(),
            })
        }
    }

    fn config() -> Config {
        Config {
            title_instructions: "Short title".into(),
            body_instructions: "Explain why".into(),
            ..Config::default()
        }
    }

    fn large_diff() -> String {
        // ~6000 words of one letter each -> word count dominates.
        "+ x ".repeat(3001)
    }

    #[test]
    fn small_diff_skips_summarizer() {
        let cfg = config();
        let client = ScriptedClient::with_replies(vec![reply("T1", "B1", "S1")]);
        let summarizer = CountingSummarizer::ok();
        let generator = Generator::new(&cfg, &client, &summarizer);

        let result = generator.generate("+ small change", Some("context")).unwrap();

        assert_eq!(summarizer.calls(), 0);
        assert_eq!(
            result,
            GenerationResult {
                title: "T1".into(),
                body: "B1".into(),
                session_id: "S1".into(),
            }
        );
        let calls = client.calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].session_id, None);
        assert!(calls[0].prompt.contains("+ small change"));
        assert!(calls[0].prompt.contains("context"));
    }

    #[test]
    fn large_diff_is_summarized_once() {
        let cfg = config();
        let client = ScriptedClient::with_replies(vec![reply("T1", "B1", "S1")]);
        let summarizer = CountingSummarizer::ok();
        let generator = Generator::new(&cfg, &client, &summarizer);
        let diff = large_diff();
        assert!(estimate_tokens(&diff) > SUMMARIZE_THRESHOLD);

        generator.generate(&diff, None).unwrap();

        assert_eq!(summarizer.calls(), 1);
        let calls = client.calls();
        assert!(calls[0].prompt.contains("SUMMARIZED DIFF"));
        assert!(!calls[0].prompt.contains(&diff));
    }

    #[test]
    fn summarizer_failure_stops_before_provider() {
        let cfg = config();
        let client = ScriptedClient::default();
        let summarizer = CountingSummarizer::failing();
        let generator = Generator::new(&cfg, &client, &summarizer);

        let err = generator.generate(&large_diff(), None).unwrap_err();

        match err {
            GenerateError::DiffFilter(msg) => assert!(msg.contains("no file sections")),
            other => panic!("unexpected error: {other:?}"),
        }
        assert!(client.calls().is_empty());
    }

    #[test]
    fn refine_resumes_session_with_feedback_only() {
        let cfg = config();
        let client = ScriptedClient::with_replies(vec![reply("T2", "B2", "S2")]);
        let summarizer = CountingSummarizer::ok();
        let generator = Generator::new(&cfg, &client, &summarizer);

        let result = generator
            .refine(&RefinementContext {
                session_id: "S1".into(),
                feedback: "shorten it".into(),
            })
            .unwrap();

        assert_eq!(result.session_id, "S2");
        let calls = client.calls();
        assert_eq!(calls[0].session_id.as_deref(), Some("S1"));
        assert!(calls[0].prompt.contains("shorten it"));
        assert!(!calls[0].prompt.contains("Short title"));
    }

    #[test]
    fn unparseable_response_is_surfaced() {
        let cfg = config();
        let client = ScriptedClient::with_replies(vec![Ok(Completion {
            text: "I could not do that".into(),
            session_id: "S1".into(),
        })]);
        let summarizer = CountingSummarizer::ok();
        let generator = Generator::new(&cfg, &client, &summarizer);

        let err = generator.generate("+ x", None).unwrap_err();
        assert!(matches!(err, GenerateError::TitleNotFound));
    }
}
