use thiserror::Error;

/// Everything that can stop a single generate or refine step.
///
/// None of these are retried. A failed first draft ends the run; a failed refinement only ends
/// that round unless [`GenerateError::aborts_run`] says otherwise.
#[derive(Error, Debug)]
pub enum GenerateError {
    #[error("{binary} CLI not found on PATH; install it first")]
    ProviderUnavailable { binary: String },

    #[error("empty prompt provided to the provider")]
    EmptyPrompt,

    #[error("prompt too large ({estimated} estimated tokens, max {max})")]
    PromptTooLarge { estimated: usize, max: usize },

    #[error("provider CLI error (exit code {code}): {output}")]
    ProviderProcess { code: i32, output: String },

    #[error("provider returned an error: {0}")]
    ProviderLogical(String),

    #[error("failed to decode provider response: {source}; raw output: {raw}")]
    Decode {
        #[source]
        source: serde_json::Error,
        raw: String,
    },

    #[error("empty response from provider")]
    EmptyResponse,

    #[error("could not extract title from model response")]
    TitleNotFound,

    #[error("could not extract body from model response")]
    BodyNotFound,

    #[error("failed to filter diff: {0}")]
    DiffFilter(String),

    #[error("interrupted while waiting for the provider")]
    Interrupted,

    #[error("failed to run provider CLI: {0}")]
    Io(#[from] std::io::Error),
}

impl GenerateError {
    /// Errors that no amount of rephrasing can fix: the provider cannot be started at all.
    pub fn aborts_run(&self) -> bool {
        matches!(
            self,
            GenerateError::ProviderUnavailable { .. } | GenerateError::Io(_)
        )
    }
}

pub type GenerateResult<T> = Result<T, GenerateError>;
