use anyhow::Result;

use crate::error::{GenerateError, GenerateResult};
use crate::generate::{GenerationResult, Generator, RefinementContext};

/// What the user wants to do with the draft on screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Choice {
    Accept,
    Refine,
    Cancel,
}

impl Choice {
    pub fn from_input(input: &str) -> Option<Self> {
        match input.trim().to_lowercase().as_str() {
            "a" | "accept" | "y" | "yes" => Some(Choice::Accept),
            "r" | "refine" => Some(Choice::Refine),
            "c" | "cancel" | "q" | "quit" => Some(Choice::Cancel),
            _ => None,
        }
    }
}

/// How the refinement loop ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Accepted(GenerationResult),
    Cancelled,
    NoChanges,
}

/// Everything the loop needs from the user's side of the screen.
pub trait Presenter {
    fn show_draft(&mut self, draft: &GenerationResult);

    fn choose(&mut self) -> Result<Choice>;

    fn feedback(&mut self) -> Result<String>;

    /// Report a failed round that the loop recovers from.
    fn error(&mut self, error: &GenerateError);

    /// Run a blocking task while showing progress. The indicator must not outlive the task.
    fn busy<T, F>(&mut self, message: &str, task: F) -> T
    where
        T: Send,
        F: FnOnce() -> T + Send;
}

impl<P: Presenter> Presenter for &mut P {
    fn show_draft(&mut self, draft: &GenerationResult) {
        (**self).show_draft(draft)
    }

    fn choose(&mut self) -> Result<Choice> {
        (**self).choose()
    }

    fn feedback(&mut self) -> Result<String> {
        (**self).feedback()
    }

    fn error(&mut self, error: &GenerateError) {
        (**self).error(error)
    }

    fn busy<T, F>(&mut self, message: &str, task: F) -> T
    where
        T: Send,
        F: FnOnce() -> T + Send,
    {
        (**self).busy(message, task)
    }
}

enum State {
    Generating,
    Presenting(GenerationResult),
    Refining(GenerationResult),
    Accepted(GenerationResult),
    Cancelled,
}

/// Generate, present, and refine a draft until the user accepts or cancels.
///
/// Owns the session id. It starts empty and is replaced by the id of every successful call.
pub struct RefinementOrchestrator<'a, P: Presenter> {
    generator: Generator<'a>,
    presenter: P,
    session_id: String,
}

impl<'a, P: Presenter> RefinementOrchestrator<'a, P> {
    pub fn new(generator: Generator<'a>, presenter: P) -> Self {
        RefinementOrchestrator {
            generator,
            presenter,
            session_id: String::new(),
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn run(&mut self, diff: &str, background: Option<&str>) -> Result<Outcome> {
        if diff.trim().is_empty() {
            return Ok(Outcome::NoChanges);
        }

        let mut state = State::Generating;
        loop {
            state = match state {
                State::Generating => {
                    let generator = &self.generator;
                    let result = self.presenter.busy("Generating PR title and body", || {
                        generator.generate(diff, background)
                    });
                    self.settle(result)?
                }
                State::Presenting(draft) => {
                    self.presenter.show_draft(&draft);
                    match self.presenter.choose()? {
                        Choice::Accept => State::Accepted(draft),
                        Choice::Refine => State::Refining(draft),
                        Choice::Cancel => State::Cancelled,
                    }
                }
                State::Refining(draft) => {
                    let feedback = self.presenter.feedback()?;
                    if feedback.trim().is_empty() {
                        log::info!("No feedback given; keeping the current draft");
                        State::Presenting(draft)
                    } else {
                        let refinement = RefinementContext {
                            session_id: self.session_id.clone(),
                            feedback,
                        };
                        let generator = &self.generator;
                        let result = self
                            .presenter
                            .busy("Refining PR title and body", || generator.refine(&refinement));
                        match result {
                            Err(e)
                                if !matches!(e, GenerateError::Interrupted) && !e.aborts_run() =>
                            {
                                log::warn!("Refinement failed, keeping the previous draft: {e}");
                                self.presenter.error(&e);
                                State::Presenting(draft)
                            }
                            result => self.settle(result)?,
                        }
                    }
                }
                State::Accepted(draft) => return Ok(Outcome::Accepted(draft)),
                State::Cancelled => return Ok(Outcome::Cancelled),
            };
        }
    }

    /// Turn a finished call into the next state, recording its session id.
    fn settle(&mut self, result: GenerateResult<GenerationResult>) -> Result<State> {
        match result {
            Ok(draft) => {
                log::debug!("Session {:?} -> {:?}", self.session_id, draft.session_id);
                self.session_id = draft.session_id.clone();
                Ok(State::Presenting(draft))
            }
            Err(GenerateError::Interrupted) => Ok(State::Cancelled),
            Err(e) => Err(e.into()),
        }
    }
}
