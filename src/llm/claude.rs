use std::io::{self, Read, Write};
use std::path::{Path, PathBuf};
use std::process::{Command, ExitStatus, Stdio};
use std::thread;
use std::time::Duration;

use serde::Deserialize;

use super::estimate::estimate_tokens;
use super::{Completion, LlmClient, MAX_INPUT_TOKENS, truncate};
use crate::cancel::CancelToken;
use crate::error::{GenerateError, GenerateResult};

pub const DEFAULT_BINARY: &str = "claude";

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Single JSON record printed by `claude -p --output-format json`.
#[derive(Debug, Deserialize)]
struct CliResponse {
    #[serde(rename = "type", default)]
    kind: String,
    #[serde(default)]
    result: String,
    #[serde(default)]
    session_id: String,
    #[serde(default)]
    is_error: bool,
}

struct CapturedOutput {
    status: ExitStatus,
    stdout: String,
    stderr: String,
}

/// Drives the Claude Code CLI in print mode, one subprocess per call.
pub struct ClaudeCliClient {
    binary: String,
    model: Option<String>,
    cancel: CancelToken,
}

impl ClaudeCliClient {
    pub fn new(binary: impl Into<String>, model: Option<String>, cancel: CancelToken) -> Self {
        ClaudeCliClient {
            binary: binary.into(),
            model,
            cancel,
        }
    }

    fn resolve_binary(&self) -> GenerateResult<PathBuf> {
        which::which(&self.binary).map_err(|e| {
            log::debug!("Could not resolve {:?}: {e}", self.binary);
            GenerateError::ProviderUnavailable {
                binary: self.binary.clone(),
            }
        })
    }

    fn build_args(&self, session_id: Option<&str>) -> Vec<String> {
        let mut args: Vec<String> = vec!["-p".into(), "--output-format".into(), "json".into()];
        if let Some(model) = &self.model {
            args.push("--model".into());
            args.push(model.clone());
        }
        if let Some(id) = session_id {
            args.push("--resume".into());
            args.push(id.to_string());
        }
        args
    }

    /// Spawn the CLI, feed it the prompt and wait, giving up early if the token is cancelled.
    fn run(&self, program: &Path, args: &[String], prompt: &str) -> GenerateResult<CapturedOutput> {
        if self.cancel.is_cancelled() {
            return Err(GenerateError::Interrupted);
        }
        let _busy = self.cancel.enter_busy();

        let mut child = Command::new(program)
            .args(args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| io::Error::other("provider stdin not available"))?;
        let stdout = child
            .stdout
            .take()
            .ok_or_else(|| io::Error::other("provider stdout not available"))?;
        let stderr = child
            .stderr
            .take()
            .ok_or_else(|| io::Error::other("provider stderr not available"))?;

        let input = prompt.as_bytes().to_vec();
        let writer = thread::spawn(move || stdin.write_all(&input));
        let stdout_reader = thread::spawn(move || read_to_string_lossy(stdout));
        let stderr_reader = thread::spawn(move || read_to_string_lossy(stderr));

        let status = loop {
            if self.cancel.is_cancelled() {
                log::warn!("Interrupted; stopping {}", self.binary);
                let _ = child.kill();
                let _ = child.wait();
                return Err(GenerateError::Interrupted);
            }
            match child.try_wait()? {
                Some(status) => break status,
                None => thread::sleep(POLL_INTERVAL),
            }
        };

        // The CLI may exit without draining stdin; its exit status tells the real story.
        if let Ok(Err(e)) = writer.join() {
            log::debug!("Writing prompt to {} failed: {e}", self.binary);
        }

        let stdout = stdout_reader
            .join()
            .map_err(|_| io::Error::other("provider stdout reader panicked"))??;
        let stderr = stderr_reader
            .join()
            .map_err(|_| io::Error::other("provider stderr reader panicked"))??;

        Ok(CapturedOutput {
            status,
            stdout,
            stderr,
        })
    }
}

impl LlmClient for ClaudeCliClient {
    fn complete(&self, prompt: &str, session_id: Option<&str>) -> GenerateResult<Completion> {
        let program = self.resolve_binary()?;

        if prompt.trim().is_empty() {
            return Err(GenerateError::EmptyPrompt);
        }

        let estimated = estimate_tokens(prompt);
        if estimated > MAX_INPUT_TOKENS {
            return Err(GenerateError::PromptTooLarge {
                estimated,
                max: MAX_INPUT_TOKENS,
            });
        }
        log::info!("Prompt size: ~{estimated} tokens (max {MAX_INPUT_TOKENS})");

        let session_id = session_id.filter(|id| !id.is_empty());
        let args = self.build_args(session_id);
        log::debug!("Running {} {}", program.display(), args.join(" "));
        log::trace!("Prompt:\n{}", truncate(prompt, 3000));

        let output = self.run(&program, &args, prompt)?;
        let stdout = self.check_exit(output)?;

        decode_response(&stdout)
    }
}

impl ClaudeCliClient {
    /// Stdout of a finished run, or the reason it cannot be used.
    ///
    /// Ctrl-C reaches the child too, so a child that died in the same tick the token was set is
    /// still an interrupt rather than a process failure.
    fn check_exit(&self, output: CapturedOutput) -> GenerateResult<String> {
        if self.cancel.is_cancelled() {
            return Err(GenerateError::Interrupted);
        }

        if !output.status.success() {
            let combined = format!("{}{}", output.stdout, output.stderr);
            return Err(GenerateError::ProviderProcess {
                code: output.status.code().unwrap_or(-1),
                output: combined.trim().to_string(),
            });
        }

        if !output.stderr.trim().is_empty() {
            log::debug!("{} stderr: {}", self.binary, output.stderr.trim());
        }

        Ok(output.stdout)
    }
}

fn read_to_string_lossy(mut reader: impl Read) -> io::Result<String> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

fn decode_response(raw: &str) -> GenerateResult<Completion> {
    let parsed: CliResponse =
        serde_json::from_str(raw.trim()).map_err(|source| GenerateError::Decode {
            source,
            raw: raw.to_string(),
        })?;

    log::trace!(
        "Provider record: type={:?} is_error={} session={:?}",
        parsed.kind,
        parsed.is_error,
        parsed.session_id
    );

    if parsed.is_error {
        return Err(GenerateError::ProviderLogical(parsed.result));
    }
    if parsed.result.is_empty() {
        return Err(GenerateError::EmptyResponse);
    }

    Ok(Completion {
        text: parsed.result,
        session_id: parsed.session_id,
    })
}
