use anyhow::Result;
use colored::Colorize;
use crossterm::tty::IsTty;
use indicatif::{ProgressBar, ProgressStyle};
use std::env;
use std::io::{self, Write};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use crate::cancel::CancelToken;
use crate::error::GenerateError;
use crate::generate::GenerationResult;
use crate::refine::{Choice, Presenter};

const SPINNER_TICK: Duration = Duration::from_millis(80);
const RULE_WIDTH: usize = 60;

/// Styling decisions for one run, passed to whatever prints.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderContext {
    pub color: bool,
    pub interactive: bool,
}

impl RenderContext {
    /// Color only when stdout is a terminal and `NO_COLOR` is unset.
    pub fn detect() -> Self {
        let color = io::stdout().is_tty() && env::var_os("NO_COLOR").is_none();
        RenderContext {
            color,
            interactive: io::stdin().is_tty(),
        }
    }

    pub fn plain() -> Self {
        RenderContext {
            color: false,
            interactive: false,
        }
    }

    pub fn heading(&self, text: &str) -> String {
        if self.color {
            text.cyan().bold().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn success(&self, text: &str) -> String {
        if self.color {
            text.green().bold().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn warning(&self, text: &str) -> String {
        if self.color {
            text.yellow().bold().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn error(&self, text: &str) -> String {
        if self.color {
            text.red().bold().to_string()
        } else {
            text.to_string()
        }
    }

    pub fn muted(&self, text: &str) -> String {
        if self.color {
            text.bright_black().to_string()
        } else {
            text.to_string()
        }
    }

    fn rule(&self, label: &str) -> String {
        let label = format!("----- {label} ");
        let pad = RULE_WIDTH.saturating_sub(label.chars().count());
        self.heading(&format!("{label}{}", "-".repeat(pad)))
    }

    pub fn render_draft(&self, draft: &GenerationResult) -> String {
        format!(
            "{title_rule}\n{title}\n{body_rule}\n{body}\n{end}",
            title_rule = self.rule("PR Title"),
            title = draft.title,
            body_rule = self.rule("PR Body"),
            body = draft.body,
            end = self.heading(&"-".repeat(RULE_WIDTH)),
        )
    }
}

/// Interactive terminal presenter.
pub struct Terminal {
    ctx: RenderContext,
    cancel: CancelToken,
}

impl Terminal {
    pub fn new(ctx: RenderContext, cancel: CancelToken) -> Self {
        Terminal { ctx, cancel }
    }

    pub fn ctx(&self) -> RenderContext {
        self.ctx
    }

    pub fn info(&self, message: &str) {
        println!("{}", self.ctx.muted(message));
    }

    pub fn success(&self, message: &str) {
        println!("{}", self.ctx.success(message));
    }

    pub fn warn(&self, message: &str) {
        println!("{}", self.ctx.warning(message));
    }

    pub fn show_pr_url(&self, url: &str) {
        println!();
        println!("{}", self.ctx.success("Draft pull request created"));
        println!("{}", self.ctx.heading(url));
    }

    /// Yes/no question; Enter means yes, end of input means no.
    pub fn confirm(&self, question: &str) -> Result<bool> {
        let answer = prompt_input(&self.ctx.warning(&format!("{question} (Y/n): ")))?;
        Ok(match answer {
            None => false,
            Some(a) => !matches!(a.to_lowercase().as_str(), "n" | "no"),
        })
    }

    /// Optional free-form notes, terminated by an empty line.
    pub fn ask_background(&self) -> Result<Option<String>> {
        println!();
        println!("{}", self.ctx.heading("Background information"));
        println!(
            "{}",
            self.ctx
                .muted("What problem does this solve, what approach did you take, anything reviewers should know?")
        );
        println!("{}", self.ctx.muted("Finish with an empty line (or just press Enter to skip)."));

        let mut lines: Vec<String> = Vec::new();
        loop {
            match read_line_raw()? {
                Some(line) if !line.trim().is_empty() => lines.push(line),
                _ => break,
            }
        }

        if lines.is_empty() {
            self.info("No background information provided");
            return Ok(None);
        }
        Ok(Some(lines.join("\n")))
    }
}

impl Presenter for Terminal {
    fn show_draft(&mut self, draft: &GenerationResult) {
        println!();
        println!("{}", self.ctx.render_draft(draft));
    }

    fn choose(&mut self) -> Result<Choice> {
        loop {
            let prompt = format!(
                "{} ",
                self.ctx.warning("[a]ccept and publish / [r]efine / [c]ancel:")
            );
            let Some(input) = prompt_input(&prompt)? else {
                return Ok(Choice::Cancel);
            };
            match Choice::from_input(&input) {
                Some(choice) => return Ok(choice),
                None => println!("{}", self.ctx.error("Invalid choice. Please enter a, r, or c.")),
            }
        }
    }

    fn feedback(&mut self) -> Result<String> {
        let prompt = format!(
            "{} ",
            self.ctx
                .heading("What should change? (empty keeps the current draft):")
        );
        Ok(prompt_input(&prompt)?.unwrap_or_default())
    }

    fn error(&mut self, error: &GenerateError) {
        println!("{}", self.ctx.error(&format!("Refinement failed: {error}")));
        println!("{}", self.ctx.muted("Keeping the previous draft."));
    }

    fn busy<T, F>(&mut self, message: &str, task: F) -> T
    where
        T: Send,
        F: FnOnce() -> T + Send,
    {
        let template = if self.ctx.color {
            "{spinner:.cyan} {msg}"
        } else {
            "{spinner} {msg}"
        };
        let cancel = &self.cancel;

        thread::scope(|scope| {
            let (done_tx, done_rx) = mpsc::channel::<()>();
            let worker = scope.spawn(move || {
                let out = task();
                let _ = done_tx.send(());
                out
            });

            let spinner = ProgressBar::new_spinner();
            if let Ok(style) = ProgressStyle::with_template(template) {
                spinner.set_style(style);
            }
            spinner.set_message(message.to_string());

            loop {
                match done_rx.recv_timeout(SPINNER_TICK) {
                    Ok(()) | Err(RecvTimeoutError::Disconnected) => {
                        spinner.finish_and_clear();
                        break;
                    }
                    Err(RecvTimeoutError::Timeout) if cancel.is_cancelled() => {
                        spinner.abandon_with_message(format!("{message} - cancelling"));
                        break;
                    }
                    Err(RecvTimeoutError::Timeout) => spinner.tick(),
                }
            }

            match worker.join() {
                Ok(out) => out,
                Err(panic) => std::panic::resume_unwind(panic),
            }
        })
    }
}

/// Print a prompt and read one trimmed line. `None` at end of input.
fn prompt_input(prompt: &str) -> Result<Option<String>> {
    print!("{prompt}");
    io::stdout().flush()?;
    Ok(read_line_raw()?.map(|l| l.trim().to_string()))
}

fn read_line_raw() -> Result<Option<String>> {
    let mut buf = String::new();
    let n = io::stdin().read_line(&mut buf)?;
    if n == 0 {
        return Ok(None);
    }
    Ok(Some(buf.trim_end_matches(['\n', '\r']).to_string()))
}
