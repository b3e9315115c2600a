mod cancel;
mod cli_args;
mod config;
mod error;
mod generate;
mod git;
mod github;
mod llm;
mod logging;
mod refine;
mod setup;
mod summarize;
mod ui;

use anyhow::Result;
use clap::Parser;

use crate::cancel::CancelToken;
use crate::cli_args::Cli;
use crate::config::Config;
use crate::generate::{GenerationResult, Generator};
use crate::refine::{Outcome, RefinementOrchestrator};
use crate::summarize::FileFilterSummarizer;
use crate::ui::{RenderContext, Terminal};

fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logger(cli.verbose);

    let cfg = Config::load(&config::config_dir()?)?;
    if cli.config {
        return config::open_in_editor(&cfg.config_file());
    }

    let settings = setup::resolve_settings(&cli, &cfg)?;
    log::info!("Config loaded from: {}", cfg.dir.display());
    log::info!("LLM provider: {}", settings.kind.as_str());
    log::info!(
        "Model: {}",
        settings.model.as_deref().unwrap_or("<provider default>")
    );

    let cancel = CancelToken::new();
    cancel::install_interrupt_handler(&cancel)?;
    let provider = setup::build_provider(&settings, &cancel);

    let ctx = RenderContext::detect();
    let mut terminal = Terminal::new(ctx, cancel.clone());

    let diff = git::diff_against(&cli.base)?;
    if diff.is_empty() {
        terminal.warn(&format!(
            "No changes detected against {}. Nothing to generate a PR for.",
            cli.base
        ));
        return Ok(());
    }
    terminal.info(&format!(
        "Found changes against {} ({} characters)",
        cli.base,
        diff.len()
    ));

    let background = match cli.background.clone() {
        Some(notes) => Some(notes),
        None if ctx.interactive => terminal.ask_background()?,
        None => None,
    };

    let summarizer = FileFilterSummarizer::default();
    let generator = Generator::new(&cfg, &provider, &summarizer);
    let mut orchestrator = RefinementOrchestrator::new(generator, &mut terminal);
    let outcome = orchestrator.run(&diff, background.as_deref())?;
    log::debug!("Last LLM session: {:?}", orchestrator.session_id());

    match outcome {
        Outcome::Accepted(draft) if cli.dry_run => {
            terminal.info("Dry run: not pushing or creating a pull request.");
            println!("{}", RenderContext::plain().render_draft(&draft));
            Ok(())
        }
        Outcome::Accepted(draft) => publish(&terminal, &draft, &cli.base),
        Outcome::Cancelled => {
            terminal.warn("Cancelled. Nothing was published.");
            Ok(())
        }
        Outcome::NoChanges => {
            terminal.warn("No changes detected. Nothing to generate a PR for.");
            Ok(())
        }
    }
}

/// Push the branch and open a draft PR. Only the browser step may fail without failing the run.
fn publish(terminal: &Terminal, draft: &GenerationResult, base: &str) -> Result<()> {
    github::check_gh_cli()?;
    let branch = git::push_current_branch()?;
    terminal.success(&format!("Pushed {branch} to origin"));

    let url = github::create_draft_pr(&draft.title, &draft.body, base)?;
    terminal.show_pr_url(&url);

    if !terminal.ctx().interactive {
        return Ok(());
    }

    match terminal.confirm("Open the pull request in your browser?") {
        Ok(true) => {
            if let Err(e) = github::open_in_browser() {
                log::warn!("Could not open browser: {e:#}");
                terminal.warn(&format!("Could not open the browser; the PR is at {url}"));
            }
        }
        Ok(false) => {}
        Err(e) => log::warn!("Could not read answer: {e:#}"),
    }

    Ok(())
}
