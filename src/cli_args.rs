use clap::{ArgAction, ArgGroup, Parser};

/// CLI options
#[derive(Parser, Debug)]
#[command(
    name = "prgen",
    version,
    about = "Draft a pull request title and body from your branch diff with an LLM, refine it, then open it as a draft PR",
    after_help = "Your instructions and examples live under ~/.config/prgen/ (override with PRGEN_CONFIG_DIR)."
)]
#[command(group(
    ArgGroup::new("model_group")
        .args(["model", "no_model"])
        .multiple(false)
))]
pub struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Model name passed to the provider CLI. If 'none', acts like --no-model.
    #[arg(long, env = "PRGEN_MODEL")]
    pub model: Option<String>,

    /// Disable model calls; return dummy drafts instead
    #[arg(long)]
    pub no_model: bool,

    /// Provider backend (e.g. 'claude'); overrides config.toml
    #[arg(long, env = "PRGEN_PROVIDER")]
    pub provider: Option<String>,

    /// Base branch the pull request targets
    #[arg(long, default_value = "main")]
    pub base: String,

    /// Background notes for the model; skips the interactive question
    #[arg(long)]
    pub background: Option<String>,

    /// Print the accepted draft instead of pushing and opening a PR
    #[arg(long)]
    pub dry_run: bool,

    /// Open config.toml in $EDITOR and exit
    #[arg(short, long)]
    pub config: bool,
}
