use anyhow::Result;
use log::debug;

use crate::cancel::CancelToken;
use crate::cli_args::Cli;
use crate::config::Config;
use crate::llm::claude::DEFAULT_BINARY;
use crate::llm::{ClaudeCliClient, NoopClient, Provider, ProviderKind};

const DEFAULT_PROVIDER: &str = "claude";

/// Provider choice after CLI flags, environment, and config.toml are merged.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProviderSettings {
    pub kind: ProviderKind,
    pub model: Option<String>,
    pub binary: String,
}

/// Precedence:
///   1. `--no-model`, or a model named "none"
///   2. CLI flags / env (`--provider`, `--model`, `PRGEN_PROVIDER`, `PRGEN_MODEL`)
///   3. `config.toml` keys `provider`, `model`, `binary`
///   4. defaults (`claude`, no model)
pub fn resolve_settings(cli: &Cli, cfg: &Config) -> Result<ProviderSettings> {
    let model = cli
        .model
        .as_deref()
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .or_else(|| cfg.provider_setting("model"))
        .map(String::from);

    let model_disabled = model
        .as_deref()
        .is_some_and(|m| m.eq_ignore_ascii_case("none"));

    let kind = if cli.no_model || model_disabled {
        ProviderKind::Noop
    } else {
        let name = cli
            .provider
            .as_deref()
            .filter(|p| !p.trim().is_empty())
            .or_else(|| cfg.provider_setting("provider"))
            .unwrap_or(DEFAULT_PROVIDER);
        ProviderKind::from_name(name)?
    };

    let binary = cfg
        .provider_setting("binary")
        .unwrap_or(DEFAULT_BINARY)
        .to_string();

    Ok(ProviderSettings {
        model: if kind == ProviderKind::Noop { None } else { model },
        kind,
        binary,
    })
}

/// Build the LLM backend for the resolved settings.
pub fn build_provider(settings: &ProviderSettings, cancel: &CancelToken) -> Provider {
    match settings.kind {
        ProviderKind::Claude => {
            debug!(
                "Using Claude CLI ({}) with model: {}",
                settings.binary,
                settings.model.as_deref().unwrap_or("<cli default>")
            );
            Provider::Claude(ClaudeCliClient::new(
                settings.binary.clone(),
                settings.model.clone(),
                cancel.clone(),
            ))
        }
        ProviderKind::Noop => {
            debug!("Using NoopClient (no model calls).");
            Provider::Noop(NoopClient::new())
        }
    }
}
