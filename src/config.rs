use anyhow::{Context, Result, anyhow};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

const CONFIG_FILE: &str = "config.toml";
const TITLE_INSTRUCTIONS_FILE: &str = "title_instructions.md";
const TITLE_EXAMPLE_FILE: &str = "title_example.md";
const BODY_INSTRUCTIONS_FILE: &str = "body_instructions.md";
const BODY_EXAMPLE_FILE: &str = "body_example.md";

/// Files seeded into a fresh config directory.
const TEMPLATES: [(&str, &str); 5] = [
    (CONFIG_FILE, include_str!("templates/config.toml")),
    (
        TITLE_INSTRUCTIONS_FILE,
        include_str!("templates/title_instructions.md"),
    ),
    (TITLE_EXAMPLE_FILE, include_str!("templates/title_example.md")),
    (
        BODY_INSTRUCTIONS_FILE,
        include_str!("templates/body_instructions.md"),
    ),
    (BODY_EXAMPLE_FILE, include_str!("templates/body_example.md")),
];

/// Resolved prgen configuration. Loaded once per run and only read afterwards.
#[derive(Debug, Clone, Default)]
pub struct Config {
    pub dir: PathBuf,
    /// Provider settings from `config.toml`, kept opaque (e.g. `provider`, `model`).
    pub provider: toml::Table,
    pub title_instructions: String,
    pub title_example: String,
    pub body_instructions: String,
    pub body_example: String,
}

impl Config {
    /// Load from `dir`, seeding any missing file from the built-in templates first.
    pub fn load(dir: &Path) -> Result<Self> {
        ensure_config_exists(dir)?;

        let raw = read_file(dir, CONFIG_FILE)?;
        let provider = toml::from_str::<toml::Table>(&raw)
            .with_context(|| format!("failed to parse {:?}", dir.join(CONFIG_FILE)))?;

        Ok(Config {
            dir: dir.to_path_buf(),
            provider,
            title_instructions: read_file(dir, TITLE_INSTRUCTIONS_FILE)?,
            title_example: read_file(dir, TITLE_EXAMPLE_FILE)?,
            body_instructions: read_file(dir, BODY_INSTRUCTIONS_FILE)?,
            body_example: read_file(dir, BODY_EXAMPLE_FILE)?,
        })
    }

    /// A string value from the provider table. Blank strings count as unset.
    pub fn provider_setting(&self, key: &str) -> Option<&str> {
        self.provider
            .get(key)
            .and_then(|v| v.as_str())
            .map(str::trim)
            .filter(|s| !s.is_empty())
    }

    pub fn config_file(&self) -> PathBuf {
        self.dir.join(CONFIG_FILE)
    }
}

/// `$PRGEN_CONFIG_DIR`, or `~/.config/prgen`.
pub fn config_dir() -> Result<PathBuf> {
    if let Ok(dir) = env::var("PRGEN_CONFIG_DIR") {
        if !dir.trim().is_empty() {
            return Ok(PathBuf::from(dir));
        }
    }
    let home = dirs::home_dir().ok_or_else(|| anyhow!("could not determine home directory"))?;
    Ok(home.join(".config").join("prgen"))
}

fn ensure_config_exists(dir: &Path) -> Result<()> {
    fs::create_dir_all(dir)
        .with_context(|| format!("failed to create config directory {:?}", dir))?;

    for (name, contents) in TEMPLATES {
        let path = dir.join(name);
        if path.exists() {
            continue;
        }
        fs::write(&path, contents).with_context(|| format!("failed to create {:?}", path))?;
        log::warn!("Created {name} at {}", path.display());
    }

    Ok(())
}

fn read_file(dir: &Path, name: &str) -> Result<String> {
    let path = dir.join(name);
    fs::read_to_string(&path).with_context(|| format!("failed to read {:?}", path))
}

/// Open `path` in `$EDITOR`, then `$VISUAL`, falling back to `vi`.
pub fn open_in_editor(path: &Path) -> Result<()> {
    let editor = env::var("EDITOR")
        .ok()
        .filter(|e| !e.trim().is_empty())
        .or_else(|| env::var("VISUAL").ok().filter(|e| !e.trim().is_empty()))
        .unwrap_or_else(|| "vi".to_string());

    let status = Command::new(&editor)
        .arg(path)
        .status()
        .with_context(|| format!("failed to launch editor {editor:?}"))?;

    if !status.success() {
        return Err(anyhow!(
            "editor {editor:?} exited with status {:?} (config file: {})",
            status.code(),
            path.display()
        ));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_seeds_missing_files() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("prgen");

        let cfg = Config::load(&dir).unwrap();

        for (name, _) in TEMPLATES {
            assert!(dir.join(name).exists(), "{name} was not created");
        }
        assert_eq!(cfg.provider_setting("provider"), Some("claude"));
        assert_eq!(cfg.provider_setting("model"), None);
        assert!(!cfg.title_instructions.is_empty());
        assert!(!cfg.body_instructions.is_empty());
    }

    #[test]
    fn existing_files_are_not_overwritten() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join(TITLE_EXAMPLE_FILE), "").unwrap();
        fs::write(
            tmp.path().join(CONFIG_FILE),
            "provider = \"none\"\nmodel = \"opus\"\n[extra]\nkey = 1\n",
        )
        .unwrap();

        let cfg = Config::load(tmp.path()).unwrap();

        assert_eq!(cfg.title_example, "");
        assert_eq!(cfg.provider_setting("provider"), Some("none"));
        assert_eq!(cfg.provider_setting("model"), Some("opus"));
        assert!(cfg.provider.contains_key("extra"));
    }

    #[test]
    fn invalid_toml_is_reported() {
        let tmp = tempfile::tempdir().unwrap();
        fs::write(tmp.path().join(CONFIG_FILE), "provider = ").unwrap();

        let err = Config::load(tmp.path()).unwrap_err();
        assert!(format!("{err:#}").contains("failed to parse"));
    }

    #[test]
    fn blank_settings_count_as_unset() {
        let mut cfg = Config::default();
        cfg.provider
            .insert("model".into(), toml::Value::String("  ".into()));
        cfg.provider.insert("retries".into(), toml::Value::Integer(3));

        assert_eq!(cfg.provider_setting("model"), None);
        assert_eq!(cfg.provider_setting("retries"), None);
    }
}
