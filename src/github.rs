use anyhow::{Context, Result, anyhow};
use std::process::{Command, Stdio};

/// Make sure `gh` is installed and logged in before anything is published.
pub fn check_gh_cli() -> Result<()> {
    which::which("gh")
        .map_err(|_| anyhow!("gh CLI is not installed. Install it from https://cli.github.com/"))?;

    let status = Command::new("gh")
        .args(["auth", "status"])
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .context("failed to run gh auth status")?;

    if !status.success() {
        return Err(anyhow!("not authenticated with GitHub. Run 'gh auth login'"));
    }
    Ok(())
}

/// Create a draft pull request against `base`, returning its URL.
pub fn create_draft_pr(title: &str, body: &str, base: &str) -> Result<String> {
    log::info!("Creating draft PR against {base}");
    let output = Command::new("gh")
        .args(pr_create_args(title, body, base))
        .output()
        .context("failed to execute gh pr create")?;

    if !output.status.success() {
        return Err(anyhow!(
            "gh pr create failed: {}",
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).trim().to_string())
}

/// Open the current branch's PR in a browser.
pub fn open_in_browser() -> Result<()> {
    let status = Command::new("gh")
        .args(["pr", "view", "--web"])
        .status()
        .context("failed to run gh pr view --web")?;

    if !status.success() {
        return Err(anyhow!("gh pr view --web exited with status {:?}", status.code()));
    }
    Ok(())
}

fn pr_create_args<'a>(title: &'a str, body: &'a str, base: &'a str) -> [&'a str; 9] {
    [
        "pr", "create", "--title", title, "--body", body, "--base", base, "--draft",
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn create_args_mark_the_pr_as_draft() {
        let args = pr_create_args("Add cache", "## Summary", "develop");
        assert_eq!(&args[..3], ["pr", "create", "--title"]);
        assert_eq!(args[3], "Add cache");
        assert_eq!(args[5], "## Summary");
        assert_eq!(args[7], "develop");
        assert!(args.contains(&"--draft"));
    }
}
