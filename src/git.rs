use anyhow::{Context, Result, anyhow};
use std::process::Command as GitCommand;

/// Run git and return stdout. A failed exit carries git's stderr.
fn git(args: &[&str]) -> Result<String> {
    log::debug!("git {}", args.join(" "));
    let output = GitCommand::new("git")
        .args(args)
        .output()
        .with_context(|| format!("failed to run git {:?}", args))?;

    if !output.status.success() {
        return Err(anyhow!(
            "git {} exited with status {:?}: {}",
            args.join(" "),
            output.status.code(),
            String::from_utf8_lossy(&output.stderr).trim()
        ));
    }

    Ok(String::from_utf8_lossy(&output.stdout).into_owned())
}

pub fn current_branch() -> Result<String> {
    let name = git(&["branch", "--show-current"])?.trim().to_string();
    if name.is_empty() {
        return Err(anyhow!("not on a branch (detached HEAD?)"));
    }
    Ok(name)
}

/// Changes on this branch since it diverged from `base`. Empty means nothing to propose.
pub fn diff_against(base: &str) -> Result<String> {
    let range = format!("{base}...HEAD");
    let diff = git(&["diff", &range])
        .with_context(|| format!("could not diff against base branch {base:?}"))?;
    Ok(diff.trim().to_string())
}

/// Push the current branch to origin with upstream tracking, returning its name.
pub fn push_current_branch() -> Result<String> {
    let branch = current_branch()?;
    log::info!("Pushing {branch} to origin");
    git(&["push", "-u", "origin", &branch])
        .with_context(|| format!("failed to push branch {branch}"))?;
    Ok(branch)
}
