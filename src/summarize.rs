use anyhow::{Result, bail};

use crate::llm::estimate::estimate_tokens;

/// Diffs estimated above this many tokens are summarized before prompting.
pub const SUMMARIZE_THRESHOLD: usize = 6000;

const DEFAULT_MAX_LINES_PER_FILE: usize = 120;
const MIN_LINES_PER_FILE: usize = 8;

const LOCKFILES: &[&str] = &[
    "Cargo.lock",
    "package-lock.json",
    "npm-shrinkwrap.json",
    "yarn.lock",
    "pnpm-lock.yaml",
    "bun.lockb",
    "poetry.lock",
    "uv.lock",
    "Pipfile.lock",
    "Gemfile.lock",
    "composer.lock",
    "go.sum",
    "flake.lock",
];

const GENERATED_DIRS: &[&str] = &["node_modules/", "vendor/", "dist/", "target/", "__snapshots__/"];

/// Reduced diff substituted for an oversized one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffSummary {
    pub filtered_diff: String,
}

pub trait DiffSummarizer: Send + Sync {
    fn summarize(&self, diff: &str) -> Result<DiffSummary>;
}

/// Drops noise files (lockfiles, minified, generated, binary) and clips every remaining file to a
/// line budget, halving the budget until the result fits `target_tokens`.
#[derive(Debug, Clone)]
pub struct FileFilterSummarizer {
    max_lines_per_file: usize,
    target_tokens: usize,
}

impl Default for FileFilterSummarizer {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_LINES_PER_FILE, SUMMARIZE_THRESHOLD)
    }
}

struct FileSection<'a> {
    path: String,
    lines: Vec<&'a str>,
}

impl FileFilterSummarizer {
    pub fn new(max_lines_per_file: usize, target_tokens: usize) -> Self {
        FileFilterSummarizer {
            max_lines_per_file: max_lines_per_file.max(MIN_LINES_PER_FILE),
            target_tokens,
        }
    }

    fn render(kept: &[FileSection<'_>], omitted: &[String], budget: usize) -> String {
        let mut out: Vec<String> = Vec::new();

        for section in kept {
            if section.lines.len() <= budget {
                out.push(section.lines.join("\n"));
            } else {
                let mut text = section.lines[..budget].join("\n");
                text.push_str(&format!(
                    "\n... [{} more lines in {} omitted]",
                    section.lines.len() - budget,
                    section.path
                ));
                out.push(text);
            }
        }

        if !omitted.is_empty() {
            out.push(format!("[Files omitted from this diff: {}]", omitted.join(", ")));
        }

        out.join("\n")
    }
}

impl DiffSummarizer for FileFilterSummarizer {
    fn summarize(&self, diff: &str) -> Result<DiffSummary> {
        let sections = split_sections(diff);
        if sections.is_empty() {
            bail!("diff contains no file sections");
        }

        let mut kept = Vec::new();
        let mut omitted = Vec::new();
        for section in sections {
            match skip_reason(&section) {
                Some(reason) => omitted.push(format!("{} ({reason})", section.path)),
                None => kept.push(section),
            }
        }

        if kept.is_empty() {
            bail!(
                "every file in the diff was filtered out: {}",
                omitted.join(", ")
            );
        }

        let mut budget = self.max_lines_per_file;
        let mut rendered = Self::render(&kept, &omitted, budget);
        while estimate_tokens(&rendered) > self.target_tokens && budget > MIN_LINES_PER_FILE {
            budget = (budget / 2).max(MIN_LINES_PER_FILE);
            rendered = Self::render(&kept, &omitted, budget);
        }

        log::info!(
            "Summarized diff: {} file(s) kept, {} omitted, {} lines per file, ~{} tokens",
            kept.len(),
            omitted.len(),
            budget,
            estimate_tokens(&rendered)
        );

        Ok(DiffSummary {
            filtered_diff: rendered,
        })
    }
}

/// Split a unified git diff at each `diff --git` header. Text before the first header is dropped.
fn split_sections(diff: &str) -> Vec<FileSection<'_>> {
    let mut sections: Vec<FileSection<'_>> = Vec::new();

    for line in diff.lines() {
        if let Some(header) = line.strip_prefix("diff --git ") {
            sections.push(FileSection {
                path: path_from_header(header),
                lines: vec![line],
            });
        } else if let Some(current) = sections.last_mut() {
            current.lines.push(line);
        }
    }

    sections
}

/// `a/src/x.rs b/src/x.rs` -> `src/x.rs`
fn path_from_header(header: &str) -> String {
    match header.rfind(" b/") {
        Some(idx) => header[idx + 3..].to_string(),
        None => header.trim().to_string(),
    }
}

fn skip_reason(section: &FileSection<'_>) -> Option<&'static str> {
    let path = section.path.as_str();
    let file_name = path.rsplit('/').next().unwrap_or(path);

    if LOCKFILES.contains(&file_name) {
        return Some("lockfile");
    }
    if file_name.contains(".min.") || file_name.ends_with(".map") {
        return Some("minified");
    }
    if GENERATED_DIRS
        .iter()
        .any(|dir| path.starts_with(dir) || path.contains(&format!("/{dir}")))
    {
        return Some("generated");
    }
    if section
        .lines
        .iter()
        .any(|l| l.starts_with("Binary files ") || l.starts_with("GIT binary patch"))
    {
        return Some("binary");
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_diff(path: &str, added: usize) -> String {
        let mut out = format!(
            "diff --git a/{path} b/{path}\nindex 1111111..2222222 100644\n--- a/{path}\n+++ b/{path}\n@@ -1,1 +1,{added} @@\n"
        );
        for i in 0..added {
            out.push_str(&format!("+    let value_{i} = compute_something({i});\n"));
        }
        out
    }

    #[test]
    fn lockfiles_and_binaries_are_dropped() {
        let diff = format!(
            "{}{}diff --git a/logo.png b/logo.png\nBinary files a/logo.png and b/logo.png differ\n{}",
            file_diff("src/main.rs", 3),
            file_diff("Cargo.lock", 50),
            file_diff("web/node_modules/pkg/index.js", 5),
        );

        let summary = FileFilterSummarizer::default().summarize(&diff).unwrap();

        assert!(summary.filtered_diff.contains("diff --git a/src/main.rs b/src/main.rs"));
        assert!(!summary.filtered_diff.contains("diff --git a/Cargo.lock"));
        assert!(summary.filtered_diff.contains("Cargo.lock (lockfile)"));
        assert!(summary.filtered_diff.contains("logo.png (binary)"));
        assert!(summary.filtered_diff.contains("web/node_modules/pkg/index.js (generated)"));
    }

    #[test]
    fn long_files_are_clipped() {
        let summary = FileFilterSummarizer::new(20, SUMMARIZE_THRESHOLD)
            .summarize(&file_diff("src/big.rs", 100))
            .unwrap();

        assert_eq!(summary.filtered_diff.lines().count(), 21);
        assert!(summary.filtered_diff.contains("[85 more lines in src/big.rs omitted]"));
    }

    #[test]
    fn oversized_diff_is_brought_under_target() {
        let diff: String = (0..20)
            .map(|i| file_diff(&format!("src/module_{i}.rs"), 400))
            .collect();
        assert!(estimate_tokens(&diff) > SUMMARIZE_THRESHOLD);

        let summary = FileFilterSummarizer::default().summarize(&diff).unwrap();

        assert!(estimate_tokens(&summary.filtered_diff) <= SUMMARIZE_THRESHOLD);
        for i in 0..20 {
            assert!(summary.filtered_diff.contains(&format!("b/src/module_{i}.rs")));
        }
    }

    #[test]
    fn text_without_file_sections_fails() {
        let err = FileFilterSummarizer::default()
            .summarize("just some text\nno headers")
            .unwrap_err();
        assert!(err.to_string().contains("no file sections"));
    }

    #[test]
    fn fully_filtered_diff_fails() {
        let err = FileFilterSummarizer::default()
            .summarize(&file_diff("yarn.lock", 10))
            .unwrap_err();
        assert!(err.to_string().contains("filtered out"));
    }

    #[test]
    fn path_is_taken_from_b_side() {
        assert_eq!(path_from_header("a/old.rs b/new.rs"), "new.rs");
        assert_eq!(path_from_header("a/dir/x y.rs b/dir/x y.rs"), "dir/x y.rs");
    }
}
