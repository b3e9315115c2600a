pub const BACKGROUND_HEADER: &str = "BACKGROUND INFORMATION:";
pub const TITLE_REQUIREMENTS_HEADER: &str = "TITLE REQUIREMENTS:";
pub const TITLE_EXAMPLE_HEADER: &str = "TITLE EXAMPLE:";
pub const BODY_REQUIREMENTS_HEADER: &str = "BODY REQUIREMENTS:";
pub const BODY_EXAMPLE_HEADER: &str = "BODY EXAMPLE:";
pub const DIFF_HEADER: &str = "GIT DIFF:";

pub const REFINEMENT_LEAD: &str = "Please refine the PR title and body based on my feedback:";

/// Closing directive shared by both prompt shapes. The response parser depends on it.
pub const OUTPUT_FORMAT: &str = r#"Please generate both a PR title and a PR body based on the sections above.
Respond with exactly the following format and nothing before it:
TITLE: [your generated title]
BODY:
[your generated body]"#;
