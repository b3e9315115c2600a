use crate::config::Config;
use crate::llm::prompts;

/// Full first-round prompt: background, instructions, examples, diff, then the format directive.
///
/// Blank optional sections are left out along with their header.
pub fn initial_prompt(config: &Config, diff: &str, background: Option<&str>) -> String {
    let mut sections: Vec<String> = Vec::new();

    push_section(&mut sections, prompts::BACKGROUND_HEADER, background.unwrap_or(""));
    push_section(
        &mut sections,
        prompts::TITLE_REQUIREMENTS_HEADER,
        &config.title_instructions,
    );
    push_section(&mut sections, prompts::TITLE_EXAMPLE_HEADER, &config.title_example);
    push_section(
        &mut sections,
        prompts::BODY_REQUIREMENTS_HEADER,
        &config.body_instructions,
    );
    push_section(&mut sections, prompts::BODY_EXAMPLE_HEADER, &config.body_example);
    push_section(&mut sections, prompts::DIFF_HEADER, diff);
    sections.push(prompts::OUTPUT_FORMAT.to_owned());

    sections.join("\n\n")
}

/// Follow-up prompt for a resumed session. The provider already holds the instructions and diff.
pub fn refinement_prompt(feedback: &str) -> String {
    format!(
        "{lead}\n\n{feedback}\n\n{format}",
        lead = prompts::REFINEMENT_LEAD,
        feedback = feedback.trim(),
        format = prompts::OUTPUT_FORMAT
    )
}

fn push_section(sections: &mut Vec<String>, header: &str, content: &str) {
    let content = content.trim();
    if content.is_empty() {
        return;
    }
    sections.push(format!("{header}\n{content}"));
}
