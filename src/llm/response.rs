use crate::error::{GenerateError, GenerateResult};

const TITLE_PREFIX: &str = "TITLE:";
const BODY_PREFIX: &str = "BODY:";

/// Title and body pulled out of a model response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Draft {
    pub title: String,
    pub body: String,
}

/// Extract the `TITLE:` line and the `BODY:` block from raw model output.
///
/// Once `BODY:` is seen every following line belongs to the body, even one that starts with
/// `TITLE:`.
pub fn parse_response(text: &str) -> GenerateResult<Draft> {
    let mut title: Option<String> = None;
    let mut body_lines: Vec<&str> = Vec::new();
    let mut collecting_body = false;

    for line in text.split('\n') {
        if collecting_body {
            body_lines.push(line);
        } else if let Some(rest) = line.strip_prefix(TITLE_PREFIX) {
            title = Some(rest.trim().to_string());
        } else if line.starts_with(BODY_PREFIX) {
            collecting_body = true;
        }
    }

    let title = match title {
        Some(t) if !t.is_empty() => t,
        _ => return Err(GenerateError::TitleNotFound),
    };

    let body = body_lines.join("\n").trim().to_string();
    if body.is_empty() {
        return Err(GenerateError::BodyNotFound);
    }

    Ok(Draft { title, body })
}
