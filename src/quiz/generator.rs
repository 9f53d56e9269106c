use std::collections::HashSet;
use std::future::Future;

use chatgpt::client::ChatGPT;
use chatgpt::config::{ChatGPTEngine, ModelConfiguration};
use chatgpt::types::CompletionResponse;
use serde::Deserialize;

use crate::config::GeneratorSettings;
use crate::error::GenerationError;
use crate::quiz::Question;

pub const OPTIONS_PER_QUESTION: usize = 4;

const QUESTION_PROMPT: &str = "Generate an intermediate-level Excel multiple-choice question.
Return only a JSON object with the fields \"question\" (string), \"options\" (a list of exactly 4 distinct strings) and \"answer\" (string, one of the options).";

/// Something that can be asked for one freshly generated question.
///
/// Implementations return the raw response text; validation happens in
/// [`parse_generated_question`] so every backend gets the same checks.
pub trait QuestionGenerator {
    fn generate(&self) -> impl Future<Output = Result<String, GenerationError>> + Send;
}

pub struct ChatGptGenerator {
    chat_gpt: ChatGPT,
}

impl ChatGptGenerator {
    /// Builds a client for `api_key`. A key the client refuses is a credentials error.
    pub fn connect(api_key: &str, settings: &GeneratorSettings) -> Result<Self, GenerationError> {
        let api_key = api_key.trim();
        if api_key.is_empty() {
            return Err(GenerationError::Credentials("empty API key".to_string()));
        }
        if api_key.chars().any(|c| c.is_whitespace() || c.is_control()) {
            return Err(GenerationError::Credentials(
                "API key contains whitespace".to_string(),
            ));
        }

        let config = ModelConfiguration {
            engine: ChatGPTEngine::Gpt35Turbo,
            timeout: settings.timeout,
            ..Default::default()
        };
        let chat_gpt = ChatGPT::new_with_config(api_key, config)
            .map_err(|e| GenerationError::Credentials(e.to_string()))?;

        Ok(Self { chat_gpt })
    }
}

impl QuestionGenerator for ChatGptGenerator {
    async fn generate(&self) -> Result<String, GenerationError> {
        log::debug!("Requesting a generated question");
        let response: CompletionResponse = self.chat_gpt.send_message(QUESTION_PROMPT).await?;
        let content = response.message().content.clone();
        log::debug!("Completion: {:?}", content);
        Ok(content)
    }
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct GeneratedQuestion {
    question: String,
    options: Vec<String>,
    answer: String,
}

/// Parses a model response into a [`Question`], rejecting anything but a
/// well-formed object with four distinct options that contain the answer.
pub fn parse_generated_question(raw: &str) -> Result<Question, GenerationError> {
    let generated: GeneratedQuestion = serde_json::from_str(strip_code_fence(raw))?;

    if generated.question.trim().is_empty() {
        return Err(GenerationError::InvalidShape("question text is empty".into()));
    }
    if generated.options.len() != OPTIONS_PER_QUESTION {
        return Err(GenerationError::InvalidShape(format!(
            "expected {} options, got {}",
            OPTIONS_PER_QUESTION,
            generated.options.len()
        )));
    }
    if generated.options.iter().any(|o| o.trim().is_empty()) {
        return Err(GenerationError::InvalidShape("blank option".into()));
    }
    let distinct: HashSet<&str> = generated.options.iter().map(String::as_str).collect();
    if distinct.len() != OPTIONS_PER_QUESTION {
        return Err(GenerationError::InvalidShape("options are not distinct".into()));
    }
    if !generated.options.contains(&generated.answer) {
        return Err(GenerationError::InvalidShape(format!(
            "answer {:?} is not one of the options",
            generated.answer
        )));
    }

    Ok(Question::new(
        generated.question,
        generated.options,
        generated.answer,
    ))
}

/// Models like to wrap JSON in a Markdown fence; take what is inside it.
fn strip_code_fence(text: &str) -> &str {
    let text = text.trim();
    let Some(rest) = text.strip_prefix("```") else {
        return text;
    };
    let rest = rest.strip_suffix("```").unwrap_or(rest);
    match rest.split_once('\n') {
        Some((info, body)) if !info.trim_start().starts_with('{') => body.trim(),
        _ => rest.trim(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID: &str = r#"{"question": "Which function counts non-empty cells?", "options": ["COUNT", "COUNTA", "COUNTBLANK", "SUM"], "answer": "COUNTA"}"#;

    #[test]
    fn parses_plain_json() {
        let q = parse_generated_question(VALID).unwrap();
        assert_eq!(q.text, "Which function counts non-empty cells?");
        assert_eq!(q.options.len(), 4);
        assert_eq!(q.answer, "COUNTA");
    }

    #[test]
    fn parses_fenced_json() {
        let fenced = format!("```json\n{}\n```", VALID);
        assert_eq!(
            parse_generated_question(&fenced).unwrap(),
            parse_generated_question(VALID).unwrap()
        );
        let bare_fence = format!("```{}```", VALID);
        assert!(parse_generated_question(&bare_fence).is_ok());
    }

    #[test]
    fn rejects_prose() {
        let err = parse_generated_question("Sure! Here is a question about Excel.").unwrap_err();
        assert!(matches!(err, GenerationError::Malformed(_)));
    }

    #[test]
    fn rejects_missing_and_extra_fields() {
        let missing = r#"{"question": "Q?", "options": ["a", "b", "c", "d"]}"#;
        assert!(matches!(
            parse_generated_question(missing),
            Err(GenerationError::Malformed(_))
        ));
        let extra = r#"{"question": "Q?", "options": ["a", "b", "c", "d"], "answer": "a", "hint": "x"}"#;
        assert!(matches!(
            parse_generated_question(extra),
            Err(GenerationError::Malformed(_))
        ));
    }

    #[test]
    fn rejects_wrong_option_count() {
        let three = r#"{"question": "Q?", "options": ["a", "b", "c"], "answer": "a"}"#;
        assert!(matches!(
            parse_generated_question(three),
            Err(GenerationError::InvalidShape(_))
        ));
    }

    #[test]
    fn rejects_answer_outside_options() {
        let raw = r#"{"question": "Q?", "options": ["a", "b", "c", "d"], "answer": "e"}"#;
        assert!(matches!(
            parse_generated_question(raw),
            Err(GenerationError::InvalidShape(_))
        ));
    }

    #[test]
    fn rejects_duplicate_options() {
        let raw = r#"{"question": "Q?", "options": ["a", "a", "c", "d"], "answer": "a"}"#;
        assert!(matches!(
            parse_generated_question(raw),
            Err(GenerationError::InvalidShape(_))
        ));
    }

    #[test]
    fn rejects_empty_question_text() {
        let raw = r#"{"question": "  ", "options": ["a", "b", "c", "d"], "answer": "a"}"#;
        assert!(matches!(
            parse_generated_question(raw),
            Err(GenerationError::InvalidShape(_))
        ));
    }

    #[test]
    fn connect_refuses_blank_key() {
        let err = ChatGptGenerator::connect("   ", &GeneratorSettings::default())
            .err()
            .unwrap();
        assert!(matches!(err, GenerationError::Credentials(_)));
    }

    #[test]
    fn connect_refuses_key_with_inner_whitespace() {
        let err = ChatGptGenerator::connect("sk-one two", &GeneratorSettings::default())
            .err()
            .unwrap();
        assert!(matches!(err, GenerationError::Credentials(_)));
    }
}
