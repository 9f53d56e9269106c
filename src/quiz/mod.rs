pub mod generator;
pub mod interview;
pub mod pool;
pub mod report;
pub mod source;

/// A single multiple-choice question. `answer` is always one of `options`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Question {
    pub text: String,
    pub options: Vec<String>,
    pub answer: String,
}

impl Question {
    pub fn new(text: String, options: Vec<String>, answer: String) -> Self {
        Self {
            text,
            options,
            answer,
        }
    }

    pub fn is_correct(&self, given: &str) -> bool {
        given == self.answer
    }
}
