use rand::Rng;

use crate::quiz::Question;

/// (question, options, answer) rows of the built-in Excel question bank.
const EXCEL_QUESTIONS: [(&str, [&str; 4], &str); 8] = [
    (
        "Which function is used to sum a range of cells in Excel?",
        ["SUM", "AVERAGE", "COUNT", "IF"],
        "SUM",
    ),
    (
        "What is the shortcut for 'Copy' in Excel?",
        ["Ctrl+C", "Ctrl+V", "Ctrl+X", "Ctrl+Z"],
        "Ctrl+C",
    ),
    (
        "Which function removes extra spaces from text?",
        ["TRIM", "CLEAN", "REMOVE", "SPACE"],
        "TRIM",
    ),
    (
        "Which Excel feature allows you to remove duplicates?",
        [
            "Data Validation",
            "Conditional Formatting",
            "Remove Duplicates",
            "Sort",
        ],
        "Remove Duplicates",
    ),
    (
        "Which function calculates the average of a range of numbers?",
        ["SUM", "AVERAGE", "MEDIAN", "COUNT"],
        "AVERAGE",
    ),
    (
        "Which function looks up a value in the first column of a table and returns a value from the same row?",
        ["VLOOKUP", "HLOOKUP", "MATCH", "INDEX"],
        "VLOOKUP",
    ),
    (
        "Which reference stays fixed when a formula is copied to another cell?",
        ["$A$1", "A1", "A$1", "R1C1"],
        "$A$1",
    ),
    (
        "What is the shortcut for 'Undo' in Excel?",
        ["Ctrl+Z", "Ctrl+Y", "Ctrl+U", "Ctrl+R"],
        "Ctrl+Z",
    ),
];

/// Static question bank used when no generator is configured or generation fails.
#[derive(Debug, Clone)]
pub struct FallbackPool {
    questions: Vec<Question>,
}

impl Default for FallbackPool {
    fn default() -> Self {
        let questions = EXCEL_QUESTIONS
            .iter()
            .map(|(text, options, answer)| {
                Question::new(
                    text.to_string(),
                    options.iter().map(|o| o.to_string()).collect(),
                    answer.to_string(),
                )
            })
            .collect();
        Self { questions }
    }
}

impl FallbackPool {
    /// Returns `None` for an empty bank, since nothing could ever be drawn from it.
    pub fn new(questions: Vec<Question>) -> Option<Self> {
        if questions.is_empty() {
            return None;
        }
        Some(Self { questions })
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    /// Uniform draw with replacement.
    pub fn draw(&self) -> Question {
        let idx = rand::thread_rng().gen_range(0..self.questions.len());
        self.questions[idx].clone()
    }
}
