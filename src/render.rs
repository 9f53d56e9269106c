//! Plain-text views sent back to the chat.

use crate::leaderboard::LeaderboardEntry;
use crate::quiz::report::{AnswerFeedback, Report};
use crate::quiz::Question;

pub const LEADERBOARD_ROWS: usize = 10;

pub fn render_question(number: usize, total: usize, question: &Question) -> String {
    format!("Question {}/{}:\n{}", number, total, question.text)
}

pub fn render_report(report: &Report) -> String {
    let mut lines = vec![
        "Interview complete!".to_string(),
        format!("Candidate: {}", report.candidate),
        format!("Score: {}/{}", report.score, report.total),
        String::new(),
        "Answers & feedback:".to_string(),
    ];

    for (idx, feedback) in report.feedback.iter().enumerate() {
        let line = match feedback {
            AnswerFeedback::Correct { given } => format!("Q{}: {} - correct", idx + 1, given),
            AnswerFeedback::Incorrect { given, correct } => {
                format!("Q{}: {} - incorrect, correct: {}", idx + 1, given, correct)
            }
            AnswerFeedback::Unanswered { correct } => {
                format!("Q{}: unanswered, correct: {}", idx + 1, correct)
            }
        };
        lines.push(line);
    }

    lines.push(String::new());
    lines.push(format!(
        "Performance: {:.1}% - {}. {}",
        report.percentage,
        report.band,
        report.band.advice()
    ));
    lines.join("\n")
}

/// Renders the first `limit` rows of an already sorted leaderboard.
pub fn render_leaderboard(entries: &[LeaderboardEntry], limit: usize) -> String {
    if entries.is_empty() {
        return "Leaderboard is empty.".to_string();
    }

    let mut lines = vec!["Leaderboard (top performers):".to_string()];
    lines.extend(entries.iter().take(limit).enumerate().map(|(idx, entry)| {
        format!(
            "{}. {} - {} ({:.1}%)",
            idx + 1,
            entry.candidate,
            entry.score,
            entry.percentage
        )
    }));
    lines.join("\n")
}
