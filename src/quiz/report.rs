use std::fmt;

use crate::error::InterviewError;
use crate::leaderboard::LeaderboardEntry;
use crate::quiz::interview::{Interview, Stage};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Band {
    Excellent,
    Good,
    NeedsImprovement,
}

impl Band {
    pub fn from_percentage(percentage: f64) -> Self {
        if percentage >= 80.0 {
            Band::Excellent
        } else if percentage >= 50.0 {
            Band::Good
        } else {
            Band::NeedsImprovement
        }
    }

    pub fn advice(&self) -> &'static str {
        match self {
            Band::Excellent => "You have strong Excel skills.",
            Band::Good => "Decent Excel knowledge but some gaps to improve.",
            Band::NeedsImprovement => "Consider revising Excel basics and practicing more.",
        }
    }
}

impl fmt::Display for Band {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Band::Excellent => "Excellent",
            Band::Good => "Good",
            Band::NeedsImprovement => "Needs Improvement",
        };
        f.write_str(label)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AnswerFeedback {
    Correct { given: String },
    Incorrect { given: String, correct: String },
    /// Left open because the candidate quit.
    Unanswered { correct: String },
}

#[derive(Debug, Clone, PartialEq)]
pub struct Report {
    pub candidate: String,
    pub score: usize,
    pub total: usize,
    pub percentage: f64,
    pub band: Band,
    pub feedback: Vec<AnswerFeedback>,
}

impl Report {
    pub fn leaderboard_entry(&self) -> LeaderboardEntry {
        LeaderboardEntry {
            candidate: self.candidate.clone(),
            score: self.score,
            percentage: self.percentage,
        }
    }
}

/// Builds the final report for a completed interview.
pub fn summarize(interview: &Interview) -> Result<Report, InterviewError> {
    if interview.stage() != Stage::Completed {
        return Err(InterviewError::WrongStage {
            actual: interview.stage(),
        });
    }
    let questions = interview.questions();
    if questions.is_empty() {
        return Err(InterviewError::NoQuestions);
    }

    let answers = interview.answers();
    let feedback = questions
        .iter()
        .enumerate()
        .map(|(idx, question)| match answers.get(idx) {
            Some(given) if question.is_correct(given) => AnswerFeedback::Correct {
                given: given.clone(),
            },
            Some(given) => AnswerFeedback::Incorrect {
                given: given.clone(),
                correct: question.answer.clone(),
            },
            None => AnswerFeedback::Unanswered {
                correct: question.answer.clone(),
            },
        })
        .collect();

    let percentage = 100.0 * interview.score() as f64 / questions.len() as f64;

    Ok(Report {
        candidate: interview.candidate().to_string(),
        score: interview.score(),
        total: questions.len(),
        percentage,
        band: Band::from_percentage(percentage),
        feedback,
    })
}
