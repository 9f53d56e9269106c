use crate::config::GeneratorSettings;
use crate::error::InterviewError;
use crate::quiz::generator::{ChatGptGenerator, QuestionGenerator};
use crate::quiz::source::QuestionSource;
use crate::quiz::Question;

pub const MIN_QUESTIONS: usize = 5;
pub const MAX_QUESTIONS: usize = 50;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Stage {
    #[default]
    AwaitingName,
    Configuring,
    AwaitingQuestionCount,
    InProgress,
    Completed,
}

/// What happened when the candidate offered (or skipped) an API key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceSetup {
    Generative,
    Skipped,
    Rejected(String),
}

/// One candidate's run through a fixed list of questions.
///
/// Every transition either succeeds or returns an error and leaves the
/// interview untouched. Until [`Interview::quit`] is called,
/// `answers().len() == current_index()` and `score()` counts the correct answers.
#[derive(Debug, Clone, Default)]
pub struct Interview {
    stage: Stage,
    candidate: String,
    api_key: Option<String>,
    questions: Vec<Question>,
    current_index: usize,
    score: usize,
    answers: Vec<String>,
}

impl Interview {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn stage(&self) -> Stage {
        self.stage
    }

    pub fn candidate(&self) -> &str {
        &self.candidate
    }

    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref()
    }

    pub fn is_configured(&self) -> bool {
        self.api_key.is_some()
    }

    pub fn questions(&self) -> &[Question] {
        &self.questions
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    pub fn score(&self) -> usize {
        self.score
    }

    pub fn answers(&self) -> &[String] {
        &self.answers
    }

    pub fn current_question(&self) -> Option<&Question> {
        if self.stage != Stage::InProgress {
            return None;
        }
        self.questions.get(self.current_index)
    }

    fn expect_stage(&self, expected: Stage) -> Result<(), InterviewError> {
        if self.stage != expected {
            return Err(InterviewError::WrongStage { actual: self.stage });
        }
        Ok(())
    }

    pub fn start(&mut self, name: &str) -> Result<(), InterviewError> {
        self.expect_stage(Stage::AwaitingName)?;
        let name = name.trim();
        if name.is_empty() {
            return Err(InterviewError::EmptyName);
        }

        self.candidate = name.to_string();
        self.stage = Stage::Configuring;
        log::info!("Interview started for {:?}", self.candidate);
        Ok(())
    }

    /// Accepts a key only if the remote client can be built with it.
    /// Any outcome moves on to choosing the question count.
    pub fn configure_source(
        &mut self,
        api_key: Option<&str>,
        settings: &GeneratorSettings,
    ) -> Result<SourceSetup, InterviewError> {
        self.expect_stage(Stage::Configuring)?;

        let setup = match api_key.map(str::trim).filter(|key| !key.is_empty()) {
            None => SourceSetup::Skipped,
            Some(key) => match ChatGptGenerator::connect(key, settings) {
                Ok(_) => {
                    self.api_key = Some(key.to_string());
                    SourceSetup::Generative
                }
                Err(e) => {
                    log::info!("API key rejected, using predefined questions: {}", e);
                    SourceSetup::Rejected(e.to_string())
                }
            },
        };

        self.stage = Stage::AwaitingQuestionCount;
        Ok(setup)
    }

    /// Fixes the session length and draws exactly `count` questions from `source`.
    pub async fn set_question_count<G: QuestionGenerator>(
        &mut self,
        count: usize,
        source: &QuestionSource<G>,
    ) -> Result<(), InterviewError> {
        self.expect_stage(Stage::AwaitingQuestionCount)?;
        if !(MIN_QUESTIONS..=MAX_QUESTIONS).contains(&count) {
            return Err(InterviewError::QuestionCountOutOfRange {
                requested: count,
                min: MIN_QUESTIONS,
                max: MAX_QUESTIONS,
            });
        }

        let configured = self.is_configured();
        let mut questions = Vec::with_capacity(count);
        for _ in 0..count {
            questions.push(source.next_question(configured).await);
        }

        self.questions = questions;
        self.current_index = 0;
        self.score = 0;
        self.answers.clear();
        self.stage = Stage::InProgress;
        Ok(())
    }

    /// Records `selected` for the current question and returns whether it was correct.
    pub fn submit_answer(&mut self, selected: &str) -> Result<bool, InterviewError> {
        self.expect_stage(Stage::InProgress)?;
        let question = self
            .questions
            .get(self.current_index)
            .ok_or(InterviewError::NoQuestions)?;

        let correct = question.is_correct(selected);
        self.answers.push(selected.to_string());
        if correct {
            self.score += 1;
        }
        self.current_index += 1;

        if self.current_index == self.questions.len() {
            self.stage = Stage::Completed;
            log::info!(
                "Interview completed for {:?}: {}/{}",
                self.candidate,
                self.score,
                self.questions.len()
            );
        }
        Ok(correct)
    }

    /// Ends the interview early. Remaining questions stay unanswered and unscored.
    pub fn quit(&mut self) -> Result<(), InterviewError> {
        if self.stage == Stage::Completed {
            return Err(InterviewError::WrongStage { actual: self.stage });
        }
        self.current_index = self.questions.len();
        self.stage = Stage::Completed;
        log::info!(
            "Interview quit by {:?} after {} answers",
            self.candidate,
            self.answers.len()
        );
        Ok(())
    }

    /// Abandons the interview without reporting.
    pub fn exit(self) {
        log::info!("Interview abandoned by {:?}", self.candidate);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::quiz::pool::FallbackPool;
    use crate::quiz::source::tests::ScriptedGenerator;

    fn question(n: usize) -> Question {
        Question::new(
            format!("Question {}", n),
            vec!["a".into(), "b".into(), "c".into(), "d".into()],
            "a".into(),
        )
    }

    fn pool_of_one() -> FallbackPool {
        FallbackPool::new(vec![question(0)]).unwrap()
    }

    fn fallback_source() -> QuestionSource<ScriptedGenerator> {
        QuestionSource::fallback_only(pool_of_one())
    }

    async fn in_progress(count: usize) -> Interview {
        let mut interview = Interview::new();
        interview.start("Alice").unwrap();
        interview
            .configure_source(None, &GeneratorSettings::default())
            .unwrap();
        interview
            .set_question_count(count, &fallback_source())
            .await
            .unwrap();
        interview
    }

    #[test]
    fn start_requires_a_name() {
        let mut interview = Interview::new();
        assert_eq!(interview.start("   "), Err(InterviewError::EmptyName));
        assert_eq!(interview.stage(), Stage::AwaitingName);

        interview.start("  Alice ").unwrap();
        assert_eq!(interview.candidate(), "Alice");
        assert_eq!(interview.stage(), Stage::Configuring);
    }

    #[test]
    fn start_twice_is_rejected() {
        let mut interview = Interview::new();
        interview.start("Alice").unwrap();
        assert_eq!(
            interview.start("Bob"),
            Err(InterviewError::WrongStage {
                actual: Stage::Configuring
            })
        );
        assert_eq!(interview.candidate(), "Alice");
    }

    #[test]
    fn skipping_the_key_leaves_source_unconfigured() {
        let mut interview = Interview::new();
        interview.start("Alice").unwrap();
        let setup = interview
            .configure_source(Some("  "), &GeneratorSettings::default())
            .unwrap();
        assert_eq!(setup, SourceSetup::Skipped);
        assert!(!interview.is_configured());
        assert_eq!(interview.stage(), Stage::AwaitingQuestionCount);
    }

    #[test]
    fn accepted_key_configures_the_source() {
        let mut interview = Interview::new();
        interview.start("Alice").unwrap();
        let setup = interview
            .configure_source(Some("sk-test"), &GeneratorSettings::default())
            .unwrap();
        assert_eq!(setup, SourceSetup::Generative);
        assert_eq!(interview.api_key(), Some("sk-test"));
    }

    #[test]
    fn unusable_key_is_rejected_without_blocking() {
        let mut interview = Interview::new();
        interview.start("Alice").unwrap();
        let setup = interview
            .configure_source(Some("bad\nkey"), &GeneratorSettings::default())
            .unwrap();
        assert!(matches!(setup, SourceSetup::Rejected(_)));
        assert!(!interview.is_configured());
        assert_eq!(interview.stage(), Stage::AwaitingQuestionCount);
    }

    #[tokio::test]
    async fn question_count_bounds_are_inclusive() {
        for count in [MIN_QUESTIONS, 17, MAX_QUESTIONS] {
            let interview = in_progress(count).await;
            assert_eq!(interview.questions().len(), count);
            assert_eq!(interview.stage(), Stage::InProgress);
        }
    }

    #[tokio::test]
    async fn question_count_outside_bounds_is_rejected() {
        for count in [0, 4, 51] {
            let mut interview = Interview::new();
            interview.start("Alice").unwrap();
            interview
                .configure_source(None, &GeneratorSettings::default())
                .unwrap();
            let err = interview
                .set_question_count(count, &fallback_source())
                .await
                .unwrap_err();
            assert_eq!(
                err,
                InterviewError::QuestionCountOutOfRange {
                    requested: count,
                    min: 5,
                    max: 50
                }
            );
            assert_eq!(interview.stage(), Stage::AwaitingQuestionCount);
            assert!(interview.questions().is_empty());
        }
    }

    #[tokio::test]
    async fn score_counts_matching_answers() {
        let mut interview = in_progress(5).await;
        for given in ["a", "b", "a", "zzz", "a"] {
            interview.submit_answer(given).unwrap();
            assert_eq!(interview.answers().len(), interview.current_index());
            assert!(interview.score() <= interview.current_index());
        }

        let expected = interview
            .answers()
            .iter()
            .zip(interview.questions())
            .filter(|(given, q)| **given == q.answer)
            .count();
        assert_eq!(interview.score(), expected);
        assert_eq!(interview.score(), 3);
        assert_eq!(interview.stage(), Stage::Completed);
    }

    #[tokio::test]
    async fn answer_outside_options_is_recorded_but_wrong() {
        let mut interview = in_progress(5).await;
        assert_eq!(interview.submit_answer("not an option"), Ok(false));
        assert_eq!(interview.answers(), ["not an option"]);
        assert_eq!(interview.score(), 0);
    }

    #[tokio::test]
    async fn no_answers_after_completion() {
        let mut interview = in_progress(5).await;
        for _ in 0..5 {
            interview.submit_answer("a").unwrap();
        }
        assert_eq!(
            interview.submit_answer("a"),
            Err(InterviewError::WrongStage {
                actual: Stage::Completed
            })
        );
        assert_eq!(interview.answers().len(), 5);
        assert!(interview.current_question().is_none());
    }

    #[tokio::test]
    async fn quitting_keeps_submitted_answers() {
        let mut interview = in_progress(6).await;
        interview.submit_answer("a").unwrap();
        interview.submit_answer("b").unwrap();
        interview.quit().unwrap();

        assert_eq!(interview.stage(), Stage::Completed);
        assert_eq!(interview.answers().len(), 2);
        assert_eq!(interview.current_index(), 6);
        assert_eq!(interview.score(), 1);
        assert_eq!(
            interview.quit(),
            Err(InterviewError::WrongStage {
                actual: Stage::Completed
            })
        );
    }

    #[test]
    fn quitting_before_questions_completes_empty() {
        let mut interview = Interview::new();
        interview.start("Alice").unwrap();
        interview.quit().unwrap();
        assert_eq!(interview.stage(), Stage::Completed);
        assert!(interview.questions().is_empty());
    }

    #[test]
    fn answering_before_start_is_rejected() {
        let mut interview = Interview::new();
        assert_eq!(
            interview.submit_answer("a"),
            Err(InterviewError::WrongStage {
                actual: Stage::AwaitingName
            })
        );
    }

    #[tokio::test]
    async fn configured_session_survives_a_dead_generator() {
        let mut interview = Interview::new();
        interview.start("Alice").unwrap();
        interview
            .configure_source(Some("sk-test"), &GeneratorSettings::default())
            .unwrap();
        let source =
            QuestionSource::new(Some(ScriptedGenerator::always_failing()), pool_of_one());

        interview.set_question_count(5, &source).await.unwrap();

        assert_eq!(interview.questions().len(), 5);
        assert!(interview.questions().iter().all(|q| *q == question(0)));
        assert_eq!(source_calls(&source), 10);
    }

    fn source_calls(source: &QuestionSource<ScriptedGenerator>) -> usize {
        source.generator().map(|g| g.calls()).unwrap_or(0)
    }
}
