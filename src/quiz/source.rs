use crate::error::GenerationError;
use crate::quiz::generator::{parse_generated_question, QuestionGenerator};
use crate::quiz::pool::FallbackPool;
use crate::quiz::Question;

/// How many times a generator is asked before falling back to the pool.
pub const MAX_GENERATION_ATTEMPTS: usize = 2;

/// Outcome of asking a generator for a question with bounded retries.
#[derive(Debug)]
pub enum Generation {
    Generated(Question),
    /// Every attempt failed; one error per attempt, in order.
    Exhausted(Vec<GenerationError>),
}

/// Supplies questions for a session, either generated or drawn from the pool.
pub struct QuestionSource<G> {
    generator: Option<G>,
    pool: FallbackPool,
}

impl<G: QuestionGenerator> QuestionSource<G> {
    pub fn new(generator: Option<G>, pool: FallbackPool) -> Self {
        Self { generator, pool }
    }

    pub fn fallback_only(pool: FallbackPool) -> Self {
        Self::new(None, pool)
    }

    pub fn generator(&self) -> Option<&G> {
        self.generator.as_ref()
    }

    pub fn has_generator(&self) -> bool {
        self.generator.is_some()
    }

    /// Always yields a valid question. Generation problems are logged, never returned.
    pub async fn next_question(&self, configured: bool) -> Question {
        let generator = match (&self.generator, configured) {
            (Some(generator), true) => generator,
            _ => return self.pool.draw(),
        };

        match generate_with_retries(generator, MAX_GENERATION_ATTEMPTS).await {
            Generation::Generated(question) => question,
            Generation::Exhausted(_) => {
                log::info!("Using predefined question as fallback");
                self.pool.draw()
            }
        }
    }
}

/// Asks `generator` up to `max_attempts` times, logging a warning per failed attempt.
pub async fn generate_with_retries<G: QuestionGenerator>(
    generator: &G,
    max_attempts: usize,
) -> Generation {
    let mut failures = Vec::with_capacity(max_attempts);

    for attempt in 1..=max_attempts {
        let outcome = match generator.generate().await {
            Ok(raw) => parse_generated_question(&raw),
            Err(e) => Err(e),
        };
        match outcome {
            Ok(question) => return Generation::Generated(question),
            Err(e) => {
                log::warn!("Question generation attempt {} failed: {}", attempt, e);
                failures.push(e);
            }
        }
    }

    Generation::Exhausted(failures)
}
