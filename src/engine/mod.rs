//! Compatibility game engine
//!
//! A plain, clock-free state machine for the quiz that runs during a call.
//! The hosting layer drives `tick()` once per second and calls `advance()`
//! once the reveal pause is over; every mutation returns an outcome the host
//! can use to schedule the next timer.

mod answer;
mod progress;
mod score;
mod snapshot;

pub use snapshot::{GameSnapshot, StageView};

use crate::types::*;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Errors returned by engine operations. None of them are fatal.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GameError {
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    #[error("Answer index {0} is out of range (expected 0..{max})", max = OPTION_COUNT)]
    InvalidAnswerIndex(usize),

    #[error("Question has already been answered")]
    AlreadyAnswered,

    #[error("Invalid state: {0}")]
    InvalidState(String),
}

impl GameError {
    /// Stable code sent to clients
    pub fn code(&self) -> &'static str {
        match self {
            GameError::InvalidConfiguration(_) => "INVALID_CONFIGURATION",
            GameError::InvalidAnswerIndex(_) => "INVALID_ANSWER_INDEX",
            GameError::AlreadyAnswered => "ALREADY_ANSWERED",
            GameError::InvalidState(_) => "INVALID_STATE",
        }
    }
}

pub type GameResult<T> = Result<T, GameError>;

/// An answer slot once it has been filled
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct RecordedAnswer {
    pub index: usize,
    pub source: AnswerSource,
}

/// Mutable run-time state, owned by the engine
#[derive(Debug, Clone, Serialize)]
pub struct GameSession {
    pub phase: GamePhase,
    pub step: QuestionStep,
    pub stage_index: usize,
    pub question_index: usize,
    pub seconds_remaining: u32,
    pub self_answer: Option<RecordedAnswer>,
    pub counterpart_answer: Option<RecordedAnswer>,
    pub cumulative_score: u32,
    pub stage_results: Vec<StageResult>,
}

impl GameSession {
    fn new(phase: GamePhase, question_seconds: u32) -> Self {
        Self {
            phase,
            step: QuestionStep::AwaitingAnswer,
            stage_index: 0,
            question_index: 0,
            seconds_remaining: question_seconds,
            self_answer: None,
            counterpart_answer: None,
            cumulative_score: 0,
            stage_results: Vec::new(),
        }
    }

    /// Prepare the slots and countdown for the question at the current indices
    fn begin_question(&mut self, question_seconds: u32) {
        self.step = QuestionStep::AwaitingAnswer;
        self.seconds_remaining = question_seconds;
        self.self_answer = None;
        self.counterpart_answer = None;
    }
}

/// Identifies one question of one run, so a delayed callback can tell
/// whether the question it was scheduled for is still current
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct QuestionKey {
    pub run: u64,
    pub stage_index: usize,
    pub question_index: usize,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TickOutcome {
    /// Not counting down (wrong phase or question already resolved)
    Ignored,
    Counting { seconds_remaining: u32 },
    /// Countdown hit zero and the empty slots were auto-picked
    TimedOut(AnswerReveal),
}

#[derive(Debug, Clone, PartialEq)]
pub enum AnswerOutcome {
    /// Both answers are in; the reveal pause starts now
    Revealed(AnswerReveal),
    /// Recorded, still waiting on the other participant
    AwaitingCounterpart,
}

#[derive(Debug, Clone, PartialEq)]
pub enum AdvanceOutcome {
    Ignored,
    NextQuestion,
    NextStage(StageResult),
    Finished(StageResult),
}

pub struct CompatibilityGame {
    config: GameConfig,
    stages: Vec<Stage>,
    session: GameSession,
    rng: StdRng,
    run: u64,
}

impl CompatibilityGame {
    pub fn new(config: GameConfig) -> Self {
        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_os_rng(),
        };
        let session = GameSession::new(GamePhase::Idle, config.question_seconds);

        Self {
            config,
            stages: Vec::new(),
            session,
            rng,
            run: 0,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn phase(&self) -> GamePhase {
        self.session.phase
    }

    /// Raw session state (the snapshot adds derived view fields)
    pub fn session(&self) -> &GameSession {
        &self.session
    }

    pub fn stages(&self) -> &[Stage] {
        &self.stages
    }

    pub fn question_key(&self) -> QuestionKey {
        QuestionKey {
            run: self.run,
            stage_index: self.session.stage_index,
            question_index: self.session.question_index,
        }
    }

    fn random_option(&mut self) -> usize {
        self.rng.random_range(0..OPTION_COUNT)
    }

    fn ensure_in_progress(&self, action: &str) -> GameResult<()> {
        if self.session.phase != GamePhase::InProgress {
            return Err(GameError::InvalidState(format!(
                "Cannot {} while the game is {:?}",
                action, self.session.phase
            )));
        }
        Ok(())
    }
}

/// Check a stage roster before a run starts
fn validate_stages(stages: &[Stage]) -> GameResult<()> {
    if stages.is_empty() {
        return Err(GameError::InvalidConfiguration(
            "At least one stage is required".to_string(),
        ));
    }

    for (i, stage) in stages.iter().enumerate() {
        if stages[..i].iter().any(|s| s.id == stage.id) {
            return Err(GameError::InvalidConfiguration(format!(
                "Duplicate stage id '{}'",
                stage.id
            )));
        }
        if stage.questions.is_empty() {
            return Err(GameError::InvalidConfiguration(format!(
                "Stage '{}' has no questions",
                stage.id
            )));
        }
        for (q, question) in stage.questions.iter().enumerate() {
            if question.options.len() != OPTION_COUNT {
                return Err(GameError::InvalidConfiguration(format!(
                    "Question {} of stage '{}' has {} options (expected {})",
                    q,
                    stage.id,
                    question.options.len(),
                    OPTION_COUNT
                )));
            }
        }
    }

    Ok(())
}

#[cfg(test)]
pub(crate) mod test_support {
    use super::*;

    pub fn question(prompt: &str) -> Question {
        Question::new(prompt, ["A", "B", "C", "D"])
    }

    pub fn stage(id: &str, questions: usize) -> Stage {
        Stage {
            id: id.to_string(),
            name: id.to_uppercase(),
            questions: (0..questions)
                .map(|n| question(&format!("{} question {}", id, n + 1)))
                .collect(),
        }
    }

    pub fn game(counterpart: CounterpartMode) -> CompatibilityGame {
        CompatibilityGame::new(GameConfig {
            counterpart,
            seed: Some(7),
            ..GameConfig::default()
        })
    }
}
