use serde::{Deserialize, Serialize};

/// Opaque ID types for type safety
pub type StageId = String;
pub type CallId = String;

/// Every question offers exactly this many fixed choices
pub const OPTION_COUNT: usize = 4;

/// Points awarded when both participants pick the same option
pub const MATCH_POINTS: u32 = 20;

/// Points awarded when the picks differ
pub const MISMATCH_POINTS: u32 = 10;

/// Shown when a participant has no usable picture
pub const DEFAULT_PARTICIPANT_IMAGE: &str =
    "https://images.unsplash.com/photo-1500648767791-00dcc994a43e?q=80&w=2574&auto=format&fit=crop";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum GamePhase {
    Idle,
    InProgress,
    Summary,
}

/// Per-question sub-cycle while the game is in progress
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum QuestionStep {
    AwaitingAnswer,
    Revealing,
}

/// How an answer slot got filled
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum AnswerSource {
    Player,
    /// Random stand-in for a counterpart that isn't really there
    Simulated,
    Timeout,
}

/// Where the other participant's answers come from
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum CounterpartMode {
    /// Drawn at random the moment the local answer is recorded
    #[default]
    Simulated,
    /// Delivered by the peer through `record_counterpart_answer`
    Remote,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Question {
    pub prompt: String,
    pub options: Vec<String>,
}

impl Question {
    pub fn new(prompt: impl Into<String>, options: [&str; OPTION_COUNT]) -> Self {
        Self {
            prompt: prompt.into(),
            options: options.iter().map(|o| o.to_string()).collect(),
        }
    }
}

/// A named thematic bucket of questions
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Stage {
    pub id: StageId,
    pub name: String,
    pub questions: Vec<Question>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameConfig {
    pub question_seconds: u32,
    pub reveal_delay_ms: u64,
    pub tick_interval_ms: u64,
    pub counterpart: CounterpartMode,
    /// Fixed RNG seed (None = seeded from the OS)
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for GameConfig {
    fn default() -> Self {
        Self {
            question_seconds: 30,
            reveal_delay_ms: 2000,
            tick_interval_ms: 1000,
            counterpart: CounterpartMode::Simulated,
            seed: None,
        }
    }
}

/// Display data for the person on the other end of the call
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Participant {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl Participant {
    /// Image URI to render, substituting the default when missing or blank
    pub fn image_or_default(&self) -> &str {
        match self.image.as_deref().map(str::trim) {
            Some(uri) if !uri.is_empty() => uri,
            _ => DEFAULT_PARTICIPANT_IMAGE,
        }
    }
}

/// Final score for one completed stage
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct StageResult {
    pub stage_id: StageId,
    pub stage_name: String,
    /// Raw sum of per-question points
    pub points: u32,
    /// Best achievable score for the stage (every answer matched)
    pub max_points: u32,
    /// `points` normalized to 0-100
    pub percent: u8,
}

/// Both answers for a resolved question, shown during the reveal pause
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AnswerReveal {
    pub stage_index: usize,
    pub question_index: usize,
    pub self_answer: usize,
    pub self_source: AnswerSource,
    pub counterpart_answer: usize,
    pub counterpart_source: AnswerSource,
    pub matched: bool,
    pub points: u32,
    pub cumulative_score: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    /// Owns the call screen and the game
    Caller,
    /// The other participant, only able to answer
    Peer,
}
