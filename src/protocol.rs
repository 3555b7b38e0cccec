use crate::engine::GameSnapshot;
use crate::types::*;
use serde::{Deserialize, Serialize};

pub const PROTOCOL_VERSION: &str = "1.0";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Start a game over the given stages (default roster when omitted)
    StartGame {
        #[serde(default)]
        stage_ids: Option<Vec<StageId>>,
    },
    /// Pick an option for the current question. From a peer connection
    /// this is the counterpart's answer.
    SubmitAnswer {
        index: usize,
    },
    PlayAgain,
    /// Leave the game (back to idle); the call stays up
    ExitGame,
    GetState,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "t", rename_all = "snake_case")]
pub enum ServerMessage {
    Welcome {
        protocol: String,
        role: Role,
        call_id: CallId,
        /// The other side of the call, when known
        #[serde(skip_serializing_if = "Option::is_none")]
        participant: Option<Participant>,
        counterpart: CounterpartMode,
        state: GameSnapshot,
        server_now: String,
    },
    /// Full snapshot, sent after every mutation
    GameState {
        state: GameSnapshot,
    },
    Tick {
        seconds_remaining: u32,
    },
    /// The other participant locked in an answer (two-party calls)
    CounterpartLocked,
    AnswerRevealed {
        reveal: AnswerReveal,
        /// When the game moves on (ISO timestamp)
        reveal_until: String,
    },
    StageCompleted {
        result: StageResult,
    },
    Summary {
        results: Vec<StageResult>,
        overall_percent: u8,
    },
    PeerJoined {
        #[serde(skip_serializing_if = "Option::is_none")]
        participant: Option<Participant>,
    },
    PeerLeft,
    /// The caller hung up
    CallEnded,
    Error {
        code: String,
        msg: String,
    },
}

impl ServerMessage {
    pub fn error(code: &str, msg: impl Into<String>) -> Self {
        ServerMessage::Error {
            code: code.to_string(),
            msg: msg.into(),
        }
    }
}

impl From<&crate::engine::GameError> for ServerMessage {
    fn from(e: &crate::engine::GameError) -> Self {
        ServerMessage::error(e.code(), e.to_string())
    }
}
