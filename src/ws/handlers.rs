//! WebSocket message dispatch
//!
//! Role checks happen here. Successful game commands reply through the
//! call's update stream, so only queries and errors return a direct response.

use crate::protocol::{ClientMessage, ServerMessage};
use crate::state::{AppState, Call};
use crate::types::Role;

/// Macro to check caller authorization and return early if unauthorized
macro_rules! check_caller {
    ($role:expr, $action:expr) => {
        if *$role != Role::Caller {
            return Some(ServerMessage::error(
                "UNAUTHORIZED",
                format!("Only the caller can {}", $action),
            ));
        }
    };
}

/// Handle client messages and return optional response
pub async fn handle_message(
    msg: ClientMessage,
    role: &Role,
    call: &Call,
    state: &AppState,
) -> Option<ServerMessage> {
    match msg {
        ClientMessage::StartGame { stage_ids } => {
            check_caller!(role, "start a game");
            let stages = match state.stages_for(stage_ids.as_deref()) {
                Ok(stages) => stages,
                Err(e) => return Some(ServerMessage::from(&e)),
            };
            tracing::info!(call_id = %call.id, stages = stages.len(), "Starting game");
            call.game.start(stages).await.err().map(|e| ServerMessage::from(&e))
        }

        // A peer's pick is the counterpart answer
        ClientMessage::SubmitAnswer { index } => {
            let result = match role {
                Role::Caller => call.game.submit_answer(index).await,
                Role::Peer => call.game.record_counterpart_answer(index).await,
            };
            result.err().map(|e| ServerMessage::from(&e))
        }

        ClientMessage::PlayAgain => {
            check_caller!(role, "restart the game");
            call.game.play_again().await.err().map(|e| ServerMessage::from(&e))
        }

        ClientMessage::ExitGame => {
            check_caller!(role, "exit the game");
            call.game.cancel().await;
            None
        }

        ClientMessage::GetState => Some(ServerMessage::GameState {
            state: call.game.snapshot().await,
        }),
    }
}
