use super::*;
use crate::live::LiveGame;
use crate::protocol::ServerMessage;

/// One video call and the game played on it
#[derive(Clone)]
pub struct Call {
    pub id: CallId,
    pub caller: Option<Participant>,
    pub peer: Option<Participant>,
    pub peer_connected: bool,
    pub game: Arc<LiveGame>,
    pub created_at: String,
}

impl AppState {
    /// Open a new call with a fresh game
    pub async fn create_call(&self, caller: Option<Participant>) -> Call {
        let call = Call {
            id: ulid::Ulid::new().to_string(),
            caller,
            peer: None,
            peer_connected: false,
            game: LiveGame::new(self.config.game.clone()),
            created_at: chrono::Utc::now().to_rfc3339(),
        };

        self.calls
            .write()
            .await
            .insert(call.id.clone(), call.clone());
        tracing::info!(call_id = %call.id, "Call created");
        call
    }

    pub async fn get_call(&self, id: &str) -> Option<Call> {
        self.calls.read().await.get(id).cloned()
    }

    /// Attach the other party to an existing call
    pub async fn join_call(&self, id: &str, peer: Option<Participant>) -> Result<Call, CallError> {
        let mut calls = self.calls.write().await;
        let call = calls
            .get_mut(id)
            .ok_or_else(|| CallError::NotFound(id.to_string()))?;

        if call.peer_connected {
            return Err(CallError::PeerAlreadyJoined);
        }
        call.peer_connected = true;
        call.peer = peer.clone();

        call.game.publish(ServerMessage::PeerJoined { participant: peer });
        tracing::info!(call_id = %id, "Peer joined call");
        Ok(call.clone())
    }

    /// Peer hung up; the call stays open for a reconnect
    pub async fn leave_call(&self, id: &str) {
        let mut calls = self.calls.write().await;
        if let Some(call) = calls.get_mut(id) {
            call.peer_connected = false;
            call.game.publish(ServerMessage::PeerLeft);
            tracing::info!(call_id = %id, "Peer left call");
        }
    }

    /// Tear the call down: stop its timers and tell everyone still listening
    pub async fn end_call(&self, id: &str) -> bool {
        let removed = self.calls.write().await.remove(id);
        match removed {
            Some(call) => {
                call.game.shutdown().await;
                call.game.publish(ServerMessage::CallEnded);
                tracing::info!(call_id = %id, "Call ended");
                true
            }
            None => false,
        }
    }

    pub async fn call_count(&self) -> usize {
        self.calls.read().await.len()
    }
}
