mod call;

use crate::catalog;
use crate::config::AppConfig;
use crate::countries::CountryDirectory;
use crate::engine::GameError;
use crate::types::*;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

pub use call::Call;

/// Errors when opening or joining a call
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CallError {
    #[error("Call '{0}' not found")]
    NotFound(CallId),

    #[error("Call already has a peer connected")]
    PeerAlreadyJoined,

    #[error("Peer connections need a call id")]
    MissingCallId,
}

impl CallError {
    pub fn code(&self) -> &'static str {
        match self {
            CallError::NotFound(_) => "CALL_NOT_FOUND",
            CallError::PeerAlreadyJoined => "CALL_FULL",
            CallError::MissingCallId => "MISSING_CALL_ID",
        }
    }
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    /// Stages offered when a game starts without an explicit selection
    pub catalog: Arc<Vec<Stage>>,
    pub countries: Arc<CountryDirectory>,
    pub calls: Arc<RwLock<HashMap<CallId, Call>>>,
}

impl AppState {
    pub fn new(config: AppConfig, countries: CountryDirectory) -> Self {
        Self {
            config,
            catalog: Arc::new(catalog::default_stages()),
            countries: Arc::new(countries),
            calls: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Resolve a stage selection against the catalog; `None` means all of it
    pub fn stages_for(&self, ids: Option<&[StageId]>) -> Result<Vec<Stage>, GameError> {
        match ids {
            Some(ids) if !ids.is_empty() => catalog::select(&self.catalog, ids),
            _ => Ok(self.catalog.as_ref().clone()),
        }
    }
}
