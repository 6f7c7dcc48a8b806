//! Errors returned by workspace actions.

use crate::controller::Interaction;
use crate::gateway::GatewayError;
use crate::history::PersistenceError;
use crate::model::EntryKey;

#[derive(Debug, thiserror::Error)]
pub enum WorkspaceError {
    /// The action was rejected locally before any gateway call.
    #[error("invalid request: {0}")]
    InvalidRequest(String),

    /// The gateway call behind `interaction` failed.
    #[error("{interaction} failed: {source}")]
    Gateway {
        interaction: Interaction,
        #[source]
        source: GatewayError,
    },

    #[error("no history entry with key {0}")]
    UnknownEntry(EntryKey),

    #[error("no history row at position {0}")]
    UnknownRow(usize),

    /// A clear was confirmed with a stale or foreign confirmation.
    #[error("clear history was not confirmed")]
    ClearNotConfirmed,

    #[error("history export failed: {0}")]
    Export(#[from] PersistenceError),
}

impl WorkspaceError {
    /// The interaction whose surface should report this error, if any.
    #[must_use]
    pub fn interaction(&self) -> Option<Interaction> {
        match self {
            Self::Gateway { interaction, .. } => Some(*interaction),
            _ => None,
        }
    }
}
