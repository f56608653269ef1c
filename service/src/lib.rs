//! Match hosting on top of the engine: per-match serialization, the AI
//! event loop, persistence, broadcasting, timed movements and headless
//! simulation.

pub mod broadcast;
pub mod movements;
pub mod orchestrator;
pub mod registry;
pub mod repository;
pub mod simulate;

use thiserror::Error;

use war_engine::{ActionError, MatchId};

pub use broadcast::{Broadcaster, ChannelBroadcaster, NullBroadcaster, PushEvent};
pub use movements::{MovementId, MovementLedger, MovementOutcome};
pub use orchestrator::{spawn_ai_worker, AiEvent, AiWorker, CompletedAction};
pub use registry::MatchService;
pub use repository::{LeaderboardRow, MatchResult, MemoryRepository, Repository, SqliteRepository};
pub use simulate::{run_batch, run_match, SimOutcome};

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("match {0:?} not found")]
    MatchNotFound(MatchId),

    #[error("player {0:?} is not part of this match")]
    PlayerNotFound(String),

    /// The engine rejected the action; the match is unchanged.
    #[error(transparent)]
    Rejected(#[from] ActionError),

    #[error("storage: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("encoding: {0}")]
    Encoding(#[from] serde_json::Error),

    #[error("match lock poisoned by a panicked holder")]
    LockPoisoned,
}
