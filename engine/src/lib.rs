//! Server-authoritative match engine for the War territory-conquest game.
//!
//! Pure state and rules: no I/O, no threads, no clocks. Callers feed
//! complete actions in and get a new state or a typed rejection back;
//! randomness is derived from the match's own seed so every match is
//! replayable.

pub mod cards;
pub mod combat;
pub mod engine;
pub mod error;
pub mod objectives;
pub mod reinforcement;
pub mod setup;
pub mod snapshot;
pub mod types;
pub mod world;


pub use engine::{
    allocate_reinforcements, attack, check_win, end_phase_or_turn, fortify, trade_cards,
};
pub use error::ActionError;
pub use setup::{cancel_match, join_lobby, leave_lobby, new_lobby, start_match};
pub use snapshot::{match_snapshot, player_snapshot, MatchSnapshot, PlayerSnapshot};
pub use types::{
    CardHolder, CardId, CardKind, Continent, MatchId, MatchState, ObjectiveId, Phase, PlayerColor,
    PlayerInMatch, PlayerSlot, TerritoryHolding, TerritoryId, WinCondition,
};
