//! Bot players: the `Agent` trait plus the stock implementations.
//!
//! Agents decide from a `PlayerSnapshot` — the same view a human client
//! receives — never from raw match state.

pub mod agent;
pub mod heuristic;
pub mod random;

pub use agent::{Agent, BotAction};
pub use heuristic::HeuristicAgent;
pub use random::RandomAgent;
