// ═══════════════════════════════════════════════════════════════════════
// Action error taxonomy.
//
// Every rejected action names exactly why it was rejected, so callers
// (service layer, bots, tests) can branch on the variant instead of
// parsing message strings.
// ═══════════════════════════════════════════════════════════════════════

use thiserror::Error;

use crate::types::Phase;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ActionError {
    #[error("action requires phase {required}, match is in {current}")]
    InvalidPhase { current: Phase, required: Phase },

    #[error("it is not this player's turn")]
    NotYourTurn,

    #[error("player does not own the territory")]
    NotOwned,

    #[error("territories are not adjacent")]
    NotAdjacent,

    #[error("not enough armies for this action")]
    InsufficientArmies,

    #[error("a territory cannot attack itself")]
    SelfAttack,

    #[error("source and target must be different territories")]
    SameTerritory,

    #[error("declared {dice} dice, at most {max} allowed here")]
    InvalidDiceCount { dice: u8, max: u8 },

    #[error("cards do not form a tradeable set")]
    InvalidCardSet,

    #[error("{remaining} reinforcements still unallocated")]
    UnallocatedReinforcements { remaining: u16 },

    #[error("lobby already has the maximum of {max} players")]
    LobbyFull { max: u8 },

    #[error("username {0:?} already joined this match")]
    NameTaken(String),

    #[error("cannot start with {have} players, at least {min} required")]
    NotEnoughPlayers { have: u8, min: u8 },

    #[error("no such entity: {0}")]
    EntityNotFound(String),

    #[error("match is in terminal state {0}")]
    TerminalState(Phase),
}
