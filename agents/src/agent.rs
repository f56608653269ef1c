// ═══════════════════════════════════════════════════════════════════════
// The Agent trait and the action vocabulary bots share with humans.
// ═══════════════════════════════════════════════════════════════════════

use war_engine::{CardId, PlayerSnapshot, TerritoryId};

/// One atomic decision. Bots emit exactly the action types a human client
/// can submit, plus `Pass` for "end the phase or do nothing".
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BotAction {
    Trade([CardId; 3]),
    Reinforce {
        territory: TerritoryId,
        count: u16,
    },
    Attack {
        source: TerritoryId,
        target: TerritoryId,
        dice: u8,
    },
    Fortify {
        source: TerritoryId,
        target: TerritoryId,
        count: u16,
    },
    Pass,
}

pub trait Agent: Send {
    fn name(&self) -> &'static str;

    /// Decide the next action from the player's view of the match. Must
    /// always return something; `Pass` is the universal fallback.
    fn decide(&mut self, view: &PlayerSnapshot) -> BotAction;
}
