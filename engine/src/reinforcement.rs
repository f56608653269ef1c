// ═══════════════════════════════════════════════════════════════════════
// Reinforcement income — a pure function of the ownership map.
// ═══════════════════════════════════════════════════════════════════════

use crate::types::{Continent, MatchState, PlayerSlot};
use crate::world::continent_territories;

/// Base income: half the owned territories, never below 3.
pub fn territorial_income(owned: usize) -> u16 {
    ((owned / 2) as u16).max(3)
}

/// Continents fully held by `slot`.
pub fn continents_held(state: &MatchState, slot: PlayerSlot) -> Vec<Continent> {
    Continent::ALL
        .iter()
        .copied()
        .filter(|c| {
            continent_territories(*c).all(|t| state.territory(t).owner == Some(slot))
        })
        .collect()
}

/// Total reinforcement income at the start of a player's turn:
/// territorial base plus every fully-held continent's bonus.
pub fn turn_income(state: &MatchState, slot: PlayerSlot) -> u16 {
    let base = territorial_income(state.owned_count(slot));
    let bonus: u16 = continents_held(state, slot).iter().map(|c| c.bonus()).sum();
    base + bonus
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn income_floor_is_three() {
        assert_eq!(territorial_income(1), 3);
        assert_eq!(territorial_income(6), 3);
        assert_eq!(territorial_income(7), 3);
    }

    #[test]
    fn income_is_half_owned_rounded_down() {
        assert_eq!(territorial_income(8), 4);
        assert_eq!(territorial_income(9), 4);
        assert_eq!(territorial_income(42), 21);
    }
}
