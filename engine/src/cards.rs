// ═══════════════════════════════════════════════════════════════════════
// Card catalog and trade economy.
//
// 44 physical cards: one per territory carrying a region symbol, plus
// two unbound wilds. The catalog is derived, not tabulated — a card's
// symbol follows from its id.
// ═══════════════════════════════════════════════════════════════════════

use crate::types::{CardId, CardKind, TerritoryId};
use crate::world::NUM_TERRITORIES;

pub const NUM_WILD_CARDS: usize = 2;
pub const NUM_CARDS: usize = NUM_TERRITORIES + NUM_WILD_CARDS;

/// Hand-size gate for the end-of-turn card award.
pub const CARD_AWARD_HAND_LIMIT: usize = 5;

/// The symbol printed on a card. Territory cards cycle through the three
/// region symbols in id order; the last two cards are wild.
pub fn card_kind(id: CardId) -> CardKind {
    if (id.0 as usize) >= NUM_TERRITORIES {
        return CardKind::Wild;
    }
    match id.0 % 3 {
        0 => CardKind::Circle,
        1 => CardKind::Square,
        _ => CardKind::Triangle,
    }
}

/// The territory a card is bound to. Wild cards are unbound.
pub fn card_territory(id: CardId) -> Option<TerritoryId> {
    if (id.0 as usize) < NUM_TERRITORIES {
        Some(TerritoryId(id.0))
    } else {
        None
    }
}

pub fn all_cards() -> impl Iterator<Item = CardId> {
    (0..NUM_CARDS as u8).map(CardId)
}

/// Trade-set rule: exactly 3 distinct cards forming either three of the
/// same region symbol, three distinct region symbols, or any combination
/// containing a wild (a wild completes every set).
pub fn is_valid_trade_set(cards: &[CardId; 3]) -> bool {
    if cards[0] == cards[1] || cards[0] == cards[2] || cards[1] == cards[2] {
        return false;
    }
    let kinds = [
        card_kind(cards[0]),
        card_kind(cards[1]),
        card_kind(cards[2]),
    ];
    if kinds.contains(&CardKind::Wild) {
        return true;
    }
    let all_same = kinds[0] == kinds[1] && kinds[1] == kinds[2];
    let all_distinct = kinds[0] != kinds[1] && kinds[1] != kinds[2] && kinds[0] != kinds[2];
    all_same || all_distinct
}

/// Pooled troop bonus for a trade, keyed by the match's trade counter
/// *before* this trade: 4, 6, 8, 10, 12, then +5 per trade without bound.
pub fn trade_bonus(trades_before: u32) -> u16 {
    if trades_before < 5 {
        4 + 2 * trades_before as u16
    } else {
        (15 + 5 * (trades_before - 5)) as u16
    }
}

/// Extra static armies granted directly to a territory when its bound
/// card is traded by its current owner.
pub const TERRITORY_MATCH_BONUS: u16 = 2;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_cycle_and_wilds_trail() {
        assert_eq!(card_kind(CardId(0)), CardKind::Circle);
        assert_eq!(card_kind(CardId(1)), CardKind::Square);
        assert_eq!(card_kind(CardId(2)), CardKind::Triangle);
        assert_eq!(card_kind(CardId(3)), CardKind::Circle);
        assert_eq!(card_kind(CardId(42)), CardKind::Wild);
        assert_eq!(card_kind(CardId(43)), CardKind::Wild);
    }

    #[test]
    fn wilds_are_unbound() {
        assert_eq!(card_territory(CardId(42)), None);
        assert_eq!(card_territory(CardId(5)), Some(TerritoryId(5)));
    }

    #[test]
    fn three_of_a_kind_trades() {
        // ids 0, 3, 6 are all Circle
        assert!(is_valid_trade_set(&[CardId(0), CardId(3), CardId(6)]));
    }

    #[test]
    fn one_of_each_trades() {
        assert!(is_valid_trade_set(&[CardId(0), CardId(1), CardId(2)]));
    }

    #[test]
    fn a_pair_plus_odd_one_does_not_trade() {
        // Circle, Circle, Square
        assert!(!is_valid_trade_set(&[CardId(0), CardId(3), CardId(1)]));
    }

    #[test]
    fn wild_completes_anything() {
        assert!(is_valid_trade_set(&[CardId(42), CardId(0), CardId(3)]));
        assert!(is_valid_trade_set(&[CardId(42), CardId(43), CardId(7)]));
    }

    #[test]
    fn duplicate_ids_never_trade() {
        assert!(!is_valid_trade_set(&[CardId(0), CardId(0), CardId(1)]));
    }

    #[test]
    fn validity_ignores_order() {
        let sets = [
            [CardId(0), CardId(1), CardId(2)],
            [CardId(2), CardId(0), CardId(1)],
            [CardId(1), CardId(2), CardId(0)],
        ];
        assert!(sets.iter().all(is_valid_trade_set));
    }

    #[test]
    fn bonus_schedule_escalates() {
        assert_eq!(trade_bonus(0), 4);
        assert_eq!(trade_bonus(1), 6);
        assert_eq!(trade_bonus(4), 12);
        assert_eq!(trade_bonus(5), 15);
        assert_eq!(trade_bonus(6), 20);
        assert_eq!(trade_bonus(10), 40);
    }
}
