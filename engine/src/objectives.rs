// ═══════════════════════════════════════════════════════════════════════
// Secret objectives — static catalog plus the evaluator.
//
// Objective parameters are carried as typed data next to the display
// text; the evaluator branches on the kind, never on the text.
// ═══════════════════════════════════════════════════════════════════════

use crate::reinforcement::continents_held;
use crate::types::{Continent, MatchState, ObjectiveId, PlayerColor, PlayerSlot};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectiveKind {
    /// Fully control both named continents; `plus_one_more` additionally
    /// requires a third fully-held continent of the player's choice.
    ConquerContinents {
        continents: [Continent; 2],
        plus_one_more: bool,
    },
    /// Own at least `count` territories, each holding `min_armies` or more.
    HoldTerritories { count: u8, min_armies: u16 },
    /// The player of the named color must be out of the match.
    EliminateColor(PlayerColor),
}

#[derive(Debug, Clone)]
pub struct ObjectiveDef {
    pub id: ObjectiveId,
    pub kind: ObjectiveKind,
    pub description: &'static str,
}

pub const NUM_OBJECTIVES: usize = 14;

macro_rules! objective {
    ($id:expr, $kind:expr, $desc:expr) => {
        ObjectiveDef {
            id: ObjectiveId($id),
            kind: $kind,
            description: $desc,
        }
    };
}

use Continent::*;
use ObjectiveKind::*;

pub static OBJECTIVES: [ObjectiveDef; NUM_OBJECTIVES] = [
    objective!(0, ConquerContinents { continents: [Asia, Africa], plus_one_more: false },
        "Conquer the whole of Asia and Africa"),
    objective!(1, ConquerContinents { continents: [NorthAmerica, Africa], plus_one_more: false },
        "Conquer the whole of North America and Africa"),
    objective!(2, ConquerContinents { continents: [Asia, SouthAmerica], plus_one_more: false },
        "Conquer the whole of Asia and South America"),
    objective!(3, ConquerContinents { continents: [NorthAmerica, Oceania], plus_one_more: false },
        "Conquer the whole of North America and Oceania"),
    objective!(4, ConquerContinents { continents: [Europe, Oceania], plus_one_more: true },
        "Conquer the whole of Europe, Oceania and one more continent of your choice"),
    objective!(5, ConquerContinents { continents: [Europe, SouthAmerica], plus_one_more: true },
        "Conquer the whole of Europe, South America and one more continent of your choice"),
    objective!(6, HoldTerritories { count: 24, min_armies: 1 },
        "Conquer 24 territories"),
    objective!(7, HoldTerritories { count: 18, min_armies: 2 },
        "Conquer 18 territories and occupy each with at least 2 armies"),
    objective!(8, EliminateColor(PlayerColor::White),
        "Eliminate all armies of the White player"),
    objective!(9, EliminateColor(PlayerColor::Black),
        "Eliminate all armies of the Black player"),
    objective!(10, EliminateColor(PlayerColor::Red),
        "Eliminate all armies of the Red player"),
    objective!(11, EliminateColor(PlayerColor::Blue),
        "Eliminate all armies of the Blue player"),
    objective!(12, EliminateColor(PlayerColor::Green),
        "Eliminate all armies of the Green player"),
    objective!(13, EliminateColor(PlayerColor::Yellow),
        "Eliminate all armies of the Yellow player"),
];

pub fn objective(id: ObjectiveId) -> &'static ObjectiveDef {
    &OBJECTIVES[id.0 as usize]
}

/// True if the elimination objective cannot apply to this player: it
/// names their own color, or a color with no player in the match. Such
/// an objective degrades to "be the last player standing".
pub fn is_degraded(state: &MatchState, slot: PlayerSlot, id: ObjectiveId) -> bool {
    match objective(id).kind {
        EliminateColor(color) => match state.slot_by_color(color) {
            None => true,
            Some(target) => target == slot,
        },
        _ => false,
    }
}

/// Evaluate a player's objective against the current match state. The
/// player must themselves still be in the match to win by objective.
pub fn is_satisfied(state: &MatchState, slot: PlayerSlot, id: ObjectiveId) -> bool {
    if !state.player(slot).alive {
        return false;
    }
    match objective(id).kind {
        ConquerContinents {
            continents,
            plus_one_more,
        } => {
            let held = continents_held(state, slot);
            let both = continents.iter().all(|c| held.contains(c));
            both && (!plus_one_more || held.len() >= 3)
        }
        HoldTerritories { count, min_armies } => {
            let qualifying = state
                .owned_territories(slot)
                .filter(|t| state.territory(*t).total() >= min_armies)
                .count();
            qualifying >= count as usize
        }
        EliminateColor(color) => {
            if is_degraded(state, slot, id) {
                return state.alive_count() == 1;
            }
            match state.slot_by_color(color) {
                Some(target) => !state.player(target).alive,
                None => false,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn catalog_ids_match_positions() {
        for (i, o) in OBJECTIVES.iter().enumerate() {
            assert_eq!(o.id, ObjectiveId(i as u8), "objective {i}");
        }
    }

    #[test]
    fn every_color_has_an_elimination_objective() {
        for color in PlayerColor::ALL {
            assert!(OBJECTIVES
                .iter()
                .any(|o| o.kind == EliminateColor(color)));
        }
    }
}
