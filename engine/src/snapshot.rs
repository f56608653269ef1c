// ═══════════════════════════════════════════════════════════════════════
// Snapshots — what gets pushed to clients.
//
// MatchSnapshot carries only public information; player_snapshot layers
// the viewer's own hand and secret objective on top. Opponents' hands
// are visible as counts only.
// ═══════════════════════════════════════════════════════════════════════

use serde::Serialize;

use crate::cards::{card_kind, card_territory};
use crate::objectives::objective;
use crate::types::{
    CardId, CardKind, MatchId, MatchState, ObjectiveId, Phase, PlayerColor, PlayerSlot,
    TerritoryId, WinCondition,
};
use crate::world::territory_name;

#[derive(Debug, Clone, Serialize)]
pub struct PlayerPublic {
    pub slot: PlayerSlot,
    pub username: String,
    pub color: PlayerColor,
    pub turn_order: u8,
    pub alive: bool,
    pub is_ai: bool,
    pub territory_count: usize,
    pub card_count: usize,
    pub unallocated: u16,
}

#[derive(Debug, Clone, Serialize)]
pub struct TerritoryView {
    pub id: TerritoryId,
    pub name: &'static str,
    pub owner: Option<PlayerSlot>,
    pub armies: u16,
    pub moved_in: u16,
}

/// Public information: everything every participant may see.
#[derive(Debug, Clone, Serialize)]
pub struct MatchSnapshot {
    pub id: MatchId,
    pub phase: Phase,
    pub turn: Option<PlayerSlot>,
    pub winner: Option<PlayerSlot>,
    pub win_condition: Option<WinCondition>,
    pub trades_performed: u32,
    pub cards_in_deck: usize,
    pub players: Vec<PlayerPublic>,
    pub territories: Vec<TerritoryView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct CardView {
    pub id: CardId,
    pub kind: CardKind,
    pub territory: Option<TerritoryId>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ObjectiveView {
    pub id: ObjectiveId,
    pub description: &'static str,
}

/// One player's view: the public snapshot plus their own secrets.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerSnapshot {
    pub viewer: PlayerSlot,
    pub shared: MatchSnapshot,
    pub hand: Vec<CardView>,
    pub objective: Option<ObjectiveView>,
}

pub fn match_snapshot(state: &MatchState) -> MatchSnapshot {
    MatchSnapshot {
        id: state.id,
        phase: state.phase,
        turn: state.turn,
        winner: state.winner,
        win_condition: state.win_condition,
        trades_performed: state.trades_performed,
        cards_in_deck: state.deck.len(),
        players: (0..state.players.len())
            .map(|i| {
                let slot = PlayerSlot(i as u8);
                let p = state.player(slot);
                PlayerPublic {
                    slot,
                    username: p.username.clone(),
                    color: p.color,
                    turn_order: p.turn_order,
                    alive: p.alive,
                    is_ai: p.is_ai,
                    territory_count: state.owned_count(slot),
                    card_count: state.hand_size(slot),
                    unallocated: p.unallocated,
                }
            })
            .collect(),
        territories: state
            .territories
            .iter()
            .enumerate()
            .map(|(i, t)| TerritoryView {
                id: TerritoryId(i as u8),
                name: territory_name(TerritoryId(i as u8)),
                owner: t.owner,
                armies: t.armies,
                moved_in: t.moved_in,
            })
            .collect(),
    }
}

pub fn player_snapshot(state: &MatchState, viewer: PlayerSlot) -> PlayerSnapshot {
    let hand = state
        .cards_of(viewer)
        .into_iter()
        .map(|id| CardView {
            id,
            kind: card_kind(id),
            territory: card_territory(id),
        })
        .collect();
    // No objective dealt while still in Lobby.
    let objective = if state.phase == Phase::Lobby {
        None
    } else {
        let o = objective(state.player(viewer).objective);
        Some(ObjectiveView {
            id: o.id,
            description: o.description,
        })
    };
    PlayerSnapshot {
        viewer,
        shared: match_snapshot(state),
        hand,
        objective,
    }
}
