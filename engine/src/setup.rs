// ═══════════════════════════════════════════════════════════════════════
// Lobby and match start.
//
// A match is born in Lobby with a host already seated; players join and
// leave freely until `start`, which shuffles colors, turn order,
// territories, objectives and the card deck, all through the match's
// own deterministic RNG.
// ═══════════════════════════════════════════════════════════════════════

use rand::seq::SliceRandom;

use crate::cards::{all_cards, NUM_CARDS};
use crate::error::ActionError;
use crate::objectives::NUM_OBJECTIVES;
use crate::types::{
    CardHolder, MatchId, MatchState, ObjectiveId, Phase, PlayerColor, PlayerInMatch, PlayerSlot,
    TerritoryHolding, TerritoryId,
};
use crate::world::NUM_TERRITORIES;

pub const MIN_PLAYERS: u8 = 2;
pub const MAX_PLAYERS: u8 = 6;

/// Starting army pool by player count: 40 for two players, 5 fewer per
/// extra player. Territories received during distribution each consume
/// one army from the pool.
pub fn initial_armies(player_count: u8) -> u16 {
    40 - 5 * (player_count as u16 - 2)
}

/// Create a match in Lobby with the host seated in slot 0.
pub fn new_lobby(
    id: MatchId,
    created_at_ms: u64,
    seed: u64,
    host_username: &str,
    host_is_ai: bool,
) -> MatchState {
    let mut state = MatchState {
        id,
        phase: Phase::Lobby,
        created_at_ms,
        turn: None,
        winner: None,
        win_condition: None,
        trades_performed: 0,
        players: Vec::new(),
        territories: Vec::new(),
        card_holders: Vec::new(),
        deck: Vec::new(),
        seed,
        rng_counter: 0,
    };
    seat(&mut state, host_username, host_is_ai);
    state
}

fn seat(state: &mut MatchState, username: &str, is_ai: bool) {
    let color = PlayerColor::ALL
        .iter()
        .copied()
        .find(|c| state.slot_by_color(*c).is_none())
        .unwrap_or(PlayerColor::White);
    state.players.push(PlayerInMatch {
        username: username.to_string(),
        color,
        turn_order: 0,
        unallocated: 0,
        objective: ObjectiveId(0),
        captured_this_turn: false,
        alive: true,
        is_ai,
    });
}

fn require_lobby(state: &MatchState) -> Result<(), ActionError> {
    match state.phase {
        Phase::Lobby => Ok(()),
        p if p.is_terminal() => Err(ActionError::TerminalState(p)),
        p => Err(ActionError::InvalidPhase {
            current: p,
            required: Phase::Lobby,
        }),
    }
}

pub fn join_lobby(state: &mut MatchState, username: &str, is_ai: bool) -> Result<(), ActionError> {
    require_lobby(state)?;
    if state.slot_of(username).is_some() {
        return Err(ActionError::NameTaken(username.to_string()));
    }
    if state.player_count() >= MAX_PLAYERS {
        return Err(ActionError::LobbyFull { max: MAX_PLAYERS });
    }
    seat(state, username, is_ai);
    Ok(())
}

/// Leave the lobby. When the last seat empties the match is canceled.
pub fn leave_lobby(state: &mut MatchState, username: &str) -> Result<(), ActionError> {
    require_lobby(state)?;
    let slot = state
        .slot_of(username)
        .ok_or_else(|| ActionError::EntityNotFound(format!("player {username}")))?;
    state.players.remove(slot.0 as usize);
    if state.players.is_empty() {
        state.phase = Phase::Canceled;
    }
    Ok(())
}

/// Cancel the match. Legal only while still in Lobby.
pub fn cancel_match(state: &mut MatchState) -> Result<(), ActionError> {
    require_lobby(state)?;
    state.phase = Phase::Canceled;
    Ok(())
}

/// Populate the match and enter SetupAllocation: shuffle colors and turn
/// order, distribute all territories round-robin with one army each,
/// deal one secret objective per player, shuffle the draw pile.
pub fn start_match(state: &mut MatchState) -> Result<(), ActionError> {
    require_lobby(state)?;
    let n = state.player_count();
    if n < MIN_PLAYERS {
        return Err(ActionError::NotEnoughPlayers {
            have: n,
            min: MIN_PLAYERS,
        });
    }

    // Colors and turn order.
    let mut rng = state.next_rng();
    let mut colors = PlayerColor::ALL;
    colors.shuffle(&mut rng);
    let mut orders: Vec<u8> = (1..=n).collect();
    orders.shuffle(&mut rng);
    for (i, player) in state.players.iter_mut().enumerate() {
        player.color = colors[i];
        player.turn_order = orders[i];
    }

    // Round-robin territory distribution, one army per territory.
    let mut territory_ids: Vec<TerritoryId> =
        (0..NUM_TERRITORIES as u8).map(TerritoryId).collect();
    let mut rng = state.next_rng();
    territory_ids.shuffle(&mut rng);

    let mut by_order: Vec<PlayerSlot> = (0..n).map(PlayerSlot).collect();
    by_order.sort_by_key(|s| state.player(*s).turn_order);

    state.territories = vec![
        TerritoryHolding {
            owner: None,
            armies: 0,
            moved_in: 0,
        };
        NUM_TERRITORIES
    ];
    let mut received = vec![0u16; n as usize];
    for (i, territory) in territory_ids.iter().enumerate() {
        let slot = by_order[i % by_order.len()];
        let holding = state.territory_mut(*territory);
        holding.owner = Some(slot);
        holding.armies = 1;
        received[slot.0 as usize] += 1;
    }

    // Each territory received consumed one army of the starting pool.
    let pool = initial_armies(n);
    for (i, player) in state.players.iter_mut().enumerate() {
        player.unallocated = pool - received[i];
    }

    // One secret objective per player.
    let mut objective_ids: Vec<ObjectiveId> =
        (0..NUM_OBJECTIVES as u8).map(ObjectiveId).collect();
    let mut rng = state.next_rng();
    objective_ids.shuffle(&mut rng);
    for (i, player) in state.players.iter_mut().enumerate() {
        player.objective = objective_ids[i];
    }

    // Card deck.
    state.card_holders = vec![CardHolder::Deck; NUM_CARDS];
    state.deck = all_cards().collect();
    let mut rng = state.next_rng();
    state.deck.shuffle(&mut rng);

    state.phase = Phase::SetupAllocation;
    state.turn = None;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn four_player_lobby() -> MatchState {
        let mut state = new_lobby(MatchId(1), 0, 42, "alice", false);
        join_lobby(&mut state, "bob", false).unwrap();
        join_lobby(&mut state, "carol", true).unwrap();
        join_lobby(&mut state, "dave", true).unwrap();
        state
    }

    #[test]
    fn initial_army_table() {
        assert_eq!(initial_armies(2), 40);
        assert_eq!(initial_armies(3), 35);
        assert_eq!(initial_armies(4), 30);
        assert_eq!(initial_armies(5), 25);
        assert_eq!(initial_armies(6), 20);
    }

    #[test]
    fn duplicate_username_rejected() {
        let mut state = new_lobby(MatchId(1), 0, 1, "alice", false);
        assert_eq!(
            join_lobby(&mut state, "alice", false),
            Err(ActionError::NameTaken("alice".into()))
        );
    }

    #[test]
    fn seventh_player_rejected() {
        let mut state = new_lobby(MatchId(1), 0, 1, "p0", false);
        for i in 1..6 {
            join_lobby(&mut state, &format!("p{i}"), false).unwrap();
        }
        assert_eq!(
            join_lobby(&mut state, "p6", false),
            Err(ActionError::LobbyFull { max: 6 })
        );
    }

    #[test]
    fn last_player_leaving_cancels() {
        let mut state = new_lobby(MatchId(1), 0, 1, "alice", false);
        leave_lobby(&mut state, "alice").unwrap();
        assert_eq!(state.phase, Phase::Canceled);
    }

    #[test]
    fn start_requires_two_players() {
        let mut state = new_lobby(MatchId(1), 0, 1, "alice", false);
        assert_eq!(
            start_match(&mut state),
            Err(ActionError::NotEnoughPlayers { have: 1, min: 2 })
        );
    }

    #[test]
    fn start_distributes_everything() {
        let mut state = four_player_lobby();
        start_match(&mut state).unwrap();

        assert_eq!(state.phase, Phase::SetupAllocation);
        assert_eq!(state.turn, None);

        // Every territory owned with exactly one army.
        assert!(state
            .territories
            .iter()
            .all(|t| t.owner.is_some() && t.armies == 1 && t.moved_in == 0));

        // Even split of 42 territories among 4 players: 10 or 11 each.
        for slot in (0..4).map(PlayerSlot) {
            let owned = state.owned_count(slot);
            assert!(owned == 10 || owned == 11, "owned {owned}");
            // Pool + placed armies account for the whole 30.
            assert_eq!(
                state.player(slot).unallocated + owned as u16,
                initial_armies(4)
            );
        }

        // Turn orders form a permutation of 1..=4.
        let mut orders: Vec<u8> = state.players.iter().map(|p| p.turn_order).collect();
        orders.sort_unstable();
        assert_eq!(orders, vec![1, 2, 3, 4]);

        // Distinct colors and objectives.
        for a in 0..4 {
            for b in (a + 1)..4 {
                assert_ne!(state.players[a].color, state.players[b].color);
                assert_ne!(state.players[a].objective, state.players[b].objective);
            }
        }

        // Full deck, nothing dealt yet.
        assert_eq!(state.deck.len(), NUM_CARDS);
        assert!(state.card_holders.iter().all(|h| *h == CardHolder::Deck));
    }

    #[test]
    fn start_is_deterministic_per_seed() {
        let mut a = four_player_lobby();
        let mut b = four_player_lobby();
        start_match(&mut a).unwrap();
        start_match(&mut b).unwrap();
        assert_eq!(serde_json::to_string(&a).ok(), serde_json::to_string(&b).ok());
    }

    #[test]
    fn join_after_start_rejected() {
        let mut state = four_player_lobby();
        start_match(&mut state).unwrap();
        assert_eq!(
            join_lobby(&mut state, "eve", false),
            Err(ActionError::InvalidPhase {
                current: Phase::SetupAllocation,
                required: Phase::Lobby,
            })
        );
    }
}
