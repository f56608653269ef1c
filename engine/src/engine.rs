// ═══════════════════════════════════════════════════════════════════════
// Action pipeline — validate, mutate, check for a winner.
//
// Every public operation is validate-then-mutate: all guards run before
// the first field is touched, so a rejected action leaves the match
// byte-for-byte unchanged.
// ═══════════════════════════════════════════════════════════════════════

use crate::cards::{
    card_territory, is_valid_trade_set, trade_bonus, CARD_AWARD_HAND_LIMIT, TERRITORY_MATCH_BONUS,
};
use crate::combat::{battle, defend_dice, roll, CombatReport, MAX_ATTACK_DICE};
use crate::error::ActionError;
use crate::objectives::is_satisfied;
use crate::reinforcement::turn_income;
use crate::types::{
    CardHolder, CardId, MatchState, Phase, PlayerSlot, TerritoryId, WinCondition,
};
use crate::world::{are_adjacent, NUM_TERRITORIES};

// ── Guards ─────────────────────────────────────────────────────────────

fn require_phase(state: &MatchState, required: Phase) -> Result<(), ActionError> {
    if state.phase.is_terminal() {
        return Err(ActionError::TerminalState(state.phase));
    }
    if state.phase != required {
        return Err(ActionError::InvalidPhase {
            current: state.phase,
            required,
        });
    }
    Ok(())
}

fn require_turn(state: &MatchState, slot: PlayerSlot) -> Result<(), ActionError> {
    if state.turn != Some(slot) {
        return Err(ActionError::NotYourTurn);
    }
    Ok(())
}

fn require_territory(id: TerritoryId) -> Result<(), ActionError> {
    if (id.0 as usize) < NUM_TERRITORIES {
        Ok(())
    } else {
        Err(ActionError::EntityNotFound(format!("territory {}", id.0)))
    }
}

fn require_owned(
    state: &MatchState,
    slot: PlayerSlot,
    id: TerritoryId,
) -> Result<(), ActionError> {
    require_territory(id)?;
    if state.territory(id).owner == Some(slot) {
        Ok(())
    } else {
        Err(ActionError::NotOwned)
    }
}

// ── Reinforcement allocation ───────────────────────────────────────────

/// Place `count` armies from the player's unallocated pool onto an owned
/// territory. Legal during SetupAllocation (any seated player) and during
/// the player's own Reinforcement phase. Emptying the last pool ends
/// SetupAllocation; emptying the pool in Reinforcement advances to Attack.
pub fn allocate_reinforcements(
    state: &mut MatchState,
    slot: PlayerSlot,
    territory: TerritoryId,
    count: u16,
) -> Result<(), ActionError> {
    if state.phase.is_terminal() {
        return Err(ActionError::TerminalState(state.phase));
    }
    match state.phase {
        Phase::SetupAllocation => {}
        Phase::Reinforcement => require_turn(state, slot)?,
        current => {
            return Err(ActionError::InvalidPhase {
                current,
                required: Phase::Reinforcement,
            })
        }
    }
    require_owned(state, slot, territory)?;
    if count == 0 || count > state.player(slot).unallocated {
        return Err(ActionError::InsufficientArmies);
    }

    state.player_mut(slot).unallocated -= count;
    state.territory_mut(territory).armies += count;

    match state.phase {
        Phase::SetupAllocation => {
            if state.players.iter().all(|p| p.unallocated == 0) {
                enter_first_turn(state);
            }
        }
        Phase::Reinforcement => {
            if state.player(slot).unallocated == 0 {
                state.phase = Phase::Attack;
            }
        }
        _ => {}
    }
    Ok(())
}

/// All starting pools are empty: the first player by turn order opens the
/// match with a freshly computed reinforcement pool.
fn enter_first_turn(state: &mut MatchState) {
    let first = (0..state.players.len())
        .map(|i| PlayerSlot(i as u8))
        .min_by_key(|s| state.player(*s).turn_order)
        .unwrap_or(PlayerSlot(0));
    state.phase = Phase::Reinforcement;
    state.turn = Some(first);
    state.player_mut(first).unallocated = turn_income(state, first);
}

// ── Attack ─────────────────────────────────────────────────────────────

/// One combat round: roll the declared attack dice against the defender's
/// automatic dice, apply losses, and resolve conquest and elimination if
/// the target empties.
pub fn attack(
    state: &mut MatchState,
    slot: PlayerSlot,
    source: TerritoryId,
    target: TerritoryId,
    dice: u8,
) -> Result<CombatReport, ActionError> {
    require_phase(state, Phase::Attack)?;
    require_turn(state, slot)?;
    require_owned(state, slot, source)?;
    require_territory(target)?;
    if source == target || state.territory(target).owner == Some(slot) {
        return Err(ActionError::SelfAttack);
    }
    if !are_adjacent(source, target) {
        return Err(ActionError::NotAdjacent);
    }
    let source_armies = state.territory(source).armies;
    if source_armies < 2 {
        return Err(ActionError::InsufficientArmies);
    }
    let max_dice = MAX_ATTACK_DICE.min((source_armies - 1).min(u8::MAX as u16) as u8);
    if dice == 0 || dice > max_dice {
        return Err(ActionError::InvalidDiceCount {
            dice,
            max: max_dice,
        });
    }

    let defender_dice = defend_dice(state.territory(target).total());
    let mut rng = state.next_rng();
    let attack_rolls = roll(&mut rng, dice);
    let defend_rolls = roll(&mut rng, defender_dice);
    let losses = battle(&attack_rolls, &defend_rolls);

    state.territory_mut(source).armies -= losses.attacker;
    {
        let t = state.territory_mut(target);
        let from_static = losses.defender.min(t.armies);
        t.armies -= from_static;
        t.moved_in -= (losses.defender - from_static).min(t.moved_in);
    }

    let mut report = CombatReport {
        attack_rolls,
        defend_rolls,
        losses,
        conquered: false,
        moved_in: 0,
    };

    if state.territory(target).total() == 0 {
        report.conquered = true;
        report.moved_in = apply_conquest(state, slot, source, target, dice, losses.attacker);
        check_win(state, slot);
    }
    Ok(report)
}

/// Transfer ownership and move the surviving attack dice into the target.
/// Dice were validated against `source_armies - 1`, so on a conquest
/// (attacker won at least one pair) the move-in can never strip the
/// source below one static army.
fn apply_conquest(
    state: &mut MatchState,
    attacker: PlayerSlot,
    source: TerritoryId,
    target: TerritoryId,
    dice: u8,
    attacker_losses: u16,
) -> u16 {
    let loser = state.territory(target).owner;

    let moved = (dice as u16 - attacker_losses).max(1);
    debug_assert!(state.territory(source).armies > moved);
    state.territory_mut(source).armies -= moved;

    let t = state.territory_mut(target);
    t.owner = Some(attacker);
    t.armies = 0;
    t.moved_in = moved;

    state.player_mut(attacker).captured_this_turn = true;

    if let Some(loser) = loser {
        if state.owned_count(loser) == 0 {
            eliminate(state, loser, attacker);
        }
    }
    moved
}

/// Mark the loser out of the match and hand their whole card hand to the
/// attacker.
fn eliminate(state: &mut MatchState, loser: PlayerSlot, attacker: PlayerSlot) {
    state.player_mut(loser).alive = false;
    state.player_mut(loser).unallocated = 0;
    for holder in state.card_holders.iter_mut() {
        if *holder == CardHolder::Player(loser) {
            *holder = CardHolder::Player(attacker);
        }
    }
}

// ── Fortify ────────────────────────────────────────────────────────────

/// Move armies between two owned adjacent territories during Movement.
/// Moved armies arrive as `moved_in` and consolidate at end of turn; the
/// source must keep at least one static army.
pub fn fortify(
    state: &mut MatchState,
    slot: PlayerSlot,
    source: TerritoryId,
    target: TerritoryId,
    count: u16,
) -> Result<(), ActionError> {
    require_phase(state, Phase::Movement)?;
    require_turn(state, slot)?;
    require_owned(state, slot, source)?;
    require_owned(state, slot, target)?;
    if source == target {
        return Err(ActionError::SameTerritory);
    }
    if !are_adjacent(source, target) {
        return Err(ActionError::NotAdjacent);
    }
    if count == 0 || state.territory(source).armies <= count {
        return Err(ActionError::InsufficientArmies);
    }

    state.territory_mut(source).armies -= count;
    state.territory_mut(target).moved_in += count;
    Ok(())
}

// ── Card trade ─────────────────────────────────────────────────────────

/// Surrender three cards for pooled reinforcements plus the per-territory
/// match bonus. Legal only in the trader's own Reinforcement phase.
pub fn trade_cards(
    state: &mut MatchState,
    slot: PlayerSlot,
    cards: [CardId; 3],
) -> Result<u16, ActionError> {
    require_phase(state, Phase::Reinforcement)?;
    require_turn(state, slot)?;
    for id in cards {
        if (id.0 as usize) >= state.card_holders.len() {
            return Err(ActionError::EntityNotFound(format!("card {}", id.0)));
        }
    }
    let held = cards
        .iter()
        .all(|id| state.card_holders[id.0 as usize] == CardHolder::Player(slot));
    if !held || !is_valid_trade_set(&cards) {
        return Err(ActionError::InvalidCardSet);
    }

    let bonus = trade_bonus(state.trades_performed);
    state.player_mut(slot).unallocated += bonus;
    state.trades_performed += 1;

    for id in cards {
        if let Some(territory) = card_territory(id) {
            if state.territory(territory).owner == Some(slot) {
                state.territory_mut(territory).armies += TERRITORY_MATCH_BONUS;
            }
        }
        state.card_holders[id.0 as usize] = CardHolder::Spent;
    }
    Ok(bonus)
}

// ── Phase / turn advancement ───────────────────────────────────────────

/// Explicit phase advance. In Reinforcement it requires an empty pool; in
/// Movement it ends the whole turn: card award, moved-in consolidation,
/// next player's pool computation.
pub fn end_phase_or_turn(state: &mut MatchState, slot: PlayerSlot) -> Result<(), ActionError> {
    if state.phase.is_terminal() {
        return Err(ActionError::TerminalState(state.phase));
    }
    match state.phase {
        Phase::Reinforcement => {
            require_turn(state, slot)?;
            let remaining = state.player(slot).unallocated;
            if remaining > 0 {
                return Err(ActionError::UnallocatedReinforcements { remaining });
            }
            state.phase = Phase::Attack;
            Ok(())
        }
        Phase::Attack => {
            require_turn(state, slot)?;
            state.phase = Phase::Movement;
            Ok(())
        }
        Phase::Movement => {
            require_turn(state, slot)?;
            end_turn(state, slot);
            Ok(())
        }
        current => Err(ActionError::InvalidPhase {
            current,
            required: Phase::Reinforcement,
        }),
    }
}

fn end_turn(state: &mut MatchState, slot: PlayerSlot) {
    // Card award for a turn with at least one conquest.
    if state.player(slot).captured_this_turn && state.hand_size(slot) < CARD_AWARD_HAND_LIMIT {
        if let Some(card) = state.deck.pop() {
            state.card_holders[card.0 as usize] = CardHolder::Player(slot);
        }
    }
    state.player_mut(slot).captured_this_turn = false;

    // Moved-in armies consolidate into static at end of turn.
    for t in state.territories.iter_mut() {
        if t.owner == Some(slot) {
            t.armies += t.moved_in;
            t.moved_in = 0;
        }
    }

    let next = state.next_alive_after(slot);
    state.turn = Some(next);
    state.phase = Phase::Reinforcement;
    state.player_mut(next).unallocated = turn_income(state, next);
}

// ── Win checks ─────────────────────────────────────────────────────────

/// Run after any ownership-changing event for the acting player: last
/// player standing, then the player's secret objective.
pub fn check_win(state: &mut MatchState, slot: PlayerSlot) {
    if state.phase.is_terminal() || state.winner.is_some() {
        return;
    }
    if state.alive_count() == 1 {
        let last = (0..state.players.len())
            .map(|i| PlayerSlot(i as u8))
            .find(|s| state.player(*s).alive);
        if let Some(last) = last {
            finish(state, last, WinCondition::EliminationComplete);
            return;
        }
    }
    let objective = state.player(slot).objective;
    if is_satisfied(state, slot, objective) {
        finish(state, slot, WinCondition::ObjectiveComplete(objective));
    }
}

fn finish(state: &mut MatchState, winner: PlayerSlot, condition: WinCondition) {
    state.winner = Some(winner);
    state.win_condition = Some(condition);
    state.phase = Phase::Finished;
}
