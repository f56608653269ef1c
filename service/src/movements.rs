// ═══════════════════════════════════════════════════════════════════════
// Timed troop movements.
//
// A scheduled movement deducts from the source immediately and records a
// pending entry; the expiry signal delivers the troops. The ledger is
// the source of truth for idempotence: a signal whose record no longer
// exists is a no-op.
// ═══════════════════════════════════════════════════════════════════════

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use war_engine::{ActionError, MatchState, PlayerSlot, TerritoryId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MovementId(pub u64);

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PendingMovement {
    pub id: MovementId,
    pub owner: PlayerSlot,
    pub source: TerritoryId,
    pub target: TerritoryId,
    pub count: u16,
}

/// What happened when a movement signal was applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MovementOutcome {
    /// Troops arrived at the target.
    Delivered,
    /// Target lost in the meantime; troops returned to the source.
    Returned,
    /// Both ends lost; the troops are gone.
    Lost,
    /// No such pending movement (duplicate or late signal).
    AlreadySettled,
}

#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct MovementLedger {
    next_id: u64,
    pending: HashMap<u64, PendingMovement>,
}

impl MovementLedger {
    pub fn new() -> Self {
        MovementLedger::default()
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    /// Deduct the troops from the source and record the in-flight
    /// movement. The source keeps at least one static army.
    pub fn schedule(
        &mut self,
        state: &mut MatchState,
        owner: PlayerSlot,
        source: TerritoryId,
        target: TerritoryId,
        count: u16,
    ) -> Result<MovementId, ActionError> {
        if state.phase.is_terminal() {
            return Err(ActionError::TerminalState(state.phase));
        }
        if state.territory(source).owner != Some(owner)
            || state.territory(target).owner != Some(owner)
        {
            return Err(ActionError::NotOwned);
        }
        if count == 0 || state.territory(source).armies <= count {
            return Err(ActionError::InsufficientArmies);
        }

        state.territory_mut(source).armies -= count;
        self.next_id += 1;
        let id = MovementId(self.next_id);
        self.pending.insert(
            self.next_id,
            PendingMovement {
                id,
                owner,
                source,
                target,
                count,
            },
        );
        Ok(id)
    }

    /// Apply an expiry signal. Duplicate and late signals find no record
    /// and settle as a no-op.
    pub fn complete(&mut self, state: &mut MatchState, id: MovementId) -> MovementOutcome {
        let Some(movement) = self.pending.remove(&id.0) else {
            return MovementOutcome::AlreadySettled;
        };
        if state.territory(movement.target).owner == Some(movement.owner) {
            state.territory_mut(movement.target).armies += movement.count;
            MovementOutcome::Delivered
        } else if state.territory(movement.source).owner == Some(movement.owner) {
            state.territory_mut(movement.source).armies += movement.count;
            MovementOutcome::Returned
        } else {
            MovementOutcome::Lost
        }
    }

    /// Cancel an in-flight movement, returning the troops to the source
    /// if it is still held.
    pub fn cancel(&mut self, state: &mut MatchState, id: MovementId) -> MovementOutcome {
        let Some(movement) = self.pending.remove(&id.0) else {
            return MovementOutcome::AlreadySettled;
        };
        if state.territory(movement.source).owner == Some(movement.owner) {
            state.territory_mut(movement.source).armies += movement.count;
            MovementOutcome::Returned
        } else {
            MovementOutcome::Lost
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use war_engine::setup::{join_lobby, new_lobby, start_match};
    use war_engine::{MatchId, TerritoryHolding};

    fn playing_state() -> MatchState {
        let mut state = new_lobby(MatchId(1), 0, 3, "a", false);
        join_lobby(&mut state, "b", false).unwrap();
        start_match(&mut state).unwrap();
        for t in state.territories.iter_mut() {
            *t = TerritoryHolding {
                owner: Some(PlayerSlot(0)),
                armies: 5,
                moved_in: 0,
            };
        }
        state
    }

    #[test]
    fn schedule_then_deliver() {
        let mut state = playing_state();
        let mut ledger = MovementLedger::new();
        let id = ledger
            .schedule(&mut state, PlayerSlot(0), TerritoryId(0), TerritoryId(1), 3)
            .unwrap();
        assert_eq!(state.territory(TerritoryId(0)).armies, 2);

        assert_eq!(ledger.complete(&mut state, id), MovementOutcome::Delivered);
        assert_eq!(state.territory(TerritoryId(1)).armies, 8);
    }

    #[test]
    fn duplicate_signal_is_a_no_op() {
        let mut state = playing_state();
        let mut ledger = MovementLedger::new();
        let id = ledger
            .schedule(&mut state, PlayerSlot(0), TerritoryId(0), TerritoryId(1), 3)
            .unwrap();
        ledger.complete(&mut state, id);
        let before = state.clone();

        assert_eq!(
            ledger.complete(&mut state, id),
            MovementOutcome::AlreadySettled
        );
        assert_eq!(
            serde_json::to_string(&state).ok(),
            serde_json::to_string(&before).ok()
        );
    }

    #[test]
    fn lost_target_returns_troops_to_source() {
        let mut state = playing_state();
        let mut ledger = MovementLedger::new();
        let id = ledger
            .schedule(&mut state, PlayerSlot(0), TerritoryId(0), TerritoryId(1), 3)
            .unwrap();
        state.territory_mut(TerritoryId(1)).owner = Some(PlayerSlot(1));

        assert_eq!(ledger.complete(&mut state, id), MovementOutcome::Returned);
        assert_eq!(state.territory(TerritoryId(0)).armies, 5);
    }

    #[test]
    fn losing_both_ends_loses_the_troops() {
        let mut state = playing_state();
        let mut ledger = MovementLedger::new();
        let id = ledger
            .schedule(&mut state, PlayerSlot(0), TerritoryId(0), TerritoryId(1), 3)
            .unwrap();
        state.territory_mut(TerritoryId(0)).owner = Some(PlayerSlot(1));
        state.territory_mut(TerritoryId(1)).owner = Some(PlayerSlot(1));

        assert_eq!(ledger.complete(&mut state, id), MovementOutcome::Lost);
    }

    #[test]
    fn whole_stack_cannot_fly() {
        let mut state = playing_state();
        let mut ledger = MovementLedger::new();
        assert_eq!(
            ledger.schedule(&mut state, PlayerSlot(0), TerritoryId(0), TerritoryId(1), 5),
            Err(ActionError::InsufficientArmies)
        );
    }
}
