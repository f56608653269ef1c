// ═══════════════════════════════════════════════════════════════════════
// MatchService — the per-match serialization point.
//
// One mutex per match: every state-mutating operation locks exactly its
// own match, applies the engine op, persists the new state, and only
// then broadcasts and signals the AI worker. Actions on different
// matches never contend.
// ═══════════════════════════════════════════════════════════════════════

use std::collections::HashMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::mpsc::Sender;
use std::sync::{Arc, Mutex};
use std::time::{SystemTime, UNIX_EPOCH};

use war_engine::combat::CombatReport;
use war_engine::snapshot::{match_snapshot, player_snapshot, MatchSnapshot, PlayerSnapshot};
use war_engine::{engine, setup, CardId, MatchId, MatchState, PlayerSlot, TerritoryId};

use crate::broadcast::{Broadcaster, PushEvent};
use crate::movements::{MovementId, MovementLedger, MovementOutcome};
use crate::orchestrator::{AiEvent, CompletedAction};
use crate::repository::Repository;
use crate::ServiceError;

pub struct MatchEntry {
    pub state: MatchState,
    pub movements: MovementLedger,
}

pub struct MatchService {
    matches: Mutex<HashMap<u64, Arc<Mutex<MatchEntry>>>>,
    repo: Arc<dyn Repository>,
    broadcaster: Arc<dyn Broadcaster>,
    ai_signals: Mutex<HashMap<u64, Sender<AiEvent>>>,
    next_id: AtomicU64,
}

impl MatchService {
    pub fn new(repo: Arc<dyn Repository>, broadcaster: Arc<dyn Broadcaster>) -> Self {
        MatchService {
            matches: Mutex::new(HashMap::new()),
            repo,
            broadcaster,
            ai_signals: Mutex::new(HashMap::new()),
            next_id: AtomicU64::new(1),
        }
    }

    // ── Lifecycle ──────────────────────────────────────────────────────

    pub fn create_match(
        &self,
        host_username: &str,
        host_is_ai: bool,
        seed: u64,
    ) -> Result<MatchId, ServiceError> {
        let id = MatchId(self.next_id.fetch_add(1, Ordering::Relaxed));
        let created_at_ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        let state = setup::new_lobby(id, created_at_ms, seed, host_username, host_is_ai);
        self.repo.save_state(&state)?;
        let snapshot = match_snapshot(&state);
        self.matches
            .lock()
            .map_err(|_| ServiceError::LockPoisoned)?
            .insert(
                id.0,
                Arc::new(Mutex::new(MatchEntry {
                    state,
                    movements: MovementLedger::new(),
                })),
            );
        self.broadcaster
            .publish(PushEvent::LobbyUpdated(id, snapshot));
        Ok(id)
    }

    pub fn join_lobby(
        &self,
        id: MatchId,
        username: &str,
        is_ai: bool,
    ) -> Result<MatchSnapshot, ServiceError> {
        self.mutate(id, true, None, |entry| {
            setup::join_lobby(&mut entry.state, username, is_ai)?;
            Ok(())
        })
        .map(|(_, snapshot)| snapshot)
    }

    pub fn leave_lobby(&self, id: MatchId, username: &str) -> Result<MatchSnapshot, ServiceError> {
        self.mutate(id, true, None, |entry| {
            setup::leave_lobby(&mut entry.state, username)?;
            Ok(())
        })
        .map(|(_, snapshot)| snapshot)
    }

    pub fn cancel_match(&self, id: MatchId) -> Result<MatchSnapshot, ServiceError> {
        self.mutate(id, true, None, |entry| {
            setup::cancel_match(&mut entry.state)?;
            Ok(())
        })
        .map(|(_, snapshot)| snapshot)
    }

    pub fn start_match(&self, id: MatchId) -> Result<MatchSnapshot, ServiceError> {
        self.mutate(id, false, None, |entry| {
            setup::start_match(&mut entry.state)?;
            Ok(())
        })
        .map(|(_, snapshot)| snapshot)
    }

    // ── Turn actions ───────────────────────────────────────────────────

    pub fn allocate_reinforcements(
        &self,
        id: MatchId,
        username: &str,
        territory: TerritoryId,
        count: u16,
    ) -> Result<MatchSnapshot, ServiceError> {
        self.mutate(id, false, Some(CompletedAction::Allocate), |entry| {
            let slot = slot_of(&entry.state, username)?;
            engine::allocate_reinforcements(&mut entry.state, slot, territory, count)?;
            Ok(())
        })
        .map(|(_, snapshot)| snapshot)
    }

    pub fn attack(
        &self,
        id: MatchId,
        username: &str,
        source: TerritoryId,
        target: TerritoryId,
        dice: u8,
    ) -> Result<(CombatReport, MatchSnapshot), ServiceError> {
        self.mutate(id, false, Some(CompletedAction::Attack), |entry| {
            let slot = slot_of(&entry.state, username)?;
            Ok(engine::attack(&mut entry.state, slot, source, target, dice)?)
        })
    }

    pub fn fortify(
        &self,
        id: MatchId,
        username: &str,
        source: TerritoryId,
        target: TerritoryId,
        count: u16,
    ) -> Result<MatchSnapshot, ServiceError> {
        self.mutate(id, false, Some(CompletedAction::Fortify), |entry| {
            let slot = slot_of(&entry.state, username)?;
            engine::fortify(&mut entry.state, slot, source, target, count)?;
            Ok(())
        })
        .map(|(_, snapshot)| snapshot)
    }

    pub fn trade_cards(
        &self,
        id: MatchId,
        username: &str,
        cards: [CardId; 3],
    ) -> Result<(u16, MatchSnapshot), ServiceError> {
        self.mutate(id, false, Some(CompletedAction::Trade), |entry| {
            let slot = slot_of(&entry.state, username)?;
            Ok(engine::trade_cards(&mut entry.state, slot, cards)?)
        })
    }

    pub fn end_phase_or_turn(
        &self,
        id: MatchId,
        username: &str,
    ) -> Result<MatchSnapshot, ServiceError> {
        self.mutate(id, false, Some(CompletedAction::EndPhase), |entry| {
            let slot = slot_of(&entry.state, username)?;
            engine::end_phase_or_turn(&mut entry.state, slot)?;
            Ok(())
        })
        .map(|(_, snapshot)| snapshot)
    }

    // ── Timed movements ────────────────────────────────────────────────

    pub fn schedule_movement(
        &self,
        id: MatchId,
        username: &str,
        source: TerritoryId,
        target: TerritoryId,
        count: u16,
    ) -> Result<(MovementId, MatchSnapshot), ServiceError> {
        self.mutate(id, false, Some(CompletedAction::Movement), |entry| {
            let slot = slot_of(&entry.state, username)?;
            let MatchEntry { state, movements } = entry;
            Ok(movements.schedule(state, slot, source, target, count)?)
        })
    }

    /// Expiry signal for an in-flight movement. Safe against duplicate
    /// and late delivery.
    pub fn complete_movement(
        &self,
        id: MatchId,
        movement: MovementId,
    ) -> Result<(MovementOutcome, MatchSnapshot), ServiceError> {
        self.mutate(id, false, Some(CompletedAction::Movement), |entry| {
            let MatchEntry { state, movements } = entry;
            Ok(movements.complete(state, movement))
        })
    }

    pub fn cancel_movement(
        &self,
        id: MatchId,
        movement: MovementId,
    ) -> Result<(MovementOutcome, MatchSnapshot), ServiceError> {
        self.mutate(id, false, Some(CompletedAction::Movement), |entry| {
            let MatchEntry { state, movements } = entry;
            Ok(movements.cancel(state, movement))
        })
    }

    // ── Read side ──────────────────────────────────────────────────────

    pub fn snapshot(&self, id: MatchId) -> Result<MatchSnapshot, ServiceError> {
        let entry = self.entry(id)?;
        let guard = entry.lock().map_err(|_| ServiceError::LockPoisoned)?;
        Ok(match_snapshot(&guard.state))
    }

    pub fn player_view(&self, id: MatchId, username: &str) -> Result<PlayerSnapshot, ServiceError> {
        let entry = self.entry(id)?;
        let guard = entry.lock().map_err(|_| ServiceError::LockPoisoned)?;
        let slot = slot_of(&guard.state, username)?;
        Ok(player_snapshot(&guard.state, slot))
    }

    pub fn player_view_by_slot(
        &self,
        id: MatchId,
        slot: PlayerSlot,
    ) -> Result<PlayerSnapshot, ServiceError> {
        let entry = self.entry(id)?;
        let guard = entry.lock().map_err(|_| ServiceError::LockPoisoned)?;
        Ok(player_snapshot(&guard.state, slot))
    }

    // ── AI signal channel ──────────────────────────────────────────────

    /// Register the AI worker's mailbox for a match. One worker per match.
    pub fn attach_ai(&self, id: MatchId, tx: Sender<AiEvent>) -> Result<(), ServiceError> {
        self.ai_signals
            .lock()
            .map_err(|_| ServiceError::LockPoisoned)?
            .insert(id.0, tx);
        Ok(())
    }

    pub fn detach_ai(&self, id: MatchId) {
        if let Ok(mut signals) = self.ai_signals.lock() {
            signals.remove(&id.0);
        }
    }

    // ── Plumbing ───────────────────────────────────────────────────────

    fn entry(&self, id: MatchId) -> Result<Arc<Mutex<MatchEntry>>, ServiceError> {
        self.matches
            .lock()
            .map_err(|_| ServiceError::LockPoisoned)?
            .get(&id.0)
            .cloned()
            .ok_or(ServiceError::MatchNotFound(id))
    }

    /// The one mutation path: lock the match, apply, persist, broadcast,
    /// signal the AI worker. Persisting happens strictly before any
    /// broadcast or AI signal, so nobody ever reacts to uncommitted state.
    fn mutate<T>(
        &self,
        id: MatchId,
        lobby_event: bool,
        action: Option<CompletedAction>,
        f: impl FnOnce(&mut MatchEntry) -> Result<T, ServiceError>,
    ) -> Result<(T, MatchSnapshot), ServiceError> {
        let entry = self.entry(id)?;
        let mut guard = entry.lock().map_err(|_| ServiceError::LockPoisoned)?;

        let turn_before = guard.state.turn;
        let out = f(&mut guard)?;
        self.repo.save_state(&guard.state)?;
        let snapshot = match_snapshot(&guard.state);
        let event = ai_event_for(&guard.state, turn_before, action);
        drop(guard);

        let push = if lobby_event {
            PushEvent::LobbyUpdated(id, snapshot.clone())
        } else {
            PushEvent::MatchUpdated(id, snapshot.clone())
        };
        self.broadcaster.publish(push);

        if let Some(event) = event {
            self.signal_ai(id, event);
        }
        Ok((out, snapshot))
    }

    fn signal_ai(&self, id: MatchId, event: AiEvent) {
        let shutdown = matches!(event, AiEvent::Shutdown);
        if let Ok(signals) = self.ai_signals.lock() {
            if let Some(tx) = signals.get(&id.0) {
                // A gone worker is fine; the mailbox is detached lazily.
                let _ = tx.send(event);
            }
        }
        if shutdown {
            self.detach_ai(id);
        }
    }
}

fn slot_of(state: &MatchState, username: &str) -> Result<PlayerSlot, ServiceError> {
    state
        .slot_of(username)
        .ok_or_else(|| ServiceError::PlayerNotFound(username.to_string()))
}

/// What, if anything, the AI worker should be told after a committed
/// mutation: a shutdown once the match reaches a terminal state, the
/// completed action keyed by the AI whose move it now is and whether the
/// turn just ended, or a plain wake-up when no action ran (match start).
fn ai_event_for(
    state: &MatchState,
    turn_before: Option<PlayerSlot>,
    action: Option<CompletedAction>,
) -> Option<AiEvent> {
    use war_engine::Phase;

    if state.phase.is_terminal() {
        return Some(AiEvent::Shutdown);
    }
    let actor = match state.phase {
        // Setup placement is not turn-gated: wake any AI with troops left.
        Phase::SetupAllocation => (0..state.players.len())
            .map(|i| PlayerSlot(i as u8))
            .find(|s| state.player(*s).is_ai && state.player(*s).unallocated > 0),
        Phase::Reinforcement | Phase::Attack | Phase::Movement => {
            state.turn.filter(|s| state.player(*s).is_ai)
        }
        _ => None,
    }?;
    match action {
        Some(kind) => Some(AiEvent::ActionCompleted {
            slot: actor,
            kind,
            turn_finished: state.turn != turn_before,
        }),
        None => Some(AiEvent::TurnStarted { slot: actor }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcast::{ChannelBroadcaster, NullBroadcaster};
    use crate::repository::MemoryRepository;
    use war_engine::ActionError;

    fn service() -> MatchService {
        MatchService::new(
            Arc::new(MemoryRepository::new()),
            Arc::new(NullBroadcaster),
        )
    }

    #[test]
    fn lifecycle_happy_path() {
        let svc = service();
        let id = svc.create_match("alice", false, 5).unwrap();
        svc.join_lobby(id, "bob", false).unwrap();
        let snapshot = svc.start_match(id).unwrap();
        assert_eq!(snapshot.players.len(), 2);
        assert_eq!(snapshot.phase, war_engine::Phase::SetupAllocation);
    }

    #[test]
    fn unknown_match_is_not_found() {
        let svc = service();
        assert!(matches!(
            svc.snapshot(MatchId(99)),
            Err(ServiceError::MatchNotFound(MatchId(99)))
        ));
    }

    #[test]
    fn engine_rejections_pass_through_typed() {
        let svc = service();
        let id = svc.create_match("alice", false, 5).unwrap();
        let err = svc.start_match(id).unwrap_err();
        assert!(matches!(
            err,
            ServiceError::Rejected(ActionError::NotEnoughPlayers { have: 1, min: 2 })
        ));
    }

    #[test]
    fn rejected_actions_are_not_persisted_or_broadcast() {
        let repo = Arc::new(MemoryRepository::new());
        let (broadcaster, rx) = ChannelBroadcaster::new();
        let svc = MatchService::new(repo.clone(), Arc::new(broadcaster));

        let id = svc.create_match("alice", false, 5).unwrap();
        while rx.try_recv().is_ok() {}

        assert!(svc.start_match(id).is_err());
        assert!(rx.try_recv().is_err());

        let stored = repo.load_state(id).unwrap().unwrap();
        assert_eq!(stored.phase, war_engine::Phase::Lobby);
    }

    #[test]
    fn commit_precedes_broadcast() {
        let repo = Arc::new(MemoryRepository::new());
        let (broadcaster, rx) = ChannelBroadcaster::new();
        let svc = MatchService::new(repo.clone(), Arc::new(broadcaster));

        let id = svc.create_match("alice", false, 5).unwrap();
        svc.join_lobby(id, "bob", false).unwrap();
        while rx.try_recv().is_ok() {}

        svc.start_match(id).unwrap();
        // By the time the push is observable the store already holds the
        // started match.
        let event = rx.try_recv().unwrap();
        let PushEvent::MatchUpdated(_, pushed) = event else {
            panic!("expected a match update");
        };
        let stored = repo.load_state(id).unwrap().unwrap();
        assert_eq!(stored.phase, pushed.phase);
    }

    #[test]
    fn matches_are_independent() {
        let svc = service();
        let a = svc.create_match("alice", false, 1).unwrap();
        let b = svc.create_match("carol", false, 2).unwrap();
        svc.join_lobby(a, "bob", false).unwrap();
        svc.join_lobby(b, "dave", false).unwrap();
        svc.start_match(a).unwrap();

        // Match b is untouched by everything done to a.
        assert_eq!(
            svc.snapshot(b).unwrap().phase,
            war_engine::Phase::Lobby
        );
    }

    #[test]
    fn completion_events_carry_kind_and_turn_handoff() {
        let svc = service();
        let id = svc.create_match("bot-a", true, 9).unwrap();
        svc.join_lobby(id, "bot-b", true).unwrap();
        let (tx, rx) = std::sync::mpsc::channel();
        svc.attach_ai(id, tx).unwrap();

        // Match start is a plain wake-up, no completed action.
        svc.start_match(id).unwrap();
        assert!(matches!(rx.try_recv(), Ok(AiEvent::TurnStarted { .. })));

        // A setup placement names the action; nobody's turn ended.
        let territory = svc
            .snapshot(id)
            .unwrap()
            .territories
            .iter()
            .find(|t| t.owner == Some(PlayerSlot(0)))
            .unwrap()
            .id;
        svc.allocate_reinforcements(id, "bot-a", territory, 1).unwrap();
        assert!(matches!(
            rx.try_recv(),
            Ok(AiEvent::ActionCompleted {
                kind: CompletedAction::Allocate,
                turn_finished: false,
                ..
            })
        ));

        // Ending the movement phase ends the turn; the signal says so
        // and addresses the player whose move it now is.
        {
            let entry = svc.entry(id).unwrap();
            let mut guard = entry.lock().unwrap();
            guard.state.phase = war_engine::Phase::Movement;
            guard.state.turn = Some(PlayerSlot(0));
        }
        svc.end_phase_or_turn(id, "bot-a").unwrap();
        match rx.try_recv() {
            Ok(AiEvent::ActionCompleted {
                slot,
                kind: CompletedAction::EndPhase,
                turn_finished: true,
            }) => assert_eq!(slot, PlayerSlot(1)),
            other => panic!("unexpected signal: {other:?}"),
        }
    }

    #[test]
    fn movement_signal_roundtrip_through_service() {
        let svc = service();
        let id = svc.create_match("alice", false, 7).unwrap();
        svc.join_lobby(id, "bob", false).unwrap();
        svc.start_match(id).unwrap();

        // Hand-build a board position for the movement.
        {
            let entry = svc.entry(id).unwrap();
            let mut guard = entry.lock().unwrap();
            let t = guard.state.territory_mut(TerritoryId(0));
            t.owner = Some(PlayerSlot(0));
            t.armies = 6;
            let t = guard.state.territory_mut(TerritoryId(1));
            t.owner = Some(PlayerSlot(0));
            t.armies = 1;
        }
        let username = svc.snapshot(id).unwrap().players[0].username.clone();
        let (movement, _) = svc
            .schedule_movement(id, &username, TerritoryId(0), TerritoryId(1), 4)
            .unwrap();

        let (outcome, snapshot) = svc.complete_movement(id, movement).unwrap();
        assert_eq!(outcome, MovementOutcome::Delivered);
        assert_eq!(snapshot.territories[1].armies, 5);

        let (outcome, _) = svc.complete_movement(id, movement).unwrap();
        assert_eq!(outcome, MovementOutcome::AlreadySettled);
    }
}
