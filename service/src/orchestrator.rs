// ═══════════════════════════════════════════════════════════════════════
// AI turn orchestrator.
//
// One worker thread per match, fed by an mpsc mailbox of turn events.
// Each event triggers at most one atomic action through the normal
// service pipeline; the pipeline's own completion signal drives the
// next decision. No recursion, strict per-match ordering.
// ═══════════════════════════════════════════════════════════════════════

use std::collections::HashMap;
use std::sync::mpsc::{channel, Receiver, Sender};
use std::sync::Arc;
use std::thread::{self, JoinHandle};

use war_agents::{Agent, BotAction};
use war_engine::snapshot::PlayerSnapshot;
use war_engine::{MatchId, Phase, PlayerSlot};

use crate::registry::MatchService;
use crate::ServiceError;

/// Hard ceiling on decisions per worker; breaks pathological loops
/// between two overly cautious bots.
const DECISION_BUDGET: u32 = 100_000;

/// Decisions allowed within a single turn; a turn hand-off resets the
/// allowance. Catches an agent spinning inside one turn long before the
/// match-level ceiling would.
const TURN_DECISION_BUDGET: u32 = 5_000;

/// Which service operation just committed. Carried on every completion
/// signal so consumers can tell a combat round from a phase change
/// without re-deriving it from snapshots.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompletedAction {
    Allocate,
    Attack,
    Fortify,
    Trade,
    EndPhase,
    Movement,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AiEvent {
    /// Initial wake-up: the match just started and this AI player has
    /// troops to place.
    TurnStarted { slot: PlayerSlot },
    /// An action committed; `slot` is the AI player whose move it now
    /// is, `turn_finished` is true when the action ended a turn.
    ActionCompleted {
        slot: PlayerSlot,
        kind: CompletedAction,
        turn_finished: bool,
    },
    Shutdown,
}

pub struct AiWorker {
    match_id: MatchId,
    tx: Sender<AiEvent>,
    handle: Option<JoinHandle<()>>,
}

impl AiWorker {
    pub fn match_id(&self) -> MatchId {
        self.match_id
    }

    pub fn sender(&self) -> Sender<AiEvent> {
        self.tx.clone()
    }

    /// Stop the worker and wait for it to drain.
    pub fn shutdown(mut self) {
        let _ = self.tx.send(AiEvent::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for AiWorker {
    fn drop(&mut self) {
        let _ = self.tx.send(AiEvent::Shutdown);
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

/// Spawn the per-match AI worker and register its mailbox with the
/// service. `agents` maps the AI-controlled slots to their brains.
pub fn spawn_ai_worker(
    service: Arc<MatchService>,
    match_id: MatchId,
    agents: HashMap<PlayerSlot, Box<dyn Agent>>,
) -> Result<AiWorker, ServiceError> {
    let (tx, rx) = channel();
    service.attach_ai(match_id, tx.clone())?;
    let handle = thread::spawn(move || worker_loop(service, match_id, agents, rx));
    Ok(AiWorker {
        match_id,
        tx,
        handle: Some(handle),
    })
}

fn worker_loop(
    service: Arc<MatchService>,
    match_id: MatchId,
    mut agents: HashMap<PlayerSlot, Box<dyn Agent>>,
    rx: Receiver<AiEvent>,
) {
    let mut budget = DECISION_BUDGET;
    let mut turn_budget = TURN_DECISION_BUDGET;
    while let Ok(event) = rx.recv() {
        let slot = match event {
            AiEvent::Shutdown => break,
            AiEvent::TurnStarted { slot } => {
                turn_budget = TURN_DECISION_BUDGET;
                slot
            }
            AiEvent::ActionCompleted {
                slot,
                turn_finished,
                ..
            } => {
                if turn_finished {
                    turn_budget = TURN_DECISION_BUDGET;
                }
                slot
            }
        };
        if budget == 0 || turn_budget == 0 {
            break;
        }
        budget -= 1;
        turn_budget -= 1;

        let Some(agent) = agents.get_mut(&slot) else {
            continue;
        };
        let Ok(view) = service.player_view_by_slot(match_id, slot) else {
            break;
        };
        if view.shared.phase.is_terminal() {
            break;
        }
        let action = agent.decide(&view);
        step(&service, match_id, &view, action);
    }
    service.detach_ai(match_id);
}

/// Apply one bot action through the service. A rejected action is
/// demoted to a phase pass so the match can never stall on an AI
/// decision; a failing pass is simply dropped.
fn step(service: &MatchService, match_id: MatchId, view: &PlayerSnapshot, action: BotAction) {
    let username = &view.shared.players[view.viewer.0 as usize].username;
    let result = match action {
        BotAction::Pass => {
            // Nothing to pass during setup: placement is not turn-gated
            // and the phase ends on its own when the pools empty.
            if view.shared.phase == Phase::SetupAllocation {
                return;
            }
            service.end_phase_or_turn(match_id, username).map(|_| ())
        }
        BotAction::Trade(set) => service.trade_cards(match_id, username, set).map(|_| ()),
        BotAction::Reinforce { territory, count } => service
            .allocate_reinforcements(match_id, username, territory, count)
            .map(|_| ()),
        BotAction::Attack {
            source,
            target,
            dice,
        } => service
            .attack(match_id, username, source, target, dice)
            .map(|_| ()),
        BotAction::Fortify {
            source,
            target,
            count,
        } => service
            .fortify(match_id, username, source, target, count)
            .map(|_| ()),
    };
    if let Err(ServiceError::Rejected(_)) = result {
        let _ = service.end_phase_or_turn(match_id, username);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::broadcast::NullBroadcaster;
    use crate::repository::MemoryRepository;
    use std::time::{Duration, Instant};
    use war_agents::HeuristicAgent;

    #[test]
    fn two_bots_play_through_setup() {
        let service = Arc::new(MatchService::new(
            Arc::new(MemoryRepository::new()),
            Arc::new(NullBroadcaster),
        ));
        let id = service.create_match("bot-a", true, 41).unwrap();
        service.join_lobby(id, "bot-b", true).unwrap();

        let mut agents: HashMap<PlayerSlot, Box<dyn Agent>> = HashMap::new();
        agents.insert(PlayerSlot(0), Box::new(HeuristicAgent));
        agents.insert(PlayerSlot(1), Box::new(HeuristicAgent));
        let worker = spawn_ai_worker(service.clone(), id, agents).unwrap();

        // Starting the match signals the worker; the bots must place all
        // starting troops without any human involvement.
        service.start_match(id).unwrap();
        let deadline = Instant::now() + Duration::from_secs(10);
        loop {
            let snapshot = service.snapshot(id).unwrap();
            if snapshot.phase != Phase::SetupAllocation && snapshot.phase != Phase::Lobby {
                assert!(snapshot.players.iter().all(|p| p.unallocated == 0
                    || snapshot.turn == Some(p.slot)));
                break;
            }
            assert!(Instant::now() < deadline, "bots stuck in setup");
            thread::sleep(Duration::from_millis(10));
        }
        worker.shutdown();
    }
}
