// ═══════════════════════════════════════════════════════════════════════
// Headless simulation — synchronous bot-vs-bot matches, optionally in
// parallel across seeds, with results recorded for the leaderboard.
// ═══════════════════════════════════════════════════════════════════════

use rayon::prelude::*;

use war_agents::{Agent, BotAction};
use war_engine::snapshot::player_snapshot;
use war_engine::{engine, setup, ActionError, MatchId, MatchState, Phase, PlayerSlot, WinCondition};

use crate::repository::{MatchResult, PlayerResult, Repository};
use crate::ServiceError;

pub const DEFAULT_MAX_DECISIONS: u32 = 20_000;

#[derive(Debug, Clone)]
pub struct SimOutcome {
    pub seed: u64,
    pub winner: Option<String>,
    pub condition: Option<WinCondition>,
    pub turns: u32,
    pub decisions: u32,
    pub players: Vec<PlayerResult>,
}

impl SimOutcome {
    pub fn finished(&self) -> bool {
        self.winner.is_some()
    }
}

/// Play one full match between the given bots. Seat order follows the
/// roster; the decision cap bounds runaway stalemates.
pub fn run_match(
    seed: u64,
    roster: Vec<(String, Box<dyn Agent>)>,
    max_decisions: u32,
) -> SimOutcome {
    let mut agents: Vec<Box<dyn Agent>> = Vec::with_capacity(roster.len());
    let mut state = {
        let mut names = roster.iter().map(|(name, _)| name.clone());
        let host = names.next().unwrap_or_else(|| "bot-0".to_string());
        let mut state = setup::new_lobby(MatchId(seed), 0, seed, &host, true);
        for name in names {
            // Roster names are distinct by construction.
            let _ = setup::join_lobby(&mut state, &name, true);
        }
        state
    };
    for (_, agent) in roster {
        agents.push(agent);
    }
    if setup::start_match(&mut state).is_err() {
        return outcome_of(&state, &agents, seed, 0, 0);
    }

    let mut decisions = 0;
    let mut turns = 0;
    while decisions < max_decisions && !state.phase.is_terminal() {
        let Some(actor) = current_actor(&state) else {
            break;
        };
        let view = player_snapshot(&state, actor);
        let action = agents[actor.0 as usize].decide(&view);
        decisions += 1;

        let turn_before = state.turn;
        if apply(&mut state, actor, action).is_err() {
            // A bad bot decision becomes a pass; a failing pass means
            // the bot is genuinely stuck and the match is abandoned.
            if engine::end_phase_or_turn(&mut state, actor).is_err() {
                break;
            }
        }
        if state.turn != turn_before {
            turns += 1;
        }
    }
    outcome_of(&state, &agents, seed, turns, decisions)
}

/// Run `count` seeded matches in parallel and record the finished ones.
pub fn run_batch<F>(
    count: u32,
    base_seed: u64,
    max_decisions: u32,
    repo: &dyn Repository,
    factory: F,
) -> Result<Vec<SimOutcome>, ServiceError>
where
    F: Fn(u64) -> Vec<(String, Box<dyn Agent>)> + Sync,
{
    let outcomes: Vec<SimOutcome> = (0..count)
        .into_par_iter()
        .map(|i| {
            let seed = base_seed + u64::from(i);
            run_match(seed, factory(seed), max_decisions)
        })
        .collect();

    for outcome in outcomes.iter().filter(|o| o.finished()) {
        let winner = outcome.winner.clone().unwrap_or_default();
        repo.record_result(&MatchResult {
            match_id: MatchId(outcome.seed),
            seed: outcome.seed,
            turns: outcome.turns,
            winner,
            condition: outcome
                .condition
                .map(|c| format!("{c:?}"))
                .unwrap_or_default(),
            players: outcome.players.clone(),
        })?;
    }
    Ok(outcomes)
}

/// Who decides next: any player with starting troops left during setup,
/// the turn actor otherwise.
fn current_actor(state: &MatchState) -> Option<PlayerSlot> {
    match state.phase {
        Phase::SetupAllocation => (0..state.players.len())
            .map(|i| PlayerSlot(i as u8))
            .find(|s| state.player(*s).unallocated > 0),
        Phase::Reinforcement | Phase::Attack | Phase::Movement => state.turn,
        _ => None,
    }
}

fn apply(state: &mut MatchState, slot: PlayerSlot, action: BotAction) -> Result<(), ActionError> {
    match action {
        BotAction::Pass => {
            if state.phase == Phase::SetupAllocation {
                Ok(())
            } else {
                engine::end_phase_or_turn(state, slot)
            }
        }
        BotAction::Trade(set) => engine::trade_cards(state, slot, set).map(|_| ()),
        BotAction::Reinforce { territory, count } => {
            engine::allocate_reinforcements(state, slot, territory, count)
        }
        BotAction::Attack {
            source,
            target,
            dice,
        } => engine::attack(state, slot, source, target, dice).map(|_| ()),
        BotAction::Fortify {
            source,
            target,
            count,
        } => engine::fortify(state, slot, source, target, count),
    }
}

fn outcome_of(
    state: &MatchState,
    agents: &[Box<dyn Agent>],
    seed: u64,
    turns: u32,
    decisions: u32,
) -> SimOutcome {
    let winner = state
        .winner
        .map(|slot| state.player(slot).username.clone());
    let players = state
        .players
        .iter()
        .enumerate()
        .map(|(i, p)| PlayerResult {
            username: p.username.clone(),
            agent: agents
                .get(i)
                .map(|a| a.name().to_string())
                .unwrap_or_default(),
            won: state.winner == Some(PlayerSlot(i as u8)),
        })
        .collect();
    SimOutcome {
        seed,
        winner,
        condition: state.win_condition,
        turns,
        decisions,
        players,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::repository::MemoryRepository;
    use war_agents::{HeuristicAgent, RandomAgent};

    fn duel(seed: u64) -> Vec<(String, Box<dyn Agent>)> {
        vec![
            ("hex".to_string(), Box::new(HeuristicAgent) as Box<dyn Agent>),
            ("dice".to_string(), Box::new(RandomAgent::new(seed)) as Box<dyn Agent>),
        ]
    }

    #[test]
    fn a_match_runs_to_a_verdict_or_the_cap() {
        let outcome = run_match(7, duel(7), DEFAULT_MAX_DECISIONS);
        assert!(outcome.decisions > 0);
        assert!(outcome.decisions <= DEFAULT_MAX_DECISIONS);
        if outcome.finished() {
            assert!(outcome.condition.is_some());
            assert_eq!(outcome.players.iter().filter(|p| p.won).count(), 1);
        }
    }

    #[test]
    fn same_seed_reproduces_the_match() {
        let a = run_match(11, duel(11), DEFAULT_MAX_DECISIONS);
        let b = run_match(11, duel(11), DEFAULT_MAX_DECISIONS);
        assert_eq!(a.winner, b.winner);
        assert_eq!(a.turns, b.turns);
        assert_eq!(a.decisions, b.decisions);
    }

    #[test]
    fn batch_runs_and_records_finished_matches() {
        let repo = MemoryRepository::new();
        let outcomes = run_batch(4, 100, DEFAULT_MAX_DECISIONS, &repo, duel).unwrap();
        assert_eq!(outcomes.len(), 4);

        let finished = outcomes.iter().filter(|o| o.finished()).count();
        let board = repo.leaderboard().unwrap();
        if finished > 0 {
            assert!(!board.is_empty());
            let played: u32 = board.iter().map(|r| r.played).sum();
            assert_eq!(played as usize, finished * 2);
        }
    }
}
