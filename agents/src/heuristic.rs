// ═══════════════════════════════════════════════════════════════════════
// Deterministic heuristic bot.
//
// Decision order inside a turn: trade, place reinforcements, attack
// while the odds are good, fortify the border, pass.
// ═══════════════════════════════════════════════════════════════════════

use war_engine::cards::is_valid_trade_set;
use war_engine::snapshot::{PlayerSnapshot, TerritoryView};
use war_engine::world::are_adjacent;
use war_engine::{CardId, Phase, TerritoryId};

use crate::agent::{Agent, BotAction};

const ATTACK_RATIO_THRESHOLD: f64 = 1.5;

pub struct HeuristicAgent;

impl Agent for HeuristicAgent {
    fn name(&self) -> &'static str {
        "heuristic"
    }

    fn decide(&mut self, view: &PlayerSnapshot) -> BotAction {
        match view.shared.phase {
            Phase::SetupAllocation => self.place(view).unwrap_or(BotAction::Pass),
            Phase::Reinforcement => {
                if let Some(set) = find_trade_set(view) {
                    return BotAction::Trade(set);
                }
                self.place(view).unwrap_or(BotAction::Pass)
            }
            Phase::Attack => best_attack(view).unwrap_or(BotAction::Pass),
            Phase::Movement => best_fortify(view).unwrap_or(BotAction::Pass),
            _ => BotAction::Pass,
        }
    }
}

impl HeuristicAgent {
    /// Drop the whole pool on the most threatened territory: highest
    /// ratio of enemy neighbors to own armies. Falls back to any owned
    /// territory so the pool always empties.
    fn place(&self, view: &PlayerSnapshot) -> Option<BotAction> {
        let pool = view.shared.players[view.viewer.0 as usize].unallocated;
        if pool == 0 {
            return None;
        }
        let mine = owned(view);
        let territory = mine
            .iter()
            .filter(|t| enemy_neighbor_count(view, t.id) > 0)
            .max_by(|a, b| {
                threat_ratio(view, a).total_cmp(&threat_ratio(view, b))
            })
            .or_else(|| mine.first())
            .map(|t| t.id)?;
        Some(BotAction::Reinforce {
            territory,
            count: pool,
        })
    }
}

// ── Scoring helpers ────────────────────────────────────────────────────

fn owned<'a>(view: &'a PlayerSnapshot) -> Vec<&'a TerritoryView> {
    view.shared
        .territories
        .iter()
        .filter(|t| t.owner == Some(view.viewer))
        .collect()
}

fn enemy_neighbor_count(view: &PlayerSnapshot, id: TerritoryId) -> usize {
    view.shared
        .territories
        .iter()
        .filter(|t| {
            t.owner.is_some() && t.owner != Some(view.viewer) && are_adjacent(id, t.id)
        })
        .count()
}

fn threat_ratio(view: &PlayerSnapshot, t: &TerritoryView) -> f64 {
    enemy_neighbor_count(view, t.id) as f64 / f64::from(t.armies + t.moved_in).max(1.0)
}

/// Any three held cards forming a valid set; checked over all triples of
/// the hand, smallest ids first.
fn find_trade_set(view: &PlayerSnapshot) -> Option<[CardId; 3]> {
    let hand: Vec<CardId> = view.hand.iter().map(|c| c.id).collect();
    for i in 0..hand.len() {
        for j in (i + 1)..hand.len() {
            for k in (j + 1)..hand.len() {
                let set = [hand[i], hand[j], hand[k]];
                if is_valid_trade_set(&set) {
                    return Some(set);
                }
            }
        }
    }
    None
}

/// Best adjacent enemy by `(attacker_armies - 1) / defender_armies`,
/// taken only when the ratio clears the threshold. A lone defender
/// halves the bar.
fn best_attack(view: &PlayerSnapshot) -> Option<BotAction> {
    let mut best: Option<(f64, TerritoryId, TerritoryId, u8)> = None;
    for source in owned(view) {
        if source.armies < 2 {
            continue;
        }
        for target in view.shared.territories.iter() {
            if target.owner == Some(view.viewer)
                || target.owner.is_none()
                || !are_adjacent(source.id, target.id)
            {
                continue;
            }
            let defenders = target.armies + target.moved_in;
            let ratio = f64::from(source.armies - 1) / f64::from(defenders).max(1.0);
            let threshold = if defenders == 1 {
                ATTACK_RATIO_THRESHOLD / 2.0
            } else {
                ATTACK_RATIO_THRESHOLD
            };
            if ratio < threshold {
                continue;
            }
            if best.map_or(true, |(r, _, _, _)| ratio > r) {
                let dice = (source.armies - 1).min(3) as u8;
                best = Some((ratio, source.id, target.id, dice));
            }
        }
    }
    best.map(|(_, source, target, dice)| BotAction::Attack {
        source,
        target,
        dice,
    })
}

/// Shift about half of the biggest interior stack to the weakest
/// adjacent border territory.
fn best_fortify(view: &PlayerSnapshot) -> Option<BotAction> {
    let mine = owned(view);
    let mut interior: Vec<&&TerritoryView> = mine
        .iter()
        .filter(|t| t.armies >= 2 && enemy_neighbor_count(view, t.id) == 0)
        .collect();
    interior.sort_by(|a, b| b.armies.cmp(&a.armies));

    for source in interior {
        let weakest_border = mine
            .iter()
            .filter(|t| {
                enemy_neighbor_count(view, t.id) > 0 && are_adjacent(source.id, t.id)
            })
            .min_by_key(|t| t.armies + t.moved_in);
        if let Some(border) = weakest_border {
            return Some(BotAction::Fortify {
                source: source.id,
                target: border.id,
                count: source.armies / 2,
            });
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use war_engine::player_snapshot;
    use war_engine::setup::{join_lobby, new_lobby, start_match};
    use war_engine::{MatchId, PlayerSlot};

    fn empty_pool_view() -> PlayerSnapshot {
        let mut state = new_lobby(MatchId(1), 0, 5, "bot", true);
        join_lobby(&mut state, "other", false).unwrap();
        start_match(&mut state).unwrap();
        // Force an empty pool mid-setup to exercise the fallback.
        for p in state.players.iter_mut() {
            p.unallocated = 0;
        }
        state.phase = Phase::Reinforcement;
        state.turn = Some(PlayerSlot(0));
        player_snapshot(&state, PlayerSlot(0))
    }

    #[test]
    fn empty_hand_and_pool_means_pass() {
        let view = empty_pool_view();
        let mut agent = HeuristicAgent;
        assert_eq!(agent.decide(&view), BotAction::Pass);
    }

    #[test]
    fn nonempty_pool_always_places() {
        let mut state = new_lobby(MatchId(1), 0, 5, "bot", true);
        join_lobby(&mut state, "other", false).unwrap();
        start_match(&mut state).unwrap();
        let view = player_snapshot(&state, PlayerSlot(0));
        let mut agent = HeuristicAgent;
        match agent.decide(&view) {
            BotAction::Reinforce { count, .. } => {
                assert_eq!(count, state.player(PlayerSlot(0)).unallocated)
            }
            other => panic!("expected a placement, got {other:?}"),
        }
    }
}
