// ═══════════════════════════════════════════════════════════════════════
// Random bot — uniform choice over currently legal moves. Useful as a
// stability baseline and as the sparring partner in simulations.
// ═══════════════════════════════════════════════════════════════════════

use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use war_engine::snapshot::PlayerSnapshot;
use war_engine::world::are_adjacent;
use war_engine::Phase;

use crate::agent::{Agent, BotAction};

pub struct RandomAgent {
    rng: ChaCha8Rng,
}

impl RandomAgent {
    pub fn new(seed: u64) -> Self {
        RandomAgent {
            rng: ChaCha8Rng::seed_from_u64(seed),
        }
    }
}

impl Agent for RandomAgent {
    fn name(&self) -> &'static str {
        "random"
    }

    fn decide(&mut self, view: &PlayerSnapshot) -> BotAction {
        match view.shared.phase {
            Phase::SetupAllocation | Phase::Reinforcement => {
                let pool = view.shared.players[view.viewer.0 as usize].unallocated;
                if pool == 0 {
                    return BotAction::Pass;
                }
                let mine: Vec<_> = view
                    .shared
                    .territories
                    .iter()
                    .filter(|t| t.owner == Some(view.viewer))
                    .collect();
                match mine.choose(&mut self.rng) {
                    Some(t) => BotAction::Reinforce {
                        territory: t.id,
                        count: pool,
                    },
                    None => BotAction::Pass,
                }
            }
            Phase::Attack => {
                let mut candidates = vec![BotAction::Pass];
                for source in view.shared.territories.iter() {
                    if source.owner != Some(view.viewer) || source.armies < 2 {
                        continue;
                    }
                    for target in view.shared.territories.iter() {
                        if target.owner == Some(view.viewer)
                            || target.owner.is_none()
                            || !are_adjacent(source.id, target.id)
                        {
                            continue;
                        }
                        candidates.push(BotAction::Attack {
                            source: source.id,
                            target: target.id,
                            dice: (source.armies - 1).min(3) as u8,
                        });
                    }
                }
                // A little impatience keeps games short.
                if candidates.len() > 1 && self.rng.gen_bool(0.8) {
                    candidates[1..]
                        .choose(&mut self.rng)
                        .copied()
                        .unwrap_or(BotAction::Pass)
                } else {
                    BotAction::Pass
                }
            }
            // Movement is skipped; random fortification rarely helps.
            _ => BotAction::Pass,
        }
    }
}
