// ═══════════════════════════════════════════════════════════════════════
// Dice combat.
//
// The pairing rules are pure functions over already-rolled dice; the
// engine rolls through the match's deterministic RNG and feeds the
// results in. Ties always favor the defender.
// ═══════════════════════════════════════════════════════════════════════

use rand::Rng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

pub const MAX_ATTACK_DICE: u8 = 3;
pub const MAX_DEFEND_DICE: u8 = 2;

/// Army losses from one combat round.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Losses {
    pub attacker: u16,
    pub defender: u16,
}

/// Outcome of a full attack action, reported back to the caller.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CombatReport {
    pub attack_rolls: Vec<u8>,
    pub defend_rolls: Vec<u8>,
    pub losses: Losses,
    pub conquered: bool,
    /// Armies moved into the conquered territory (0 unless `conquered`).
    pub moved_in: u16,
}

/// Roll `n` six-sided dice, highest first.
pub fn roll(rng: &mut ChaCha8Rng, n: u8) -> Vec<u8> {
    let mut dice: Vec<u8> = (0..n).map(|_| rng.gen_range(1..=6)).collect();
    dice.sort_unstable_by(|a, b| b.cmp(a));
    dice
}

/// Pair the highest attack die against the highest defend die, the second
/// highest against the second highest, and so on. Each pair costs the
/// lower side one army; the defender wins ties.
pub fn battle(attack_rolls: &[u8], defend_rolls: &[u8]) -> Losses {
    let mut attack = attack_rolls.to_vec();
    let mut defend = defend_rolls.to_vec();
    attack.sort_unstable_by(|a, b| b.cmp(a));
    defend.sort_unstable_by(|a, b| b.cmp(a));

    let mut losses = Losses {
        attacker: 0,
        defender: 0,
    };
    for (a, d) in attack.iter().zip(defend.iter()) {
        if a > d {
            losses.defender += 1;
        } else {
            losses.attacker += 1;
        }
    }
    losses
}

/// Dice the defender brings to the table: two with two or more armies
/// on the ground (static plus moved-in), otherwise one.
pub fn defend_dice(defending_armies: u16) -> u8 {
    if defending_armies >= 2 {
        MAX_DEFEND_DICE
    } else {
        1
    }
}
