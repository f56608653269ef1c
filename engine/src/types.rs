// ═══════════════════════════════════════════════════════════════════════
// Core types — the per-match aggregate and its building blocks.
//
// The entity graph is an arena: players, territory holdings and card
// ownership all live in flat tables on MatchState, keyed by compact
// integer ids. There are no back-pointers anywhere.
// ═══════════════════════════════════════════════════════════════════════

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

// ── Enums ──────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PlayerColor {
    White,
    Black,
    Red,
    Blue,
    Green,
    Yellow,
}

impl PlayerColor {
    pub const ALL: [PlayerColor; 6] = [
        PlayerColor::White,
        PlayerColor::Black,
        PlayerColor::Red,
        PlayerColor::Blue,
        PlayerColor::Green,
        PlayerColor::Yellow,
    ];
}

impl std::fmt::Display for PlayerColor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PlayerColor::White => write!(f, "White"),
            PlayerColor::Black => write!(f, "Black"),
            PlayerColor::Red => write!(f, "Red"),
            PlayerColor::Blue => write!(f, "Blue"),
            PlayerColor::Green => write!(f, "Green"),
            PlayerColor::Yellow => write!(f, "Yellow"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Continent {
    NorthAmerica,
    SouthAmerica,
    Europe,
    Africa,
    Asia,
    Oceania,
}

impl Continent {
    pub const ALL: [Continent; 6] = [
        Continent::NorthAmerica,
        Continent::SouthAmerica,
        Continent::Europe,
        Continent::Africa,
        Continent::Asia,
        Continent::Oceania,
    ];

    /// Reinforcement bonus for holding every territory of the continent.
    pub fn bonus(self) -> u16 {
        match self {
            Continent::Asia => 7,
            Continent::NorthAmerica => 5,
            Continent::Europe => 5,
            Continent::Africa => 3,
            Continent::SouthAmerica => 2,
            Continent::Oceania => 2,
        }
    }
}

impl std::fmt::Display for Continent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Continent::NorthAmerica => write!(f, "North America"),
            Continent::SouthAmerica => write!(f, "South America"),
            Continent::Europe => write!(f, "Europe"),
            Continent::Africa => write!(f, "Africa"),
            Continent::Asia => write!(f, "Asia"),
            Continent::Oceania => write!(f, "Oceania"),
        }
    }
}

/// Match lifecycle and turn phases, modeled as one closed enumeration.
/// `Lobby` and the two terminal states are lifecycle-only; the middle four
/// are the turn-phase cycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Phase {
    Lobby,
    SetupAllocation,
    Reinforcement,
    Attack,
    Movement,
    Finished,
    Canceled,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Finished | Phase::Canceled)
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let s = match self {
            Phase::Lobby => "Lobby",
            Phase::SetupAllocation => "SetupAllocation",
            Phase::Reinforcement => "Reinforcement",
            Phase::Attack => "Attack",
            Phase::Movement => "Movement",
            Phase::Finished => "Finished",
            Phase::Canceled => "Canceled",
        };
        write!(f, "{s}")
    }
}

/// Card symbol kinds: three region symbols plus the universal wild.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CardKind {
    Circle,
    Square,
    Triangle,
    Wild,
}

/// How the match was won.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WinCondition {
    /// Every other player was eliminated.
    EliminationComplete,
    /// The winner completed their secret objective.
    ObjectiveComplete(ObjectiveId),
}

// ── Compact ids ────────────────────────────────────────────────────────
// Indexes into the static catalogs (world::TERRITORIES, cards::CARDS,
// objectives::OBJECTIVES) or into MatchState tables.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct TerritoryId(pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct PlayerSlot(pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct CardId(pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct ObjectiveId(pub u8);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, PartialOrd, Ord)]
pub struct MatchId(pub u64);

// ── Per-player state ───────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayerInMatch {
    pub username: String,
    pub color: PlayerColor,
    /// Position in the turn cycle, 1..=N. Assigned once at match start,
    /// never reassigned — eliminated players are skipped, not renumbered.
    pub turn_order: u8,
    /// Unallocated reinforcement pool.
    pub unallocated: u16,
    pub objective: ObjectiveId,
    /// Set when the player conquers at least one territory this turn;
    /// drives the end-of-turn card award.
    pub captured_this_turn: bool,
    /// False once eliminated.
    pub alive: bool,
    pub is_ai: bool,
}

// ── Per-territory state ────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct TerritoryHolding {
    /// None only before the initial distribution.
    pub owner: Option<PlayerSlot>,
    /// Static armies: eligible to attack or fortify out this turn.
    pub armies: u16,
    /// Armies that arrived this turn (conquest or fortify); they defend
    /// but cannot attack until consolidated at end of turn.
    pub moved_in: u16,
}

impl TerritoryHolding {
    pub fn total(&self) -> u16 {
        self.armies + self.moved_in
    }
}

// ── Card ownership ─────────────────────────────────────────────────────
// The join relation between cards and players. A card is reassigned over
// the match's life (draws, elimination transfers) and leaves circulation
// permanently when traded.

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CardHolder {
    Deck,
    Player(PlayerSlot),
    /// Traded away; never returns to the deck.
    Spent,
}

// ── Match state ────────────────────────────────────────────────────────

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchState {
    pub id: MatchId,
    pub phase: Phase,
    pub created_at_ms: u64,

    /// Current turn actor. None in Lobby and SetupAllocation.
    pub turn: Option<PlayerSlot>,
    pub winner: Option<PlayerSlot>,
    pub win_condition: Option<WinCondition>,

    /// Count of card-set trades performed; drives the escalating bonus.
    pub trades_performed: u32,

    /// Indexed by PlayerSlot.
    pub players: Vec<PlayerInMatch>,
    /// Indexed by TerritoryId. Empty until the match starts.
    pub territories: Vec<TerritoryHolding>,
    /// Indexed by CardId. Empty until the match starts.
    pub card_holders: Vec<CardHolder>,
    /// Draw pile, top of pile at the back.
    pub deck: Vec<CardId>,

    // Deterministic randomness: every draw derives a fresh stream from
    // (seed, counter), so the state stays serializable and replayable.
    pub seed: u64,
    pub rng_counter: u64,
}

impl MatchState {
    pub fn player(&self, slot: PlayerSlot) -> &PlayerInMatch {
        &self.players[slot.0 as usize]
    }

    pub fn player_mut(&mut self, slot: PlayerSlot) -> &mut PlayerInMatch {
        &mut self.players[slot.0 as usize]
    }

    pub fn territory(&self, id: TerritoryId) -> &TerritoryHolding {
        &self.territories[id.0 as usize]
    }

    pub fn territory_mut(&mut self, id: TerritoryId) -> &mut TerritoryHolding {
        &mut self.territories[id.0 as usize]
    }

    pub fn slot_of(&self, username: &str) -> Option<PlayerSlot> {
        self.players
            .iter()
            .position(|p| p.username == username)
            .map(|i| PlayerSlot(i as u8))
    }

    pub fn slot_by_color(&self, color: PlayerColor) -> Option<PlayerSlot> {
        self.players
            .iter()
            .position(|p| p.color == color)
            .map(|i| PlayerSlot(i as u8))
    }

    pub fn player_count(&self) -> u8 {
        self.players.len() as u8
    }

    pub fn alive_count(&self) -> usize {
        self.players.iter().filter(|p| p.alive).count()
    }

    /// Territories currently owned by a player.
    pub fn owned_territories(&self, slot: PlayerSlot) -> impl Iterator<Item = TerritoryId> + '_ {
        self.territories
            .iter()
            .enumerate()
            .filter(move |(_, t)| t.owner == Some(slot))
            .map(|(i, _)| TerritoryId(i as u8))
    }

    pub fn owned_count(&self, slot: PlayerSlot) -> usize {
        self.territories
            .iter()
            .filter(|t| t.owner == Some(slot))
            .count()
    }

    /// Cards currently held by a player, in catalog order.
    pub fn cards_of(&self, slot: PlayerSlot) -> Vec<CardId> {
        self.card_holders
            .iter()
            .enumerate()
            .filter(|(_, h)| **h == CardHolder::Player(slot))
            .map(|(i, _)| CardId(i as u8))
            .collect()
    }

    pub fn hand_size(&self, slot: PlayerSlot) -> usize {
        self.card_holders
            .iter()
            .filter(|h| **h == CardHolder::Player(slot))
            .count()
    }

    /// Next alive player after `slot` in wrapping turn order.
    /// At least one other alive player must exist.
    pub fn next_alive_after(&self, slot: PlayerSlot) -> PlayerSlot {
        let mut by_order: Vec<PlayerSlot> = (0..self.players.len())
            .map(|i| PlayerSlot(i as u8))
            .collect();
        by_order.sort_by_key(|s| self.player(*s).turn_order);

        let pos = by_order
            .iter()
            .position(|s| *s == slot)
            .unwrap_or(0);
        for step in 1..=by_order.len() {
            let candidate = by_order[(pos + step) % by_order.len()];
            if self.player(candidate).alive {
                return candidate;
            }
        }
        slot
    }

    /// Derive a fresh deterministic RNG stream for the next random event.
    pub(crate) fn next_rng(&mut self) -> ChaCha8Rng {
        self.rng_counter += 1;
        ChaCha8Rng::seed_from_u64(
            self.seed ^ self.rng_counter.wrapping_mul(0x9E37_79B9_7F4A_7C15),
        )
    }
}
