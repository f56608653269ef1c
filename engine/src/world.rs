// ═══════════════════════════════════════════════════════════════════════
// Static world graph — territories, continents, adjacency.
// Loaded once at compile time, immutable at runtime.
// ═══════════════════════════════════════════════════════════════════════

use crate::types::{Continent, TerritoryId};

/// Static description of a territory (compile-time constant).
#[derive(Debug, Clone)]
pub struct TerritoryDef {
    pub id: TerritoryId,
    pub name: &'static str,
    pub continent: Continent,
    /// Undirected adjacency: `a` lists `b` iff `b` lists `a`.
    pub adjacent: &'static [TerritoryId],
}

// ── Territory ID constants ─────────────────────────────────────────────
// Ordered by continent: North America (0–8), South America (9–12),
// Europe (13–19), Africa (20–25), Asia (26–37), Oceania (38–41).

pub const ALASKA: TerritoryId              = TerritoryId(0);
pub const NORTHWEST_TERRITORY: TerritoryId = TerritoryId(1);
pub const GREENLAND: TerritoryId           = TerritoryId(2);
pub const ALBERTA: TerritoryId             = TerritoryId(3);
pub const ONTARIO: TerritoryId             = TerritoryId(4);
pub const QUEBEC: TerritoryId              = TerritoryId(5);
pub const WESTERN_UNITED_STATES: TerritoryId = TerritoryId(6);
pub const EASTERN_UNITED_STATES: TerritoryId = TerritoryId(7);
pub const CENTRAL_AMERICA: TerritoryId     = TerritoryId(8);

pub const VENEZUELA: TerritoryId           = TerritoryId(9);
pub const BRAZIL: TerritoryId              = TerritoryId(10);
pub const PERU: TerritoryId                = TerritoryId(11);
pub const ARGENTINA: TerritoryId           = TerritoryId(12);

pub const ICELAND: TerritoryId             = TerritoryId(13);
pub const SCANDINAVIA: TerritoryId         = TerritoryId(14);
pub const GREAT_BRITAIN: TerritoryId       = TerritoryId(15);
pub const NORTHERN_EUROPE: TerritoryId     = TerritoryId(16);
pub const WESTERN_EUROPE: TerritoryId      = TerritoryId(17);
pub const SOUTHERN_EUROPE: TerritoryId     = TerritoryId(18);
pub const UKRAINE: TerritoryId             = TerritoryId(19);

pub const NORTH_AFRICA: TerritoryId        = TerritoryId(20);
pub const EGYPT: TerritoryId               = TerritoryId(21);
pub const EAST_AFRICA: TerritoryId         = TerritoryId(22);
pub const CONGO: TerritoryId               = TerritoryId(23);
pub const SOUTH_AFRICA: TerritoryId        = TerritoryId(24);
pub const MADAGASCAR: TerritoryId          = TerritoryId(25);

pub const URAL: TerritoryId                = TerritoryId(26);
pub const SIBERIA: TerritoryId             = TerritoryId(27);
pub const YAKUTSK: TerritoryId             = TerritoryId(28);
pub const KAMCHATKA: TerritoryId           = TerritoryId(29);
pub const IRKUTSK: TerritoryId             = TerritoryId(30);
pub const MONGOLIA: TerritoryId            = TerritoryId(31);
pub const JAPAN: TerritoryId               = TerritoryId(32);
pub const AFGHANISTAN: TerritoryId         = TerritoryId(33);
pub const CHINA: TerritoryId               = TerritoryId(34);
pub const MIDDLE_EAST: TerritoryId         = TerritoryId(35);
pub const INDIA: TerritoryId               = TerritoryId(36);
pub const SIAM: TerritoryId                = TerritoryId(37);

pub const INDONESIA: TerritoryId           = TerritoryId(38);
pub const NEW_GUINEA: TerritoryId          = TerritoryId(39);
pub const WESTERN_AUSTRALIA: TerritoryId   = TerritoryId(40);
pub const EASTERN_AUSTRALIA: TerritoryId   = TerritoryId(41);

pub const NUM_TERRITORIES: usize = 42;

/// Lookup territory name by id.
pub fn territory_name(id: TerritoryId) -> &'static str {
    TERRITORIES[id.0 as usize].name
}

/// All territory ids of a continent, in id order.
pub fn continent_territories(continent: Continent) -> impl Iterator<Item = TerritoryId> {
    TERRITORIES
        .iter()
        .filter(move |t| t.continent == continent)
        .map(|t| t.id)
}

/// True if `a` and `b` share a border.
pub fn are_adjacent(a: TerritoryId, b: TerritoryId) -> bool {
    TERRITORIES[a.0 as usize].adjacent.contains(&b)
}

// ── Static territory definitions ───────────────────────────────────────

macro_rules! territory {
    ($name:expr, $id:expr, $continent:expr, adj: [$($a:expr),*]) => {
        TerritoryDef {
            id: $id, name: $name, continent: $continent,
            adjacent: &[$($a),*],
        }
    };
}

use Continent::*;

pub static TERRITORIES: [TerritoryDef; NUM_TERRITORIES] = [
    // ═══ NORTH AMERICA ═══
    territory!("Alaska", ALASKA, NorthAmerica,
        adj: [NORTHWEST_TERRITORY, ALBERTA, KAMCHATKA]),
    territory!("Northwest Territory", NORTHWEST_TERRITORY, NorthAmerica,
        adj: [ALASKA, ALBERTA, ONTARIO, GREENLAND]),
    territory!("Greenland", GREENLAND, NorthAmerica,
        adj: [NORTHWEST_TERRITORY, ONTARIO, QUEBEC, ICELAND]),
    territory!("Alberta", ALBERTA, NorthAmerica,
        adj: [ALASKA, NORTHWEST_TERRITORY, ONTARIO, WESTERN_UNITED_STATES]),
    territory!("Ontario", ONTARIO, NorthAmerica,
        adj: [NORTHWEST_TERRITORY, ALBERTA, GREENLAND, QUEBEC, WESTERN_UNITED_STATES, EASTERN_UNITED_STATES]),
    territory!("Quebec", QUEBEC, NorthAmerica,
        adj: [GREENLAND, ONTARIO, EASTERN_UNITED_STATES]),
    territory!("Western United States", WESTERN_UNITED_STATES, NorthAmerica,
        adj: [ALBERTA, ONTARIO, EASTERN_UNITED_STATES, CENTRAL_AMERICA]),
    territory!("Eastern United States", EASTERN_UNITED_STATES, NorthAmerica,
        adj: [ONTARIO, QUEBEC, WESTERN_UNITED_STATES, CENTRAL_AMERICA]),
    territory!("Central America", CENTRAL_AMERICA, NorthAmerica,
        adj: [WESTERN_UNITED_STATES, EASTERN_UNITED_STATES, VENEZUELA]),

    // ═══ SOUTH AMERICA ═══
    territory!("Venezuela", VENEZUELA, SouthAmerica,
        adj: [CENTRAL_AMERICA, BRAZIL, PERU]),
    territory!("Brazil", BRAZIL, SouthAmerica,
        adj: [VENEZUELA, PERU, ARGENTINA, NORTH_AFRICA]),
    territory!("Peru", PERU, SouthAmerica,
        adj: [VENEZUELA, BRAZIL, ARGENTINA]),
    territory!("Argentina", ARGENTINA, SouthAmerica,
        adj: [BRAZIL, PERU]),

    // ═══ EUROPE ═══
    territory!("Iceland", ICELAND, Europe,
        adj: [GREENLAND, GREAT_BRITAIN, SCANDINAVIA]),
    territory!("Scandinavia", SCANDINAVIA, Europe,
        adj: [ICELAND, GREAT_BRITAIN, NORTHERN_EUROPE, UKRAINE]),
    territory!("Great Britain", GREAT_BRITAIN, Europe,
        adj: [ICELAND, SCANDINAVIA, NORTHERN_EUROPE, WESTERN_EUROPE]),
    territory!("Northern Europe", NORTHERN_EUROPE, Europe,
        adj: [GREAT_BRITAIN, SCANDINAVIA, UKRAINE, SOUTHERN_EUROPE, WESTERN_EUROPE]),
    territory!("Western Europe", WESTERN_EUROPE, Europe,
        adj: [GREAT_BRITAIN, NORTHERN_EUROPE, SOUTHERN_EUROPE, NORTH_AFRICA]),
    territory!("Southern Europe", SOUTHERN_EUROPE, Europe,
        adj: [WESTERN_EUROPE, NORTHERN_EUROPE, UKRAINE, MIDDLE_EAST, EGYPT, NORTH_AFRICA]),
    territory!("Ukraine", UKRAINE, Europe,
        adj: [SCANDINAVIA, NORTHERN_EUROPE, SOUTHERN_EUROPE, URAL, AFGHANISTAN, MIDDLE_EAST]),

    // ═══ AFRICA ═══
    territory!("North Africa", NORTH_AFRICA, Africa,
        adj: [WESTERN_EUROPE, SOUTHERN_EUROPE, EGYPT, EAST_AFRICA, CONGO, BRAZIL]),
    territory!("Egypt", EGYPT, Africa,
        adj: [SOUTHERN_EUROPE, NORTH_AFRICA, EAST_AFRICA, MIDDLE_EAST]),
    territory!("East Africa", EAST_AFRICA, Africa,
        adj: [EGYPT, NORTH_AFRICA, CONGO, SOUTH_AFRICA, MADAGASCAR, MIDDLE_EAST]),
    territory!("Congo", CONGO, Africa,
        adj: [NORTH_AFRICA, EAST_AFRICA, SOUTH_AFRICA]),
    territory!("South Africa", SOUTH_AFRICA, Africa,
        adj: [CONGO, EAST_AFRICA, MADAGASCAR]),
    territory!("Madagascar", MADAGASCAR, Africa,
        adj: [EAST_AFRICA, SOUTH_AFRICA]),

    // ═══ ASIA ═══
    territory!("Ural", URAL, Asia,
        adj: [UKRAINE, SIBERIA, CHINA, AFGHANISTAN]),
    territory!("Siberia", SIBERIA, Asia,
        adj: [URAL, YAKUTSK, IRKUTSK, MONGOLIA, CHINA]),
    territory!("Yakutsk", YAKUTSK, Asia,
        adj: [SIBERIA, KAMCHATKA, IRKUTSK]),
    territory!("Kamchatka", KAMCHATKA, Asia,
        adj: [YAKUTSK, IRKUTSK, MONGOLIA, JAPAN, ALASKA]),
    territory!("Irkutsk", IRKUTSK, Asia,
        adj: [SIBERIA, YAKUTSK, KAMCHATKA, MONGOLIA]),
    territory!("Mongolia", MONGOLIA, Asia,
        adj: [SIBERIA, IRKUTSK, KAMCHATKA, JAPAN, CHINA]),
    territory!("Japan", JAPAN, Asia,
        adj: [KAMCHATKA, MONGOLIA]),
    territory!("Afghanistan", AFGHANISTAN, Asia,
        adj: [UKRAINE, URAL, CHINA, INDIA, MIDDLE_EAST]),
    territory!("China", CHINA, Asia,
        adj: [URAL, SIBERIA, MONGOLIA, AFGHANISTAN, INDIA, SIAM]),
    territory!("Middle East", MIDDLE_EAST, Asia,
        adj: [UKRAINE, SOUTHERN_EUROPE, EGYPT, EAST_AFRICA, AFGHANISTAN, INDIA]),
    territory!("India", INDIA, Asia,
        adj: [MIDDLE_EAST, AFGHANISTAN, CHINA, SIAM]),
    territory!("Siam", SIAM, Asia,
        adj: [INDIA, CHINA, INDONESIA]),

    // ═══ OCEANIA ═══
    territory!("Indonesia", INDONESIA, Oceania,
        adj: [SIAM, NEW_GUINEA, WESTERN_AUSTRALIA]),
    territory!("New Guinea", NEW_GUINEA, Oceania,
        adj: [INDONESIA, WESTERN_AUSTRALIA, EASTERN_AUSTRALIA]),
    territory!("Western Australia", WESTERN_AUSTRALIA, Oceania,
        adj: [INDONESIA, NEW_GUINEA, EASTERN_AUSTRALIA]),
    territory!("Eastern Australia", EASTERN_AUSTRALIA, Oceania,
        adj: [NEW_GUINEA, WESTERN_AUSTRALIA]),
];
