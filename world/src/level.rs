//! Immutable per-level static data and its serde wire form.
//!
//! A level is described on the wire as a row-major grid of single-character
//! cell codes plus parallel arrays of typed entity records. The runtime
//! [`Level`] is validated once and never mutated afterwards; re-entering a
//! level rebuilds the mutable game state from this model.

use std::time::Duration;

use glade_core::{Direction, DoorId, EnemyBehavior, EnemyId, GridPos, KeyId, LeverId, TotemId};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Grid character marking an impassable wall cell.
const WALL_CODE: char = '#';
/// Grid character marking the player start cell.
const START_CODE: char = 'P';
/// Grid character marking the exit cell.
const EXIT_CODE: char = 'E';

const DEFAULT_MOVE_INTERVAL_MS: u64 = 200;

/// Problems that make a level definition structurally unusable.
#[derive(Clone, Debug, Error, PartialEq, Eq)]
pub enum LevelError {
    /// The grid contains no rows or rows of zero width.
    #[error("level grid is empty")]
    EmptyGrid,
    /// A grid row differs in length from the first row.
    #[error("grid row {row} does not match the width of row 0")]
    RaggedGrid {
        /// Zero-based index of the offending row.
        row: usize,
    },
    /// A campaign must contain at least one level.
    #[error("campaign contains no levels")]
    EmptyCampaign,
}

/// Wire representation of a single level.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LevelDefinition {
    /// Human-readable level name.
    pub name: String,
    /// Row-major grid of cell codes (`#` wall, `P` start, `E` exit).
    pub grid: Vec<String>,
    /// Keys placed on the grid.
    #[serde(default)]
    pub keys: Vec<KeyDefinition>,
    /// Doors placed on the grid.
    #[serde(default)]
    pub doors: Vec<DoorDefinition>,
    /// Levers placed on the grid.
    #[serde(default)]
    pub levers: Vec<LeverDefinition>,
    /// Enemy spawn points.
    #[serde(default)]
    pub enemies: Vec<EnemyDefinition>,
    /// Projectile-firing totems.
    #[serde(default)]
    pub totems: Vec<TotemDefinition>,
}

/// Wire representation of a key.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct KeyDefinition {
    /// Identifier referenced by the door this key unlocks.
    pub id: u32,
    /// Column of the key's cell.
    pub x: u32,
    /// Row of the key's cell.
    pub y: u32,
}

/// Wire representation of a door.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct DoorDefinition {
    /// Identifier of the door.
    pub id: u32,
    /// Column of the door's cell.
    pub x: u32,
    /// Row of the door's cell.
    pub y: u32,
    /// Mechanism that unlocks the door.
    pub latch: LatchDefinition,
}

/// Wire representation of a door's unlocking mechanism.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LatchDefinition {
    /// Unlocked by carrying the referenced key onto the door cell.
    Key {
        /// Identifier of the unlocking key.
        key: u32,
    },
    /// Unlocked by pulling the referenced lever.
    Lever {
        /// Identifier of the unlocking lever.
        lever: u32,
    },
}

/// Wire representation of a lever.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct LeverDefinition {
    /// Identifier referenced by the doors this lever opens.
    pub id: u32,
    /// Column of the lever's cell.
    pub x: u32,
    /// Row of the lever's cell.
    pub y: u32,
}

/// Wire representation of an enemy spawn.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct EnemyDefinition {
    /// Identifier of the enemy.
    pub id: u32,
    /// Column of the spawn cell.
    pub x: u32,
    /// Row of the spawn cell.
    pub y: u32,
    /// Disposition driving the enemy's decisions.
    pub behavior: EnemyBehavior,
    /// Maximum path distance at which the enemy sees the player.
    #[serde(default)]
    pub vision_range: u32,
    /// Minimum milliseconds between two decisions by this enemy.
    #[serde(default = "default_move_interval_ms")]
    pub move_interval_ms: u64,
}

/// Wire representation of a totem.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct TotemDefinition {
    /// Identifier of the totem.
    pub id: u32,
    /// Column of the totem's cell.
    pub x: u32,
    /// Row of the totem's cell.
    pub y: u32,
    /// Fixed cardinal direction the totem fires along.
    pub direction: Direction,
}

fn default_move_interval_ms() -> u64 {
    DEFAULT_MOVE_INTERVAL_MS
}

/// Key placed on the grid, unlockable door counterpart.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Key {
    id: KeyId,
    cell: GridPos,
}

impl Key {
    /// Identifier referenced by the door this key unlocks.
    #[must_use]
    pub const fn id(&self) -> KeyId {
        self.id
    }

    /// Cell the key rests on.
    #[must_use]
    pub const fn cell(&self) -> GridPos {
        self.cell
    }
}

/// Mechanism that unlocks a door.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DoorLatch {
    /// Unlocked by carrying the referenced key onto the door cell.
    Key(KeyId),
    /// Unlocked by pulling the referenced lever.
    Lever(LeverId),
}

/// Door placed on the grid; impassable until unlocked.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Door {
    id: DoorId,
    cell: GridPos,
    latch: DoorLatch,
}

impl Door {
    /// Identifier of the door.
    #[must_use]
    pub const fn id(&self) -> DoorId {
        self.id
    }

    /// Cell the door occupies.
    #[must_use]
    pub const fn cell(&self) -> GridPos {
        self.cell
    }

    /// Mechanism that unlocks the door.
    #[must_use]
    pub const fn latch(&self) -> DoorLatch {
        self.latch
    }
}

/// Lever placed on the grid, pullable by the player standing on it.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Lever {
    id: LeverId,
    cell: GridPos,
}

impl Lever {
    /// Identifier referenced by the doors this lever opens.
    #[must_use]
    pub const fn id(&self) -> LeverId {
        self.id
    }

    /// Cell the lever occupies.
    #[must_use]
    pub const fn cell(&self) -> GridPos {
        self.cell
    }
}

/// Static description of one enemy to spawn when the level loads.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct EnemySpawn {
    id: EnemyId,
    cell: GridPos,
    behavior: EnemyBehavior,
    vision_range: u32,
    move_interval: Duration,
}

impl EnemySpawn {
    /// Identifier of the enemy.
    #[must_use]
    pub const fn id(&self) -> EnemyId {
        self.id
    }

    /// Cell the enemy spawns on.
    #[must_use]
    pub const fn cell(&self) -> GridPos {
        self.cell
    }

    /// Disposition driving the enemy's decisions.
    #[must_use]
    pub const fn behavior(&self) -> EnemyBehavior {
        self.behavior
    }

    /// Maximum path distance at which the enemy sees the player.
    #[must_use]
    pub const fn vision_range(&self) -> u32 {
        self.vision_range
    }

    /// Minimum simulated time between two decisions by this enemy.
    #[must_use]
    pub const fn move_interval(&self) -> Duration {
        self.move_interval
    }
}

/// Static description of one totem present in the level.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TotemSpawn {
    id: TotemId,
    cell: GridPos,
    direction: Direction,
}

impl TotemSpawn {
    /// Identifier of the totem.
    #[must_use]
    pub const fn id(&self) -> TotemId {
        self.id
    }

    /// Cell the totem occupies.
    #[must_use]
    pub const fn cell(&self) -> GridPos {
        self.cell
    }

    /// Fixed cardinal direction the totem fires along.
    #[must_use]
    pub const fn direction(&self) -> Direction {
        self.direction
    }
}

/// Immutable static data for one level.
#[derive(Clone, Debug)]
pub struct Level {
    name: String,
    width: u32,
    height: u32,
    walls: Vec<bool>,
    start: GridPos,
    exit: Option<GridPos>,
    keys: Vec<Key>,
    doors: Vec<Door>,
    levers: Vec<Lever>,
    enemy_spawns: Vec<EnemySpawn>,
    totems: Vec<TotemSpawn>,
}

impl Level {
    /// Validates a wire definition into an immutable level model.
    ///
    /// A level without a `P` cell recovers by starting the player at
    /// `(0, 0)`; structurally broken grids are rejected instead.
    pub fn from_definition(definition: &LevelDefinition) -> Result<Self, LevelError> {
        let height = definition.grid.len();
        let width = definition
            .grid
            .first()
            .map(|row| row.chars().count())
            .unwrap_or(0);
        if width == 0 || height == 0 {
            return Err(LevelError::EmptyGrid);
        }

        let mut walls = vec![false; width * height];
        let mut start = None;
        let mut exit = None;

        for (y, row) in definition.grid.iter().enumerate() {
            if row.chars().count() != width {
                return Err(LevelError::RaggedGrid { row: y });
            }

            for (x, code) in row.chars().enumerate() {
                let cell = GridPos::new(x as u32, y as u32);
                match code {
                    WALL_CODE => walls[y * width + x] = true,
                    START_CODE => {
                        if start.is_none() {
                            start = Some(cell);
                        }
                    }
                    EXIT_CODE => {
                        if exit.is_none() {
                            exit = Some(cell);
                        }
                    }
                    _ => {}
                }
            }
        }

        Ok(Self {
            name: definition.name.clone(),
            width: width as u32,
            height: height as u32,
            walls,
            start: start.unwrap_or(GridPos::new(0, 0)),
            exit,
            keys: definition
                .keys
                .iter()
                .map(|key| Key {
                    id: KeyId::new(key.id),
                    cell: GridPos::new(key.x, key.y),
                })
                .collect(),
            doors: definition
                .doors
                .iter()
                .map(|door| Door {
                    id: DoorId::new(door.id),
                    cell: GridPos::new(door.x, door.y),
                    latch: match door.latch {
                        LatchDefinition::Key { key } => DoorLatch::Key(KeyId::new(key)),
                        LatchDefinition::Lever { lever } => DoorLatch::Lever(LeverId::new(lever)),
                    },
                })
                .collect(),
            levers: definition
                .levers
                .iter()
                .map(|lever| Lever {
                    id: LeverId::new(lever.id),
                    cell: GridPos::new(lever.x, lever.y),
                })
                .collect(),
            enemy_spawns: definition
                .enemies
                .iter()
                .map(|enemy| EnemySpawn {
                    id: EnemyId::new(enemy.id),
                    cell: GridPos::new(enemy.x, enemy.y),
                    behavior: enemy.behavior,
                    vision_range: enemy.vision_range,
                    move_interval: Duration::from_millis(enemy.move_interval_ms),
                })
                .collect(),
            totems: definition
                .totems
                .iter()
                .map(|totem| TotemSpawn {
                    id: TotemId::new(totem.id),
                    cell: GridPos::new(totem.x, totem.y),
                    direction: totem.direction,
                })
                .collect(),
        })
    }

    /// Human-readable level name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of columns in the grid.
    #[must_use]
    pub const fn width(&self) -> u32 {
        self.width
    }

    /// Number of rows in the grid.
    #[must_use]
    pub const fn height(&self) -> u32 {
        self.height
    }

    /// Cell the player starts on.
    #[must_use]
    pub const fn start(&self) -> GridPos {
        self.start
    }

    /// Cell the player must reach to win, if the level has one.
    #[must_use]
    pub const fn exit(&self) -> Option<GridPos> {
        self.exit
    }

    /// Reports whether the cell is the exit.
    #[must_use]
    pub fn exit_at(&self, cell: GridPos) -> bool {
        self.exit == Some(cell)
    }

    /// Reports whether the cell lies inside the grid and is not a wall.
    #[must_use]
    pub fn is_passable(&self, cell: GridPos) -> bool {
        self.index(cell)
            .map_or(false, |index| !self.walls[index])
    }

    /// Key resting on the provided cell, if any.
    #[must_use]
    pub fn key_at(&self, cell: GridPos) -> Option<&Key> {
        self.keys.iter().find(|key| key.cell == cell)
    }

    /// Door occupying the provided cell, if any.
    #[must_use]
    pub fn door_at(&self, cell: GridPos) -> Option<&Door> {
        self.doors.iter().find(|door| door.cell == cell)
    }

    /// Lever occupying the provided cell, if any.
    #[must_use]
    pub fn lever_at(&self, cell: GridPos) -> Option<&Lever> {
        self.levers.iter().find(|lever| lever.cell == cell)
    }

    /// All doors defined by the level.
    #[must_use]
    pub fn doors(&self) -> &[Door] {
        &self.doors
    }

    /// All keys defined by the level.
    #[must_use]
    pub fn keys(&self) -> &[Key] {
        &self.keys
    }

    /// All levers defined by the level.
    #[must_use]
    pub fn levers(&self) -> &[Lever] {
        &self.levers
    }

    /// Enemy spawn points defined by the level.
    #[must_use]
    pub fn enemy_spawns(&self) -> &[EnemySpawn] {
        &self.enemy_spawns
    }

    /// Totems defined by the level.
    #[must_use]
    pub fn totems(&self) -> &[TotemSpawn] {
        &self.totems
    }

    fn index(&self, cell: GridPos) -> Option<usize> {
        if cell.x() < self.width && cell.y() < self.height {
            Some(cell.y() as usize * self.width as usize + cell.x() as usize)
        } else {
            None
        }
    }
}

/// Ordered collection of levels making up one play-through.
#[derive(Clone, Debug)]
pub struct Campaign {
    levels: Vec<Level>,
}

impl Campaign {
    /// Validates a list of wire definitions into a campaign.
    pub fn from_definitions(definitions: &[LevelDefinition]) -> Result<Self, LevelError> {
        if definitions.is_empty() {
            return Err(LevelError::EmptyCampaign);
        }

        let levels = definitions
            .iter()
            .map(Level::from_definition)
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { levels })
    }

    /// Number of levels in the campaign.
    #[must_use]
    pub fn len(&self) -> usize {
        self.levels.len()
    }

    /// Reports whether the campaign has no levels; never true once built.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.levels.is_empty()
    }

    /// Level stored at the provided index.
    ///
    /// # Panics
    ///
    /// Panics when the index is out of range; the world always reduces
    /// indices modulo the campaign length before lookup.
    #[must_use]
    pub fn level(&self, index: usize) -> &Level {
        &self.levels[index]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn definition(grid: &[&str]) -> LevelDefinition {
        LevelDefinition {
            name: "test".to_owned(),
            grid: grid.iter().map(|row| (*row).to_owned()).collect(),
            keys: Vec::new(),
            doors: Vec::new(),
            levers: Vec::new(),
            enemies: Vec::new(),
            totems: Vec::new(),
        }
    }

    #[test]
    fn parses_start_and_exit_from_grid() {
        let level = Level::from_definition(&definition(&["#P#", "# #", "#E#"])).expect("level");
        assert_eq!(level.start(), GridPos::new(1, 0));
        assert_eq!(level.exit(), Some(GridPos::new(1, 2)));
        assert_eq!(level.width(), 3);
        assert_eq!(level.height(), 3);
    }

    #[test]
    fn missing_start_defaults_to_origin() {
        let level = Level::from_definition(&definition(&["   ", " E "])).expect("level");
        assert_eq!(level.start(), GridPos::new(0, 0));
    }

    #[test]
    fn walls_and_bounds_are_impassable() {
        let level = Level::from_definition(&definition(&["#P", " E"])).expect("level");
        assert!(!level.is_passable(GridPos::new(0, 0)));
        assert!(level.is_passable(GridPos::new(1, 0)));
        assert!(level.is_passable(GridPos::new(0, 1)));
        assert!(!level.is_passable(GridPos::new(2, 0)));
        assert!(!level.is_passable(GridPos::new(0, 2)));
    }

    #[test]
    fn ragged_grid_is_rejected() {
        let result = Level::from_definition(&definition(&["## ", "#"]));
        assert_eq!(result.err(), Some(LevelError::RaggedGrid { row: 1 }));
    }

    #[test]
    fn empty_grid_is_rejected() {
        assert_eq!(
            Level::from_definition(&definition(&[])).err(),
            Some(LevelError::EmptyGrid)
        );
    }

    #[test]
    fn empty_campaign_is_rejected() {
        assert_eq!(
            Campaign::from_definitions(&[]).err(),
            Some(LevelError::EmptyCampaign)
        );
    }

    #[test]
    fn level_definition_round_trips_through_json() {
        let json = r##"{
            "name": "glade",
            "grid": ["#P#", "# #", "#E#"],
            "keys": [{ "id": 1, "x": 1, "y": 1 }],
            "doors": [{ "id": 1, "x": 1, "y": 2, "latch": { "kind": "key", "key": 1 } }],
            "enemies": [
                { "id": 0, "x": 1, "y": 1, "behavior": "smart_active", "vision_range": 4 }
            ],
            "totems": [{ "id": 0, "x": 1, "y": 1, "direction": "left" }]
        }"##;
        let parsed: LevelDefinition = serde_json::from_str(json).expect("parse");
        let level = Level::from_definition(&parsed).expect("level");
        assert_eq!(level.keys().len(), 1);
        assert_eq!(level.doors().len(), 1);
        assert_eq!(
            level.doors()[0].latch(),
            DoorLatch::Key(glade_core::KeyId::new(1))
        );
        let spawn = level.enemy_spawns()[0];
        assert_eq!(spawn.behavior(), glade_core::EnemyBehavior::SmartActive);
        assert_eq!(spawn.move_interval(), Duration::from_millis(200));
    }
}
