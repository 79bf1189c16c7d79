#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Core contracts shared across the Glade engine.
//!
//! This crate defines the message surface that connects adapters, the
//! authoritative world, and pure systems. Adapters and systems submit
//! [`Command`] values describing desired mutations, the world executes those
//! commands via its `apply` entry point, and then broadcasts [`Event`] values
//! for systems to react to deterministically. Systems consume event streams,
//! query immutable snapshots, and respond exclusively with new command
//! batches.

use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Side length of a single square grid cell measured in pixels.
pub const CELL_SIZE: f32 = 48.0;

/// Duration of one discrete grid step animation.
pub const STEP_DURATION: Duration = Duration::from_millis(150);

/// Minimum simulated time between two committed player steps.
pub const MOVE_COOLDOWN: Duration = Duration::from_millis(200);

/// Cadence at which enemy decisions are issued by the AI system.
pub const AI_DECISION_INTERVAL: Duration = Duration::from_millis(200);

/// Cadence at which a held direction is re-submitted to the world.
pub const INPUT_REPEAT_INTERVAL: Duration = Duration::from_millis(100);

/// Minimum simulated time between two projectiles fired by one totem.
pub const FIRE_INTERVAL: Duration = Duration::from_millis(1200);

/// Projectile flight speed in pixels per second of simulated time.
pub const PROJECTILE_SPEED: f32 = 180.0;

/// Collision radius of the player hitbox in pixels.
pub const PLAYER_RADIUS: f32 = 18.0;

/// Collision radius of an enemy hitbox in pixels.
pub const ENEMY_RADIUS: f32 = 18.0;

/// Collision radius of a projectile hitbox in pixels.
pub const PROJECTILE_RADIUS: f32 = 10.0;

/// Delay between the player dying and the automatic level reset.
pub const DEATH_RESET_DELAY: Duration = Duration::from_millis(1500);

/// Delay between winning a level and advancing to the next one.
pub const WIN_ADVANCE_DELAY: Duration = Duration::from_millis(2000);

/// Commands that express all permissible world mutations.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Command {
    /// Advances the simulation clock by the provided delta time.
    Tick {
        /// Duration of simulated time that elapsed since the previous tick.
        dt: Duration,
    },
    /// Requests that the player advance a single step in a direction.
    MovePlayer {
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Requests that an enemy advance a single step in a direction.
    StepEnemy {
        /// Identifier of the enemy attempting to move.
        enemy: EnemyId,
        /// Direction of travel for the attempted step.
        direction: Direction,
    },
    /// Requests that an enemy turn in place without moving.
    TurnEnemy {
        /// Identifier of the enemy changing its facing.
        enemy: EnemyId,
        /// Facing the enemy should adopt.
        direction: Direction,
    },
    /// Requests activation of the lever underneath the player.
    PullLever {
        /// Identifier of the lever being pulled.
        lever: LeverId,
    },
    /// Loads the level at the provided campaign index, replacing all state.
    LoadLevel {
        /// Zero-based index into the campaign's level list.
        index: usize,
    },
    /// Rebuilds the current level from scratch, discarding all progress.
    ResetLevel,
    /// Advances to the next level, wrapping to the first after the last.
    AdvanceLevel,
}

/// Events broadcast by the world after processing commands.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Event {
    /// Indicates that the simulation clock advanced.
    TimeAdvanced {
        /// Duration of simulated time that elapsed in the tick.
        dt: Duration,
    },
    /// Confirms that the player committed a step between two cells.
    PlayerStepped {
        /// Cell the player occupied before the step.
        from: GridPos,
        /// Cell the player occupies once the step completes.
        to: GridPos,
    },
    /// Confirms that an enemy committed a step between two cells.
    EnemyStepped {
        /// Identifier of the enemy that stepped.
        enemy: EnemyId,
        /// Cell the enemy occupied before the step.
        from: GridPos,
        /// Cell the enemy occupies once the step completes.
        to: GridPos,
    },
    /// Confirms that an enemy changed facing without moving.
    EnemyTurned {
        /// Identifier of the enemy that turned.
        enemy: EnemyId,
        /// Facing the enemy adopted.
        direction: Direction,
    },
    /// Announces that the player picked up a key.
    KeyCollected {
        /// Identifier of the collected key.
        key: KeyId,
    },
    /// Announces that a door was permanently unlocked.
    DoorUnlocked {
        /// Identifier of the unlocked door.
        door: DoorId,
    },
    /// Announces that a lever was pulled by the player.
    LeverPulled {
        /// Identifier of the pulled lever.
        lever: LeverId,
    },
    /// Announces that a totem fired a projectile.
    ProjectileFired {
        /// Identifier assigned to the new projectile.
        projectile: ProjectileId,
        /// Totem that fired the projectile.
        totem: TotemId,
    },
    /// Announces that a projectile left play without harming the player.
    ProjectileRemoved {
        /// Identifier of the removed projectile.
        projectile: ProjectileId,
    },
    /// Announces that a projectile struck and killed an enemy.
    EnemyKilled {
        /// Identifier of the slain enemy.
        enemy: EnemyId,
        /// Projectile responsible for the kill.
        projectile: ProjectileId,
    },
    /// Announces the player's death for the current level attempt.
    PlayerDied {
        /// What killed the player.
        cause: DeathCause,
    },
    /// Announces that the player reached the exit of the current level.
    LevelWon {
        /// Campaign index of the level that was won.
        index: usize,
    },
    /// Announces that a level was completed, for persistence consumers.
    LevelCompleted {
        /// Campaign index of the completed level.
        index: usize,
    },
    /// Announces that a fresh level instance replaced the previous state.
    LevelLoaded {
        /// Campaign index of the freshly loaded level.
        index: usize,
    },
}

/// What ended the player's current level attempt.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DeathCause {
    /// An adjacent enemy caught the player.
    Caught {
        /// Identifier of the catching enemy.
        enemy: EnemyId,
    },
    /// A projectile struck the player.
    Shot {
        /// Identifier of the striking projectile.
        projectile: ProjectileId,
    },
}

/// Cardinal movement directions available to the player and enemies.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Movement toward decreasing row indices.
    Up,
    /// Movement toward increasing row indices.
    Down,
    /// Movement toward decreasing column indices.
    Left,
    /// Movement toward increasing column indices.
    Right,
}

impl Direction {
    /// All directions in the canonical exploration order used by search.
    pub const ALL: [Direction; 4] = [
        Direction::Up,
        Direction::Down,
        Direction::Left,
        Direction::Right,
    ];
}

/// Closed set of enemy dispositions understood by the AI system.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EnemyBehavior {
    /// Never moves and never reacts to the player.
    Static,
    /// Never moves but turns to face a player it can see.
    Sentinel,
    /// Pursues a seen player along the dominant axis, ignoring obstacles.
    Active,
    /// Pursues a seen player along a shortest path around obstacles.
    SmartActive,
}

/// Location of a single grid cell expressed as column and row coordinates.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GridPos {
    x: u32,
    y: u32,
}

impl GridPos {
    /// Creates a new grid position.
    #[must_use]
    pub const fn new(x: u32, y: u32) -> Self {
        Self { x, y }
    }

    /// Zero-based column index of the cell.
    #[must_use]
    pub const fn x(&self) -> u32 {
        self.x
    }

    /// Zero-based row index of the cell.
    #[must_use]
    pub const fn y(&self) -> u32 {
        self.y
    }

    /// Neighboring cell one step in the provided direction, when it exists.
    ///
    /// Stepping above row zero or left of column zero yields `None`; bounds
    /// on the far edges are the level model's concern.
    #[must_use]
    pub fn step(self, direction: Direction) -> Option<GridPos> {
        match direction {
            Direction::Up => self.y.checked_sub(1).map(|y| GridPos::new(self.x, y)),
            Direction::Down => self.y.checked_add(1).map(|y| GridPos::new(self.x, y)),
            Direction::Left => self.x.checked_sub(1).map(|x| GridPos::new(x, self.y)),
            Direction::Right => self.x.checked_add(1).map(|x| GridPos::new(x, self.y)),
        }
    }

    /// Computes the Manhattan distance between two grid positions.
    #[must_use]
    pub fn manhattan_distance(self, other: GridPos) -> u32 {
        self.x.abs_diff(other.x) + self.y.abs_diff(other.y)
    }

    /// Projects the cell onto its center point in pixel space.
    #[must_use]
    pub fn to_pixel(self) -> PixelPos {
        PixelPos::new(
            self.x as f32 * CELL_SIZE + CELL_SIZE / 2.0,
            self.y as f32 * CELL_SIZE + CELL_SIZE / 2.0,
        )
    }

    /// Direction of the single-cell step from `self` to `to`, if adjacent.
    #[must_use]
    pub fn direction_to(self, to: GridPos) -> Option<Direction> {
        if self.manhattan_distance(to) != 1 {
            return None;
        }

        if to.x > self.x {
            Some(Direction::Right)
        } else if to.x < self.x {
            Some(Direction::Left)
        } else if to.y > self.y {
            Some(Direction::Down)
        } else {
            Some(Direction::Up)
        }
    }
}

/// Continuous pixel-space coordinate used for animation and collision.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PixelPos {
    x: f32,
    y: f32,
}

impl PixelPos {
    /// Creates a new pixel position.
    #[must_use]
    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    /// Horizontal pixel coordinate.
    #[must_use]
    pub const fn x(&self) -> f32 {
        self.x
    }

    /// Vertical pixel coordinate.
    #[must_use]
    pub const fn y(&self) -> f32 {
        self.y
    }

    /// Linear blend between two pixel positions at the provided progress.
    #[must_use]
    pub fn lerp(from: PixelPos, to: PixelPos, progress: f32) -> PixelPos {
        let t = progress.clamp(0.0, 1.0);
        PixelPos::new(from.x + (to.x - from.x) * t, from.y + (to.y - from.y) * t)
    }

    /// Squared Euclidean distance to another pixel position.
    #[must_use]
    pub fn distance_squared(self, other: PixelPos) -> f32 {
        let dx = self.x - other.x;
        let dy = self.y - other.y;
        dx * dx + dy * dy
    }

    /// Reports whether two circular hitboxes overlap.
    #[must_use]
    pub fn circles_overlap(self, other: PixelPos, radius_sum: f32) -> bool {
        self.distance_squared(other) < radius_sum * radius_sum
    }
}

macro_rules! entity_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(
            Clone,
            Copy,
            Debug,
            PartialEq,
            Eq,
            Hash,
            PartialOrd,
            Ord,
            Serialize,
            Deserialize,
        )]
        pub struct $name(u32);

        impl $name {
            /// Creates a new identifier with the provided numeric value.
            #[must_use]
            pub const fn new(value: u32) -> Self {
                Self(value)
            }

            /// Retrieves the numeric representation of the identifier.
            #[must_use]
            pub const fn get(&self) -> u32 {
                self.0
            }
        }
    };
}

entity_id!(
    /// Unique identifier assigned to an enemy within a level.
    EnemyId
);
entity_id!(
    /// Unique identifier assigned to a key within a level.
    KeyId
);
entity_id!(
    /// Unique identifier assigned to a door within a level.
    DoorId
);
entity_id!(
    /// Unique identifier assigned to a lever within a level.
    LeverId
);
entity_id!(
    /// Unique identifier assigned to a totem within a level.
    TotemId
);
entity_id!(
    /// Unique identifier assigned to a projectile within a level attempt.
    ProjectileId
);

/// Error surfaced by a [`PersistencePort`] implementation.
pub type PersistenceError = Box<dyn std::error::Error + Send + Sync>;

/// Host-provided key-value store for the last completed level index.
///
/// The engine only emits the intent ([`Event::LevelCompleted`]); a host
/// adapter owns the storage format and failure handling. Port failures must
/// never corrupt in-memory game state.
pub trait PersistencePort {
    /// Reads the last completed level index, if one was ever stored.
    fn load_last_level(&self) -> Result<Option<usize>, PersistenceError>;

    /// Stores the last completed level index.
    fn store_last_level(&mut self, index: usize) -> Result<(), PersistenceError>;
}

#[cfg(test)]
mod tests {
    use super::{Direction, DoorId, EnemyBehavior, EnemyId, GridPos, KeyId, PixelPos, CELL_SIZE};
    use serde::{de::DeserializeOwned, Serialize};

    #[test]
    fn manhattan_distance_matches_expectation() {
        let origin = GridPos::new(1, 1);
        let destination = GridPos::new(4, 3);
        assert_eq!(origin.manhattan_distance(destination), 5);
        assert_eq!(destination.manhattan_distance(origin), 5);
    }

    #[test]
    fn step_respects_grid_origin() {
        let corner = GridPos::new(0, 0);
        assert_eq!(corner.step(Direction::Up), None);
        assert_eq!(corner.step(Direction::Left), None);
        assert_eq!(corner.step(Direction::Down), Some(GridPos::new(0, 1)));
        assert_eq!(corner.step(Direction::Right), Some(GridPos::new(1, 0)));
    }

    #[test]
    fn direction_to_covers_all_neighbors() {
        let origin = GridPos::new(3, 3);
        assert_eq!(origin.direction_to(GridPos::new(3, 2)), Some(Direction::Up));
        assert_eq!(
            origin.direction_to(GridPos::new(3, 4)),
            Some(Direction::Down)
        );
        assert_eq!(
            origin.direction_to(GridPos::new(2, 3)),
            Some(Direction::Left)
        );
        assert_eq!(
            origin.direction_to(GridPos::new(4, 3)),
            Some(Direction::Right)
        );
        assert_eq!(origin.direction_to(origin), None);
        assert_eq!(origin.direction_to(GridPos::new(5, 3)), None);
    }

    #[test]
    fn pixel_projection_targets_cell_center() {
        let pixel = GridPos::new(2, 1).to_pixel();
        assert_eq!(pixel.x(), 2.0 * CELL_SIZE + CELL_SIZE / 2.0);
        assert_eq!(pixel.y(), CELL_SIZE + CELL_SIZE / 2.0);
    }

    #[test]
    fn lerp_clamps_progress() {
        let from = PixelPos::new(0.0, 0.0);
        let to = PixelPos::new(10.0, 20.0);
        assert_eq!(PixelPos::lerp(from, to, -1.0), from);
        assert_eq!(PixelPos::lerp(from, to, 2.0), to);
        assert_eq!(PixelPos::lerp(from, to, 0.5), PixelPos::new(5.0, 10.0));
    }

    #[test]
    fn circle_overlap_is_strict() {
        let a = PixelPos::new(0.0, 0.0);
        let b = PixelPos::new(28.0, 0.0);
        assert!(!a.circles_overlap(b, 28.0));
        assert!(a.circles_overlap(b, 28.1));
    }

    fn assert_round_trip<T>(value: &T)
    where
        T: Serialize + DeserializeOwned + PartialEq + std::fmt::Debug,
    {
        let bytes = bincode::serialize(value).expect("serialize");
        let restored: T = bincode::deserialize(&bytes).expect("deserialize");
        assert_eq!(&restored, value);
    }

    #[test]
    fn entity_ids_round_trip_through_bincode() {
        assert_round_trip(&EnemyId::new(7));
        assert_round_trip(&KeyId::new(1));
        assert_round_trip(&DoorId::new(3));
    }

    #[test]
    fn grid_pos_round_trips_through_bincode() {
        assert_round_trip(&GridPos::new(5, 7));
    }

    #[test]
    fn behavior_round_trips_through_bincode() {
        assert_round_trip(&EnemyBehavior::SmartActive);
    }
}
