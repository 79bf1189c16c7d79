//! Read-only snapshot access to the world for systems and adapters.
//!
//! Views are plain data copied out of the world at call time. Collections
//! are ordered by entity id so systems iterate deterministically.

use std::collections::BTreeSet;
use std::time::Duration;

use glade_core::{
    Direction, DoorId, EnemyBehavior, EnemyId, GridPos, KeyId, LeverId, PixelPos, ProjectileId,
    TotemId,
};

use crate::level::Level;
use crate::{movement, World};

/// Full snapshot of the live level attempt.
#[derive(Clone, Debug)]
pub struct GameView {
    /// Current simulation clock.
    pub now: Duration,
    /// Campaign index of the loaded level.
    pub level_index: usize,
    /// Number of columns in the level grid.
    pub width: u32,
    /// Number of rows in the level grid.
    pub height: u32,
    /// Snapshot of the player.
    pub player: PlayerView,
    /// Snapshots of every enemy, dead or alive, ordered by id.
    pub enemies: Vec<EnemyView>,
    /// Snapshots of every in-flight projectile, ordered by id.
    pub projectiles: Vec<ProjectileView>,
    /// Snapshots of every totem, in level definition order.
    pub totems: Vec<TotemView>,
    /// Keys currently carried by the player.
    pub keys_held: BTreeSet<KeyId>,
    /// Doors that have been permanently unlocked this attempt.
    pub doors_unlocked: BTreeSet<DoorId>,
    /// Levers that have been pulled this attempt.
    pub levers_pulled: BTreeSet<LeverId>,
    /// Number of steps the player has committed this attempt.
    pub move_count: u32,
    /// Whether the player has died this attempt.
    pub is_player_dead: bool,
    /// Whether the player has reached the exit this attempt.
    pub game_won: bool,
}

/// Snapshot of the player agent.
#[derive(Clone, Copy, Debug)]
pub struct PlayerView {
    /// Committed cell; the destination while a step is in flight.
    pub position: GridPos,
    /// Origin cell of the current or most recent step.
    pub start_position: GridPos,
    /// Cell the player should be treated as standing on for interactions.
    pub resolved_position: GridPos,
    /// Interpolated pixel-space position.
    pub pixel: PixelPos,
    /// Direction of the most recent step attempt.
    pub facing: Direction,
    /// Whether a step interpolation is currently in flight.
    pub is_moving: bool,
}

/// Snapshot of one enemy agent.
#[derive(Clone, Copy, Debug)]
pub struct EnemyView {
    /// Identifier of the enemy.
    pub id: EnemyId,
    /// Disposition driving the enemy's decisions.
    pub behavior: EnemyBehavior,
    /// Maximum path distance at which the enemy sees the player.
    pub vision_range: u32,
    /// Minimum simulated time between two decisions by this enemy.
    pub move_interval: Duration,
    /// Committed cell; the destination while a step is in flight.
    pub position: GridPos,
    /// Origin cell of the current or most recent step.
    pub start_position: GridPos,
    /// Cell the enemy should be treated as standing on for interactions.
    pub resolved_position: GridPos,
    /// Interpolated pixel-space position.
    pub pixel: PixelPos,
    /// Direction the enemy is facing.
    pub facing: Direction,
    /// Whether a step interpolation is currently in flight.
    pub is_moving: bool,
    /// Clock reading of the enemy's most recent decision, if any.
    pub last_decision: Option<Duration>,
    /// Whether the enemy is still alive.
    pub is_alive: bool,
}

/// Snapshot of one in-flight projectile.
#[derive(Clone, Copy, Debug)]
pub struct ProjectileView {
    /// Identifier of the projectile.
    pub id: ProjectileId,
    /// Current pixel-space position.
    pub position: PixelPos,
    /// Fixed direction of travel.
    pub direction: Direction,
    /// Totem that fired the projectile.
    pub source: TotemId,
}

/// Snapshot of one totem.
#[derive(Clone, Copy, Debug)]
pub struct TotemView {
    /// Identifier of the totem.
    pub id: TotemId,
    /// Cell the totem occupies.
    pub cell: GridPos,
    /// Fixed cardinal direction the totem fires along.
    pub direction: Direction,
    /// Clock reading of the totem's most recent shot.
    pub last_shot: Duration,
}

/// Captures a full snapshot of the live level attempt.
#[must_use]
pub fn game_view(world: &World) -> GameView {
    let state = &world.state;
    let level = level(world);

    GameView {
        now: state.now,
        level_index: state.level_index,
        width: level.width(),
        height: level.height(),
        player: PlayerView {
            position: state.player.position,
            start_position: state.player.start_position,
            resolved_position: movement::resolved_player_position(state),
            pixel: state.player.pixel,
            facing: state.player.facing,
            is_moving: state.player.is_moving,
        },
        enemies: state
            .enemies
            .iter()
            .map(|enemy| EnemyView {
                id: enemy.id,
                behavior: enemy.behavior,
                vision_range: enemy.vision_range,
                move_interval: enemy.move_interval,
                position: enemy.position,
                start_position: enemy.start_position,
                resolved_position: if enemy.is_moving {
                    enemy.start_position
                } else {
                    enemy.position
                },
                pixel: enemy.pixel,
                facing: enemy.facing,
                is_moving: enemy.is_moving,
                last_decision: enemy.last_move,
                is_alive: enemy.is_alive,
            })
            .collect(),
        projectiles: state
            .projectiles
            .iter()
            .map(|projectile| ProjectileView {
                id: projectile.id,
                position: projectile.position,
                direction: projectile.direction,
                source: projectile.source,
            })
            .collect(),
        totems: state
            .totems
            .iter()
            .map(|totem| TotemView {
                id: totem.id,
                cell: totem.cell,
                direction: totem.direction,
                last_shot: totem.last_shot,
            })
            .collect(),
        keys_held: state.keys_held.clone(),
        doors_unlocked: state.doors_unlocked.clone(),
        levers_pulled: state.levers_pulled.clone(),
        move_count: state.player.move_count,
        is_player_dead: state.is_player_dead,
        game_won: state.game_won,
    }
}

/// Static model of the currently loaded level.
#[must_use]
pub fn level(world: &World) -> &Level {
    world.campaign.level(world.state.level_index)
}

/// Campaign index of the currently loaded level.
#[must_use]
pub fn level_index(world: &World) -> usize {
    world.state.level_index
}

/// Number of levels in the campaign.
#[must_use]
pub fn campaign_len(world: &World) -> usize {
    world.campaign.len()
}

/// Current simulation clock.
#[must_use]
pub fn clock(world: &World) -> Duration {
    world.state.now
}

/// Unpulled lever underneath the player, if one exists.
#[must_use]
pub fn actionable_lever(world: &World) -> Option<LeverId> {
    let cell = movement::resolved_player_position(&world.state);
    let lever = level(world).lever_at(cell)?;
    if world.state.levers_pulled.contains(&lever.id()) {
        None
    } else {
        Some(lever.id())
    }
}
