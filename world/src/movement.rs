//! Step commitment, interpolation, and arrival resolution.
//!
//! All agent motion funnels through this module. A step is committed
//! instantly in grid space and then interpolated in pixel space over
//! [`STEP_DURATION`]; occupancy checks treat a mid-step agent as covering
//! both its origin and destination cells.

use std::time::Duration;

use glade_core::{
    DeathCause, Direction, EnemyId, Event, GridPos, KeyId, PixelPos, MOVE_COOLDOWN, STEP_DURATION,
};

use crate::level::{DoorLatch, Level};
use crate::GameState;

/// Cell an agent should be treated as standing on for interactions.
///
/// A mid-step agent still occupies its origin cell until the interpolation
/// completes.
pub(crate) fn resolved_player_position(state: &GameState) -> GridPos {
    if state.player.is_moving {
        state.player.start_position
    } else {
        state.player.position
    }
}

fn cell_blocked_by_enemy(state: &GameState, cell: GridPos, exclude: Option<EnemyId>) -> bool {
    state.enemies.iter().any(|enemy| {
        enemy.is_alive
            && Some(enemy.id) != exclude
            && (enemy.position == cell || (enemy.is_moving && enemy.start_position == cell))
    })
}

fn door_open_for_player(state: &GameState, level: &Level, cell: GridPos) -> bool {
    let Some(door) = level.door_at(cell) else {
        return true;
    };
    if state.doors_unlocked.contains(&door.id()) {
        return true;
    }
    match door.latch() {
        DoorLatch::Key(key) => state.keys_held.contains(&key),
        DoorLatch::Lever(_) => false,
    }
}

fn door_open_for_enemy(state: &GameState, level: &Level, cell: GridPos) -> bool {
    level
        .door_at(cell)
        .map_or(true, |door| state.doors_unlocked.contains(&door.id()))
}

/// Attempts to commit a single player step in the provided direction.
///
/// Rejection is silent: no event is emitted when the step is refused by the
/// cooldown, an in-flight step, a wall, a locked door, or an enemy-occupied
/// destination.
pub(crate) fn try_move_player(
    level: &Level,
    state: &mut GameState,
    direction: Direction,
    out: &mut Vec<Event>,
) {
    if state.is_player_dead || state.game_won || state.player.is_moving {
        return;
    }
    if let Some(last) = state.player.last_move {
        if state.now.saturating_sub(last) < MOVE_COOLDOWN {
            return;
        }
    }

    let from = state.player.position;
    let Some(dest) = from.step(direction) else {
        return;
    };
    if !level.is_passable(dest) {
        return;
    }
    if !door_open_for_player(state, level, dest) {
        return;
    }
    if cell_blocked_by_enemy(state, dest, None) {
        return;
    }

    let now = state.now;
    let player = &mut state.player;
    player.start_position = from;
    player.position = dest;
    player.facing = direction;
    player.is_moving = true;
    player.move_start = now;
    player.move_count += 1;
    out.push(Event::PlayerStepped { from, to: dest });
}

/// Attempts to commit a single enemy step in the provided direction.
///
/// Stepping into the player's resolved cell kills the player instead of
/// moving. Stepping into a cell held by another agent consumes the enemy's
/// turn without moving. Walls and locked doors reject the step outright.
pub(crate) fn step_enemy(
    level: &Level,
    state: &mut GameState,
    enemy_id: EnemyId,
    direction: Direction,
    out: &mut Vec<Event>,
) {
    if state.is_player_dead || state.game_won {
        return;
    }
    let Some(index) = state.enemies.iter().position(|enemy| enemy.id == enemy_id) else {
        return;
    };

    let (from, ready) = {
        let enemy = &state.enemies[index];
        if !enemy.is_alive || enemy.is_moving {
            return;
        }
        let ready = enemy
            .last_move
            .map_or(true, |last| state.now.saturating_sub(last) >= enemy.move_interval);
        (enemy.position, ready)
    };
    if !ready {
        return;
    }

    let Some(dest) = from.step(direction) else {
        return;
    };

    if dest == resolved_player_position(state) {
        let now = state.now;
        let enemy = &mut state.enemies[index];
        enemy.facing = direction;
        enemy.last_move = Some(now);
        kill_player(state, DeathCause::Caught { enemy: enemy_id }, out);
        return;
    }

    if !level.is_passable(dest) || !door_open_for_enemy(state, level, dest) {
        return;
    }

    if cell_blocked_by_enemy(state, dest, Some(enemy_id)) || dest == state.player.position {
        // The cell is held by another agent; the turn is spent anyway.
        let now = state.now;
        let enemy = &mut state.enemies[index];
        enemy.facing = direction;
        enemy.last_move = Some(now);
        return;
    }

    let now = state.now;
    let enemy = &mut state.enemies[index];
    enemy.start_position = from;
    enemy.position = dest;
    enemy.facing = direction;
    enemy.is_moving = true;
    enemy.move_start = now;
    enemy.last_move = Some(now);
    out.push(Event::EnemyStepped {
        enemy: enemy_id,
        from,
        to: dest,
    });
}

/// Turns an enemy in place, consuming its decision turn.
pub(crate) fn turn_enemy(
    state: &mut GameState,
    enemy_id: EnemyId,
    direction: Direction,
    out: &mut Vec<Event>,
) {
    if state.is_player_dead || state.game_won {
        return;
    }
    let now = state.now;
    let Some(enemy) = state.enemies.iter_mut().find(|enemy| enemy.id == enemy_id) else {
        return;
    };
    if !enemy.is_alive || enemy.is_moving || enemy.facing == direction {
        return;
    }
    let ready = enemy
        .last_move
        .map_or(true, |last| now.saturating_sub(last) >= enemy.move_interval);
    if !ready {
        return;
    }

    enemy.facing = direction;
    enemy.last_move = Some(now);
    out.push(Event::EnemyTurned {
        enemy: enemy_id,
        direction,
    });
}

/// Advances all in-flight step interpolations to the current clock.
///
/// Completing the player's step also resolves the arrival cell: key pickup,
/// key-door unlocking, and the exit check, in that order.
pub(crate) fn advance_animations(level: &Level, state: &mut GameState, out: &mut Vec<Event>) {
    let now = state.now;

    if state.player.is_moving {
        let progress = step_progress(now, state.player.move_start);
        let player = &mut state.player;
        player.pixel = PixelPos::lerp(
            player.start_position.to_pixel(),
            player.position.to_pixel(),
            progress,
        );
        if progress >= 1.0 {
            player.is_moving = false;
            player.start_position = player.position;
            player.pixel = player.position.to_pixel();
            // The cooldown window opens when the step finishes, not when
            // it was committed.
            player.last_move = Some(now);
            complete_player_step(level, state, out);
        }
    }

    for enemy in &mut state.enemies {
        if !enemy.is_alive || !enemy.is_moving {
            continue;
        }
        let progress = step_progress(now, enemy.move_start);
        enemy.pixel = PixelPos::lerp(
            enemy.start_position.to_pixel(),
            enemy.position.to_pixel(),
            progress,
        );
        if progress >= 1.0 {
            enemy.is_moving = false;
            enemy.start_position = enemy.position;
            enemy.pixel = enemy.position.to_pixel();
        }
    }
}

fn step_progress(now: Duration, move_start: Duration) -> f32 {
    let elapsed = now.saturating_sub(move_start);
    (elapsed.as_secs_f32() / STEP_DURATION.as_secs_f32()).clamp(0.0, 1.0)
}

fn complete_player_step(level: &Level, state: &mut GameState, out: &mut Vec<Event>) {
    let cell = state.player.position;

    if let Some(key) = level.key_at(cell) {
        let id = key.id();
        if !state.keys_held.contains(&id) && !key_spent(level, state, id) {
            let _ = state.keys_held.insert(id);
            out.push(Event::KeyCollected { key: id });
        }
    }

    if let Some(door) = level.door_at(cell) {
        if !state.doors_unlocked.contains(&door.id()) {
            if let DoorLatch::Key(key) = door.latch() {
                // Arriving on the door consumes the key.
                if state.keys_held.remove(&key) {
                    let _ = state.doors_unlocked.insert(door.id());
                    out.push(Event::DoorUnlocked { door: door.id() });
                }
            }
        }
    }

    if level.exit_at(cell) && !state.game_won {
        state.game_won = true;
        out.push(Event::LevelWon {
            index: state.level_index,
        });
    }
}

fn key_spent(level: &Level, state: &GameState, key: KeyId) -> bool {
    level.doors().iter().any(|door| {
        door.latch() == DoorLatch::Key(key) && state.doors_unlocked.contains(&door.id())
    })
}

/// Marks the player dead exactly once and halts any in-flight step.
pub(crate) fn kill_player(state: &mut GameState, cause: DeathCause, out: &mut Vec<Event>) {
    if state.is_player_dead || state.game_won {
        return;
    }
    state.is_player_dead = true;
    state.player.is_moving = false;
    out.push(Event::PlayerDied { cause });
}
