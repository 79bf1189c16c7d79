//! Totem firing cadence, projectile flight, and projectile collisions.

use std::time::Duration;

use glade_core::{
    DeathCause, Direction, Event, GridPos, PixelPos, ProjectileId, CELL_SIZE, ENEMY_RADIUS,
    FIRE_INTERVAL, PLAYER_RADIUS, PROJECTILE_RADIUS, PROJECTILE_SPEED,
};

use crate::level::Level;
use crate::{movement, GameState, ProjectileState};

/// Runs one projectile phase: fire ready totems, advance every projectile,
/// resolve enemy hits and despawns, then check the player.
///
/// Enemy hits are resolved in the same pass as movement, so a projectile can
/// never pass through an enemy and strike the player behind it.
pub(crate) fn advance(level: &Level, state: &mut GameState, dt: Duration, out: &mut Vec<Event>) {
    fire_ready_totems(state, out);
    advance_in_flight(level, state, dt, out);
    resolve_player_hit(state, out);
}

fn fire_ready_totems(state: &mut GameState, out: &mut Vec<Event>) {
    let GameState {
        now,
        totems,
        projectiles,
        next_projectile_id,
        ..
    } = state;

    for totem in totems.iter_mut() {
        if now.saturating_sub(totem.last_shot) <= FIRE_INTERVAL {
            continue;
        }
        let id = ProjectileId::new(*next_projectile_id);
        *next_projectile_id += 1;
        totem.last_shot = *now;
        projectiles.push(ProjectileState {
            id,
            position: totem.cell.to_pixel(),
            direction: totem.direction,
            source: totem.id,
        });
        out.push(Event::ProjectileFired {
            projectile: id,
            totem: totem.id,
        });
    }
}

fn advance_in_flight(level: &Level, state: &mut GameState, dt: Duration, out: &mut Vec<Event>) {
    let distance = PROJECTILE_SPEED * dt.as_secs_f32();
    let mut in_flight = std::mem::take(&mut state.projectiles);
    let mut survivors = Vec::with_capacity(in_flight.len());

    for mut projectile in in_flight.drain(..) {
        projectile.position = displace(projectile.position, projectile.direction, distance);

        let struck = state.enemies.iter_mut().find(|enemy| {
            enemy.is_alive
                && projectile
                    .position
                    .circles_overlap(enemy.pixel, ENEMY_RADIUS + PROJECTILE_RADIUS)
        });
        if let Some(enemy) = struck {
            enemy.is_alive = false;
            out.push(Event::EnemyKilled {
                enemy: enemy.id,
                projectile: projectile.id,
            });
            out.push(Event::ProjectileRemoved {
                projectile: projectile.id,
            });
            continue;
        }

        if !in_passable_cell(level, projectile.position) {
            out.push(Event::ProjectileRemoved {
                projectile: projectile.id,
            });
            continue;
        }

        survivors.push(projectile);
    }

    state.projectiles = survivors;
}

fn displace(position: PixelPos, direction: Direction, distance: f32) -> PixelPos {
    match direction {
        Direction::Up => PixelPos::new(position.x(), position.y() - distance),
        Direction::Down => PixelPos::new(position.x(), position.y() + distance),
        Direction::Left => PixelPos::new(position.x() - distance, position.y()),
        Direction::Right => PixelPos::new(position.x() + distance, position.y()),
    }
}

fn in_passable_cell(level: &Level, position: PixelPos) -> bool {
    if position.x() < 0.0 || position.y() < 0.0 {
        return false;
    }
    let cell = GridPos::new(
        (position.x() / CELL_SIZE) as u32,
        (position.y() / CELL_SIZE) as u32,
    );
    level.is_passable(cell)
}

fn resolve_player_hit(state: &mut GameState, out: &mut Vec<Event>) {
    if state.is_player_dead || state.game_won {
        return;
    }
    let player_pixel = state.player.pixel;
    let Some(index) = state.projectiles.iter().position(|projectile| {
        projectile
            .position
            .circles_overlap(player_pixel, PLAYER_RADIUS + PROJECTILE_RADIUS)
    }) else {
        return;
    };

    let projectile = state.projectiles.remove(index);
    out.push(Event::ProjectileRemoved {
        projectile: projectile.id,
    });
    movement::kill_player(
        state,
        DeathCause::Shot {
            projectile: projectile.id,
        },
        out,
    );
}
