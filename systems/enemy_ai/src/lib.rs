#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic enemy decision system.
//!
//! Decisions run on a fixed cadence, not on every simulation tick: elapsed
//! time accumulates until a full decision window has passed, then one pass
//! inspects each ready enemy, checks whether the player is visible, and
//! proposes at most one step or turn command per enemy. The world
//! re-validates every proposal, so planning against a snapshot is safe even
//! when earlier proposals in the same batch change the outcome.

use std::time::Duration;

use glade_core::{Command, Direction, EnemyBehavior, EnemyId, Event, GridPos, AI_DECISION_INTERVAL};
use glade_system_pathfinding::find_path;
use glade_world::query::{EnemyView, GameView};

/// Pure system that turns elapsed time into enemy step and turn commands.
#[derive(Debug, Default)]
pub struct EnemyAi {
    accumulator: Duration,
}

impl EnemyAi {
    /// Creates the system.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Consumes world events and the current snapshot to emit decisions.
    ///
    /// `is_cell_blocked` reports static blockers only: walls and doors that
    /// are still locked. Agent occupancy is read from the snapshot, because
    /// vision must ignore agents while movement planning must not.
    pub fn handle<F>(
        &mut self,
        events: &[Event],
        view: &GameView,
        is_cell_blocked: F,
        out: &mut Vec<Command>,
    ) where
        F: Fn(GridPos) -> bool,
    {
        for event in events {
            if let Event::TimeAdvanced { dt } = event {
                self.accumulator = self.accumulator.saturating_add(*dt);
            }
        }
        if view.is_player_dead || view.game_won {
            return;
        }
        if self.accumulator < AI_DECISION_INTERVAL {
            return;
        }
        self.accumulator = Duration::ZERO;

        let player_cell = view.player.resolved_position;

        for enemy in &view.enemies {
            if !enemy.is_alive || enemy.is_moving {
                continue;
            }
            let ready = enemy.last_decision.map_or(true, |last| {
                view.now.saturating_sub(last) >= enemy.move_interval
            });
            if !ready {
                continue;
            }
            if !sees_player(enemy, player_cell, view, &is_cell_blocked) {
                continue;
            }

            match enemy.behavior {
                EnemyBehavior::Static => {}
                EnemyBehavior::Sentinel => watch_player(enemy, player_cell, out),
                EnemyBehavior::Active => chase_directly(enemy, player_cell, out),
                EnemyBehavior::SmartActive => {
                    chase_along_path(enemy, player_cell, view, &is_cell_blocked, out);
                }
            }
        }
    }
}

/// Line-of-movement vision: the player is seen when a path no longer than
/// the enemy's vision range exists through walls and locked doors, ignoring
/// all agents.
fn sees_player<F>(enemy: &EnemyView, player_cell: GridPos, view: &GameView, is_cell_blocked: &F) -> bool
where
    F: Fn(GridPos) -> bool,
{
    let path = find_path(
        enemy.resolved_position,
        player_cell,
        view.width,
        view.height,
        |cell| !is_cell_blocked(cell),
    );
    if path.is_empty() {
        return false;
    }
    (path.len() - 1) as u32 <= enemy.vision_range
}

/// Sentinels never move; they only pivot to track the player.
fn watch_player(enemy: &EnemyView, player_cell: GridPos, out: &mut Vec<Command>) {
    let Some(direction) = dominant_axis_direction(enemy.resolved_position, player_cell) else {
        return;
    };
    if direction != enemy.facing {
        out.push(Command::TurnEnemy {
            enemy: enemy.id,
            direction,
        });
    }
}

/// Steps greedily along the dominant axis toward the player, letting the
/// world reject steps into walls or occupied cells.
fn chase_directly(enemy: &EnemyView, player_cell: GridPos, out: &mut Vec<Command>) {
    let Some(direction) = dominant_axis_direction(enemy.resolved_position, player_cell) else {
        return;
    };
    out.push(Command::StepEnemy {
        enemy: enemy.id,
        direction,
    });
}

/// Steps along a shortest path that routes around walls, locked doors, and
/// the cells held by other live enemies. The player's own cell stays
/// walkable so an adjacent enemy can propose the catching step.
fn chase_along_path<F>(
    enemy: &EnemyView,
    player_cell: GridPos,
    view: &GameView,
    is_cell_blocked: &F,
    out: &mut Vec<Command>,
) where
    F: Fn(GridPos) -> bool,
{
    let path = find_path(
        enemy.resolved_position,
        player_cell,
        view.width,
        view.height,
        |cell| {
            cell == player_cell
                || (!is_cell_blocked(cell) && !cell_held_by_other_enemy(view, cell, enemy.id))
        },
    );
    if path.len() < 2 {
        return;
    }
    let Some(direction) = enemy.resolved_position.direction_to(path[1]) else {
        return;
    };
    out.push(Command::StepEnemy {
        enemy: enemy.id,
        direction,
    });
}

fn cell_held_by_other_enemy(view: &GameView, cell: GridPos, except: EnemyId) -> bool {
    view.enemies.iter().any(|other| {
        other.is_alive
            && other.id != except
            && (other.position == cell || (other.is_moving && other.start_position == cell))
    })
}

/// Direction along the axis with the larger displacement toward `to`;
/// vertical wins ties. `None` when the cells coincide.
fn dominant_axis_direction(from: GridPos, to: GridPos) -> Option<Direction> {
    let dx = from.x().abs_diff(to.x());
    let dy = from.y().abs_diff(to.y());
    if dx == 0 && dy == 0 {
        return None;
    }

    if dx > dy {
        if to.x() > from.x() {
            Some(Direction::Right)
        } else {
            Some(Direction::Left)
        }
    } else if to.y() > from.y() {
        Some(Direction::Down)
    } else {
        Some(Direction::Up)
    }
}
