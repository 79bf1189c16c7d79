//! ASCII projection of a level snapshot for terminal frames.

use glade_core::{GridPos, CELL_SIZE};
use glade_world::query::GameView;
use glade_world::{DoorLatch, Level};

/// Renders the level grid with every entity overlaid as a single glyph.
pub(crate) fn frame(level: &Level, view: &GameView) -> String {
    let mut rows: Vec<Vec<char>> = (0..level.height())
        .map(|y| {
            (0..level.width())
                .map(|x| {
                    if level.is_passable(GridPos::new(x, y)) {
                        '.'
                    } else {
                        '#'
                    }
                })
                .collect()
        })
        .collect();

    if let Some(exit) = level.exit() {
        put(&mut rows, exit, 'E');
    }
    for key in level.keys() {
        if !view.keys_held.contains(&key.id()) && !key_spent(level, view, key) {
            put(&mut rows, key.cell(), 'k');
        }
    }
    for door in level.doors() {
        let glyph = if view.doors_unlocked.contains(&door.id()) {
            'd'
        } else {
            'D'
        };
        put(&mut rows, door.cell(), glyph);
    }
    for lever in level.levers() {
        let glyph = if view.levers_pulled.contains(&lever.id()) {
            'l'
        } else {
            'L'
        };
        put(&mut rows, lever.cell(), glyph);
    }
    for totem in &view.totems {
        put(&mut rows, totem.cell, 'T');
    }
    for projectile in &view.projectiles {
        let x = projectile.position.x();
        let y = projectile.position.y();
        if x >= 0.0 && y >= 0.0 {
            put(
                &mut rows,
                GridPos::new((x / CELL_SIZE) as u32, (y / CELL_SIZE) as u32),
                '*',
            );
        }
    }
    for enemy in &view.enemies {
        if enemy.is_alive {
            put(&mut rows, enemy.resolved_position, 'e');
        }
    }
    put(&mut rows, view.player.resolved_position, '@');

    let mut frame = String::new();
    for row in rows {
        frame.extend(row);
        frame.push('\n');
    }
    frame.push_str(&summary(view));
    frame
}

/// One-line status readout for the current attempt.
pub(crate) fn summary(view: &GameView) -> String {
    let status = if view.game_won {
        "won"
    } else if view.is_player_dead {
        "dead"
    } else {
        "alive"
    };
    format!(
        "t={:.1}s level={} moves={} keys={} status={status}",
        view.now.as_secs_f32(),
        view.level_index,
        view.move_count,
        view.keys_held.len(),
    )
}

fn key_spent(level: &Level, view: &GameView, key: &glade_world::Key) -> bool {
    level.doors().iter().any(|door| {
        door.latch() == DoorLatch::Key(key.id()) && view.doors_unlocked.contains(&door.id())
    })
}

fn put(rows: &mut [Vec<char>], cell: GridPos, glyph: char) {
    if let Some(row) = rows.get_mut(cell.y() as usize) {
        if let Some(slot) = row.get_mut(cell.x() as usize) {
            *slot = glyph;
        }
    }
}
