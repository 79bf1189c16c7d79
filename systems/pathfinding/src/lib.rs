#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Deterministic breadth-first pathfinding over 4-connected grids.
//!
//! The search honors dynamic blockers supplied by the caller through a
//! closure, so the same function serves both movement planning (which must
//! respect other agents) and vision checks (which must not).

use std::collections::VecDeque;

use glade_core::{Direction, GridPos};

/// Finds the shortest path from `start` to `goal` by edge count.
///
/// Neighbors are explored in the fixed order up, down, left, right, which
/// makes the first-discovered tie-break deterministic. The returned path
/// includes `start` as its first element; callers consume the second element
/// as the next step. Returns `[start]` when `start == goal` and an empty
/// vector when the goal is unreachable. `is_walkable` is consulted for every
/// candidate cell except `start` itself.
#[must_use]
pub fn find_path<F>(
    start: GridPos,
    goal: GridPos,
    width: u32,
    height: u32,
    mut is_walkable: F,
) -> Vec<GridPos>
where
    F: FnMut(GridPos) -> bool,
{
    if start == goal {
        return vec![start];
    }

    if !in_bounds(start, width, height) || !in_bounds(goal, width, height) {
        return Vec::new();
    }

    let width_usize = usize::try_from(width).unwrap_or(0);
    let height_usize = usize::try_from(height).unwrap_or(0);
    let Some(cell_count) = width_usize.checked_mul(height_usize) else {
        return Vec::new();
    };
    if cell_count == 0 {
        return Vec::new();
    }

    let mut parents: Vec<Option<GridPos>> = vec![None; cell_count];
    let mut visited = vec![false; cell_count];
    let mut queue = VecDeque::new();

    if let Some(start_index) = index(width_usize, start) {
        visited[start_index] = true;
    }
    queue.push_back(start);

    while let Some(cell) = queue.pop_front() {
        for direction in Direction::ALL {
            let Some(neighbor) = cell.step(direction) else {
                continue;
            };
            if !in_bounds(neighbor, width, height) {
                continue;
            }
            let Some(neighbor_index) = index(width_usize, neighbor) else {
                continue;
            };
            if visited[neighbor_index] {
                continue;
            }
            if !is_walkable(neighbor) {
                continue;
            }

            visited[neighbor_index] = true;
            parents[neighbor_index] = Some(cell);

            if neighbor == goal {
                return reconstruct(&parents, width_usize, start, goal);
            }

            queue.push_back(neighbor);
        }
    }

    Vec::new()
}

fn reconstruct(
    parents: &[Option<GridPos>],
    width: usize,
    start: GridPos,
    goal: GridPos,
) -> Vec<GridPos> {
    let mut path = vec![goal];
    let mut cursor = goal;

    while cursor != start {
        let Some(parent) = index(width, cursor).and_then(|i| parents.get(i).copied().flatten())
        else {
            return Vec::new();
        };
        path.push(parent);
        cursor = parent;
    }

    path.reverse();
    path
}

fn in_bounds(cell: GridPos, width: u32, height: u32) -> bool {
    cell.x() < width && cell.y() < height
}

fn index(width: usize, cell: GridPos) -> Option<usize> {
    let x = usize::try_from(cell.x()).ok()?;
    let y = usize::try_from(cell.y()).ok()?;
    y.checked_mul(width)?.checked_add(x)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn open(_: GridPos) -> bool {
        true
    }

    #[test]
    fn trivial_path_contains_only_start() {
        let cell = GridPos::new(2, 2);
        assert_eq!(find_path(cell, cell, 5, 5, open), vec![cell]);
    }

    #[test]
    fn straight_corridor_yields_shortest_path() {
        let path = find_path(GridPos::new(0, 0), GridPos::new(3, 0), 4, 1, open);
        assert_eq!(
            path,
            vec![
                GridPos::new(0, 0),
                GridPos::new(1, 0),
                GridPos::new(2, 0),
                GridPos::new(3, 0),
            ]
        );
    }

    #[test]
    fn path_length_matches_bfs_distance_on_open_grid() {
        // 7x10 open grid: shortest path length equals Manhattan distance + 1.
        let start = GridPos::new(1, 2);
        let goal = GridPos::new(6, 8);
        let path = find_path(start, goal, 7, 10, open);
        assert_eq!(
            path.len() as u32,
            start.manhattan_distance(goal) + 1,
            "BFS must find a Manhattan-optimal path on an open grid"
        );
        assert_eq!(path.first(), Some(&start));
        assert_eq!(path.last(), Some(&goal));
        for pair in path.windows(2) {
            assert_eq!(pair[0].manhattan_distance(pair[1]), 1);
        }
    }

    #[test]
    fn ring_of_walls_is_unreachable() {
        // Goal at (5,5) sealed by a closed ring of blocked cells.
        let ring = [
            GridPos::new(4, 4),
            GridPos::new(5, 4),
            GridPos::new(6, 4),
            GridPos::new(4, 5),
            GridPos::new(6, 5),
            GridPos::new(4, 6),
            GridPos::new(5, 6),
            GridPos::new(6, 6),
        ];
        let path = find_path(GridPos::new(0, 0), GridPos::new(5, 5), 10, 10, |cell| {
            !ring.contains(&cell)
        });
        assert!(path.is_empty());
    }

    #[test]
    fn blocked_cells_force_detours() {
        // A vertical wall with a single gap at the bottom row.
        let path = find_path(GridPos::new(0, 0), GridPos::new(2, 0), 3, 3, |cell| {
            !(cell.x() == 1 && cell.y() < 2)
        });
        assert_eq!(
            path,
            vec![
                GridPos::new(0, 0),
                GridPos::new(0, 1),
                GridPos::new(0, 2),
                GridPos::new(1, 2),
                GridPos::new(2, 2),
                GridPos::new(2, 1),
                GridPos::new(2, 0),
            ]
        );
    }

    #[test]
    fn tie_break_follows_exploration_order() {
        // Two equal-length paths exist; up/down are explored before
        // left/right, so the first hop prefers the vertical axis.
        let path = find_path(GridPos::new(1, 1), GridPos::new(2, 2), 4, 4, open);
        assert_eq!(path.len(), 3);
        assert_eq!(path[1], GridPos::new(1, 2));
    }

    #[test]
    fn out_of_bounds_goal_is_unreachable() {
        assert!(find_path(GridPos::new(0, 0), GridPos::new(9, 9), 3, 3, open).is_empty());
    }
}
