//! End-to-end gameplay scenarios driven purely through commands.

use std::time::Duration;

use glade_core::{Command, DeathCause, Direction, EnemyBehavior, EnemyId, Event, LeverId};
use glade_world::{
    apply, query, Campaign, DoorDefinition, EnemyDefinition, KeyDefinition, LatchDefinition,
    LevelDefinition, LeverDefinition, TotemDefinition, World,
};

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

fn world_from(definitions: Vec<LevelDefinition>) -> World {
    World::new(Campaign::from_definitions(&definitions).expect("campaign"))
}

fn tick(world: &mut World, ms: u64) -> Vec<Event> {
    let mut events = Vec::new();
    apply(
        world,
        Command::Tick {
            dt: Duration::from_millis(ms),
        },
        &mut events,
    );
    events
}

/// Commits one step attempt, finishes the animation, then waits out the
/// cooldown window that opens at completion.
fn step(world: &mut World, direction: Direction) -> Vec<Event> {
    let mut events = Vec::new();
    apply(world, Command::MovePlayer { direction }, &mut events);
    events.extend(tick(world, 150));
    events.extend(tick(world, 200));
    events
}

fn stepped(events: &[Event]) -> bool {
    events
        .iter()
        .any(|event| matches!(event, Event::PlayerStepped { .. }))
}

#[test]
fn corridor_descent_wins_the_level() {
    let mut world = world_from(vec![definition(&["#P#", "# #", "#E#"])]);

    assert!(stepped(&step(&mut world, Direction::Down)));
    let events = step(&mut world, Direction::Down);
    assert!(stepped(&events));
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::LevelWon { index: 0 })));
    assert!(query::game_view(&world).game_won);

    // A won level accepts no further movement.
    assert!(!stepped(&step(&mut world, Direction::Up)));
}

#[test]
fn walls_and_bounds_reject_steps_silently() {
    let mut world = world_from(vec![definition(&["#P#", "# #", "#E#"])]);

    assert!(!stepped(&step(&mut world, Direction::Up)));
    assert!(!stepped(&step(&mut world, Direction::Left)));
    assert!(!stepped(&step(&mut world, Direction::Right)));
    assert_eq!(query::game_view(&world).move_count, 0);
}

#[test]
fn move_cooldown_opens_when_the_step_completes() {
    let mut world = world_from(vec![definition(&["#####", "#P  #", "#####"])]);
    let mut events = Vec::new();
    let attempt = |world: &mut World, events: &mut Vec<Event>| {
        apply(
            world,
            Command::MovePlayer {
                direction: Direction::Right,
            },
            events,
        );
    };
    let steps = |events: &[Event]| {
        events
            .iter()
            .filter(|event| matches!(event, Event::PlayerStepped { .. }))
            .count()
    };

    // Commit at t=0; the animation finishes at t=150 ms.
    attempt(&mut world, &mut events);
    events.extend(tick(&mut world, 150));

    // 200 ms after the commit is only 50 ms after completion; the
    // cooldown window has barely opened and the attempt must fail.
    events.extend(tick(&mut world, 50));
    attempt(&mut world, &mut events);
    assert_eq!(steps(&events), 1);

    // 199 ms after completion still fails.
    events.extend(tick(&mut world, 149));
    attempt(&mut world, &mut events);
    assert_eq!(steps(&events), 1);

    // 200 ms after completion the next step commits.
    events.extend(tick(&mut world, 1));
    attempt(&mut world, &mut events);
    assert_eq!(steps(&events), 2);
}

#[test]
fn key_unlocks_door_and_is_consumed() {
    let mut level = definition(&[
        "##########",
        "#P       #",
        "#        #",
        "#        #",
        "#        #",
        "#        #",
        "##########",
    ]);
    level.keys = vec![KeyDefinition { id: 1, x: 2, y: 5 }];
    level.doors = vec![DoorDefinition {
        id: 1,
        x: 3,
        y: 2,
        latch: LatchDefinition::Key { key: 1 },
    }];
    let mut world = world_from(vec![level]);

    // The locked door rejects entry outright.
    assert!(stepped(&step(&mut world, Direction::Right)));
    assert!(stepped(&step(&mut world, Direction::Right)));
    assert!(!stepped(&step(&mut world, Direction::Down)));

    // Detour to the key.
    assert!(stepped(&step(&mut world, Direction::Left)));
    for _ in 0..4 {
        assert!(stepped(&step(&mut world, Direction::Down)));
    }
    let view = query::game_view(&world);
    assert_eq!(view.keys_held.len(), 1);

    // Walking onto the door unlocks it and spends the key.
    let mut unlock_events = Vec::new();
    unlock_events.extend(step(&mut world, Direction::Right));
    for _ in 0..3 {
        unlock_events.extend(step(&mut world, Direction::Up));
    }
    assert!(unlock_events
        .iter()
        .any(|event| matches!(event, Event::DoorUnlocked { .. })));
    let view = query::game_view(&world);
    assert!(view.keys_held.is_empty());
    assert_eq!(view.doors_unlocked.len(), 1);

    // The spent key never respawns.
    for _ in 0..3 {
        let _ = step(&mut world, Direction::Down);
    }
    let revisit = step(&mut world, Direction::Left);
    assert!(!revisit
        .iter()
        .any(|event| matches!(event, Event::KeyCollected { .. })));
    assert!(query::game_view(&world).keys_held.is_empty());
}

#[test]
fn key_pickup_is_idempotent() {
    let mut level = definition(&["#####", "#P  #", "#####"]);
    level.keys = vec![KeyDefinition { id: 1, x: 2, y: 1 }];
    let mut world = world_from(vec![level]);

    let first = step(&mut world, Direction::Right);
    assert!(first
        .iter()
        .any(|event| matches!(event, Event::KeyCollected { .. })));

    let _ = step(&mut world, Direction::Left);
    let second = step(&mut world, Direction::Right);
    assert!(!second
        .iter()
        .any(|event| matches!(event, Event::KeyCollected { .. })));
    assert_eq!(query::game_view(&world).keys_held.len(), 1);
}

#[test]
fn lever_opens_its_doors_exactly_once() {
    let mut level = definition(&["######", "#P  E#", "######"]);
    level.levers = vec![LeverDefinition { id: 1, x: 2, y: 1 }];
    level.doors = vec![DoorDefinition {
        id: 1,
        x: 3,
        y: 1,
        latch: LatchDefinition::Lever { lever: 1 },
    }];
    let mut world = world_from(vec![level]);

    // Pulling from the wrong cell does nothing.
    let mut events = Vec::new();
    apply(
        &mut world,
        Command::PullLever {
            lever: LeverId::new(1),
        },
        &mut events,
    );
    assert!(events.is_empty());

    assert!(stepped(&step(&mut world, Direction::Right)));
    assert!(!stepped(&step(&mut world, Direction::Right)));
    assert_eq!(query::actionable_lever(&world), Some(LeverId::new(1)));

    apply(
        &mut world,
        Command::PullLever {
            lever: LeverId::new(1),
        },
        &mut events,
    );
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::LeverPulled { .. })));
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::DoorUnlocked { .. })));
    assert_eq!(query::actionable_lever(&world), None);

    // A second pull is inert.
    events.clear();
    apply(
        &mut world,
        Command::PullLever {
            lever: LeverId::new(1),
        },
        &mut events,
    );
    assert!(events.is_empty());

    assert!(stepped(&step(&mut world, Direction::Right)));
    let events = step(&mut world, Direction::Right);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::LevelWon { index: 0 })));
}

#[test]
fn enemy_occupied_cell_blocks_the_player() {
    let mut level = definition(&["####", "#P #", "####"]);
    level.enemies = vec![EnemyDefinition {
        id: 0,
        x: 2,
        y: 1,
        behavior: EnemyBehavior::Static,
        vision_range: 0,
        move_interval_ms: 200,
    }];
    let mut world = world_from(vec![level]);

    assert!(!stepped(&step(&mut world, Direction::Right)));
}

#[test]
fn adjacent_enemy_catches_without_overlapping() {
    let mut level = definition(&["#####", "#P  #", "#####"]);
    level.enemies = vec![EnemyDefinition {
        id: 0,
        x: 3,
        y: 1,
        behavior: EnemyBehavior::Active,
        vision_range: 8,
        move_interval_ms: 200,
    }];
    let mut world = world_from(vec![level]);
    let enemy = EnemyId::new(0);

    let mut events = Vec::new();
    apply(
        &mut world,
        Command::StepEnemy {
            enemy,
            direction: Direction::Left,
        },
        &mut events,
    );
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::EnemyStepped { .. })));
    events.extend(tick(&mut world, 200));

    events.clear();
    apply(
        &mut world,
        Command::StepEnemy {
            enemy,
            direction: Direction::Left,
        },
        &mut events,
    );
    assert!(events.iter().any(|event| matches!(
        event,
        Event::PlayerDied {
            cause: DeathCause::Caught { .. }
        }
    )));
    assert!(!events
        .iter()
        .any(|event| matches!(event, Event::EnemyStepped { .. })));

    let view = query::game_view(&world);
    assert!(view.is_player_dead);
    assert_ne!(
        view.enemies[0].resolved_position,
        view.player.resolved_position
    );

    // Death freezes the attempt until a reset arrives.
    assert!(!stepped(&step(&mut world, Direction::Right)));
    events.clear();
    apply(&mut world, Command::ResetLevel, &mut events);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::LevelLoaded { index: 0 })));
    let view = query::game_view(&world);
    assert!(!view.is_player_dead);
    assert_eq!(view.enemies[0].position.x(), 3);
}

#[test]
fn enemy_holds_position_when_cell_is_taken() {
    let mut level = definition(&["######", "#  PE#", "######"]);
    level.enemies = vec![
        EnemyDefinition {
            id: 0,
            x: 1,
            y: 1,
            behavior: EnemyBehavior::Static,
            vision_range: 0,
            move_interval_ms: 200,
        },
        EnemyDefinition {
            id: 1,
            x: 2,
            y: 1,
            behavior: EnemyBehavior::Active,
            vision_range: 8,
            move_interval_ms: 200,
        },
    ];
    let mut world = world_from(vec![level]);

    let mut events = Vec::new();
    apply(
        &mut world,
        Command::StepEnemy {
            enemy: EnemyId::new(1),
            direction: Direction::Left,
        },
        &mut events,
    );
    assert!(events.is_empty());

    let view = query::game_view(&world);
    assert_eq!(view.enemies[1].position.x(), 2);
    // The blocked attempt still consumed this decision window.
    assert!(view.enemies[1].last_decision.is_some());
}

#[test]
fn enemy_decisions_respect_the_move_interval() {
    let mut level = definition(&["#######", "#    E#", "#P#####"]);
    level.enemies = vec![EnemyDefinition {
        id: 0,
        x: 1,
        y: 1,
        behavior: EnemyBehavior::Active,
        vision_range: 8,
        move_interval_ms: 200,
    }];
    let mut world = world_from(vec![level]);
    let enemy = EnemyId::new(0);
    let mut events = Vec::new();

    apply(
        &mut world,
        Command::StepEnemy {
            enemy,
            direction: Direction::Right,
        },
        &mut events,
    );
    events.extend(tick(&mut world, 160));
    apply(
        &mut world,
        Command::StepEnemy {
            enemy,
            direction: Direction::Right,
        },
        &mut events,
    );
    events.extend(tick(&mut world, 40));
    apply(
        &mut world,
        Command::StepEnemy {
            enemy,
            direction: Direction::Right,
        },
        &mut events,
    );

    let steps = events
        .iter()
        .filter(|event| matches!(event, Event::EnemyStepped { .. }))
        .count();
    assert_eq!(steps, 2);
}

#[test]
fn totem_fires_on_cadence_and_walls_absorb_shots() {
    let mut level = definition(&["######", "#P#  #", "######"]);
    level.totems = vec![TotemDefinition {
        id: 0,
        x: 4,
        y: 1,
        direction: Direction::Left,
    }];
    let mut world = world_from(vec![level]);

    let mut events = Vec::new();
    // 340 ticks of 16 ms: enough for four shots to fire and reach the wall.
    for _ in 0..340 {
        events.extend(tick(&mut world, 16));
    }

    let fired = events
        .iter()
        .filter(|event| matches!(event, Event::ProjectileFired { .. }))
        .count();
    let removed = events
        .iter()
        .filter(|event| matches!(event, Event::ProjectileRemoved { .. }))
        .count();
    assert_eq!(fired, 4);
    assert_eq!(removed, 4);
    assert!(!query::game_view(&world).is_player_dead);
}

#[test]
fn projectile_kills_the_exposed_player() {
    let mut level = definition(&["######", "#P   #", "######"]);
    level.totems = vec![TotemDefinition {
        id: 0,
        x: 4,
        y: 1,
        direction: Direction::Left,
    }];
    let mut world = world_from(vec![level]);

    let mut events = Vec::new();
    for _ in 0..150 {
        events.extend(tick(&mut world, 16));
    }

    assert!(events.iter().any(|event| matches!(
        event,
        Event::PlayerDied {
            cause: DeathCause::Shot { .. }
        }
    )));
    let view = query::game_view(&world);
    assert!(view.is_player_dead);
    assert!(view.projectiles.is_empty());
}

#[test]
fn projectile_fells_an_enemy_in_its_path() {
    let mut level = definition(&["########", "#P     #", "########"]);
    level.totems = vec![TotemDefinition {
        id: 0,
        x: 6,
        y: 1,
        direction: Direction::Left,
    }];
    level.enemies = vec![EnemyDefinition {
        id: 0,
        x: 4,
        y: 1,
        behavior: EnemyBehavior::Static,
        vision_range: 0,
        move_interval_ms: 200,
    }];
    let mut world = world_from(vec![level]);

    let mut events = Vec::new();
    for _ in 0..120 {
        events.extend(tick(&mut world, 16));
    }

    assert!(events
        .iter()
        .any(|event| matches!(event, Event::EnemyKilled { .. })));
    let view = query::game_view(&world);
    assert!(!view.enemies[0].is_alive);
    // The enemy soaked the shot; the player behind it survives.
    assert!(!view.is_player_dead);
}

#[test]
fn advancing_wraps_through_the_campaign() {
    let first = definition(&["#P#", "# #", "#E#"]);
    let second = definition(&["##", "P ", "E#"]);
    let mut world = world_from(vec![first, second]);

    let _ = step(&mut world, Direction::Down);
    let _ = step(&mut world, Direction::Down);
    assert!(query::game_view(&world).game_won);

    let mut events = Vec::new();
    apply(&mut world, Command::AdvanceLevel, &mut events);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::LevelCompleted { index: 0 })));
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::LevelLoaded { index: 1 })));
    assert_eq!(query::level_index(&world), 1);

    let _ = step(&mut world, Direction::Down);
    assert!(query::game_view(&world).game_won);
    events.clear();
    apply(&mut world, Command::AdvanceLevel, &mut events);
    assert!(events
        .iter()
        .any(|event| matches!(event, Event::LevelLoaded { index: 0 })));
}
