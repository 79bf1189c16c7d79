#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Authoritative game state for the Glade stealth engine.
//!
//! The world owns every mutable fact about the current level attempt and
//! mutates exclusively through [`apply`]. Time only advances when a host
//! submits [`Command::Tick`], which makes every run of the simulation
//! reproducible from the same command sequence. Read access goes through
//! the snapshot views in [`query`].

mod level;
mod movement;
mod projectiles;
pub mod query;

use std::collections::BTreeSet;
use std::time::Duration;

use glade_core::{
    Command, Direction, DoorId, EnemyBehavior, EnemyId, Event, GridPos, KeyId, LeverId, PixelPos,
    ProjectileId, TotemId,
};

pub use level::{
    Campaign, Door, DoorDefinition, DoorLatch, EnemyDefinition, EnemySpawn, Key, KeyDefinition,
    LatchDefinition, Level, LevelDefinition, LevelError, Lever, LeverDefinition, TotemDefinition,
    TotemSpawn,
};

/// Authoritative owner of the campaign and the live level attempt.
#[derive(Debug)]
pub struct World {
    campaign: Campaign,
    state: GameState,
}

impl World {
    /// Creates a world positioned at the first level of the campaign.
    #[must_use]
    pub fn new(campaign: Campaign) -> Self {
        let state = GameState::new(campaign.level(0), 0);
        Self { campaign, state }
    }

    fn load_level(&mut self, index: usize, out: &mut Vec<Event>) {
        let index = index % self.campaign.len();
        self.state = GameState::new(self.campaign.level(index), index);
        out.push(Event::LevelLoaded { index });
    }
}

/// Executes a command against the world and records the resulting events.
///
/// Commands that cannot be honored (moves into walls, actions after death,
/// unknown entity ids) are dropped silently; hosts observe outcomes through
/// the emitted events alone.
pub fn apply(world: &mut World, command: Command, out_events: &mut Vec<Event>) {
    match command {
        Command::Tick { dt } => {
            world.state.now = world.state.now.saturating_add(dt);
            out_events.push(Event::TimeAdvanced { dt });
            if world.state.is_player_dead || world.state.game_won {
                return;
            }
            let World { campaign, state } = world;
            let level = campaign.level(state.level_index);
            movement::advance_animations(level, state, out_events);
            projectiles::advance(level, state, dt, out_events);
        }
        Command::MovePlayer { direction } => {
            let World { campaign, state } = world;
            let level = campaign.level(state.level_index);
            movement::try_move_player(level, state, direction, out_events);
        }
        Command::StepEnemy { enemy, direction } => {
            let World { campaign, state } = world;
            let level = campaign.level(state.level_index);
            movement::step_enemy(level, state, enemy, direction, out_events);
        }
        Command::TurnEnemy { enemy, direction } => {
            movement::turn_enemy(&mut world.state, enemy, direction, out_events);
        }
        Command::PullLever { lever } => {
            let World { campaign, state } = world;
            let level = campaign.level(state.level_index);
            pull_lever(level, state, lever, out_events);
        }
        Command::LoadLevel { index } => world.load_level(index, out_events),
        Command::ResetLevel => world.load_level(world.state.level_index, out_events),
        Command::AdvanceLevel => {
            let index = world.state.level_index;
            if world.state.game_won {
                out_events.push(Event::LevelCompleted { index });
            }
            world.load_level(index.wrapping_add(1), out_events);
        }
    }
}

fn pull_lever(level: &Level, state: &mut GameState, lever_id: LeverId, out: &mut Vec<Event>) {
    if state.is_player_dead || state.game_won {
        return;
    }
    let Some(lever) = level.levers().iter().find(|lever| lever.id() == lever_id) else {
        return;
    };
    if lever.cell() != movement::resolved_player_position(state) {
        return;
    }
    if state.levers_pulled.contains(&lever_id) {
        return;
    }

    let _ = state.levers_pulled.insert(lever_id);
    out.push(Event::LeverPulled { lever: lever_id });

    for door in level.doors() {
        if door.latch() == DoorLatch::Lever(lever_id) && !state.doors_unlocked.contains(&door.id())
        {
            let _ = state.doors_unlocked.insert(door.id());
            out.push(Event::DoorUnlocked { door: door.id() });
        }
    }
}

/// Mutable state of one level attempt, rebuilt from scratch on every load.
#[derive(Debug)]
struct GameState {
    now: Duration,
    level_index: usize,
    player: PlayerState,
    enemies: Vec<EnemyState>,
    totems: Vec<TotemState>,
    projectiles: Vec<ProjectileState>,
    keys_held: BTreeSet<KeyId>,
    doors_unlocked: BTreeSet<DoorId>,
    levers_pulled: BTreeSet<LeverId>,
    next_projectile_id: u32,
    is_player_dead: bool,
    game_won: bool,
}

impl GameState {
    fn new(level: &Level, level_index: usize) -> Self {
        let start = level.start();
        let mut enemies: Vec<EnemyState> = level
            .enemy_spawns()
            .iter()
            .map(|spawn| EnemyState {
                id: spawn.id(),
                behavior: spawn.behavior(),
                vision_range: spawn.vision_range(),
                move_interval: spawn.move_interval(),
                position: spawn.cell(),
                start_position: spawn.cell(),
                pixel: spawn.cell().to_pixel(),
                facing: Direction::Left,
                is_moving: false,
                move_start: Duration::ZERO,
                last_move: None,
                is_alive: true,
            })
            .collect();
        enemies.sort_by_key(|enemy| enemy.id);

        Self {
            now: Duration::ZERO,
            level_index,
            player: PlayerState {
                position: start,
                start_position: start,
                pixel: start.to_pixel(),
                facing: Direction::Right,
                is_moving: false,
                move_start: Duration::ZERO,
                last_move: None,
                move_count: 0,
            },
            enemies,
            totems: level
                .totems()
                .iter()
                .map(|totem| TotemState {
                    id: totem.id(),
                    cell: totem.cell(),
                    direction: totem.direction(),
                    last_shot: Duration::ZERO,
                })
                .collect(),
            projectiles: Vec::new(),
            keys_held: BTreeSet::new(),
            doors_unlocked: BTreeSet::new(),
            levers_pulled: BTreeSet::new(),
            next_projectile_id: 0,
            is_player_dead: false,
            game_won: false,
        }
    }
}

#[derive(Debug)]
struct PlayerState {
    position: GridPos,
    start_position: GridPos,
    pixel: PixelPos,
    facing: Direction,
    is_moving: bool,
    move_start: Duration,
    last_move: Option<Duration>,
    move_count: u32,
}

#[derive(Debug)]
struct EnemyState {
    id: EnemyId,
    behavior: EnemyBehavior,
    vision_range: u32,
    move_interval: Duration,
    position: GridPos,
    start_position: GridPos,
    pixel: PixelPos,
    facing: Direction,
    is_moving: bool,
    move_start: Duration,
    last_move: Option<Duration>,
    is_alive: bool,
}

#[derive(Debug)]
struct TotemState {
    id: TotemId,
    cell: GridPos,
    direction: Direction,
    last_shot: Duration,
}

#[derive(Debug)]
struct ProjectileState {
    id: ProjectileId,
    position: PixelPos,
    direction: Direction,
    source: TotemId,
}
