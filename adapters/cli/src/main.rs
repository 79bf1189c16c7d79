#![deny(
    unsafe_code,
    missing_docs,
    dead_code,
    unused_results,
    non_snake_case,
    unreachable_pub
)]

//! Headless command-line host for the Glade stealth simulation.
//!
//! Runs the deterministic core on a fixed tick, replays a scripted input
//! track in place of a keyboard, and records campaign progress through the
//! persistence port. The same command sequence always produces the same
//! run, which makes this binary double as a replay tool.

mod persistence;
mod render;

use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{Context, Result};
use clap::Parser;
use glade_core::{Command, DeathCause, Direction, Event, PersistencePort, INPUT_REPEAT_INTERVAL};
use glade_system_enemy_ai::EnemyAi;
use glade_system_lifecycle::Lifecycle;
use glade_system_player_control::PlayerControl;
use glade_world::{apply, query, Campaign, LevelDefinition, World};

use crate::persistence::FileStore;

const DEFAULT_CAMPAIGN: &str = include_str!("default_campaign.json");

/// Deterministic headless runner for the Glade simulation core.
#[derive(Debug, Parser)]
#[command(name = "glade")]
struct Args {
    /// Campaign JSON file; the built-in campaign is used when omitted.
    #[arg(long)]
    campaign: Option<PathBuf>,

    /// Save file recording the last completed level.
    #[arg(long, default_value = "glade-save.json")]
    save: PathBuf,

    /// Level index to start at, overriding the save file.
    #[arg(long)]
    level: Option<usize>,

    /// Simulated milliseconds to run before exiting.
    #[arg(long, default_value_t = 30_000)]
    run_ms: u64,

    /// Simulated milliseconds advanced per tick.
    #[arg(long, default_value_t = 16)]
    tick_ms: u64,

    /// Input track, one glyph per 100 ms slot: u/d/l/r hold a direction,
    /// p pulls the lever underfoot, anything else releases.
    #[arg(long, default_value = "")]
    script: String,

    /// Print an ASCII frame every N ticks; 0 disables frames.
    #[arg(long, default_value_t = 0)]
    frame_every: u64,
}

fn main() -> Result<()> {
    let args = Args::parse();

    let definitions = load_campaign(args.campaign.as_deref())?;
    let campaign = Campaign::from_definitions(&definitions)?;
    let mut store = FileStore::new(args.save.clone());

    let start_level = match args.level {
        Some(index) => index,
        None => match store.load_last_level() {
            Ok(Some(index)) => index + 1,
            Ok(None) => 0,
            Err(error) => {
                eprintln!("save file unreadable, starting fresh: {error}");
                0
            }
        },
    };

    let mut world = World::new(campaign);
    let mut ai = EnemyAi::new();
    let mut control = PlayerControl::new();
    let mut lifecycle = Lifecycle::new();

    let dt = Duration::from_millis(args.tick_ms.max(1));
    let total = Duration::from_millis(args.run_ms);
    let script: Vec<char> = args.script.chars().collect();

    // Events produced by system commands are carried into the next tick so
    // every system observes them before more time passes.
    let mut carried = Vec::new();
    apply(&mut world, Command::LoadLevel { index: start_level }, &mut carried);

    let mut elapsed = Duration::ZERO;
    let mut tick_index: u64 = 0;
    let mut last_slot = usize::MAX;
    let mut pending = Vec::new();

    while elapsed < total {
        let slot = (elapsed.as_millis() / INPUT_REPEAT_INTERVAL.as_millis()) as usize;
        if slot != last_slot {
            last_slot = slot;
            match script.get(slot).copied() {
                Some('u') => control.set_held(Some(Direction::Up)),
                Some('d') => control.set_held(Some(Direction::Down)),
                Some('l') => control.set_held(Some(Direction::Left)),
                Some('r') => control.set_held(Some(Direction::Right)),
                Some('p') => {
                    control.set_held(None);
                    if let Some(lever) = query::actionable_lever(&world) {
                        pending.push(Command::PullLever { lever });
                    }
                }
                _ => control.set_held(None),
            }
        }

        let mut events = std::mem::take(&mut carried);
        for command in pending.drain(..) {
            apply(&mut world, command, &mut events);
        }
        apply(&mut world, Command::Tick { dt }, &mut events);

        let mut commands = Vec::new();
        control.handle(&events, &mut commands);
        let view = query::game_view(&world);
        let level = query::level(&world);
        ai.handle(
            &events,
            &view,
            |cell| {
                !level.is_passable(cell)
                    || level
                        .door_at(cell)
                        .map_or(false, |door| !view.doors_unlocked.contains(&door.id()))
            },
            &mut commands,
        );
        lifecycle.handle(&events, &mut commands);

        for command in commands {
            apply(&mut world, command, &mut carried);
        }

        persist_progress(&events, &mut store);
        report(&events);

        tick_index += 1;
        if args.frame_every > 0 && tick_index % args.frame_every == 0 {
            let view = query::game_view(&world);
            println!("{}", render::frame(query::level(&world), &view));
        }

        elapsed = elapsed.saturating_add(dt);
    }

    persist_progress(&carried, &mut store);
    report(&carried);

    println!("{}", render::summary(&query::game_view(&world)));
    Ok(())
}

fn load_campaign(path: Option<&Path>) -> Result<Vec<LevelDefinition>> {
    match path {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("failed to read campaign file {}", path.display()))?;
            serde_json::from_str(&text)
                .with_context(|| format!("campaign file {} is malformed", path.display()))
        }
        None => serde_json::from_str(DEFAULT_CAMPAIGN).context("built-in campaign is malformed"),
    }
}

fn persist_progress(events: &[Event], store: &mut FileStore) {
    for event in events {
        if let Event::LevelCompleted { index } = event {
            if let Err(error) = store.store_last_level(*index) {
                eprintln!("failed to record progress: {error}");
            }
        }
    }
}

fn report(events: &[Event]) {
    for event in events {
        match event {
            Event::KeyCollected { key } => println!("picked up key {}", key.get()),
            Event::DoorUnlocked { door } => println!("door {} unlocked", door.get()),
            Event::LeverPulled { lever } => println!("lever {} pulled", lever.get()),
            Event::EnemyKilled { enemy, .. } => println!("enemy {} was shot down", enemy.get()),
            Event::PlayerDied { cause } => match cause {
                DeathCause::Caught { enemy } => println!("caught by enemy {}", enemy.get()),
                DeathCause::Shot { .. } => println!("shot down"),
            },
            Event::LevelWon { index } => println!("level {index} cleared"),
            Event::LevelLoaded { index } => println!("-- level {index} --"),
            _ => {}
        }
    }
}
