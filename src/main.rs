//! Masquerade headless runner
//!
//! Loads a level (built-in demo, or a JSON path given as the first argument),
//! then lets a naive autopilot play it at the fixed timestep and reports what
//! happened. Rendering lives elsewhere.

use masquerade::consts::SIM_DT;
use masquerade::sim::{GameEvent, GamePhase, TickInput, World, tick, vision_cone};
use masquerade::{LevelData, Settings};

/// Give up after this many simulated seconds
const MAX_SECONDS: u32 = 120;

/// Steer toward the exit, grabbing any mask within reach on the way
fn autopilot(world: &World) -> TickInput {
    let goal = world
        .level
        .exit
        .map(|exit| exit.center())
        .unwrap_or(world.level.player_spawn);
    // Sidestep a little every few seconds so we don't grind a wall forever
    let wobble = (world.time_ticks as f32 * SIM_DT * 0.7).sin() * 0.6;
    let to_goal = (goal - world.player.pos).normalize_or_zero();
    let move_dir = (to_goal + to_goal.perp() * wobble).normalize_or_zero();

    TickInput {
        move_dir,
        takedown: true,
        take_mask: true,
    }
}

fn main() {
    env_logger::init();
    log::info!("Masquerade (headless) starting...");

    let settings = Settings::load("masquerade.json");
    let mut args = std::env::args().skip(1);
    let data = match args.next() {
        Some(path) => match LevelData::load(&path) {
            Ok(data) => data,
            Err(e) => {
                eprintln!("Failed to load level {path}: {e}");
                std::process::exit(1);
            }
        },
        None => LevelData::demo(),
    };
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(12345);

    let mut world = match data.into_world(seed, settings) {
        Ok(world) => world,
        Err(e) => {
            eprintln!("Invalid level: {e}");
            std::process::exit(1);
        }
    };

    let mut spotted = 0;
    let mut shots = 0;
    let mut masks = Vec::new();
    for _ in 0..(MAX_SECONDS as f32 / SIM_DT) as u32 {
        let input = autopilot(&world);
        tick(&mut world, &input, SIM_DT);
        for event in &world.events {
            match event {
                GameEvent::EnemySpotted { .. } => spotted += 1,
                GameEvent::ShotFired { .. } => shots += 1,
                GameEvent::MaskStolen { permission, .. } => masks.push(*permission),
                _ => {}
            }
        }
        if world.phase != GamePhase::Infiltrating {
            break;
        }
    }

    let seconds = world.time_ticks as f32 * SIM_DT;
    println!("\nResult after {seconds:.1}s: {:?}", world.phase);
    println!("  spotted {spotted} times, {shots} shots fired");
    println!("  health {}, masks taken {:?}", world.player_health, masks);
    for (handle, enemy) in world.enemies.iter() {
        let cone = vision_cone(enemy, &world.level, 16);
        let reach = cone
            .iter()
            .skip(1)
            .map(|p| p.distance(enemy.pos))
            .fold(0.0_f32, f32::max);
        println!(
            "  enemy {:>2}: {:?} {:?} at ({:.0}, {:.0}), sees {:.0} units{}",
            handle.index,
            enemy.ai,
            enemy.behavior.kind(),
            enemy.pos.x,
            enemy.pos.y,
            reach,
            if enemy.restrained { " [restrained]" } else { "" }
        );
    }
}
