//! Molecules headless runner
//!
//! Plays scripted rounds against an in-memory host and logs what happens.
//! Usage: `molecules [seed] [config.json]`

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use glam::Vec2;
    use molecules::EngineConfig;
    use molecules::platform::HeadlessHost;
    use molecules::sim::{BodyId, Engine, GameEvent, Phase, TickInput, tick};

    const FRAME_DT: f32 = 1.0 / 60.0;
    const ROUND_FRAMES: u32 = 60 * 20;
    const SETTLE_FRAMES: u32 = 60 * 3;

    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed = match args.next() {
        Some(arg) => match arg.parse::<u64>() {
            Ok(seed) => seed,
            Err(_) => {
                log::error!("Seed must be an unsigned integer, got {:?}", arg);
                std::process::exit(2);
            }
        },
        None => 42,
    };
    let config = match args.next() {
        Some(path) => match EngineConfig::load(&path) {
            Ok(config) => config,
            Err(e) => {
                log::error!("Failed to load {}: {}", path, e);
                std::process::exit(1);
            }
        },
        None => EngineConfig::default(),
    };

    log::info!("Molecules (headless) starting...");
    let mut engine = Engine::new(config, seed);
    let mut host = HeadlessHost::new(Vec2::new(390.0, 844.0));

    // Two rounds: hold red for a second once it orbits, reload after settling
    for round in 0..2 {
        let mut held = 0u32;
        let mut settled = 0u32;
        for _ in 0..ROUND_FRAMES {
            let mut input = TickInput::default();
            if engine.phase() == Phase::Orbiting {
                match held {
                    0 => input.press_start = Some(BodyId::Red),
                    60 => input.press_end = Some(BodyId::Red),
                    _ => {}
                }
                held += 1;
            }
            if engine.phase() == Phase::Simulating {
                settled += 1;
                input.reload = round == 0 && settled == SETTLE_FRAMES;
            }

            tick(&mut engine, &input, FRAME_DT, &mut host);

            for event in engine.drain_events() {
                match event {
                    GameEvent::Frozen { positions } => {
                        log::info!("Frozen at {:?}", positions);
                    }
                    other => log::debug!("{:?}", other),
                }
            }
            if round == 1 && settled >= SETTLE_FRAMES {
                break;
            }
            if round == 0 && engine.round > 1 {
                break;
            }
        }
        if engine.phase() != Phase::Simulating && engine.phase() != Phase::Prestart {
            log::warn!("Round {} ended in {:?} without a collision", engine.round, engine.phase());
        }
    }

    for body in &engine.bodies {
        log::info!(
            "{}: position ({:.1}, {:.1}) velocity ({:.1}, {:.1})",
            body.id,
            body.position.x,
            body.position.y,
            body.velocity.x,
            body.velocity.y
        );
    }
    log::info!(
        "Done after {} frames ({} presented), round {}",
        engine.time_ticks,
        host.frames_presented,
        engine.round
    );
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // No standalone entry on wasm; embedders drive `tick` themselves
}
