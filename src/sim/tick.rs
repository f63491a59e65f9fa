//! Per-frame engine tick
//!
//! The host calls [`tick`] once per display refresh. Within a frame the order
//! is fixed: input, clocks, present, read back, sample. Sampling therefore sees
//! the positions the host rendered for this same frame.

use glam::Vec2;
use rand::Rng;

use super::collision::Rect;
use super::ellipse::Geometry;
use super::physics::{Material, PhysicsSimulator};
use super::shake::Shake;
use super::state::{BodyId, Engine, GameEvent, Phase, Transform};
use crate::consts::MAX_FRAME_DT;
use crate::error::EngineError;
use crate::platform::Host;

/// Input commands for a single frame
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Control pressed (speed the body up)
    pub press_start: Option<BodyId>,
    /// Control released (back to normal speed)
    pub press_end: Option<BodyId>,
    /// Reload pressed
    pub reload: bool,
}

/// Advance the engine by one frame
pub fn tick<H: Host + ?Sized>(engine: &mut Engine, input: &TickInput, dt: f32, host: &mut H) {
    let dt = dt.clamp(0.0, MAX_FRAME_DT);
    engine.time += dt as f64;
    engine.time_ticks += 1;

    refresh_geometry(engine, host);

    if let Some(id) = input.press_start {
        let boost = engine.config.boost_multiplier;
        set_speed(engine, id, boost);
    }
    if let Some(id) = input.press_end {
        set_speed(engine, id, 1.0);
    }
    if input.reload {
        if let Err(e) = reset_round(engine) {
            log::warn!("Reload ignored: {}", e);
        }
    }

    match engine.phase() {
        Phase::Prestart => advance_countdown(engine, dt),
        Phase::Orbiting => advance_orbits(engine, dt),
        Phase::Frozen => {
            // Only reachable if the handoff could not seed physics last frame
            if let Err(e) = start_simulation(engine) {
                log::warn!("Simulation start failed: {}", e);
            }
        }
        Phase::Simulating => advance_physics(engine, dt),
    }

    present(engine, host);

    if engine.phase() == Phase::Orbiting {
        if let Some((a, b)) = sample(engine) {
            if let Err(e) = trigger_collision(engine, a, b) {
                log::warn!("Collision {}-{} ignored: {}", a, b, e);
            }
        }
    }

    advance_shake(engine, dt, host);
    announce_visibility(engine, host);
}

/// Apply a speed multiplier to one body without restarting its lap
pub fn set_speed(engine: &mut Engine, id: BodyId, multiplier: f32) {
    let now = engine.time;
    engine.body_mut(id).speed_multiplier = multiplier;
    if !engine.orbits.set_speed(id, multiplier, now) {
        log::debug!("{} speed set to {} with no orbit running", id, multiplier);
    }
}

/// Hand the round from orbit to physics after a collision
///
/// Only the first call in a round has any effect; later calls return
/// [`TransitionError::Invalid`](crate::TransitionError::Invalid).
pub fn trigger_collision(engine: &mut Engine, a: BodyId, b: BodyId) -> Result<(), EngineError> {
    engine.transitions.freeze()?;
    engine.sampler.stop();
    log::info!("Collision between {} and {} in round {}", a, b, engine.round);
    engine.push_event(GameEvent::Collision { a, b });

    let now = engine.time;
    for id in BodyId::ALL {
        let last = engine.orbits.stop(id, now);
        let body = engine.body_mut(id);
        let frozen = body
            .rendered_position
            .or(last.map(|t| t.position))
            .unwrap_or(body.position);
        body.frozen_position = Some(frozen);
        body.position = frozen;
        body.velocity = Vec2::ZERO;
        body.angular_velocity = 0.0;
    }

    if engine.config.shake {
        engine.shake = Some(Shake::new());
    }
    let positions = engine.bodies.each_ref().map(|b| b.position);
    engine.push_event(GameEvent::Frozen { positions });

    start_simulation(engine)
}

/// Tear the round down and restart the pre-start countdown
pub fn reset_round(engine: &mut Engine) -> Result<(), EngineError> {
    engine.transitions.reset()?;
    engine.physics = None;
    engine.orbits.stop_all();
    engine.sampler.stop();
    engine.countdown.reset();
    engine.round += 1;

    let center = engine.center();
    for body in &mut engine.bodies {
        body.park(center);
    }
    engine.reload_visible = false;

    let round = engine.round;
    engine.push_event(GameEvent::Reset);
    engine.push_event(GameEvent::RoundStarted { round });
    log::info!("Round {} starting", round);
    Ok(())
}

fn refresh_geometry<H: Host + ?Sized>(engine: &mut Engine, host: &H) {
    let viewport = host.viewport();
    if engine.geometry.as_ref().is_some_and(|g| g.viewport == viewport) {
        return;
    }
    match Geometry::from_viewport(viewport, engine.config.body_size_ratio) {
        Ok(geometry) => apply_geometry(engine, geometry),
        // Keep the last good layout and retry next frame
        Err(e) => log::debug!("Geometry deferred: {}", e),
    }
}

fn apply_geometry(engine: &mut Engine, geometry: Geometry) {
    log::info!("Viewport {}x{}", geometry.viewport.x, geometry.viewport.y);
    for id in BodyId::ALL {
        let phase = engine.body(id).orbit_phase;
        engine.orbits.reshape(id, geometry.path_for(phase));
    }
    if let Some(physics) = &mut engine.physics {
        physics.set_bounds(Rect::new(Vec2::ZERO, geometry.viewport));
    }
    if engine.phase() == Phase::Prestart {
        for body in &mut engine.bodies {
            body.position = geometry.center;
        }
    }
    engine.geometry = Some(geometry);
}

fn advance_countdown(engine: &mut Engine, dt: f32) {
    let target = engine.config.countdown_ticks;
    if engine.countdown.ticks < target {
        let fired = engine.countdown.advance(dt, engine.config.countdown_interval);
        let reached = engine.countdown.ticks.min(target);
        for n in (reached + 1).saturating_sub(fired)..=reached {
            if n > 0 {
                engine.push_event(GameEvent::CountdownTick {
                    remaining: target - n,
                });
            }
        }
    }
    if engine.countdown.ticks >= target {
        if let Err(e) = begin_orbit(engine) {
            log::debug!("Orbit start deferred: {}", e);
        }
    }
}

/// Show the bodies and start their laps with this round's periods
fn begin_orbit(engine: &mut Engine) -> Result<(), EngineError> {
    let geometry = engine
        .geometry
        .clone()
        .ok_or(EngineError::DegenerateGeometry {
            width: 0.0,
            height: 0.0,
        })?;
    engine.transitions.begin_orbit()?;

    let periods = match engine.config.fixed_periods {
        Some(periods) => periods,
        None => {
            let mut rng = engine.rng_state.for_round(engine.round);
            let (lo, hi) = engine.config.period_range;
            [(); 3].map(|_| rng.random_range(lo..=hi))
        }
    };

    engine.orbits.set_animation_speed(engine.config.animation_speed);
    let now = engine.time;
    for id in BodyId::ALL {
        let period = periods[id.index()];
        let body = engine.body_mut(id);
        let path = geometry.path_for(body.orbit_phase);
        let start = path.point_at(0.0);
        body.orbit_period = period;
        body.position = start.position;
        body.rotation = start.rotation;
        body.visible = true;
        let multiplier = body.speed_multiplier;
        engine.orbits.start(id, path, period, now, multiplier);
    }
    engine.sampler.start(engine.config.sampler_delay);

    log::info!(
        "Round {} orbiting (periods {:.2}, {:.2}, {:.2})",
        engine.round,
        periods[0],
        periods[1],
        periods[2]
    );
    engine.push_event(GameEvent::OrbitStarted { periods });
    Ok(())
}

fn advance_orbits(engine: &mut Engine, dt: f32) {
    let now = engine.time;
    for id in BodyId::ALL {
        if let Some(t) = engine.orbits.sample(id, now) {
            let body = engine.body_mut(id);
            body.position = t.position;
            body.rotation = t.rotation;
        }
    }
    engine.sampler.advance(dt);
}

fn start_simulation(engine: &mut Engine) -> Result<(), EngineError> {
    let (bounds, size) = match &engine.geometry {
        Some(g) => (Rect::new(Vec2::ZERO, g.viewport), g.body_size),
        None => {
            return Err(EngineError::DegenerateGeometry {
                width: 0.0,
                height: 0.0,
            });
        }
    };
    engine.transitions.simulate()?;

    let seeds = engine.bodies.each_ref().map(|b| {
        Transform::new(b.frozen_position.unwrap_or(b.position), b.rotation)
    });
    let material = Material {
        gravity: engine.config.gravity,
        elasticity: engine.config.elasticity,
        friction: engine.config.friction,
    };
    engine.physics = Some(PhysicsSimulator::seeded(
        seeds,
        size / 2.0,
        engine.config.mass,
        bounds,
        material,
    ));
    engine.reload_visible = true;
    engine.push_event(GameEvent::SimulationStarted);
    log::info!("Round {} simulating", engine.round);
    Ok(())
}

fn advance_physics(engine: &mut Engine, dt: f32) {
    let Some(physics) = engine.physics.as_mut() else {
        return;
    };
    physics.advance(dt);
    for (body, state) in engine.bodies.iter_mut().zip(physics.bodies()) {
        body.position = state.position;
        body.rotation = state.rotation;
        body.velocity = state.velocity;
        body.angular_velocity = state.angular_velocity;
    }
}

/// Push transforms, then read back what the host rendered
fn present<H: Host + ?Sized>(engine: &mut Engine, host: &mut H) {
    for body in &mut engine.bodies {
        host.present(body.id, body.transform());
        body.rendered_position = host.rendered_position(body.id);
    }
}

fn sample(engine: &mut Engine) -> Option<(BodyId, BodyId)> {
    let size = engine.geometry.as_ref()?.body_size;
    let threshold = engine.config.collision_threshold(size);
    engine.sampler.sample(&engine.bodies, size, threshold)
}

fn advance_shake<H: Host + ?Sized>(engine: &mut Engine, dt: f32, host: &mut H) {
    let Some(shake) = engine.shake.as_mut() else {
        return;
    };
    match shake.advance(dt) {
        Some(offset) => host.set_view_offset(Vec2::new(offset, 0.0)),
        None => {
            engine.shake = None;
            host.set_view_offset(Vec2::ZERO);
        }
    }
}

/// Send visibility changes (everything on the first frame)
fn announce_visibility<H: Host + ?Sized>(engine: &mut Engine, host: &mut H) {
    let bodies = engine.bodies.each_ref().map(|b| b.visible);
    let current = (bodies, engine.reload_visible);
    let previous = engine.announced;
    if previous == Some(current) {
        return;
    }
    for id in BodyId::ALL {
        let visible = bodies[id.index()];
        if previous.is_none_or(|(shown, _)| shown[id.index()] != visible) {
            host.set_body_visible(id, visible);
        }
    }
    if previous.is_none_or(|(_, reload)| reload != current.1) {
        host.set_reload_visible(current.1);
    }
    engine.announced = Some(current);
}
