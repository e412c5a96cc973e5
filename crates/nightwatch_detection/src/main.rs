//! Headless прогон Nightwatch
//!
//! Три охранника у склада, цель идёт мимо. Печатает переходы состояний
//! и propagation тревоги.

use bevy::prelude::*;
use nightwatch_detection::{
    create_headless_app, load_profile, log_info, log_warning, run_fixed_ticks, AlertPropagated, DetectionAgent,
    DetectionProfile, DetectionStateEntered, DetectionTarget, Engagement, NightwatchPlugin, NoiseEmitted, Occluder,
};

const PROFILE_PATH: &str = "data/detection_profiles/guard.toml";

fn main() {
    let seed = 42;
    let mut app = create_headless_app(seed);
    app.add_plugins(NightwatchPlugin);

    log_info(&format!("Starting Nightwatch headless simulation (seed: {})", seed));

    let profile = load_profile(PROFILE_PATH).unwrap_or_else(|err| {
        log_warning(&format!("{} → default guard profile", err));
        DetectionProfile::default()
    });

    let world = app.world_mut();
    for (x, yaw) in [(0.0, 0.0), (8.0, 0.4), (-9.0, -0.3)] {
        world.spawn((
            DetectionAgent::default(),
            profile.clone(),
            Engagement::default(),
            Transform::from_xyz(x, 0.0, 0.0).with_rotation(Quat::from_rotation_y(yaw)),
        ));
    }
    world.spawn((
        Occluder {
            half_extents: Vec3::new(1.5, 2.0, 0.5),
        },
        Transform::from_xyz(-9.0, 0.0, -6.0),
    ));
    let target = world
        .spawn((DetectionTarget, Transform::from_xyz(-20.0, 0.0, -12.0)))
        .id();

    // Цель идёт вдоль склада слева направо, 1.5 м/с
    for tick in 0..1800u32 {
        if let Some(mut transform) = app.world_mut().get_mut::<Transform>(target) {
            transform.translation.x += 1.5 / 60.0;
        }
        if tick % 40 == 0 {
            let position = app
                .world()
                .get::<Transform>(target)
                .map(|transform| transform.translation)
                .unwrap_or_default();
            app.world_mut()
                .send_event(NoiseEmitted::footstep(target, position, true));
        }

        run_fixed_ticks(&mut app, 1);

        let transitions: Vec<DetectionStateEntered> = app
            .world_mut()
            .resource_mut::<Events<DetectionStateEntered>>()
            .drain()
            .collect();
        for entered in transitions {
            log_info(&format!(
                "Tick {}: {:?} {:?} → {:?}",
                tick, entered.agent, entered.from, entered.to
            ));
        }

        let propagated = app
            .world_mut()
            .resource_mut::<Events<AlertPropagated>>()
            .drain()
            .count();
        if propagated > 0 {
            log_info(&format!("Tick {}: alert shared with {} peer(s)", tick, propagated));
        }
    }

    let mut guards = app.world_mut().query::<(Entity, &DetectionAgent)>();
    for (entity, agent) in guards.iter(app.world()) {
        log_info(&format!(
            "{:?}: {:?}, suspicion {:.1}, buffs {}",
            entity, agent.current_state, agent.suspicion, agent.has_permanent_buffs
        ));
    }

    log_info("Simulation complete!");
}
