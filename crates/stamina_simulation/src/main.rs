//! Headless stamina симуляция
//!
//! Host + observer + caller: caller спринтит (drain) и тратит stamina на рывки,
//! в консоль пишутся ack'и и sync значения observer'а.

use bevy::prelude::*;
use rand::Rng;
use stamina_simulation::logger::{log_error, log_info};
use stamina_simulation::*;

fn main() {
    let seed = 42;
    let mut app = create_headless_app(seed);
    use_manual_stepping(&mut app);
    log_info(&format!("Starting headless stamina simulation (seed: {})", seed));

    let config = StaminaConfig::default();

    let (host, observer) = match spawn_pair(app.world_mut(), &config) {
        Ok(pair) => pair,
        Err(err) => {
            log_error(&format!("Failed to spawn stamina actors: {}", err));
            return;
        }
    };
    let caller = app.world_mut().spawn_empty().id();

    // 20 секунд по 60 тиков
    for tick in 0..1200u32 {
        let roll = app
            .world_mut()
            .resource_mut::<DeterministicRng>()
            .rng
            .gen_range(0..100);

        let request = match roll {
            0..=1 => Some(StaminaRequest::start_drain(caller, host, None, CorrelationId::new())),
            2..=3 => Some(StaminaRequest::stop(caller, host)),
            4 => Some(StaminaRequest::spend(caller, host, 25.0, CorrelationId::new())),
            _ => None,
        };
        if let Some(request) = request {
            app.world_mut().send_event(request);
        }

        // Полный frame: event буферы свапаются в First, FixedUpdate ровно раз
        app.update();

        report_acks(&mut app);

        if tick % 60 == 0 {
            let world = app.world();
            let host_value = world.get::<StaminaController>(host).map(StaminaController::remaining);
            let observer_value =
                world.get::<StaminaController>(observer).map(StaminaController::remaining);
            let state = world.get::<StaminaController>(host).map(StaminaController::state);
            log_info(&format!(
                "Tick {}: host {:?} ({:?}), observer {:?}",
                tick, host_value, state, observer_value
            ));
        }
    }

    log_info("Simulation complete!");
}

fn spawn_pair(world: &mut World, config: &StaminaConfig) -> Result<(Entity, Entity), StaminaError> {
    let host = spawn_stamina_authority(world, config)?;
    let observer = spawn_stamina_observer(world, host, config)?;
    Ok((host, observer))
}

fn report_acks(app: &mut App) {
    let succeeded: Vec<_> = app
        .world_mut()
        .resource_mut::<Events<StaminaUseSucceeded>>()
        .drain()
        .collect();
    let failed: Vec<_> = app
        .world_mut()
        .resource_mut::<Events<StaminaUseFailed>>()
        .drain()
        .collect();

    for event in succeeded {
        log_info(&format!("ack ok   [{}]", event.correlation_id));
    }
    for event in failed {
        log_info(&format!("ack fail [{}]", event.correlation_id));
    }
}
