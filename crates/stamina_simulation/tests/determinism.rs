//! Тесты детерминизма stamina симуляции
//!
//! Одинаковый seed + одинаковые тики → идентичные snapshots

use std::time::Duration;

use bevy::prelude::*;
use rand::Rng;
use stamina_simulation::*;

/// Запускает симуляцию с seeded запросами и возвращает snapshot мира
fn run_simulation(seed: u64, actor_count: usize, tick_count: usize) -> Vec<u8> {
    let mut app = create_headless_app(seed);
    let config = StaminaConfig::default();
    let caller = app.world_mut().spawn_empty().id();

    let hosts: Vec<Entity> = (0..actor_count)
        .map(|_| spawn_stamina_authority(app.world_mut(), &config).unwrap())
        .collect();
    for &host in &hosts {
        spawn_stamina_observer(app.world_mut(), host, &config).unwrap();
    }

    for _ in 0..tick_count {
        for &host in &hosts {
            let (roll, amount) = {
                let mut rng = app.world_mut().resource_mut::<DeterministicRng>();
                (rng.rng.gen_range(0..20), rng.rng.gen_range(1.0..40.0))
            };

            let request = match roll {
                0 => StaminaRequest::spend(caller, host, amount, CorrelationId::new()),
                1 => StaminaRequest::start_drain(caller, host, Some(amount), CorrelationId::new()),
                2 => StaminaRequest::stop(caller, host),
                _ => continue,
            };
            app.world_mut().send_event(request);
        }

        app.world_mut()
            .resource_mut::<Time<Fixed>>()
            .advance_by(Duration::from_secs_f64(1.0 / 60.0));
        app.world_mut().run_schedule(FixedUpdate);
    }

    stamina_snapshot(app.world_mut())
}

#[test]
fn test_determinism_same_seed() {
    const SEED: u64 = 12345;

    let snapshot1 = run_simulation(SEED, 20, 600);
    let snapshot2 = run_simulation(SEED, 20, 600);

    assert_eq!(
        snapshot1, snapshot2,
        "Симуляция с одинаковым seed ({}) дала разные результаты!",
        SEED
    );
}

#[test]
fn test_determinism_multiple_runs() {
    const SEED: u64 = 42;

    let snapshots: Vec<_> = (0..3).map(|_| run_simulation(SEED, 10, 300)).collect();

    for (i, snapshot) in snapshots.iter().enumerate().skip(1) {
        assert_eq!(
            snapshots[0], *snapshot,
            "Прогон {} дал результат отличный от прогона 0",
            i
        );
    }
}

#[test]
fn test_different_seeds_diverge() {
    let snapshot1 = run_simulation(1, 10, 300);
    let snapshot2 = run_simulation(2, 10, 300);

    assert_ne!(snapshot1, snapshot2);
}
