//! Stamina Simulation Core
//!
//! Server-authoritative stamina meter на Bevy 0.16 ECS (headless, без рендера).
//!
//! ARCHITECTURE:
//! - Authority (host) = единственный writer `current` + state machine
//! - Observers = read-only копия через StaminaSync
//! - Caller ↔ Authority = request/ack по CorrelationId
//! - UI/виджеты, ownership актёров, сетевой транспорт — внешние слои

use std::time::Duration;

use bevy::prelude::*;
use bevy::time::TimeUpdateStrategy;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod attributes;
pub mod logger;
pub mod movement;
pub mod replication;
pub mod stamina;

// Re-export основных типов
pub use attributes::{AttributeSet, AttributesPlugin};
pub use movement::{DerivedSpeedModifier, MaxSpeed, MovementPlugin};
pub use replication::{ChangeFilter, NetRole, StaminaReplica, StaminaSync};
pub use stamina::{
    ConfigError, ControllerState, CorrelationId, RecoveryPending, StaminaAck, StaminaChanged,
    StaminaConfig, StaminaController, StaminaError, StaminaPlugin, StaminaRequest,
    StaminaRequestKind, StaminaSystems, StaminaTicking, StaminaUseFailed, StaminaUseSucceeded,
};

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_duration(fixed_tick()))
            .add_plugins((StaminaPlugin, AttributesPlugin, MovementPlugin));
    }
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Длина simulation tick'а (60Hz)
pub fn fixed_tick() -> Duration {
    Duration::from_secs_f64(1.0 / 60.0)
}

/// Ручной шаг времени: каждый `app.update()` = один FixedUpdate tick
/// (первый frame только инициализирует `Time<Real>`, delta = 0)
///
/// Без этого `update()` тикает по реальному времени (недетерминированно).
pub fn use_manual_stepping(app: &mut App) {
    app.insert_resource(TimeUpdateStrategy::ManualDuration(fixed_tick()));
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    logger::init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .add_plugins(SimulationPlugin);

    app
}

/// Spawn authority stamina entity (+ speed cap из атрибутов)
pub fn spawn_stamina_authority(
    world: &mut World,
    config: &StaminaConfig,
) -> Result<Entity, StaminaError> {
    let controller = StaminaController::authority(config)?;
    Ok(world
        .spawn((
            controller,
            AttributeSet::new(300.0, config.ceiling, config.ceiling),
            DerivedSpeedModifier::default(),
        ))
        .id())
}

/// Spawn observer replica, зеркалящую `source`
pub fn spawn_stamina_observer(
    world: &mut World,
    source: Entity,
    config: &StaminaConfig,
) -> Result<Entity, StaminaError> {
    let controller = StaminaController::observer(config)?;
    Ok(world.spawn((controller, StaminaReplica { source })).id())
}

/// Snapshot значений stamina для сравнения детерминизма
///
/// Порядок по Entity index; пишем remaining + state.
pub fn stamina_snapshot(world: &mut World) -> Vec<u8> {
    let mut query = world.query::<(Entity, &StaminaController)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    entities.sort_by_key(|(entity, _)| entity.index());

    let mut snapshot = Vec::new();
    for (entity, controller) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(&controller.remaining().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", controller.state()).as_bytes());
    }

    snapshot
}
