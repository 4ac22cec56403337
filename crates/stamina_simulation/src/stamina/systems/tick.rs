//! Tick, timer и publish systems.

use bevy::prelude::*;

use crate::replication::{StaminaReplica, StaminaSync};
use crate::stamina::components::{RecoveryPending, StaminaController, StaminaTicking};
use crate::stamina::events::StaminaChanged;

/// Система: continuous drain/regen
///
/// Только entities со `StaminaTicking` (authority в Draining/Regenerating).
/// Idle/RecoveryWaiting сюда вообще не попадают.
pub fn advance_stamina_meters(
    mut query: Query<&mut StaminaController, With<StaminaTicking>>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta_secs();

    for mut controller in query.iter_mut() {
        controller.tick(delta);
    }
}

/// Система: one-shot recovery timers (RecoveryWaiting → Regenerating)
///
/// Идёт ПОСЛЕ advance_stamina_meters: регенерация начинается со следующего tick'а.
pub fn tick_recovery_timers(
    mut query: Query<&mut StaminaController, With<RecoveryPending>>,
    time: Res<Time<Fixed>>,
) {
    let delta = time.delta();

    for mut controller in query.iter_mut() {
        controller.tick_recovery(delta);
    }
}

/// Система: синхронизация marker'ов со state machine
///
/// Аналог enable/disable component tick: `StaminaTicking` только в
/// Draining/Regenerating, `RecoveryPending` только пока timer взведён.
pub fn refresh_stamina_tick_markers(
    mut commands: Commands,
    query: Query<
        (Entity, &StaminaController, Has<StaminaTicking>, Has<RecoveryPending>),
        Changed<StaminaController>,
    >,
) {
    for (entity, controller, has_ticking, has_pending) in query.iter() {
        match (controller.is_ticking(), has_ticking) {
            (true, false) => {
                commands.entity(entity).insert(StaminaTicking);
            }
            (false, true) => {
                commands.entity(entity).remove::<StaminaTicking>();
            }
            _ => {}
        }

        match (controller.is_recovery_pending(), has_pending) {
            (true, false) => {
                commands.entity(entity).insert(RecoveryPending);
            }
            (false, true) => {
                commands.entity(entity).remove::<RecoveryPending>();
            }
            _ => {}
        }
    }
}

/// Система: authority publish (epsilon-filtered, максимум раз в tick)
///
/// Все мутации за tick (requests + drain/regen) схлопываются в один
/// StaminaChanged + StaminaSync.
pub fn publish_stamina_changes(
    mut query: Query<(Entity, &mut StaminaController), Changed<StaminaController>>,
    mut changed: EventWriter<StaminaChanged>,
    mut syncs: EventWriter<StaminaSync>,
) {
    for (entity, mut controller) in query.iter_mut() {
        // Фильтр не должен сам себя триггерить через Changed<T>
        let Some(value) = controller.bypass_change_detection().publish_change() else {
            continue;
        };

        changed.write(StaminaChanged { entity, value });
        syncs.write(StaminaSync { source: entity, value });
    }
}

/// Система: seed для только что появившихся replicas
///
/// Observer, подключившийся после первого publish, иначе ждал бы следующей
/// дельты > epsilon (у quiescent host'а её может не быть вообще). Получает
/// последнее опубликованное значение своего source. Если source ещё ничего
/// не публиковал, seed не нужен: первый publish дойдёт обычным sync'ом.
pub fn seed_new_stamina_replicas(
    mut replicas: Query<(Entity, &StaminaReplica, &mut StaminaController), Added<StaminaReplica>>,
    sources: Query<&StaminaController, Without<StaminaReplica>>,
    mut changed: EventWriter<StaminaChanged>,
) {
    for (entity, replica, mut controller) in replicas.iter_mut() {
        let Some(value) = sources
            .get(replica.source)
            .ok()
            .filter(|source| source.is_authority())
            .and_then(StaminaController::last_published)
        else {
            continue;
        };

        if let Some(value) = controller.apply_synchronized(value) {
            changed.write(StaminaChanged { entity, value });
        }
    }
}

/// Система: loopback ReplicationTransport — доставка sync observer'ам
///
/// Observer не фильтрует по epsilon: каждый sync → StaminaChanged.
pub fn deliver_stamina_syncs(
    mut syncs: EventReader<StaminaSync>,
    mut replicas: Query<(Entity, &StaminaReplica, &mut StaminaController)>,
    mut changed: EventWriter<StaminaChanged>,
) {
    for sync in syncs.read() {
        for (entity, replica, mut controller) in replicas.iter_mut() {
            if replica.source != sync.source {
                continue;
            }

            if let Some(value) = controller.apply_synchronized(sync.value) {
                changed.write(StaminaChanged { entity, value });
            }
        }
    }
}
