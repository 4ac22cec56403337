//! Stamina module (server-authoritative meter + request/ack протокол)
//!
//! Authority ответственность:
//! - `current` + state machine (Idle → Draining → RecoveryWaiting → Regenerating → Idle)
//! - Request обработка → Ack originating caller'у
//! - Epsilon-filtered publish → StaminaChanged + StaminaSync
//!
//! Observer ответственность:
//! - Read-only копия `current`, обновляется только из StaminaSync
//! - StaminaChanged на каждый полученный sync
//!
//! UI/виджеты — снаружи, слушают presentation события.

use bevy::prelude::*;

pub mod components;
pub mod error;
pub mod events;
pub mod systems;

// Re-export основных типов
pub use components::{
    ControllerState, RecoveryPending, RequestOutcome, ResourceMeter, StaminaConfig,
    StaminaController, StaminaTicking, SETTLE_TOLERANCE,
};
pub use error::{ConfigError, StaminaError};
pub use events::{
    CorrelationId, StaminaAck, StaminaChanged, StaminaRequest, StaminaRequestKind,
    StaminaUseFailed, StaminaUseSucceeded,
};

use crate::replication::StaminaSync;

/// SystemSet всей stamina цепочки (для ordering снаружи)
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub struct StaminaSystems;

/// Stamina Plugin
///
/// Регистрирует stamina системы в FixedUpdate.
///
/// Порядок выполнения:
/// 1. process_stamina_requests — Spend/StartDrain/Stop → мутации + Ack
/// 2. refresh_stamina_tick_markers — enable/disable tick по новому state
/// 3. advance_stamina_meters — drain/regen (только StaminaTicking)
/// 4. tick_recovery_timers — RecoveryWaiting → Regenerating
/// 5. refresh_stamina_tick_markers — повторно, после timer'ов
/// 6. seed_new_stamina_replicas — новые observers получают последний publish
/// 7. publish_stamina_changes — epsilon filter → StaminaChanged + StaminaSync
/// 8. deliver_stamina_syncs — loopback транспорт → observer replicas
/// 9. dispatch_stamina_acks — caller side → StaminaUseSucceeded/Failed
pub struct StaminaPlugin;

impl Plugin for StaminaPlugin {
    fn build(&self, app: &mut App) {
        app.add_event::<StaminaRequest>()
            .add_event::<StaminaAck>()
            .add_event::<StaminaSync>()
            .add_event::<StaminaChanged>()
            .add_event::<StaminaUseSucceeded>()
            .add_event::<StaminaUseFailed>();

        app.add_systems(
            FixedUpdate,
            (
                systems::process_stamina_requests,
                systems::refresh_stamina_tick_markers,
                systems::advance_stamina_meters,
                systems::tick_recovery_timers,
                systems::refresh_stamina_tick_markers,
                systems::seed_new_stamina_replicas,
                systems::publish_stamina_changes,
                systems::deliver_stamina_syncs,
                systems::dispatch_stamina_acks,
            )
                .chain() // Последовательное выполнение
                .in_set(StaminaSystems),
        );
    }
}
