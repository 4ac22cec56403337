//! Request/ack systems.

use bevy::prelude::*;

use crate::logger;
use crate::stamina::components::StaminaController;
use crate::stamina::error::StaminaError;
use crate::stamina::events::{
    StaminaAck, StaminaRequest, StaminaRequestKind, StaminaUseFailed, StaminaUseSucceeded,
};

/// Система: обработка StaminaRequest на authority
///
/// Порядок обработки = порядок событий (per-sender ordering сохраняется).
/// Ack пишется ПОСЛЕ мутации — caller никогда не видит ack раньше state.
/// - Observer target → no-op (warning), ack не отправляем
/// - Неизвестный target → ack false (Stop молча игнорируется)
pub fn process_stamina_requests(
    mut requests: EventReader<StaminaRequest>,
    mut controllers: Query<&mut StaminaController>,
    mut acks: EventWriter<StaminaAck>,
) {
    for request in requests.read() {
        let Ok(mut controller) = controllers.get_mut(request.target) else {
            logger::log_warning(&format!(
                "Stamina request [{}] for entity {:?} without StaminaController",
                request.correlation_id, request.target
            ));

            if request.kind != StaminaRequestKind::Stop {
                acks.write(StaminaAck {
                    caller: request.caller,
                    target: request.target,
                    success: false,
                    correlation_id: request.correlation_id,
                });
            }
            continue;
        };

        match controller.handle_request(request.kind, request.correlation_id) {
            Ok(Some(outcome)) => {
                acks.write(StaminaAck {
                    caller: request.caller,
                    target: request.target,
                    success: outcome.success,
                    correlation_id: outcome.correlation_id,
                });
            }
            Ok(None) => {}
            Err(StaminaError::MissingAuthority) => {
                logger::log_warning(&format!(
                    "Stamina request [{}] ignored: entity {:?} is an observer",
                    request.correlation_id, request.target
                ));
            }
            Err(err) => {
                logger::log_error(&format!(
                    "Stamina request [{}] failed: {}",
                    request.correlation_id, err
                ));
            }
        }
    }
}

/// Система: caller side — Ack → presentation события
pub fn dispatch_stamina_acks(
    mut acks: EventReader<StaminaAck>,
    mut succeeded: EventWriter<StaminaUseSucceeded>,
    mut failed: EventWriter<StaminaUseFailed>,
) {
    for ack in acks.read() {
        if ack.success {
            succeeded.write(StaminaUseSucceeded {
                caller: ack.caller,
                correlation_id: ack.correlation_id,
            });
        } else {
            failed.write(StaminaUseFailed {
                caller: ack.caller,
                correlation_id: ack.correlation_id,
            });
        }
    }
}
