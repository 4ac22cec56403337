//! Stamina events — request/ack протокол + presentation уведомления
//!
//! # Flow
//!
//! **Caller → Authority:**
//! - `StaminaRequest` (Spend / StartDrain / Stop) с `CorrelationId`
//!
//! **Authority → Caller (только originating caller, не broadcast):**
//! - `StaminaAck { success, correlation_id }` (Stop ack не получает)
//!
//! **Caller side presentation:**
//! - `StaminaUseSucceeded` / `StaminaUseFailed` (из Ack)
//! - `StaminaChanged` (authority: epsilon-filtered; observer: каждый sync)

use bevy::prelude::*;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Correlation id: связывает request с его ack
///
/// Caller генерирует сам (`CorrelationId::new()`), authority возвращает как есть.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CorrelationId(pub Uuid);

impl CorrelationId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CorrelationId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Тип запроса к stamina authority
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StaminaRequestKind {
    /// One-shot списание `cost` (check-and-decrement)
    Spend { cost: f32 },
    /// Начать непрерывный drain. `None` → `drain_rate_default` из конфига
    StartDrain { rate: Option<f32> },
    /// Остановить drain (fire-and-forget, без ack)
    Stop,
}

/// Request: caller → authority
#[derive(Event, Debug, Clone)]
pub struct StaminaRequest {
    /// Кто отправил (получатель ack)
    pub caller: Entity,
    /// Entity со `StaminaController` (authority)
    pub target: Entity,
    pub kind: StaminaRequestKind,
    pub correlation_id: CorrelationId,
}

impl StaminaRequest {
    pub fn spend(caller: Entity, target: Entity, cost: f32, correlation_id: CorrelationId) -> Self {
        Self { caller, target, kind: StaminaRequestKind::Spend { cost }, correlation_id }
    }

    pub fn start_drain(
        caller: Entity,
        target: Entity,
        rate: Option<f32>,
        correlation_id: CorrelationId,
    ) -> Self {
        Self { caller, target, kind: StaminaRequestKind::StartDrain { rate }, correlation_id }
    }

    /// Stop не квитируется — correlation id генерится только для логов
    pub fn stop(caller: Entity, target: Entity) -> Self {
        Self { caller, target, kind: StaminaRequestKind::Stop, correlation_id: CorrelationId::new() }
    }
}

/// Ack: authority → originating caller
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct StaminaAck {
    pub caller: Entity,
    pub target: Entity,
    pub success: bool,
    pub correlation_id: CorrelationId,
}

/// Presentation: значение stamina изменилось
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct StaminaChanged {
    pub entity: Entity,
    pub value: f32,
}

/// Presentation: запрос caller'а принят
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct StaminaUseSucceeded {
    pub caller: Entity,
    pub correlation_id: CorrelationId,
}

/// Presentation: запрос caller'а отклонён
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct StaminaUseFailed {
    pub caller: Entity,
    pub correlation_id: CorrelationId,
}
