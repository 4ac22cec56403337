//! StaminaController — authoritative stamina meter + state machine.
//!
//! # State machine
//!
//! ```text
//! Idle ──StartDrain──► Draining ──StopDrain / current==0──► RecoveryWaiting
//!  ▲                      ▲                                    │ timer (regen_delay)
//!  │                      └──────────StartDrain────────────────┤
//!  │                      └──────────StartDrain──────┐         ▼
//!  └──────current==ceiling────────────────────── Regenerating ◄┘
//! ```
//!
//! - Idle / RecoveryWaiting: без per-tick работы (RecoveryWaiting = one-shot timer)
//! - Draining / Regenerating: требуют tick'а
//! - TrySpend: one-shot списание, перевзводит recovery timer (кроме Draining)
//!
//! Инвариант: 0 ≤ current ≤ ceiling после любой мутации.

use bevy::prelude::*;
use std::time::Duration;

use crate::logger;
use crate::replication::{ChangeFilter, NetRole};
use crate::stamina::components::config::StaminaConfig;
use crate::stamina::error::StaminaError;
use crate::stamina::events::{CorrelationId, StaminaRequestKind};

/// Tolerance для settle-сравнений (drain → 0, regen → ceiling)
pub const SETTLE_TOLERANCE: f32 = 1.0e-4;

/// Состояние stamina state machine (ровно одно активно)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum ControllerState {
    #[default]
    Idle,
    Draining,
    RecoveryWaiting,
    Regenerating,
}

impl ControllerState {
    /// Нужен ли периодический tick в этом состоянии
    pub fn needs_tick(self) -> bool {
        matches!(self, ControllerState::Draining | ControllerState::Regenerating)
    }
}

/// Числовая часть meter'а
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct ResourceMeter {
    pub current: f32,
    pub ceiling: f32,
    /// Текущий drain rate (units/sec), задаётся StartDrain
    pub drain_rate: f32,
    pub drain_rate_default: f32,
    pub regen_rate: f32,
    pub regen_delay: f32,
    pub change_epsilon: f32,
}

impl ResourceMeter {
    fn from_config(config: &StaminaConfig, initial: f32) -> Self {
        Self {
            current: initial,
            ceiling: config.ceiling,
            drain_rate: 0.0,
            drain_rate_default: config.drain_rate_default,
            regen_rate: config.regen_rate,
            regen_delay: config.regen_delay,
            change_epsilon: config.change_epsilon,
        }
    }

    /// Записать значение с clamp в [0, ceiling] (NaN игнорируется)
    fn set_clamped(&mut self, value: f32) {
        if value.is_nan() {
            return;
        }
        self.current = value.clamp(0.0, self.ceiling);
    }

    pub fn is_empty(&self) -> bool {
        self.current <= 0.0
    }

    pub fn is_full(&self) -> bool {
        self.current >= self.ceiling
    }
}

/// Результат request'а (Ack payload до адресации caller'у)
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RequestOutcome {
    pub success: bool,
    pub correlation_id: CorrelationId,
}

/// Stamina controller component
///
/// Authority инстанс мутирует `current` и state; observer инстанс только
/// зеркалит значения из sync (`apply_synchronized`).
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct StaminaController {
    meter: ResourceMeter,
    state: ControllerState,
    role: NetRole,
    /// Recovery timer handle (at most one; arm = replace, cancel = None)
    #[reflect(ignore)]
    recovery: Option<Timer>,
    publish: ChangeFilter,
}

/// Marker: controller в Draining/Regenerating (tick systems фильтруют по нему)
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct StaminaTicking;

/// Marker: recovery timer взведён
#[derive(Component, Debug, Default, Clone, Copy)]
pub struct RecoveryPending;

impl StaminaController {
    /// Создать controller. Невалидный конфиг → `InvalidConfiguration` (без clamp).
    ///
    /// Authority стартует с `current = ceiling`, observer — с 0 до первого sync.
    pub fn new(config: &StaminaConfig, role: NetRole) -> Result<Self, StaminaError> {
        config.validate()?;

        let initial = if role.is_authority() { config.ceiling } else { 0.0 };

        Ok(Self {
            meter: ResourceMeter::from_config(config, initial),
            state: ControllerState::Idle,
            role,
            recovery: None,
            publish: ChangeFilter::new(config.change_epsilon),
        })
    }

    pub fn authority(config: &StaminaConfig) -> Result<Self, StaminaError> {
        Self::new(config, NetRole::Authority)
    }

    pub fn observer(config: &StaminaConfig) -> Result<Self, StaminaError> {
        Self::new(config, NetRole::Observer)
    }

    /// GetRemaining: чистое чтение, работает на любой роли
    pub fn remaining(&self) -> f32 {
        self.meter.current
    }

    pub fn ceiling(&self) -> f32 {
        self.meter.ceiling
    }

    pub fn meter(&self) -> &ResourceMeter {
        &self.meter
    }

    pub fn state(&self) -> ControllerState {
        self.state
    }

    pub fn role(&self) -> NetRole {
        self.role
    }

    pub fn is_authority(&self) -> bool {
        self.role.is_authority()
    }

    /// Tick включён только у authority в Draining/Regenerating
    pub fn is_ticking(&self) -> bool {
        self.is_authority() && self.state.needs_tick()
    }

    pub fn is_recovery_pending(&self) -> bool {
        self.recovery.is_some()
    }

    /// Сколько осталось до конца recovery паузы (None если timer не взведён)
    pub fn recovery_remaining(&self) -> Option<Duration> {
        self.recovery.as_ref().map(Timer::remaining)
    }

    /// Dispatch request'а по kind. `Ok(None)` для Stop (ack не отправляется).
    pub fn handle_request(
        &mut self,
        kind: StaminaRequestKind,
        correlation_id: CorrelationId,
    ) -> Result<Option<RequestOutcome>, StaminaError> {
        match kind {
            StaminaRequestKind::Spend { cost } => self.try_spend(cost, correlation_id).map(Some),
            StaminaRequestKind::StartDrain { rate } => {
                self.start_drain(rate, correlation_id).map(Some)
            }
            StaminaRequestKind::Stop => self.stop_drain().map(|_| None),
        }
    }

    /// TrySpend: atomic check-and-decrement
    ///
    /// Успех iff `current >= cost`. При успехе списывает сразу и перевзводит
    /// recovery timer (отменяя регенерацию).
    ///
    /// Во время Draining timer намеренно НЕ взводится: drain продолжается,
    /// паузу взведёт StopDrain (или drain до нуля).
    pub fn try_spend(
        &mut self,
        cost: f32,
        correlation_id: CorrelationId,
    ) -> Result<RequestOutcome, StaminaError> {
        self.ensure_authority()?;

        if !cost.is_finite() || cost < 0.0 || self.meter.current < cost {
            logger::log(&format!(
                "Stamina spend rejected [{}]: cost {} > current {:.2}",
                correlation_id, cost, self.meter.current
            ));
            return Ok(RequestOutcome { success: false, correlation_id });
        }

        self.meter.set_clamped(self.meter.current - cost);

        if self.state != ControllerState::Draining {
            self.arm_recovery();
        }

        Ok(RequestOutcome { success: true, correlation_id })
    }

    /// StartDrain: отказ iff `current <= 0` (или rate невалиден)
    ///
    /// Повторный StartDrain во время drain заменяет rate (без очереди).
    /// Во время RecoveryWaiting/Regenerating отменяет timer и сразу уходит в Draining.
    pub fn start_drain(
        &mut self,
        rate: Option<f32>,
        correlation_id: CorrelationId,
    ) -> Result<RequestOutcome, StaminaError> {
        self.ensure_authority()?;

        let rate = rate.unwrap_or(self.meter.drain_rate_default);

        if self.meter.is_empty() || !rate.is_finite() || rate < 0.0 {
            logger::log(&format!(
                "Stamina drain rejected [{}]: current {:.2}, rate {}",
                correlation_id, self.meter.current, rate
            ));
            return Ok(RequestOutcome { success: false, correlation_id });
        }

        self.meter.drain_rate = rate;
        self.cancel_recovery();
        self.transition(ControllerState::Draining);

        Ok(RequestOutcome { success: true, correlation_id })
    }

    /// StopDrain: fire-and-forget, всегда перевзводит recovery timer
    ///
    /// Идемпотентно: повторный вызов заменяет timer, не стакает.
    pub fn stop_drain(&mut self) -> Result<(), StaminaError> {
        self.ensure_authority()?;

        self.meter.drain_rate = 0.0;
        self.arm_recovery();
        Ok(())
    }

    /// Continuous tick (Draining / Regenerating). Observer и quiescent состояния — no-op.
    pub fn tick(&mut self, delta_secs: f32) {
        if !self.is_authority() {
            return;
        }

        match self.state {
            ControllerState::Draining => {
                let next = self.meter.current - self.meter.drain_rate * delta_secs;
                if next <= SETTLE_TOLERANCE {
                    self.meter.current = 0.0;
                    self.meter.drain_rate = 0.0;
                    self.arm_recovery();
                } else {
                    self.meter.set_clamped(next);
                }
            }
            ControllerState::Regenerating => {
                let next = self.meter.current + self.meter.regen_rate * delta_secs;
                if next >= self.meter.ceiling - SETTLE_TOLERANCE {
                    self.meter.current = self.meter.ceiling;
                    self.transition(ControllerState::Idle);
                } else {
                    self.meter.set_clamped(next);
                }
            }
            ControllerState::Idle | ControllerState::RecoveryWaiting => {}
        }
    }

    /// Продвинуть recovery timer. Возвращает true если timer сработал.
    pub fn tick_recovery(&mut self, delta: Duration) -> bool {
        let Some(timer) = self.recovery.as_mut() else {
            return false;
        };

        timer.tick(delta);
        if !timer.finished() {
            return false;
        }

        self.recovery = None;
        if self.state == ControllerState::RecoveryWaiting {
            self.transition(ControllerState::Regenerating);
        }
        true
    }

    /// Значение для broadcast (authority, epsilon-filtered). Вызывать раз в tick.
    pub fn publish_change(&mut self) -> Option<f32> {
        if !self.is_authority() {
            return None;
        }

        let at_bound = self.meter.is_empty() || self.meter.is_full();
        self.publish.publish(self.meter.current, at_bound)
    }

    /// Последнее опубликованное authority значение (то, что видят observers)
    pub fn last_published(&self) -> Option<f32> {
        self.publish.last_published()
    }

    /// Observer: применить полученное значение. Всегда возвращает значение
    /// для OnChanged (epsilon уже отфильтрован на authority).
    ///
    /// Host и observer должны строиться из одного `StaminaConfig`: значение
    /// выше ceiling observer'а клампится (с warning'ом).
    pub fn apply_synchronized(&mut self, value: f32) -> Option<f32> {
        if self.is_authority() {
            logger::log_warning("Stamina sync ignored: instance is authoritative");
            return None;
        }

        self.meter.set_clamped(value);
        if self.meter.current != value && !value.is_nan() {
            logger::log_warning(&format!(
                "Stamina sync {} clamped to {} (observer ceiling {})",
                value, self.meter.current, self.meter.ceiling
            ));
        }
        Some(self.meter.current)
    }

    fn ensure_authority(&self) -> Result<(), StaminaError> {
        if self.is_authority() {
            Ok(())
        } else {
            Err(StaminaError::MissingAuthority)
        }
    }

    /// Arm = cancel + reschedule (at most one pending timer)
    fn arm_recovery(&mut self) {
        self.recovery = Some(Timer::from_seconds(self.meter.regen_delay, TimerMode::Once));
        self.transition(ControllerState::RecoveryWaiting);
    }

    fn cancel_recovery(&mut self) {
        self.recovery = None;
    }

    fn transition(&mut self, next: ControllerState) {
        if self.state != next {
            logger::log(&format!(
                "Stamina state {:?} → {:?} (current: {:.2})",
                self.state, next, self.meter.current
            ));
            self.state = next;
        }
    }
}
