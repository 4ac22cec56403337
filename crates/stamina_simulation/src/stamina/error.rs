//! Stamina errors.
//!
//! Отказ в запросе (не хватает stamina, drain на нуле) — НЕ ошибка,
//! это `StaminaAck { success: false }`. Сюда попадает только:
//! - невалидный конфиг (фатально при создании контроллера)
//! - вызов authority-операции на observer инстансе (no-op + warning)

use thiserror::Error;

/// Ошибки валидации/загрузки `StaminaConfig`
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("ceiling must be > 0, got {0}")]
    NonPositiveCeiling(f32),

    #[error("{field} must be >= 0, got {value}")]
    NegativeRate { field: &'static str, value: f32 },

    #[error("{field} must be finite")]
    NonFinite { field: &'static str },

    #[error("failed to parse stamina config: {0}")]
    Parse(String),
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum StaminaError {
    #[error("invalid stamina configuration: {0}")]
    InvalidConfiguration(#[from] ConfigError),

    /// Операция меняет authoritative state, а инстанс — observer
    #[error("operation requires authority, instance is an observer")]
    MissingAuthority,
}
