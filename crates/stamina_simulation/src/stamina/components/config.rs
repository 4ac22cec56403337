//! Stamina config (load-time параметры meter'а).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::stamina::error::ConfigError;

/// Параметры stamina meter'а
///
/// Дефолты совпадают с типичным sprint-сетапом:
/// 100 stamina, regen 10/sec после 1 sec паузы.
///
/// Инвариант после `validate()`: ceiling > 0, все rates/delay/epsilon >= 0 и finite.
/// Невалидные значения НЕ клампятся — конструктор контроллера возвращает ошибку.
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct StaminaConfig {
    /// Максимум stamina
    pub ceiling: f32,
    /// Drain rate (units/sec) для StartDrain без явного rate
    pub drain_rate_default: f32,
    /// Скорость регенерации (units/sec)
    pub regen_rate: f32,
    /// Пауза после траты/drain перед регенерацией (секунды)
    pub regen_delay: f32,
    /// Минимальная дельта для broadcast изменения (noise suppression)
    pub change_epsilon: f32,
}

impl Default for StaminaConfig {
    fn default() -> Self {
        Self {
            ceiling: 100.0,
            drain_rate_default: 10.0,
            regen_rate: 10.0,
            regen_delay: 1.0,
            change_epsilon: 0.01,
        }
    }
}

impl StaminaConfig {
    /// Загрузить конфиг из RON строки и провалидировать
    ///
    /// Отсутствующие поля берутся из `Default`.
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let config: Self =
            ron::from_str(source).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let fields = [
            ("ceiling", self.ceiling),
            ("drain_rate_default", self.drain_rate_default),
            ("regen_rate", self.regen_rate),
            ("regen_delay", self.regen_delay),
            ("change_epsilon", self.change_epsilon),
        ];

        for (field, value) in fields {
            if !value.is_finite() {
                return Err(ConfigError::NonFinite { field });
            }
        }

        if self.ceiling <= 0.0 {
            return Err(ConfigError::NonPositiveCeiling(self.ceiling));
        }

        for (field, value) in fields.into_iter().skip(1) {
            if value < 0.0 {
                return Err(ConfigError::NegativeRate { field, value });
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_default_is_valid() {
        let config = StaminaConfig::default();
        assert_eq!(config.ceiling, 100.0);
        assert_eq!(config.regen_rate, 10.0);
        assert_eq!(config.regen_delay, 1.0);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_config_rejects_zero_ceiling() {
        let config = StaminaConfig { ceiling: 0.0, ..Default::default() };
        assert_eq!(config.validate(), Err(ConfigError::NonPositiveCeiling(0.0)));
    }

    #[test]
    fn test_config_rejects_negative_rates() {
        let config = StaminaConfig { regen_rate: -1.0, ..Default::default() };
        assert_eq!(
            config.validate(),
            Err(ConfigError::NegativeRate { field: "regen_rate", value: -1.0 })
        );

        let config = StaminaConfig { change_epsilon: -0.5, ..Default::default() };
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NegativeRate { field: "change_epsilon", .. })
        ));
    }

    #[test]
    fn test_config_rejects_nan() {
        let config = StaminaConfig { regen_delay: f32::NAN, ..Default::default() };
        assert_eq!(config.validate(), Err(ConfigError::NonFinite { field: "regen_delay" }));
    }

    #[test]
    fn test_config_from_ron_partial() {
        let config = StaminaConfig::from_ron_str("(ceiling: 250.0, regen_delay: 0.5)").unwrap();
        assert_eq!(config.ceiling, 250.0);
        assert_eq!(config.regen_delay, 0.5);
        // Остальное из Default
        assert_eq!(config.regen_rate, 10.0);
    }

    #[test]
    fn test_config_from_ron_invalid() {
        assert!(matches!(
            StaminaConfig::from_ron_str("(ceiling: -5.0)"),
            Err(ConfigError::NonPositiveCeiling(_))
        ));
        assert!(matches!(
            StaminaConfig::from_ron_str("not ron at all"),
            Err(ConfigError::Parse(_))
        ));
    }
}
