//! Attribute store: speed / stamina / max_stamina
//!
//! Внешний attribute bag, из которого DerivedSpeedModifier читает скорость.
//! Единственная gameplay-математика здесь — clamp stamina в [0, max_stamina].

use bevy::prelude::*;

use crate::stamina::{StaminaController, StaminaSystems};

/// Атрибуты персонажа
///
/// Инвариант: 0 ≤ stamina ≤ max_stamina (проверяется на каждой записи)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct AttributeSet {
    speed: f32,
    stamina: f32,
    max_stamina: f32,
}

impl Default for AttributeSet {
    fn default() -> Self {
        Self {
            speed: 300.0,
            stamina: 100.0,
            max_stamina: 100.0,
        }
    }
}

impl AttributeSet {
    pub fn new(speed: f32, stamina: f32, max_stamina: f32) -> Self {
        let max_stamina = max_stamina.max(0.0);
        Self {
            speed,
            stamina: stamina.clamp(0.0, max_stamina),
            max_stamina,
        }
    }

    pub fn speed(&self) -> f32 {
        self.speed
    }

    pub fn stamina(&self) -> f32 {
        self.stamina
    }

    pub fn max_stamina(&self) -> f32 {
        self.max_stamina
    }

    pub fn set_speed(&mut self, speed: f32) {
        self.speed = speed;
    }

    /// Pre-change clamp: значение вне [0, max_stamina] не записывается как есть
    pub fn set_stamina(&mut self, value: f32) {
        if value.is_nan() {
            return;
        }
        self.stamina = value.clamp(0.0, self.max_stamina);
    }

    /// Additive effect (отрицательный delta = трата). Результат клампится.
    pub fn apply_stamina_delta(&mut self, delta: f32) {
        self.set_stamina(self.stamina + delta);
    }

    /// Снижение max_stamina ре-клампит текущее значение
    pub fn set_max_stamina(&mut self, value: f32) {
        if value.is_nan() {
            return;
        }
        self.max_stamina = value.max(0.0);
        self.stamina = self.stamina.min(self.max_stamina);
    }
}

/// Система: зеркалим stamina controller'а в attribute store
///
/// Store видит то же значение, что и controller (authority или replica).
pub fn sync_stamina_attribute(
    mut query: Query<(&StaminaController, &mut AttributeSet), Changed<StaminaController>>,
) {
    for (controller, mut attributes) in query.iter_mut() {
        if attributes.max_stamina != controller.ceiling() {
            attributes.set_max_stamina(controller.ceiling());
        }
        if attributes.stamina != controller.remaining() {
            attributes.set_stamina(controller.remaining());
        }
    }
}

/// Attributes Plugin
pub struct AttributesPlugin;

impl Plugin for AttributesPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(FixedUpdate, sync_stamina_attribute.after(StaminaSystems));
    }
}
