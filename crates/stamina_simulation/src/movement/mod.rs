//! Movement domain — speed cap из attribute store
//!
//! Содержит:
//! - DerivedSpeedModifier (base speed fallback)
//! - MaxSpeed (итоговый cap, читает movement/navigation слой)
//! - update_movement_caps (FixedUpdate)

use bevy::prelude::*;

use crate::attributes::{sync_stamina_attribute, AttributeSet};

/// Speed modifier: attribute `speed` с fallback на base
///
/// Без своего state — чистый read-through на каждый запрос.
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
#[require(MaxSpeed)]
pub struct DerivedSpeedModifier {
    /// Скорость если attribute store отсутствует или speed <= 0
    pub base_speed: f32,
}

impl Default for DerivedSpeedModifier {
    fn default() -> Self {
        Self { base_speed: 600.0 }
    }
}

impl DerivedSpeedModifier {
    pub fn new(base_speed: f32) -> Self {
        Self { base_speed }
    }

    pub fn max_speed(&self, attributes: Option<&AttributeSet>) -> f32 {
        match attributes.map(AttributeSet::speed) {
            Some(speed) if speed > 0.0 => speed,
            _ => self.base_speed,
        }
    }
}

/// Итоговый movement cap (units/sec)
#[derive(Component, Debug, Clone, Copy, PartialEq, Default, Reflect)]
#[reflect(Component)]
pub struct MaxSpeed(pub f32);

/// Система: пересчитать MaxSpeed из атрибутов
pub fn update_movement_caps(
    mut query: Query<(&DerivedSpeedModifier, Option<&AttributeSet>, &mut MaxSpeed)>,
) {
    for (modifier, attributes, mut cap) in query.iter_mut() {
        let speed = modifier.max_speed(attributes);
        // set_if_neq: не триггерим Changed<MaxSpeed> без изменения
        cap.set_if_neq(MaxSpeed(speed));
    }
}

/// Movement Plugin
pub struct MovementPlugin;

impl Plugin for MovementPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(FixedUpdate, update_movement_caps.after(sync_stamina_attribute));
    }
}
