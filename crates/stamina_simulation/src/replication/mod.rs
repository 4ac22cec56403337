//! Replication domain — authority/observer роли и sync stamina значения
//!
//! Архитектура:
//! - Authority (host) единственный пишет `current` → `StaminaSync` по epsilon-фильтру
//! - Observer держит read-only копию, обновляется ТОЛЬКО из `StaminaSync`
//! - Request/ack канал независим от sync канала (ack не ждёт sync и наоборот)
//!
//! Транспорт здесь in-process loopback: `StaminaSync` доставляется всем
//! entity со `StaminaReplica { source }`. Реальная сеть подменяет только доставку.

use bevy::prelude::*;

/// Роль инстанса (передаётся при создании, без runtime type inspection)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum NetRole {
    /// Host: владеет `current` и state machine
    #[default]
    Authority,
    /// Remote observer: только зеркалит полученные значения
    Observer,
}

impl NetRole {
    pub fn is_authority(self) -> bool {
        matches!(self, NetRole::Authority)
    }
}

/// ReplicationTransport: authority → observers
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct StaminaSync {
    /// Authority entity (источник значения)
    pub source: Entity,
    pub value: f32,
}

/// Observer-side link на authority entity
///
/// Entity с этим компонентом + `StaminaController` (Observer) получает
/// все `StaminaSync` от `source`.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct StaminaReplica {
    pub source: Entity,
}

/// Publish-on-delta фильтр (noise suppression)
///
/// Пропускает значение если:
/// - ещё ничего не публиковали (initial sync)
/// - |value - last| > epsilon
/// - значение осело на границе (0 или ceiling) и отличается от last хоть на что-то,
///   иначе observer навсегда застрянет в пределах epsilon от границы
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub struct ChangeFilter {
    epsilon: f32,
    last_published: Option<f32>,
}

impl ChangeFilter {
    pub fn new(epsilon: f32) -> Self {
        Self {
            epsilon,
            last_published: None,
        }
    }

    pub fn last_published(&self) -> Option<f32> {
        self.last_published
    }

    /// Вернуть значение для broadcast или `None` если изменение в пределах epsilon
    pub fn publish(&mut self, value: f32, at_bound: bool) -> Option<f32> {
        let changed = match self.last_published {
            None => true,
            Some(last) => {
                let delta = (value - last).abs();
                delta > self.epsilon || (at_bound && delta > 0.0)
            }
        };

        if changed {
            self.last_published = Some(value);
            Some(value)
        } else {
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_publish_always_passes() {
        let mut filter = ChangeFilter::new(5.0);
        assert_eq!(filter.publish(100.0, true), Some(100.0));
        assert_eq!(filter.last_published(), Some(100.0));
    }

    #[test]
    fn test_small_deltas_suppressed() {
        let mut filter = ChangeFilter::new(1.0);
        filter.publish(50.0, false);

        assert_eq!(filter.publish(50.5, false), None);
        assert_eq!(filter.publish(50.9, false), None);
        // Дельта считается от последнего ОПУБЛИКОВАННОГО, не от последнего виденного
        assert_eq!(filter.publish(51.2, false), Some(51.2));
    }

    #[test]
    fn test_bound_settles_inside_epsilon() {
        let mut filter = ChangeFilter::new(1.0);
        filter.publish(0.4, false);

        // 0.4 → 0.0 меньше epsilon, но это граница
        assert_eq!(filter.publish(0.0, true), Some(0.0));
        // Повтор той же границы не публикуется
        assert_eq!(filter.publish(0.0, true), None);
    }

    #[test]
    fn test_zero_epsilon_publishes_any_change() {
        let mut filter = ChangeFilter::new(0.0);
        filter.publish(10.0, false);
        assert_eq!(filter.publish(10.0, false), None);
        assert_eq!(filter.publish(10.001, false), Some(10.001));
    }

    #[test]
    fn test_net_role_default_is_authority() {
        assert!(NetRole::default().is_authority());
        assert!(!NetRole::Observer.is_authority());
    }
}
