//! Tests for stamina systems (marker lifecycle, ack routing).

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bevy::prelude::*;

    use crate::replication::StaminaReplica;
    use crate::stamina::components::{RecoveryPending, StaminaConfig, StaminaController, StaminaTicking};
    use crate::stamina::events::{
        CorrelationId, StaminaAck, StaminaChanged, StaminaRequest, StaminaUseFailed,
        StaminaUseSucceeded,
    };
    use crate::stamina::StaminaPlugin;

    fn create_stamina_app() -> App {
        let mut app = App::new();
        app.add_plugins(MinimalPlugins).add_plugins(StaminaPlugin);
        app
    }

    /// Один fixed tick длиной `secs`
    fn step(app: &mut App, secs: f32) {
        app.world_mut()
            .resource_mut::<Time<Fixed>>()
            .advance_by(Duration::from_secs_f32(secs));
        app.world_mut().run_schedule(FixedUpdate);
    }

    fn drain_events<E: Event>(app: &mut App) -> Vec<E> {
        app.world_mut().resource_mut::<Events<E>>().drain().collect()
    }

    fn spawn_host(app: &mut App) -> Entity {
        let controller = StaminaController::authority(&StaminaConfig::default()).unwrap();
        app.world_mut().spawn(controller).id()
    }

    #[test]
    fn test_markers_follow_state_machine() {
        let mut app = create_stamina_app();
        let host = spawn_host(&mut app);
        let caller = app.world_mut().spawn_empty().id();

        step(&mut app, 0.1);
        assert!(app.world().get::<StaminaTicking>(host).is_none());
        assert!(app.world().get::<RecoveryPending>(host).is_none());

        // Draining → tick включён
        app.world_mut()
            .send_event(StaminaRequest::start_drain(caller, host, Some(10.0), CorrelationId::new()));
        step(&mut app, 0.1);
        assert!(app.world().get::<StaminaTicking>(host).is_some());
        assert!(app.world().get::<RecoveryPending>(host).is_none());

        // RecoveryWaiting → tick выключен, timer взведён
        app.world_mut().send_event(StaminaRequest::stop(caller, host));
        step(&mut app, 0.1);
        assert!(app.world().get::<StaminaTicking>(host).is_none());
        assert!(app.world().get::<RecoveryPending>(host).is_some());

        // Timer (1s) сработал → Regenerating
        step(&mut app, 1.0);
        assert!(app.world().get::<StaminaTicking>(host).is_some());
        assert!(app.world().get::<RecoveryPending>(host).is_none());

        // Полный → Idle, никаких marker'ов
        step(&mut app, 1.0);
        assert_eq!(app.world().get::<StaminaController>(host).unwrap().remaining(), 100.0);
        assert!(app.world().get::<StaminaTicking>(host).is_none());
        assert!(app.world().get::<RecoveryPending>(host).is_none());
    }

    #[test]
    fn test_ack_routed_to_caller_with_same_id() {
        let mut app = create_stamina_app();
        let host = spawn_host(&mut app);
        let caller = app.world_mut().spawn_empty().id();

        let ok_id = CorrelationId::new();
        let fail_id = CorrelationId::new();
        app.world_mut().send_event(StaminaRequest::spend(caller, host, 60.0, ok_id));
        app.world_mut().send_event(StaminaRequest::spend(caller, host, 60.0, fail_id));
        step(&mut app, 0.016);

        let acks = drain_events::<StaminaAck>(&mut app);
        assert_eq!(acks.len(), 2);
        assert_eq!((acks[0].correlation_id, acks[0].success), (ok_id, true));
        assert_eq!((acks[1].correlation_id, acks[1].success), (fail_id, false));
        assert!(acks.iter().all(|ack| ack.caller == caller && ack.target == host));

        let succeeded = drain_events::<StaminaUseSucceeded>(&mut app);
        let failed = drain_events::<StaminaUseFailed>(&mut app);
        assert_eq!(succeeded, vec![StaminaUseSucceeded { caller, correlation_id: ok_id }]);
        assert_eq!(failed, vec![StaminaUseFailed { caller, correlation_id: fail_id }]);
    }

    #[test]
    fn test_stop_produces_no_ack() {
        let mut app = create_stamina_app();
        let host = spawn_host(&mut app);
        let caller = app.world_mut().spawn_empty().id();

        app.world_mut().send_event(StaminaRequest::stop(caller, host));
        step(&mut app, 0.016);

        assert!(drain_events::<StaminaAck>(&mut app).is_empty());
    }

    #[test]
    fn test_unknown_target_acks_false() {
        let mut app = create_stamina_app();
        let caller = app.world_mut().spawn_empty().id();
        let nobody = app.world_mut().spawn_empty().id();

        let id = CorrelationId::new();
        app.world_mut().send_event(StaminaRequest::spend(caller, nobody, 1.0, id));
        step(&mut app, 0.016);

        let acks = drain_events::<StaminaAck>(&mut app);
        assert_eq!(acks.len(), 1);
        assert!(!acks[0].success);
        assert_eq!(acks[0].correlation_id, id);
    }

    #[test]
    fn test_request_to_observer_is_noop() {
        let mut app = create_stamina_app();
        let host = spawn_host(&mut app);
        let replica = StaminaController::observer(&StaminaConfig::default()).unwrap();
        let observer = app
            .world_mut()
            .spawn((replica, StaminaReplica { source: host }))
            .id();
        let caller = app.world_mut().spawn_empty().id();

        step(&mut app, 0.016);
        let before = app.world().get::<StaminaController>(observer).unwrap().remaining();

        app.world_mut()
            .send_event(StaminaRequest::spend(caller, observer, 10.0, CorrelationId::new()));
        step(&mut app, 0.016);

        assert!(drain_events::<StaminaAck>(&mut app).is_empty());
        assert_eq!(
            app.world().get::<StaminaController>(observer).unwrap().remaining(),
            before
        );
    }

    #[test]
    fn test_changed_emitted_once_per_tick() {
        let mut app = create_stamina_app();
        let host = spawn_host(&mut app);
        let caller = app.world_mut().spawn_empty().id();

        step(&mut app, 0.016);
        drain_events::<StaminaChanged>(&mut app);

        for _ in 0..4 {
            app.world_mut()
                .send_event(StaminaRequest::spend(caller, host, 5.0, CorrelationId::new()));
        }
        step(&mut app, 0.016);

        let changed = drain_events::<StaminaChanged>(&mut app);
        assert_eq!(changed, vec![StaminaChanged { entity: host, value: 80.0 }]);
    }
}
