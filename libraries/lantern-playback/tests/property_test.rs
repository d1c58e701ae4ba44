//! Property-based checks on state folding

use std::sync::Arc;

use lantern_core::Value;
use lantern_engine::testing::FakeEngine;
use lantern_engine::Engine;
use lantern_playback::PlaybackController;
use proptest::prelude::*;

fn controller() -> (PlaybackController, Arc<FakeEngine>) {
    let fake = Arc::new(FakeEngine::new());
    let mut engine = Engine::with_backend(Arc::clone(&fake) as Arc<_>);
    engine.initialize(&[]).expect("fake engine initializes");
    (PlaybackController::new(engine), fake)
}

proptest! {
    #[test]
    fn snapshot_volume_stays_in_percent_range(changes in prop::collection::vec(any::<i64>(), 0..16)) {
        let (mut controller, fake) = controller();
        for change in changes {
            fake.push_property_change("volume", Value::Integer(change));
            let _ = controller.pump();
            prop_assert!(controller.state().volume <= 100);
        }
    }

    #[test]
    fn requested_volume_reaches_the_engine_clamped(volume in any::<i64>()) {
        let (mut controller, fake) = controller();
        fake.push_property_change("volume", Value::Integer(50));
        let _ = controller.pump();

        controller.set_volume(volume);
        let expected = volume.clamp(0, 100);
        if expected != 50 {
            prop_assert_eq!(fake.property("volume"), Some(Value::Integer(expected)));
        }
    }

    #[test]
    fn absolute_seeks_never_go_negative(position in -1.0e6f64..1.0e6) {
        let (controller, fake) = controller();
        controller.seek(position);
        let sent = fake.property("time-pos").and_then(|v| v.as_f64());
        prop_assert_eq!(sent, Some(position.max(0.0)));
    }
}
