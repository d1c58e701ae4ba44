//! Scenario tests for the engine handle, event dispatch, and renderer
//!
//! Everything runs against [`FakeEngine`]; the real ABI is exercised only
//! when the `libmpv` feature links the native library.

use std::sync::Arc;

use crossbeam_channel::Receiver;
use lantern_core::Value;
use lantern_engine::testing::FakeEngine;
use lantern_engine::{Engine, EngineError, EngineEvent};

fn initialized_engine() -> (Engine, Arc<FakeEngine>) {
    let fake = Arc::new(FakeEngine::new());
    let mut engine = Engine::with_backend(Arc::clone(&fake) as Arc<_>);
    engine
        .initialize(&[])
        .expect("fake engine initializes cleanly");
    (engine, fake)
}

fn drain_into(engine: &mut Engine, events: &Receiver<EngineEvent>) -> Vec<EngineEvent> {
    engine.drain_events();
    let mut out = Vec::new();
    while let Ok(event) = events.try_recv() {
        out.push(event);
    }
    out
}

#[test]
fn initialize_applies_baseline_options_before_caller_options() {
    let fake = Arc::new(FakeEngine::new());
    let mut engine = Engine::with_backend(Arc::clone(&fake) as Arc<_>);
    engine
        .initialize(&[("hwdec".to_owned(), "no".to_owned())])
        .expect("init succeeds");

    let options = fake.options();
    let baseline_at = |name: &str| {
        options
            .iter()
            .position(|(n, _)| n == name)
            .unwrap_or_else(|| panic!("option {name} was set"))
    };
    assert_eq!(options[baseline_at("vo")].1, "gpu");
    assert_eq!(options[baseline_at("keep-open")].1, "yes");
    assert_eq!(options[baseline_at("video-sync")].1, "display-resample");

    // The caller's hwdec=no lands after the baseline hwdec=auto, so it wins.
    let hwdec: Vec<&str> = options
        .iter()
        .filter(|(n, _)| n == "hwdec")
        .map(|(_, v)| v.as_str())
        .collect();
    assert_eq!(hwdec, ["auto", "no"]);

    assert!(fake.initialized());
    assert_eq!(fake.log_level().as_deref(), Some("warn"));
}

#[test]
fn initialize_observes_the_baseline_property_set() {
    let (_engine, fake) = initialized_engine();
    let observed = fake.observations();
    for name in ["pause", "time-pos", "duration", "volume", "mute", "eof-reached"] {
        assert!(observed.iter().any(|o| o == name), "{name} is observed");
    }
}

#[test]
fn failed_init_tears_the_handle_down() {
    let fake = Arc::new(FakeEngine::new());
    fake.fail_init(-5);
    let mut engine = Engine::with_backend(Arc::clone(&fake) as Arc<_>);

    match engine.initialize(&[]) {
        Err(EngineError::InitFailed(code)) => assert_eq!(code, -5),
        other => panic!("expected init failure, got {other:?}"),
    }
    assert!(engine.is_shut_down());
    assert!(!fake.initialized());
}

#[test]
fn events_are_republished_in_engine_order() {
    let (mut engine, fake) = initialized_engine();
    let events = engine.subscribe();

    fake.push_event(EngineEvent::FileLoaded);
    fake.push_property_change("time-pos", Value::Double(1.5));
    fake.push_event(EngineEvent::CommandReply { error_code: 0 });

    let seen = drain_into(&mut engine, &events);
    assert_eq!(
        seen,
        vec![
            EngineEvent::FileLoaded,
            EngineEvent::PropertyChanged {
                name: "time-pos".to_owned(),
                value: Value::Double(1.5),
            },
            EngineEvent::CommandReply { error_code: 0 },
        ]
    );
}

#[test]
fn wakeup_signal_fires_when_the_fake_queues_an_event() {
    let (engine, fake) = initialized_engine();
    let wake = engine.wake_receiver();
    assert!(wake.try_recv().is_err());

    fake.push_event(EngineEvent::FileLoaded);
    assert!(wake.try_recv().is_ok());

    // Signals coalesce: two pushes leave at most one pending wake.
    fake.push_event(EngineEvent::FileLoaded);
    fake.push_event(EngineEvent::FileLoaded);
    assert!(wake.try_recv().is_ok());
    assert!(wake.try_recv().is_err());
}

#[test]
fn repeated_observe_registers_once_and_yields_one_event_per_change() {
    let (mut engine, fake) = initialized_engine();
    let events = engine.subscribe();

    engine.observe("volume");
    engine.observe("volume");
    let volume_registrations = fake
        .observations()
        .iter()
        .filter(|o| o.as_str() == "volume")
        .count();
    assert_eq!(volume_registrations, 1);

    fake.push_property_change("volume", Value::Integer(40));
    let seen = drain_into(&mut engine, &events);
    assert_eq!(
        seen,
        vec![EngineEvent::PropertyChanged {
            name: "volume".to_owned(),
            value: Value::Integer(40),
        }]
    );
}

#[test]
fn property_set_round_trips_through_the_native_node_form() {
    let (engine, fake) = initialized_engine();
    engine.set_property_async("volume", &Value::Integer(50));
    assert_eq!(fake.property("volume"), Some(Value::Integer(50)));
}

#[test]
fn unavailable_property_reads_as_none() {
    let (engine, fake) = initialized_engine();
    assert_eq!(engine.get_property("duration"), None);

    fake.seed_property("duration", Value::Double(120.0));
    assert_eq!(engine.get_property("duration"), Some(Value::Double(120.0)));
}

#[test]
fn commands_quote_arguments_containing_whitespace() {
    let (engine, fake) = initialized_engine();
    engine.load_file("my video.mp4");
    engine.command(&["seek", "30", "absolute"]);
    assert_eq!(
        fake.commands(),
        vec![
            "loadfile \"my video.mp4\"".to_owned(),
            "seek 30 absolute".to_owned(),
        ]
    );
}

#[test]
fn end_of_file_is_synthesized_once_per_transition() {
    let (mut engine, fake) = initialized_engine();
    let events = engine.subscribe();

    fake.push_property_change("eof-reached", Value::Bool(true));
    let seen = drain_into(&mut engine, &events);
    assert_eq!(
        seen,
        vec![
            EngineEvent::PropertyChanged {
                name: "eof-reached".to_owned(),
                value: Value::Bool(true),
            },
            EngineEvent::PlaybackFinished,
        ]
    );

    // Still true: no second synthesis.
    fake.push_property_change("eof-reached", Value::Bool(true));
    let seen = drain_into(&mut engine, &events);
    assert_eq!(seen.len(), 1);

    // False then true again: one more synthesis.
    fake.push_property_change("eof-reached", Value::Bool(false));
    fake.push_property_change("eof-reached", Value::Bool(true));
    let seen = drain_into(&mut engine, &events);
    assert!(seen.contains(&EngineEvent::PlaybackFinished));
}

#[test]
fn error_log_lines_surface_as_error_events() {
    let (mut engine, fake) = initialized_engine();
    let events = engine.subscribe();

    fake.push_event(EngineEvent::LogMessage {
        level: "warn".to_owned(),
        text: "something minor".to_owned(),
    });
    fake.push_event(EngineEvent::LogMessage {
        level: "error".to_owned(),
        text: "decoder broke".to_owned(),
    });

    let seen = drain_into(&mut engine, &events);
    let errors: Vec<&EngineEvent> = seen
        .iter()
        .filter(|e| matches!(e, EngineEvent::Error { .. }))
        .collect();
    assert_eq!(
        errors,
        vec![&EngineEvent::Error {
            message: "decoder broke".to_owned(),
        }]
    );
}

#[test]
fn failed_command_replies_surface_as_error_events() {
    let (mut engine, fake) = initialized_engine();
    let events = engine.subscribe();

    fake.push_event(EngineEvent::CommandReply { error_code: -10 });
    let seen = drain_into(&mut engine, &events);
    assert_eq!(seen.len(), 2);
    assert!(matches!(seen[1], EngineEvent::Error { .. }));
}

#[test]
fn shutdown_is_idempotent_and_later_calls_are_no_ops() {
    let (mut engine, fake) = initialized_engine();
    engine.shutdown();
    engine.shutdown();
    assert!(engine.is_shut_down());

    engine.load_file("anything.mp4");
    engine.set_property_async("volume", &Value::Integer(10));
    assert_eq!(engine.get_property("volume"), None);
    assert!(fake.commands().is_empty());
    assert_eq!(fake.property("volume"), None);
}

#[test]
fn renderer_records_frames_and_redraw_requests() {
    let (engine, fake) = initialized_engine();
    let renderer = engine.create_renderer(Box::new(|_| std::ptr::null_mut()));
    assert!(renderer.is_active());

    renderer.render_frame(3, 640, 360);
    renderer.render_frame(3, 1280, 720);
    assert_eq!(fake.render_calls(), vec![(3, 640, 360), (3, 1280, 720)]);

    let redraws = renderer.redraw_requests();
    assert!(redraws.try_recv().is_err());
    fake.request_redraw();
    assert!(redraws.try_recv().is_ok());
}

#[test]
fn render_context_failure_degrades_to_audio_only() {
    let (mut engine, fake) = initialized_engine();
    let events = engine.subscribe();
    fake.fail_render_context(-1);

    let renderer = engine.create_renderer(Box::new(|_| std::ptr::null_mut()));
    assert!(!renderer.is_active());

    // No context: rendering is a silent no-op.
    renderer.render_frame(3, 640, 360);
    assert!(fake.render_calls().is_empty());

    let seen = drain_into(&mut engine, &events);
    assert!(seen
        .iter()
        .any(|e| matches!(e, EngineEvent::Error { message } if message.contains("video"))));
}
