//! Property-based tests for the native value marshaler
//!
//! Generates arbitrary encodable values (no `Absent`, no interior NUL, no
//! NaN) and checks that the encode/decode pair is lossless and that every
//! native allocation is paired with exactly one free.

use std::sync::Mutex;

use lantern_core::Value;
use lantern_engine::{marshal, outstanding_allocations};
use proptest::prelude::*;

// The allocation counter is process-global; counter-sensitive cases must
// not interleave with each other.
static COUNTER_LOCK: Mutex<()> = Mutex::new(());

fn encodable_text() -> impl Strategy<Value = String> {
    "[^\u{0}]{0,16}"
}

fn encodable_value() -> impl Strategy<Value = Value> {
    let leaf = prop_oneof![
        any::<bool>().prop_map(Value::Bool),
        any::<i64>().prop_map(Value::Integer),
        (-1.0e12f64..1.0e12).prop_map(Value::Double),
        encodable_text().prop_map(Value::Text),
    ];
    leaf.prop_recursive(4, 32, 6, |inner| {
        prop_oneof![
            prop::collection::vec(inner.clone(), 0..6).prop_map(Value::Sequence),
            prop::collection::vec((encodable_text(), inner), 0..6).prop_map(Value::Mapping),
        ]
    })
}

proptest! {
    #[test]
    fn encode_decode_is_lossless(value in encodable_value()) {
        let _guard = COUNTER_LOCK.lock().unwrap();
        let node = marshal::encode(&value).expect("encodable by construction");
        // Safety: the node was produced by the encoder above.
        let decoded = unsafe { marshal::decode(node.raw()) };
        prop_assert_eq!(decoded, value);
    }

    #[test]
    fn every_allocation_is_freed(value in encodable_value()) {
        let _guard = COUNTER_LOCK.lock().unwrap();
        let before = outstanding_allocations();
        {
            let _node = marshal::encode(&value).expect("encodable by construction");
        }
        prop_assert_eq!(outstanding_allocations(), before);
    }

    #[test]
    fn text_with_interior_nul_never_encodes(prefix in "[^\u{0}]{0,8}", suffix in "[^\u{0}]{0,8}") {
        let _guard = COUNTER_LOCK.lock().unwrap();
        let before = outstanding_allocations();
        let text = format!("{prefix}\u{0}{suffix}");
        prop_assert!(marshal::encode(&Value::Text(text)).is_err());
        prop_assert_eq!(outstanding_allocations(), before);
    }
}
