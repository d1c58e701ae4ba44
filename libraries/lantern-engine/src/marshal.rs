//! Value marshaling across the engine boundary
//!
//! Bidirectional, recursive conversion between [`Value`] and the engine's
//! native tagged-union node format. Encoding is explicit per variant and
//! fails hard on anything without a native representation; decoding maps
//! unknown native tags to `Value::Absent` so newer engines stay readable.
//!
//! Every native allocation made here is owned by an [`OwnedNode`], whose
//! `Drop` frees the whole tree exactly once. The tree is built bottom-up:
//! a failed child conversion frees everything already allocated and never
//! links a partial parent.

use std::ffi::{CStr, CString};
use std::os::raw::c_char;
use std::ptr;
use std::sync::atomic::{AtomicI64, Ordering};

use lantern_core::Value;
use thiserror::Error;

use crate::ffi::{self, RawNode, RawNodeData, RawNodeList};

/// Conversion failures during encoding
///
/// Decoding never fails; these only arise on the way into the engine.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum MarshalError {
    /// The value has no native representation
    #[error("value has no native representation: {0}")]
    Unsupported(&'static str),

    /// Text cannot cross the boundary because it contains an interior NUL
    #[error("text contains an interior nul byte")]
    NulByte,
}

/// Result type for marshaling operations
pub type Result<T> = std::result::Result<T, MarshalError>;

// Net count of live native allocations (strings, child arrays, key arrays,
// list headers). Exposed so tests can assert encode/free pairing.
static OUTSTANDING: AtomicI64 = AtomicI64::new(0);

/// Number of native allocations currently outstanding
pub fn outstanding_allocations() -> i64 {
    OUTSTANDING.load(Ordering::SeqCst)
}

fn track_alloc() {
    OUTSTANDING.fetch_add(1, Ordering::SeqCst);
}

fn track_free() {
    OUTSTANDING.fetch_sub(1, Ordering::SeqCst);
}

/// An encoded native node tree, freed exactly once on drop
pub struct OwnedNode {
    raw: RawNode,
}

impl OwnedNode {
    /// Borrow the raw node for submission to the engine
    pub fn raw(&self) -> &RawNode {
        &self.raw
    }

    /// Decode this node back into a [`Value`]
    pub fn to_value(&self) -> Value {
        // Safety: the tree was built by `encode` and is fully linked.
        unsafe { decode(&self.raw) }
    }
}

impl Drop for OwnedNode {
    fn drop(&mut self) {
        // Safety: `encode` is the only constructor, so every pointer in the
        // tree is live and owned by this node.
        unsafe { free_node(&mut self.raw) };
    }
}

impl std::fmt::Debug for OwnedNode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_tuple("OwnedNode").field(&self.to_value()).finish()
    }
}

/// Encode a [`Value`] into an owned native node tree
///
/// `Value::Absent` and text with interior NUL bytes are hard failures; a
/// failed encode leaves no native allocation behind.
pub fn encode(value: &Value) -> Result<OwnedNode> {
    Ok(OwnedNode {
        raw: encode_node(value)?,
    })
}

fn encode_node(value: &Value) -> Result<RawNode> {
    let node = match value {
        Value::Absent => return Err(MarshalError::Unsupported("absent value")),
        Value::Bool(flag) => RawNode {
            format: ffi::FORMAT_FLAG,
            u: RawNodeData {
                flag: i32::from(*flag),
            },
        },
        Value::Integer(int64) => RawNode {
            format: ffi::FORMAT_INT64,
            u: RawNodeData { int64: *int64 },
        },
        Value::Double(double) => RawNode {
            format: ffi::FORMAT_DOUBLE,
            u: RawNodeData { double_: *double },
        },
        Value::Text(text) => RawNode {
            format: ffi::FORMAT_STRING,
            u: RawNodeData {
                string: alloc_text(text)?,
            },
        },
        Value::Sequence(items) => {
            let mut children: Vec<RawNode> = Vec::with_capacity(items.len());
            for item in items {
                match encode_node(item) {
                    Ok(child) => children.push(child),
                    Err(err) => {
                        release_partial(children, Vec::new());
                        return Err(err);
                    }
                }
            }
            make_list_node(ffi::FORMAT_NODE_ARRAY, children, None)
        }
        Value::Mapping(pairs) => {
            let mut keys: Vec<*mut c_char> = Vec::with_capacity(pairs.len());
            let mut children: Vec<RawNode> = Vec::with_capacity(pairs.len());
            for (key, item) in pairs {
                let key_ptr = match alloc_text(key) {
                    Ok(ptr) => ptr,
                    Err(err) => {
                        release_partial(children, keys);
                        return Err(err);
                    }
                };
                keys.push(key_ptr);
                match encode_node(item) {
                    Ok(child) => children.push(child),
                    Err(err) => {
                        release_partial(children, keys);
                        return Err(err);
                    }
                }
            }
            make_list_node(ffi::FORMAT_NODE_MAP, children, Some(keys))
        }
    };
    Ok(node)
}

/// Allocate a NUL-terminated copy of `text`
fn alloc_text(text: &str) -> Result<*mut c_char> {
    let bytes = CString::new(text).map_err(|_| MarshalError::NulByte)?;
    track_alloc();
    Ok(bytes.into_raw())
}

/// Move fully-encoded children (and keys, for maps) into a list node
fn make_list_node(
    format: i32,
    children: Vec<RawNode>,
    keys: Option<Vec<*mut c_char>>,
) -> RawNode {
    let num = children.len() as i32;

    let values = Box::into_raw(children.into_boxed_slice()).cast::<RawNode>();
    track_alloc();

    let keys_ptr = match keys {
        Some(keys) => {
            let ptr = Box::into_raw(keys.into_boxed_slice()).cast::<*mut c_char>();
            track_alloc();
            ptr
        }
        None => ptr::null_mut(),
    };

    let list = Box::into_raw(Box::new(RawNodeList {
        num,
        values,
        keys: keys_ptr,
    }));
    track_alloc();

    RawNode {
        format,
        u: RawNodeData { list },
    }
}

/// Free children and keys that were encoded before a sibling failed
fn release_partial(children: Vec<RawNode>, keys: Vec<*mut c_char>) {
    for mut child in children {
        // Safety: each child was fully encoded by `encode_node`.
        unsafe { free_node(&mut child) };
    }
    for key in keys {
        // Safety: each key came from `alloc_text`.
        unsafe { drop(CString::from_raw(key)) };
        track_free();
    }
}

/// Recursively free a node tree built by [`encode`]
///
/// # Safety
///
/// `node` must have been produced by `encode_node` and not freed before;
/// children are freed before their parent container, and key strings only
/// for map nodes.
unsafe fn free_node(node: &mut RawNode) {
    match node.format {
        ffi::FORMAT_STRING => {
            drop(CString::from_raw(node.u.string));
            track_free();
        }
        ffi::FORMAT_NODE_ARRAY | ffi::FORMAT_NODE_MAP => {
            let list = node.u.list;
            if !list.is_null() {
                let num = (*list).num.max(0) as usize;
                for i in 0..num {
                    free_node(&mut *(*list).values.add(i));
                }
                drop(Box::from_raw(ptr::slice_from_raw_parts_mut(
                    (*list).values,
                    num,
                )));
                track_free();
                if node.format == ffi::FORMAT_NODE_MAP && !(*list).keys.is_null() {
                    for i in 0..num {
                        let key = *(*list).keys.add(i);
                        if !key.is_null() {
                            drop(CString::from_raw(key));
                            track_free();
                        }
                    }
                    drop(Box::from_raw(ptr::slice_from_raw_parts_mut(
                        (*list).keys,
                        num,
                    )));
                    track_free();
                }
                drop(Box::from_raw(list));
                track_free();
            }
        }
        _ => {}
    }
    node.format = ffi::FORMAT_NONE;
}

/// Decode a native node into a [`Value`]
///
/// Unknown or unsupported native tags decode to `Value::Absent`; the
/// engine may introduce tags this bridge does not understand yet.
///
/// # Safety
///
/// Every pointer reachable from `node` must be live and correctly tagged
/// by `node.format` (true for engine-produced nodes and `encode` output).
pub unsafe fn decode(node: &RawNode) -> Value {
    match node.format {
        ffi::FORMAT_STRING => {
            Value::Text(CStr::from_ptr(node.u.string).to_string_lossy().into_owned())
        }
        ffi::FORMAT_FLAG => Value::Bool(node.u.flag != 0),
        ffi::FORMAT_INT64 => Value::Integer(node.u.int64),
        ffi::FORMAT_DOUBLE => Value::Double(node.u.double_),
        ffi::FORMAT_NODE_ARRAY => {
            let list = &*node.u.list;
            let num = list.num.max(0) as usize;
            let mut items = Vec::with_capacity(num);
            for i in 0..num {
                items.push(decode(&*list.values.add(i)));
            }
            Value::Sequence(items)
        }
        ffi::FORMAT_NODE_MAP => {
            let list = &*node.u.list;
            let num = list.num.max(0) as usize;
            let mut pairs = Vec::with_capacity(num);
            for i in 0..num {
                let key = CStr::from_ptr(*list.keys.add(i))
                    .to_string_lossy()
                    .into_owned();
                pairs.push((key, decode(&*list.values.add(i))));
            }
            Value::Mapping(pairs)
        }
        _ => Value::Absent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    // The allocation counter is process-global; counter-sensitive tests
    // serialize on this lock so parallel test threads cannot skew deltas.
    static COUNTER_LOCK: Mutex<()> = Mutex::new(());

    fn sample_nested() -> Value {
        Value::Mapping(vec![
            ("title".into(), Value::Text("news".into())),
            (
                "streams".into(),
                Value::Sequence(vec![
                    Value::Mapping(vec![
                        ("bitrate".into(), Value::Integer(2500)),
                        ("fps".into(), Value::Double(29.97)),
                        ("live".into(), Value::Bool(true)),
                    ]),
                    Value::Text("backup".into()),
                ]),
            ),
            ("empty".into(), Value::Sequence(vec![])),
        ])
    }

    #[test]
    fn scalars_round_trip() {
        for value in [
            Value::Bool(true),
            Value::Bool(false),
            Value::Integer(-42),
            Value::Double(1.5),
            Value::Text(String::new()),
            Value::Text("display-resample".into()),
        ] {
            let node = encode(&value).unwrap();
            assert_eq!(node.to_value(), value);
        }
    }

    #[test]
    fn nested_structures_round_trip() {
        let value = sample_nested();
        let node = encode(&value).unwrap();
        assert_eq!(node.to_value(), value);
    }

    #[test]
    fn encode_free_pairing_leaves_nothing_outstanding() {
        let _guard = COUNTER_LOCK.lock().unwrap();
        let before = outstanding_allocations();
        {
            let node = encode(&sample_nested()).unwrap();
            assert!(outstanding_allocations() > before);
            drop(node);
        }
        assert_eq!(outstanding_allocations(), before);
    }

    #[test]
    fn absent_is_a_hard_encode_failure() {
        assert_eq!(
            encode(&Value::Absent).unwrap_err(),
            MarshalError::Unsupported("absent value")
        );
    }

    #[test]
    fn failed_child_encode_frees_every_prior_allocation() {
        let _guard = COUNTER_LOCK.lock().unwrap();
        let before = outstanding_allocations();
        let value = Value::Mapping(vec![
            ("first".into(), Value::Text("kept".into())),
            (
                "second".into(),
                Value::Sequence(vec![Value::Integer(1), Value::Absent]),
            ),
        ]);
        assert!(encode(&value).is_err());
        assert_eq!(outstanding_allocations(), before);
    }

    #[test]
    fn interior_nul_in_text_fails_cleanly() {
        let _guard = COUNTER_LOCK.lock().unwrap();
        let before = outstanding_allocations();
        let value = Value::Mapping(vec![("key".into(), Value::Text("a\0b".into()))]);
        assert_eq!(encode(&value).unwrap_err(), MarshalError::NulByte);
        assert_eq!(outstanding_allocations(), before);
    }

    #[test]
    fn interior_nul_in_key_fails_cleanly() {
        let _guard = COUNTER_LOCK.lock().unwrap();
        let before = outstanding_allocations();
        let value = Value::Mapping(vec![
            ("fine".into(), Value::Integer(7)),
            ("bad\0key".into(), Value::Integer(8)),
        ]);
        assert_eq!(encode(&value).unwrap_err(), MarshalError::NulByte);
        assert_eq!(outstanding_allocations(), before);
    }

    #[test]
    fn empty_containers_round_trip() {
        let value = Value::Mapping(vec![
            ("seq".into(), Value::Sequence(vec![])),
            ("map".into(), Value::Mapping(vec![])),
        ]);
        let node = encode(&value).unwrap();
        assert_eq!(node.to_value(), value);
    }

    #[test]
    fn unknown_native_tag_decodes_to_absent() {
        let raw = RawNode {
            format: ffi::FORMAT_BYTE_ARRAY,
            u: RawNodeData {
                byte_array: std::ptr::null_mut(),
            },
        };
        assert_eq!(unsafe { decode(&raw) }, Value::Absent);
    }
}
