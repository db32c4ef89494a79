//! Fast hash collections used for identity sets and join maps.

pub use rustc_hash::{FxHashMap, FxHashSet};
