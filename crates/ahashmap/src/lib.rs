//! `HashMap`/`HashSet` type aliases over `ahash`'s faster (non-DoS-resistant)
//! hasher, used throughout the workspace wherever we build maps keyed by
//! paths or symbol names and don't need HashDoS resistance.

#[cfg(feature = "ahash")]
pub type ARandomState = ahash::RandomState;

#[cfg(not(feature = "ahash"))]
pub type ARandomState = std::collections::hash_map::RandomState;

pub type AHashMap<K, V> = std::collections::HashMap<K, V, ARandomState>;
pub type AHashSet<T> = std::collections::HashSet<T, ARandomState>;

pub mod hash_map {
    pub use std::collections::hash_map::Entry;
}

pub mod hash_set {
    pub use std::collections::hash_set::Iter;
}
