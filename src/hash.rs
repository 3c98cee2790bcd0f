use hashbrown::{HashMap, HashSet};

#[cfg(feature = "fast-hash")]
use rustc_hash::FxHasher;
#[cfg(feature = "fast-hash")]
use std::hash::BuildHasherDefault;

#[cfg(not(feature = "fast-hash"))]
use ahash::RandomState;

#[cfg(feature = "fast-hash")]
type Build = BuildHasherDefault<FxHasher>;
#[cfg(not(feature = "fast-hash"))]
type Build = RandomState;

/// Hash map used for series and report bookkeeping.
pub type FastHashMap<K, V> = HashMap<K, V, Build>;

/// Uniqueness set every strategy maintains while deduplicating.
pub type FastHashSet<T> = HashSet<T, Build>;
