//! Identifiers for paths and nodes.
//!
//! Ids are monotonically increasing `u64`s drawn from one process-wide
//! counter and are never reused within a session. Deserializing an id
//! advances the counter past it, so ids minted after loading a document
//! cannot collide with the loaded ones.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

static ID_COUNTER: AtomicU64 = AtomicU64::new(1);

fn next_raw() -> u64 {
    ID_COUNTER.fetch_add(1, Ordering::Relaxed)
}

fn observe_raw(raw: u64) {
    ID_COUNTER.fetch_max(raw.saturating_add(1), Ordering::Relaxed);
}

macro_rules! define_id {
    ($(#[$meta:meta])* $name:ident, $prefix:literal) => {
        $(#[$meta])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
        #[serde(transparent)]
        pub struct $name(u64);

        impl $name {
            /// Allocate a fresh id.
            pub fn next() -> Self {
                Self(next_raw())
            }

            /// Wrap a raw value, reserving it so `next` never hands it out.
            pub fn from_raw(raw: u64) -> Self {
                observe_raw(raw);
                Self(raw)
            }

            pub fn raw(self) -> u64 {
                self.0
            }
        }

        impl<'de> Deserialize<'de> for $name {
            fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
                u64::deserialize(deserializer).map(Self::from_raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }
    };
}

define_id!(
    /// Identity of a [`crate::path::Path`] inside a document.
    PathId,
    "path"
);
define_id!(
    /// Identity of a node inside a path. Unique across the whole session.
    NodeId,
    "node"
);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_increasing() {
        let a = NodeId::next();
        let b = NodeId::next();
        assert!(b.raw() > a.raw());
        assert_ne!(PathId::next().raw(), PathId::next().raw());
    }

    #[test]
    fn deserialized_ids_are_reserved() {
        let big = NodeId::next().raw() + 1_000;
        let loaded: NodeId = serde_json::from_str(&big.to_string()).unwrap();
        assert_eq!(loaded.raw(), big);
        assert!(NodeId::next().raw() > big);
    }
}
