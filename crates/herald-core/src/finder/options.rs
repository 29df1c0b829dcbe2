//! Finder configuration.

use serde::{Deserialize, Serialize};

/// Number of pooled find states kept by default.
pub const DEFAULT_POOL_SIZE: usize = 4;

/// Namespaces whose types are never scanned for handlers by default.
pub const DEFAULT_RESERVED_PREFIXES: [&str; 3] = ["std::", "core::", "alloc::"];

/// Options of a [`SubscriberMethodFinder`](super::SubscriberMethodFinder).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinderOptions {
    /// Fail on malformed handler methods instead of skipping them.
    pub strict_verification: bool,

    /// Never consult precompiled indexes; always introspect.
    pub ignore_generated_index: bool,

    /// Type-name prefixes at which the hierarchy walk stops.
    pub reserved_prefixes: Vec<String>,

    /// Number of pooled find states.
    pub pool_size: usize,
}

impl Default for FinderOptions {
    fn default() -> Self {
        Self {
            strict_verification: false,
            ignore_generated_index: false,
            reserved_prefixes: DEFAULT_RESERVED_PREFIXES
                .iter()
                .map(|prefix| prefix.to_string())
                .collect(),
            pool_size: DEFAULT_POOL_SIZE,
        }
    }
}
