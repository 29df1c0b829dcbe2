//! Dispatch modes for handler methods.
//!
//! The values are owned here; the delivery engine consumes them and is
//! responsible for actually scheduling each invocation accordingly.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Which execution context a handler invocation is scheduled onto.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ThreadMode {
    /// Runs synchronously on the posting call stack. No thread switch.
    #[default]
    Posting,
    /// Runs synchronously when already on the main context, otherwise it is
    /// enqueued there without blocking the poster.
    Main,
    /// Always enqueued to the main context, never synchronous, which bounds
    /// the worst-case latency of `post`.
    MainOrdered,
    /// Runs on a single dedicated worker that processes all such deliveries
    /// strictly in post order, never concurrently with itself.
    Background,
    /// Runs on an unbounded worker pool with no ordering guarantee relative
    /// to other deliveries or to the posting call.
    Async,
}

impl ThreadMode {
    /// All modes, in declaration order.
    pub const ALL: [ThreadMode; 5] = [
        ThreadMode::Posting,
        ThreadMode::Main,
        ThreadMode::MainOrdered,
        ThreadMode::Background,
        ThreadMode::Async,
    ];

    /// Returns the configuration name of this mode.
    pub fn as_str(&self) -> &'static str {
        match self {
            ThreadMode::Posting => "posting",
            ThreadMode::Main => "main",
            ThreadMode::MainOrdered => "main_ordered",
            ThreadMode::Background => "background",
            ThreadMode::Async => "async",
        }
    }

    /// Whether a delivery in this mode may run synchronously inside `post`.
    pub fn may_run_on_posting_thread(&self) -> bool {
        matches!(self, ThreadMode::Posting | ThreadMode::Main)
    }

    /// Whether a delivery in this mode must end up on the main context.
    pub fn is_main_thread_bound(&self) -> bool {
        matches!(self, ThreadMode::Main | ThreadMode::MainOrdered)
    }
}

impl fmt::Display for ThreadMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error returned when parsing an unknown thread mode name.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown thread mode `{0}`, expected one of: posting, main, main_ordered, background, async")]
pub struct ParseThreadModeError(pub String);

impl FromStr for ThreadMode {
    type Err = ParseThreadModeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s.to_lowercase().as_str() {
            "posting" => ThreadMode::Posting,
            "main" => ThreadMode::Main,
            "main_ordered" | "main-ordered" => ThreadMode::MainOrdered,
            "background" => ThreadMode::Background,
            "async" => ThreadMode::Async,
            _ => return Err(ParseThreadModeError(s.to_string())),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_names() {
        for mode in ThreadMode::ALL {
            assert_eq!(mode.as_str().parse::<ThreadMode>(), Ok(mode));
        }
        assert_eq!("MAIN-ORDERED".parse::<ThreadMode>(), Ok(ThreadMode::MainOrdered));
        assert!("ui".parse::<ThreadMode>().is_err());
    }

    #[test]
    fn test_contract_helpers() {
        assert!(ThreadMode::Posting.may_run_on_posting_thread());
        assert!(ThreadMode::Main.may_run_on_posting_thread());
        assert!(!ThreadMode::MainOrdered.may_run_on_posting_thread());
        assert!(ThreadMode::MainOrdered.is_main_thread_bound());
        assert!(!ThreadMode::Background.is_main_thread_bound());
        assert_eq!(ThreadMode::default(), ThreadMode::Posting);
    }
}
