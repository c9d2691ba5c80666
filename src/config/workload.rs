//! Run definition structures

use serde::{Deserialize, Serialize};
use std::fmt;

/// Completion criteria for each worker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum CompletionMode {
    /// Stop after a fixed number of iterations per worker
    Iterations { count: u64 },
    /// Stop after a wall-clock duration
    Duration { seconds: u64 },
}

impl Default for CompletionMode {
    fn default() -> Self {
        Self::Iterations { count: 1000 }
    }
}

impl fmt::Display for CompletionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Iterations { count } => write!(f, "{} iterations per worker", count),
            Self::Duration { seconds } => write!(f, "{}s", seconds),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_completion_mode_display() {
        assert_eq!(CompletionMode::Iterations { count: 5 }.to_string(), "5 iterations per worker");
        assert_eq!(CompletionMode::Duration { seconds: 30 }.to_string(), "30s");
    }

    #[test]
    fn test_completion_mode_default() {
        assert_eq!(CompletionMode::default(), CompletionMode::Iterations { count: 1000 });
    }
}
