//! Backoff policy between retry attempts.
//!
//! Controls how long the engine waits before re-sending an exchange after
//! a send failure, timeout, or undecodable response.

use std::time::Duration;

/// Backoff strategy between retry attempts.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum Backoff {
    /// No delay between retries (immediate re-send on failure).
    #[default]
    None,

    /// Fixed delay before each retry attempt.
    Fixed {
        /// Delay before each retry
        delay: Duration,
    },

    /// Exponential backoff: delay doubles after each attempt.
    Exponential {
        /// Delay before the first retry
        initial: Duration,
        /// Maximum delay cap
        max: Duration,
    },
}

impl Backoff {
    /// Fixed delay before each retry.
    pub fn fixed(delay: Duration) -> Self {
        Self::Fixed { delay }
    }

    /// Exponential backoff starting at `initial`, capped at `max`.
    pub fn exponential(initial: Duration, max: Duration) -> Self {
        Self::Exponential { initial, max }
    }

    /// The delay before retry attempt `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        match self {
            Self::None => Duration::ZERO,
            Self::Fixed { delay } => *delay,
            Self::Exponential { initial, max } => {
                let shift = attempt.saturating_sub(1).min(32);
                initial
                    .checked_mul(1u32 << shift.min(31))
                    .map_or(*max, |d| d.min(*max))
            }
        }
    }
}
