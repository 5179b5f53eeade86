//! Deadlines and progress
//!
//! A [`Deadline`] is configuration: how long a session may run. A
//! [`Progress`] is the live counterpart: given the current time it says
//! how far along the session is, on a 0..=1 scale parties use to pace
//! concessions. Times are milliseconds since the unix epoch throughout.

use serde::{Deserialize, Serialize};

/// Session deadline configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Deadline {
    /// A fixed wall-clock budget
    Time { duration_ms: u64 },
    /// A fixed number of rounds, each bounded by `round_duration_ms`
    Rounds { rounds: u32, round_duration_ms: u64 },
}

impl Deadline {
    /// Total wall-clock budget of this deadline
    pub fn duration_ms(&self) -> u64 {
        match self {
            Deadline::Time { duration_ms } => *duration_ms,
            Deadline::Rounds {
                rounds,
                round_duration_ms,
            } => u64::from(*rounds) * round_duration_ms,
        }
    }
}

/// Progress of a running session towards its deadline. Immutable; rounds
/// advance by replacement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Progress {
    Time { start_ms: u64, duration_ms: u64 },
    Rounds { total: u32, current: u32, end_ms: u64 },
}

impl Progress {
    /// Create the progress matching `deadline`, starting at `start_ms`.
    pub fn create(deadline: &Deadline, start_ms: u64) -> Progress {
        match deadline {
            Deadline::Time { duration_ms } => Progress::Time {
                start_ms,
                duration_ms: (*duration_ms).max(1),
            },
            Deadline::Rounds {
                rounds,
                round_duration_ms,
            } => Progress::Rounds {
                total: (*rounds).max(1),
                current: 0,
                end_ms: start_ms + u64::from(*rounds) * round_duration_ms,
            },
        }
    }

    /// How far along the session is at `now_ms`, clamped to [0,1].
    pub fn get(&self, now_ms: u64) -> f64 {
        let ratio = match self {
            Progress::Time {
                start_ms,
                duration_ms,
            } => (now_ms as f64 - *start_ms as f64) / *duration_ms as f64,
            Progress::Rounds { total, current, .. } => f64::from(*current) / f64::from(*total),
        };
        ratio.clamp(0.0, 1.0)
    }

    /// True iff the deadline has passed at `now_ms`
    pub fn is_past_deadline(&self, now_ms: u64) -> bool {
        match self {
            Progress::Time {
                start_ms,
                duration_ms,
            } => now_ms > start_ms + duration_ms,
            Progress::Rounds { total, current, end_ms } => {
                current >= total || now_ms > *end_ms
            }
        }
    }

    /// The time at which the session must be over
    pub fn termination_time_ms(&self) -> u64 {
        match self {
            Progress::Time {
                start_ms,
                duration_ms,
            } => start_ms + duration_ms,
            Progress::Rounds { end_ms, .. } => *end_ms,
        }
    }

    /// Advance one round. No-op for time-based progress; rounds saturate
    /// at their total.
    pub fn advance(&self) -> Progress {
        match self {
            Progress::Time { .. } => *self,
            Progress::Rounds {
                total,
                current,
                end_ms,
            } => Progress::Rounds {
                total: *total,
                current: (current + 1).min(*total),
                end_ms: *end_ms,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_progress_ratio() {
        let progress = Progress::create(&Deadline::Time { duration_ms: 1000 }, 5000);
        assert_eq!(progress.get(5000), 0.0);
        assert_eq!(progress.get(5500), 0.5);
        assert_eq!(progress.get(6000), 1.0);
        // clamped outside the window
        assert_eq!(progress.get(4000), 0.0);
        assert_eq!(progress.get(9000), 1.0);
    }

    #[test]
    fn test_time_past_deadline_is_strict() {
        let progress = Progress::create(&Deadline::Time { duration_ms: 1000 }, 5000);
        assert!(!progress.is_past_deadline(6000));
        assert!(progress.is_past_deadline(6001));
    }

    #[test]
    fn test_rounds_advance() {
        let deadline = Deadline::Rounds {
            rounds: 2,
            round_duration_ms: 100,
        };
        let progress = Progress::create(&deadline, 0);
        assert_eq!(progress.get(0), 0.0);
        assert!(!progress.is_past_deadline(0));
        let after_one = progress.advance();
        assert_eq!(after_one.get(0), 0.5);
        let after_two = after_one.advance();
        assert!(after_two.is_past_deadline(0));
        // saturates
        assert_eq!(after_two.advance(), after_two);
    }

    #[test]
    fn test_rounds_time_exhaustion() {
        let deadline = Deadline::Rounds {
            rounds: 10,
            round_duration_ms: 100,
        };
        let progress = Progress::create(&deadline, 0);
        assert!(progress.is_past_deadline(1001));
    }

    #[test]
    fn test_deadline_duration() {
        assert_eq!(Deadline::Time { duration_ms: 500 }.duration_ms(), 500);
        assert_eq!(
            Deadline::Rounds {
                rounds: 3,
                round_duration_ms: 200
            }
            .duration_ms(),
            600
        );
    }
}
