//! DST transition policies for wall-clock resolution.

use serde::{Deserialize, Serialize};

/// Policy for wall-clock times that fall in a spring-forward gap.
///
/// Ambiguous times (the repeated hour when clocks fall back) always resolve to
/// the earliest instant; only nonexistent times are governed by this policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DstPolicy {
    /// Keep the offset in force before the gap, so 02:30 on a 02:00 → 03:00
    /// transition day resolves to 03:30 local.
    #[default]
    ShiftForward,
    /// Refuse the time with `ScheduleError::NonexistentLocalTime`.
    Reject,
}
