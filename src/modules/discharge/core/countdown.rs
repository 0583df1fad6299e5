use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

/// Extra time a department gets after asking for more time.
pub const GRACE_MINUTES: i64 = 30;
/// Steps without an SLA turn red after this long.
pub const NO_SLA_CUTOFF_SECONDS: i64 = 30 * 60;
pub const DEFAULT_WARNING_MINUTES: i64 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CountdownPolicy {
    pub sla_minutes: i64,
    pub warning_minutes: i64,
    pub extended: bool,
}

impl CountdownPolicy {
    pub fn new(sla_minutes: i64) -> Self {
        Self {
            sla_minutes,
            warning_minutes: DEFAULT_WARNING_MINUTES,
            extended: false,
        }
    }

    pub fn warning_minutes(mut self, minutes: i64) -> Self {
        self.warning_minutes = minutes;
        self
    }

    pub fn extended(mut self, extended: bool) -> Self {
        self.extended = extended;
        self
    }

    fn allowed_seconds(&self) -> i64 {
        let minutes = if self.extended {
            self.sla_minutes.saturating_add(GRACE_MINUTES)
        } else {
            self.sla_minutes
        };
        minutes.saturating_mul(60)
    }

    fn tone(&self, elapsed_seconds: i64) -> CountdownTone {
        if self.sla_minutes <= 0 {
            return if elapsed_seconds >= NO_SLA_CUTOFF_SECONDS {
                CountdownTone::Red
            } else {
                CountdownTone::Neutral
            };
        }

        let sla_seconds = self.sla_minutes.saturating_mul(60);
        let warning_from = sla_seconds.saturating_sub(self.warning_minutes.saturating_mul(60));
        if elapsed_seconds < warning_from {
            CountdownTone::Green
        } else if elapsed_seconds < self.allowed_seconds() {
            CountdownTone::Yellow
        } else {
            CountdownTone::Red
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CountdownTone {
    Green,
    Yellow,
    Red,
    Neutral,
}

/// Snapshot of a running step's timer. Clients keep ticking from
/// `started_at`; the snapshot is only as fresh as the response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Countdown {
    pub started_at: DateTime<FixedOffset>,
    pub sla_minutes: i64,
    pub extended: bool,
    pub elapsed_seconds: i64,
    /// Seconds left, or seconds past the allowance when `overdue`.
    pub remaining_seconds: i64,
    pub overdue: bool,
    pub display: String,
    pub tone: CountdownTone,
}

impl Countdown {
    pub fn at(started_at: DateTime<FixedOffset>, now: DateTime<Utc>, policy: CountdownPolicy) -> Self {
        let elapsed_seconds = (now - started_at.with_timezone(&Utc)).num_seconds();
        let remaining = policy.allowed_seconds().saturating_sub(elapsed_seconds);

        Self {
            started_at,
            sla_minutes: policy.sla_minutes,
            extended: policy.extended,
            elapsed_seconds,
            remaining_seconds: remaining.saturating_abs(),
            overdue: remaining < 0,
            display: format_elapsed(elapsed_seconds),
            tone: policy.tone(elapsed_seconds),
        }
    }
}

/// `1h 05m 09s`, or `5m 09s` under an hour.
pub fn format_elapsed(total_seconds: i64) -> String {
    let total_seconds = total_seconds.max(0);
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    if hours > 0 {
        format!("{hours}h {minutes:02}m {seconds:02}s")
    } else {
        format!("{minutes}m {seconds:02}s")
    }
}
