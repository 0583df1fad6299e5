use crate::shared::core::primitives::parse_timestamp;
use chrono::{FixedOffset, TimeDelta};
use serde::Serialize;
use std::sync::LazyLock;

use regex::Regex;

pub const PENDING: &str = "Pending";
pub const NOT_APPLICABLE: &str = "NA";
pub const NO_VALUE: &str = "-";

/// SLA of the first workflow step (bill acknowledged -> bill received).
pub const FIRST_STEP_SLA_MINUTES: i64 = 15;

static DIGITS: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\d+").expect("valid regex"));

fn first_number(raw: &str) -> Option<i64> {
    DIGITS.find(raw).and_then(|m| m.as_str().parse().ok())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Sign {
    Late,
    Early,
    Bare,
}

impl Sign {
    fn of(raw: &str) -> Self {
        if raw.contains("plus") || raw.contains('+') {
            Sign::Late
        } else if raw.contains('-') {
            Sign::Early
        } else {
            Sign::Bare
        }
    }

    fn marker(self) -> &'static str {
        match self {
            Sign::Late => "+",
            Sign::Early => "-",
            Sign::Bare => "",
        }
    }
}

fn is_placeholder(raw: &str) -> bool {
    matches!(raw, PENDING | NOT_APPLICABLE | NO_VALUE)
}

/// Signed minutes behind (+) or ahead of (-) the SLA. Placeholders and
/// strings without digits count as zero; bare numbers count as late.
pub fn parse_delay_minutes(raw: Option<&str>) -> i64 {
    let Some(raw) = raw.filter(|r| !r.is_empty() && !is_placeholder(r)) else {
        return 0;
    };
    let Some(magnitude) = first_number(raw) else {
        return 0;
    };
    match Sign::of(raw) {
        Sign::Early => -magnitude,
        Sign::Late | Sign::Bare => magnitude,
    }
}

/// Compact display form: `+1h:30m`, `-5m`, `36m`.
pub fn format_delay(raw: Option<&str>) -> String {
    let Some(raw) = raw.filter(|r| !r.is_empty()) else {
        return NO_VALUE.to_string();
    };
    if is_placeholder(raw) {
        return raw.to_string();
    }
    let Some(total) = first_number(raw) else {
        return raw.to_string();
    };

    let sign = Sign::of(raw).marker();
    if total >= 60 {
        format!("{sign}{}h:{:02}m", total / 60, total % 60)
    } else {
        format!("{sign}{total}m")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DelayTone {
    OnTime,
    Overdue,
    Neutral,
}

impl DelayTone {
    pub fn of(raw: Option<&str>) -> Self {
        let Some(raw) = raw.filter(|r| !r.is_empty() && !is_placeholder(r)) else {
            return DelayTone::Neutral;
        };
        if raw.contains("plus") || raw.contains('+') {
            DelayTone::Overdue
        } else if raw.contains('-') || raw == "0 mins" {
            DelayTone::OnTime
        } else if raw.starts_with(|c: char| c.is_ascii_digit()) {
            DelayTone::Overdue
        } else {
            DelayTone::Neutral
        }
    }
}

/// Wall-clock time of an upstream timestamp, e.g. `09:05 AM`.
pub fn format_clock_time(raw: Option<&str>, offset: FixedOffset) -> String {
    let Some(raw) = raw.filter(|r| !r.is_empty()) else {
        return PENDING.to_string();
    };
    match parse_timestamp(raw, offset) {
        Some(ts) => ts.with_timezone(&offset).format("%I:%M %p").to_string(),
        None => raw.to_string(),
    }
}

/// Clock time at which a step that started at `start` and took `duration`
/// finished.
pub fn completion_clock_time(start: &str, duration: &str, offset: FixedOffset) -> String {
    if start.is_empty() || duration.is_empty() {
        return NO_VALUE.to_string();
    }
    let minutes = first_number(duration).unwrap_or(0);
    parse_timestamp(start, offset)
        .zip(TimeDelta::try_minutes(minutes))
        .and_then(|(ts, taken)| ts.checked_add_signed(taken))
        .map(|end| end.with_timezone(&offset).format("%I:%M %p").to_string())
        .unwrap_or_else(|| NO_VALUE.to_string())
}

/// `"691 mins"` -> `"11:31"`.
pub fn format_duration(raw: Option<&str>) -> String {
    let Some(raw) = raw.filter(|r| !r.is_empty()) else {
        return NO_VALUE.to_string();
    };
    match first_number(raw) {
        Some(total) => format!("{:02}:{:02}", total / 60, total % 60),
        None => raw.to_string(),
    }
}

/// Delay string for the first workflow step, derived from its two timestamps.
pub fn first_step_delay(ack: Option<&str>, success: Option<&str>, offset: FixedOffset) -> String {
    let Some(ack) = ack.filter(|a| !a.is_empty()) else {
        return NOT_APPLICABLE.to_string();
    };
    let Some(success) = success.filter(|s| !s.is_empty()) else {
        return PENDING.to_string();
    };
    let (Some(start), Some(end)) = (parse_timestamp(ack, offset), parse_timestamp(success, offset))
    else {
        return NOT_APPLICABLE.to_string();
    };

    let delay = (end - start).num_minutes() - FIRST_STEP_SLA_MINUTES;
    if delay > 0 {
        format!("+{delay} mins")
    } else {
        format!("{delay} mins")
    }
}

/// Target durations in the TAT strip: `02h30m`, `45m`, or `N/A` for zero.
pub fn format_target_minutes(minutes: i64) -> String {
    if minutes <= 0 {
        return "N/A".to_string();
    }
    let (hours, mins) = (minutes / 60, minutes % 60);
    if hours > 0 {
        format!("{hours:02}h{mins:02}m")
    } else {
        format!("{mins}m")
    }
}

/// Leading integer of a loosely formatted minute count (`"120 mins"` -> 120).
pub fn leading_minutes(raw: &str) -> i64 {
    let digits: String = raw
        .trim_start()
        .chars()
        .take_while(|c| c.is_ascii_digit())
        .collect();
    digits.parse().unwrap_or(0)
}
