use crate::modules::discharge::core::report::{SlaEntry, TimelineEntry};
use serde::{Serialize, Serializer};

pub const OVERALL_COLUMN: &str = "Overall Time";
pub const FIRST_STEP_COLUMN: &str = "Bill Received";

/// A board column a user can sort or filter by.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Column {
    Overall,
    FirstStep,
    Department(String),
}

impl Column {
    pub fn from_name(name: &str) -> Self {
        match name {
            OVERALL_COLUMN => Column::Overall,
            FIRST_STEP_COLUMN => Column::FirstStep,
            department => Column::Department(department.to_string()),
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Column::Overall => OVERALL_COLUMN,
            Column::FirstStep => FIRST_STEP_COLUMN,
            Column::Department(name) => name,
        }
    }
}

impl Serialize for Column {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

/// Which upstream fields carry a department's progress.
///
/// The first configured department is reported through the dedicated
/// `firstDept*` fields instead of the per-department maps.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DepartmentSlot {
    First,
    Subsequent,
}

impl DepartmentSlot {
    pub fn of(department: &str, configured: &[String]) -> Self {
        match configured.iter().position(|d| d == department) {
            Some(0) => DepartmentSlot::First,
            _ => DepartmentSlot::Subsequent,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DepartmentPhase {
    NotStarted,
    InProgress,
    Completed,
}

/// Start/finish timestamps of one step on one row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct StepMarks<'a> {
    pub started_at: Option<&'a str>,
    pub finished_at: Option<&'a str>,
}

impl<'a> StepMarks<'a> {
    fn new(started_at: Option<&'a str>, finished_at: Option<&'a str>) -> Self {
        Self {
            started_at: started_at.filter(|s| !s.is_empty()),
            finished_at: finished_at.filter(|s| !s.is_empty()),
        }
    }

    pub fn phase(&self) -> DepartmentPhase {
        match (self.started_at, self.finished_at) {
            (_, Some(_)) => DepartmentPhase::Completed,
            (Some(_), None) => DepartmentPhase::InProgress,
            (None, None) => DepartmentPhase::NotStarted,
        }
    }

    pub fn is_pending(&self) -> bool {
        self.phase() == DepartmentPhase::InProgress
    }
}

pub fn department_marks<'a>(
    entry: &'a TimelineEntry,
    department: &str,
    slot: DepartmentSlot,
) -> StepMarks<'a> {
    match slot {
        DepartmentSlot::First => StepMarks::new(
            entry.first_dept_ack.as_deref(),
            entry.first_dept_done.as_deref(),
        ),
        DepartmentSlot::Subsequent => StepMarks::new(
            entry
                .department_initiated_times
                .as_ref()
                .and_then(|times| times.get(department))
                .map(String::as_str),
            entry
                .department_completion_times
                .get(department)
                .and_then(|done| done.as_deref()),
        ),
    }
}

/// The bill step: acknowledged, then received.
pub fn first_step_marks(entry: &TimelineEntry) -> StepMarks<'_> {
    StepMarks::new(
        entry.first_dept_ack.as_deref(),
        entry.first_dept_ack_success.as_deref(),
    )
}

pub fn department_delay<'a>(
    sla: Option<&'a SlaEntry>,
    department: &str,
    slot: DepartmentSlot,
) -> Option<&'a str> {
    let sla = sla?;
    let delay = match slot {
        DepartmentSlot::First => Some(sla.first_dept_delay.as_str()),
        DepartmentSlot::Subsequent => sla.department_delays.get(department).map(String::as_str),
    };
    delay.filter(|d| !d.is_empty())
}

/// Whether the department asked for the grace extension on this row.
pub fn is_extended(entry: &TimelineEntry, department: &str) -> bool {
    entry
        .department_more_time_clicks
        .as_ref()
        .and_then(|clicks| clicks.get(department))
        .is_some_and(|click| !click.is_empty())
}
