use crate::modules::discharge::core::countdown::{Countdown, CountdownPolicy};
use crate::modules::discharge::core::delay::{
    DelayTone, FIRST_STEP_SLA_MINUTES, NO_VALUE, NOT_APPLICABLE, PENDING, completion_clock_time,
    first_step_delay, format_clock_time, format_delay, format_duration, format_target_minutes,
    leading_minutes, parse_delay_minutes,
};
use crate::modules::discharge::core::ordering::{OrderingContext, SortMode, order_rows};
use crate::modules::discharge::core::phase::{
    Column, DepartmentPhase, DepartmentSlot, StepMarks, department_delay, department_marks,
    first_step_marks, is_extended,
};
use crate::modules::discharge::core::report::{TimelineEntry, Workflow};
use crate::modules::discharge::core::rows::{MergedRow, merge_rows};
use crate::shared::core::primitives::{TicketId, parse_report_date, parse_timestamp, today};
use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;

/// Warning window of the bill step timer.
const FIRST_STEP_WARNING_MINUTES: i64 = 5;

#[derive(Debug, Clone)]
pub struct BoardOptions {
    pub sort: SortMode,
    pub offset: FixedOffset,
    pub now: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Board {
    pub workflow_name: String,
    pub report_date: String,
    pub is_past_date: bool,
    pub columns: Vec<String>,
    pub sort: SortMode,
    pub summary: Summary,
    pub column_counts: Vec<ColumnCount>,
    pub totals: Vec<ColumnTotal>,
    /// Absent on the public demo board.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub targets: Option<TargetStrip>,
    pub rows: Vec<BoardRow>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Summary {
    pub initiated: usize,
    pub on_time: usize,
    pub delayed: usize,
    pub in_progress: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnCount {
    pub column: String,
    pub pending: usize,
    pub completed: usize,
}

/// Accumulated lateness of finished discharges in one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnTotal {
    pub column: String,
    pub total: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TargetStrip {
    pub cash: String,
    pub insurance: String,
    pub first_step: String,
    pub departments: Vec<DepartmentTarget>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentTarget {
    pub department: String,
    pub target: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoardRow {
    pub ticket_id: TicketId,
    pub patient_name: String,
    pub uhid: String,
    pub ward_bed: String,
    pub payment_type: String,
    pub ongoing: bool,
    pub overall: Cell,
    pub first_step: Cell,
    pub departments: Vec<Cell>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "phase", rename_all = "snake_case", rename_all_fields = "camelCase")]
pub enum Cell {
    NotStarted {
        display: String,
        tone: DelayTone,
    },
    InProgress {
        started: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        countdown: Option<Countdown>,
    },
    Completed {
        started: String,
        finished: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        actual: Option<String>,
        display: String,
        tone: DelayTone,
    },
}

impl Cell {
    pub fn phase(&self) -> DepartmentPhase {
        match self {
            Cell::NotStarted { .. } => DepartmentPhase::NotStarted,
            Cell::InProgress { .. } => DepartmentPhase::InProgress,
            Cell::Completed { .. } => DepartmentPhase::Completed,
        }
    }
}

struct CellBuilder<'o> {
    options: &'o BoardOptions,
    is_past_date: bool,
}

impl CellBuilder<'_> {
    fn clock(&self, raw: Option<&str>) -> String {
        format_clock_time(raw, self.options.offset)
    }

    fn countdown(&self, started_at: Option<&str>, policy: CountdownPolicy) -> Option<Countdown> {
        if self.is_past_date {
            return None;
        }
        let started_at = parse_timestamp(started_at?, self.options.offset)?;
        Some(Countdown::at(started_at, self.options.now, policy))
    }

    fn in_progress(&self, marks: StepMarks<'_>, policy: CountdownPolicy) -> Cell {
        Cell::InProgress {
            started: self.clock(marks.started_at),
            countdown: self.countdown(marks.started_at, policy),
        }
    }

    fn overall(&self, row: &MergedRow<'_>) -> Cell {
        let entry = row.timeline;
        if row.is_ongoing() {
            let policy = CountdownPolicy::new(leading_minutes(&entry.target_total_tat));
            return Cell::InProgress {
                started: self.clock(Some(&entry.discharge_start)),
                countdown: self.countdown(Some(&entry.discharge_start), policy),
            };
        }

        let delay = row.overall_delay();
        Cell::Completed {
            started: self.clock(Some(&entry.discharge_start)),
            finished: completion_clock_time(
                &entry.discharge_start,
                &entry.actual_total_tat,
                self.options.offset,
            ),
            actual: Some(format_duration(Some(&entry.actual_total_tat))),
            display: format_delay(Some(delay)),
            tone: DelayTone::of(Some(delay)),
        }
    }

    fn first_step(&self, entry: &TimelineEntry) -> Cell {
        let marks = first_step_marks(entry);
        match marks.phase() {
            DepartmentPhase::InProgress => self.in_progress(
                marks,
                CountdownPolicy::new(FIRST_STEP_SLA_MINUTES)
                    .warning_minutes(FIRST_STEP_WARNING_MINUTES),
            ),
            DepartmentPhase::Completed => {
                let delay = first_step_delay(marks.started_at, marks.finished_at, self.options.offset);
                // The bill step only calls out lateness.
                let tone = match DelayTone::of(Some(&delay)) {
                    DelayTone::Overdue => DelayTone::Overdue,
                    _ => DelayTone::Neutral,
                };
                Cell::Completed {
                    started: self.clock(marks.started_at),
                    finished: self.clock(marks.finished_at),
                    actual: None,
                    display: format_delay(Some(&delay)),
                    tone,
                }
            }
            DepartmentPhase::NotStarted => Cell::NotStarted {
                display: NO_VALUE.to_string(),
                tone: DelayTone::Neutral,
            },
        }
    }

    fn department(&self, row: &MergedRow<'_>, workflow: &Workflow, department: &str) -> Cell {
        let slot = DepartmentSlot::of(department, &workflow.configured_departments);
        let marks = department_marks(row.timeline, department, slot);
        let sla_minutes = workflow.sla_minutes(department);

        if marks.phase() == DepartmentPhase::InProgress {
            let policy =
                CountdownPolicy::new(sla_minutes).extended(is_extended(row.timeline, department));
            return self.in_progress(marks, policy);
        }

        let mut delay = department_delay(row.sla, department, slot).unwrap_or(NOT_APPLICABLE);
        if marks.started_at.is_none() && delay == PENDING {
            delay = NO_VALUE;
        }

        let mut tone = DelayTone::of(Some(delay));
        let reads_late = delay.starts_with(|c: char| c.is_ascii_digit()) || delay.contains("plus");
        if sla_minutes <= 0 && reads_late && tone == DelayTone::Overdue {
            tone = DelayTone::Neutral;
        }

        match marks.finished_at {
            Some(finished) => Cell::Completed {
                started: self.clock(marks.started_at),
                finished: self.clock(Some(finished)),
                actual: None,
                display: format_delay(Some(delay)),
                tone,
            },
            None => Cell::NotStarted {
                display: format_delay(Some(delay)),
                tone,
            },
        }
    }
}

fn summarize(workflow: &Workflow) -> Summary {
    let overall = workflow.sla.iter().map(|sla| sla.overall_delay.as_str());
    let delayed = overall
        .clone()
        .filter(|d| d.to_lowercase().contains("plus"))
        .count();
    let on_time = overall
        .clone()
        .filter(|d| d.contains('-') || *d == "0 mins" || d.to_lowercase().contains("completed"))
        .count();
    let in_progress = overall.filter(|d| *d == PENDING).count();

    Summary {
        initiated: workflow.timeline.len(),
        on_time,
        delayed,
        in_progress,
    }
}

fn count_column(
    rows: &[MergedRow<'_>],
    column: &Column,
    workflow: &Workflow,
) -> ColumnCount {
    let (pending, completed) = match column {
        Column::Overall => {
            let pending = rows.iter().filter(|r| r.is_ongoing()).count();
            (pending, rows.len() - pending)
        }
        Column::FirstStep => {
            let phases = rows.iter().map(|r| first_step_marks(r.timeline).phase());
            (
                phases.clone().filter(|p| *p == DepartmentPhase::InProgress).count(),
                phases.filter(|p| *p == DepartmentPhase::Completed).count(),
            )
        }
        Column::Department(name) => {
            let slot = DepartmentSlot::of(name, &workflow.configured_departments);
            let pending = rows
                .iter()
                .filter(|r| {
                    department_delay(r.sla, name, slot).is_some_and(|d| d != NOT_APPLICABLE)
                        && department_marks(r.timeline, name, slot).is_pending()
                })
                .count();
            let completed = rows
                .iter()
                .filter(|r| {
                    department_marks(r.timeline, name, slot).phase() == DepartmentPhase::Completed
                })
                .count();
            (pending, completed)
        }
    };

    ColumnCount {
        column: column.name().to_string(),
        pending,
        completed,
    }
}

fn late_minutes(delay: &str) -> i64 {
    parse_delay_minutes(Some(delay)).max(0)
}

fn total_for(
    rows: &[MergedRow<'_>],
    column: &Column,
    workflow: &Workflow,
    offset: FixedOffset,
) -> ColumnTotal {
    let total = match column {
        Column::Overall => None,
        Column::FirstStep => {
            let minutes = rows
                .iter()
                .filter(|row| !row.is_ongoing())
                .map(|row| {
                    let marks = first_step_marks(row.timeline);
                    late_minutes(&first_step_delay(marks.started_at, marks.finished_at, offset))
                })
                .fold(0_i64, i64::saturating_add);
            Some(format!("plus {minutes} mins")).filter(|_| minutes > 0)
        }
        Column::Department(name) if workflow.sla_minutes(name) > 0 => {
            let slot = DepartmentSlot::of(name, &workflow.configured_departments);
            let minutes = workflow
                .sla
                .iter()
                .filter(|sla| sla.overall_delay != PENDING)
                .filter_map(|sla| department_delay(Some(sla), name, slot))
                .map(late_minutes)
                .fold(0_i64, i64::saturating_add);
            Some(format!("{minutes} mins")).filter(|_| minutes > 0)
        }
        Column::Department(_) => None,
    };

    ColumnTotal {
        column: column.name().to_string(),
        total: total.map_or_else(|| NO_VALUE.to_string(), |t| format_delay(Some(&t))),
    }
}

fn target_for(workflow: &Workflow, matches: impl Fn(&str) -> bool) -> String {
    workflow
        .timeline
        .iter()
        .find(|entry| matches(&entry.payment_type.to_lowercase()) && !entry.target_total_tat.is_empty())
        .map(|entry| format_target_minutes(leading_minutes(&entry.target_total_tat)))
        .unwrap_or_else(|| "N/A".to_string())
}

fn targets(workflow: &Workflow) -> TargetStrip {
    TargetStrip {
        cash: target_for(workflow, |payment| payment.contains("cash")),
        insurance: target_for(workflow, |payment| {
            payment.contains("insurance") || payment.contains("tpa")
        }),
        first_step: format_target_minutes(FIRST_STEP_SLA_MINUTES),
        departments: workflow
            .configured_departments
            .iter()
            .map(|department| {
                let minutes = workflow.sla_minutes(department);
                DepartmentTarget {
                    department: department.clone(),
                    target: if minutes <= 0 {
                        NO_VALUE.to_string()
                    } else {
                        format_target_minutes(minutes)
                    },
                }
            })
            .collect(),
    }
}

/// Shapes one workflow into the board the dashboard renders.
pub fn build_board(workflow: &Workflow, options: &BoardOptions) -> Board {
    let is_past_date = parse_report_date(&workflow.report_date)
        .is_some_and(|date| date < today(options.offset, options.now));
    let cells = CellBuilder {
        options,
        is_past_date,
    };

    let merged = merge_rows(workflow);
    let context = OrderingContext {
        departments: &workflow.configured_departments,
        offset: options.offset,
    };
    let ordered = order_rows(&merged, &options.sort, context);

    let columns: Vec<Column> = [Column::Overall, Column::FirstStep]
        .into_iter()
        .chain(
            workflow
                .configured_departments
                .iter()
                .map(|d| Column::Department(d.clone())),
        )
        .collect();

    let rows = ordered
        .iter()
        .map(|row| {
            let entry = row.timeline;
            BoardRow {
                ticket_id: entry.ticket_id,
                patient_name: entry.patient_name.clone(),
                uhid: entry.uhid.clone(),
                ward_bed: entry.ward_bed.clone(),
                payment_type: entry.payment_type.clone(),
                ongoing: row.is_ongoing(),
                overall: cells.overall(row),
                first_step: cells.first_step(entry),
                departments: workflow
                    .configured_departments
                    .iter()
                    .map(|department| cells.department(row, workflow, department))
                    .collect(),
            }
        })
        .collect();

    Board {
        workflow_name: workflow.workflow_name.clone(),
        report_date: workflow.report_date.clone(),
        is_past_date,
        columns: columns.iter().map(|c| c.name().to_string()).collect(),
        sort: options.sort.clone(),
        summary: summarize(workflow),
        column_counts: columns
            .iter()
            .map(|column| count_column(&merged, column, workflow))
            .collect(),
        totals: columns
            .iter()
            .map(|column| total_for(&merged, column, workflow, options.offset))
            .collect(),
        targets: Some(targets(workflow)),
        rows,
    }
}
