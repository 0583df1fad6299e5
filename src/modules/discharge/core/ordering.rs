use crate::modules::discharge::core::delay::{
    NOT_APPLICABLE, PENDING, first_step_delay, parse_delay_minutes,
};
use crate::modules::discharge::core::phase::{
    Column, DepartmentPhase, DepartmentSlot, department_delay, department_marks, first_step_marks,
};
use crate::modules::discharge::core::rows::MergedRow;
use chrono::FixedOffset;
use serde::Serialize;
use std::cmp::Reverse;

/// How the board rows are ordered. Only one mode is active at a time.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "mode", content = "column", rename_all = "snake_case")]
pub enum SortMode {
    #[default]
    Default,
    ByColumn(Column),
    ByPending(Column),
}

impl SortMode {
    /// Selecting the active mode again switches back to the default order;
    /// anything else replaces the current mode.
    pub fn select(self, selected: SortMode) -> SortMode {
        if self == selected {
            SortMode::Default
        } else {
            selected
        }
    }
}

/// Everything ordering needs to know about the workflow.
#[derive(Debug, Clone, Copy)]
pub struct OrderingContext<'a> {
    pub departments: &'a [String],
    pub offset: FixedOffset,
}

/// Ongoing rows first, then completed rows with the largest delay first.
pub fn default_order<'a>(rows: &[MergedRow<'a>]) -> Vec<MergedRow<'a>> {
    let (ongoing, mut completed): (Vec<_>, Vec<_>) =
        rows.iter().copied().partition(MergedRow::is_ongoing);
    completed.sort_by_key(|row| Reverse(parse_delay_minutes(Some(row.overall_delay()))));
    ongoing.into_iter().chain(completed).collect()
}

pub fn order_rows<'a>(
    rows: &[MergedRow<'a>],
    mode: &SortMode,
    context: OrderingContext<'_>,
) -> Vec<MergedRow<'a>> {
    let mut ordered = default_order(rows);
    match mode {
        SortMode::Default => {}
        SortMode::ByColumn(column) => {
            ordered.sort_by_key(|row| Reverse(column_delay_minutes(row, column, context)));
        }
        SortMode::ByPending(column) => {
            ordered.sort_by_key(|row| !has_pending_item(row, column, context));
        }
    }
    ordered
}

/// Delay in minutes shown in `column`, or `None` when there is nothing to
/// rank (pending, not applicable, or missing).
pub fn column_delay_minutes(
    row: &MergedRow<'_>,
    column: &Column,
    context: OrderingContext<'_>,
) -> Option<i64> {
    let delay = match column {
        Column::Overall => row.sla.map(|sla| sla.overall_delay.clone()),
        Column::FirstStep => {
            let marks = first_step_marks(row.timeline);
            match marks.phase() {
                DepartmentPhase::Completed => Some(first_step_delay(
                    marks.started_at,
                    marks.finished_at,
                    context.offset,
                )),
                _ => None,
            }
        }
        Column::Department(name) => {
            let slot = DepartmentSlot::of(name, context.departments);
            department_delay(row.sla, name, slot).map(str::to_string)
        }
    }?;

    if delay.is_empty() || delay == PENDING || delay == NOT_APPLICABLE {
        return None;
    }
    Some(parse_delay_minutes(Some(&delay)))
}

/// Whether the row still has open work in `column`.
pub fn has_pending_item(row: &MergedRow<'_>, column: &Column, context: OrderingContext<'_>) -> bool {
    match column {
        Column::Overall => row.is_ongoing(),
        Column::FirstStep => first_step_marks(row.timeline).is_pending(),
        Column::Department(name) => {
            let slot = DepartmentSlot::of(name, context.departments);
            department_marks(row.timeline, name, slot).is_pending()
        }
    }
}
