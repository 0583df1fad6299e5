use crate::modules::discharge::core::delay::{NOT_APPLICABLE, PENDING};
use crate::modules::discharge::core::report::{SlaEntry, TimelineEntry, Workflow};
use crate::shared::core::primitives::TicketId;
use std::collections::HashMap;

/// One patient row: a timeline entry joined with its SLA assessment.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MergedRow<'a> {
    pub timeline: &'a TimelineEntry,
    pub sla: Option<&'a SlaEntry>,
}

impl<'a> MergedRow<'a> {
    pub fn ticket_id(&self) -> TicketId {
        self.timeline.ticket_id
    }

    /// Overall delay; rows without an SLA counterpart read as `NA`.
    pub fn overall_delay(&self) -> &'a str {
        self.sla
            .map(|sla| sla.overall_delay.as_str())
            .filter(|delay| !delay.is_empty())
            .unwrap_or(NOT_APPLICABLE)
    }

    /// Still moving through the workflow.
    pub fn is_ongoing(&self) -> bool {
        self.overall_delay() == PENDING
    }
}

/// Joins timeline and SLA lists on ticket id. Produces exactly one row per
/// timeline entry, in timeline order; duplicate SLA ids keep the first entry.
pub fn merge_rows(workflow: &Workflow) -> Vec<MergedRow<'_>> {
    let mut by_ticket: HashMap<TicketId, &SlaEntry> = HashMap::with_capacity(workflow.sla.len());
    for entry in &workflow.sla {
        by_ticket.entry(entry.ticket_id).or_insert(entry);
    }

    workflow
        .timeline
        .iter()
        .map(|timeline| MergedRow {
            timeline,
            sla: by_ticket.get(&timeline.ticket_id).copied(),
        })
        .collect()
}
