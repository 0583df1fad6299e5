// Shared test fixtures for discharge workflows.

use crate::modules::discharge::core::report::{SlaEntry, TimelineEntry, Workflow};
use crate::shared::core::primitives::TicketId;
use std::collections::BTreeMap;

pub struct TimelineEntryBuilder {
    inner: TimelineEntry,
}

#[allow(dead_code)]
impl TimelineEntryBuilder {
    pub fn new(ticket_id: TicketId) -> Self {
        Self {
            inner: TimelineEntry {
                ticket_id,
                patient_name: "Mr. Ramesh Kumar".into(),
                uhid: "KNH001234".into(),
                ward_bed: "Ward 4 / 12".into(),
                payment_type: "Cash".into(),
                discharge_start: "2025-01-10T08:00:00".into(),
                target_total_tat: "180 mins".into(),
                ..TimelineEntry::default()
            },
        }
    }

    pub fn patient(mut self, name: impl Into<String>, uhid: impl Into<String>) -> Self {
        self.inner.patient_name = name.into();
        self.inner.uhid = uhid.into();
        self
    }

    pub fn payment_type(mut self, v: impl Into<String>) -> Self {
        self.inner.payment_type = v.into();
        self
    }

    pub fn discharge_start(mut self, v: impl Into<String>) -> Self {
        self.inner.discharge_start = v.into();
        self
    }

    pub fn bill_step(mut self, ack: &str, received: Option<&str>) -> Self {
        self.inner.first_dept_ack = Some(ack.into());
        self.inner.first_dept_ack_success = received.map(str::to_string);
        self
    }

    pub fn first_department_done(mut self, done: &str) -> Self {
        self.inner.first_dept_done = Some(done.into());
        self
    }

    pub fn initiated(mut self, department: &str, at: &str) -> Self {
        self.inner
            .department_initiated_times
            .get_or_insert_with(BTreeMap::new)
            .insert(department.into(), at.into());
        self
    }

    pub fn completed(mut self, department: &str, at: &str) -> Self {
        self.inner
            .department_completion_times
            .insert(department.into(), Some(at.into()));
        self
    }

    pub fn actual_total_tat(mut self, v: impl Into<String>) -> Self {
        self.inner.actual_total_tat = v.into();
        self
    }

    pub fn build(self) -> TimelineEntry {
        self.inner
    }
}

pub fn sla_entry(ticket_id: TicketId, overall: &str, delays: &[(&str, &str)]) -> SlaEntry {
    SlaEntry {
        ticket_id,
        first_dept_delay: delays
            .first()
            .map(|(_, delay)| delay.to_string())
            .unwrap_or_default(),
        department_delays: delays
            .iter()
            .skip(1)
            .map(|(department, delay)| (department.to_string(), delay.to_string()))
            .collect(),
        overall_delay: overall.into(),
        ..SlaEntry::default()
    }
}

/// Three patients on one report date: one still moving, one finished early,
/// one finished late.
pub fn knh_discharge_workflow() -> Workflow {
    let departments = vec![
        "Pharmacy".to_string(),
        "Billing".to_string(),
        "House Keeping".to_string(),
    ];

    Workflow {
        workflow_name: "KNH Discharge".into(),
        report_date: "2025-01-10".into(),
        configured_departments: departments,
        department_sla_config: Some(BTreeMap::from([
            ("Pharmacy".to_string(), 30),
            ("Billing".to_string(), 60),
            ("House Keeping".to_string(), 45),
        ])),
        timeline: vec![
            TimelineEntryBuilder::new(101)
                .bill_step("2025-01-10T08:05:00", Some("2025-01-10T08:20:00"))
                .first_department_done("2025-01-10T08:30:00")
                .initiated("Billing", "2025-01-10T08:30:00")
                .completed("Billing", "2025-01-10T09:20:00")
                .initiated("House Keeping", "2025-01-10T09:20:00")
                .build(),
            TimelineEntryBuilder::new(102)
                .patient("Mrs. Lakshmi Devi", "KNH005678")
                .payment_type("TPA")
                .discharge_start("2025-01-10T06:00:00")
                .bill_step("2025-01-10T06:05:00", Some("2025-01-10T06:15:00"))
                .first_department_done("2025-01-10T06:30:00")
                .initiated("Billing", "2025-01-10T06:30:00")
                .completed("Billing", "2025-01-10T07:10:00")
                .initiated("House Keeping", "2025-01-10T07:10:00")
                .completed("House Keeping", "2025-01-10T07:50:00")
                .actual_total_tat("110 mins")
                .build(),
            TimelineEntryBuilder::new(103)
                .patient("Dr. Suresh Nair", "KNH009012")
                .discharge_start("2025-01-10T05:00:00")
                .bill_step("2025-01-10T05:05:00", Some("2025-01-10T05:40:00"))
                .first_department_done("2025-01-10T06:00:00")
                .initiated("Billing", "2025-01-10T06:00:00")
                .completed("Billing", "2025-01-10T07:30:00")
                .initiated("House Keeping", "2025-01-10T07:30:00")
                .completed("House Keeping", "2025-01-10T08:40:00")
                .actual_total_tat("220 mins")
                .build(),
        ],
        sla: vec![
            sla_entry(
                101,
                "Pending",
                &[("Pharmacy", "-5 mins"), ("Billing", "-10 mins"), ("House Keeping", "Pending")],
            ),
            sla_entry(
                102,
                "-130 mins",
                &[("Pharmacy", "-15 mins"), ("Billing", "-20 mins"), ("House Keeping", "-5 mins")],
            ),
            sla_entry(
                103,
                "plus 40 mins",
                &[("Pharmacy", "-10 mins"), ("Billing", "plus 30 mins"), ("House Keeping", "plus 25 mins")],
            ),
        ],
        pending_counts: None,
    }
}
