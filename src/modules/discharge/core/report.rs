use crate::shared::core::primitives::TicketId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ReportStatus {
    #[default]
    Success,
    NoData,
    Error,
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardResponse {
    #[serde(default)]
    pub date: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub count: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub workflows: Option<Vec<Workflow>>,
    #[serde(default)]
    pub status: ReportStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl DashboardResponse {
    /// The board only ever shows the first workflow of the envelope.
    pub fn primary_workflow(&self) -> Option<&Workflow> {
        match self.status {
            ReportStatus::NoData | ReportStatus::Error => None,
            _ => self.workflows.as_ref().and_then(|workflows| workflows.first()),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Workflow {
    #[serde(deserialize_with = "null_as_default")]
    pub workflow_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub report_date: String,
    pub configured_departments: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub department_sla_config: Option<BTreeMap<String, i64>>,
    pub timeline: Vec<TimelineEntry>,
    pub sla: Vec<SlaEntry>,
    pub pending_counts: Option<BTreeMap<String, i64>>,
}

impl Workflow {
    /// Configured SLA for a department; zero means "no SLA".
    pub fn sla_minutes(&self, department: &str) -> i64 {
        self.department_sla_config
            .as_ref()
            .and_then(|config| config.get(department).copied())
            .unwrap_or(0)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TimelineEntry {
    pub ticket_id: TicketId,
    #[serde(deserialize_with = "null_as_default")]
    pub patient_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub uhid: String,
    #[serde(deserialize_with = "null_as_default")]
    pub ward_bed: String,
    #[serde(deserialize_with = "null_as_default")]
    pub payment_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub discharge_start: String,
    pub first_dept_ack: Option<String>,
    pub first_dept_done: Option<String>,
    pub first_dept_ack_success: Option<String>,
    pub department_completion_times: BTreeMap<String, Option<String>>,
    pub department_initiated_times: Option<BTreeMap<String, String>>,
    pub department_more_time_clicks: Option<BTreeMap<String, String>>,
    #[serde(deserialize_with = "null_as_default")]
    pub target_total_tat: String,
    #[serde(deserialize_with = "null_as_default")]
    pub actual_total_tat: String,
    pub configured_departments: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SlaEntry {
    pub ticket_id: TicketId,
    #[serde(deserialize_with = "null_as_default")]
    pub patient_name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub uhid: String,
    #[serde(deserialize_with = "null_as_default")]
    pub ward_bed: String,
    #[serde(deserialize_with = "null_as_default")]
    pub payment_type: String,
    #[serde(deserialize_with = "null_as_default")]
    pub first_dept_delay: String,
    #[serde(deserialize_with = "null_as_default")]
    pub bill_received_delay: String,
    pub department_delays: BTreeMap<String, String>,
    #[serde(deserialize_with = "null_as_default")]
    pub overall_delay: String,
    pub configured_departments: Vec<String>,
}

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: serde::Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

/// Turns a raw upstream body into the multi-workflow envelope. Some upstream
/// deployments answer with a bare workflow object instead of the envelope.
pub fn normalize_report(
    date: &str,
    raw: serde_json::Value,
) -> Result<DashboardResponse, serde_json::Error> {
    let is_bare_workflow = raw.get("workflows").is_none() && raw.get("workflowName").is_some();
    if is_bare_workflow {
        let workflow: Workflow = serde_json::from_value(raw)?;
        return Ok(DashboardResponse {
            date: date.to_string(),
            count: Some(1),
            workflows: Some(vec![workflow]),
            status: ReportStatus::Success,
            message: None,
        });
    }

    let mut response: DashboardResponse = serde_json::from_value(raw)?;
    if response.date.is_empty() {
        response.date = date.to_string();
    }
    Ok(response)
}

#[cfg(test)]
mod discharge_report_tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    #[rstest]
    fn it_should_wrap_a_bare_workflow_into_the_envelope() {
        let raw = json!({
            "workflowName": "KNH Discharge",
            "reportDate": "2025-01-10",
            "configuredDepartments": ["Pharmacy", "Billing"],
            "timeline": [],
            "sla": []
        });

        let response = normalize_report("2025-01-10", raw).expect("normalize failed");

        assert_eq!(response.status, ReportStatus::Success);
        assert_eq!(response.count, Some(1));
        assert_eq!(response.date, "2025-01-10");
        let workflows = response.workflows.expect("missing workflows");
        assert_eq!(workflows.len(), 1);
        assert_eq!(workflows[0].workflow_name, "KNH Discharge");
        assert_eq!(workflows[0].configured_departments, vec!["Pharmacy", "Billing"]);
    }

    #[rstest]
    fn it_should_keep_an_envelope_as_is() {
        let raw = json!({
            "date": "2025-01-09",
            "count": 1,
            "status": "success",
            "workflows": [{ "workflowName": "KNH Discharge" }]
        });

        let response = normalize_report("2025-01-10", raw).expect("normalize failed");

        assert_eq!(response.date, "2025-01-09");
        assert_eq!(response.workflows.unwrap()[0].workflow_name, "KNH Discharge");
    }

    #[rstest]
    fn it_should_report_no_primary_workflow_for_no_data() {
        let raw = json!({ "date": "2025-01-10", "status": "no_data", "message": "nothing" });

        let response = normalize_report("2025-01-10", raw).expect("normalize failed");

        assert_eq!(response.status, ReportStatus::NoData);
        assert!(response.primary_workflow().is_none());
    }

    #[rstest]
    fn it_should_tolerate_missing_optional_fields() {
        let raw = json!({
            "workflowName": "KNH Discharge",
            "timeline": [{
                "ticketId": 7,
                "patientName": "Mr. John",
                "targetTotalTat": null,
                "departmentCompletionTimes": { "Pharmacy": null }
            }],
            "sla": [{ "ticketId": 7, "overallDelay": "Pending" }]
        });

        let response = normalize_report("2025-01-10", raw).expect("normalize failed");
        let workflow = response.primary_workflow().expect("missing workflow");

        assert_eq!(workflow.timeline[0].ticket_id, 7);
        assert_eq!(workflow.timeline[0].first_dept_ack, None);
        assert_eq!(workflow.timeline[0].target_total_tat, "");
        assert_eq!(
            workflow.timeline[0].department_completion_times.get("Pharmacy"),
            Some(&None)
        );
        assert_eq!(workflow.sla[0].overall_delay, "Pending");
        assert_eq!(workflow.sla_minutes("Pharmacy"), 0);
    }

    #[rstest]
    fn it_should_map_unknown_statuses() {
        let raw = json!({ "status": "partial", "workflows": [] });

        let response = normalize_report("2025-01-10", raw).expect("normalize failed");

        assert_eq!(response.status, ReportStatus::Unknown);
    }
}
