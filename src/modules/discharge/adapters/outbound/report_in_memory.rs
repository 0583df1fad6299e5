use crate::modules::discharge::core::report::{DashboardResponse, ReportStatus, Workflow};
use crate::modules::discharge::use_cases::fetch_report::report_port::ReportSource;
use crate::shared::infrastructure::upstream::UpstreamError;
use chrono::NaiveDate;
use std::collections::HashMap;
use std::sync::atomic::{AtomicU32, Ordering};
use tokio::sync::RwLock;

#[derive(Default)]
pub struct InMemoryReportSource {
    workflows: RwLock<HashMap<(String, NaiveDate), Workflow>>,
    failures_left: AtomicU32,
    calls: AtomicU32,
    is_offline: bool,
}

impl InMemoryReportSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert(&self, date: NaiveDate, workflow: Workflow) {
        self.workflows
            .write()
            .await
            .insert((workflow.workflow_name.clone(), date), workflow);
    }

    /// The next `count` fetches fail with a 503 before the source answers again.
    pub fn fail_next(&self, count: u32) {
        self.failures_left.store(count, Ordering::SeqCst);
    }

    pub fn toggle_offline(&mut self) {
        self.is_offline = !self.is_offline;
    }

    pub fn calls(&self) -> u32 {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait::async_trait]
impl ReportSource for InMemoryReportSource {
    async fn fetch(
        &self,
        workflow_name: &str,
        date: NaiveDate,
    ) -> Result<DashboardResponse, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.is_offline {
            return Err(UpstreamError::Transport("Report source offline".into()));
        }
        let scripted_failure = self
            .failures_left
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |left| left.checked_sub(1))
            .is_ok();
        if scripted_failure {
            return Err(UpstreamError::Status {
                status: 503,
                body: "Service Unavailable".into(),
            });
        }

        let date_str = date.format("%Y-%m-%d").to_string();
        let guard = self.workflows.read().await;
        Ok(match guard.get(&(workflow_name.to_string(), date)) {
            Some(workflow) => DashboardResponse {
                date: date_str,
                count: Some(1),
                workflows: Some(vec![workflow.clone()]),
                status: ReportStatus::Success,
                message: None,
            },
            None => DashboardResponse {
                date: date_str,
                count: Some(0),
                workflows: Some(Vec::new()),
                status: ReportStatus::NoData,
                message: Some("No discharges recorded for this date".into()),
            },
        })
    }
}
