use crate::modules::discharge::core::report::DashboardResponse;
use crate::shared::infrastructure::upstream::UpstreamError;
use async_trait::async_trait;
use chrono::NaiveDate;

#[async_trait]
pub trait ReportSource: Send + Sync {
    async fn fetch(
        &self,
        workflow_name: &str,
        date: NaiveDate,
    ) -> Result<DashboardResponse, UpstreamError>;
}
