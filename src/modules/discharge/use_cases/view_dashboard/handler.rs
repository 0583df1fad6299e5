use crate::modules::discharge::core::anonymize::anonymize_report;
use crate::modules::discharge::core::board::{Board, BoardOptions, build_board};
use crate::modules::discharge::core::ordering::SortMode;
use crate::modules::discharge::core::report::{DashboardResponse, ReportStatus};
use crate::modules::discharge::use_cases::fetch_report::handler::{
    FetchReportError, FetchReportHandler,
};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use serde::Serialize;
use std::sync::Arc;

/// Title shown instead of the facility name on the public demo board.
pub const DEMO_TITLE: &str = "Real-Time Hospital Discharge Coordination";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardQuery {
    pub workflow_name: String,
    pub date: NaiveDate,
    pub sort: SortMode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardView {
    pub status: ReportStatus,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub board: Option<Board>,
}

pub struct ViewDashboardHandler {
    reports: Arc<FetchReportHandler>,
    offset: FixedOffset,
}

impl ViewDashboardHandler {
    pub fn new(reports: Arc<FetchReportHandler>, offset: FixedOffset) -> Self {
        Self { reports, offset }
    }

    pub fn offset(&self) -> FixedOffset {
        self.offset
    }

    pub async fn handle(
        &self,
        query: &DashboardQuery,
        now: DateTime<Utc>,
    ) -> Result<DashboardView, FetchReportError> {
        let report = self.reports.handle(&query.workflow_name, query.date).await?;
        Ok(self.render(&report, query, now))
    }

    /// Same as [`Self::handle`] with patient identity masked, the facility
    /// name replaced and no target strip.
    pub async fn handle_demo(
        &self,
        query: &DashboardQuery,
        now: DateTime<Utc>,
    ) -> Result<DashboardView, FetchReportError> {
        let report = self.reports.handle(&query.workflow_name, query.date).await?;
        let mut view = self.render(&anonymize_report(&report), query, now);
        if let Some(board) = view.board.as_mut() {
            board.workflow_name = DEMO_TITLE.to_string();
            board.targets = None;
        }
        Ok(view)
    }

    fn render(
        &self,
        report: &DashboardResponse,
        query: &DashboardQuery,
        now: DateTime<Utc>,
    ) -> DashboardView {
        let options = BoardOptions {
            sort: query.sort.clone(),
            offset: self.offset,
            now,
        };
        let board = report
            .primary_workflow()
            .map(|workflow| build_board(workflow, &options));
        if board.is_none() {
            tracing::info!(
                workflow_name = %query.workflow_name,
                date = %query.date,
                status = ?report.status,
                "no workflow data to render"
            );
        }

        DashboardView {
            status: report.status.clone(),
            date: if report.date.is_empty() {
                query.date.format("%Y-%m-%d").to_string()
            } else {
                report.date.clone()
            },
            message: report.message.clone(),
            board,
        }
    }
}
