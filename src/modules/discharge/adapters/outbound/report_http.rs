use crate::modules::discharge::core::report::{DashboardResponse, normalize_report};
use crate::modules::discharge::use_cases::fetch_report::report_port::ReportSource;
use crate::shared::infrastructure::upstream::{UpstreamClient, UpstreamError};
use chrono::NaiveDate;

const REPORT_PATH: &str = "/dev/discharge-tat/get";

pub struct HttpReportSource {
    client: UpstreamClient,
}

impl HttpReportSource {
    pub fn new(client: UpstreamClient) -> Self {
        Self { client }
    }
}

#[async_trait::async_trait]
impl ReportSource for HttpReportSource {
    async fn fetch(
        &self,
        workflow_name: &str,
        date: NaiveDate,
    ) -> Result<DashboardResponse, UpstreamError> {
        let date = date.format("%Y-%m-%d").to_string();
        let raw: serde_json::Value = self
            .client
            .get_json(
                REPORT_PATH,
                &[("workflowName", workflow_name), ("date", date.as_str())],
            )
            .await?;
        normalize_report(&date, raw).map_err(|err| UpstreamError::Decode(err.to_string()))
    }
}

#[cfg(test)]
mod discharge_http_report_source_tests {
    use super::*;
    use crate::modules::discharge::core::report::ReportStatus;
    use crate::shared::infrastructure::upstream::UpstreamConfig;
    use axum::{Json, Router, extract::Query, http::StatusCode, routing::get};
    use rstest::{fixture, rstest};
    use serde_json::json;
    use std::collections::HashMap;

    async fn spawn_upstream(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind failed");
        let addr = listener.local_addr().expect("no local addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("serve failed");
        });
        format!("http://{addr}")
    }

    fn source(base_url: String) -> HttpReportSource {
        HttpReportSource::new(UpstreamClient::new(UpstreamConfig {
            base_url: Some(base_url),
            api_key: Some("secret".into()),
        }))
    }

    #[fixture]
    fn date() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_wrap_a_bare_workflow_into_the_envelope(date: NaiveDate) {
        let router = Router::new().route(
            REPORT_PATH,
            get(|Query(q): Query<HashMap<String, String>>| async move {
                Json(json!({
                    "workflowName": q.get("workflowName"),
                    "reportDate": q.get("date"),
                    "configuredDepartments": ["Pharmacy"],
                    "timeline": [],
                    "sla": []
                }))
            }),
        );
        let base = spawn_upstream(router).await;

        let report = source(base)
            .fetch("KNH Discharge", date)
            .await
            .expect("fetch failed");

        assert_eq!(report.status, ReportStatus::Success);
        assert_eq!(report.count, Some(1));
        assert_eq!(report.date, "2025-01-10");
        let workflow = report.primary_workflow().expect("workflow expected");
        assert_eq!(workflow.workflow_name, "KNH Discharge");
        assert_eq!(workflow.report_date, "2025-01-10");
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_pass_the_envelope_through(date: NaiveDate) {
        let router = Router::new().route(
            REPORT_PATH,
            get(|| async {
                Json(json!({
                    "date": "2025-01-10",
                    "count": 0,
                    "workflows": [],
                    "status": "no_data",
                    "message": "No data"
                }))
            }),
        );
        let base = spawn_upstream(router).await;

        let report = source(base)
            .fetch("KNH Discharge", date)
            .await
            .expect("fetch failed");

        assert_eq!(report.status, ReportStatus::NoData);
        assert_eq!(report.message.as_deref(), Some("No data"));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_surface_upstream_failures(date: NaiveDate) {
        let router = Router::new().route(
            REPORT_PATH,
            get(|| async { (StatusCode::SERVICE_UNAVAILABLE, "down") }),
        );
        let base = spawn_upstream(router).await;

        let result = source(base).fetch("KNH Discharge", date).await;

        assert!(matches!(
            result,
            Err(UpstreamError::Status { status: 503, .. })
        ));
    }
}
