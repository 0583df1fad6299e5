// Application state wired to in-memory adapters for inbound handler tests.

use crate::modules::auth::adapters::outbound::gateway_in_memory::InMemoryAuthGateway;
use crate::modules::auth::core::user::UserDetails;
use crate::modules::auth::use_cases::login::handler::LoginHandler;
use crate::modules::discharge::adapters::outbound::report_in_memory::InMemoryReportSource;
use crate::modules::discharge::use_cases::fetch_report::handler::{
    FetchReportHandler, RetryPolicy,
};
use crate::modules::discharge::use_cases::view_dashboard::handler::ViewDashboardHandler;
use crate::shared::core::primitives::display_offset;
use crate::shell::config::DashboardSettings;
use crate::shell::state::AppState;
use crate::shell::workers::OnlineProbe;
use crate::tests::fixtures::workflows::knh_discharge_workflow;
use async_trait::async_trait;
use chrono::{NaiveDate, Utc};
use std::sync::Arc;
use std::time::Duration;

pub const MOBILE: &str = "9876543210";

pub struct AlwaysOnline;

#[async_trait]
impl OnlineProbe for AlwaysOnline {
    async fn is_online(&self) -> bool {
        true
    }
}

pub struct TestState {
    pub state: AppState,
    pub reports: Arc<InMemoryReportSource>,
}

/// Seeds today's report (in the display offset) and a known, active user.
pub async fn make_test_state() -> TestState {
    make_test_state_with(InMemoryAuthGateway::new()).await
}

pub async fn make_test_state_with(gateway: InMemoryAuthGateway) -> TestState {
    let offset = display_offset(330);
    let reports = Arc::new(InMemoryReportSource::new());
    reports.insert(today(), knh_discharge_workflow()).await;

    gateway
        .insert_user(UserDetails {
            id: 1,
            mobile_number: MOBILE.into(),
            user_name: "Anita".into(),
            flow_name: Some("KNH Discharge".into()),
            role: "admin".into(),
            is_active: true,
            ..UserDetails::default()
        })
        .await;
    let gateway = Arc::new(gateway);

    let fetch = Arc::new(FetchReportHandler::new(
        reports.clone(),
        RetryPolicy::new(3, Duration::from_millis(1)),
    ));

    TestState {
        state: AppState {
            auth_gateway: gateway.clone(),
            login_handler: Arc::new(LoginHandler::new(gateway)),
            dashboard_handler: Arc::new(ViewDashboardHandler::new(fetch, offset)),
            online_probe: Arc::new(AlwaysOnline),
            settings: DashboardSettings {
                demo_workflow_name: "KNH Discharge".into(),
                demo_pending_department: "House Keeping".into(),
                refresh_interval: Duration::from_secs(60),
            },
        },
        reports,
    }
}

pub fn today() -> NaiveDate {
    Utc::now().with_timezone(&display_offset(330)).date_naive()
}
