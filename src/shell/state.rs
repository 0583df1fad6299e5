use crate::modules::auth::core::ports::AuthGateway;
use crate::modules::auth::use_cases::login::handler::LoginHandler;
use crate::modules::discharge::use_cases::view_dashboard::handler::ViewDashboardHandler;
use crate::shell::config::DashboardSettings;
use crate::shell::workers::OnlineProbe;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
    pub auth_gateway: Arc<dyn AuthGateway>,
    pub login_handler: Arc<LoginHandler>,
    pub dashboard_handler: Arc<ViewDashboardHandler>,
    pub online_probe: Arc<dyn OnlineProbe>,
    pub settings: DashboardSettings,
}
