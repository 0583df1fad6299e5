use std::net::SocketAddr;
use std::sync::Arc;
use tracing_subscriber::{EnvFilter, fmt};

use discharge_board::modules::auth::adapters::outbound::gateway_http::HttpAuthGateway;
use discharge_board::modules::auth::use_cases::login::handler::LoginHandler;
use discharge_board::modules::discharge::adapters::outbound::report_http::HttpReportSource;
use discharge_board::modules::discharge::use_cases::fetch_report::handler::FetchReportHandler;
use discharge_board::modules::discharge::use_cases::view_dashboard::handler::ViewDashboardHandler;
use discharge_board::shared::core::primitives::display_offset;
use discharge_board::shared::infrastructure::upstream::UpstreamClient;
use discharge_board::shell::config::Config;
use discharge_board::shell::http::router;
use discharge_board::shell::state::AppState;
use discharge_board::shell::workers::HttpOnlineProbe;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    let config = Config::from_env()?;
    for (key, value) in [
        ("BASE_URL", &config.upstream.base_url),
        ("API_KEY", &config.upstream.api_key),
        ("OTP_CONFIG_ID", &config.otp_config_id),
    ] {
        if value.is_none() {
            tracing::warn!("{key} is not set; requests that need it will fail");
        }
    }

    let client = UpstreamClient::new(config.upstream.clone());
    let gateway = Arc::new(HttpAuthGateway::new(
        client.clone(),
        config.otp_config_id.clone(),
        config.country_code.clone(),
    ));
    let reports = Arc::new(FetchReportHandler::new(
        Arc::new(HttpReportSource::new(client)),
        config.retry,
    ));

    let state = AppState {
        auth_gateway: gateway.clone(),
        login_handler: Arc::new(LoginHandler::new(gateway)),
        dashboard_handler: Arc::new(ViewDashboardHandler::new(
            reports,
            display_offset(config.display_offset_minutes),
        )),
        online_probe: Arc::new(HttpOnlineProbe::new(config.upstream.base_url.clone())),
        settings: config.dashboard.clone(),
    };

    let addr: SocketAddr = config.bind_addr.parse()?;
    tracing::info!("Discharge board listening on http://{}", addr);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, router(state)).await?;
    Ok(())
}
