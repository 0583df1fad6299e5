use axum::{
    Router,
    routing::{get, post},
};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::modules::auth::use_cases::login::inbound::http as login_http;
use crate::modules::auth::use_cases::proxy_otp::inbound::http as otp_http;
use crate::modules::discharge::use_cases::view_dashboard::inbound::http as dashboard_http;
use crate::shell::state::AppState;

async fn health() -> &'static str {
    "ok"
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/api/send-otp", post(otp_http::send_otp))
        .route("/api/verify-otp", post(otp_http::verify_otp))
        .route("/api/user-details", get(otp_http::user_details))
        .route("/api/login/start", post(login_http::start))
        .route("/api/login/verify", post(login_http::verify))
        .route("/api/logout", post(login_http::logout))
        .route("/api/dashboard", get(dashboard_http::handle))
        .route("/api/dashboard/live", get(dashboard_http::live))
        .route("/api/demo", get(dashboard_http::demo))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
