use axum::{
    Json,
    extract::{Query, State},
    http::{HeaderMap, StatusCode},
    response::{
        IntoResponse, Redirect, Response,
        sse::{Event, KeepAlive, Sse},
    },
};
use chrono::{NaiveDate, Utc};
use futures_util::StreamExt;
use serde::Deserialize;
use serde_json::json;
use std::convert::Infallible;

use crate::modules::auth::core::session::Session;
use crate::modules::discharge::core::ordering::SortMode;
use crate::modules::discharge::core::phase::Column;
use crate::modules::discharge::use_cases::fetch_report::handler::FetchReportError;
use crate::modules::discharge::use_cases::view_dashboard::handler::{DashboardQuery, DashboardView};
use crate::shared::core::primitives::{parse_report_date, today};
use crate::shell::state::AppState;
use crate::shell::workers::spawn_refresher;

const LOGIN_PATH: &str = "/login";

#[derive(Debug, Default, Deserialize)]
pub struct DashboardParams {
    pub date: Option<String>,
    /// Column to sort by delay.
    pub column: Option<String>,
    /// Column whose open items go first. Wins over `column` when both are set.
    pub pending: Option<String>,
}

impl DashboardParams {
    fn sort_or(&self, fallback: SortMode) -> SortMode {
        let selected = [
            self.column.as_deref().map(|c| SortMode::ByColumn(Column::from_name(c))),
            self.pending.as_deref().map(|c| SortMode::ByPending(Column::from_name(c))),
        ];
        if selected.iter().all(Option::is_none) {
            return fallback;
        }
        selected
            .into_iter()
            .flatten()
            .fold(SortMode::Default, SortMode::select)
    }

    fn query(&self, workflow_name: &str, state: &AppState, fallback: SortMode) -> Result<DashboardQuery, Response> {
        let date = match self.date.as_deref().filter(|d| !d.is_empty()) {
            None => today(state.dashboard_handler.offset(), Utc::now()),
            Some(raw) => parse_date(raw)?,
        };
        Ok(DashboardQuery {
            workflow_name: workflow_name.to_string(),
            date,
            sort: self.sort_or(fallback),
        })
    }
}

fn parse_date(raw: &str) -> Result<NaiveDate, Response> {
    parse_report_date(raw).ok_or_else(|| {
        (
            StatusCode::BAD_REQUEST,
            Json(json!({ "error": format!("Invalid date: {raw}") })),
        )
            .into_response()
    })
}

fn board_event(result: Result<DashboardView, FetchReportError>) -> Event {
    let event = match result {
        Ok(view) => Event::default().event("board").json_data(&view),
        Err(err) => Event::default()
            .event("error")
            .json_data(json!({ "status": "error", "message": err.to_string() })),
    };
    event.unwrap_or_else(|err| Event::default().event("error").data(err.to_string()))
}

pub async fn handle(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<DashboardParams>,
) -> Response {
    let Some(session) = Session::from_headers(&headers) else {
        return Redirect::to(LOGIN_PATH).into_response();
    };
    let query = match params.query(session.flow_name(), &state, SortMode::Default) {
        Ok(query) => query,
        Err(response) => return response,
    };
    match state.dashboard_handler.handle(&query, Utc::now()).await {
        Ok(view) => Json(view).into_response(),
        Err(err) => err.into_response(),
    }
}

/// Pushes a freshly rendered board on every refresh while the client stays
/// connected.
pub async fn live(
    State(state): State<AppState>,
    headers: HeaderMap,
    Query(params): Query<DashboardParams>,
) -> Response {
    let Some(session) = Session::from_headers(&headers) else {
        return Redirect::to(LOGIN_PATH).into_response();
    };
    let query = match params.query(session.flow_name(), &state, SortMode::Default) {
        Ok(query) => query,
        Err(response) => return response,
    };

    tracing::info!(workflow_name = %query.workflow_name, "live board subscribed");
    let handler = state.dashboard_handler.clone();
    let subscription = spawn_refresher(
        state.settings.refresh_interval,
        state.online_probe.clone(),
        move || {
            let handler = handler.clone();
            let query = query.clone();
            async move { board_event(handler.handle(&query, Utc::now()).await) }
        },
    );

    Sse::new(subscription.into_stream().map(Ok::<_, Infallible>))
        .keep_alive(KeepAlive::default())
        .into_response()
}

/// Public board with patient identity masked. Needs no session.
pub async fn demo(State(state): State<AppState>, Query(params): Query<DashboardParams>) -> Response {
    let settings = &state.settings;
    let fallback = SortMode::ByPending(Column::Department(
        settings.demo_pending_department.clone(),
    ));
    let query = match params.query(&settings.demo_workflow_name, &state, fallback) {
        Ok(query) => query,
        Err(response) => return response,
    };
    match state.dashboard_handler.handle_demo(&query, Utc::now()).await {
        Ok(view) => Json(view).into_response(),
        Err(err) => err.into_response(),
    }
}
