use axum::{
    Json,
    extract::State,
    http::{StatusCode, header::SET_COOKIE},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::modules::auth::core::session::Session;
use crate::shell::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartLoginBody {
    #[serde(default)]
    pub mobile_number: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyLoginBody {
    #[serde(default)]
    pub otp_uid: String,
    #[serde(default)]
    pub otp: String,
    #[serde(default)]
    pub mobile_number: String,
}

pub async fn start(State(state): State<AppState>, Json(body): Json<StartLoginBody>) -> Response {
    match state.login_handler.start(&body.mobile_number).await {
        Ok(otp_uid) => Json(json!({ "otpUid": otp_uid })).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn verify(State(state): State<AppState>, Json(body): Json<VerifyLoginBody>) -> Response {
    match state
        .login_handler
        .verify(&body.otp_uid, &body.otp, &body.mobile_number)
        .await
    {
        Ok(session) => (
            [(SET_COOKIE, session.set_cookie())],
            Json(json!({ "flowName": session.flow_name() })),
        )
            .into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn logout() -> Response {
    (StatusCode::NO_CONTENT, [(SET_COOKIE, Session::clear_cookie())]).into_response()
}
