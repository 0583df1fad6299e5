use axum::{
    Json,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use serde_json::json;

use crate::shell::state::AppState;

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SendOtpBody {
    #[serde(default)]
    pub mobile_number: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerifyOtpBody {
    pub otp_uid: Option<String>,
    #[serde(default)]
    pub otp: String,
    #[serde(default)]
    pub mobile_number: String,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDetailsParams {
    pub mobile_number: Option<String>,
}

fn bad_request(message: &str) -> Response {
    (StatusCode::BAD_REQUEST, Json(json!({ "error": message }))).into_response()
}

pub async fn send_otp(State(state): State<AppState>, Json(body): Json<SendOtpBody>) -> Response {
    match state.auth_gateway.send_otp(&body.mobile_number).await {
        Ok(payload) => Json(payload).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn verify_otp(
    State(state): State<AppState>,
    Json(body): Json<VerifyOtpBody>,
) -> Response {
    let Some(otp_uid) = body.otp_uid.filter(|uid| !uid.is_empty()) else {
        return bad_request("OTP UID missing");
    };
    match state
        .auth_gateway
        .verify_otp(&otp_uid, &body.otp, &body.mobile_number)
        .await
    {
        Ok(payload) => Json(payload).into_response(),
        Err(err) => err.into_response(),
    }
}

pub async fn user_details(
    State(state): State<AppState>,
    Query(params): Query<UserDetailsParams>,
) -> Response {
    let Some(mobile_number) = params.mobile_number.filter(|m| !m.is_empty()) else {
        return bad_request("Mobile number missing");
    };
    match state.auth_gateway.user_details(&mobile_number).await {
        Ok(payload) => Json(payload).into_response(),
        Err(err) => err.into_response(),
    }
}

#[cfg(test)]
mod auth_proxy_otp_http_inbound_tests {
    use axum::{
        Router,
        body::Body,
        http::{Request, StatusCode, header::CONTENT_TYPE},
        routing::{get, post},
    };
    use http_body_util::BodyExt;
    use rstest::rstest;
    use serde_json::{Value, json};
    use tower::ServiceExt;

    use crate::modules::auth::adapters::outbound::gateway_in_memory::InMemoryAuthGateway;
    use crate::shell::state::AppState;
    use crate::tests::fixtures::state::{MOBILE, make_test_state, make_test_state_with};

    use super::{send_otp, user_details, verify_otp};

    fn app(state: AppState) -> Router {
        Router::new()
            .route("/api/send-otp", post(send_otp))
            .route("/api/verify-otp", post(verify_otp))
            .route("/api/user-details", get(user_details))
            .with_state(state)
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_pass_the_otp_response_through() {
        let state = make_test_state().await.state;

        let response = app(state)
            .oneshot(post_json("/api/send-otp", json!({ "mobileNumber": MOBILE })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["id"], "otp-1");
        assert_eq!(json["message"], "OTP sent");
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_return_400_when_the_otp_uid_is_missing() {
        let state = make_test_state().await.state;

        let response = app(state)
            .oneshot(post_json(
                "/api/verify-otp",
                json!({ "otp": "1234", "mobileNumber": MOBILE }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await, json!({ "error": "OTP UID missing" }));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_keep_the_upstream_status_of_a_rejected_otp() {
        let state = make_test_state().await.state;

        let response = app(state)
            .oneshot(post_json(
                "/api/verify-otp",
                json!({ "otpUid": "otp-9", "otp": "0000", "mobileNumber": MOBILE }),
            ))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(json_body(response).await, json!({ "error": "Backend error: 401" }));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_return_the_user_envelope() {
        let state = make_test_state().await.state;

        let response = app(state)
            .oneshot(
                Request::get(format!("/api/user-details?mobileNumber={MOBILE}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let json = json_body(response).await;
        assert_eq!(json["data"]["flowName"], "KNH Discharge");
        assert_eq!(json["status"], "success");
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_return_400_when_the_mobile_number_is_missing() {
        let state = make_test_state().await.state;

        let response = app(state)
            .oneshot(Request::get("/api/user-details").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(json_body(response).await, json!({ "error": "Mobile number missing" }));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_return_500_when_the_upstream_is_unreachable() {
        let mut gateway = InMemoryAuthGateway::new();
        gateway.toggle_offline();
        let state = make_test_state_with(gateway).await.state;

        let response = app(state)
            .oneshot(post_json("/api/send-otp", json!({ "mobileNumber": MOBILE })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json_body(response).await, json!({ "error": "Internal Server Error" }));
    }
}
