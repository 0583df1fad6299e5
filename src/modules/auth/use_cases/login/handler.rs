use crate::modules::auth::core::ports::AuthGateway;
use crate::modules::auth::core::session::Session;
use crate::modules::auth::core::user::{OtpResponse, UserResponse};
use crate::shared::infrastructure::upstream::UpstreamError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::de::DeserializeOwned;
use serde_json::{Value, json};
use std::sync::Arc;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoginError {
    #[error("Mobile number missing")]
    MissingMobileNumber,

    #[error("OTP UID missing")]
    MissingOtpUid,

    #[error("User not registered. Please contact support.")]
    NotRegistered,

    #[error("User account is inactive. Please contact support.")]
    Inactive,

    #[error("Failed to receive OTP ID")]
    MissingOtpId,

    #[error("User configuration not found (Flow Name missing)")]
    MissingFlowName,

    #[error(transparent)]
    Upstream(#[from] UpstreamError),
}

impl IntoResponse for LoginError {
    fn into_response(self) -> Response {
        match self {
            LoginError::Upstream(err) => err.into_response(),
            rule => (
                StatusCode::BAD_REQUEST,
                Json(json!({ "error": rule.to_string() })),
            )
                .into_response(),
        }
    }
}

fn decode<T: DeserializeOwned>(raw: Value) -> Result<T, LoginError> {
    serde_json::from_value(raw).map_err(|err| UpstreamError::Decode(err.to_string()).into())
}

fn required(raw: &str, missing: LoginError) -> Result<&str, LoginError> {
    let raw = raw.trim();
    if raw.is_empty() { Err(missing) } else { Ok(raw) }
}

/// Two-step OTP login: check the user, send a code, verify it and hand out
/// the session for the user's workflow.
pub struct LoginHandler {
    gateway: Arc<dyn AuthGateway>,
}

impl LoginHandler {
    pub fn new(gateway: Arc<dyn AuthGateway>) -> Self {
        Self { gateway }
    }

    /// Returns the OTP uid the client has to present on verification.
    pub async fn start(&self, mobile_number: &str) -> Result<String, LoginError> {
        let mobile_number = required(mobile_number, LoginError::MissingMobileNumber)?;

        let user: UserResponse = match self.gateway.user_details(mobile_number).await {
            Ok(raw) => decode(raw).map_err(|_| LoginError::NotRegistered)?,
            Err(err) => {
                tracing::warn!(error = %err, "user lookup failed before sending OTP");
                return Err(LoginError::NotRegistered);
            }
        };
        if !user.data.is_some_and(|details| details.is_active) {
            return Err(LoginError::Inactive);
        }

        let otp: OtpResponse = decode(self.gateway.send_otp(mobile_number).await?)?;
        otp.otp_uid()
            .map(str::to_string)
            .ok_or(LoginError::MissingOtpId)
    }

    pub async fn verify(
        &self,
        otp_uid: &str,
        otp: &str,
        mobile_number: &str,
    ) -> Result<Session, LoginError> {
        let otp_uid = required(otp_uid, LoginError::MissingOtpUid)?;
        let mobile_number = required(mobile_number, LoginError::MissingMobileNumber)?;

        self.gateway.verify_otp(otp_uid, otp, mobile_number).await?;

        let user: UserResponse = decode(self.gateway.user_details(mobile_number).await?)?;
        let session = user
            .data
            .as_ref()
            .and_then(|details| details.flow_name())
            .and_then(Session::new)
            .ok_or(LoginError::MissingFlowName)?;
        tracing::info!(flow_name = session.flow_name(), "login verified");
        Ok(session)
    }
}
