use crate::shared::infrastructure::upstream::UpstreamError;
use async_trait::async_trait;
use serde_json::Value;

/// OTP and user lookups against the messaging backend. Payloads are returned
/// as received so the proxy routes can pass them through unchanged.
#[async_trait]
pub trait AuthGateway: Send + Sync {
    async fn send_otp(&self, mobile_number: &str) -> Result<Value, UpstreamError>;

    async fn verify_otp(
        &self,
        otp_uid: &str,
        otp: &str,
        mobile_number: &str,
    ) -> Result<Value, UpstreamError>;

    async fn user_details(&self, mobile_number: &str) -> Result<Value, UpstreamError>;
}
