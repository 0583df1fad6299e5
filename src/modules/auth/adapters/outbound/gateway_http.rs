use crate::modules::auth::core::ports::AuthGateway;
use crate::shared::infrastructure::upstream::{UpstreamClient, UpstreamError};
use serde::Serialize;
use serde_json::Value;

const USER_DETAILS_PATH: &str = "/dev/chatops/user/get";

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct SendOtpBody<'a> {
    mobile_number: &'a str,
    country_code: &'a str,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct VerifyOtpBody<'a> {
    mobile_number: &'a str,
    country_code: &'a str,
    otp: &'a str,
    otp_uid: &'a str,
}

pub struct HttpAuthGateway {
    client: UpstreamClient,
    otp_config_id: Option<String>,
    country_code: String,
}

impl HttpAuthGateway {
    pub fn new(
        client: UpstreamClient,
        otp_config_id: Option<String>,
        country_code: impl Into<String>,
    ) -> Self {
        Self {
            client,
            otp_config_id,
            country_code: country_code.into(),
        }
    }

    fn otp_config_id(&self) -> Result<&str, UpstreamError> {
        self.otp_config_id
            .as_deref()
            .filter(|id| !id.is_empty())
            .ok_or(UpstreamError::MissingConfig("OTP_CONFIG_ID"))
    }
}

#[async_trait::async_trait]
impl AuthGateway for HttpAuthGateway {
    async fn send_otp(&self, mobile_number: &str) -> Result<Value, UpstreamError> {
        let path = format!("/dev/{}/sendOtp", self.otp_config_id()?);
        tracing::info!(%path, "requesting OTP");
        self.client
            .post_json(
                &path,
                &SendOtpBody {
                    mobile_number,
                    country_code: &self.country_code,
                },
            )
            .await
    }

    async fn verify_otp(
        &self,
        otp_uid: &str,
        otp: &str,
        mobile_number: &str,
    ) -> Result<Value, UpstreamError> {
        let path = format!("/dev/{}/verifyOtp", urlencoding::encode(otp_uid));
        tracing::info!(%path, "verifying OTP");
        self.client
            .post_json(
                &path,
                &VerifyOtpBody {
                    mobile_number,
                    country_code: &self.country_code,
                    otp,
                    otp_uid,
                },
            )
            .await
    }

    async fn user_details(&self, mobile_number: &str) -> Result<Value, UpstreamError> {
        tracing::info!(path = USER_DETAILS_PATH, "looking up user");
        self.client
            .get_json(USER_DETAILS_PATH, &[("mobileNumber", mobile_number)])
            .await
    }
}
