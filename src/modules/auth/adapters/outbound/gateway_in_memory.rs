use crate::modules::auth::core::ports::AuthGateway;
use crate::modules::auth::core::user::UserDetails;
use crate::shared::infrastructure::upstream::UpstreamError;
use serde_json::{Value, json};
use std::collections::HashMap;
use tokio::sync::RwLock;

/// Users keyed by mobile number, with one valid OTP per issued uid.
#[derive(Default)]
pub struct InMemoryAuthGateway {
    users: RwLock<HashMap<String, UserDetails>>,
    issued: RwLock<HashMap<String, (String, String)>>,
    is_offline: bool,
}

impl InMemoryAuthGateway {
    pub const OTP: &'static str = "1234";

    pub fn new() -> Self {
        Self::default()
    }

    pub async fn insert_user(&self, user: UserDetails) {
        self.users
            .write()
            .await
            .insert(user.mobile_number.clone(), user);
    }

    pub fn toggle_offline(&mut self) {
        self.is_offline = !self.is_offline;
    }

    fn ensure_online(&self) -> Result<(), UpstreamError> {
        if self.is_offline {
            return Err(UpstreamError::Transport("Auth gateway offline".into()));
        }
        Ok(())
    }
}

#[async_trait::async_trait]
impl AuthGateway for InMemoryAuthGateway {
    async fn send_otp(&self, mobile_number: &str) -> Result<Value, UpstreamError> {
        self.ensure_online()?;
        let mut issued = self.issued.write().await;
        let otp_uid = format!("otp-{}", issued.len() + 1);
        issued.insert(otp_uid.clone(), (mobile_number.to_string(), Self::OTP.to_string()));
        Ok(json!({ "message": "OTP sent", "id": otp_uid, "status": "success" }))
    }

    async fn verify_otp(
        &self,
        otp_uid: &str,
        otp: &str,
        mobile_number: &str,
    ) -> Result<Value, UpstreamError> {
        self.ensure_online()?;
        let issued = self.issued.read().await;
        match issued.get(otp_uid) {
            Some((number, code)) if number == mobile_number && code == otp => {
                Ok(json!({ "message": "OTP verified", "status": "success" }))
            }
            _ => Err(UpstreamError::Status {
                status: 401,
                body: "invalid otp".into(),
            }),
        }
    }

    async fn user_details(&self, mobile_number: &str) -> Result<Value, UpstreamError> {
        self.ensure_online()?;
        match self.users.read().await.get(mobile_number) {
            Some(user) => Ok(json!({ "data": user, "status": "success" })),
            None => Err(UpstreamError::Status {
                status: 404,
                body: "user not found".into(),
            }),
        }
    }
}
