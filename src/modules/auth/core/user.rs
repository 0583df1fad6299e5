use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OtpResponse {
    pub message: String,
    /// OTP uid, echoed back on verification.
    pub id: Option<String>,
    pub status: Option<String>,
}

impl OtpResponse {
    pub fn otp_uid(&self) -> Option<&str> {
        self.id.as_deref().filter(|id| !id.is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct UserDetails {
    pub id: i64,
    pub mobile_number: String,
    pub user_name: String,
    pub flow_name: Option<String>,
    pub role: String,
    pub is_active: bool,
    pub created_at: String,
    pub updated_at: String,
}

impl UserDetails {
    pub fn flow_name(&self) -> Option<&str> {
        self.flow_name.as_deref().filter(|name| !name.trim().is_empty())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct UserResponse {
    pub data: Option<UserDetails>,
    pub status: String,
}
