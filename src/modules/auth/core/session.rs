use axum::http::{HeaderMap, header::COOKIE};
use std::borrow::Cow;

pub const SESSION_COOKIE: &str = "flowName";
pub const SESSION_MAX_AGE_SECS: u64 = 30 * 24 * 60 * 60;

/// The login session is nothing more than the workflow the user may view.
/// It is owned by the browser and trusted as presented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Session {
    flow_name: String,
}

impl Session {
    pub fn new(flow_name: impl Into<String>) -> Option<Self> {
        let flow_name = flow_name.into();
        if flow_name.trim().is_empty() {
            return None;
        }
        Some(Self { flow_name })
    }

    pub fn flow_name(&self) -> &str {
        &self.flow_name
    }

    pub fn from_headers(headers: &HeaderMap) -> Option<Self> {
        headers
            .get_all(COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| value.split(';'))
            .filter_map(|pair| pair.trim().split_once('='))
            .find(|(name, _)| *name == SESSION_COOKIE)
            .and_then(|(_, value)| Self::new(decode_value(value)))
    }

    pub fn set_cookie(&self) -> String {
        format!(
            "{SESSION_COOKIE}={}; Path=/; Max-Age={SESSION_MAX_AGE_SECS}; SameSite=Lax",
            urlencoding::encode(&self.flow_name)
        )
    }

    pub fn clear_cookie() -> String {
        format!("{SESSION_COOKIE}=; Path=/; Max-Age=0; SameSite=Lax")
    }
}

/// Decodes `%XX` escapes. Undecodable input is returned as is.
fn decode_value(raw: &str) -> String {
    urlencoding::decode(raw)
        .map(Cow::into_owned)
        .unwrap_or_else(|_| raw.to_string())
}
