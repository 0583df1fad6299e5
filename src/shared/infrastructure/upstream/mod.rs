use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use reqwest::{Client, RequestBuilder};
use serde::{Serialize, de::DeserializeOwned};
use serde_json::json;
use thiserror::Error;

pub const API_KEY_HEADER: &str = "x-api-key";

#[derive(Debug, Error)]
pub enum UpstreamError {
    #[error("{0} missing")]
    MissingConfig(&'static str),

    #[error("Backend error: {status}")]
    Status { status: u16, body: String },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("invalid upstream payload: {0}")]
    Decode(String),
}

impl UpstreamError {
    /// Configuration gaps are fatal for the request; everything else may clear up.
    pub fn is_retryable(&self) -> bool {
        !matches!(self, UpstreamError::MissingConfig(_))
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            UpstreamError::Status { status, .. } => {
                StatusCode::from_u16(*status).unwrap_or(StatusCode::BAD_GATEWAY)
            }
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn public_message(&self) -> String {
        match self {
            UpstreamError::MissingConfig(_) | UpstreamError::Status { .. } => self.to_string(),
            UpstreamError::Transport(_) | UpstreamError::Decode(_) => {
                "Internal Server Error".to_string()
            }
        }
    }
}

impl IntoResponse for UpstreamError {
    fn into_response(self) -> Response {
        (self.status_code(), Json(json!({ "error": self.public_message() }))).into_response()
    }
}

/// Server-held credentials for the upstream API. Values stay optional so a
/// missing setting fails the request that needs it instead of the process.
#[derive(Debug, Clone, Default)]
pub struct UpstreamConfig {
    pub base_url: Option<String>,
    pub api_key: Option<String>,
}

#[derive(Clone)]
pub struct UpstreamClient {
    http: Client,
    config: UpstreamConfig,
}

impl UpstreamClient {
    pub fn new(config: UpstreamConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    pub fn base_url(&self) -> Result<&str, UpstreamError> {
        self.config
            .base_url
            .as_deref()
            .filter(|url| !url.is_empty())
            .map(|url| url.trim_end_matches('/'))
            .ok_or(UpstreamError::MissingConfig("BASE_URL"))
    }

    fn api_key(&self) -> Result<&str, UpstreamError> {
        self.config
            .api_key
            .as_deref()
            .filter(|key| !key.is_empty())
            .ok_or(UpstreamError::MissingConfig("API_KEY"))
    }

    pub async fn get_json<Q, T>(&self, path: &str, query: &Q) -> Result<T, UpstreamError>
    where
        Q: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url()?);
        let request = self
            .http
            .get(&url)
            .header(API_KEY_HEADER, self.api_key()?)
            .header(reqwest::header::ACCEPT, "application/json")
            .query(query);
        tracing::debug!(%url, "proxying GET upstream");
        self.send(request).await
    }

    pub async fn post_json<B, T>(&self, path: &str, body: &B) -> Result<T, UpstreamError>
    where
        B: Serialize + ?Sized,
        T: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url()?);
        let request = self
            .http
            .post(&url)
            .header(API_KEY_HEADER, self.api_key()?)
            .json(body);
        tracing::debug!(%url, "proxying POST upstream");
        self.send(request).await
    }

    async fn send<T: DeserializeOwned>(&self, request: RequestBuilder) -> Result<T, UpstreamError> {
        let response = request
            .send()
            .await
            .map_err(|err| UpstreamError::Transport(err.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            tracing::error!(status = status.as_u16(), %body, "upstream returned an error");
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        response
            .json::<T>()
            .await
            .map_err(|err| UpstreamError::Decode(err.to_string()))
    }
}

#[cfg(test)]
mod shared_upstream_client_tests {
    use super::*;
    use axum::{Router, extract::Query, http::HeaderMap, routing::get};
    use http_body_util::BodyExt;
    use rstest::rstest;
    use std::collections::HashMap;

    async fn spawn_upstream(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("bind failed");
        let addr = listener.local_addr().expect("no local addr");
        tokio::spawn(async move {
            axum::serve(listener, router).await.expect("serve failed");
        });
        format!("http://{addr}")
    }

    fn client(base_url: Option<String>, api_key: Option<&str>) -> UpstreamClient {
        UpstreamClient::new(UpstreamConfig {
            base_url,
            api_key: api_key.map(str::to_string),
        })
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_send_the_api_key_and_query() {
        let router = Router::new().route(
            "/echo",
            get(
                |headers: HeaderMap, Query(q): Query<HashMap<String, String>>| async move {
                    Json(json!({
                        "key": headers.get(API_KEY_HEADER).and_then(|v| v.to_str().ok()),
                        "name": q.get("workflowName"),
                    }))
                },
            ),
        );
        let base = spawn_upstream(router).await;

        let value: serde_json::Value = client(Some(base), Some("secret"))
            .get_json("/echo", &[("workflowName", "KNH Discharge")])
            .await
            .expect("get failed");

        assert_eq!(value["key"], "secret");
        assert_eq!(value["name"], "KNH Discharge");
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_preserve_the_upstream_status() {
        let router = Router::new().route("/missing", get(|| async { StatusCode::NOT_FOUND }));
        let base = spawn_upstream(router).await;

        let result: Result<serde_json::Value, _> = client(Some(base), Some("secret"))
            .get_json("/missing", &())
            .await;

        let err = result.expect_err("expected a status error");
        assert!(matches!(err, UpstreamError::Status { status: 404, .. }));
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert!(err.is_retryable());
    }

    #[rstest]
    #[case(None, Some("secret"), "BASE_URL missing")]
    #[case(Some("http://localhost:1".to_string()), None, "API_KEY missing")]
    #[tokio::test]
    async fn it_should_fail_fast_on_missing_configuration(
        #[case] base_url: Option<String>,
        #[case] api_key: Option<&str>,
        #[case] expected: &str,
    ) {
        let result: Result<serde_json::Value, _> =
            client(base_url, api_key).get_json("/anything", &()).await;

        let err = result.expect_err("expected a config error");
        assert_eq!(err.to_string(), expected);
        assert!(!err.is_retryable());
        assert_eq!(err.status_code(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_render_errors_as_json_bodies() {
        let response = UpstreamError::Status {
            status: 401,
            body: "nope".into(),
        }
        .into_response();

        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json, json!({ "error": "Backend error: 401" }));
    }

    #[rstest]
    #[tokio::test]
    async fn it_should_hide_transport_details_from_callers() {
        let response = UpstreamError::Transport("connection refused".into()).into_response();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json, json!({ "error": "Internal Server Error" }));
    }
}
