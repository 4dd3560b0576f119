use reqwest::{Client, RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use thiserror::Error;
use url::Url;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Debug, Clone)]
pub struct ApiClientConfig {
    pub base_url: Url,
    pub timeout: Duration,
    pub user_agent: String,
}

impl ApiClientConfig {
    pub fn new(base_url: Url) -> Self {
        Self {
            base_url,
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("dashboard-backup/{}", env!("CARGO_PKG_VERSION")),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Thin JSON-over-HTTP wrapper: one GET, one decode, no retries.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: ApiClientConfig,
}

impl HttpClient {
    pub fn new(config: ApiClientConfig) -> Result<Self, ApiError> {
        let client = Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .build()
            .map_err(ApiError::Request)?;

        Ok(Self { client, config })
    }

    /// Appends `path` to the base URL as written, so a base URL that carries
    /// a sub-path (e.g. `https://host/grafana`) keeps it.
    fn url(&self, path: &str) -> Result<Url, ApiError> {
        let base = self.config.base_url.as_str().trim_end_matches('/');
        Url::parse(&format!("{base}{path}")).map_err(ApiError::from)
    }

    fn apply_auth(&self, builder: RequestBuilder, auth: Option<&AuthContext>) -> RequestBuilder {
        if let Some(auth_ctx) = auth {
            auth_ctx.apply(builder)
        } else {
            builder
        }
    }

    pub async fn get_json<T>(&self, path: &str, auth: Option<&AuthContext>) -> Result<ApiResponse<T>, ApiError>
    where
        T: DeserializeOwned,
    {
        self.get_json_with_query(path, &[], auth).await
    }

    pub async fn get_json_with_query<T>(
        &self,
        path: &str,
        query: &[(&str, &str)],
        auth: Option<&AuthContext>,
    ) -> Result<ApiResponse<T>, ApiError>
    where
        T: DeserializeOwned,
    {
        let mut url = self.url(path)?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }

        let builder = self.apply_auth(self.client.get(url), auth);
        let response = builder.send().await.map_err(ApiError::from_transport)?;
        Self::hydrate_response(response).await
    }

    async fn hydrate_response<T>(response: reqwest::Response) -> Result<ApiResponse<T>, ApiError>
    where
        T: DeserializeOwned,
    {
        let status = response.status();

        if status != StatusCode::OK {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "<failed to read body>".into());
            return Err(ApiError::HttpStatus { status, body });
        }

        let body = response
            .text()
            .await
            .map_err(ApiError::from_transport)?;

        let data = serde_json::from_str(&body)
            .map_err(|source| ApiError::Deserialize { source, body })?;

        Ok(ApiResponse { data, status })
    }
}

#[derive(Debug, Clone, Default)]
pub struct AuthContext {
    pub bearer_token: Option<String>,
}

impl AuthContext {
    pub fn bearer(token: impl Into<String>) -> Self {
        Self {
            bearer_token: Some(token.into()),
        }
    }

    pub fn apply(&self, mut builder: RequestBuilder) -> RequestBuilder {
        if let Some(token) = &self.bearer_token {
            builder = builder.bearer_auth(token);
        }
        builder
    }
}

#[derive(Debug)]
pub struct ApiResponse<T> {
    pub data: T,
    pub status: StatusCode,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("invalid URL: {0}")]
    Url(#[from] url::ParseError),
    #[error("request error: {0}")]
    Request(#[source] reqwest::Error),
    #[error("request timed out: {0}")]
    Timeout(#[source] reqwest::Error),
    #[error("request failed: {status}: {body}")]
    HttpStatus { status: StatusCode, body: String },
    #[error("failed to deserialize response: {source}")]
    Deserialize {
        source: serde_json::Error,
        body: String,
    },
}

impl ApiError {
    fn from_transport(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            ApiError::Timeout(err)
        } else {
            ApiError::Request(err)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;
    use serde::Deserialize;
    use serde_json::json;
    use tokio;

    #[derive(Debug, Deserialize)]
    struct Probe {
        name: String,
    }

    fn config_for(url: &str) -> ApiClientConfig {
        ApiClientConfig::new(Url::parse(url).unwrap())
    }

    fn client_for(server: &MockServer) -> HttpClient {
        HttpClient::new(config_for(&server.base_url())).unwrap()
    }

    #[tokio::test]
    async fn sends_bearer_token_and_decodes_body() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET)
                .path("/api/probe")
                .header("Authorization", "Bearer secret-token");
            then.status(200).json_body(json!({ "name": "probe", "extra": 1 }));
        });

        let auth = AuthContext::bearer("secret-token");
        let response = client_for(&server)
            .get_json::<Probe>("/api/probe", Some(&auth))
            .await
            .unwrap();

        mock.assert();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(response.data.name, "probe");
    }

    #[tokio::test]
    async fn appends_query_pairs() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/api/search").query_param("type", "dash-db");
            then.status(200).json_body(json!([]));
        });

        let response = client_for(&server)
            .get_json_with_query::<Vec<serde_json::Value>>("/api/search", &[("type", "dash-db")], None)
            .await
            .unwrap();

        mock.assert();
        assert!(response.data.is_empty());
    }

    #[tokio::test]
    async fn keeps_base_url_sub_path() {
        let server = MockServer::start();
        let mock = server.mock(|when, then| {
            when.method(GET).path("/grafana/api/probe");
            then.status(200).json_body(json!({ "name": "nested" }));
        });

        let client = HttpClient::new(config_for(&server.url("/grafana/"))).unwrap();
        let response = client.get_json::<Probe>("/api/probe", None).await.unwrap();

        mock.assert();
        assert_eq!(response.data.name, "nested");
    }

    #[tokio::test]
    async fn non_ok_status_carries_raw_body() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/probe");
            then.status(403).body("permission denied: not json");
        });

        let err = client_for(&server)
            .get_json::<Probe>("/api/probe", None)
            .await
            .unwrap_err();

        match err {
            ApiError::HttpStatus { status, body } => {
                assert_eq!(status, StatusCode::FORBIDDEN);
                assert_eq!(body, "permission denied: not json");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn other_success_codes_are_rejected() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/probe");
            then.status(202).json_body(json!({ "name": "accepted" }));
        });

        let err = client_for(&server)
            .get_json::<Probe>("/api/probe", None)
            .await
            .unwrap_err();

        assert!(matches!(err, ApiError::HttpStatus { status, .. } if status == StatusCode::ACCEPTED));
    }

    #[tokio::test]
    async fn malformed_body_is_a_decode_error() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/probe");
            then.status(200).body("{ not json");
        });

        let err = client_for(&server)
            .get_json::<Probe>("/api/probe", None)
            .await
            .unwrap_err();

        match err {
            ApiError::Deserialize { body, .. } => assert_eq!(body, "{ not json"),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn slow_response_times_out() {
        let server = MockServer::start();
        server.mock(|when, then| {
            when.method(GET).path("/api/probe");
            then.status(200)
                .delay(Duration::from_millis(800))
                .json_body(json!({ "name": "late" }));
        });

        let config = config_for(&server.base_url()).with_timeout(Duration::from_millis(100));
        let client = HttpClient::new(config).unwrap();
        let err = client.get_json::<Probe>("/api/probe", None).await.unwrap_err();

        assert!(matches!(err, ApiError::Timeout(_)), "unexpected error: {err:?}");
    }
}
