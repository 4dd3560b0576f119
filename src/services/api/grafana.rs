use super::http::{ApiClientConfig, ApiError, AuthContext, HttpClient};
use serde::Deserialize;
use serde_json::{Map, Value};
use std::sync::Arc;

const SEARCH_PATH: &str = "/api/search";
const DASHBOARD_TYPE: &str = "dash-db";

/// Full dashboard definition exactly as returned by the detail endpoint.
pub type DashboardDocument = Map<String, Value>;

#[derive(Clone)]
pub struct GrafanaClient {
    http: Arc<HttpClient>,
    auth: Option<AuthContext>,
}

impl GrafanaClient {
    pub fn new(config: ApiClientConfig) -> Result<Self, ApiError> {
        Ok(Self {
            http: Arc::new(HttpClient::new(config)?),
            auth: None,
        })
    }

    pub fn with_auth(mut self, auth: AuthContext) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Single search request restricted to dashboards. Pagination is not
    /// followed: only the first page the server returns is listed.
    pub async fn list_dashboards(&self) -> Result<Vec<DashboardRef>, ApiError> {
        let response = self
            .http
            .get_json_with_query::<Vec<DashboardRef>>(
                SEARCH_PATH,
                &[("type", DASHBOARD_TYPE)],
                self.auth.as_ref(),
            )
            .await?;
        tracing::debug!(
            status = %response.status,
            count = response.data.len(),
            "listed dashboards"
        );
        Ok(response.data)
    }

    pub async fn dashboard_summary(&self, uid: &str) -> Result<DashboardSummary, ApiError> {
        let response = self
            .http
            .get_json::<DashboardDetail>(&detail_path(uid), self.auth.as_ref())
            .await?;
        Ok(response.data.into())
    }

    pub async fn dashboard_document(&self, uid: &str) -> Result<DashboardDocument, ApiError> {
        let response = self
            .http
            .get_json::<DashboardDocument>(&detail_path(uid), self.auth.as_ref())
            .await?;
        Ok(response.data)
    }
}

fn detail_path(uid: &str) -> String {
    format!("/api/dashboards/uid/{uid}")
}

#[derive(Debug, Clone, Deserialize)]
pub struct DashboardRef {
    pub uid: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DashboardSummary {
    pub title: String,
    pub folder_title: String,
}

#[derive(Debug, Deserialize)]
struct DashboardDetail {
    #[serde(default)]
    dashboard: DashboardHeader,
    #[serde(default)]
    meta: DashboardMeta,
}

#[derive(Debug, Default, Deserialize)]
struct DashboardHeader {
    #[serde(default)]
    title: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
struct DashboardMeta {
    #[serde(default)]
    folder_title: Option<String>,
}

impl From<DashboardDetail> for DashboardSummary {
    fn from(detail: DashboardDetail) -> Self {
        Self {
            title: detail.dashboard.title.unwrap_or_default(),
            folder_title: detail.meta.folder_title.unwrap_or_default(),
        }
    }
}
