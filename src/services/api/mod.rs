pub mod grafana;
pub mod http;

pub use grafana::{DashboardDocument, GrafanaClient};
pub use http::{ApiClientConfig, ApiError, AuthContext};
