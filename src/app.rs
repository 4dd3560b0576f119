use crate::config::AppConfig;
use crate::services::api::{ApiClientConfig, ApiError, AuthContext, GrafanaClient};
use crate::services::export::{clear_output, Exporter};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum RunError {
    #[error("failed to build HTTP client: {0}")]
    Client(#[source] ApiError),
    #[error("failed search API: {0}")]
    Listing(#[source] ApiError),
}

/// Wipes the output tree, lists every dashboard and exports them one by one.
///
/// Only listing is fatal. A failed wipe is logged and the run carries on;
/// per-dashboard failures are logged with the dashboard uid and the batch
/// moves on.
pub async fn run(config: &AppConfig) -> Result<(), RunError> {
    if let Err(err) = clear_output(&config.output_dir) {
        tracing::error!("failed to clear output directory: {err}");
    }

    let api_config = ApiClientConfig::new(config.base_url.clone()).with_timeout(config.timeout);
    let client = GrafanaClient::new(api_config)
        .map_err(RunError::Client)?
        .with_auth(AuthContext::bearer(config.api_token.clone()));

    let dashboards = client.list_dashboards().await.map_err(RunError::Listing)?;

    let exporter = Exporter::new(&client, &config.output_dir);
    for dashboard in &dashboards {
        match exporter.export(&dashboard.uid).await {
            Ok(path) => tracing::debug!(uid = %dashboard.uid, path = %path.display(), "saved dashboard"),
            Err(err) => tracing::error!(uid = %dashboard.uid, "{err}"),
        }
    }

    Ok(())
}
