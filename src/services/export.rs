use crate::services::api::{ApiError, DashboardDocument, GrafanaClient};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to fetch dashboard {uid}: {source}")]
    Summary {
        uid: String,
        #[source]
        source: ApiError,
    },
    #[error("failed to fetch raw JSON for dashboard {uid}: {source}")]
    Document {
        uid: String,
        #[source]
        source: ApiError,
    },
    #[error("failed to encode dashboard {uid}: {source}")]
    Serialize {
        uid: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("filesystem error at {}: {source}", .path.display())]
    Filesystem {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}

/// Replaces `/` and spaces with `-`. Nothing else is escaped.
pub fn sanitize_file_name(title: &str) -> String {
    title.replace(['/', ' '], "-")
}

pub fn dashboard_file_name(title: &str, uid: &str) -> String {
    format!("{}_{uid}.json", sanitize_file_name(title))
}

/// Removes the previous export tree. A missing directory is not an error.
pub fn clear_output(root: &Path) -> Result<(), ExportError> {
    match fs::remove_dir_all(root) {
        Ok(()) => Ok(()),
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(source) => Err(ExportError::Filesystem {
            path: root.to_path_buf(),
            source,
        }),
    }
}

pub struct Exporter<'a> {
    client: &'a GrafanaClient,
    output_root: &'a Path,
}

impl<'a> Exporter<'a> {
    pub fn new(client: &'a GrafanaClient, output_root: &'a Path) -> Self {
        Self {
            client,
            output_root,
        }
    }

    /// Exports one dashboard to `<root>/<folder>/<title>_<uid>.json` and
    /// returns the written path.
    ///
    /// The folder is created before the raw document is fetched, so a failed
    /// document fetch can leave an empty folder behind but never a partial file.
    pub async fn export(&self, uid: &str) -> Result<PathBuf, ExportError> {
        let summary = self
            .client
            .dashboard_summary(uid)
            .await
            .map_err(|source| ExportError::Summary {
                uid: uid.to_string(),
                source,
            })?;

        let file_name = dashboard_file_name(&summary.title, uid);
        // A leading `/` would make `join` discard the output root.
        let folder = self
            .output_root
            .join(summary.folder_title.trim_start_matches('/'));
        fs::create_dir_all(&folder).map_err(|source| ExportError::Filesystem {
            path: folder.clone(),
            source,
        })?;

        let document = self
            .client
            .dashboard_document(uid)
            .await
            .map_err(|source| ExportError::Document {
                uid: uid.to_string(),
                source,
            })?;

        let path = folder.join(file_name);
        write_document(&path, uid, &document)?;
        Ok(path)
    }
}

fn write_document(path: &Path, uid: &str, document: &DashboardDocument) -> Result<(), ExportError> {
    let mut encoded = serde_json::to_vec_pretty(document).map_err(|source| ExportError::Serialize {
        uid: uid.to_string(),
        source,
    })?;
    encoded.push(b'\n');

    fs::write(path, encoded).map_err(|source| ExportError::Filesystem {
        path: path.to_path_buf(),
        source,
    })
}
