//! LANraragi API client backed by `ureq`.

use std::time::Duration;

use base64::Engine;
use serde::Deserialize;
use tracing::debug;

use crate::error::RemoteError;
use crate::remote::{ArchiveMetadata, ArchiveService, RemoteResult};

pub struct LanraragiClient {
    base_url: String,
    auth_header: String,
    http_client: ureq::Agent,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: Option<String>,
}

impl LanraragiClient {
    pub fn new(base_url: &str, api_key: &str) -> Self {
        let http_client = ureq::AgentBuilder::new()
            .timeout_connect(Duration::from_secs(10))
            .timeout_read(Duration::from_secs(30))
            .timeout_write(Duration::from_secs(30))
            .build();
        let token = base64::engine::general_purpose::STANDARD.encode(api_key);
        Self {
            base_url: base_url.trim().trim_end_matches('/').to_string(),
            auth_header: format!("Bearer {token}"),
            http_client,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn get(&self, path: &str) -> RemoteResult<ureq::Response> {
        debug!("GET {}", path);
        self.http_client
            .get(&self.url(path))
            .set("Authorization", &self.auth_header)
            .call()
            .map_err(classify_ureq_failure)
    }

    fn get_json<T: serde::de::DeserializeOwned>(&self, path: &str) -> RemoteResult<T> {
        self.get(path)?.into_json().map_err(|err| RemoteError::Transport {
            message: format!("invalid response body from {path}: {err}"),
            transient: false,
        })
    }
}

impl ArchiveService for LanraragiClient {
    fn check_session(&self) -> RemoteResult<()> {
        self.get("/api/shinobu").map(|_| ())
    }

    fn list_untagged_archive_ids(&self) -> RemoteResult<Vec<String>> {
        self.get_json("/api/archives/untagged")
    }

    fn get_metadata(&self, arcid: &str) -> RemoteResult<ArchiveMetadata> {
        self.get_json(&format!("/api/archives/{arcid}/metadata"))
    }

    fn update_metadata(&self, arcid: &str, title: &str, tags: &str, summary: &str) -> RemoteResult<()> {
        let path = format!("/api/archives/{arcid}/metadata");
        debug!("PUT {}", path);
        self.http_client
            .put(&self.url(&path))
            .set("Authorization", &self.auth_header)
            .send_form(&[("title", title), ("tags", tags), ("summary", summary)])
            .map(|_| ())
            .map_err(classify_ureq_failure)
    }
}

/// Maps a `ureq` failure onto the status/transport split the executor retries on.
fn classify_ureq_failure(error: ureq::Error) -> RemoteError {
    match error {
        ureq::Error::Status(status, response) => {
            let body = response.into_string().unwrap_or_default();
            let message = serde_json::from_str::<ErrorBody>(&body)
                .ok()
                .and_then(|parsed| parsed.error)
                .unwrap_or(body);
            RemoteError::Status { status, message }
        }
        ureq::Error::Transport(transport) => {
            let transient = matches!(
                transport.kind(),
                ureq::ErrorKind::Dns | ureq::ErrorKind::ConnectionFailed | ureq::ErrorKind::Io
            );
            RemoteError::Transport {
                message: transport.to_string(),
                transient,
            }
        }
    }
}
