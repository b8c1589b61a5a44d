// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! IPFS HTTP API bridge.
//!
//! Only the two calls the upload and download routes need: `add` and `cat`.

use std::path::Path;

use axum::body::Bytes;
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Result of adding a file to IPFS.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AddedFile {
    pub cid: String,
    pub file_size: u64,
    pub original_name: String,
}

/// `/add` response body. `Size` arrives as a string on most daemons.
#[derive(Debug, Deserialize)]
struct AddResponse {
    #[serde(rename = "Hash")]
    hash: String,
    #[serde(rename = "Size")]
    size: serde_json::Value,
    #[serde(rename = "Name", default)]
    name: String,
}

#[derive(Debug, thiserror::Error)]
pub enum IpfsError {
    #[error("failed to read upload: {0}")]
    Io(#[from] std::io::Error),

    #[error("IPFS request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("IPFS returned status {0}")]
    Status(u16),

    #[error("unexpected IPFS response: {0}")]
    InvalidResponse(String),
}

#[derive(Clone)]
pub struct IpfsClient {
    http: reqwest::Client,
    base_url: String,
}

impl IpfsClient {
    /// `base_url` is the API root, e.g. `http://127.0.0.1:5001/api/v0`.
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Add a file from disk under the given display name.
    pub async fn add_file(&self, path: &Path, file_name: &str) -> Result<AddedFile, IpfsError> {
        let data = tokio::fs::read(path).await?;
        let part = reqwest::multipart::Part::bytes(data).file_name(file_name.to_string());
        let form = reqwest::multipart::Form::new().part("file", part);

        let response = self
            .http
            .post(format!("{}/add", self.base_url))
            .multipart(form)
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(IpfsError::Status(response.status().as_u16()));
        }

        let added: AddResponse = response.json().await?;
        let file_size = match &added.size {
            serde_json::Value::String(s) => s.parse::<u64>().ok(),
            serde_json::Value::Number(n) => n.as_u64(),
            _ => None,
        }
        .ok_or_else(|| IpfsError::InvalidResponse(format!("bad Size field {}", added.size)))?;

        tracing::info!(cid = %added.hash, file_size, "File added to IPFS");
        Ok(AddedFile {
            cid: added.hash,
            file_size,
            original_name: if added.name.is_empty() {
                file_name.to_string()
            } else {
                added.name
            },
        })
    }

    /// Fetch the raw content behind a CID.
    pub async fn cat(&self, cid: &str) -> Result<Bytes, IpfsError> {
        let response = self
            .http
            .post(format!("{}/cat", self.base_url))
            .query(&[("arg", cid)])
            .send()
            .await?;
        if !response.status().is_success() {
            return Err(IpfsError::Status(response.status().as_u16()));
        }
        Ok(response.bytes().await?)
    }
}

/// Whether `cid` looks like a CIDv0 (`Qm` + 44 alphanumerics without `0`)
/// or a CIDv1 (59 lowercase alphanumerics). Surrounding whitespace is ignored.
pub fn is_valid_cid(cid: &str) -> bool {
    let cid = cid.trim();
    if let Some(rest) = cid.strip_prefix("Qm") {
        if rest.len() == 44 && rest.chars().all(|c| c.is_ascii_alphanumeric() && c != '0') {
            return true;
        }
    }
    cid.len() == 59
        && cid
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Query, routing::post, Json, Router};
    use std::collections::HashMap;

    const CID_V0: &str = "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG";
    const CID_V1: &str = "bafybeigdyrzt5sfp7udm7hu76uh7y26nf3efuylqabf3oclgtqy55fbzdi";

    /// Serve a fake IPFS API on an ephemeral port.
    async fn fake_ipfs() -> String {
        let app = Router::new()
            .route(
                "/api/v0/add",
                post(|| async {
                    Json(serde_json::json!({ "Name": "clip.mp4", "Hash": CID_V0, "Size": "2048" }))
                }),
            )
            .route(
                "/api/v0/cat",
                post(|Query(params): Query<HashMap<String, String>>| async move {
                    match params.get("arg").map(String::as_str) {
                        Some(CID_V0) => Ok(b"video-bytes".to_vec()),
                        _ => Err(axum::http::StatusCode::INTERNAL_SERVER_ERROR),
                    }
                }),
            );

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{addr}/api/v0/")
    }

    #[test]
    fn cid_formats() {
        assert!(is_valid_cid(CID_V0));
        assert!(is_valid_cid(CID_V1));
        assert!(!is_valid_cid("Qm123"));
        assert!(!is_valid_cid("QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbd0"));
        assert!(!is_valid_cid(&CID_V1.to_uppercase()));
        assert!(!is_valid_cid(""));
        assert!(!is_valid_cid(&format!("{CID_V1}a")));
    }

    #[test]
    fn cid_check_ignores_surrounding_whitespace() {
        assert!(is_valid_cid(&format!("  {CID_V0}\n")));
        assert!(is_valid_cid(&format!("\t{CID_V1} ")));
    }

    #[test]
    fn cidv1_accepts_any_lowercase_alphanumeric() {
        // Multibase prefix and base32 digit range are not enforced.
        let without_prefix = format!("z{}", &CID_V1[1..]);
        assert!(is_valid_cid(&without_prefix));
        assert!(is_valid_cid(&format!("{}9", "a1".repeat(29))));
    }

    #[tokio::test]
    async fn add_file_maps_response_fields() {
        let client = IpfsClient::new(&fake_ipfs().await);
        assert!(!client.base_url().ends_with('/'));

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("0b5e.mp4");
        tokio::fs::write(&path, b"not really a video").await.unwrap();

        let added = client.add_file(&path, "clip.mp4").await.unwrap();
        assert_eq!(
            added,
            AddedFile {
                cid: CID_V0.to_string(),
                file_size: 2048,
                original_name: "clip.mp4".to_string(),
            }
        );

        let json = serde_json::to_value(&added).unwrap();
        assert_eq!(json["fileSize"], 2048);
        assert_eq!(json["originalName"], "clip.mp4");
    }

    #[tokio::test]
    async fn cat_returns_bytes_and_surfaces_failures() {
        let client = IpfsClient::new(&fake_ipfs().await);
        assert_eq!(&client.cat(CID_V0).await.unwrap()[..], b"video-bytes");
        assert!(matches!(
            client.cat(CID_V1).await,
            Err(IpfsError::Status(500))
        ));
    }

    #[tokio::test]
    async fn missing_file_is_io_error() {
        let client = IpfsClient::new("http://127.0.0.1:9/api/v0");
        assert!(matches!(
            client.add_file(Path::new("/nonexistent/file.mp4"), "file.mp4").await,
            Err(IpfsError::Io(_))
        ));
    }
}
