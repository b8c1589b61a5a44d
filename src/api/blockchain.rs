// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Contract, transaction and IPFS endpoints.

use std::path::{Path as FsPath, PathBuf};

use alloy::primitives::U256;
use axum::{
    extract::{Multipart, Path, State},
    http::header,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::auth::Auth;
use crate::blockchain::{MetadataRecord, TransactionStatus};
use crate::error::{ApiError, ApiJson, ErrorBody};
use crate::ipfs::is_valid_cid;
use crate::state::AppState;

/// MIME types accepted by the upload endpoint.
pub const ALLOWED_UPLOAD_TYPES: &[&str] = &[
    "video/mp4",
    "video/webm",
    "video/avi",
    "video/mkv",
    "video/mov",
    "video/flv",
    "video/x-msvideo",
    "video/quicktime",
];

/// An unsigned integer given as a JSON number or a decimal string.
#[derive(Debug, Deserialize, ToSchema)]
#[serde(untagged)]
pub enum UintInput {
    Number(u64),
    Text(String),
}

impl UintInput {
    fn to_u256(&self) -> Option<U256> {
        match self {
            UintInput::Number(n) => Some(U256::from(*n)),
            UintInput::Text(s) => {
                let s = s.trim();
                if s.is_empty() || !s.bytes().all(|b| b.is_ascii_digit()) {
                    return None;
                }
                U256::from_str_radix(s, 10).ok()
            }
        }
    }
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StoreValueRequest {
    pub value: UintInput,
}

#[derive(Debug, Deserialize, ToSchema)]
pub struct StoreCidRequest {
    #[schema(example = "QmYwAPJzv5CZsnA625s3Xf2nemtYgPpHdWEz79ojWnPbdG")]
    pub cid: String,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TransactionHashResponse {
    pub transaction_hash: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ValueResponse {
    /// Stored value as a decimal string
    pub value: String,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct MetadataIndexResponse {
    pub index: u64,
}

#[derive(Debug, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub cid: String,
    pub file_size: u64,
    pub original_name: String,
    pub transaction_hash: String,
}

/// Store an integer in the contract.
#[utoipa::path(
    post,
    path = "/api/v1/blockchain/value",
    tag = "Blockchain",
    security(("bearer" = [])),
    request_body = StoreValueRequest,
    responses(
        (status = 200, description = "Transaction submitted", body = TransactionHashResponse),
        (status = 400, description = "Value is not an unsigned integer", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 500, description = "Node failure", body = ErrorBody)
    )
)]
pub async fn store_value(
    Auth(user): Auth,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<StoreValueRequest>,
) -> Result<Json<TransactionHashResponse>, ApiError> {
    let value = request
        .value
        .to_u256()
        .ok_or_else(|| ApiError::bad_request("value must be an unsigned integer"))?;

    tracing::debug!(user_id = user.id, %value, "Storing value");
    let transaction_hash = state.orchestrator.store_value(value).await?;
    Ok(Json(TransactionHashResponse { transaction_hash }))
}

/// Read the stored integer.
#[utoipa::path(
    get,
    path = "/api/v1/blockchain/value",
    tag = "Blockchain",
    responses(
        (status = 200, description = "Stored value", body = ValueResponse),
        (status = 500, description = "Node failure", body = ErrorBody)
    )
)]
pub async fn retrieve_value(State(state): State<AppState>) -> Result<Json<ValueResponse>, ApiError> {
    let value = state.orchestrator.retrieve_value().await?;
    Ok(Json(ValueResponse { value }))
}

/// Status of a submitted transaction.
#[utoipa::path(
    get,
    path = "/api/v1/blockchain/transactions/{hash}",
    tag = "Blockchain",
    params(("hash" = String, Path, description = "0x-prefixed transaction hash")),
    responses(
        (status = 200, description = "Pending or confirmed", body = TransactionStatus),
        (status = 400, description = "Malformed hash", body = ErrorBody),
        (status = 500, description = "Node failure", body = ErrorBody)
    )
)]
pub async fn transaction_status(
    State(state): State<AppState>,
    Path(hash): Path<String>,
) -> Result<Json<TransactionStatus>, ApiError> {
    if !is_tx_hash(&hash) {
        return Err(ApiError::bad_request("Invalid transaction hash"));
    }
    Ok(Json(state.orchestrator.get_transaction_status(&hash).await?))
}

/// Anchor a CID in the contract.
#[utoipa::path(
    post,
    path = "/api/v1/blockchain/cid",
    tag = "Blockchain",
    security(("bearer" = [])),
    request_body = StoreCidRequest,
    responses(
        (status = 200, description = "Transaction submitted", body = TransactionHashResponse),
        (status = 400, description = "Invalid CID", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 500, description = "Node failure", body = ErrorBody)
    )
)]
pub async fn store_cid(
    Auth(user): Auth,
    State(state): State<AppState>,
    ApiJson(request): ApiJson<StoreCidRequest>,
) -> Result<Json<TransactionHashResponse>, ApiError> {
    let cid = request.cid.trim();
    if !is_valid_cid(cid) {
        return Err(ApiError::bad_request("Invalid CID format"));
    }

    tracing::debug!(user_id = user.id, %cid, "Anchoring CID");
    let transaction_hash = state.orchestrator.store_cid(cid).await?;
    Ok(Json(TransactionHashResponse { transaction_hash }))
}

/// Upload a video to IPFS and anchor its CID.
///
/// The staged file is removed whether or not anchoring succeeds.
#[utoipa::path(
    post,
    path = "/api/v1/blockchain/upload",
    tag = "Blockchain",
    security(("bearer" = [])),
    request_body(content_type = "multipart/form-data", description = "Video in the `file` field"),
    responses(
        (status = 200, description = "Uploaded and anchored", body = UploadResponse),
        (status = 400, description = "Missing file or unsupported type", body = ErrorBody),
        (status = 401, description = "Missing or invalid token", body = ErrorBody),
        (status = 413, description = "File too large", body = ErrorBody),
        (status = 500, description = "IPFS or node failure", body = ErrorBody)
    )
)]
pub async fn upload_file(
    Auth(user): Auth,
    State(state): State<AppState>,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, ApiError> {
    let staged = receive_upload(&state.uploads.dir, &mut multipart).await?;
    tracing::info!(
        user_id = user.id,
        original_name = %staged.original_name,
        path = %staged.path.display(),
        "Upload received"
    );

    let result = anchor_upload(&state, &staged).await;

    if let Err(e) = tokio::fs::remove_file(&staged.path).await {
        tracing::warn!(path = %staged.path.display(), error = %e, "Failed to remove staged upload");
    }

    result.map(Json)
}

struct StagedUpload {
    path: PathBuf,
    original_name: String,
}

async fn receive_upload(dir: &FsPath, multipart: &mut Multipart) -> Result<StagedUpload, ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::new(e.status(), e.body_text()))?
    {
        if field.name() != Some("file") {
            continue;
        }

        let content_type = field.content_type().unwrap_or_default().to_ascii_lowercase();
        if !ALLOWED_UPLOAD_TYPES.contains(&content_type.as_str()) {
            return Err(ApiError::bad_request("Only video files are allowed"));
        }

        let original_name = field.file_name().unwrap_or("upload").to_string();
        let data = field
            .bytes()
            .await
            .map_err(|e| ApiError::new(e.status(), e.body_text()))?;

        tokio::fs::create_dir_all(dir)
            .await
            .map_err(|e| ApiError::internal("Failed to store upload", e))?;
        let path = dir.join(staged_file_name(&original_name));
        tokio::fs::write(&path, &data)
            .await
            .map_err(|e| ApiError::internal("Failed to store upload", e))?;

        return Ok(StagedUpload {
            path,
            original_name,
        });
    }

    Err(ApiError::bad_request("No file uploaded"))
}

/// Random name that keeps the original extension.
fn staged_file_name(original_name: &str) -> String {
    let extension = FsPath::new(original_name)
        .extension()
        .and_then(|ext| ext.to_str())
        .filter(|ext| ext.chars().all(|c| c.is_ascii_alphanumeric()));
    match extension {
        Some(ext) => format!("{}.{}", Uuid::new_v4(), ext),
        None => Uuid::new_v4().to_string(),
    }
}

async fn anchor_upload(state: &AppState, staged: &StagedUpload) -> Result<UploadResponse, ApiError> {
    let added = state
        .ipfs
        .add_file(&staged.path, &staged.original_name)
        .await
        .map_err(|e| ApiError::internal("Failed to upload file to IPFS", e))?;

    let transaction_hash = state.orchestrator.store_cid(&added.cid).await?;

    Ok(UploadResponse {
        cid: added.cid,
        file_size: added.file_size,
        original_name: added.original_name,
        transaction_hash,
    })
}

/// Index of the most recent metadata entry.
#[utoipa::path(
    get,
    path = "/api/v1/blockchain/metadata/latest",
    tag = "Blockchain",
    responses(
        (status = 200, description = "Latest index", body = MetadataIndexResponse),
        (status = 500, description = "Nothing stored yet (`success: true`) or node failure", body = ErrorBody)
    )
)]
pub async fn latest_metadata_index(
    State(state): State<AppState>,
) -> Result<Json<MetadataIndexResponse>, ApiError> {
    let index = state.orchestrator.get_latest_metadata_index().await?;
    Ok(Json(MetadataIndexResponse { index }))
}

/// The most recent metadata entry.
#[utoipa::path(
    get,
    path = "/api/v1/blockchain/metadata",
    tag = "Blockchain",
    responses(
        (status = 200, description = "Latest entry", body = MetadataRecord),
        (status = 404, description = "Entry missing or incomplete", body = ErrorBody),
        (status = 500, description = "Nothing stored yet (`success: true`) or node failure", body = ErrorBody)
    )
)]
pub async fn latest_metadata(State(state): State<AppState>) -> Result<Json<MetadataRecord>, ApiError> {
    let index = state.orchestrator.get_latest_metadata_index().await?;
    Ok(Json(state.orchestrator.retrieve_metadata(index).await?))
}

/// Metadata entry by index.
#[utoipa::path(
    get,
    path = "/api/v1/blockchain/metadata/{index}",
    tag = "Blockchain",
    params(("index" = u64, Path, description = "Zero-based entry index")),
    responses(
        (status = 200, description = "Entry", body = MetadataRecord),
        (status = 400, description = "Index is not a non-negative integer", body = ErrorBody),
        (status = 404, description = "Entry missing or incomplete", body = ErrorBody),
        (status = 500, description = "Node failure", body = ErrorBody)
    )
)]
pub async fn metadata_by_index(
    State(state): State<AppState>,
    Path(index): Path<String>,
) -> Result<Json<MetadataRecord>, ApiError> {
    let index = index
        .parse::<u64>()
        .map_err(|_| ApiError::bad_request("index must be a non-negative integer"))?;
    Ok(Json(state.orchestrator.retrieve_metadata(index).await?))
}

/// Raw content behind a CID.
#[utoipa::path(
    get,
    path = "/api/v1/blockchain/ipfs/{cid}",
    tag = "Blockchain",
    params(("cid" = String, Path, description = "CIDv0 or CIDv1")),
    responses(
        (status = 200, description = "File content", content_type = "application/octet-stream"),
        (status = 400, description = "Invalid CID", body = ErrorBody),
        (status = 500, description = "IPFS failure", body = ErrorBody)
    )
)]
pub async fn download_file(
    State(state): State<AppState>,
    Path(cid): Path<String>,
) -> Result<impl IntoResponse, ApiError> {
    let cid = cid.trim();
    if !is_valid_cid(cid) {
        return Err(ApiError::bad_request("Invalid CID format"));
    }

    let bytes = state
        .ipfs
        .cat(cid)
        .await
        .map_err(|e| ApiError::internal("Failed to download file from IPFS", e))?;

    Ok(([(header::CONTENT_TYPE, "application/octet-stream")], bytes))
}

fn is_tx_hash(hash: &str) -> bool {
    hash.strip_prefix("0x")
        .is_some_and(|hex| hex.len() == 64 && hex.chars().all(|c| c.is_ascii_hexdigit()))
}
