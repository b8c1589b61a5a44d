// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};
use tower_http::{
    cors::CorsLayer,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use utoipa::{
    openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme},
    Modify, OpenApi,
};
use utoipa_swagger_ui::SwaggerUi;

use crate::{
    auth::AuthResponse,
    blockchain::{MetadataRecord, TransactionState, TransactionStatus},
    error::ErrorBody,
    state::AppState,
    storage::SanitizedUser,
};

pub mod auth;
pub mod blockchain;
pub mod health;

/// Route prefix for the versioned API.
pub const API_PREFIX: &str = "/api/v1";

pub fn router(state: AppState) -> Router {
    let max_upload_bytes = state.uploads.max_bytes;

    let v1_routes = Router::new()
        .route("/auth/register", post(auth::register))
        .route("/auth/login", post(auth::login))
        .route("/auth/profile", get(auth::profile))
        .route(
            "/blockchain/value",
            get(blockchain::retrieve_value).post(blockchain::store_value),
        )
        .route(
            "/blockchain/transactions/{hash}",
            get(blockchain::transaction_status),
        )
        .route("/blockchain/cid", post(blockchain::store_cid))
        .route(
            "/blockchain/upload",
            post(blockchain::upload_file).layer(DefaultBodyLimit::max(max_upload_bytes)),
        )
        .route("/blockchain/metadata", get(blockchain::latest_metadata))
        .route(
            "/blockchain/metadata/latest",
            get(blockchain::latest_metadata_index),
        )
        .route(
            "/blockchain/metadata/{index}",
            get(blockchain::metadata_by_index),
        )
        .route("/blockchain/ipfs/{cid}", get(blockchain::download_file))
        .with_state(state.clone());

    let health_routes = Router::new()
        .route("/health", get(health::health))
        .route("/health/live", get(health::liveness))
        .route("/health/ready", get(health::readiness))
        .with_state(state);

    Router::new()
        .nest(API_PREFIX, v1_routes)
        .merge(health_routes)
        .merge(SwaggerUi::new("/docs").url("/api-doc/openapi.json", ApiDoc::openapi()))
        .layer(TraceLayer::new_for_http())
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .layer(CorsLayer::permissive())
}

struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .build(),
                ),
            );
        }
    }
}

#[derive(OpenApi)]
#[openapi(
    paths(
        auth::register,
        auth::login,
        auth::profile,
        blockchain::store_value,
        blockchain::retrieve_value,
        blockchain::transaction_status,
        blockchain::store_cid,
        blockchain::upload_file,
        blockchain::latest_metadata_index,
        blockchain::latest_metadata,
        blockchain::metadata_by_index,
        blockchain::download_file,
        health::health,
        health::liveness,
        health::readiness
    ),
    components(
        schemas(
            AuthResponse,
            SanitizedUser,
            ErrorBody,
            MetadataRecord,
            TransactionState,
            TransactionStatus,
            auth::RegisterRequest,
            auth::LoginRequest,
            auth::ProfileResponse,
            blockchain::UintInput,
            blockchain::StoreValueRequest,
            blockchain::StoreCidRequest,
            blockchain::TransactionHashResponse,
            blockchain::ValueResponse,
            blockchain::MetadataIndexResponse,
            blockchain::UploadResponse,
            health::CheckStatus,
            health::ComponentChecks,
            health::HealthReport,
            health::LiveResponse
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Auth", description = "Registration, login and profile"),
        (name = "Blockchain", description = "Contract reads, writes and IPFS anchoring"),
        (name = "Health", description = "Liveness and readiness probes")
    )
)]
struct ApiDoc;

#[cfg(test)]
pub(crate) mod test_support {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::Router;

    use super::router;
    use crate::auth::{AuthService, CredentialHasher, TokenIssuer};
    use crate::blockchain::{mock::MockChain, TransactionOrchestrator};
    use crate::ipfs::IpfsClient;
    use crate::state::{AppState, UploadSettings};
    use crate::storage::InMemoryUserStore;

    pub struct TestApp {
        pub router: Router,
        pub chain: Arc<MockChain>,
        pub upload_dir: tempfile::TempDir,
    }

    pub fn test_app(ipfs_url: &str) -> TestApp {
        let chain = Arc::new(MockChain::new());
        let auth = AuthService::from_parts(
            Arc::new(InMemoryUserStore::new()),
            CredentialHasher::new(1).unwrap(),
            TokenIssuer::new("router-test-secret", Duration::from_secs(3600)).unwrap(),
        );
        let orchestrator = TransactionOrchestrator::new(chain.clone()).unwrap();
        let upload_dir = tempfile::tempdir().unwrap();

        let state = AppState::new(
            auth,
            orchestrator,
            IpfsClient::new(ipfs_url),
            UploadSettings {
                dir: upload_dir.path().to_path_buf(),
                max_bytes: 1024 * 1024,
            },
        );

        TestApp {
            router: router(state),
            chain,
            upload_dir,
        }
    }
}
