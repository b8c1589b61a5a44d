// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

//! Liveness and readiness probes.
//!
//! Readiness covers the two dependencies every request path touches: the
//! node (an `eth_blockNumber` round trip) and the credential store.

use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use utoipa::ToSchema;

use crate::state::AppState;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Ok,
    Unavailable,
}

impl CheckStatus {
    fn from_result<E: std::fmt::Display>(component: &'static str, result: Result<(), E>) -> Self {
        match result {
            Ok(()) => CheckStatus::Ok,
            Err(e) => {
                tracing::warn!(component, error = %e, "Readiness check failed");
                CheckStatus::Unavailable
            }
        }
    }
}

#[derive(Debug, Serialize, ToSchema)]
pub struct ComponentChecks {
    pub service: CheckStatus,
    pub chain: CheckStatus,
    pub store: CheckStatus,
}

impl ComponentChecks {
    fn all_ok(&self) -> bool {
        [self.service, self.chain, self.store]
            .iter()
            .all(|c| *c == CheckStatus::Ok)
    }
}

/// `status` is `ok` or `degraded`.
#[derive(Debug, Serialize, ToSchema)]
pub struct HealthReport {
    pub status: &'static str,
    pub checks: ComponentChecks,
}

#[derive(Debug, Serialize, ToSchema)]
pub struct LiveResponse {
    pub status: &'static str,
}

async fn report(state: &AppState) -> (StatusCode, Json<HealthReport>) {
    let chain = state.orchestrator.chain().block_number().await.map(|_| ());
    let store = state.auth.store().health_check();

    let checks = ComponentChecks {
        service: CheckStatus::Ok,
        chain: CheckStatus::from_result("chain", chain),
        store: CheckStatus::from_result("store", store),
    };

    if checks.all_ok() {
        let body = HealthReport {
            status: "ok",
            checks,
        };
        (StatusCode::OK, Json(body))
    } else {
        let body = HealthReport {
            status: "degraded",
            checks,
        };
        (StatusCode::SERVICE_UNAVAILABLE, Json(body))
    }
}

/// Node and credential store status.
#[utoipa::path(
    get,
    path = "/health",
    tag = "Health",
    responses(
        (status = 200, description = "All components reachable", body = HealthReport),
        (status = 503, description = "A component is unreachable", body = HealthReport)
    )
)]
pub async fn health(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    report(&state).await
}

#[utoipa::path(
    get,
    path = "/health/live",
    tag = "Health",
    responses((status = 200, description = "Process is up", body = LiveResponse))
)]
pub async fn liveness() -> Json<LiveResponse> {
    Json(LiveResponse { status: "ok" })
}

/// Same checks as `/health`, for orchestrator readiness probes.
#[utoipa::path(
    get,
    path = "/health/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Ready to serve", body = HealthReport),
        (status = 503, description = "Not ready", body = HealthReport)
    )
)]
pub async fn readiness(State(state): State<AppState>) -> (StatusCode, Json<HealthReport>) {
    report(&state).await
}
