// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::{error::Error, net::SocketAddr, sync::Arc, time::Duration};

use axum_server::{tls_rustls::RustlsConfig, Handle};
use tokio_util::sync::CancellationToken;

use cid_anchor_server::{
    api::router,
    auth::AuthService,
    blockchain::{spawn_code_check, ChainClient, ContractBackend, TransactionOrchestrator},
    config::{AppConfig, DEFAULT_LOG_FILTER},
    ipfs::IpfsClient,
    logging::init_tracing,
    state::{AppState, UploadSettings},
    storage::UserDatabase,
};

/// In-flight requests get this long to finish after a shutdown signal.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::from_env()?;
    init_tracing(DEFAULT_LOG_FILTER, config.log_json);

    let users = UserDatabase::open(&config.user_db_path())?;
    tracing::info!(path = %config.user_db_path().display(), "Credential store opened");
    let auth = AuthService::new(Arc::new(users), &config.auth)?;

    let chain: Arc<dyn ContractBackend> = match ChainClient::new(&config.chain) {
        Ok(client) => Arc::new(client),
        Err(e) => {
            tracing::error!(error = %e, "Failed to initialise chain client");
            return Err(e.into());
        }
    };
    tracing::info!(
        account = %chain.account(),
        contract = %chain.contract_address(),
        rpc_url = %config.chain.rpc_url,
        "Chain client ready"
    );
    // Startup continues even when no code is deployed at the address.
    spawn_code_check(chain.clone());
    let orchestrator = TransactionOrchestrator::new(chain)?;

    let ipfs = IpfsClient::new(&config.ipfs_api_url);
    let state = AppState::new(
        auth,
        orchestrator,
        ipfs,
        UploadSettings {
            dir: config.upload_dir.clone(),
            max_bytes: config.max_upload_bytes,
        },
    );
    let app = router(state);

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;

    let shutdown = CancellationToken::new();
    let handle = Handle::new();
    tokio::spawn(wait_for_signal(shutdown.clone()));
    tokio::spawn({
        let handle = handle.clone();
        let shutdown = shutdown.clone();
        async move {
            shutdown.cancelled().await;
            handle.graceful_shutdown(Some(SHUTDOWN_GRACE));
        }
    });

    match &config.tls {
        Some(tls) => {
            if rustls::crypto::ring::default_provider()
                .install_default()
                .is_err()
            {
                tracing::debug!("rustls crypto provider already installed");
            }
            let tls_config = RustlsConfig::from_pem_file(&tls.cert_path, &tls.key_path).await?;

            tracing::info!(%addr, "CID anchor server listening on https (docs at /docs)");
            axum_server::bind_rustls(addr, tls_config)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
        None => {
            tracing::info!(%addr, "CID anchor server listening on http (docs at /docs)");
            axum_server::bind(addr)
                .handle(handle)
                .serve(app.into_make_service())
                .await?;
        }
    }

    tracing::info!("Server stopped");
    Ok(())
}

async fn wait_for_signal(shutdown: CancellationToken) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }

    tracing::info!("Received shutdown signal");
    shutdown.cancel();
}
