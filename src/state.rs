// SPDX-License-Identifier: AGPL-3.0-or-later
//
// Copyright (C) 2026 Relational Network

use std::path::PathBuf;
use std::sync::Arc;

use crate::auth::AuthService;
use crate::blockchain::TransactionOrchestrator;
use crate::ipfs::IpfsClient;

/// Where received uploads are staged before they go to IPFS.
#[derive(Debug, Clone)]
pub struct UploadSettings {
    pub dir: PathBuf,
    pub max_bytes: usize,
}

#[derive(Clone)]
pub struct AppState {
    pub auth: Arc<AuthService>,
    pub orchestrator: Arc<TransactionOrchestrator>,
    pub ipfs: Arc<IpfsClient>,
    pub uploads: UploadSettings,
}

impl AppState {
    pub fn new(
        auth: AuthService,
        orchestrator: TransactionOrchestrator,
        ipfs: IpfsClient,
        uploads: UploadSettings,
    ) -> Self {
        Self {
            auth: Arc::new(auth),
            orchestrator: Arc::new(orchestrator),
            ipfs: Arc::new(ipfs),
            uploads,
        }
    }
}
