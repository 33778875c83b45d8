//! Shared request state.

use std::path::PathBuf;
use std::sync::Arc;

use pagewatch_token::TokenService;

use crate::catalog::DownloadCatalog;
use crate::history::HistoryStore;
use crate::storage::StorageGateway;

/// State handed to every route. Cheap to clone.
#[derive(Clone)]
pub struct AppState {
    pub catalog: Arc<DownloadCatalog>,
    pub gateway: Arc<StorageGateway>,
}

impl AppState {
    /// Wires the catalog and gateway around one token service.
    ///
    /// # Arguments
    /// * `tokens` - Token service shared by minting and verification
    /// * `history` - Source of change-history records
    /// * `download_root` - Directory downloads are served from
    /// * `ttl_secs` - Lifetime of tokens minted for listings
    pub fn new(
        tokens: Arc<TokenService>,
        history: Arc<dyn HistoryStore>,
        download_root: impl Into<PathBuf>,
        ttl_secs: u64,
    ) -> Self {
        Self {
            catalog: Arc::new(DownloadCatalog::new(tokens.clone(), history, ttl_secs)),
            gateway: Arc::new(StorageGateway::new(tokens, download_root)),
        }
    }
}
