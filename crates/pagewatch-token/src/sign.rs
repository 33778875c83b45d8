// Token minting
//
// Produces compact HS256 tokens binding one storage key and display name to a
// bounded validity window.

use jsonwebtoken::{encode, Algorithm, Header};

use crate::service::{TokenService, AUDIENCE};
use crate::types::{DownloadClaims, DownloadToken};

impl TokenService {
    /// Mints a download token for `storage_key`.
    ///
    /// Both inputs are trimmed. Returns `None` when the storage key is blank:
    /// there is nothing to download, so there is no link to offer.
    /// `ttl_secs` is clamped to `1..=max_ttl`.
    pub fn mint(&self, storage_key: &str, display_name: &str, ttl_secs: u64) -> Option<DownloadToken> {
        let storage_key = storage_key.trim();
        if storage_key.is_empty() {
            return None;
        }

        let ttl = i64::try_from(ttl_secs.clamp(1, self.max_ttl)).unwrap_or(i64::MAX);
        let issued_at = self.clock.now().timestamp();

        let claims = DownloadClaims {
            p: storage_key.to_string(),
            n: display_name.trim().to_string(),
            iat: issued_at,
            exp: issued_at.saturating_add(ttl),
            aud: AUDIENCE.to_string(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .ok()
            .map(DownloadToken::new)
    }
}
