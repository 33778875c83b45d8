// Token service construction
//
// Minting lives in sign.rs, verification in verify.rs.

use std::fmt;
use std::sync::Arc;

use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Validation};

use crate::clock::{Clock, SystemClock};
use crate::secret::DownloadSecret;

/// Audience tag embedded in, and required of, every download token.
pub const AUDIENCE: &str = "download";

/// Lifetime used when a caller has no reason to pick another (5 minutes).
pub const DEFAULT_TTL_SECS: u64 = 300;

/// Upper bound on any token lifetime (1 hour).
pub const DEFAULT_MAX_TTL_SECS: u64 = 3600;

/// Mints and verifies download capability tokens.
///
/// Holds the only copy of the signing key. Stateless apart from that: no
/// record of issued tokens is kept, so a token stays usable until it expires.
pub struct TokenService {
    pub(crate) encoding_key: EncodingKey,
    pub(crate) decoding_key: DecodingKey,
    pub(crate) validation: Validation,
    pub(crate) max_ttl: u64,
    pub(crate) clock: Arc<dyn Clock>,
}

impl TokenService {
    /// Creates a service backed by the system clock.
    pub fn new(secret: &DownloadSecret) -> Self {
        Self::with_clock(secret, Arc::new(SystemClock))
    }

    /// Creates a service that reads time from `clock`.
    pub fn with_clock(secret: &DownloadSecret, clock: Arc<dyn Clock>) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&[AUDIENCE]);
        validation.set_required_spec_claims(&["exp", "aud"]);
        // Expiry is checked against the injected clock in verify.rs.
        validation.validate_exp = false;
        validation.validate_nbf = false;
        validation.leeway = 0;

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            max_ttl: DEFAULT_MAX_TTL_SECS,
            clock,
        }
    }

    /// Sets the longest lifetime a token may be minted with or carry.
    pub fn with_max_ttl(mut self, max_ttl: u64) -> Self {
        self.max_ttl = max_ttl.max(1);
        self
    }

    pub fn max_ttl(&self) -> u64 {
        self.max_ttl
    }
}

impl fmt::Debug for TokenService {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TokenService")
            .field("max_ttl", &self.max_ttl)
            .field("clock", &self.clock)
            .finish_non_exhaustive()
    }
}
