// Pagewatch Token - Download capability tokens
//
// Stateless, signed, expiring tokens that authorize downloading exactly one
// stored file. Minting and verification both live on `TokenService`.

pub mod clock;
pub mod secret;
pub mod service;
pub mod sign;
pub mod types;
pub mod verify;

pub use clock::{Clock, ManualClock, SystemClock};
pub use secret::DownloadSecret;
pub use service::{TokenService, AUDIENCE, DEFAULT_MAX_TTL_SECS, DEFAULT_TTL_SECS};
pub use types::{DownloadCapability, DownloadToken, TokenError};
