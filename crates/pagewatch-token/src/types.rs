//! Type definitions for download capability tokens.
//!
//! `DownloadClaims` is the signed wire payload. `DownloadCapability` is what
//! callers get back after the payload has been verified and validated.

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Signed claims carried by a download token.
///
/// Field names are kept short since the token travels inside URLs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(deny_unknown_fields)]
pub(crate) struct DownloadClaims {
    /// Storage key of the file (single path segment).
    pub p: String,
    /// Display name offered to the client.
    pub n: String,
    /// Issued-at, seconds since the Unix epoch.
    pub iat: i64,
    /// Expiry, seconds since the Unix epoch.
    pub exp: i64,
    /// Audience tag, always "download".
    pub aud: String,
}

/// A verified authorization to download one stored file.
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DownloadCapability {
    /// Storage key as signed. Not yet sanitized for filesystem use.
    pub storage_key: String,
    /// Display name as signed. May be empty.
    pub display_name: String,
    /// When the token was minted.
    pub issued_at: DateTime<Utc>,
    /// Last instant at which the token is accepted.
    pub expires_at: DateTime<Utc>,
}

/// A minted, signed download token in compact form.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct DownloadToken(String);

impl DownloadToken {
    pub(crate) fn new(compact: String) -> Self {
        Self(compact)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DownloadToken {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for DownloadToken {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Why a token was rejected.
///
/// Meant for logs and operator tooling. HTTP callers only ever see a single
/// "invalid or expired" outcome.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TokenError {
    #[error("token is empty")]
    Empty,

    #[error("token is malformed: {0}")]
    Malformed(String),

    #[error("token signature is invalid")]
    InvalidSignature,

    #[error("token audience is not 'download'")]
    WrongAudience,

    #[error("token expired at {0}")]
    Expired(DateTime<Utc>),

    #[error("token lifetime of {0} seconds is outside the allowed range")]
    TtlOutOfBounds(i64),
}
