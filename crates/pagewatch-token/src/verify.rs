// Token verification
//
// Checks signature, algorithm, audience, claim shape, lifetime bounds and
// expiry, in that order. Pure apart from reading the clock.

use chrono::{DateTime, Utc};
use jsonwebtoken::decode;
use jsonwebtoken::errors::{Error as JwtError, ErrorKind as JwtErrorKind};

use crate::service::{TokenService, AUDIENCE};
use crate::types::{DownloadCapability, DownloadClaims, TokenError};

impl TokenService {
    /// Verifies a download token.
    ///
    /// Returns the capability when the token is authentic, addressed to the
    /// download audience and not yet expired. Every failure collapses to
    /// `None`; use [`TokenService::try_verify`] when the reason matters.
    pub fn verify(&self, token: &str) -> Option<DownloadCapability> {
        self.try_verify(token).ok()
    }

    /// Verifies a download token, reporting why it was rejected.
    pub fn try_verify(&self, token: &str) -> Result<DownloadCapability, TokenError> {
        let token = token.trim();
        if token.is_empty() {
            return Err(TokenError::Empty);
        }

        let claims = decode::<DownloadClaims>(token, &self.decoding_key, &self.validation)
            .map_err(classify_jwt_error)?
            .claims;

        if claims.aud != AUDIENCE {
            return Err(TokenError::WrongAudience);
        }

        let lifetime = claims
            .exp
            .checked_sub(claims.iat)
            .ok_or_else(|| TokenError::Malformed("timestamp overflow".to_string()))?;
        let max_ttl = i64::try_from(self.max_ttl).unwrap_or(i64::MAX);
        if lifetime < 0 || lifetime > max_ttl {
            return Err(TokenError::TtlOutOfBounds(lifetime));
        }

        let issued_at = to_datetime(claims.iat)?;
        let expires_at = to_datetime(claims.exp)?;

        if self.clock.now() > expires_at {
            return Err(TokenError::Expired(expires_at));
        }

        Ok(DownloadCapability {
            storage_key: claims.p,
            display_name: claims.n,
            issued_at,
            expires_at,
        })
    }
}

fn to_datetime(secs: i64) -> Result<DateTime<Utc>, TokenError> {
    DateTime::from_timestamp(secs, 0)
        .ok_or_else(|| TokenError::Malformed(format!("timestamp out of range: {}", secs)))
}

fn classify_jwt_error(err: JwtError) -> TokenError {
    match err.kind() {
        JwtErrorKind::InvalidSignature => TokenError::InvalidSignature,
        JwtErrorKind::InvalidAudience => TokenError::WrongAudience,
        _ => TokenError::Malformed(err.to_string()),
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use chrono::{Duration, TimeZone, Utc};

    use super::*;
    use crate::{Clock, DownloadSecret, ManualClock};

    fn setup() -> (TokenService, ManualClock) {
        let clock = ManualClock::new(Utc.with_ymd_and_hms(2026, 3, 1, 9, 0, 0).unwrap());
        let service = TokenService::with_clock(
            &DownloadSecret::from_base("test-secret"),
            Arc::new(clock.clone()),
        );
        (service, clock)
    }

    #[test]
    fn test_verify_returns_signed_fields() {
        let (service, clock) = setup();
        let token = service.mint("report-42.pdf", "Q3 Report.pdf", 300).unwrap();

        let capability = service.verify(token.as_str()).expect("fresh token should verify");

        assert_eq!(capability.storage_key, "report-42.pdf");
        assert_eq!(capability.display_name, "Q3 Report.pdf");
        assert_eq!(capability.issued_at, clock.now());
        assert_eq!(capability.expires_at, clock.now() + Duration::seconds(300));
    }

    #[test]
    fn test_verify_empty_token() {
        let (service, _) = setup();
        assert_eq!(service.try_verify("  "), Err(TokenError::Empty));
    }

    #[test]
    fn test_verify_garbage_is_malformed() {
        let (service, _) = setup();
        let result = service.try_verify("not-a-token");
        assert!(matches!(result, Err(TokenError::Malformed(_))));
    }

    #[test]
    fn test_verify_accepts_at_expiry_instant_and_rejects_after() {
        let (service, clock) = setup();
        let token = service.mint("a.pdf", "a.pdf", 1).unwrap();

        clock.advance(Duration::seconds(1));
        assert!(service.verify(token.as_str()).is_some());

        clock.advance(Duration::milliseconds(1));
        assert!(matches!(
            service.try_verify(token.as_str()),
            Err(TokenError::Expired(_))
        ));
    }

    #[test]
    fn test_verify_rejects_lifetime_above_max() {
        let (long_lived, clock) = setup();
        let long_lived = long_lived.with_max_ttl(3600);
        let token = long_lived.mint("a.pdf", "", 3600).unwrap();

        let strict = TokenService::with_clock(
            &DownloadSecret::from_base("test-secret"),
            Arc::new(clock),
        )
        .with_max_ttl(300);

        assert_eq!(
            strict.try_verify(token.as_str()),
            Err(TokenError::TtlOutOfBounds(3600))
        );
    }
}
