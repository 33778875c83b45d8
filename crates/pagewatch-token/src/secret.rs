// Signing secret derivation for download tokens

use std::fmt;

/// Base secret used when none is configured. Local development only.
pub const DEV_BASE_SECRET: &str = "dev_secret_change_me";

/// Domain-separation tag appended to the base secret. Keeps download tokens
/// and session tokens signed under different keys even though both derive
/// from the same configured value.
const DOMAIN_SUFFIX: &str = "::download";

/// Key material for signing and verifying download tokens.
#[derive(Clone, PartialEq, Eq)]
pub struct DownloadSecret {
    material: Vec<u8>,
    insecure_default: bool,
}

impl DownloadSecret {
    /// Derives the download secret from the configured base secret.
    ///
    /// The base is trimmed first. A blank base falls back to
    /// [`DEV_BASE_SECRET`] and the result is flagged as insecure.
    pub fn from_base(base: &str) -> Self {
        let trimmed = base.trim();
        let (base, insecure_default) = if trimmed.is_empty() {
            (DEV_BASE_SECRET, true)
        } else {
            (trimmed, false)
        };

        Self {
            material: format!("{base}{DOMAIN_SUFFIX}").into_bytes(),
            insecure_default,
        }
    }

    /// Returns true when the development fallback secret is in use.
    pub fn is_insecure_default(&self) -> bool {
        self.insecure_default
    }

    /// Raw HMAC key bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.material
    }
}

impl fmt::Debug for DownloadSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DownloadSecret")
            .field("material", &"<redacted>")
            .field("insecure_default", &self.insecure_default)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_base_appends_domain_suffix() {
        let secret = DownloadSecret::from_base("hunter2");
        assert_eq!(secret.as_bytes(), b"hunter2::download");
        assert!(!secret.is_insecure_default());
    }

    #[test]
    fn test_from_base_trims_whitespace() {
        let secret = DownloadSecret::from_base("  hunter2\n");
        assert_eq!(secret.as_bytes(), b"hunter2::download");
    }

    #[test]
    fn test_blank_base_uses_flagged_dev_secret() {
        let secret = DownloadSecret::from_base("   ");
        assert!(secret.is_insecure_default());
        assert_eq!(secret.as_bytes(), b"dev_secret_change_me::download");
    }

    #[test]
    fn test_debug_does_not_print_material() {
        let secret = DownloadSecret::from_base("hunter2");
        let rendered = format!("{:?}", secret);
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("redacted"));
    }
}
