//! Page monitor model, as far as downloads are concerned.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::attachment::normalize_extension;

/// A monitored page. Only the columns the download views read.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PageMonitor {
    pub id: i64,
    pub name: String,
    pub url: String,
    /// Comma-separated extensions this monitor keeps, e.g. `"pdf,.docx"`.
    pub attachment_types: Option<String>,
}

impl PageMonitor {
    /// Parsed attachment-type allowlist, if the monitor declares a usable one.
    pub fn allowlist(&self) -> Option<AttachmentAllowlist> {
        self.attachment_types
            .as_deref()
            .and_then(AttachmentAllowlist::parse)
    }
}

/// Set of permitted attachment extensions for one monitor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AttachmentAllowlist {
    extensions: HashSet<String>,
}

impl AttachmentAllowlist {
    /// Parses a comma-separated list.
    ///
    /// Entries are normalized like the `ext` listing filter. Entries that are
    /// empty or not plain ASCII alphanumerics are ignored. Returns `None` when
    /// nothing usable remains, which callers treat as "no allowlist".
    pub fn parse(raw: &str) -> Option<Self> {
        let extensions: HashSet<String> = raw
            .split(',')
            .map(normalize_extension)
            .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .collect();

        if extensions.is_empty() {
            None
        } else {
            Some(Self { extensions })
        }
    }

    /// Returns true if an attachment with extension `ext` may be listed.
    ///
    /// An attachment without a detectable extension is always permitted.
    pub fn permits(&self, ext: &str) -> bool {
        ext.is_empty() || self.extensions.contains(&normalize_extension(ext))
    }

    pub fn len(&self) -> usize {
        self.extensions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.extensions.is_empty()
    }
}
