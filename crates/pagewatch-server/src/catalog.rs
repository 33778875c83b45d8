//! Download listings built from change-history attachments.
//!
//! Every entry carries a freshly minted, short-lived download URL. Nothing
//! here is persisted: listings are rebuilt from history on each request.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use pagewatch_token::TokenService;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::encoding::encode_component;
use crate::error::AppError;
use crate::history::HistoryStore;
use crate::models::{normalize_extension, AttachmentAllowlist, AttachmentDescriptor, HistoryRecord};

/// Default and maximum number of history records scanned per listing.
pub const MAX_LISTING_LIMIT: i64 = 200;

/// Number of records returned by the per-monitor history view.
pub const MONITOR_HISTORY_LIMIT: i64 = 50;

/// Filters for a download listing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ListingFilter {
    /// Number of history records to scan, in `1..=200`.
    pub limit: i64,
    /// Lower-cased substring matched against file name or storage path.
    pub query: Option<String>,
    /// Normalized extension the file name must end with.
    pub extension: Option<String>,
    /// Restrict to one monitor's history.
    pub monitor_id: Option<i64>,
}

impl Default for ListingFilter {
    fn default() -> Self {
        Self {
            limit: MAX_LISTING_LIMIT,
            query: None,
            extension: None,
            monitor_id: None,
        }
    }
}

impl ListingFilter {
    /// Builds a filter from raw query-string values.
    ///
    /// Never fails: unparseable values fall back to their defaults.
    pub fn from_params(
        limit: Option<&str>,
        query: Option<&str>,
        extension: Option<&str>,
        monitor_id: Option<&str>,
    ) -> Self {
        let limit = limit
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .and_then(|s| s.parse::<i64>().ok())
            .map_or(MAX_LISTING_LIMIT, |n| n.clamp(1, MAX_LISTING_LIMIT));

        let query = query
            .map(|q| q.trim().to_lowercase())
            .filter(|q| !q.is_empty());

        let extension = extension
            .map(normalize_extension)
            .filter(|e| !e.is_empty());

        let monitor_id = monitor_id
            .and_then(|s| s.trim().parse::<i64>().ok())
            .filter(|&id| id != 0);

        Self {
            limit,
            query,
            extension,
            monitor_id,
        }
    }
}

/// One downloadable attachment in a listing.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct DownloadListingEntry {
    pub monitor_id: i64,
    pub monitor_name: String,
    pub monitor_url: String,
    pub history_record_id: i64,
    pub check_time: DateTime<Utc>,
    pub file_name: String,
    pub size: Option<i64>,
    pub source_link: Option<String>,
    pub source_title: Option<String>,
    pub download_url: String,
}

/// A change-history record as returned by the per-monitor history view.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntryView {
    pub id: i64,
    pub monitor_id: i64,
    pub check_time: DateTime<Utc>,
    pub attachments: Vec<HistoryAttachmentView>,
}

/// An attachment with its storage path replaced by a download URL.
#[derive(Debug, Clone, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct HistoryAttachmentView {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_link: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source_title: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
    /// `None` when the attachment has no storage path to link to.
    pub download_url: Option<String>,
}

/// Builds download listings and history views.
pub struct DownloadCatalog {
    tokens: Arc<TokenService>,
    history: Arc<dyn HistoryStore>,
    ttl_secs: u64,
}

impl DownloadCatalog {
    pub fn new(tokens: Arc<TokenService>, history: Arc<dyn HistoryStore>, ttl_secs: u64) -> Self {
        Self {
            tokens,
            history,
            ttl_secs,
        }
    }

    /// Lists downloadable attachments from the most recent history records.
    ///
    /// `filter.limit` bounds the records scanned, not the entries returned.
    pub async fn list(&self, filter: &ListingFilter) -> Result<Vec<DownloadListingEntry>, AppError> {
        let records = self.history.recent(filter.monitor_id, filter.limit).await?;
        Ok(self.expand(&records, filter))
    }

    /// Returns a monitor's recent history with attachment paths replaced by
    /// download URLs.
    pub async fn for_monitor_history(&self, monitor_id: i64) -> Result<Vec<HistoryEntryView>, AppError> {
        let records = self.history.recent(Some(monitor_id), MONITOR_HISTORY_LIMIT).await?;

        Ok(records
            .into_iter()
            .map(|record| HistoryEntryView {
                id: record.id,
                monitor_id: record.monitor_id,
                check_time: record.check_time,
                attachments: record
                    .attachments
                    .into_iter()
                    .map(|attachment| self.attachment_view(attachment))
                    .collect(),
            })
            .collect())
    }

    /// Expands records into listing entries, applying the filter's text,
    /// extension and per-monitor allowlist rules.
    pub fn expand(&self, records: &[HistoryRecord], filter: &ListingFilter) -> Vec<DownloadListingEntry> {
        let mut items = Vec::new();

        for record in records {
            if record.attachments.is_empty() {
                continue;
            }

            let allowlist = record_allowlist(record);

            for attachment in &record.attachments {
                if attachment.storage_path.is_empty() {
                    continue;
                }
                if !matches_filter(attachment, filter, allowlist.as_ref()) {
                    continue;
                }
                let Some(download_url) = self.download_url(attachment) else {
                    continue;
                };

                let (monitor_name, monitor_url) = record
                    .monitor
                    .as_ref()
                    .map(|m| (m.name.clone(), m.url.clone()))
                    .unwrap_or_default();

                items.push(DownloadListingEntry {
                    monitor_id: record.monitor_id,
                    monitor_name,
                    monitor_url,
                    history_record_id: record.id,
                    check_time: record.check_time,
                    file_name: attachment.name.clone(),
                    size: attachment.size,
                    source_link: attachment.source_link.clone(),
                    source_title: attachment.source_title.clone(),
                    download_url,
                });
            }
        }

        items
    }

    /// Mints a token for `attachment` and returns its `/d/` URL.
    fn download_url(&self, attachment: &AttachmentDescriptor) -> Option<String> {
        self.tokens
            .mint(&attachment.storage_path, &attachment.name, self.ttl_secs)
            .map(|token| download_path(token.as_str()))
    }

    fn attachment_view(&self, attachment: AttachmentDescriptor) -> HistoryAttachmentView {
        let download_url = self.download_url(&attachment);
        let mut extra = attachment.extra;
        extra.remove("downloadUrl");

        HistoryAttachmentView {
            name: attachment.name,
            size: attachment.size,
            source_link: attachment.source_link,
            source_title: attachment.source_title,
            extra,
            download_url,
        }
    }
}

/// Path of the download endpoint for a token.
pub fn download_path(token: &str) -> String {
    format!("/d/{}", encode_component(token))
}

fn record_allowlist(record: &HistoryRecord) -> Option<AttachmentAllowlist> {
    let monitor = record.monitor.as_ref()?;
    let allowlist = monitor.allowlist();

    if allowlist.is_none() {
        if let Some(raw) = monitor.attachment_types.as_deref().filter(|s| !s.trim().is_empty()) {
            tracing::warn!(
                monitor_id = monitor.id,
                attachment_types = raw,
                "Ignoring attachment type allowlist with no usable entries"
            );
        }
    }

    allowlist
}

fn matches_filter(
    attachment: &AttachmentDescriptor,
    filter: &ListingFilter,
    allowlist: Option<&AttachmentAllowlist>,
) -> bool {
    if let Some(query) = filter.query.as_deref() {
        let in_name = attachment.name.to_lowercase().contains(query);
        let in_path = attachment.storage_path.to_lowercase().contains(query);
        if !in_name && !in_path {
            return false;
        }
    }

    let extension = attachment.extension();

    if let Some(wanted) = filter.extension.as_deref() {
        if extension != wanted {
            return false;
        }
    }

    if let Some(allowlist) = allowlist {
        if !allowlist.permits(&extension) {
            return false;
        }
    }

    true
}
