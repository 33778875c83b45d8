//! Change-history records and their attachments.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use super::attachment::AttachmentDescriptor;
use super::monitor::PageMonitor;

/// A change-history row as stored.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct ChangeHistory {
    pub id: i64,
    pub monitor_id: i64,
    pub check_time: DateTime<Utc>,
    /// Raw attachment descriptors written by the check pipeline.
    pub attachments: Option<serde_json::Value>,
}

/// A change-history record with decoded attachments and its owning monitor.
#[derive(Debug, Clone)]
pub struct HistoryRecord {
    pub id: i64,
    pub monitor_id: i64,
    pub check_time: DateTime<Utc>,
    pub attachments: Vec<AttachmentDescriptor>,
    /// `None` if the monitor no longer exists.
    pub monitor: Option<PageMonitor>,
}

impl HistoryRecord {
    /// Builds a record from a stored row.
    pub fn from_row(row: ChangeHistory, monitor: Option<PageMonitor>) -> Self {
        Self {
            id: row.id,
            monitor_id: row.monitor_id,
            check_time: row.check_time,
            attachments: AttachmentDescriptor::list_from_json(row.attachments.as_ref()),
            monitor,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_from_row_decodes_attachments() {
        let row = ChangeHistory {
            id: 7,
            monitor_id: 3,
            check_time: Utc::now(),
            attachments: Some(json!([
                { "name": "report.pdf", "path": "r.pdf" },
                "garbage"
            ])),
        };

        let record = HistoryRecord::from_row(row, None);

        assert_eq!(record.id, 7);
        assert_eq!(record.monitor_id, 3);
        assert_eq!(record.attachments.len(), 1);
        assert_eq!(record.attachments[0].storage_path, "r.pdf");
        assert!(record.monitor.is_none());
    }

    #[test]
    fn test_from_row_without_attachments() {
        let row = ChangeHistory {
            id: 1,
            monitor_id: 1,
            check_time: Utc::now(),
            attachments: None,
        };

        assert!(HistoryRecord::from_row(row, None).attachments.is_empty());
    }
}
