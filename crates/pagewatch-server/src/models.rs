//! Data models for monitors, change history and their attachments.

pub mod attachment;
pub mod change_history;
pub mod monitor;

pub use attachment::{file_extension, normalize_extension, AttachmentDescriptor};
pub use change_history::{ChangeHistory, HistoryRecord};
pub use monitor::{AttachmentAllowlist, PageMonitor};
