//! Attachment descriptors recorded by the check pipeline.

use serde::{Deserialize, Deserializer};
use serde_json::{Map, Value};

/// One file attached to a change-history record.
///
/// Decoded leniently from the `attachments` JSON column, which is written by
/// the ingestion pipeline and not validated by this service. Deliberately not
/// `Serialize`: the storage path must only ever leave the server inside a
/// signed token.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct AttachmentDescriptor {
    /// Original file name, used for display and extension matching.
    #[serde(default, deserialize_with = "lenient_string")]
    pub name: String,
    /// Storage key relative to the download root.
    #[serde(rename = "path", default, deserialize_with = "lenient_string")]
    pub storage_path: String,
    /// Size in bytes, if known.
    #[serde(default, deserialize_with = "lenient_size")]
    pub size: Option<i64>,
    /// Page the file was found on.
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub source_link: Option<String>,
    /// Title of the link the file was found behind.
    #[serde(default, deserialize_with = "lenient_opt_string")]
    pub source_title: Option<String>,
    /// Any other fields the pipeline recorded.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl AttachmentDescriptor {
    pub fn new(name: impl Into<String>, storage_path: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            storage_path: storage_path.into(),
            ..Self::default()
        }
    }

    pub fn with_size(mut self, size: i64) -> Self {
        self.size = Some(size);
        self
    }

    pub fn with_source(mut self, link: impl Into<String>, title: impl Into<String>) -> Self {
        self.source_link = Some(link.into());
        self.source_title = Some(title.into());
        self
    }

    /// Decodes the `attachments` column.
    ///
    /// Anything other than an array yields no attachments; array elements
    /// that cannot be decoded are skipped.
    pub fn list_from_json(value: Option<&Value>) -> Vec<Self> {
        match value {
            Some(Value::Array(items)) => items
                .iter()
                .filter_map(|item| serde_json::from_value(item.clone()).ok())
                .collect(),
            _ => Vec::new(),
        }
    }

    /// Lower-cased extension of the file name.
    pub fn extension(&self) -> String {
        file_extension(&self.name)
    }
}

/// Returns the lower-cased text after the last `.` of `name`, or an empty
/// string when there is no dot.
pub fn file_extension(name: &str) -> String {
    match name.rfind('.') {
        Some(idx) => name[idx + 1..].to_lowercase(),
        None => String::new(),
    }
}

/// Normalizes a user- or config-supplied extension: trimmed, lower-cased,
/// leading dots removed. `".PDF"`, `"pdf"` and `" ..pdf "` all become `"pdf"`.
pub fn normalize_extension(raw: &str) -> String {
    raw.trim().trim_start_matches('.').to_lowercase()
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => s,
        Some(Value::Number(n)) => n.to_string(),
        Some(Value::Bool(b)) => b.to_string(),
        _ => String::new(),
    })
}

fn lenient_opt_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) if !s.is_empty() => Some(s),
        _ => None,
    })
}

fn lenient_size<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let size = match Option::<Value>::deserialize(deserializer)? {
        Some(Value::Number(n)) => n.as_i64().or_else(|| n.as_f64().map(|f| f as i64)),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok().map(|f| f as i64),
        _ => None,
    };
    Ok(size.filter(|&s| s != 0))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_decode_full_descriptor() {
        let value = json!([{
            "name": "report.pdf",
            "path": "a1b2-report.pdf",
            "size": 2048,
            "sourceLink": "https://example.com/reports",
            "sourceTitle": "Quarterly reports",
            "mime": "application/pdf"
        }]);

        let list = AttachmentDescriptor::list_from_json(Some(&value));

        assert_eq!(list.len(), 1);
        let attachment = &list[0];
        assert_eq!(attachment.name, "report.pdf");
        assert_eq!(attachment.storage_path, "a1b2-report.pdf");
        assert_eq!(attachment.size, Some(2048));
        assert_eq!(attachment.source_link.as_deref(), Some("https://example.com/reports"));
        assert_eq!(attachment.source_title.as_deref(), Some("Quarterly reports"));
        assert_eq!(attachment.extra.get("mime"), Some(&json!("application/pdf")));
        assert!(!attachment.extra.contains_key("path"));
    }

    #[test]
    fn test_decode_tolerates_loose_types() {
        let value = json!([
            { "name": "a.txt", "path": "a.txt", "size": "512" },
            { "name": "b.txt", "path": "b.txt", "size": 0 },
            { "name": "c.txt", "size": "big" },
            { "name": 42, "path": null, "sourceLink": 7 }
        ]);

        let list = AttachmentDescriptor::list_from_json(Some(&value));

        assert_eq!(list.len(), 4);
        assert_eq!(list[0].size, Some(512));
        assert_eq!(list[1].size, None);
        assert_eq!(list[2].size, None);
        assert_eq!(list[2].storage_path, "");
        assert_eq!(list[3].name, "42");
        assert_eq!(list[3].source_link, None);
    }

    #[test]
    fn test_decode_skips_non_objects_and_non_arrays() {
        let value = json!(["just a string", 12, { "name": "ok.pdf", "path": "ok.pdf" }]);
        assert_eq!(AttachmentDescriptor::list_from_json(Some(&value)).len(), 1);

        assert!(AttachmentDescriptor::list_from_json(Some(&json!({"name": "x"}))).is_empty());
        assert!(AttachmentDescriptor::list_from_json(Some(&Value::Null)).is_empty());
        assert!(AttachmentDescriptor::list_from_json(None).is_empty());
    }

    #[test]
    fn test_file_extension() {
        assert_eq!(file_extension("report.pdf"), "pdf");
        assert_eq!(file_extension("notes.TXT"), "txt");
        assert_eq!(file_extension("archive.tar.gz"), "gz");
        assert_eq!(file_extension("README"), "");
        assert_eq!(file_extension("trailing."), "");
        assert_eq!(file_extension(".bashrc"), "bashrc");
    }

    #[test]
    fn test_normalize_extension() {
        assert_eq!(normalize_extension(".PDF"), "pdf");
        assert_eq!(normalize_extension("  pdf "), "pdf");
        assert_eq!(normalize_extension("..png"), "png");
        assert_eq!(normalize_extension(""), "");
    }
}
