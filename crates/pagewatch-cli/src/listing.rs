// Listing module - fetches download listings from a running server

use anyhow::{anyhow, Context, Result};
use serde::Deserialize;

/// One entry of `GET /api/v1/listing`.
#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ListingEntry {
    pub monitor_id: i64,
    pub monitor_name: String,
    pub history_record_id: i64,
    pub check_time: String,
    pub file_name: String,
    pub size: Option<i64>,
    pub download_url: String,
}

#[derive(Debug, Deserialize)]
struct ListingResponse {
    items: Vec<ListingEntry>,
}

/// Filters forwarded to the listing endpoint.
#[derive(Debug, Default, Clone)]
pub struct ListingParams {
    pub q: Option<String>,
    pub ext: Option<String>,
    pub monitor: Option<i64>,
    pub limit: Option<u32>,
}

/// Fetches a download listing from `server`.
pub fn fetch_listing(server: &str, params: &ListingParams) -> Result<Vec<ListingEntry>> {
    let url = format!("{}/api/v1/listing", base_url(server));
    let mut request = ureq::get(&url);

    if let Some(q) = &params.q {
        request = request.query("q", q);
    }
    if let Some(ext) = &params.ext {
        request = request.query("ext", ext);
    }
    if let Some(monitor) = params.monitor {
        request = request.query("monitorId", &monitor.to_string());
    }
    if let Some(limit) = params.limit {
        request = request.query("limit", &limit.to_string());
    }

    let response = request.call().map_err(|e| match e {
        ureq::Error::Status(code, response) => {
            let body = response.into_string().unwrap_or_default();
            anyhow!("Server returned {}: {}", code, body.trim())
        }
        other => anyhow!("Failed to reach {}: {}", url, other),
    })?;

    let listing: ListingResponse = response
        .into_json()
        .context("Failed to parse listing response")?;

    Ok(listing.items)
}

/// Server URL without a trailing slash.
pub fn base_url(server: &str) -> &str {
    server.trim_end_matches('/')
}

/// Renders a byte count for humans.
pub fn human_size(size: Option<i64>) -> String {
    const UNITS: [&str; 4] = ["KB", "MB", "GB", "TB"];

    let Some(bytes) = size.filter(|&b| b >= 0) else {
        return "-".to_string();
    };
    if bytes < 1024 {
        return format!("{} B", bytes);
    }

    let mut value = bytes as f64 / 1024.0;
    let mut unit = 0;
    while value >= 1024.0 && unit < UNITS.len() - 1 {
        value /= 1024.0;
        unit += 1;
    }
    format!("{:.1} {}", value, UNITS[unit])
}

/// One line per entry: name, size, monitor, record, absolute download URL.
pub fn format_entry(entry: &ListingEntry, server: &str) -> String {
    format!(
        "{}\t{}\t{} (#{})\trecord {}\t{}{}",
        entry.file_name,
        human_size(entry.size),
        entry.monitor_name,
        entry.monitor_id,
        entry.history_record_id,
        base_url(server),
        entry.download_url
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry() -> ListingEntry {
        serde_json::from_value(serde_json::json!({
            "monitorId": 3,
            "monitorName": "Reports",
            "monitorUrl": "https://example.com",
            "historyRecordId": 17,
            "checkTime": "2026-09-01T10:00:00Z",
            "fileName": "report.pdf",
            "size": 2048,
            "sourceLink": null,
            "sourceTitle": null,
            "downloadUrl": "/d/abc.def.ghi"
        }))
        .expect("listing entry should parse")
    }

    #[test]
    fn test_base_url_trims_trailing_slashes() {
        assert_eq!(base_url("http://localhost:3000/"), "http://localhost:3000");
        assert_eq!(base_url("http://localhost:3000"), "http://localhost:3000");
    }

    #[test]
    fn test_human_size() {
        assert_eq!(human_size(None), "-");
        assert_eq!(human_size(Some(512)), "512 B");
        assert_eq!(human_size(Some(2048)), "2.0 KB");
        assert_eq!(human_size(Some(5 * 1024 * 1024)), "5.0 MB");
    }

    #[test]
    fn test_format_entry() {
        let line = format_entry(&entry(), "http://localhost:3000/");
        assert_eq!(
            line,
            "report.pdf\t2.0 KB\tReports (#3)\trecord 17\thttp://localhost:3000/d/abc.def.ghi"
        );
    }
}
