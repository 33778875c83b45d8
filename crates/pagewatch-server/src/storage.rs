//! Token-scoped file downloads.
//!
//! Turns a download token into a file stream. The storage key inside a
//! verified token is still checked before it touches the filesystem, and the
//! display name is scrubbed before it reaches a response header.

use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, HeaderMap, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use pagewatch_token::TokenService;
use tokio::fs::File;
use tokio_util::io::ReaderStream;

use crate::encoding::encode_component;
use crate::error::AppError;

const INVALID_TOKEN: &str = "Invalid or expired token";
const BAD_FILE_KEY: &str = "Bad file key";
const FILE_NOT_FOUND: &str = "File not found";

/// Path separators of either convention.
const SEPARATORS: &[char] = &['/', '\\'];

/// A download that passed every check and points at an existing file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedDownload {
    /// Absolute path under the download root.
    pub path: PathBuf,
    /// Filename offered to the client. Safe for a header value.
    pub file_name: String,
}

/// Serves files from a fixed download root to holders of valid tokens.
#[derive(Debug)]
pub struct StorageGateway {
    tokens: Arc<TokenService>,
    download_root: PathBuf,
}

impl StorageGateway {
    pub fn new(tokens: Arc<TokenService>, download_root: impl Into<PathBuf>) -> Self {
        Self {
            tokens,
            download_root: download_root.into(),
        }
    }

    /// Verifies `token` and maps it to a file under the download root.
    ///
    /// # Errors
    /// * `Unauthorized` - token missing, forged, expired or for another audience
    /// * `BadRequest` - storage key is not a single plain path segment
    /// * `NotFound` - no regular file at the resolved path
    pub async fn resolve(&self, token: &str) -> Result<ResolvedDownload, AppError> {
        let capability = self.tokens.try_verify(token).map_err(|reason| {
            tracing::debug!(%reason, "Download token rejected");
            AppError::Unauthorized(INVALID_TOKEN.to_string())
        })?;

        let key = sanitize_storage_key(&capability.storage_key).ok_or_else(|| {
            tracing::warn!(
                storage_key = %capability.storage_key.escape_debug(),
                "Rejected download token with unsafe storage key"
            );
            AppError::BadRequest(BAD_FILE_KEY.to_string())
        })?;

        let path = self.download_root.join(key);
        match tokio::fs::metadata(&path).await {
            Ok(metadata) if metadata.is_file() => {}
            Ok(_) => return Err(AppError::NotFound(FILE_NOT_FOUND.to_string())),
            Err(e) => return Err(map_io_error(e, &path)),
        }

        Ok(ResolvedDownload {
            path,
            file_name: safe_display_name(&capability.display_name, key),
        })
    }

    /// Resolves `token` and streams the file.
    pub async fn serve(&self, token: &str) -> Result<Response, AppError> {
        let download = self.resolve(token).await?;

        // The file may have disappeared since `resolve` looked at it.
        let file = File::open(&download.path)
            .await
            .map_err(|e| map_io_error(e, &download.path))?;
        let length = file
            .metadata()
            .await
            .map_err(|e| map_io_error(e, &download.path))?
            .len();

        tracing::info!(
            file_name = %download.file_name,
            bytes = length,
            "Serving download"
        );

        let mut headers = HeaderMap::new();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/octet-stream"),
        );
        headers.insert(header::CONTENT_LENGTH, HeaderValue::from(length));
        headers.insert(
            header::CONTENT_DISPOSITION,
            content_disposition(&download.file_name)?,
        );
        headers.insert(header::CACHE_CONTROL, HeaderValue::from_static("no-store"));

        let body = Body::from_stream(ReaderStream::new(file));
        Ok((StatusCode::OK, headers, body).into_response())
    }
}

/// Returns `key` if it is a single plain path segment, `None` otherwise.
///
/// Rejects empty keys, anything containing `..`, either path separator or a
/// NUL byte, and `.` itself. A key is only accepted if it is byte-identical to
/// its own final path component.
pub fn sanitize_storage_key(key: &str) -> Option<&str> {
    if key.is_empty() || key == "." {
        return None;
    }

    let last = key.rsplit(SEPARATORS).next().unwrap_or_default();
    if last != key {
        return None;
    }

    if key.contains("..") || key.contains(SEPARATORS) || key.contains('\0') {
        return None;
    }

    Some(key)
}

/// Derives a header-safe filename from the display name.
///
/// Keeps only the final path component and strips CR, LF and `"`. Falls
/// back to `fallback_key` (an already sanitized storage key) when nothing
/// usable is left.
pub fn safe_display_name(display_name: &str, fallback_key: &str) -> String {
    let source = match display_name.trim() {
        "" => fallback_key,
        trimmed => trimmed,
    };

    let last = source.rsplit(SEPARATORS).next().unwrap_or_default();
    let cleaned: String = last
        .chars()
        .filter(|c| !matches!(c, '\r' | '\n' | '"'))
        .collect();

    match cleaned.trim() {
        "" | "." | ".." => fallback_key.to_string(),
        name => name.to_string(),
    }
}

/// Builds an RFC 6266 `attachment` disposition with a UTF-8 encoded name.
pub fn content_disposition(file_name: &str) -> Result<HeaderValue, AppError> {
    let value = format!("attachment; filename*=UTF-8''{}", encode_component(file_name));
    HeaderValue::from_str(&value)
        .map_err(|e| AppError::Internal(format!("Invalid Content-Disposition value: {}", e)))
}

fn map_io_error(error: io::Error, path: &Path) -> AppError {
    if error.kind() == io::ErrorKind::NotFound {
        AppError::NotFound(FILE_NOT_FOUND.to_string())
    } else {
        AppError::Internal(format!("Failed to read {}: {}", path.display(), error))
    }
}
