use std::path::{Path, PathBuf};

use anyhow::Context;
use async_trait::async_trait;

use crate::error::{AppError, AppResult};

pub const ALLOWED_IMAGE_TYPES: [&str; 4] =
    ["image/jpeg", "image/png", "image/gif", "image/webp"];

pub const MAX_IMAGE_BYTES: usize = 10 * 1024 * 1024;

/// Boundary checks the service applies before invoking any storage backend.
pub fn validate_upload(content_type: &str, size: usize) -> AppResult<()> {
    if !ALLOWED_IMAGE_TYPES.contains(&content_type) {
        return Err(AppError::validation(format!(
            "Invalid file type: {content_type}. Allowed types: JPEG, PNG, GIF, WebP"
        )));
    }
    if size > MAX_IMAGE_BYTES {
        return Err(AppError::validation("File too large. Maximum size is 10 MiB"));
    }
    Ok(())
}

#[async_trait]
pub trait ImageStorage: Send + Sync {
    /// Persists the bytes and returns the stored path, unique per call.
    async fn save(&self, data: &[u8], original_filename: &str, content_type: &str)
    -> AppResult<String>;

    /// Removes a previously stored asset. Returns false when nothing was
    /// deleted; callers treat deletion as best-effort.
    async fn delete(&self, path: &str) -> bool;

    /// Public URL under which the stored path is served.
    fn url(&self, path: &str) -> String;
}

pub struct LocalImageStorage {
    base_path: PathBuf,
    base_url: String,
}

impl LocalImageStorage {
    pub async fn new(base_path: PathBuf, base_url: String) -> AppResult<Self> {
        tokio::fs::create_dir_all(&base_path)
            .await
            .with_context(|| format!("creating upload directory {}", base_path.display()))?;
        Ok(Self { base_path, base_url: base_url.trim_end_matches('/').to_string() })
    }
}

#[async_trait]
impl ImageStorage for LocalImageStorage {
    async fn save(
        &self,
        data: &[u8],
        original_filename: &str,
        _content_type: &str,
    ) -> AppResult<String> {
        let ext = Path::new(original_filename)
            .extension()
            .map(|e| format!(".{}", e.to_string_lossy()))
            .unwrap_or_default();
        let stored = format!("{}{ext}", uuid::Uuid::new_v4());

        tokio::fs::write(self.base_path.join(&stored), data)
            .await
            .with_context(|| format!("writing uploaded image {stored}"))?;

        Ok(stored)
    }

    async fn delete(&self, path: &str) -> bool {
        tokio::fs::remove_file(self.base_path.join(path)).await.is_ok()
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_disallowed_content_types() {
        assert!(validate_upload("text/plain", 10).is_err());
        assert!(validate_upload("application/pdf", 10).is_err());
        for allowed in ALLOWED_IMAGE_TYPES {
            assert!(validate_upload(allowed, 10).is_ok());
        }
    }

    #[test]
    fn rejects_oversized_payloads() {
        assert!(validate_upload("image/jpeg", MAX_IMAGE_BYTES).is_ok());
        assert!(validate_upload("image/jpeg", MAX_IMAGE_BYTES + 1).is_err());
    }
}
