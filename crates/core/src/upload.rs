//! Event image upload policy and the storage seam.

use async_trait::async_trait;

/// Largest image accepted for upload (5 MiB).
pub const MAX_IMAGE_BYTES: usize = 5 * 1024 * 1024;

/// Extension used when the original filename has none.
pub const DEFAULT_EXTENSION: &str = "jpg";

/// Key segment used when the title produced an empty slug.
const FALLBACK_KEY_STEM: &str = "event";

#[derive(Debug, thiserror::Error)]
pub enum UploadError {
    #[error("Image size should be less than 5MB (got {size} bytes)")]
    TooLarge { size: usize },

    #[error("Image file is empty")]
    Empty,

    #[error("Image storage failed: {0}")]
    Storage(String),
}

/// An image file as received from the submitter.
#[derive(Debug, Clone)]
pub struct ImageUpload {
    pub filename: String,
    pub content_type: Option<String>,
    pub bytes: Vec<u8>,
}

impl ImageUpload {
    /// Size and emptiness checks. Runs before any storage call.
    pub fn check(&self) -> Result<(), UploadError> {
        if self.bytes.is_empty() {
            return Err(UploadError::Empty);
        }
        if self.bytes.len() > MAX_IMAGE_BYTES {
            return Err(UploadError::TooLarge {
                size: self.bytes.len(),
            });
        }
        Ok(())
    }

    pub fn extension(&self) -> String {
        file_extension(&self.filename)
    }

    /// The declared content type, or one guessed from the extension.
    pub fn content_type(&self) -> String {
        match self.content_type.as_deref().map(str::trim) {
            Some(ct) if !ct.is_empty() => ct.to_string(),
            _ => content_type_for_extension(&self.extension()).to_string(),
        }
    }
}

/// Object storage for event images.
#[async_trait]
pub trait ImageStore: Send + Sync {
    /// Store `bytes` under `key` and return the object's public URL.
    async fn upload(
        &self,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<String, UploadError>;
}

/// Lowercased extension of `filename`, or [`DEFAULT_EXTENSION`].
pub fn file_extension(filename: &str) -> String {
    filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.trim().to_ascii_lowercase())
        .filter(|ext| !ext.is_empty() && ext.chars().all(|c| c.is_ascii_alphanumeric()))
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

/// Object key: `{unix_millis}-{slug}.{ext}`.
pub fn storage_key(slug: &str, unix_millis: i64, filename: &str) -> String {
    let stem = if slug.is_empty() {
        FALLBACK_KEY_STEM
    } else {
        slug
    };
    format!("{unix_millis}-{stem}.{}", file_extension(filename))
}

fn content_type_for_extension(ext: &str) -> &'static str {
    match ext {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "avif" => "image/avif",
        "svg" => "image/svg+xml",
        _ => "application/octet-stream",
    }
}

/// Check `image`, derive its key from `slug` and store it.
pub async fn upload_image<S>(
    store: &S,
    image: ImageUpload,
    slug: &str,
    unix_millis: i64,
) -> Result<String, UploadError>
where
    S: ImageStore + ?Sized,
{
    image.check()?;
    let key = storage_key(slug, unix_millis, &image.filename);
    let content_type = image.content_type();
    let size = image.bytes.len();
    let url = store.upload(&key, image.bytes, &content_type).await?;
    tracing::info!(key = %key, size, "Uploaded event image");
    Ok(url)
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use assert_matches::assert_matches;

    use super::*;

    #[derive(Default)]
    struct MemoryStore {
        keys: Mutex<Vec<String>>,
    }

    #[async_trait]
    impl ImageStore for MemoryStore {
        async fn upload(&self, key: &str, _: Vec<u8>, _: &str) -> Result<String, UploadError> {
            self.keys.lock().unwrap().push(key.to_string());
            Ok(format!("https://cdn.test/event-images/{key}"))
        }
    }

    fn image(name: &str, len: usize) -> ImageUpload {
        ImageUpload {
            filename: name.to_string(),
            content_type: None,
            bytes: vec![0xFF; len],
        }
    }

    #[test]
    fn key_uses_millis_slug_and_lowercased_extension() {
        assert_eq!(
            storage_key("jazz-night", 1_718_000_000_000, "Poster.PNG"),
            "1718000000000-jazz-night.png"
        );
    }

    #[test]
    fn missing_extension_defaults_to_jpg() {
        assert_eq!(file_extension("poster"), "jpg");
        assert_eq!(file_extension("poster."), "jpg");
        assert_eq!(storage_key("", 5, "x"), "5-event.jpg");
    }

    #[test]
    fn size_limit_is_inclusive() {
        assert!(image("a.jpg", MAX_IMAGE_BYTES).check().is_ok());
        assert_matches!(
            image("a.jpg", MAX_IMAGE_BYTES + 1).check(),
            Err(UploadError::TooLarge { .. })
        );
        assert_matches!(image("a.jpg", 0).check(), Err(UploadError::Empty));
    }

    #[test]
    fn content_type_falls_back_to_extension() {
        assert_eq!(image("a.webp", 1).content_type(), "image/webp");
        let mut declared = image("a.bin", 1);
        declared.content_type = Some("image/heic".into());
        assert_eq!(declared.content_type(), "image/heic");
    }

    #[tokio::test]
    async fn oversized_image_never_reaches_storage() {
        let store = MemoryStore::default();
        let result = upload_image(&store, image("a.jpg", MAX_IMAGE_BYTES + 1), "s", 1).await;
        assert_matches!(result, Err(UploadError::TooLarge { .. }));
        assert!(store.keys.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn upload_returns_public_url() {
        let store = MemoryStore::default();
        let url = upload_image(&store, image("a.JPG", 10), "market", 42)
            .await
            .unwrap();
        assert_eq!(url, "https://cdn.test/event-images/42-market.jpg");
    }
}
