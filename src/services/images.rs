use std::path::{Path, PathBuf};

use bytes::Bytes;
use uuid::Uuid;

use crate::error::ServiceError;

/// Which entity an uploaded image belongs to; also its sub-directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageKind {
    Category,
    Section,
    MenuItem,
}

impl ImageKind {
    /// Accepts the entity names used by the admin forms.
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "category" | "categories" => Some(ImageKind::Category),
            "section" | "sections" => Some(ImageKind::Section),
            "menu-item" | "menu-items" | "menuItem" => Some(ImageKind::MenuItem),
            _ => None,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            ImageKind::Category => "category",
            ImageKind::Section => "section",
            ImageKind::MenuItem => "menu_item",
        }
    }

    fn dir(&self) -> &'static str {
        match self {
            ImageKind::Category => "categories",
            ImageKind::Section => "sections",
            ImageKind::MenuItem => "menu-items",
        }
    }
}

/// An image file received in a multipart form, not yet written to disk.
#[derive(Debug, Clone)]
pub struct UploadedImage {
    pub filename: String,
    pub content_type: String,
    pub data: Bytes,
}

/// Local-disk image storage under `media_dir`, served back at `/media/...`.
#[derive(Debug, Clone)]
pub struct ImageStore {
    media_dir: PathBuf,
    public_base_url: String,
    max_bytes: usize,
}

impl ImageStore {
    pub fn new(media_dir: impl Into<PathBuf>, public_base_url: &str, max_bytes: usize) -> Self {
        Self {
            media_dir: media_dir.into(),
            public_base_url: public_base_url.trim_end_matches('/').to_string(),
            max_bytes,
        }
    }

    /// Validate and store the image; returns its public URL.
    pub async fn save(&self, kind: ImageKind, upload: &UploadedImage) -> Result<String, ServiceError> {
        let ext = detect_image_ext(&upload.content_type, &upload.filename).ok_or_else(|| {
            ServiceError::validation("Unsupported image format. Use PNG, JPG, WebP or GIF.")
        })?;

        if upload.data.is_empty() {
            return Err(ServiceError::validation("Image file is empty"));
        }
        if upload.data.len() > self.max_bytes {
            return Err(ServiceError::validation(format!(
                "Image too large (max {} MB)",
                self.max_bytes / (1024 * 1024)
            )));
        }
        image::load_from_memory(&upload.data)
            .map_err(|_| ServiceError::validation("Image file is corrupt or unreadable"))?;

        let dir = self.media_dir.join(kind.dir());
        tokio::fs::create_dir_all(&dir).await?;

        let rel = format!("{}/{}.{}", kind.dir(), Uuid::new_v4(), ext);
        tokio::fs::write(self.media_dir.join(&rel), &upload.data).await?;
        tracing::info!(path = %rel, bytes = upload.data.len(), "stored image");

        Ok(format!("{}/media/{}", self.public_base_url, rel))
    }

    /// Remove a previously stored image. URLs that are not ours are ignored.
    pub async fn delete_url(&self, url: &str) {
        let Some(rel) = url.strip_prefix(&format!("{}/media/", self.public_base_url)) else {
            return;
        };
        if let Some(path) = self.resolve(rel) {
            if let Err(e) = tokio::fs::remove_file(&path).await {
                tracing::warn!("failed to remove image {}: {}", path.display(), e);
            }
        }
    }

    /// Map a request path to a file inside `media_dir`, refusing anything that
    /// escapes it or does not exist.
    pub fn resolve(&self, rel: &str) -> Option<PathBuf> {
        let canonical_media = std::fs::canonicalize(&self.media_dir).ok()?;
        let canonical_file = std::fs::canonicalize(self.media_dir.join(rel)).ok()?;
        canonical_file
            .starts_with(&canonical_media)
            .then_some(canonical_file)
    }

    pub fn media_dir(&self) -> &Path {
        &self.media_dir
    }
}

pub fn detect_image_ext(content_type: &str, filename: &str) -> Option<&'static str> {
    match content_type {
        "image/png" => return Some("png"),
        "image/jpeg" | "image/jpg" => return Some("jpg"),
        "image/webp" => return Some("webp"),
        "image/gif" => return Some("gif"),
        _ => {}
    }
    let ext = filename.rsplit_once('.')?.1.to_lowercase();
    match ext.as_str() {
        "png" => Some("png"),
        "jpg" | "jpeg" => Some("jpg"),
        "webp" => Some("webp"),
        "gif" => Some("gif"),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_bytes() -> Bytes {
        let img = image::RgbImage::from_pixel(2, 2, image::Rgb([200, 10, 10]));
        let mut buf = std::io::Cursor::new(Vec::new());
        img.write_to(&mut buf, image::ImageFormat::Png).unwrap();
        Bytes::from(buf.into_inner())
    }

    #[test]
    fn ext_from_content_type_or_filename() {
        assert_eq!(detect_image_ext("image/jpeg", "x"), Some("jpg"));
        assert_eq!(detect_image_ext("application/octet-stream", "Photo.JPEG"), Some("jpg"));
        assert_eq!(detect_image_ext("", "menu.webp"), Some("webp"));
        assert_eq!(detect_image_ext("text/plain", "notes.txt"), None);
        assert_eq!(detect_image_ext("", "noext"), None);
    }

    #[test]
    fn kind_from_form_name() {
        assert_eq!(ImageKind::from_name("category"), Some(ImageKind::Category));
        assert_eq!(ImageKind::from_name("menu-items"), Some(ImageKind::MenuItem));
        assert_eq!(ImageKind::from_name("logo"), None);
    }

    #[tokio::test]
    async fn save_then_resolve_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path(), "http://localhost:8080/", 1024 * 1024);
        let upload = UploadedImage {
            filename: "wings.png".into(),
            content_type: "image/png".into(),
            data: png_bytes(),
        };

        let url = store.save(ImageKind::MenuItem, &upload).await.unwrap();
        assert!(url.starts_with("http://localhost:8080/media/menu-items/"));
        assert!(url.ends_with(".png"));

        let rel = url.strip_prefix("http://localhost:8080/media/").unwrap();
        let path = store.resolve(rel).unwrap();
        assert!(path.exists());

        store.delete_url(&url).await;
        assert!(!path.exists());
    }

    #[tokio::test]
    async fn save_rejects_bad_uploads() {
        let dir = tempfile::tempdir().unwrap();
        let store = ImageStore::new(dir.path(), "http://localhost", 16);

        let not_image = UploadedImage {
            filename: "menu.pdf".into(),
            content_type: "application/pdf".into(),
            data: Bytes::from_static(b"%PDF"),
        };
        assert!(matches!(
            store.save(ImageKind::Category, &not_image).await,
            Err(ServiceError::Validation(_))
        ));

        let too_big = UploadedImage {
            filename: "big.png".into(),
            content_type: "image/png".into(),
            data: png_bytes(),
        };
        assert!(matches!(
            store.save(ImageKind::Category, &too_big).await,
            Err(ServiceError::Validation(_))
        ));

        let big_store = ImageStore::new(dir.path(), "http://localhost", 1024);
        let corrupt = UploadedImage {
            filename: "x.png".into(),
            content_type: "image/png".into(),
            data: Bytes::from_static(b"not really a png"),
        };
        assert!(matches!(
            big_store.save(ImageKind::Category, &corrupt).await,
            Err(ServiceError::Validation(_))
        ));
    }

    #[test]
    fn resolve_refuses_escape() {
        let dir = tempfile::tempdir().unwrap();
        let media = dir.path().join("media");
        std::fs::create_dir_all(&media).unwrap();
        std::fs::write(dir.path().join("secret.txt"), b"x").unwrap();
        std::fs::write(media.join("ok.png"), b"x").unwrap();

        let store = ImageStore::new(&media, "http://localhost", 1024);
        assert!(store.resolve("ok.png").is_some());
        assert!(store.resolve("../secret.txt").is_none());
        assert!(store.resolve("missing.png").is_none());
    }
}
