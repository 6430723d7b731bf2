//! Avatar storage.
//!
//! Uploaded images are normalized to a 250x250 PNG named after the owning
//! account and served back as static files. Accounts that never uploaded
//! anything point at a Gravatar-style URL derived from their email.

use image::imageops::FilterType;
use image::ImageFormat;
use sha2::{Digest, Sha256};
use std::io::Cursor;
use std::path::PathBuf;
use thiserror::Error;
use uuid::Uuid;

/// Normalized avatar edge length in pixels
pub const AVATAR_DIM: u32 = 250;

#[derive(Debug, Error)]
pub enum AvatarError {
    #[error("unreadable image: {0}")]
    Decode(String),

    #[error("failed to encode image: {0}")]
    Encode(String),

    #[error("avatar write failed: {0}")]
    Io(#[from] std::io::Error),

    #[error("image task aborted")]
    TaskAborted,
}

pub struct AvatarStore {
    dir: PathBuf,
}

impl AvatarStore {
    /// Use `dir` for avatar files, creating it if needed
    pub fn new(dir: PathBuf) -> Result<Self, AvatarError> {
        std::fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &PathBuf {
        &self.dir
    }

    /// Decode an upload, normalize it to a square PNG and persist it as the
    /// account's avatar. Returns the public reference for the stored file.
    /// Re-uploading overwrites the previous file in place.
    pub async fn store(&self, user_id: Uuid, bytes: Vec<u8>) -> Result<String, AvatarError> {
        // Decode and resample off the async runtime
        let png = tokio::task::spawn_blocking(move || normalize_to_png(&bytes))
            .await
            .map_err(|_| AvatarError::TaskAborted)??;

        let file_name = format!("{}.png", user_id);
        tokio::fs::write(self.dir.join(&file_name), png).await?;

        tracing::info!(user_id = %user_id, "Stored avatar");
        Ok(format!("avatars/{file_name}"))
    }
}

fn normalize_to_png(bytes: &[u8]) -> Result<Vec<u8>, AvatarError> {
    let decoded =
        image::load_from_memory(bytes).map_err(|e| AvatarError::Decode(e.to_string()))?;
    let square = decoded.resize_exact(AVATAR_DIM, AVATAR_DIM, FilterType::Triangle);

    let mut out = Cursor::new(Vec::new());
    square
        .write_to(&mut out, ImageFormat::Png)
        .map_err(|e| AvatarError::Encode(e.to_string()))?;

    Ok(out.into_inner())
}

/// Gravatar-style default avatar for accounts that never uploaded one.
/// The address is hashed trimmed and lowercased, matching how emails are
/// normalized at registration.
pub fn default_avatar_url(email: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(email.trim().to_lowercase().as_bytes());
    let hash = hasher.finalize();

    format!("https://www.gravatar.com/avatar/{:x}?d=identicon", hash)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn png_fixture(width: u32, height: u32) -> Vec<u8> {
        let img = image::DynamicImage::ImageRgb8(image::RgbImage::from_pixel(
            width,
            height,
            image::Rgb([120, 40, 200]),
        ));
        let mut out = Cursor::new(Vec::new());
        img.write_to(&mut out, ImageFormat::Png).unwrap();
        out.into_inner()
    }

    #[tokio::test]
    async fn uploads_are_normalized_to_square_png() {
        let dir = std::env::temp_dir().join(format!("avatars-{}", Uuid::new_v4().simple()));
        let store = AvatarStore::new(dir.clone()).unwrap();
        let user_id = Uuid::new_v4();

        let reference = store.store(user_id, png_fixture(640, 180)).await.unwrap();
        assert_eq!(reference, format!("avatars/{}.png", user_id));

        let written = std::fs::read(dir.join(format!("{}.png", user_id))).unwrap();
        let decoded = image::load_from_memory(&written).unwrap();
        assert_eq!(decoded.width(), AVATAR_DIM);
        assert_eq!(decoded.height(), AVATAR_DIM);

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn garbage_uploads_are_rejected() {
        let dir = std::env::temp_dir().join(format!("avatars-{}", Uuid::new_v4().simple()));
        let store = AvatarStore::new(dir.clone()).unwrap();

        let result = store.store(Uuid::new_v4(), b"not an image".to_vec()).await;
        assert!(matches!(result, Err(AvatarError::Decode(_))));

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[test]
    fn default_avatar_is_stable_across_email_formatting() {
        let a = default_avatar_url("Someone@Example.COM ");
        let b = default_avatar_url("someone@example.com");
        assert_eq!(a, b);
        assert!(a.starts_with("https://www.gravatar.com/avatar/"));
    }
}
