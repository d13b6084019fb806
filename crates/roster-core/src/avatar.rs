//! Avatar storage — the boundary to the external object store.
//!
//! Only the durable reference string ever reaches the profile row; image
//! bytes live entirely behind this trait. Object-safe so servers can hold it
//! as `Arc<dyn AvatarStorage>`.

use async_trait::async_trait;
use uuid::Uuid;

use crate::Result;

/// File extension for an accepted avatar media type; `None` for anything
/// that is not an accepted image format.
pub fn extension_for(media_type: &str) -> Option<&'static str> {
  match media_type {
    "image/png" => Some("png"),
    "image/jpeg" => Some("jpg"),
    "image/gif" => Some("gif"),
    "image/webp" => Some("webp"),
    _ => None,
  }
}

#[async_trait]
pub trait AvatarStorage: Send + Sync {
  /// Persist an image for a principal and return a durable reference (URL)
  /// suitable for storing as the profile's `avatar_ref`.
  async fn upload(
    &self,
    principal_id: Uuid,
    media_type: &str,
    bytes: Vec<u8>,
  ) -> Result<String>;

  /// Remove a previously uploaded image. Removing a reference that no
  /// longer exists is not an error.
  async fn remove(&self, reference: &str) -> Result<()>;
}
