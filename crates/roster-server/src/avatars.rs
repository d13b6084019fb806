//! Disk-backed avatar storage.
//!
//! Images land under `<root>/<principal_id>/<content-hash>.<ext>` and are
//! referenced by a public URL minted from the configured base. The file
//! name is the content digest, so re-uploading identical bytes is
//! idempotent and references never point at mutated content.

use std::{
  io,
  path::{Path, PathBuf},
};

use async_trait::async_trait;
use roster_core::{Error, Result, avatar::{AvatarStorage, extension_for}};
use sha2::{Digest as _, Sha256};
use tokio::fs;
use uuid::Uuid;

pub struct DiskAvatars {
  root:        PathBuf,
  public_base: String,
}

impl DiskAvatars {
  pub fn new(root: impl Into<PathBuf>, public_base: impl Into<String>) -> Self {
    let public_base = public_base.into().trim_end_matches('/').to_owned();
    DiskAvatars { root: root.into(), public_base }
  }

  /// Resolve one of our own references back to a path under `root`.
  /// References minted elsewhere (or anything that does not look like
  /// `<base>/avatars/<owner>/<file>`) resolve to `None` and are ignored.
  fn relative_path(&self, reference: &str) -> Option<PathBuf> {
    let rest = reference
      .strip_prefix(&self.public_base)?
      .strip_prefix("/avatars/")?;

    let mut parts = rest.split('/');
    let owner = parts.next()?;
    let file = parts.next()?;
    if parts.next().is_some()
      || owner.is_empty()
      || file.is_empty()
      || owner.contains("..")
      || file.contains("..")
    {
      return None;
    }
    Some(Path::new(owner).join(file))
  }
}

#[async_trait]
impl AvatarStorage for DiskAvatars {
  async fn upload(
    &self,
    principal_id: Uuid,
    media_type: &str,
    bytes: Vec<u8>,
  ) -> Result<String> {
    let ext = extension_for(media_type).ok_or_else(|| {
      Error::storage(io::Error::new(
        io::ErrorKind::InvalidInput,
        format!("unsupported media type: {media_type:?}"),
      ))
    })?;

    let digest = hex::encode(Sha256::digest(&bytes));
    let file_name = format!("{}.{ext}", &digest[..16]);

    let dir = self.root.join(principal_id.to_string());
    fs::create_dir_all(&dir).await.map_err(Error::storage)?;
    fs::write(dir.join(&file_name), &bytes)
      .await
      .map_err(Error::storage)?;

    Ok(format!(
      "{}/avatars/{}/{}",
      self.public_base, principal_id, file_name
    ))
  }

  async fn remove(&self, reference: &str) -> Result<()> {
    let Some(relative) = self.relative_path(reference) else {
      return Ok(());
    };
    match fs::remove_file(self.root.join(relative)).await {
      Ok(()) => Ok(()),
      Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
      Err(e) => Err(Error::storage(e)),
    }
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn store(tmp: &tempfile::TempDir) -> DiskAvatars {
    DiskAvatars::new(tmp.path(), "http://localhost:8080/")
  }

  #[tokio::test]
  async fn upload_writes_file_and_mints_reference() {
    let tmp = tempfile::tempdir().unwrap();
    let avatars = store(&tmp);
    let id = Uuid::new_v4();

    let reference =
      avatars.upload(id, "image/png", b"png bytes".to_vec()).await.unwrap();
    assert!(
      reference.starts_with(&format!("http://localhost:8080/avatars/{id}/")),
      "reference: {reference}"
    );
    assert!(reference.ends_with(".png"));

    let relative = avatars.relative_path(&reference).unwrap();
    assert!(tmp.path().join(relative).is_file());
  }

  #[tokio::test]
  async fn identical_bytes_reuse_the_same_reference() {
    let tmp = tempfile::tempdir().unwrap();
    let avatars = store(&tmp);
    let id = Uuid::new_v4();

    let first =
      avatars.upload(id, "image/png", b"same".to_vec()).await.unwrap();
    let second =
      avatars.upload(id, "image/png", b"same".to_vec()).await.unwrap();
    assert_eq!(first, second);
  }

  #[tokio::test]
  async fn remove_deletes_and_is_idempotent() {
    let tmp = tempfile::tempdir().unwrap();
    let avatars = store(&tmp);
    let id = Uuid::new_v4();

    let reference =
      avatars.upload(id, "image/jpeg", b"jpeg".to_vec()).await.unwrap();
    let path = tmp.path().join(avatars.relative_path(&reference).unwrap());

    avatars.remove(&reference).await.unwrap();
    assert!(!path.exists());
    avatars.remove(&reference).await.unwrap();
  }

  #[tokio::test]
  async fn foreign_and_malformed_references_are_ignored() {
    let tmp = tempfile::tempdir().unwrap();
    let avatars = store(&tmp);

    avatars.remove("https://elsewhere.example/avatars/x/y.png").await.unwrap();
    avatars
      .remove("http://localhost:8080/avatars/../../etc/passwd")
      .await
      .unwrap();
    assert!(
      avatars
        .relative_path("http://localhost:8080/avatars/../../etc/passwd")
        .is_none()
    );
  }

  #[tokio::test]
  async fn unsupported_media_type_is_refused() {
    let tmp = tempfile::tempdir().unwrap();
    let avatars = store(&tmp);
    let err = avatars
      .upload(Uuid::new_v4(), "image/svg+xml", b"<svg/>".to_vec())
      .await
      .unwrap_err();
    assert!(matches!(err, Error::Storage(_)));
  }
}
