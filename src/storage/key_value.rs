use std::{future::Future, ops::Deref, path::PathBuf};

use anyhow::{bail, Context, Result};
use tracing::debug;

use crate::fs::operations::{overwrite_locked, read_locked, remove_if_exists};

/// Same budget web local storage usually gets. Planner blobs are a few kilobytes, so hitting it
/// means something went wrong.
pub const DEFAULT_QUOTA_BYTES: usize = 5 * 1024 * 1024;

/// Interface for abstracting a local string key-value store.
pub trait KeyValueStore {
    /// Returns the value stored under `key`, or `None` if nothing was ever stored.
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>>>;

    /// Unconditionally overwrites the value under `key`.
    fn set(&self, key: &str, value: &str) -> impl Future<Output = Result<()>>;

    /// Erases `key`. Erasing a missing key succeeds.
    fn remove(&self, key: &str) -> impl Future<Output = Result<()>>;
}

impl<T: Deref> KeyValueStore for T
where
    T::Target: KeyValueStore,
{
    fn get(&self, key: &str) -> impl Future<Output = Result<Option<String>>> {
        self.deref().get(key)
    }

    fn set(&self, key: &str, value: &str) -> impl Future<Output = Result<()>> {
        self.deref().set(key, value)
    }

    fn remove(&self, key: &str) -> impl Future<Output = Result<()>> {
        self.deref().remove(key)
    }
}

/// The main realization of [KeyValueStore]. Every key is a separate json file in one directory.
pub struct FileKeyValueStore {
    dir: PathBuf,
    quota_bytes: usize,
}

impl FileKeyValueStore {
    pub fn new(dir: PathBuf) -> Result<Self, std::io::Error> {
        std::fs::create_dir_all(&dir)?;

        Ok(Self {
            dir,
            quota_bytes: DEFAULT_QUOTA_BYTES,
        })
    }

    pub fn with_quota(self, quota_bytes: usize) -> Self {
        Self {
            quota_bytes,
            ..self
        }
    }

    fn path_for(&self, key: &str) -> Result<PathBuf> {
        let valid = !key.is_empty()
            && key
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            bail!("Illegal storage key {key:?}");
        }
        Ok(self.dir.join(format!("{key}.json")))
    }
}

impl KeyValueStore for FileKeyValueStore {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let path = self.path_for(key)?;
        debug!("Reading {path:?}");
        read_locked(&path)
            .await
            .with_context(|| format!("Failed to read {path:?}"))
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        let path = self.path_for(key)?;
        if value.len() > self.quota_bytes {
            bail!(
                "Storage quota exceeded: {key} needs {} bytes, quota is {}",
                value.len(),
                self.quota_bytes
            );
        }
        debug!("Writing {} bytes to {path:?}", value.len());
        overwrite_locked(&path, value.as_bytes())
            .await
            .with_context(|| format!("Failed to write {path:?}"))
    }

    async fn remove(&self, key: &str) -> Result<()> {
        let path = self.path_for(key)?;
        debug!("Removing {path:?}");
        remove_if_exists(&path)
            .await
            .with_context(|| format!("Failed to remove {path:?}"))
    }
}


#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tempfile::tempdir;

    use super::{FileKeyValueStore, KeyValueStore};

    #[tokio::test]
    async fn test_file_store_basic() -> Result<()> {
        let dir = tempdir()?;
        let store = FileKeyValueStore::new(dir.path().join("storage"))?;

        assert_eq!(store.get("planner").await?, None);

        store.set("planner", "{\"a\":1}").await?;
        store.set("planner", "{}").await?;
        assert_eq!(store.get("planner").await?, Some("{}".to_string()));

        store.remove("planner").await?;
        assert_eq!(store.get("planner").await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_file_store_through_reference() -> Result<()> {
        let dir = tempdir()?;
        let store = std::sync::Arc::new(FileKeyValueStore::new(dir.path().to_owned())?);

        store.set("planner", "value").await?;

        assert_eq!(store.get("planner").await?, Some("value".to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn test_file_store_quota() -> Result<()> {
        let dir = tempdir()?;
        let store = FileKeyValueStore::new(dir.path().to_owned())?.with_quota(4);

        store.set("planner", "1234").await?;
        assert!(store.set("planner", "12345").await.is_err());
        assert_eq!(store.get("planner").await?, Some("1234".to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn test_file_store_rejects_paths() -> Result<()> {
        let dir = tempdir()?;
        let store = FileKeyValueStore::new(dir.path().to_owned())?;

        assert!(store.set("../outside", "value").await.is_err());
        assert!(store.get("").await.is_err());
        Ok(())
    }
}
