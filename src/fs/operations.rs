use std::{io::ErrorKind, path::Path};

use fs4::tokio::AsyncFileExt;
use tokio::{
    fs::File,
    io::{self, AsyncReadExt, AsyncSeekExt, AsyncWriteExt},
};

/// Reads a whole file under a shared lock. A missing file is reported as `None`.
pub async fn read_locked(path: &Path) -> Result<Option<String>, io::Error> {
    let mut file = match File::open(path).await {
        Ok(file) => file,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(e),
    };

    file.lock_shared()?;
    let mut contents = String::new();
    let result = file.read_to_string(&mut contents).await;
    file.unlock_async().await?;
    result?;

    Ok(Some(contents))
}

/// Replaces the contents of a file under an exclusive lock, creating it when needed.
pub async fn overwrite_locked(path: &Path, contents: &[u8]) -> Result<(), io::Error> {
    let mut file = File::options()
        .write(true)
        .create(true)
        .read(true)
        .truncate(false)
        .open(path)
        .await?;

    // Semi-safe acquire-release for a file
    file.lock_exclusive()?;
    let result = overwrite_with_file(&mut file, contents).await;
    file.unlock_async().await?;
    result
}

async fn overwrite_with_file(file: &mut File, contents: &[u8]) -> Result<(), io::Error> {
    // Only truncate while the lock is held.
    file.set_len(0).await?;
    file.rewind().await?;
    file.write_all(contents).await?;
    file.flush().await?;
    file.sync_data().await?;
    Ok(())
}

/// Removes a file. Removing a file that doesn't exist is not an error.
pub async fn remove_if_exists(path: &Path) -> Result<(), io::Error> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use anyhow::Result;
    use tempfile::tempdir;

    use crate::fs::operations::{overwrite_locked, read_locked, remove_if_exists};

    #[tokio::test]
    async fn test_read_missing_file() -> Result<()> {
        let dir = tempdir()?;
        assert_eq!(read_locked(&dir.path().join("missing")).await?, None);
        Ok(())
    }

    #[tokio::test]
    async fn test_overwrite_shorter_contents() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("value");

        overwrite_locked(&path, b"a much longer first value").await?;
        overwrite_locked(&path, b"short").await?;

        assert_eq!(read_locked(&path).await?, Some("short".to_string()));
        Ok(())
    }

    #[tokio::test]
    async fn test_remove_twice() -> Result<()> {
        let dir = tempdir()?;
        let path = dir.path().join("value");
        overwrite_locked(&path, b"value").await?;

        remove_if_exists(&path).await?;
        remove_if_exists(&path).await?;

        assert_eq!(read_locked(&path).await?, None);
        Ok(())
    }
}
