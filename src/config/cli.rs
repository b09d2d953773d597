use crate::core::Storage;
use crate::utils::error::{EtlError, Result};
use std::fs;
use std::io::Write;
use std::path::Path;
use tempfile::NamedTempFile;

/// Storage on the local filesystem. Paths are used as given.
#[derive(Debug, Clone, Default)]
pub struct LocalStorage;

impl LocalStorage {
    pub fn new() -> Self {
        Self
    }
}

fn write_atomically(path: &str, data: &[u8]) -> std::io::Result<()> {
    let full_path = Path::new(path);
    let parent = match full_path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    // The temp file must live on the same filesystem for the rename.
    let mut tmp = NamedTempFile::new_in(parent)?;
    tmp.write_all(data)?;
    tmp.as_file().sync_all()?;

    if let Ok(metadata) = fs::metadata(full_path) {
        tmp.as_file().set_permissions(metadata.permissions())?;
    }

    tmp.persist(full_path).map_err(|e| e.error)?;
    Ok(())
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        fs::read(path).map_err(|source| EtlError::SourceUnavailable {
            path: path.to_string(),
            source,
        })
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        write_atomically(path, data).map_err(|source| EtlError::WriteFailure {
            path: path.to_string(),
            source,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_read_missing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("missing.csv");

        let err = LocalStorage::new()
            .read_file(path.to_str().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, EtlError::SourceUnavailable { .. }));
    }

    #[tokio::test]
    async fn test_write_creates_parent_and_replaces() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested/out.json");
        let path = path.to_str().unwrap();
        let storage = LocalStorage::new();

        storage.write_file(path, b"first").await.unwrap();
        storage.write_file(path, b"second").await.unwrap();

        assert_eq!(storage.read_file(path).await.unwrap(), b"second");
        let leftovers = fs::read_dir(dir.path().join("nested")).unwrap().count();
        assert_eq!(leftovers, 1);
    }

    #[tokio::test]
    async fn test_write_failure_when_parent_is_a_file() {
        let dir = TempDir::new().unwrap();
        let blocker = dir.path().join("blocker");
        fs::write(&blocker, b"x").unwrap();
        let path = blocker.join("out.json");

        let err = LocalStorage::new()
            .write_file(path.to_str().unwrap(), b"{}")
            .await
            .unwrap_err();
        assert!(matches!(err, EtlError::WriteFailure { .. }));
        assert_eq!(fs::read(&blocker).unwrap(), b"x");
    }
}
