use async_trait::async_trait;
use std::path::PathBuf;
use tokio::fs;

use crate::error::AppError;

/// Blob store for raw document bytes. Keys are opaque; callers acquire and
/// release handles within a single request.
#[async_trait]
pub trait Storage: Send + Sync {
    async fn upload(&self, key: &str, data: Vec<u8>) -> Result<(), AppError>;
    async fn download(&self, key: &str) -> Result<Vec<u8>, AppError>;
    async fn delete(&self, key: &str) -> Result<(), AppError>;
    /// Total bytes currently stored, for quota enforcement.
    async fn usage(&self) -> Result<u64, AppError>;
}

pub struct LocalStorage {
    base_path: PathBuf,
}

impl LocalStorage {
    pub async fn new(base_path: impl Into<PathBuf>) -> Result<Self, AppError> {
        let base_path = base_path.into();
        if !base_path.exists() {
            fs::create_dir_all(&base_path).await?;
        }
        Ok(Self { base_path })
    }
}

#[async_trait]
impl Storage for LocalStorage {
    async fn upload(&self, key: &str, data: Vec<u8>) -> Result<(), AppError> {
        let path = self.base_path.join(key);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).await?;
        }
        fs::write(path, data).await?;
        Ok(())
    }

    async fn download(&self, key: &str) -> Result<Vec<u8>, AppError> {
        let path = self.base_path.join(key);
        let data = fs::read(path).await?;
        Ok(data)
    }

    async fn delete(&self, key: &str) -> Result<(), AppError> {
        let path = self.base_path.join(key);
        if path.exists() {
            fs::remove_file(path).await?;
        }
        Ok(())
    }

    async fn usage(&self) -> Result<u64, AppError> {
        let mut total = 0u64;
        let mut entries = fs::read_dir(&self.base_path).await?;
        while let Some(entry) = entries.next_entry().await? {
            let metadata = entry.metadata().await?;
            if metadata.is_file() {
                total += metadata.len();
            }
        }
        Ok(total)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn upload_download_delete_round_trip() {
        let dir = std::env::temp_dir().join(format!("storage-test-{}", uuid::Uuid::new_v4()));
        let storage = LocalStorage::new(&dir).await.unwrap();

        storage.upload("blob-1", b"hello".to_vec()).await.unwrap();
        assert_eq!(storage.download("blob-1").await.unwrap(), b"hello");
        assert_eq!(storage.usage().await.unwrap(), 5);

        storage.delete("blob-1").await.unwrap();
        assert!(storage.download("blob-1").await.is_err());
        assert_eq!(storage.usage().await.unwrap(), 0);

        // Deleting a missing key is a no-op.
        storage.delete("blob-1").await.unwrap();

        tokio::fs::remove_dir_all(&dir).await.unwrap();
    }
}
