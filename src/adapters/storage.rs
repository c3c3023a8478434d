use crate::domain::ports::Storage;
use crate::utils::error::Result;
use std::fs;
use std::path::Path;

/// Artifact storage rooted at a local directory.
#[derive(Debug, Clone)]
pub struct LocalStorage {
    base_path: String,
}

impl LocalStorage {
    pub fn new(base_path: impl Into<String>) -> Self {
        Self {
            base_path: base_path.into(),
        }
    }
}

impl Storage for LocalStorage {
    async fn read_file(&self, path: &str) -> Result<Vec<u8>> {
        let full_path = Path::new(&self.base_path).join(path);
        let data = fs::read(full_path)?;
        Ok(data)
    }

    async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
        let full_path = Path::new(&self.base_path).join(path);

        if let Some(parent) = full_path.parent() {
            fs::create_dir_all(parent)?;
        }

        fs::write(full_path, data)?;
        Ok(())
    }

    async fn exists(&self, path: &str) -> bool {
        Path::new(&self.base_path).join(path).is_file()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_creates_directory_and_reads_back() {
        let temp_dir = TempDir::new().unwrap();
        let root = temp_dir.path().join("models");
        let storage = LocalStorage::new(root.to_string_lossy().to_string());

        assert!(!storage.exists("scaler.json").await);
        storage.write_file("scaler.json", b"{}").await.unwrap();

        assert!(root.is_dir());
        assert!(storage.exists("scaler.json").await);
        assert_eq!(storage.read_file("scaler.json").await.unwrap(), b"{}");
    }

    #[tokio::test]
    async fn test_read_missing_file_is_io_error() {
        let temp_dir = TempDir::new().unwrap();
        let storage = LocalStorage::new(temp_dir.path().to_string_lossy().to_string());

        let err = storage.read_file("imputer.json").await.unwrap_err();
        assert!(matches!(err, crate::utils::error::PredictorError::IoError(_)));
    }
}
