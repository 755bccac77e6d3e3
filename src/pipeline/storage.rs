use async_trait::async_trait;
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::sync::RwLock;
use tracing::debug;
use walkdir::WalkDir;

use crate::error::{PipelineError, Result};

pub const TEXT_CONTENT_TYPE: &str = "text/plain; charset=utf-8";
pub const PDF_CONTENT_TYPE: &str = "application/pdf";

/// Object storage seam used for OCR output and persisted artifacts
#[async_trait]
pub trait ObjectStore: Send + Sync {
    /// All artifact names under `prefix`, at any depth
    async fn list(&self, prefix: &str) -> Result<Vec<String>>;

    async fn download(&self, path: &str) -> Result<Vec<u8>>;

    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<()>;

    async fn delete(&self, path: &str) -> Result<()>;
}

/// Store backed by a directory on the local filesystem
#[derive(Debug, Clone)]
pub struct LocalStore {
    root: PathBuf,
}

impl LocalStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key.trim_start_matches('/'))
    }
}

#[async_trait]
impl ObjectStore for LocalStore {
    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        let root = self.root.clone();
        let filter = prefix.to_string();

        let names = tokio::task::spawn_blocking(move || {
            let mut names = Vec::new();
            for entry in WalkDir::new(&root)
                .into_iter()
                .filter_map(|e| e.ok())
                .filter(|e| e.file_type().is_file())
            {
                let Ok(rel) = entry.path().strip_prefix(&root) else {
                    continue;
                };
                let key = rel
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy())
                    .collect::<Vec<_>>()
                    .join("/");
                if key.starts_with(&filter) {
                    names.push(key);
                }
            }
            names
        })
        .await
        .map_err(|e| PipelineError::Internal(format!("listing task failed: {}", e)))?;

        debug!("Listed {} objects under {:?} in {:?}", names.len(), prefix, self.root);
        Ok(names)
    }

    async fn download(&self, path: &str) -> Result<Vec<u8>> {
        let full = self.path_for(path);
        match tokio::fs::read(&full).await {
            Ok(bytes) => Ok(bytes),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                Err(PipelineError::NotFound(format!("object {}", path)))
            }
            Err(e) => Err(e.into()),
        }
    }

    async fn upload(&self, path: &str, bytes: Vec<u8>, _content_type: &str) -> Result<()> {
        let full = self.path_for(path);
        if let Some(parent) = full.parent() {
            tokio::fs::create_dir_all(parent).await?;
        }
        tokio::fs::write(&full, bytes).await?;
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        match tokio::fs::remove_file(self.path_for(path)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

/// A stored object with its declared content type
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredObject {
    pub bytes: Vec<u8>,
    pub content_type: String,
}

/// In-process store, handy for tests and dry runs
#[derive(Debug, Default)]
pub struct MemoryStore {
    objects: RwLock<BTreeMap<String, StoredObject>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn get(&self, path: &str) -> Option<StoredObject> {
        self.objects.read().await.get(path).cloned()
    }

    pub async fn keys(&self) -> Vec<String> {
        self.objects.read().await.keys().cloned().collect()
    }
}

#[async_trait]
impl ObjectStore for MemoryStore {
    async fn list(&self, prefix: &str) -> Result<Vec<String>> {
        Ok(self
            .objects
            .read()
            .await
            .keys()
            .filter(|k| k.starts_with(prefix))
            .cloned()
            .collect())
    }

    async fn download(&self, path: &str) -> Result<Vec<u8>> {
        self.objects
            .read()
            .await
            .get(path)
            .map(|o| o.bytes.clone())
            .ok_or_else(|| PipelineError::NotFound(format!("object {}", path)))
    }

    async fn upload(&self, path: &str, bytes: Vec<u8>, content_type: &str) -> Result<()> {
        self.objects.write().await.insert(
            path.to_string(),
            StoredObject {
                bytes,
                content_type: content_type.to_string(),
            },
        );
        Ok(())
    }

    async fn delete(&self, path: &str) -> Result<()> {
        self.objects.write().await.remove(path);
        Ok(())
    }
}
