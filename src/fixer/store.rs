use async_trait::async_trait;
use std::io;
use std::path::PathBuf;
use tracing::info;

/// Whole-file text storage addressed by the paths the type checker reports.
#[async_trait]
pub trait FileStore: Send + Sync {
    async fn read(&self, path: &str) -> io::Result<String>;

    /// Replace the whole file body.
    async fn write(&self, path: &str, contents: &str) -> io::Result<()>;
}

/// Files on disk, relative paths resolved against `root`.
pub struct FsStore {
    root: PathBuf,
}

impl FsStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(path)
    }
}

#[async_trait]
impl FileStore for FsStore {
    async fn read(&self, path: &str) -> io::Result<String> {
        tokio::fs::read_to_string(self.resolve(path)).await
    }

    async fn write(&self, path: &str, contents: &str) -> io::Result<()> {
        tokio::fs::write(self.resolve(path), contents).await
    }
}

/// Reads through to disk but only logs writes.
pub struct DryRunStore {
    inner: FsStore,
}

impl DryRunStore {
    pub fn new(inner: FsStore) -> Self {
        Self { inner }
    }
}

#[async_trait]
impl FileStore for DryRunStore {
    async fn read(&self, path: &str) -> io::Result<String> {
        self.inner.read(path).await
    }

    async fn write(&self, path: &str, contents: &str) -> io::Result<()> {
        info!(file = %path, bytes = contents.len(), "dry run: skipping write");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_fs_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());
        std::fs::create_dir(dir.path().join("src")).unwrap();

        store.write("src/a.ts", "const a = 1;\n").await.unwrap();
        assert_eq!(store.read("src/a.ts").await.unwrap(), "const a = 1;\n");
    }

    #[tokio::test]
    async fn test_fs_store_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FsStore::new(dir.path());
        let err = store.read("nope.ts").await.unwrap_err();
        assert_eq!(err.kind(), io::ErrorKind::NotFound);
    }

    #[tokio::test]
    async fn test_dry_run_store_does_not_write() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.ts"), "original").unwrap();
        let store = DryRunStore::new(FsStore::new(dir.path()));

        store.write("a.ts", "patched").await.unwrap();
        assert_eq!(store.read("a.ts").await.unwrap(), "original");
    }
}
