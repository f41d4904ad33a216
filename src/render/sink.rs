use async_trait::async_trait;
use std::{
    fmt::Debug,
    path::{Path, PathBuf},
};
use tracing::info;

use crate::error::{PlannerError, Result};

/// Receives a rendered document for delivery.
#[async_trait]
pub trait DocumentSink: Send + Sync + Debug {
    /// Deliver `bytes` under `file_name`, returning where it ended up.
    async fn deliver(&self, file_name: &str, bytes: &[u8]) -> Result<String>;
}

/// Writes documents into a directory on the local filesystem.
#[derive(Debug, Clone)]
pub struct DirectorySink {
    dir: PathBuf,
}

impl DirectorySink {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl DocumentSink for DirectorySink {
    async fn deliver(&self, file_name: &str, bytes: &[u8]) -> Result<String> {
        let name = Path::new(file_name)
            .file_name()
            .ok_or_else(|| PlannerError::Render(format!("invalid file name `{}`", file_name)))?;
        let path = self.dir.join(name);

        tokio::fs::create_dir_all(&self.dir).await?;
        tokio::fs::write(&path, bytes).await?;

        info!(
            target: "trip_planner::render",
            path = %path.display(),
            bytes = bytes.len(),
            "document written"
        );
        Ok(path.display().to_string())
    }
}
