use crate::error::Result;
use crate::model::TransformedImage;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Destination for transformed images.
pub trait ImageStore: Send + Sync {
    fn persist(&self, image: &TransformedImage) -> Result<()>;
}

/// Writes each transformed image to `<root>/<transform>/<file name>`.
#[derive(Debug, Clone)]
pub struct DirectoryStore {
    root: PathBuf,
}

impl DirectoryStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn path_for(&self, image: &TransformedImage) -> PathBuf {
        self.root.join(image.kind.as_str()).join(&image.file_name)
    }
}

impl ImageStore for DirectoryStore {
    fn persist(&self, image: &TransformedImage) -> Result<()> {
        let path = self.path_for(image);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&path, &image.bytes)?;
        debug!("Stored {} ({} bytes)", path.display(), image.bytes.len());
        Ok(())
    }
}
