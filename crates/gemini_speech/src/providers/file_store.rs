//! Filesystem audio store

use std::path::{Component, Path, PathBuf};

use async_trait::async_trait;
use audio_domain::ContainerFile;
use tempfile::NamedTempFile;
use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;
use tracing::{debug, instrument};

use crate::config::SpeechConfig;
use crate::error::SpeechError;
use crate::ports::AudioStore;

/// Writes finalized audio below a root directory
///
/// Files are written to a temp file in the target directory first and moved
/// into place once complete, so a failed write never leaves a truncated file
/// or destroys the previous one.
#[derive(Debug, Clone)]
pub struct FileAudioStore {
    root: PathBuf,
    overwrite_existing: bool,
}

impl FileAudioStore {
    /// Create a store rooted at `root` that replaces existing files
    #[must_use]
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            overwrite_existing: true,
        }
    }

    /// Create a store from the output settings in `config`
    #[must_use]
    pub fn from_config(config: &SpeechConfig) -> Self {
        Self {
            root: config.output_dir.clone(),
            overwrite_existing: config.overwrite_existing,
        }
    }

    /// Refuse to replace files that already exist
    #[must_use]
    pub const fn without_overwrite(mut self) -> Self {
        self.overwrite_existing = false;
        self
    }

    /// Root directory
    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Path a file would be written to for `stem`
    ///
    /// The extension is appended unless the stem already ends with it.
    ///
    /// # Errors
    ///
    /// Returns `SpeechError::Storage` if the stem is blank, absolute or
    /// climbs out of the root with `..`.
    pub fn path_for(&self, file: &ContainerFile, stem: &str) -> Result<PathBuf, SpeechError> {
        if stem.trim().is_empty() {
            return Err(SpeechError::Storage("Output name must not be empty".to_string()));
        }

        let escapes_root = Path::new(stem).components().any(|component| {
            matches!(
                component,
                Component::RootDir | Component::Prefix(_) | Component::ParentDir
            )
        });
        if escapes_root {
            return Err(SpeechError::Storage(format!(
                "Output name '{stem}' must stay below {}",
                self.root.display()
            )));
        }

        Ok(self.root.join(file.filename(stem)))
    }

    /// Write `data` to a hidden temp file inside `parent`
    async fn write_temp(parent: &Path, data: &[u8]) -> Result<NamedTempFile, SpeechError> {
        let temp_file = tempfile::Builder::new()
            .prefix(".")
            .suffix(".part")
            .tempfile_in(parent)
            .map_err(|e| SpeechError::Storage(format!("Failed to create temp file: {e}")))?;

        let mut handle = File::create(temp_file.path())
            .await
            .map_err(|e| SpeechError::Storage(format!("Failed to open temp file: {e}")))?;

        handle
            .write_all(data)
            .await
            .map_err(|e| SpeechError::Storage(format!("Failed to write audio data: {e}")))?;

        handle
            .flush()
            .await
            .map_err(|e| SpeechError::Storage(format!("Failed to flush temp file: {e}")))?;

        Ok(temp_file)
    }
}

#[async_trait]
impl AudioStore for FileAudioStore {
    #[instrument(skip(self, file), fields(extension = file.extension(), size_bytes = file.len()))]
    async fn store(&self, file: &ContainerFile, stem: &str) -> Result<PathBuf, SpeechError> {
        let path = self.path_for(file, stem)?;
        let parent = path.parent().unwrap_or(&self.root);

        fs::create_dir_all(parent).await.map_err(|e| {
            SpeechError::Storage(format!("Failed to create {}: {e}", parent.display()))
        })?;

        // The target only changes once the complete file is on disk
        let temp_file = Self::write_temp(parent, file.data()).await?;

        let persisted = if self.overwrite_existing {
            temp_file.persist(&path)
        } else {
            temp_file.persist_noclobber(&path)
        };
        persisted.map_err(|e| {
            SpeechError::Storage(format!("Failed to move audio into {}: {}", path.display(), e.error))
        })?;

        debug!(path = %path.display(), "Audio file written");
        Ok(path)
    }
}
