use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Result, StudioError};

pub const VIDEO_EXTENSIONS: [&str; 5] = ["mp4", "mov", "avi", "mkv", "webm"];
pub const MAX_UPLOAD_BYTES: u64 = 500 * 1024 * 1024;

/// A video handed over by the UI. Only its metadata is ever looked at.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VideoUpload {
    pub name: String,
    pub path: Option<PathBuf>,
    pub size_bytes: Option<u64>,
}

impl VideoUpload {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            path: None,
            size_bytes: None,
        }
    }

    pub fn with_size(mut self, size_bytes: u64) -> Self {
        self.size_bytes = Some(size_bytes);
        self
    }

    /// Builds an upload from a file on disk, reading its size.
    pub async fn from_path(path: &Path) -> Result<Self> {
        let metadata = tokio::fs::metadata(path).await?;
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        Ok(Self {
            name,
            path: Some(path.to_path_buf()),
            size_bytes: Some(metadata.len()),
        })
    }

    pub fn extension(&self) -> Option<String> {
        Path::new(&self.name)
            .extension()
            .map(|ext| ext.to_string_lossy().to_lowercase())
    }

    pub fn validate(&self) -> Result<()> {
        let supported = self
            .extension()
            .is_some_and(|ext| VIDEO_EXTENSIONS.contains(&ext.as_str()));
        if !supported {
            return Err(StudioError::UnsupportedVideo {
                name: self.name.clone(),
            });
        }

        if let Some(size_bytes) = self.size_bytes
            && size_bytes > MAX_UPLOAD_BYTES
        {
            return Err(StudioError::VideoTooLarge {
                name: self.name.clone(),
                size_bytes,
                limit_bytes: MAX_UPLOAD_BYTES,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_video_containers_case_insensitively() {
        for name in ["clip.mp4", "holiday.MOV", "old.avi", "a.b.mkv", "screen.webm"] {
            assert!(VideoUpload::new(name).validate().is_ok(), "{name}");
        }
    }

    #[test]
    fn rejects_non_video_files() {
        for name in ["song.mp3", "notes.txt", "noextension", ".mp4x"] {
            assert!(matches!(
                VideoUpload::new(name).validate(),
                Err(StudioError::UnsupportedVideo { .. })
            ));
        }
    }

    #[test]
    fn rejects_uploads_over_the_size_limit() {
        let at_limit = VideoUpload::new("big.mp4").with_size(MAX_UPLOAD_BYTES);
        let over = VideoUpload::new("huge.mp4").with_size(MAX_UPLOAD_BYTES + 1);

        assert!(at_limit.validate().is_ok());
        assert!(matches!(
            over.validate(),
            Err(StudioError::VideoTooLarge { size_bytes, .. }) if size_bytes == MAX_UPLOAD_BYTES + 1
        ));
    }

    #[tokio::test]
    async fn from_path_reports_missing_file() {
        let result = VideoUpload::from_path(Path::new("/nonexistent/dir/clip.mp4")).await;

        assert!(matches!(result, Err(StudioError::IoError(_))));
    }
}
