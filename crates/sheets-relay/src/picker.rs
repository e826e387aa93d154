//! Filesystem-backed file picker.

use crate::{Attachment, FilePicker};
use std::path::{Path, PathBuf};

/// Reads attachments from paths given on the command line or in a chat.
#[derive(Debug, Clone, Default)]
pub struct PathFilePicker {
    paths: Vec<PathBuf>,
}

impl PathFilePicker {
    pub fn new<I, P>(paths: I) -> Self
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        Self {
            paths: paths.into_iter().map(Into::into).collect(),
        }
    }

    pub fn paths(&self) -> &[PathBuf] {
        &self.paths
    }
}

impl FilePicker for PathFilePicker {
    fn pick(&self) -> std::io::Result<Vec<Attachment>> {
        self.paths.iter().map(|path| read_attachment(path)).collect()
    }
}

/// Load one file, declaring the media type guessed from its extension.
pub fn read_attachment(path: &Path) -> std::io::Result<Attachment> {
    let content = std::fs::read(path)?;
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string());
    let media_type = mime_guess::from_path(path)
        .first()
        .map(|mime| mime.essence_str().to_string())
        .unwrap_or_default();

    Ok(Attachment::new(name, media_type, content))
}
