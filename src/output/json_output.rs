use std::path::{Path, PathBuf};

use compio::BufResult;
use compio::fs::{self, File};
use compio::io::AsyncWriteAtExt;
use serde::Serialize;
use serde_json::ser::{PrettyFormatter, Serializer};
use snafu::{ResultExt, Snafu};
use tracing::{debug, warn};

use crate::ext::BestEffortPathExt;
use crate::filesystem::Node;

pub const DEFAULT_OUTPUT_FILE_NAME: &str = "folder_structure.json";
pub const DEFAULT_INDENT: usize = 4;

/// Writes a tree as indented UTF-8 JSON, replacing the target file.
///
/// Once the target has been created, any later failure removes it again, so a
/// failed run never leaves a truncated document behind. A target that cannot
/// be created at all is left untouched.
#[derive(Debug, Clone)]
pub struct JsonOutput {
    path: PathBuf,
    indent: usize,
}

impl JsonOutput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            indent: DEFAULT_INDENT,
        }
    }

    pub fn with_indent(mut self, indent: usize) -> Self {
        self.indent = indent;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Renders the document without touching the disk. Non-ASCII text is
    /// emitted as-is.
    pub fn render(&self, root: &Node) -> Result<Vec<u8>, SerializeError> {
        let indent = " ".repeat(self.indent);
        let mut buffer = Vec::new();
        let mut serializer =
            Serializer::with_formatter(&mut buffer, PrettyFormatter::with_indent(indent.as_bytes()));
        root.serialize(&mut serializer).context(EncodeSnafu)?;
        Ok(buffer)
    }

    /// Returns the number of bytes written.
    pub async fn write(&self, root: &Node) -> Result<usize, SerializeError> {
        let bytes = self.render(root)?;
        let len = bytes.len();
        debug!(
            "Writing {} bytes to {}",
            len,
            self.path.best_effort_path_display()
        );

        let mut file = File::create(&self.path).await.context(CreateSnafu {
            path: self.path.clone(),
        })?;
        let filled = self.fill(&mut file, bytes).await;
        drop(file);

        self.settle(filled).await?;
        Ok(len)
    }

    async fn fill(&self, file: &mut File, bytes: Vec<u8>) -> Result<(), SerializeError> {
        let BufResult(written, _) = file.write_all_at(bytes, 0).await;
        written.context(WriteSnafu {
            path: self.path.clone(),
        })?;
        file.sync_all().await.context(SyncSnafu {
            path: self.path.clone(),
        })
    }

    /// Removes the created target when filling it failed.
    async fn settle(&self, filled: Result<(), SerializeError>) -> Result<(), SerializeError> {
        if filled.is_err() {
            self.discard_partial().await;
        }
        filled
    }

    async fn discard_partial(&self) {
        // Only regular files are ours to remove; devices and the like stay.
        let is_regular_file = fs::symlink_metadata(&self.path)
            .await
            .map(|metadata| metadata.is_file())
            .unwrap_or(false);
        if !is_regular_file {
            return;
        }

        match fs::remove_file(&self.path).await {
            Ok(()) => debug!(
                "Removed partially written {}",
                self.path.best_effort_path_display()
            ),
            Err(err) => warn!(
                "Failed to remove partially written {}: {}",
                self.path.best_effort_path_display(),
                err
            ),
        }
    }
}

#[derive(Debug, Snafu)]
pub enum SerializeError {
    #[snafu(display("Failed to encode the folder structure"))]
    EncodeError { source: serde_json::Error },
    #[snafu(display("Failed to create {}: {}", path.display(), source))]
    CreateError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to write {}: {}", path.display(), source))]
    WriteError {
        path: PathBuf,
        source: std::io::Error,
    },
    #[snafu(display("Failed to flush {}: {}", path.display(), source))]
    SyncError {
        path: PathBuf,
        source: std::io::Error,
    },
}
