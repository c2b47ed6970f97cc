//! Artifact naming and the diff-and-write lifecycle.

use std::fmt;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use weave_source::GovernorDetails;

use crate::error::FileError;
use crate::files::FileLayer;

/// What an artifact operation did on disk.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArtifactOutcome {
    /// Content differed (or the file was missing) and was written.
    Written,
    /// Content on disk already matched.
    Unchanged,
    /// An existing artifact was deleted.
    Deleted,
    /// There was nothing to delete.
    Absent,
}

impl fmt::Display for ArtifactOutcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ArtifactOutcome::Written => "written",
            ArtifactOutcome::Unchanged => "unchanged",
            ArtifactOutcome::Deleted => "deleted",
            ArtifactOutcome::Absent => "absent",
        };
        f.write_str(s)
    }
}

/// Places artifacts next to their governor and keeps them in sync with
/// rendered content.
///
/// An artifact for governor `com.example.Widget` and suffix `Bean` lives at
/// `<governor dir>/Widget_Bean.<extension>`.
#[derive(Clone)]
pub struct ArtifactWriter {
    files: Rc<dyn FileLayer>,
    extension: String,
}

impl ArtifactWriter {
    /// Creates a writer producing files with `extension`.
    pub fn new(files: Rc<dyn FileLayer>, extension: impl Into<String>) -> Self {
        Self {
            files,
            extension: extension.into(),
        }
    }

    /// Returns the artifact (aspect) name, e.g. `Widget_Bean`.
    pub fn artifact_name(governor: &GovernorDetails, suffix: &str) -> String {
        format!("{}_{suffix}", governor.simple_name())
    }

    /// Returns the artifact path for `governor` and `suffix`.
    pub fn artifact_path(&self, governor: &GovernorDetails, suffix: &str) -> PathBuf {
        governor.source_dir().join(format!(
            "{}.{}",
            Self::artifact_name(governor, suffix),
            self.extension
        ))
    }

    /// Returns the configured file extension.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Returns `true` if an artifact exists at `path`.
    pub fn exists(&self, path: &Path) -> bool {
        self.files.exists(path)
    }

    /// Brings the artifact at `path` in line with `content`.
    ///
    /// Empty content deletes the artifact; otherwise the file is written
    /// only when its current content differs.
    pub fn sync(&self, path: &Path, content: &str) -> Result<ArtifactOutcome, FileError> {
        if content.is_empty() {
            return self.remove(path);
        }
        if self.files.write_if_different(path, content.as_bytes())? {
            tracing::info!(path = %path.display(), "wrote artifact");
            Ok(ArtifactOutcome::Written)
        } else {
            tracing::debug!(path = %path.display(), "artifact unchanged");
            Ok(ArtifactOutcome::Unchanged)
        }
    }

    /// Deletes the artifact at `path` if present.
    pub fn remove(&self, path: &Path) -> Result<ArtifactOutcome, FileError> {
        if self.files.delete(path)? {
            tracing::info!(path = %path.display(), "deleted artifact");
            Ok(ArtifactOutcome::Deleted)
        } else {
            Ok(ArtifactOutcome::Absent)
        }
    }
}
