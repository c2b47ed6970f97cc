//! The file-layer interface used for artifact I/O.

use std::cell::{Cell, RefCell};
use std::collections::BTreeMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use crate::error::FileError;

/// Capability set the engine needs to persist artifacts.
///
/// `write_if_different` is the only way artifacts are written: it reads the
/// current content first and leaves the file untouched when it already
/// matches.
pub trait FileLayer {
    /// Reads a file, returning `None` if it does not exist.
    fn read(&self, path: &Path) -> Result<Option<Vec<u8>>, FileError>;

    /// Writes `bytes` unless the file already holds exactly those bytes.
    ///
    /// Returns `true` if the file was written.
    fn write_if_different(&self, path: &Path, bytes: &[u8]) -> Result<bool, FileError>;

    /// Deletes a file. Returns `true` if something was deleted.
    fn delete(&self, path: &Path) -> Result<bool, FileError>;

    /// Returns `true` if the file exists.
    fn exists(&self, path: &Path) -> bool;
}

/// A [`FileLayer`] over the real filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct DiskFileLayer;

impl DiskFileLayer {
    /// Creates a disk file layer.
    pub fn new() -> Self {
        Self
    }
}

impl FileLayer for DiskFileLayer {
    fn read(&self, path: &Path) -> Result<Option<Vec<u8>>, FileError> {
        match std::fs::read(path) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(FileError::Io {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }

    fn write_if_different(&self, path: &Path, bytes: &[u8]) -> Result<bool, FileError> {
        if self.read(path)?.as_deref() == Some(bytes) {
            return Ok(false);
        }
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| FileError::Io {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }
        std::fs::write(path, bytes).map_err(|e| FileError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        Ok(true)
    }

    fn delete(&self, path: &Path) -> Result<bool, FileError> {
        match std::fs::remove_file(path) {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(false),
            Err(e) => Err(FileError::Io {
                path: path.to_path_buf(),
                source: e,
            }),
        }
    }

    fn exists(&self, path: &Path) -> bool {
        path.is_file()
    }
}

/// An in-memory [`FileLayer`] that counts writes and deletions.
#[derive(Debug, Default)]
pub struct MemoryFileLayer {
    files: RefCell<BTreeMap<PathBuf, Vec<u8>>>,
    writes: Cell<usize>,
    deletes: Cell<usize>,
}

impl MemoryFileLayer {
    /// Creates an empty layer.
    pub fn new() -> Self {
        Self::default()
    }

    /// Places a file without counting it as a write.
    pub fn insert(&self, path: impl Into<PathBuf>, content: impl Into<Vec<u8>>) {
        self.files.borrow_mut().insert(path.into(), content.into());
    }

    /// Returns a file's content as UTF-8 text.
    pub fn contents(&self, path: &Path) -> Option<String> {
        self.files
            .borrow()
            .get(path)
            .map(|bytes| String::from_utf8_lossy(bytes).into_owned())
    }

    /// Returns every stored path, sorted.
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.borrow().keys().cloned().collect()
    }

    /// Number of writes performed through [`FileLayer::write_if_different`].
    pub fn write_count(&self) -> usize {
        self.writes.get()
    }

    /// Number of deletions that removed a file.
    pub fn delete_count(&self) -> usize {
        self.deletes.get()
    }
}

impl FileLayer for MemoryFileLayer {
    fn read(&self, path: &Path) -> Result<Option<Vec<u8>>, FileError> {
        Ok(self.files.borrow().get(path).cloned())
    }

    fn write_if_different(&self, path: &Path, bytes: &[u8]) -> Result<bool, FileError> {
        let mut files = self.files.borrow_mut();
        if files.get(path).map(Vec::as_slice) == Some(bytes) {
            return Ok(false);
        }
        files.insert(path.to_path_buf(), bytes.to_vec());
        self.writes.set(self.writes.get() + 1);
        Ok(true)
    }

    fn delete(&self, path: &Path) -> Result<bool, FileError> {
        let removed = self.files.borrow_mut().remove(path).is_some();
        if removed {
            self.deletes.set(self.deletes.get() + 1);
        }
        Ok(removed)
    }

    fn exists(&self, path: &Path) -> bool {
        self.files.borrow().contains_key(path)
    }
}
