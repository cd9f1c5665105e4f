//! Content-addressed artifact storage.
//!
//! Every artifact is stored at `<dir>/<hash>.<ext>`, where `hash` is the
//! SHA-1 of the computation unit's source text. The directory is created
//! lazily on the first miss.

use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use log::{info, warn};
use sagedoc_common::ContentHash;

use crate::error::CacheError;

/// The kinds of artifact kept in the cache, one per file extension.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ArtifactKind {
    /// Generated session script executed by the engine.
    Script,
    /// Rendered vector image.
    Image,
    /// TeX source handed to the typesetting compiler.
    Typeset,
}

impl ArtifactKind {
    /// File extension used for this kind.
    pub fn extension(self) -> &'static str {
        match self {
            ArtifactKind::Script => "sage",
            ArtifactKind::Image => "svg",
            ArtifactKind::Typeset => "tex",
        }
    }
}

/// Result of a conditional artifact write.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WriteOutcome {
    /// The file was created with this many bytes.
    Written(usize),
    /// A file already existed and was left alone.
    Cached,
}

/// Flat content-addressed store rooted at one directory.
#[derive(Debug, Clone)]
pub struct ArtifactStore {
    /// Directory holding all artifacts.
    dir: PathBuf,
}

impl ArtifactStore {
    /// Creates a store rooted at `dir`. Nothing is touched on disk yet.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// Returns the artifact directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Returns `<dir>/<hash>.<ext>`.
    pub fn artifact_path(&self, hash: &ContentHash, kind: ArtifactKind) -> PathBuf {
        self.dir.join(format!("{hash}.{}", kind.extension()))
    }

    /// Path of the generated script for a source text.
    pub fn script_path(&self, source: &str) -> PathBuf {
        self.artifact_path(&ContentHash::of(source), ArtifactKind::Script)
    }

    /// Path of the rendered image for a source text.
    pub fn image_path(&self, source: &str) -> PathBuf {
        self.artifact_path(&ContentHash::of(source), ArtifactKind::Image)
    }

    /// Path of the TeX source for a source text.
    pub fn typeset_path(&self, source: &str) -> PathBuf {
        self.artifact_path(&ContentHash::of(source), ArtifactKind::Typeset)
    }

    /// Creates the artifact directory if needed.
    ///
    /// An existing directory is not an error. Other failures are logged and
    /// returned; callers may continue and let the following write report.
    pub fn ensure_dir(&self) -> Result<(), CacheError> {
        if self.dir.is_dir() {
            return Ok(());
        }
        match std::fs::create_dir_all(&self.dir) {
            Ok(()) => {
                info!("created directory {}", self.dir.display());
                Ok(())
            }
            Err(e) if e.kind() == ErrorKind::AlreadyExists => Ok(()),
            Err(e) => {
                warn!("could not create {}: {e}", self.dir.display());
                Err(CacheError::Io {
                    path: self.dir.clone(),
                    source: e,
                })
            }
        }
    }

    /// Writes `contents` to `path`, replacing any existing file.
    ///
    /// Empty contents are rejected before the filesystem is touched.
    pub fn write(&self, path: &Path, contents: &str) -> Result<usize, CacheError> {
        if contents.is_empty() {
            warn!("skipped writing 0 bytes to {}", path.display());
            return Err(CacheError::EmptyArtifact {
                path: path.to_path_buf(),
            });
        }
        std::fs::write(path, contents).map_err(|e| {
            warn!(
                "could not write {} bytes to {}: {e}",
                contents.len(),
                path.display()
            );
            CacheError::Io {
                path: path.to_path_buf(),
                source: e,
            }
        })?;
        info!("wrote {} bytes to {}", contents.len(), path.display());
        Ok(contents.len())
    }

    /// Writes `contents` to `path` only if no file exists there yet.
    pub fn write_if_absent(&self, path: &Path, contents: &str) -> Result<WriteOutcome, CacheError> {
        if path.is_file() {
            return Ok(WriteOutcome::Cached);
        }
        // A failed mkdir surfaces through the write below.
        let _ = self.ensure_dir();
        self.write(path, contents).map(WriteOutcome::Written)
    }

    /// Resolves the script artifact for `source`, generating it on a miss.
    ///
    /// `generate` is only called when no script exists yet, so whatever it
    /// produced the first time is what the engine executes from then on.
    pub fn prepare_script<F>(&self, source: &str, generate: F) -> Result<PathBuf, CacheError>
    where
        F: FnOnce(&str) -> String,
    {
        let path = self.script_path(source);
        if !path.is_file() {
            let script = generate(source);
            self.write_if_absent(&path, &script)?;
        }
        Ok(path)
    }

    /// Writes TeX source to its artifact path unless already cached.
    pub fn prepare_typeset(&self, source: &str) -> Result<PathBuf, CacheError> {
        let path = self.typeset_path(source);
        self.write_if_absent(&path, source)?;
        Ok(path)
    }
}
