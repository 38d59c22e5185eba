//! Shared persistence utilities — atomic file writes, artifact codecs.
//!
//! Consolidates the atomic write pattern (write to .tmp then rename) used by
//! every stage into a single implementation, and provides the two artifact
//! codecs the pipeline persists through: JSON for human-readable documents
//! (schemas, metrics, run registry) and bincode for binary blobs (fitted
//! scaler, trained model).

use serde::Serialize;
use serde::de::DeserializeOwned;
use std::io;
use std::path::Path;

/// Errors from artifact load/save.
#[derive(Debug, thiserror::Error)]
pub enum CodecError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("JSON codec error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("binary codec error: {0}")]
    Binary(#[from] bincode::Error),

    #[error("artifact not found: {path}")]
    NotFound { path: std::path::PathBuf },
}

/// Atomically write JSON data to a file.
///
/// Serializes `data` to pretty-printed JSON, writes to a `.tmp` sibling file,
/// then atomically renames to the target path. This prevents corruption from
/// partial writes or process crashes.
///
/// Creates parent directories if they don't exist.
pub fn atomic_write_json<T: Serialize>(path: &Path, data: &T) -> io::Result<()> {
    let json = serde_json::to_string_pretty(data).map_err(io::Error::other)?;
    atomic_write(path, json.as_bytes())
}

/// Atomically write raw bytes to a file.
///
/// Writes to a `.tmp` sibling file, then atomically renames to the target
/// path. Creates parent directories if they don't exist.
pub fn atomic_write(path: &Path, data: &[u8]) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let tmp = path.with_extension("tmp");
    std::fs::write(&tmp, data)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Load and deserialize JSON from a file.
///
/// Returns `Ok(None)` if the file doesn't exist.
/// Returns `Err` on I/O errors or deserialization failures.
pub fn load_json<T: DeserializeOwned>(path: &Path) -> io::Result<Option<T>> {
    if !path.exists() {
        return Ok(None);
    }
    let data = std::fs::read_to_string(path)?;
    let value =
        serde_json::from_str(&data).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?;
    Ok(Some(value))
}

/// An artifact codec: one serialization format for write-once/read-many
/// pipeline artifacts.
///
/// Two concrete implementations exist, [`JsonCodec`] and [`BinaryCodec`];
/// artifact owners pick one at the call site, so no runtime format
/// inspection is ever needed.
pub trait ArtifactCodec {
    /// Serialize `data` and write it atomically to `path`.
    fn save<T: Serialize>(&self, path: &Path, data: &T) -> Result<(), CodecError>;

    /// Read and deserialize the artifact at `path`.
    ///
    /// A missing file is `CodecError::NotFound`, not a default value:
    /// pipeline artifacts are only ever read after the stage that writes
    /// them has run.
    fn load<T: DeserializeOwned>(&self, path: &Path) -> Result<T, CodecError>;
}

/// Pretty-printed JSON artifacts (schemas, metrics, run registry).
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonCodec;

impl ArtifactCodec for JsonCodec {
    fn save<T: Serialize>(&self, path: &Path, data: &T) -> Result<(), CodecError> {
        atomic_write_json(path, data)?;
        Ok(())
    }

    fn load<T: DeserializeOwned>(&self, path: &Path) -> Result<T, CodecError> {
        if !path.exists() {
            return Err(CodecError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let data = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&data)?)
    }
}

/// Bincode artifacts (fitted scaler, trained model).
///
/// Byte-identical across processes: the serving process reads exactly the
/// bytes the training process wrote.
#[derive(Debug, Clone, Copy, Default)]
pub struct BinaryCodec;

impl ArtifactCodec for BinaryCodec {
    fn save<T: Serialize>(&self, path: &Path, data: &T) -> Result<(), CodecError> {
        let bytes = bincode::serialize(data)?;
        atomic_write(path, &bytes)?;
        Ok(())
    }

    fn load<T: DeserializeOwned>(&self, path: &Path) -> Result<T, CodecError> {
        if !path.exists() {
            return Err(CodecError::NotFound {
                path: path.to_path_buf(),
            });
        }
        let bytes = std::fs::read(path)?;
        Ok(bincode::deserialize(&bytes)?)
    }
}
