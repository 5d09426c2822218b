//! Disk I/O helpers: load from file and atomic write.
//!
//! The rename-over approach is close to atomic on most platforms. On FAT32 or
//! network shares there are no hard guarantees.

use crate::document::Document;
use crate::error::{Error, Result};
use crate::serializer::Serializer;
use std::path::Path;

/// Reads and deserializes the file at `path`. Returns an empty document if
/// the file is missing or empty (not an error). Anything else that stops the
/// file from becoming a [`Document`] is an [`Error::Load`].
pub fn load<S>(path: &Path, serializer: &S) -> Result<Document>
where
    S: Serializer,
{
    let bytes = match std::fs::read(path) {
        Ok(b) => b,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Document::default()),
        Err(e) => return Err(Error::Load(e.to_string())),
    };
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Ok(Document::default());
    }
    serializer.deserialize(&bytes)
}

/// Like [`load`], but a file that cannot be loaded yields an empty document
/// alongside the error that caused the fallback.
pub fn load_or_empty<S>(path: &Path, serializer: &S) -> (Document, Option<Error>)
where
    S: Serializer,
{
    match load(path, serializer) {
        Ok(doc) => (doc, None),
        Err(e) => (Document::default(), Some(e)),
    }
}

/// Write `bytes` to `<path>.tmp` and then rename over `path`. This avoids
/// leaving a half-written file if the process crashes mid-write.
pub fn atomic_write(path: &Path, bytes: &[u8]) -> Result<()> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
    let tmp = path.with_extension(format!("{ext}.tmp"));
    std::fs::write(&tmp, bytes)?;
    if let Err(e) = std::fs::rename(&tmp, path) {
        let _ = std::fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}
