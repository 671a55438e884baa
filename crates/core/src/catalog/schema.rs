use std::fs;
use std::io::{self, Write};
use std::path::Path;

use tracing::debug;

use super::Catalog;
use crate::error::Result;

/// Read the catalog document at `path`.
///
/// A missing file is an empty catalog. Anything present must parse, so a
/// truncated or blank document is a deserialization error.
pub fn load(path: &Path) -> Result<Catalog> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            debug!(path = %path.display(), "catalog file absent, starting empty");
            return Ok(Catalog::default());
        }
        Err(e) => return Err(e.into()),
    };

    let catalog: Catalog = serde_json::from_str(&data)?;
    debug!(
        path = %path.display(),
        images = catalog.images.len(),
        categories = catalog.categories.len(),
        "catalog loaded"
    );
    Ok(catalog)
}

/// Write the catalog document to `path`, replacing any previous content.
///
/// The document is written to a sibling temp file and renamed into place, so
/// a failed save leaves the old file untouched.
pub fn save(path: &Path, catalog: &Catalog) -> Result<()> {
    write_atomic(path, |file| {
        serde_json::to_writer_pretty(&mut *file, catalog).map_err(io::Error::from)?;
        file.write_all(b"\n")
    })?;

    debug!(
        path = %path.display(),
        images = catalog.images.len(),
        categories = catalog.categories.len(),
        "catalog saved"
    );
    Ok(())
}

/// Fill a temp file next to `path` with `write`, then rename it over `path`.
///
/// If `write` fails the temp file is dropped (and removed) before `path` is touched.
fn write_atomic(path: &Path, write: impl FnOnce(&mut fs::File) -> io::Result<()>) -> Result<()> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir)?;

    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    write(tmp.as_file_mut())?;
    tmp.as_file().sync_all()?;
    tmp.persist(path)?;
    Ok(())
}
