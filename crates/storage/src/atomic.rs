use std::{
    fs::{self, File},
    io,
    path::Path,
};

use tempfile::Builder;

/// Writes `path` through a sibling temporary file that is renamed into place
/// only after `write` succeeded and the data reached the disk. Readers observe
/// either the previous file or the complete new one.
///
/// An existing destination keeps its permissions. A new file gets the mode a
/// plain create would give it under the process umask.
pub(crate) fn write_atomically<E, F>(path: &Path, write: F) -> Result<(), E>
where
    E: From<io::Error>,
    F: FnOnce(&mut File) -> Result<(), E>,
{
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    fs::create_dir_all(parent)?;

    let mut builder = Builder::new();
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(fs::Permissions::from_mode(0o666));
    }
    let mut staged = builder.tempfile_in(parent)?;
    if let Ok(existing) = fs::metadata(path) {
        staged.as_file().set_permissions(existing.permissions())?;
    }

    write(staged.as_file_mut())?;
    staged.as_file().sync_all()?;
    staged.persist(path).map_err(|err| err.error)?;
    Ok(())
}
