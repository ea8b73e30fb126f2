//! Temporary files staged next to their final destination.
use std::io;
use std::path::Path;

use tempfile::{Builder, NamedTempFile};

/// Create a temp file in the directory of `dest`, ready to be persisted over it.
///
/// On Unix the file is created with mode 0666 filtered by the process umask,
/// the same mode a plain `fs::write` would give, instead of tempfile's 0600.
pub fn stage_beside(dest: &Path) -> io::Result<NamedTempFile> {
    let dir = match dest.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };

    let mut builder = Builder::new();
    builder.prefix(".protprep-");
    #[cfg(unix)]
    {
        use std::os::unix::fs::PermissionsExt;
        builder.permissions(std::fs::Permissions::from_mode(0o666));
    }
    builder.tempfile_in(dir)
}
