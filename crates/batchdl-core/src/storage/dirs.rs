//! Owner-only directory creation and permission checks.

use std::fs::Metadata;
use std::io;
use std::path::Path;

/// Creates `path` and any missing ancestors with mode `0700` on Unix.
/// Existing directories are left untouched.
pub fn create_owner_dir_all(path: &Path) -> io::Result<()> {
    let mut builder = std::fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(path)
}

/// True if the owner-write permission bit is set.
#[cfg(unix)]
pub fn owner_writable(meta: &Metadata) -> bool {
    use std::os::unix::fs::PermissionsExt;
    meta.permissions().mode() & 0o200 != 0
}

/// Non-Unix: falls back to the read-only attribute.
#[cfg(not(unix))]
pub fn owner_writable(meta: &Metadata) -> bool {
    !meta.permissions().readonly()
}
