// ABOUTME: Crash-safe whole-file replacement via temp file, fsync, and rename.
// ABOUTME: Used for collection documents and export artifacts.

use std::fs::{self, File};
use std::io::{self, Write};
use std::path::Path;

/// Write `contents` to `path` so readers see either the old file or the new
/// one, never a partial write. Creates the parent directory if needed.
pub fn write_atomic(path: &Path, contents: &[u8]) -> io::Result<()> {
    let parent = path.parent().filter(|p| !p.as_os_str().is_empty());
    if let Some(parent) = parent {
        fs::create_dir_all(parent)?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = Path::new(&tmp_name);

    let mut file = File::create(tmp_path)?;
    file.write_all(contents)?;
    file.sync_all()?;
    drop(file);

    fs::rename(tmp_path, path)?;

    // Best-effort: persist the rename itself. The data is already consistent.
    if let Some(parent) = parent
        && let Ok(dir) = File::open(parent)
    {
        let _ = dir.sync_all();
    }

    Ok(())
}
