use std::fs;
use std::io::Write;
use std::path::Path;

/// Writes `contents` next to `path` as `.tmp`, syncs it, then renames it over
/// `path`. Readers see either the old file or the complete new one.
pub fn atomic_write<P: AsRef<Path>, C: AsRef<[u8]>>(path: P, contents: C) -> std::io::Result<()> {
    let path = path.as_ref();

    // Same directory, so the rename stays on one filesystem.
    let temp_path = path.with_extension("tmp");

    {
        let mut file = fs::File::create(&temp_path)?;
        file.write_all(contents.as_ref())?;
        file.sync_all()?;
    }

    fs::rename(&temp_path, path)?;
    Ok(())
}

/// Milliseconds since the Unix epoch.
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
