//! Backups and atomic writes

use std::fs::{self, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use chrono::Local;

const BACKUP_MARKER: &str = ".bak.";

/// Timestamped sibling path `<file>.bak.<YYYYmmddHHMMSSmmm>`, never an existing file.
pub fn backup_path_for(file: &Path) -> PathBuf {
    let stamp = Local::now().format("%Y%m%d%H%M%S%3f").to_string();
    let base = format!("{}{}{}", file.display(), BACKUP_MARKER, stamp);
    let mut candidate = PathBuf::from(&base);
    let mut n = 1;
    while candidate.exists() {
        n += 1;
        candidate = PathBuf::from(format!("{base}-{n}"));
    }
    candidate
}

/// Original file a backup belongs to.
pub fn original_for_backup(backup: &Path) -> Option<PathBuf> {
    let raw = backup.to_str()?;
    let idx = raw.rfind(BACKUP_MARKER)?;
    (idx > 0).then(|| PathBuf::from(&raw[..idx]))
}

/// Write through a temporary sibling and rename over the target.
///
/// Permissions of an existing target are carried over.
pub fn write_atomic(path: &Path, data: &[u8]) -> io::Result<()> {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "path has no file name"))?;
    let tmp = path.with_file_name(format!(".{file_name}.tapmend-tmp"));
    let permissions = fs::metadata(path).ok().map(|meta| meta.permissions());

    let result = (|| {
        let mut file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(true)
            .open(&tmp)?;
        file.write_all(data)?;
        file.sync_all()?;
        if let Some(permissions) = permissions {
            fs::set_permissions(&tmp, permissions)?;
        }
        fs::rename(&tmp, path)
    })();

    if result.is_err() {
        let _ = fs::remove_file(&tmp);
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_backup_naming_round_trip() {
        let file = Path::new("/repo/pages/login.page.py");
        let backup = backup_path_for(file);
        let name = backup.file_name().unwrap().to_str().unwrap();
        assert!(name.starts_with("login.page.py.bak."));
        let stamp = name.trim_start_matches("login.page.py.bak.");
        assert_eq!(stamp.len(), 17);
        assert!(stamp.chars().all(|c| c.is_ascii_digit()));
        assert_eq!(original_for_backup(&backup).unwrap(), file);
        assert!(original_for_backup(Path::new("/repo/login.py")).is_none());
    }

    #[test]
    fn test_write_atomic_replaces_content() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("a.py");
        fs::write(&path, "old").unwrap();
        write_atomic(&path, b"new").unwrap();
        assert_eq!(fs::read_to_string(&path).unwrap(), "new");
        assert_eq!(fs::read_dir(dir.path()).unwrap().count(), 1);
    }
}
