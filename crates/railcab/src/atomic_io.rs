use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::process;

/// Writes `text` to a sibling staging file, then renames it over `path`.
pub(crate) fn write_text_atomic(path: &Path, text: &str) -> io::Result<()> {
    let directory = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => {
            fs::create_dir_all(parent)?;
            parent.to_path_buf()
        }
        _ => PathBuf::new(),
    };

    let staging = directory.join(staging_name(path));
    let result = fs::write(&staging, text).and_then(|()| fs::rename(&staging, path));
    if result.is_err() {
        let _ = fs::remove_file(&staging);
    }
    result
}

/// `.controls.cfg.1234.partial` for `controls.cfg` written by pid 1234.
fn staging_name(path: &Path) -> String {
    let stem = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "settings".to_string());
    format!(".{stem}.{}.partial", process::id())
}
