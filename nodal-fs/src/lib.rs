//! Capability-scoped file helpers for manifests, dispatch lists and logs.
//!
//! Every helper resolves an ambient directory for the target's parent and
//! then works relative to it through `cap-std`, so paths are always UTF-8
//! and never escape the directory they name.
#![forbid(unsafe_code)]

use std::io::{self, Write};
use std::path::Component;

use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8};

/// Read the whole of `path` as UTF-8 text.
pub fn read_utf8_file(path: &Utf8Path) -> io::Result<String> {
    let (dir, name) = parent_dir_and_name(path)?;
    dir.read_to_string(name.as_str())
}

/// Whether the existing entry at `path` is a regular file.
///
/// Fails with [`io::ErrorKind::NotFound`] when nothing exists at `path`.
pub fn file_is_file(path: &Utf8Path) -> io::Result<bool> {
    let (dir, name) = parent_dir_and_name(path)?;
    dir.metadata(name.as_str()).map(|meta| meta.is_file())
}

/// Whether `path` exists and is a regular file. A missing path or parent
/// directory yields `false`.
pub fn is_regular_file(path: &Utf8Path) -> io::Result<bool> {
    match file_is_file(path) {
        Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(false),
        other => other,
    }
}

/// Create or truncate `path` and write `contents`, creating parent
/// directories as needed.
pub fn write_utf8_file(path: &Utf8Path, contents: &str) -> io::Result<()> {
    ensure_parent_dir(path)?;
    let (dir, name) = parent_dir_and_name(path)?;
    dir.write(name.as_str(), contents)
}

/// Append `contents` to `path`, creating the file and its parent directories
/// on first use.
pub fn append_utf8_file(path: &Utf8Path, contents: &str) -> io::Result<()> {
    ensure_parent_dir(path)?;
    let (dir, name) = parent_dir_and_name(path)?;
    let mut options = fs_utf8::OpenOptions::new();
    options.append(true).create(true);
    let mut file = dir.open_with(name.as_str(), &options)?;
    file.write_all(contents.as_bytes())?;
    file.flush()
}

/// Ensure the parent directory of `path` exists.
pub fn ensure_parent_dir(path: &Utf8Path) -> io::Result<()> {
    let Some(parent) = path.parent() else {
        return Ok(());
    };
    if parent.as_str().is_empty() || parent == Utf8Path::new("/") {
        return Ok(());
    }
    let (base, relative) = ambient_base_and_relative(parent)?;
    if relative.as_str().is_empty() {
        return Ok(());
    }
    base.create_dir_all(&relative)
}

/// Open the parent directory of `path` and return it with the file name.
fn parent_dir_and_name(path: &Utf8Path) -> io::Result<(fs_utf8::Dir, String)> {
    let name = path
        .file_name()
        .ok_or_else(|| io::Error::other(format!("{path} does not name a file")))?
        .to_owned();
    let parent = match path.parent() {
        Some(parent) if !parent.as_str().is_empty() => parent,
        _ => Utf8Path::new("."),
    };
    let dir = fs_utf8::Dir::open_ambient_dir(parent, ambient_authority())?;
    Ok((dir, name))
}

/// Split `dir` into an ambient root (drive, `/` or `.`) and the path below it.
fn ambient_base_and_relative(dir: &Utf8Path) -> io::Result<(fs_utf8::Dir, Utf8PathBuf)> {
    let std_dir = dir.as_std_path();
    let (base, relative) = match std_dir.components().next() {
        Some(Component::Prefix(prefix)) => {
            let prefix = prefix
                .as_os_str()
                .to_str()
                .ok_or_else(|| io::Error::other("non-UTF-8 path prefix"))?;
            let base = Utf8PathBuf::from(prefix).join(std::path::MAIN_SEPARATOR.to_string());
            let relative = dir
                .strip_prefix(&base)
                .or_else(|_| dir.strip_prefix(prefix))
                .map_err(|_| io::Error::other(format!("cannot strip {prefix} from {dir}")))?
                .to_owned();
            (base, relative)
        }
        Some(Component::RootDir) => {
            let base = Utf8PathBuf::from(std::path::MAIN_SEPARATOR.to_string());
            let relative = dir
                .strip_prefix(&base)
                .map_err(|_| io::Error::other(format!("cannot strip root from {dir}")))?
                .to_owned();
            (base, relative)
        }
        _ => (Utf8PathBuf::from("."), dir.to_owned()),
    };
    let base = fs_utf8::Dir::open_ambient_dir(&base, ambient_authority())?;
    Ok((base, relative))
}
