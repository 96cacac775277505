//! Snapshot payload suppliers.
//!
//! A snapshot is a `.zip` archive of JSON exports, a directory holding the
//! extracted files, or a single JSON file. Every supplier yields payloads in
//! a fixed order so duplicate-key resolution stays reproducible.

use crate::error::{AppError, Result};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use walkdir::WalkDir;

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Upper bound on the buffer reserved up front for one archive entry.
const MAX_PREALLOCATION: u64 = 1 << 20;

/// One JSON document read from a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Payload {
    /// Stable label used to namespace generic keys
    pub label: String,
    /// Entry name inside the archive, or the file path
    pub name: String,
    pub bytes: Vec<u8>,
}

impl Payload {
    pub fn new(name: impl Into<String>, bytes: Vec<u8>) -> Self {
        let name = name.into();
        Self {
            label: source_label(&name),
            name,
            bytes,
        }
    }
}

/// Read every JSON payload of a snapshot, in archive order.
pub fn read_payloads(path: &Path) -> Result<Vec<Payload>> {
    if path.is_dir() {
        return read_dir(path);
    }
    if has_extension(path, "json") {
        let bytes = std::fs::read(path).map_err(|e| AppError::read(path, e))?;
        return Ok(vec![Payload::new(path.display().to_string(), bytes)]);
    }
    if has_extension(path, "zip") || starts_with_zip_magic(path)? {
        return read_zip(path);
    }
    Err(AppError::UnsupportedInput(path.to_path_buf()))
}

/// Entries are taken in central-directory order.
fn read_zip(path: &Path) -> Result<Vec<Payload>> {
    let file = File::open(path).map_err(|e| AppError::read(path, e))?;
    let mut archive = zip::ZipArchive::new(file)?;

    let mut payloads = Vec::new();
    for index in 0..archive.len() {
        let mut entry = archive.by_index(index)?;
        if entry.is_dir() || !is_json_name(entry.name()) {
            continue;
        }
        let name = entry.name().to_string();
        let mut bytes = Vec::with_capacity(preallocation_hint(entry.size()));
        entry
            .read_to_end(&mut bytes)
            .map_err(|e| AppError::read(path.join(&name), e))?;
        payloads.push(Payload::new(name, bytes));
    }
    Ok(payloads)
}

/// The declared entry size is only a hint; a corrupt header must not drive
/// the allocation.
fn preallocation_hint(declared: u64) -> usize {
    usize::try_from(declared.min(MAX_PREALLOCATION)).unwrap_or(0)
}

/// Files are taken in path order.
fn read_dir(path: &Path) -> Result<Vec<Payload>> {
    let mut payloads = Vec::new();
    for entry in WalkDir::new(path).sort_by_file_name() {
        let entry = entry?;
        if !entry.file_type().is_file() || !is_json_name(&entry.file_name().to_string_lossy()) {
            continue;
        }
        let bytes = std::fs::read(entry.path()).map_err(|e| AppError::read(entry.path(), e))?;
        let name = entry
            .path()
            .strip_prefix(path)
            .unwrap_or(entry.path())
            .display()
            .to_string();
        payloads.push(Payload::new(name, bytes));
    }
    Ok(payloads)
}

fn starts_with_zip_magic(path: &Path) -> Result<bool> {
    let mut file = File::open(path).map_err(|e| AppError::read(path, e))?;
    let mut magic = [0u8; 4];
    match file.read_exact(&mut magic) {
        Ok(()) => Ok(magic == ZIP_MAGIC),
        Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => Ok(false),
        Err(e) => Err(AppError::read(path, e)),
    }
}

fn has_extension(path: &Path, ext: &str) -> bool {
    path.extension()
        .is_some_and(|e| e.to_string_lossy().eq_ignore_ascii_case(ext))
}

fn is_json_name(name: &str) -> bool {
    has_extension(Path::new(name), "json")
}

/// Derive a stable label from an entry name.
///
/// The label is the file stem with any leading export timestamp removed, so
/// `2024/20240101093000_users.json` and `20240301120000_users.json` are both
/// labelled `users`.
pub fn source_label(name: &str) -> String {
    let file_name = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let stem = Path::new(file_name)
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_else(|| file_name.to_string());

    match stem.split_once('_') {
        Some((prefix, rest))
            if !prefix.is_empty()
                && !rest.is_empty()
                && prefix.chars().all(|c| c.is_ascii_digit()) =>
        {
            rest.to_string()
        }
        _ => stem,
    }
}
