//! Content-hash manifest over produced artifacts.

use crate::errors::{PosturaError, PosturaResult};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;
use std::io::Read;
use std::path::Path;
use walkdir::WalkDir;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HashEntry {
    pub path: String,
    pub sha256: String,
    pub bytes: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub entries: Vec<HashEntry>,
    pub count: usize,
}

/// Hash one file in 1 MiB chunks.
pub fn sha256_file(path: &Path) -> PosturaResult<(String, u64)> {
    let mut file = std::fs::File::open(path)
        .map_err(|e| PosturaError::io(e, Some(path.to_path_buf())))?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; 1024 * 1024];
    let mut size = 0u64;
    loop {
        let n = file
            .read(&mut buf)
            .map_err(|e| PosturaError::io(e, Some(path.to_path_buf())))?;
        if n == 0 {
            break;
        }
        hasher.update(&buf[..n]);
        size += n as u64;
    }
    Ok((hex::encode(hasher.finalize()), size))
}

/// Build the manifest over the named artifacts under `root`. Entries are
/// recorded with root-relative paths and sorted, so the manifest itself is
/// reproducible when the artifacts are.
pub fn build_manifest(root: &Path, include: &[&str]) -> PosturaResult<Manifest> {
    let mut files: BTreeSet<std::path::PathBuf> = BTreeSet::new();
    for name in include {
        let target = root.join(name);
        if target.is_dir() {
            for entry in WalkDir::new(&target).into_iter().filter_map(Result::ok) {
                if entry.file_type().is_file() {
                    files.insert(entry.into_path());
                }
            }
        } else if target.is_file() {
            files.insert(target);
        }
    }

    let mut entries = Vec::with_capacity(files.len());
    for file in files {
        let (sha256, bytes) = sha256_file(&file)?;
        let rel = file.strip_prefix(root).unwrap_or(&file);
        entries.push(HashEntry {
            path: rel.to_string_lossy().replace('\\', "/"),
            sha256,
            bytes,
        });
    }

    Ok(Manifest {
        count: entries.len(),
        entries,
    })
}
