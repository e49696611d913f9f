//! Package record sources.
//!
//! Everything that materializes [`Package`] records lives here: the
//! local database of installed packages, per-repository sync database
//! trees, cache directories of exploded package entries, and pkgspec
//! resolution for piped input. The filtering engine itself never
//! touches the filesystem.
//!
//! Databases are trees of desc-format entry directories:
//!
//! ```text
//! <db_path>/local/<name-version>/desc      installed packages
//! <db_path>/local/<name-version>/files     owned paths, loaded on demand
//! <db_path>/sync/<repo>/<name-version>/desc
//! <cache_dir>/<name-version>/desc          exploded cache entries
//! ```
//!
//! Per-entry problems (unreadable entry, malformed dependency line,
//! unresolvable pkgspec) warn on stderr and skip; only an unreadable
//! database tree is fatal.

pub mod desc;

use crate::package::Package;
use colored::Colorize;
use std::fs;
use std::io::BufRead;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("Failed to read package database '{path}': {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

pub(crate) fn warn(message: impl AsRef<str>) {
    eprintln!("{} {}", "warning:".yellow().bold(), message.as_ref());
}

/// Installed packages from `<db_path>/local`. A missing tree is an
/// empty set, not an error. Every record gets `repo = "local"`.
pub fn load_local(db_path: &Path, want_files: bool) -> Result<Vec<Package>, SourceError> {
    let dir = db_path.join("local");
    if !dir.exists() {
        return Ok(Vec::new());
    }
    load_db_tree(&dir, Some("local"), want_files)
}

/// Sync packages from `<db_path>/sync/<repo>` for each configured
/// repo, in order. With no repos configured the sync subdirectories
/// are discovered in sorted order. A missing repo tree warns and is
/// skipped.
pub fn load_sync(
    db_path: &Path,
    repos: &[String],
    want_files: bool,
) -> Result<Vec<Package>, SourceError> {
    let sync_dir = db_path.join("sync");
    let repos = if repos.is_empty() {
        discover_repos(&sync_dir)
    } else {
        repos.to_vec()
    };

    let mut packages = Vec::new();
    for repo in &repos {
        let dir = sync_dir.join(repo);
        if !dir.is_dir() {
            warn(format!("could not open sync db '{repo}'"));
            continue;
        }
        packages.extend(load_db_tree(&dir, Some(repo), want_files)?);
    }
    Ok(packages)
}

/// Cache entries from each cache dir, one level deep. Never fatal:
/// unreadable dirs and unloadable entries warn and are skipped.
/// Records get no repo and carry their on-disk path.
pub fn load_cache(cache_dirs: &[PathBuf], want_files: bool) -> Vec<Package> {
    let mut packages = Vec::new();
    for dir in cache_dirs {
        let entries = match sorted_entries(dir) {
            Ok(entries) => entries,
            Err(err) => {
                warn(format!(
                    "could not open cache dir '{}' ({err})",
                    dir.display()
                ));
                continue;
            }
        };
        for entry in entries {
            match load_entry(&entry, want_files) {
                Some(mut pkg) => {
                    pkg.path = Some(entry);
                    packages.push(pkg);
                }
                None => warn(format!("could not load package '{}'", entry.display())),
            }
        }
    }
    packages
}

/// Resolve `sep`-delimited pkgspecs (`name` or `repo/name`) from a
/// reader against already-loaded records; first match in db order
/// wins. Unresolved specs warn and are skipped.
pub fn resolve_specs<'a, R: BufRead>(
    reader: R,
    sep: u8,
    pool: &'a [Package],
) -> std::io::Result<Vec<&'a Package>> {
    let mut resolved = Vec::new();
    for chunk in reader.split(sep) {
        let chunk = chunk?;
        let spec = String::from_utf8_lossy(&chunk);
        let spec = spec.trim();
        if spec.is_empty() {
            continue;
        }
        match find_spec(pool, spec) {
            Some(pkg) => resolved.push(pkg),
            None => warn(format!("could not locate pkg '{spec}'")),
        }
    }
    Ok(resolved)
}

fn find_spec<'a>(pool: &'a [Package], spec: &str) -> Option<&'a Package> {
    let (repo, name) = match spec.split_once('/') {
        Some((repo, name)) => (Some(repo), name),
        None => (None, spec),
    };
    pool.iter().find(|pkg| {
        pkg.name.as_deref() == Some(name)
            && repo.is_none_or(|repo| pkg.repo.as_deref() == Some(repo))
    })
}

fn load_db_tree(
    dir: &Path,
    repo: Option<&str>,
    want_files: bool,
) -> Result<Vec<Package>, SourceError> {
    let entries = sorted_entries(dir).map_err(|source| SourceError::Read {
        path: dir.display().to_string(),
        source,
    })?;

    let mut packages = Vec::new();
    for entry in entries {
        match load_entry(&entry, want_files) {
            Some(mut pkg) => {
                pkg.repo = repo.map(str::to_string);
                packages.push(pkg);
            }
            None => warn(format!("could not load entry '{}'", entry.display())),
        }
    }
    Ok(packages)
}

/// Load one entry directory: `desc` is required, `files` only read
/// when file lists were requested.
fn load_entry(dir: &Path, want_files: bool) -> Option<Package> {
    let text = fs::read_to_string(dir.join("desc")).ok()?;
    let parsed = desc::parse_desc(&text);
    for line in &parsed.bad_deps {
        warn(format!(
            "skipping invalid dependency '{line}' in '{}'",
            dir.display()
        ));
    }

    let mut pkg = parsed.package;
    if want_files && pkg.files.is_none() {
        if let Ok(text) = fs::read_to_string(dir.join("files")) {
            pkg.files = Some(desc::parse_files(&text));
        }
    }
    Some(pkg)
}

fn sorted_entries(dir: &Path) -> std::io::Result<Vec<PathBuf>> {
    let mut entries: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok())
        .map(|entry| entry.path())
        .filter(|path| path.is_dir())
        .collect();
    entries.sort();
    Ok(entries)
}

fn discover_repos(sync_dir: &Path) -> Vec<String> {
    let Ok(entries) = sorted_entries(sync_dir) else {
        return Vec::new();
    };
    entries
        .iter()
        .filter_map(|path| path.file_name())
        .map(|name| name.to_string_lossy().into_owned())
        .collect()
}
