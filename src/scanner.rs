//! Make-function discovery.
//!
//! The builder consumes a finished [`MakePackage`]; this module produces
//! one. A make function is a zero-argument `pub fn make_*()` declared at
//! the top level of a make file (a file named `*_make.rs`). Discovery is
//! textual: signatures the driver cannot actually call (wrong arity hidden
//! behind the same first line, misspelled types) surface later as compile
//! errors in the build step.

use crate::package::{MakeFile, MakeFunc, MakePackage};
use anyhow::{Context, Result, bail};
use regex::Regex;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

/// File-name suffix that marks a source file as a make file.
pub const MAKE_FILE_SUFFIX: &str = "_make.rs";

/// Scans `dir` (one level, sorted by file name) for `*_make.rs` files.
pub fn scan_dir(dir: &Path) -> Result<MakePackage> {
    let mut paths = Vec::new();
    for entry in WalkDir::new(dir)
        .max_depth(1)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if path.is_file()
            && path
                .file_name()
                .is_some_and(|n| n.to_string_lossy().ends_with(MAKE_FILE_SUFFIX))
        {
            paths.push(path.to_owned());
        }
    }
    paths.sort();
    scan_files(&paths)
}

/// Builds a package from an explicit file list, preserving the given order.
///
/// Rejects duplicate base file names (the workspace is flat, so a collision
/// would silently overwrite a staged file) and duplicate make-function
/// names (the registry is a flat name-to-function mapping, so a collision
/// would silently shadow an entry).
pub fn scan_files(paths: &[PathBuf]) -> Result<MakePackage> {
    let mut files = Vec::new();
    let mut seen_funcs: HashSet<String> = HashSet::new();
    let mut seen_bases: HashSet<String> = HashSet::new();
    for path in paths {
        let file = scan_file(path)?;
        if !seen_bases.insert(file.base_name()) {
            bail!(
                "duplicate file name '{}': files are staged flat, by base name",
                file.base_name()
            );
        }
        for func in &file.funcs {
            if !seen_funcs.insert(func.name.clone()) {
                bail!(
                    "duplicate make function '{}' (redeclared in {})",
                    func.name,
                    path.display()
                );
            }
        }
        files.push(file);
    }
    Ok(MakePackage { files })
}

fn scan_file(path: &Path) -> Result<MakeFile> {
    let source =
        fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))?;
    let re = Regex::new(r"^\s*pub\s+fn\s+(make_[A-Za-z0-9_]*)\s*\(\s*\)").unwrap();
    let mut funcs = Vec::new();
    for (idx, line) in source.lines().enumerate() {
        if let Some(caps) = re.captures(line) {
            funcs.push(MakeFunc {
                name: caps[1].to_string(),
                line: idx + 1,
            });
        }
    }
    Ok(MakeFile {
        path: path.to_owned(),
        funcs,
    })
}
