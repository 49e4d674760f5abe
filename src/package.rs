//! Package model consumed by the workspace builder.
//!
//! A [`MakePackage`] is the finished product of the scanner: an ordered list
//! of source files, each carrying the make functions it declares in
//! declaration order. The builder treats it as read-only input.

use std::path::PathBuf;

/// An ordered set of make files forming one build unit.
#[derive(Debug, Clone, Default)]
pub struct MakePackage {
    pub files: Vec<MakeFile>,
}

/// A single source file and the make functions it declares, in order.
#[derive(Debug, Clone)]
pub struct MakeFile {
    pub path: PathBuf,
    pub funcs: Vec<MakeFunc>,
}

/// One discovered make-function declaration.
#[derive(Debug, Clone)]
pub struct MakeFunc {
    pub name: String,
    pub line: usize,
}

impl MakePackage {
    /// Total number of make functions across all files.
    pub fn func_count(&self) -> usize {
        self.files.iter().map(|f| f.funcs.len()).sum()
    }
}

impl MakeFile {
    /// Base name the file is staged under inside the workspace. Directory
    /// components are stripped, so base names must be unique per package;
    /// the scanner rejects collisions upstream.
    pub fn base_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }

    /// Module name the generated driver refers to this file by. Stems that
    /// are not valid Rust identifiers are not rejected here; they surface
    /// as compile errors in the build step.
    pub fn module_name(&self) -> String {
        self.path
            .file_stem()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_base_name_strips_directories() {
        let file = MakeFile {
            path: PathBuf::from("ops/deploy/tasks_make.rs"),
            funcs: Vec::new(),
        };
        assert_eq!(file.base_name(), "tasks_make.rs");
        assert_eq!(file.module_name(), "tasks_make");
    }

    #[test]
    fn test_func_count_sums_all_files() {
        let func = |name: &str| MakeFunc {
            name: name.to_string(),
            line: 1,
        };
        let pkg = MakePackage {
            files: vec![
                MakeFile {
                    path: PathBuf::from("a_make.rs"),
                    funcs: vec![func("make_one"), func("make_two")],
                },
                MakeFile {
                    path: PathBuf::from("b_make.rs"),
                    funcs: vec![func("make_three")],
                },
            ],
        };
        assert_eq!(pkg.func_count(), 3);
    }
}
