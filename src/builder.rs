//! Workspace staging and compilation.
//!
//! One build invocation stages every package file into a fresh temporary
//! directory, renders the driver next to them, and invokes `rustc` once to
//! produce a single executable. The builder never deletes the workspace:
//! the executable lives inside it, so cleanup belongs to the caller, and a
//! failed build leaves whatever was staged in place for diagnosis.

use crate::config::RmakeConfig;
use crate::driver;
use crate::package::MakePackage;
use std::fs;
use std::io;
use std::path::PathBuf;
use std::process::Command;
use thiserror::Error;

/// Failure modes of a single build invocation. None are retried; every
/// failure is terminal for the current build.
#[derive(Debug, Error)]
pub enum BuildError {
    #[error("failed to create build workspace")]
    WorkspaceCreation(#[source] io::Error),
    #[error("failed to stage {file}")]
    FileStaging {
        file: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to write driver source")]
    TemplateRender(#[source] io::Error),
    #[error("failed to invoke compiler '{compiler}'")]
    CompilerSpawn {
        compiler: String,
        #[source]
        source: io::Error,
    },
    #[error("compiler exited with an error")]
    Compilation { stderr: String },
}

/// Name of the executable a build drops inside the workspace.
pub fn output_name(cfg: &RmakeConfig) -> String {
    let base = cfg.build.output.as_deref().unwrap_or("make");
    if cfg!(windows) {
        format!("{base}.exe")
    } else {
        base.to_string()
    }
}

/// Stages `pkg` into a fresh workspace, renders the driver, and compiles
/// the lot with `rustc`. Returns the workspace path; the executable sits
/// inside it under [`output_name`].
pub fn build(pkg: &MakePackage, cfg: &RmakeConfig) -> Result<PathBuf, BuildError> {
    let workdir = tempfile::TempDir::with_prefix("rmake-")
        .map_err(BuildError::WorkspaceCreation)?
        .keep();

    // Stage every source file verbatim under its base name. Directory
    // components are stripped, so same-named files from different
    // directories would overwrite each other here; the scanner rejects
    // such packages before they reach us.
    for file in &pkg.files {
        let staged = workdir.join(file.base_name());
        fs::read(&file.path)
            .and_then(|contents| fs::write(&staged, contents))
            .map_err(|source| BuildError::FileStaging {
                file: file.path.clone(),
                source,
            })?;
    }

    fs::write(workdir.join(driver::DRIVER_FILE), driver::render(pkg))
        .map_err(BuildError::TemplateRender)?;

    // The workspace is handed to the compiler as the subprocess working
    // directory; the harness process itself never changes directory, so
    // concurrent builds from one process stay safe.
    let compiler = cfg.build.compiler.as_deref().unwrap_or("rustc");
    let mut cmd = Command::new(compiler);
    cmd.current_dir(&workdir)
        .arg("--edition")
        .arg(&cfg.build.edition)
        .arg("--cfg")
        .arg("rmake")
        .arg("-o")
        .arg(output_name(cfg))
        .arg(driver::DRIVER_FILE);
    if let Some(flags) = &cfg.build.flags {
        cmd.args(flags);
    }

    let output = cmd.output().map_err(|source| BuildError::CompilerSpawn {
        compiler: compiler.to_string(),
        source,
    })?;
    let stderr = String::from_utf8_lossy(&output.stderr).into_owned();
    if !stderr.is_empty() {
        // forward compiler warnings and errors alike
        eprint!("{stderr}");
    }
    if !output.status.success() {
        return Err(BuildError::Compilation { stderr });
    }

    Ok(workdir)
}
