//! # rmake CLI entry point
//!
//! Parses CLI arguments using clap and routes commands to the library:
//!
//! - **Build**: `build`, `run`
//! - **Inspection**: `list`
//! - **Shell**: `completions`

use anyhow::{Context, Result, bail};
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::{Shell, generate};
use colored::*;
use std::fs;
use std::path::{Path, PathBuf};
use std::process::Command;

use rmake::builder;
use rmake::config;
use rmake::package::MakePackage;
use rmake::scanner;

#[derive(Parser)]
#[command(name = "rmake")]
#[command(about = "A selective runner for make functions in Rust sources", version = env!("CARGO_PKG_VERSION"))]
#[command(propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Compile make files into a runner executable
    Build {
        /// Make files to stage (defaults to ./*_make.rs)
        files: Vec<PathBuf>,
    },
    /// Compile make files, then run the functions matching a pattern
    Run {
        /// Selection pattern (empty selects every make function)
        #[arg(default_value = "")]
        pattern: String,
        /// Directory containing the make files
        #[arg(long, default_value = ".")]
        dir: PathBuf,
    },
    /// List discovered make functions
    List {
        /// Make files to scan (defaults to ./*_make.rs)
        files: Vec<PathBuf>,
    },
    /// Generate shell completion scripts
    Completions {
        /// Target shell
        shell: Shell,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    match cli.command {
        Commands::Build { files } => cmd_build(&files),
        Commands::Run { pattern, dir } => cmd_run(&pattern, &dir),
        Commands::List { files } => cmd_list(&files),
        Commands::Completions { shell } => {
            let mut cmd = Cli::command();
            let name = cmd.get_name().to_string();
            generate(shell, &mut cmd, name, &mut std::io::stdout());
            Ok(())
        }
    }
}

fn load_package(files: &[PathBuf], dir: &Path) -> Result<MakePackage> {
    let pkg = if files.is_empty() {
        scanner::scan_dir(dir)?
    } else {
        scanner::scan_files(files)?
    };
    if pkg.files.is_empty() {
        bail!(
            "no make files found in {} (expected *{})",
            dir.display(),
            scanner::MAKE_FILE_SUFFIX
        );
    }
    Ok(pkg)
}

fn cmd_build(files: &[PathBuf]) -> Result<()> {
    let pkg = load_package(files, Path::new("."))?;
    let cfg = config::load(Path::new("."))?;

    println!(
        "   {} Compiling {} make function(s) from {} file(s)...",
        "⚙".blue(),
        pkg.func_count(),
        pkg.files.len()
    );
    let workdir = builder::build(&pkg, &cfg)?;

    println!("{} Build finished", "✓".green());
    println!("   Workspace: {}", workdir.display());
    println!(
        "   Runner:    {}",
        workdir.join(builder::output_name(&cfg)).display()
    );
    Ok(())
}

fn cmd_run(pattern: &str, dir: &Path) -> Result<()> {
    let pkg = load_package(&[], dir)?;
    let cfg = config::load(dir)?;

    let workdir = builder::build(&pkg, &cfg)?;
    let runner = workdir.join(builder::output_name(&cfg));

    println!("{} Running...\n", "▶".green());
    let status = Command::new(&runner)
        .arg(pattern)
        .status()
        .with_context(|| format!("failed to execute {}", runner.display()));

    // The builder leaves the workspace behind; as the caller, we own its
    // cleanup once the runner has finished.
    fs::remove_dir_all(&workdir).ok();

    let status = status?;
    if !status.success() {
        println!("{} Runner exited with failure", "x".red());
        std::process::exit(status.code().unwrap_or(1));
    }
    Ok(())
}

fn cmd_list(files: &[PathBuf]) -> Result<()> {
    let pkg = load_package(files, Path::new("."))?;
    for file in &pkg.files {
        println!("{}", file.path.display().to_string().bold());
        for func in &file.funcs {
            println!("   {}  (line {})", func.name.green(), func.line);
        }
    }
    println!(
        "\n{} make function(s) in {} file(s)",
        pkg.func_count(),
        pkg.files.len()
    );
    Ok(())
}
