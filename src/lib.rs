//! # rmake - Selective Make-Function Runner
//!
//! rmake is a minimal build/test harness for Rust sources. It discovers
//! zero-argument `pub fn make_*()` routines in `*_make.rs` files, stages the
//! files into a fresh workspace together with a generated driver program,
//! compiles the workspace with `rustc`, and produces an executable that runs
//! every make function whose name matches a caller-supplied pattern.
//!
//! ## Quick Start
//!
//! ```bash
//! # run every make function declared in ./*_make.rs
//! rmake run
//!
//! # run only the deploy tasks
//! rmake run '^make_deploy'
//! ```
//!
//! ## Module Organization
//!
//! - [`scanner`] - make-function discovery in source files
//! - [`package`] - the package model handed to the builder
//! - [`builder`] - workspace staging and compilation
//! - [`driver`] - driver-source generation and selection logic
//! - [`config`] - configuration parsing (`rmake.toml`)

/// Workspace staging and compilation.
pub mod builder;

/// Configuration file parsing (`rmake.toml`).
pub mod config;

/// Driver-source generation and runtime selection logic.
pub mod driver;

/// Package model consumed by the builder.
pub mod package;

/// Make-function discovery.
pub mod scanner;
