//! Driver-source generation.
//!
//! The builder renders one `makemain.rs` into every workspace: a `mod`
//! declaration per staged file, a registry literal listing every make
//! function in file order then declaration order, the selection runtime,
//! and the entry point. The generated program is compiled by bare `rustc`,
//! so the selection runtime in [`runner`] is written against std only and
//! embedded verbatim. The embedded source is the same file that is
//! unit-tested and benchmarked in this crate.

use crate::package::MakePackage;

mod runner;

pub use runner::{Pattern, PatternError, Selector};

/// Fixed name of the generated driver source inside a workspace.
pub const DRIVER_FILE: &str = "makemain.rs";

const RUNNER_SRC: &str = include_str!("runner.rs");

/// Renders the driver source for `pkg`.
///
/// The registry order is deterministic: files in package order, functions in
/// declaration order. Function and file-stem names are substituted without
/// validation; a name that is not a valid Rust identifier fails downstream
/// in the compile step.
pub fn render(pkg: &MakePackage) -> String {
    let mut mods = String::new();
    let mut entries = String::new();
    for file in &pkg.files {
        let stem = file.module_name();
        mods.push_str(&format!("mod {stem};\n"));
        for func in &file.funcs {
            entries.push_str(&format!("    (\"{0}\", {stem}::{0}),\n", func.name));
        }
    }
    format!(
        r#"// Generated by rmake. Do not edit.
#![allow(dead_code)]

{mods}
static MAKES: &[(&str, fn())] = &[
{entries}];

{RUNNER_SRC}
fn main() {{
    let pattern = std::env::args().nth(1).unwrap_or_default();
    let mut selector = Selector::new();
    let mut ran = 0usize;
    for (name, run) in MAKES.iter().copied() {{
        match selector.select(&pattern, name) {{
            Ok(true) => {{
                println!("--- run {{name}}");
                run();
                ran += 1;
            }}
            Ok(false) => {{}}
            Err(err) => {{
                eprintln!("makemain: {{err}}");
                std::process::exit(2);
            }}
        }}
    }}
    println!("--- done ({{ran}} run)");
}}
"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::package::{MakeFile, MakeFunc, MakePackage};
    use std::path::PathBuf;

    fn sample_package() -> MakePackage {
        let func = |name: &str, line: usize| MakeFunc {
            name: name.to_string(),
            line,
        };
        MakePackage {
            files: vec![
                MakeFile {
                    path: PathBuf::from("ci_make.rs"),
                    funcs: vec![func("make_lint", 3), func("make_test", 9)],
                },
                MakeFile {
                    path: PathBuf::from("deploy_make.rs"),
                    funcs: vec![func("make_deploy", 1)],
                },
            ],
        }
    }

    #[test]
    fn test_render_declares_one_mod_per_file() {
        let src = render(&sample_package());
        assert!(src.contains("mod ci_make;"));
        assert!(src.contains("mod deploy_make;"));
    }

    #[test]
    fn test_render_registry_preserves_order() {
        let src = render(&sample_package());
        let lint = src.find("(\"make_lint\", ci_make::make_lint),").unwrap();
        let test = src.find("(\"make_test\", ci_make::make_test),").unwrap();
        let deploy = src
            .find("(\"make_deploy\", deploy_make::make_deploy),")
            .unwrap();
        assert!(lint < test, "file-internal declaration order lost");
        assert!(test < deploy, "file order lost");
    }

    #[test]
    fn test_render_is_deterministic() {
        let pkg = sample_package();
        assert_eq!(render(&pkg), render(&pkg));
    }

    #[test]
    fn test_render_embeds_selection_runtime() {
        let src = render(&sample_package());
        assert!(src.contains("struct Selector"));
        assert!(src.contains("fn main()"));
    }

    #[test]
    fn test_select_caches_repeated_pattern() {
        let mut selector = Selector::new();
        assert!(selector.select("^make_l", "make_lint").unwrap());
        assert!(!selector.select("^make_l", "make_test").unwrap());
        assert!(!selector.select("^make_l", "make_deploy").unwrap());
        assert_eq!(selector.compile_count(), 1);
    }

    #[test]
    fn test_select_recompiles_per_distinct_pattern() {
        let mut selector = Selector::new();
        selector.select("lint", "make_lint").unwrap();
        selector.select("test", "make_test").unwrap();
        assert_eq!(selector.compile_count(), 2);
        // single-slot cache: going back to the first pattern recompiles
        selector.select("lint", "make_lint").unwrap();
        assert_eq!(selector.compile_count(), 3);
    }

    #[test]
    fn test_select_prefix_anchor() {
        let mut selector = Selector::new();
        assert!(!selector.select("^Ba", "Foo").unwrap());
        assert!(selector.select("^Ba", "Bar").unwrap());
        assert!(selector.select("^Ba", "Baz").unwrap());
    }

    #[test]
    fn test_invalid_pattern_leaves_cache_intact() {
        let mut selector = Selector::new();
        assert!(selector.select("^Ba", "Bar").unwrap());
        let err = selector.select("(", "Bar").unwrap_err();
        assert_eq!(err.pattern(), "(");
        // the valid cached pattern still answers without a recompile
        assert!(selector.select("^Ba", "Baz").unwrap());
        assert_eq!(selector.compile_count(), 1);
    }

    #[test]
    fn test_empty_pattern_matches_everything() {
        let mut selector = Selector::new();
        assert!(selector.select("", "make_anything").unwrap());
        assert!(selector.select("", "").unwrap());
    }

    #[test]
    fn test_pattern_unanchored_search() {
        let pat = Pattern::compile("deploy").unwrap();
        assert!(pat.is_match("make_deploy_prod"));
        assert!(!pat.is_match("make_build"));
    }

    #[test]
    fn test_pattern_end_anchor() {
        let pat = Pattern::compile("prod$").unwrap();
        assert!(pat.is_match("make_deploy_prod"));
        assert!(!pat.is_match("make_prod_deploy"));
    }

    #[test]
    fn test_pattern_repeats_and_classes() {
        let pat = Pattern::compile("^make_[a-z]+_[0-9]$").unwrap();
        assert!(pat.is_match("make_step_1"));
        assert!(!pat.is_match("make_step_12"));
        assert!(!pat.is_match("make__1"));

        let pat = Pattern::compile("a*b").unwrap();
        assert!(pat.is_match("b"));
        assert!(pat.is_match("aaab"));
        assert!(!pat.is_match("aaa"));

        let pat = Pattern::compile("colou?r").unwrap();
        assert!(pat.is_match("color"));
        assert!(pat.is_match("colour"));
    }

    #[test]
    fn test_pattern_repeat_backtracks() {
        // the repeated atom must give characters back for the tail to match
        let pat = Pattern::compile("^a+a$").unwrap();
        assert!(pat.is_match("aa"));
        assert!(!pat.is_match("a"));
    }

    #[test]
    fn test_pattern_negated_class_and_escape() {
        let pat = Pattern::compile("[^0-9]$").unwrap();
        assert!(pat.is_match("make_x"));
        assert!(!pat.is_match("make_7"));

        let pat = Pattern::compile(r"\.rs$").unwrap();
        assert!(pat.is_match("tasks_make.rs"));
        assert!(!pat.is_match("tasks_makeXrs"));
    }

    #[test]
    fn test_pattern_compile_errors() {
        for bad in ["(", ")", "a|b", "{2}", "*", "a**", "+x", "[abc", "[z-a]", "ab\\"] {
            assert!(
                Pattern::compile(bad).is_err(),
                "pattern {bad:?} should not compile"
            );
        }
    }
}
