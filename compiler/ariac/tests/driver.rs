// Test code uses unwrap/expect for clarity - panics provide good test failure messages
#![allow(clippy::unwrap_used, clippy::expect_used)]

//! End-to-end driver tests.
//!
//! These run the `ariac` binary with `--asm-only`, so they need neither
//! nasm nor a C toolchain.

use std::path::{Path, PathBuf};
use std::process::{Command, Output};

use ariac::{build_with, compile_to_asm, Artifacts, CompileError, Options, Toolchain};
use pretty_assertions::assert_eq;

const HELLO: &str = r#"
var greeting = "hello";

func main() {
    println(greeting);
    var total = 0;
    for (var i = 0; i < 10; i += 1) {
        total = total + i;
    }
    println(total);
}
"#;

fn write_source(dir: &Path, name: &str, source: &str) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, source).unwrap();
    path
}

fn ariac(args: &[&str]) -> Output {
    Command::new(env!("CARGO_BIN_EXE_ariac"))
        .args(args)
        .env_remove("RUST_LOG")
        .output()
        .unwrap()
}

// ─── Binary ───

#[test]
fn asm_only_writes_assembly_next_to_input() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(dir.path(), "hello.aria", HELLO);

    let output = ariac(&[input.to_str().unwrap(), "--asm-only"]);
    assert!(output.status.success(), "{}", String::from_utf8_lossy(&output.stderr));

    let asm = std::fs::read_to_string(dir.path().join("hello.asm")).unwrap();
    assert!(asm.starts_with("bits 64\ndefault rel\n"));
    assert!(asm.contains("global main"));
    assert!(asm.contains("aria_main:"));
    assert!(asm.contains("_aria_global_greeting: dq 0"));
    assert!(!dir.path().join("hello.o").exists());
    assert!(!dir.path().join("hello").exists());

    let stdout = String::from_utf8_lossy(&output.stdout);
    assert!(stdout.contains("hello.asm"));
}

#[test]
fn parse_errors_are_reported_with_exit_code_one() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(dir.path(), "bad.aria", "func main() {\n  var = 3;\n}\n");

    let output = ariac(&[input.to_str().unwrap(), "--asm-only"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("[line 2] Error"), "{stderr}");
    assert!(!dir.path().join("bad.asm").exists());
}

#[test]
fn codegen_errors_exit_with_one() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(dir.path(), "ghost.aria", "func main() {\n  var g = new Ghost();\n}\n");

    let output = ariac(&[input.to_str().unwrap(), "--asm-only"]);
    assert_eq!(output.status.code(), Some(1));
    let stderr = String::from_utf8_lossy(&output.stderr);
    assert!(stderr.contains("Ghost"), "{stderr}");
}

#[test]
fn missing_input_file() {
    let dir = tempfile::tempdir().unwrap();
    let missing = dir.path().join("nope.aria");
    let output = ariac(&[missing.to_str().unwrap()]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("could not read"));
}

#[test]
fn no_arguments_prints_usage() {
    let output = ariac(&[]);
    assert_eq!(output.status.code(), Some(1));
    assert!(String::from_utf8_lossy(&output.stderr).contains("Usage: ariac"));
}

// ─── Library ───

#[test]
fn compile_to_asm_is_deterministic() {
    let first = compile_to_asm(HELLO).unwrap();
    let second = compile_to_asm(HELLO).unwrap();
    assert_eq!(first, second);
}

#[test]
fn compile_to_asm_collects_every_parse_error() {
    let err = compile_to_asm("func f() { return 1 }\nvar ;\n").unwrap_err();
    let CompileError::Parse(errors) = err else {
        panic!("expected parse errors, got {err:?}");
    };
    assert!(errors.len() >= 2, "{errors:?}");
}

#[test]
fn build_with_asm_only_skips_the_toolchain() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(dir.path(), "prog.aria", HELLO);
    let options = Options {
        input,
        asm_only: true,
        ..Options::default()
    };
    // Tools that cannot exist: an asm-only build must never run them.
    let tools = Toolchain {
        nasm: "aria-missing-nasm".into(),
        cc: "aria-missing-cc".into(),
    };
    let artifacts = build_with(&options, &tools).unwrap();
    assert_eq!(
        artifacts,
        Artifacts {
            asm: dir.path().join("prog.asm"),
            executable: None,
        }
    );
}

#[test]
fn full_build_reports_missing_runtime_or_tool() {
    let dir = tempfile::tempdir().unwrap();
    let input = write_source(dir.path(), "prog.aria", HELLO);
    let options = Options {
        input,
        runtime_path: Some(dir.path().join("no-runtime-here")),
        ..Options::default()
    };
    let tools = Toolchain {
        nasm: "aria-missing-nasm".into(),
        cc: "aria-missing-cc".into(),
    };
    // Depending on where the test binary lives, a runtime may be found;
    // either way the fake assembler stops the build.
    let err = build_with(&options, &tools).unwrap_err();
    assert!(
        matches!(
            err,
            CompileError::RuntimeNotFound(_) | CompileError::ToolNotFound { .. }
        ),
        "{err:?}"
    );
    assert!(dir.path().join("prog.asm").exists());
}
