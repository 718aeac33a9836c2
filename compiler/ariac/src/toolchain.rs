//! External assembler and linker invocation.

use std::ffi::OsString;
use std::path::Path;
use std::process::{Command, Output};

use crate::CompileError;

/// The assembler and C compiler driver used to build executables.
///
/// `ARIA_NASM` and `ARIA_CC` override the defaults (`nasm`, `cc`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Toolchain {
    pub nasm: String,
    pub cc: String,
}

impl Default for Toolchain {
    fn default() -> Self {
        Toolchain {
            nasm: "nasm".to_owned(),
            cc: "cc".to_owned(),
        }
    }
}

impl Toolchain {
    pub fn from_env() -> Self {
        let defaults = Toolchain::default();
        Toolchain {
            nasm: std::env::var("ARIA_NASM").unwrap_or(defaults.nasm),
            cc: std::env::var("ARIA_CC").unwrap_or(defaults.cc),
        }
    }

    /// `nasm -f elf64 <asm> -o <object>`
    pub fn assemble(&self, asm: &Path, object: &Path) -> Result<(), CompileError> {
        let mut cmd = Command::new(&self.nasm);
        cmd.arg("-f").arg("elf64").arg(asm).arg("-o").arg(object);
        check(&self.nasm, run(&self.nasm, &mut cmd)?)
    }

    /// Link `object` against the runtime library, retrying without
    /// `-no-pie` when the driver rejects it.
    pub fn link(&self, object: &Path, runtime: &Path, exe: &Path) -> Result<(), CompileError> {
        let output = run(&self.cc, &mut self.link_command(object, runtime, exe, true))?;
        if output.status.success() {
            return Ok(());
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        if should_retry(&stderr) {
            tracing::debug!(%stderr, "retrying link without -no-pie");
            let retry = run(&self.cc, &mut self.link_command(object, runtime, exe, false))?;
            return check(&self.cc, retry);
        }
        check(&self.cc, output)
    }

    pub fn link_command(&self, object: &Path, runtime: &Path, exe: &Path, no_pie: bool) -> Command {
        let mut cmd = Command::new(&self.cc);
        cmd.args(link_args(object, runtime, exe, no_pie));
        cmd
    }
}

fn link_args(object: &Path, runtime: &Path, exe: &Path, no_pie: bool) -> Vec<OsString> {
    let mut args: Vec<OsString> = Vec::new();
    if no_pie {
        args.push("-no-pie".into());
    }
    args.push("-o".into());
    args.push(exe.into());
    args.push(object.into());
    args.push(runtime.into());
    for lib in ["-lm", "-lpthread", "-ldl"] {
        args.push(lib.into());
    }
    args
}

/// Whether a failed link is worth retrying with fewer flags.
pub fn should_retry(stderr: &str) -> bool {
    ["unrecognized option", "unknown option", "-no-pie"]
        .iter()
        .any(|pattern| stderr.contains(pattern))
}

fn run(tool: &str, cmd: &mut Command) -> Result<Output, CompileError> {
    tracing::debug!(command = ?cmd, "running");
    cmd.output().map_err(|err| CompileError::ToolNotFound {
        tool: tool.to_owned(),
        message: err.to_string(),
    })
}

fn check(tool: &str, output: Output) -> Result<(), CompileError> {
    if output.status.success() {
        Ok(())
    } else {
        Err(CompileError::ToolFailed {
            tool: tool.to_owned(),
            exit_code: output.status.code(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        })
    }
}
