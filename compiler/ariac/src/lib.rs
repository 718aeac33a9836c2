//! Aria compiler driver.
//!
//! ```text
//! source ──► aria_parse::parse ──► AST arena
//!                                     │
//!                                     ▼
//!                        aria_codegen::generate ──► <stem>.asm
//!                                                      │ nasm -f elf64
//!                                                      ▼
//!                                                   <stem>.o
//!                                                      │ cc + libaria_rt.a
//!                                                      ▼
//!                                                   <stem>
//! ```

mod error;
pub mod options;
pub mod runtime;
pub mod toolchain;

use std::path::PathBuf;
use std::sync::Once;

pub use error::CompileError;
pub use options::Options;
pub use runtime::{RuntimeConfig, RuntimeNotFound};
pub use toolchain::Toolchain;

/// Files a build produced.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Artifacts {
    pub asm: PathBuf,
    /// `None` for `--asm-only` builds.
    pub executable: Option<PathBuf>,
}

/// Parse and lower one source file to NASM text.
pub fn compile_to_asm(source: &str) -> Result<String, CompileError> {
    let parsed = aria_parse::parse(source);
    if parsed.has_errors() {
        return Err(CompileError::Parse(parsed.errors));
    }
    tracing::debug!(nodes = parsed.arena.len(), "parsed");
    Ok(aria_codegen::generate(&parsed.arena, parsed.program)?)
}

/// Run the whole pipeline for `options`.
pub fn build(options: &Options) -> Result<Artifacts, CompileError> {
    build_with(options, &Toolchain::from_env())
}

pub fn build_with(options: &Options, tools: &Toolchain) -> Result<Artifacts, CompileError> {
    let source = std::fs::read_to_string(&options.input).map_err(|source| CompileError::Read {
        path: options.input.clone(),
        source,
    })?;
    let asm = compile_to_asm(&source)?;

    let asm_path = options.asm_path();
    std::fs::write(&asm_path, asm).map_err(|source| CompileError::Write {
        path: asm_path.clone(),
        source,
    })?;
    tracing::info!(asm = %asm_path.display(), "assembly written");
    if options.asm_only {
        return Ok(Artifacts {
            asm: asm_path,
            executable: None,
        });
    }

    let runtime = RuntimeConfig::detect(options.runtime_path())?;
    let object = options.object_path();
    let executable = options.executable_path();
    tools.assemble(&asm_path, &object)?;
    tools.link(&object, &runtime.library(), &executable)?;
    tracing::info!(executable = %executable.display(), "linked");

    Ok(Artifacts {
        asm: asm_path,
        executable: Some(executable),
    })
}

static TRACING_INIT: Once = Once::new();

/// Install a subscriber when `RUST_LOG` is set.
///
/// `ARIA_LOG_TREE=1` switches to indented, span-nested output.
pub fn init_tracing() {
    TRACING_INIT.call_once(|| {
        use tracing_subscriber::{fmt, prelude::*, EnvFilter};

        if std::env::var("RUST_LOG").is_err() {
            return;
        }
        let filter = EnvFilter::from_default_env();
        if std::env::var_os("ARIA_LOG_TREE").is_some() {
            tracing_subscriber::registry()
                .with(
                    tracing_tree::HierarchicalLayer::new(2)
                        .with_targets(true)
                        .with_writer(std::io::stderr),
                )
                .with(filter)
                .init();
        } else {
            tracing_subscriber::registry()
                .with(
                    fmt::layer()
                        .with_target(true)
                        .with_level(true)
                        .with_writer(std::io::stderr),
                )
                .with(filter)
                .init();
        }
    });
}
