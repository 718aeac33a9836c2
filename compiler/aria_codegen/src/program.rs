//! Whole-program lowering: symbol collection, header, data and entry.

use std::fmt::Write;

use aria_ir::{AstArena, Name, NodeId, NodeKind};
use rustc_hash::{FxHashMap, FxHashSet};

use crate::emit::Codegen;
use crate::CodegenError;

/// Symbols the runtime library exports to generated code.
///
/// Every one of them is declared `extern` in each generated file. The
/// list also doubles as the set of builtins a program may call by name
/// (`print`, `list_len`, `thread_create`, ...).
pub const RUNTIME_SYMBOLS: &[&str] = &[
    // process and GC
    "aria_runtime_init",
    "aria_register_global_root",
    "aria_gc_collect",
    "gc_suspend_request",
    "gc_enter_safepoint",
    "exit",
    // values
    "dyn_new_int",
    "dyn_new_float",
    "dyn_new_str",
    "dyn_new_bool",
    "dyn_new_null",
    "dyn_add",
    "dyn_sub",
    "dyn_mul",
    "dyn_div",
    "dyn_mod",
    "dyn_eq",
    "dyn_neq",
    "dyn_lt",
    "dyn_le",
    "dyn_gt",
    "dyn_ge",
    "dyn_neg",
    "dyn_not",
    "dyn_truthy",
    // containers
    "list_new",
    "list_push",
    "list_get",
    "list_set",
    "list_len",
    "aria_alloc_object",
    "aria_obj_get",
    "aria_obj_set",
    // builtins
    "print",
    "println",
    "thread_create",
    "thread_join",
];

/// Assembly spelling of a function or method the program defines or
/// references. The `$` prefix keeps NASM from reading names such as `add`
/// or `loop` as instructions; the linker sees the bare name.
pub(crate) fn code_symbol(name: &str) -> String {
    if RUNTIME_SYMBOLS.contains(&name) {
        name.to_owned()
    } else {
        format!("${name}")
    }
}

/// Assembly symbol of a top-level variable.
pub(crate) fn global_symbol(name: &str) -> String {
    format!("_aria_global_{name}")
}

/// Program-wide facts the function emitter needs.
#[derive(Debug, Default)]
pub(crate) struct ProgramInfo {
    /// Top-level `var` names, in declaration order.
    globals: Vec<Name>,
    global_set: FxHashSet<Name>,
    /// Emitted function symbols, methods included.
    functions: FxHashSet<String>,
    /// Class name to the head of its method list.
    classes: FxHashMap<Name, Option<NodeId>>,
    pub(crate) has_main: bool,
}

impl ProgramInfo {
    fn collect(arena: &AstArena, program: Option<NodeId>) -> Result<Self, CodegenError> {
        let mut info = ProgramInfo::default();
        for decl in arena.list(program) {
            match *arena.kind(decl) {
                NodeKind::VarDecl { name, .. } => {
                    if info.global_set.insert(name) {
                        info.globals.push(name);
                    }
                }
                NodeKind::FuncDecl { name, .. } => {
                    let symbol = arena.name(name);
                    info.has_main |= symbol == "aria_main";
                    info.define(symbol)?;
                }
                NodeKind::ClassDecl { name, methods } => {
                    info.classes.insert(name, methods);
                    for method in arena.list(methods) {
                        if let NodeKind::FuncDecl { name, .. } = *arena.kind(method) {
                            info.define(arena.name(name))?;
                        }
                    }
                }
                _ => {}
            }
        }
        Ok(info)
    }

    /// Record an emitted function symbol. Runtime exports and the process
    /// entry point cannot be redefined, and each symbol is emitted once.
    fn define(&mut self, symbol: &str) -> Result<(), CodegenError> {
        if symbol == "main" || RUNTIME_SYMBOLS.contains(&symbol) {
            return Err(CodegenError::ReservedName {
                name: symbol.to_owned(),
            });
        }
        if !self.functions.insert(symbol.to_owned()) {
            return Err(CodegenError::DuplicateFunction {
                name: symbol.to_owned(),
            });
        }
        Ok(())
    }

    pub(crate) fn is_global(&self, name: Name) -> bool {
        self.global_set.contains(&name)
    }

    pub(crate) fn defines_function(&self, symbol: &str) -> bool {
        self.functions.contains(symbol)
    }

    /// Method list of a declared class. The inner `None` is a class with
    /// no methods.
    pub(crate) fn class_methods(&self, class: Name) -> Option<Option<NodeId>> {
        self.classes.get(&class).copied()
    }
}

/// Lower a parsed program to NASM source.
///
/// `program` is the head of the top-level declaration list as returned by
/// the parser. The output assembles with `nasm -f elf64` and links against
/// the Aria runtime library.
pub fn generate(arena: &AstArena, program: Option<NodeId>) -> Result<String, CodegenError> {
    let info = ProgramInfo::collect(arena, program)?;
    let mut codegen = Codegen::new(arena, &info);

    codegen.entry(program)?;
    for decl in arena.list(program) {
        match *arena.kind(decl) {
            NodeKind::FuncDecl { .. } => codegen.function(decl)?,
            NodeKind::ClassDecl { methods, .. } => {
                for method in arena.list(methods) {
                    codegen.function(method)?;
                }
            }
            _ => {}
        }
    }

    tracing::debug!(
        globals = info.globals.len(),
        functions = info.functions.len(),
        classes = info.classes.len(),
        externs = codegen.undefined.len(),
        "generated program"
    );

    let mut out = String::with_capacity(codegen.text.len() + 1024);
    writeln!(out, "bits 64")?;
    writeln!(out, "default rel")?;
    writeln!(out)?;
    writeln!(out, "global main")?;
    for symbol in RUNTIME_SYMBOLS.iter().copied().chain(codegen.undefined.iter().map(String::as_str)) {
        writeln!(out, "extern {}", code_symbol(symbol))?;
    }
    writeln!(out)?;

    writeln!(out, "section .data")?;
    for &name in &info.globals {
        writeln!(out, "{}: dq 0", global_symbol(arena.name(name)))?;
    }
    writeln!(out)?;

    writeln!(out, "section .text")?;
    out.push_str(&codegen.text);
    Ok(out)
}
