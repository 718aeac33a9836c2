//! Function-level emission.
//!
//! Values flow through `rax`. Intermediate operands are pushed on the
//! machine stack, so the emitter tracks how many 8-byte pushes are
//! outstanding and pads every call to keep `rsp` 16-byte aligned.

use std::collections::BTreeSet;
use std::fmt::Write;

use aria_ir::{AstArena, BinaryOp, Name, NodeId, NodeKind, SymbolId, UnaryOp};
use aria_stack::ensure_sufficient_stack;
use smallvec::SmallVec;

use crate::program::{code_symbol, global_symbol, ProgramInfo, RUNTIME_SYMBOLS};
use crate::regalloc::{linear_scan, Allocation};
use crate::{liveness, CodegenError};

/// Integer argument registers of the System V calling convention.
pub(crate) const ARG_REGS: [&str; 6] = ["rdi", "rsi", "rdx", "rcx", "r8", "r9"];

type Result<T = ()> = std::result::Result<T, CodegenError>;

/// Write one indented instruction.
macro_rules! asm {
    ($cg:expr, $($fmt:tt)*) => {
        writeln!($cg.text, "    {}", format_args!($($fmt)*))
    };
}

/// Loop labels for `continue` and `break`.
#[derive(Clone, Copy)]
struct LoopLabels {
    cont: u32,
    end: u32,
}

pub(crate) struct Codegen<'a> {
    arena: &'a AstArena,
    info: &'a ProgramInfo,
    pub(crate) text: String,
    /// Referenced symbols that neither the program nor the runtime define.
    pub(crate) undefined: BTreeSet<String>,
    next_label: u32,
    alloc: Allocation,
    /// Outstanding 8-byte pushes since the statement-level stack pointer.
    depth: u32,
    loops: Vec<LoopLabels>,
}

impl<'a> Codegen<'a> {
    pub(crate) fn new(arena: &'a AstArena, info: &'a ProgramInfo) -> Self {
        Codegen {
            arena,
            info,
            text: String::new(),
            undefined: BTreeSet::new(),
            next_label: 0,
            alloc: Allocation::default(),
            depth: 0,
            loops: Vec::new(),
        }
    }

    fn label(&mut self) -> u32 {
        let n = self.next_label;
        self.next_label += 1;
        n
    }

    // ─── Functions ───

    /// The process entry point: runtime setup, globals, then `aria_main`.
    pub(crate) fn entry(&mut self, program: Option<NodeId>) -> Result {
        let arena = self.arena;
        self.alloc = Allocation::default();
        self.depth = 0;

        writeln!(self.text, "main:")?;
        asm!(self, "push rbp")?;
        asm!(self, "mov rbp, rsp")?;
        asm!(self, "mov rdi, rbp")?;
        asm!(self, "call aria_runtime_init")?;

        let globals: Vec<(Name, Option<NodeId>)> = arena
            .list(program)
            .filter_map(|decl| match *arena.kind(decl) {
                NodeKind::VarDecl { name, init, .. } => Some((name, init)),
                _ => None,
            })
            .collect();

        for &(name, _) in &globals {
            asm!(self, "lea rdi, [rel {}]", global_symbol(arena.name(name)))?;
            asm!(self, "call aria_register_global_root")?;
        }
        for &(name, init) in &globals {
            self.expression_or_null(init)?;
            asm!(self, "mov [rel {}], rax", global_symbol(arena.name(name)))?;
        }

        if self.info.has_main {
            asm!(self, "call {}", code_symbol("aria_main"))?;
        }
        asm!(self, "xor edi, edi")?;
        asm!(self, "call exit")?;
        writeln!(self.text)?;
        Ok(())
    }

    /// Emit one function or method.
    pub(crate) fn function(&mut self, decl: NodeId) -> Result {
        let arena = self.arena;
        let NodeKind::FuncDecl {
            name, params, body, ..
        } = *arena.kind(decl)
        else {
            return Ok(());
        };
        let symbol = arena.name(name);

        let intervals = liveness::analyze(arena, params, body);
        self.alloc = linear_scan(&intervals);
        self.depth = 0;
        self.loops.clear();

        tracing::debug!(
            function = symbol,
            intervals = intervals.len(),
            registers = self.alloc.saved().len(),
            spills = self.alloc.spill_slots(),
            "compiling function"
        );

        writeln!(self.text, "{}:", code_symbol(symbol))?;
        asm!(self, "push rbp")?;
        asm!(self, "mov rbp, rsp")?;
        self.safepoint_poll(true)?;
        let saved: SmallVec<[&str; 5]> = self.alloc.saved().iter().map(|r| r.name()).collect();
        for reg in &saved {
            asm!(self, "push {reg}")?;
        }
        asm!(self, "sub rsp, {}", self.alloc.frame_size())?;

        for (j, param) in arena.list(params).enumerate() {
            let NodeKind::Var { id, .. } = *arena.kind(param) else {
                continue;
            };
            let location = self.location(id)?;
            match ARG_REGS.get(j) {
                Some(reg) => asm!(self, "mov {location}, {reg}")?,
                None => {
                    asm!(self, "mov rax, [rbp+{}]", 16 + 8 * (j - ARG_REGS.len()))?;
                    asm!(self, "mov {location}, rax")?;
                }
            }
        }

        self.statement(body)?;

        asm!(self, "call dyn_new_null")?;
        writeln!(self.text, ".Lret:")?;
        asm!(self, "lea rsp, [rbp-{}]", 8 * saved.len())?;
        for reg in saved.iter().rev() {
            asm!(self, "pop {reg}")?;
        }
        asm!(self, "pop rbp")?;
        asm!(self, "ret")?;
        writeln!(self.text)?;
        Ok(())
    }

    /// Poll the GC suspend flag. At function entry the argument registers
    /// are live and must survive the safepoint call.
    fn safepoint_poll(&mut self, preserve_args: bool) -> Result {
        let n = self.label();
        asm!(self, "cmp dword [rel gc_suspend_request], 0")?;
        asm!(self, "je .Lsafe_{n}")?;
        if preserve_args {
            for reg in ARG_REGS {
                asm!(self, "push {reg}")?;
            }
        }
        asm!(self, "call gc_enter_safepoint")?;
        if preserve_args {
            for reg in ARG_REGS.iter().rev() {
                asm!(self, "pop {reg}")?;
            }
        }
        writeln!(self.text, ".Lsafe_{n}:")?;
        Ok(())
    }

    // ─── Statements ───

    fn statement(&mut self, node: NodeId) -> Result {
        ensure_sufficient_stack(|| self.statement_inner(node))
    }

    fn statement_inner(&mut self, node: NodeId) -> Result {
        let arena = self.arena;
        match *arena.kind(node) {
            NodeKind::VarDecl { id, init, .. } => {
                self.expression_or_null(init)?;
                let location = self.location(id)?;
                asm!(self, "mov {location}, rax")?;
            }
            NodeKind::Block { first } => {
                for stmt in arena.list(first) {
                    self.statement(stmt)?;
                }
            }
            NodeKind::If {
                cond,
                then_branch,
                else_branch,
            } => {
                let (otherwise, end) = (self.label(), self.label());
                self.expression(cond)?;
                self.test_truthy()?;
                asm!(self, "jz .Lelse_{otherwise}")?;
                self.statement(then_branch)?;
                asm!(self, "jmp .Lend_{end}")?;
                writeln!(self.text, ".Lelse_{otherwise}:")?;
                if let Some(else_branch) = else_branch {
                    self.statement(else_branch)?;
                }
                writeln!(self.text, ".Lend_{end}:")?;
            }
            NodeKind::While { cond, body, step } => {
                let (top, cont, end) = (self.label(), self.label(), self.label());
                writeln!(self.text, ".Lloop_{top}:")?;
                self.safepoint_poll(false)?;
                self.expression(cond)?;
                self.test_truthy()?;
                asm!(self, "jz .Lend_{end}")?;

                self.loops.push(LoopLabels { cont, end });
                let body_result = self.statement(body);
                self.loops.pop();
                body_result?;

                writeln!(self.text, ".Lcont_{cont}:")?;
                if let Some(step) = step {
                    self.expression(step)?;
                }
                asm!(self, "jmp .Lloop_{top}")?;
                writeln!(self.text, ".Lend_{end}:")?;
            }
            NodeKind::Return { value } => {
                self.expression_or_null(value)?;
                asm!(self, "jmp .Lret")?;
            }
            NodeKind::Break => {
                let labels = self.innermost_loop("break")?;
                asm!(self, "jmp .Lend_{}", labels.end)?;
            }
            NodeKind::Continue => {
                let labels = self.innermost_loop("continue")?;
                asm!(self, "jmp .Lcont_{}", labels.cont)?;
            }
            NodeKind::FuncDecl { .. } | NodeKind::ClassDecl { .. } => {}
            _ => self.expression(node)?,
        }
        Ok(())
    }

    fn innermost_loop(&self, keyword: &'static str) -> Result<LoopLabels> {
        self.loops
            .last()
            .copied()
            .ok_or(CodegenError::StrayLoopJump { keyword })
    }

    // ─── Expressions ───

    fn expression_or_null(&mut self, node: Option<NodeId>) -> Result {
        match node {
            Some(node) => self.expression(node),
            None => self.call_runtime("dyn_new_null"),
        }
    }

    /// Evaluate `node` into `rax`.
    fn expression(&mut self, node: NodeId) -> Result {
        ensure_sufficient_stack(|| self.expression_inner(node))
    }

    fn expression_inner(&mut self, node: NodeId) -> Result {
        let arena = self.arena;
        match *arena.kind(node) {
            NodeKind::Int(value) => {
                asm!(self, "mov rdi, {value}")?;
                self.call_runtime("dyn_new_int")?;
            }
            NodeKind::Float(value) => {
                asm!(self, "mov rdi, 0x{:016x}", value.to_bits())?;
                self.call_runtime("dyn_new_float")?;
            }
            NodeKind::Bool(value) => {
                asm!(self, "mov edi, {}", u8::from(value))?;
                self.call_runtime("dyn_new_bool")?;
            }
            NodeKind::Null => self.call_runtime("dyn_new_null")?,
            NodeKind::Str(text) => {
                let data = self.string_data(arena.name(text))?;
                asm!(self, "lea rdi, [rel .Lstr_{data}]")?;
                self.call_runtime("dyn_new_str")?;
            }
            NodeKind::Array { elements, .. } => {
                self.call_runtime("list_new")?;
                for element in arena.list(elements) {
                    self.push("rax")?;
                    self.expression(element)?;
                    asm!(self, "mov rsi, rax")?;
                    asm!(self, "mov rdi, [rsp]")?;
                    self.call_runtime("list_push")?;
                    self.pop("rax")?;
                }
            }
            NodeKind::Var { name, id } => self.load_variable(name, id)?,
            NodeKind::Assign { name, id, value } => {
                self.expression(value)?;
                self.store_variable(name, id)?;
            }
            NodeKind::Binary { op, left, right } => self.binary(op, left, right)?,
            NodeKind::Unary { op, operand } => {
                self.expression(operand)?;
                asm!(self, "mov rdi, rax")?;
                self.call_runtime(match op {
                    UnaryOp::Neg => "dyn_neg",
                    UnaryOp::Not => "dyn_not",
                })?;
            }
            NodeKind::Ternary {
                cond,
                then_expr,
                else_expr,
            } => {
                let (otherwise, end) = (self.label(), self.label());
                self.expression(cond)?;
                self.test_truthy()?;
                asm!(self, "jz .Ltern_{otherwise}")?;
                self.expression(then_expr)?;
                asm!(self, "jmp .Ltern_end_{end}")?;
                writeln!(self.text, ".Ltern_{otherwise}:")?;
                self.expression(else_expr)?;
                writeln!(self.text, ".Ltern_end_{end}:")?;
            }
            NodeKind::Call { callee, args, .. } => self.call(callee, args)?,
            NodeKind::Get { object, name } => {
                let key = self.string_data(arena.name(name))?;
                self.expression(object)?;
                asm!(self, "mov rdi, rax")?;
                asm!(self, "lea rsi, [rel .Lstr_{key}]")?;
                self.call_runtime("aria_obj_get")?;
            }
            NodeKind::Set {
                object,
                name,
                value,
            } => {
                let key = self.string_data(arena.name(name))?;
                self.expression(object)?;
                self.push("rax")?;
                self.expression(value)?;
                asm!(self, "mov rdx, rax")?;
                self.pop("rdi")?;
                asm!(self, "lea rsi, [rel .Lstr_{key}]")?;
                self.call_runtime("aria_obj_set")?;
            }
            NodeKind::IndexGet { object, index } => {
                self.expression(object)?;
                self.push("rax")?;
                self.expression(index)?;
                asm!(self, "mov rsi, rax")?;
                self.pop("rdi")?;
                self.call_runtime("list_get")?;
            }
            NodeKind::IndexSet {
                object,
                index,
                value,
            } => {
                self.expression(object)?;
                self.push("rax")?;
                self.expression(index)?;
                self.push("rax")?;
                self.expression(value)?;
                asm!(self, "mov rdx, rax")?;
                self.pop("rsi")?;
                self.pop("rdi")?;
                self.call_runtime("list_set")?;
            }
            NodeKind::New { class } => self.new_instance(class)?,
            // Statements never reach expression position.
            NodeKind::VarDecl { .. }
            | NodeKind::Block { .. }
            | NodeKind::If { .. }
            | NodeKind::While { .. }
            | NodeKind::Return { .. }
            | NodeKind::Break
            | NodeKind::Continue
            | NodeKind::FuncDecl { .. }
            | NodeKind::ClassDecl { .. } => self.statement_inner(node)?,
        }
        Ok(())
    }

    fn binary(&mut self, op: BinaryOp, left: NodeId, right: NodeId) -> Result {
        if op.is_short_circuit() {
            // The result is whichever operand decided the outcome.
            let end = self.label();
            self.expression(left)?;
            self.push("rax")?;
            self.test_truthy()?;
            self.pop("rax")?;
            match op {
                BinaryOp::And => asm!(self, "jz .Lsc_end_{end}")?,
                _ => asm!(self, "jnz .Lsc_end_{end}")?,
            }
            self.expression(right)?;
            writeln!(self.text, ".Lsc_end_{end}:")?;
            return Ok(());
        }

        self.expression(left)?;
        self.push("rax")?;
        self.expression(right)?;
        asm!(self, "mov rsi, rax")?;
        self.pop("rdi")?;
        self.call_runtime(match op {
            BinaryOp::Add => "dyn_add",
            BinaryOp::Sub => "dyn_sub",
            BinaryOp::Mul => "dyn_mul",
            BinaryOp::Div => "dyn_div",
            BinaryOp::Mod => "dyn_mod",
            BinaryOp::Eq => "dyn_eq",
            BinaryOp::NotEq => "dyn_neq",
            BinaryOp::Lt => "dyn_lt",
            BinaryOp::LtEq => "dyn_le",
            BinaryOp::Gt => "dyn_gt",
            BinaryOp::GtEq => "dyn_ge",
            BinaryOp::And | BinaryOp::Or => "dyn_truthy",
        })
    }

    /// Call a user function, a function value, or a method.
    fn call(&mut self, callee: NodeId, args: Option<NodeId>) -> Result {
        let arena = self.arena;
        let args: SmallVec<[NodeId; 8]> = arena.list(args).collect();
        let method = match *arena.kind(callee) {
            NodeKind::Get { object, name } => Some((object, name)),
            _ => None,
        };
        let direct = match *arena.kind(callee) {
            NodeKind::Var { name, id } if id.is_unresolved() && !self.info.is_global(name) => {
                Some(arena.name(name))
            }
            _ => None,
        };

        let total = args.len() + usize::from(method.is_some());
        let stack_args = u32::try_from(total.saturating_sub(ARG_REGS.len())).unwrap_or(u32::MAX);
        let pad = (self.depth + stack_args) % 2 == 1;
        if pad {
            asm!(self, "sub rsp, 8")?;
            self.depth += 1;
        }

        for &arg in args.iter().rev() {
            self.expression(arg)?;
            self.push("rax")?;
        }

        if let Some((object, name)) = method {
            let key = self.string_data(arena.name(name))?;
            self.expression(object)?;
            self.push("rax")?;
            asm!(self, "mov rdi, rax")?;
            asm!(self, "lea rsi, [rel .Lstr_{key}]")?;
            self.call_runtime("aria_obj_get")?;
            asm!(self, "mov r10, rax")?;
        } else if let Some(symbol) = direct {
            self.note_reference(symbol);
        } else {
            self.expression(callee)?;
            asm!(self, "mov r10, rax")?;
        }

        for reg in ARG_REGS.iter().take(total) {
            self.pop(reg)?;
        }
        match direct {
            Some(symbol) => asm!(self, "call {}", code_symbol(symbol))?,
            None => asm!(self, "call r10")?,
        }

        let cleanup = stack_args + u32::from(pad);
        if cleanup > 0 {
            asm!(self, "add rsp, {}", 8 * cleanup)?;
            self.depth -= cleanup;
        }
        Ok(())
    }

    /// `new C()`: a fresh object with every method of `C` stored under its
    /// source name.
    fn new_instance(&mut self, class: Name) -> Result {
        let arena = self.arena;
        let methods = self
            .info
            .class_methods(class)
            .ok_or_else(|| CodegenError::UnknownClass {
                name: arena.name(class).to_owned(),
            })?;

        self.call_runtime("aria_alloc_object")?;
        self.push("rax")?;
        for method in arena.list(methods) {
            let NodeKind::FuncDecl {
                name, source_name, ..
            } = *arena.kind(method)
            else {
                continue;
            };
            let key = self.string_data(arena.name(source_name))?;
            asm!(self, "mov rdi, [rsp]")?;
            asm!(self, "lea rsi, [rel .Lstr_{key}]")?;
            asm!(self, "lea rdx, [rel {}]", code_symbol(arena.name(name)))?;
            self.call_runtime("aria_obj_set")?;
        }
        self.pop("rax")
    }

    // ─── Variables ───

    fn location(&self, id: SymbolId) -> Result<crate::Location> {
        let var = id.as_local().ok_or(CodegenError::Unallocated { id: 0 })?;
        self.alloc
            .location(var)
            .ok_or(CodegenError::Unallocated { id: var })
    }

    fn load_variable(&mut self, name: Name, id: SymbolId) -> Result {
        let symbol = self.arena.name(name);
        if id.as_local().is_some() {
            let location = self.location(id)?;
            asm!(self, "mov rax, {location}")?;
        } else if id.is_global() || self.info.is_global(name) {
            asm!(self, "mov rax, [rel {}]", global_symbol(symbol))?;
        } else {
            // A bare function name evaluates to its address.
            self.note_reference(symbol);
            asm!(self, "lea rax, [rel {}]", code_symbol(symbol))?;
        }
        Ok(())
    }

    fn store_variable(&mut self, name: Name, id: SymbolId) -> Result {
        let symbol = self.arena.name(name);
        if id.as_local().is_some() {
            let location = self.location(id)?;
            asm!(self, "mov {location}, rax")?;
        } else if id.is_global() || self.info.is_global(name) {
            asm!(self, "mov [rel {}], rax", global_symbol(symbol))?;
        } else {
            return Err(CodegenError::UndefinedVariable {
                name: symbol.to_owned(),
            });
        }
        Ok(())
    }

    fn note_reference(&mut self, symbol: &str) {
        if !self.info.defines_function(symbol) && !RUNTIME_SYMBOLS.contains(&symbol) {
            self.undefined.insert(symbol.to_owned());
        }
    }

    // ─── Stack discipline ───

    fn push(&mut self, reg: &str) -> Result {
        asm!(self, "push {reg}")?;
        self.depth += 1;
        Ok(())
    }

    fn pop(&mut self, reg: &str) -> Result {
        asm!(self, "pop {reg}")?;
        self.depth -= 1;
        Ok(())
    }

    /// Call a runtime function with `rsp` 16-byte aligned.
    fn call_runtime(&mut self, symbol: &str) -> Result {
        if self.depth % 2 == 1 {
            asm!(self, "sub rsp, 8")?;
            asm!(self, "call {symbol}")?;
            asm!(self, "add rsp, 8")?;
        } else {
            asm!(self, "call {symbol}")?;
        }
        Ok(())
    }

    /// Convert `rax` to a raw 0/1 in `rax` and set the flags from it.
    fn test_truthy(&mut self) -> Result {
        asm!(self, "mov rdi, rax")?;
        self.call_runtime("dyn_truthy")?;
        asm!(self, "test rax, rax")?;
        Ok(())
    }

    /// Emit NUL-terminated bytes inline, jumped over, and return the label
    /// number of the data.
    fn string_data(&mut self, text: &str) -> Result<u32> {
        let (skip, data) = (self.label(), self.label());
        asm!(self, "jmp .Lstr_end_{skip}")?;
        write!(self.text, ".Lstr_{data}: db ")?;
        for byte in text.bytes() {
            write!(self.text, "{byte},")?;
        }
        writeln!(self.text, "0")?;
        writeln!(self.text, ".Lstr_end_{skip}:")?;
        Ok(data)
    }
}
