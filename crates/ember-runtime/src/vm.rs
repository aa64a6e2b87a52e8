//! VM facade
//!
//! The host side of the boundary: one [`Vm`] owns the operand stack, the
//! handle heap, the extern registry, and the constant table, and interprets
//! loaded program functions. Everything runs on a single logical thread;
//! adapters execute synchronously in exactly the order bytecode invokes
//! them, and a blocking adapter suspends the whole VM.

use crate::consts::ConstantTable;
use crate::diag::Diagnostics;
use crate::externs::{ExternFn, ExternRegistry};
use crate::handle::{Finalizer, Handle, HandleKind};
use crate::heap::HandleHeap;
use crate::program::{Op, Program};
use crate::stack::OperandStack;
use crate::value::{NumberCell, RuntimeError, Value};
use std::ffi::c_void;
use std::sync::Arc;

/// Resolved program function, valid for the owning [`Vm`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FunctionId(usize);

/// Virtual machine state.
pub struct Vm {
    stack: OperandStack,
    heap: HandleHeap,
    externs: ExternRegistry,
    consts: ConstantTable,
    diag: Diagnostics,
    program: Program,
    /// Step-level trace diagnostics (the `-d` flag).
    debug: bool,
}

impl Vm {
    /// Create a VM for a loaded program, diagnostics to stderr.
    pub fn new(program: Program) -> Self {
        Self::with_diagnostics(program, Diagnostics::stderr())
    }

    /// Create a VM with a custom diagnostic sink (tests capture warnings
    /// this way).
    pub fn with_diagnostics(program: Program, diag: Diagnostics) -> Self {
        Self {
            stack: OperandStack::new(),
            heap: HandleHeap::new(),
            externs: ExternRegistry::new(),
            consts: ConstantTable::new(&[], diag.clone()),
            diag,
            program,
            debug: false,
        }
    }

    pub fn set_debug(&mut self, debug: bool) {
        self.debug = debug;
    }

    /// Disable or re-enable automatic handle reclamation (`--no-gc`).
    pub fn set_gc_enabled(&mut self, enabled: bool) {
        self.heap.set_enabled(enabled);
    }

    pub fn diagnostics(&self) -> &Diagnostics {
        &self.diag
    }

    // ===== Constant table =====

    /// Install the constant table (populated from the backend's namespace
    /// during adapter installation).
    pub fn set_constants(&mut self, table: ConstantTable) {
        self.consts = table;
    }

    pub fn resolve_constant(&self, name: &str) -> i64 {
        self.consts.resolve(name)
    }

    // ===== Extern registry =====

    pub fn register_extern(&mut self, name: impl Into<String>, func: ExternFn) {
        self.externs.register(name, func);
    }

    pub fn register_extern_quiet(&mut self, name: impl Into<String>, func: ExternFn) {
        self.externs.register_quiet(name, func);
    }

    /// Startup validation: every extern symbol the program references must
    /// be bound. Call once, before execution.
    pub fn validate_externs(&self) -> Result<(), RuntimeError> {
        self.externs
            .validate(&self.program.referenced_externs(), &self.diag)
    }

    // ===== Operand stack =====

    pub fn push(&mut self, value: Value) {
        self.stack.push(value);
    }

    pub fn pop(&mut self) -> Result<Value, RuntimeError> {
        self.stack.pop()
    }

    pub fn push_number(&mut self, n: f64) {
        self.stack.push(Value::Number(n));
    }

    pub fn pop_number(&mut self) -> Result<f64, RuntimeError> {
        self.stack.pop_number()
    }

    pub fn pop_string(&mut self) -> Result<Arc<String>, RuntimeError> {
        self.stack.pop_string()
    }

    pub fn pop_ref(&mut self) -> Result<NumberCell, RuntimeError> {
        self.stack.pop_ref()
    }

    pub fn pop_handle(&mut self, expected: HandleKind) -> Result<Handle, RuntimeError> {
        self.stack.pop_handle(expected)
    }

    /// Current operand-stack depth.
    pub fn stack_depth(&self) -> usize {
        self.stack.len()
    }

    /// Wrap a freshly allocated native resource and push its handle.
    ///
    /// Fails without pushing if the pointer is null or already owned.
    pub fn push_native(
        &mut self,
        raw: *mut c_void,
        kind: HandleKind,
        parent: Option<Handle>,
        finalizer: Option<Finalizer>,
    ) -> Result<(), RuntimeError> {
        let handle = self.heap.wrap(raw, kind, parent, finalizer)?;
        self.stack.push(Value::Handle(handle));
        Ok(())
    }

    // ===== Collection =====

    /// Finalize every handle unreachable from VM code. Runs automatically
    /// after each extern call; exposed for embedders and tests.
    pub fn collect(&mut self) -> usize {
        self.heap.collect()
    }

    /// Number of handles still registered with the heap.
    pub fn live_handles(&self) -> usize {
        self.heap.len()
    }

    /// Shutdown: drop all VM-visible references, then finalize everything.
    pub fn shutdown(&mut self) {
        self.stack.clear();
        self.heap.finalize_all();
    }

    // ===== Execution =====

    pub fn resolve_function(&self, name: &str) -> Result<FunctionId, RuntimeError> {
        self.program
            .function_index(name)
            .map(FunctionId)
            .ok_or_else(|| RuntimeError::UnknownFunction {
                name: name.to_string(),
            })
    }

    /// Interpret one program function.
    ///
    /// `arg_count` values are expected on the stack for the callee to
    /// consume; the harness calling convention leaves them in place. After
    /// every extern call the heap collects, which is where finalizers fire.
    pub fn call_function(
        &mut self,
        id: FunctionId,
        arg_count: usize,
    ) -> Result<(), RuntimeError> {
        debug_assert!(self.stack.len() >= arg_count);
        let function = self.program.functions[id.0].clone();
        let mut locals: Vec<Option<Value>> = Vec::new();

        for (ip, op) in function.ops.iter().enumerate() {
            if self.debug {
                self.diag.trace(&format!("{}:{} {:?}", function.name, ip, op));
            }
            match op {
                Op::PushNumber(n) => self.stack.push(Value::Number(*n)),
                Op::PushString(s) => self.stack.push(Value::string(s.clone())),
                Op::NewRef => self.stack.push(Value::Ref(NumberCell::new(0.0))),
                Op::ReadRef => {
                    let cell = self.stack.pop_ref()?;
                    self.stack.push(Value::Number(cell.get()));
                }
                Op::StoreLocal(index) => {
                    let value = self.stack.pop()?;
                    if locals.len() <= *index {
                        locals.resize(*index + 1, None);
                    }
                    locals[*index] = Some(value);
                }
                Op::LoadLocal(index) => {
                    let value = locals
                        .get(*index)
                        .and_then(|slot| slot.clone())
                        .ok_or(RuntimeError::UndefinedLocal { index: *index })?;
                    self.stack.push(value);
                }
                Op::CallExtern(name) => {
                    let adapter = self
                        .externs
                        .get(name)
                        .ok_or_else(|| RuntimeError::UnknownExtern { name: name.clone() })?;
                    adapter(self)?;
                    self.heap.collect();
                }
                Op::Call(name) => {
                    let callee = self.resolve_function(name)?;
                    self.call_function(callee, 0)?;
                }
                Op::Pop => {
                    self.stack.pop()?;
                }
                Op::Return => break,
            }
        }

        // Locals may have held the last reference to a handle.
        drop(locals);
        self.heap.collect();
        Ok(())
    }
}
