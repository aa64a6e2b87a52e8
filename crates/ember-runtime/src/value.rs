//! Runtime value representation
//!
//! The slice of the host VM's value space that crosses the native boundary:
//! - Numbers: immediate IEEE 754 doubles (the VM's only numeric type)
//! - Strings: heap-allocated, reference-counted (Arc<String>), immutable
//! - Refs: mutable number cells with reference semantics (out-parameters)
//! - Handles: managed wrappers around raw native resources

use crate::handle::{Handle, HandleKind};
use std::fmt;
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Mutable number cell with explicit reference semantics.
///
/// All clones point to the same underlying number; mutation through any clone
/// is visible to all others. This is the out-parameter vehicle: a caller
/// pushes cells, an adapter writes results into them, and the caller reads
/// them back after the call returns.
#[derive(Clone, Debug)]
pub struct NumberCell(Arc<Mutex<f64>>);

impl NumberCell {
    pub fn new(value: f64) -> Self {
        NumberCell(Arc::new(Mutex::new(value)))
    }

    pub fn get(&self) -> f64 {
        *self.0.lock().expect("NumberCell lock poisoned")
    }

    pub fn set(&self, value: f64) {
        *self.0.lock().expect("NumberCell lock poisoned") = value;
    }
}

impl PartialEq for NumberCell {
    /// Reference semantics: two cells are equal only if they are the same
    /// allocation, never by content.
    fn eq(&self, other: &Self) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

/// Runtime value type
#[derive(Clone, Debug)]
pub enum Value {
    /// Numeric value (IEEE 754 double-precision)
    Number(f64),
    /// String value (reference-counted, immutable)
    String(Arc<String>),
    /// Mutable object reference with a numeric field (out-parameter cell)
    Ref(NumberCell),
    /// Managed native resource handle
    Handle(Handle),
}

impl Value {
    /// Create a new string value
    pub fn string(s: impl Into<String>) -> Self {
        Value::String(Arc::new(s.into()))
    }

    /// Get the type name of this value
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Ref(_) => "ref",
            Value::Handle(_) => "handle",
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Number(n) => {
                if n.fract() == 0.0 && n.is_finite() {
                    write!(f, "{}", *n as i64)
                } else {
                    write!(f, "{}", n)
                }
            }
            Value::String(s) => write!(f, "{}", s),
            Value::Ref(cell) => write!(f, "ref({})", cell.get()),
            Value::Handle(h) => write!(f, "handle({})", h.kind()),
        }
    }
}

/// Runtime error taxonomy for the native boundary layer.
///
/// Bad stack contents, wrong handle kinds, and dead handles are all
/// explicit variants rather than undefined behavior.
#[derive(Debug, Error)]
pub enum RuntimeError {
    /// Pop from an empty operand stack
    #[error("stack underflow")]
    StackUnderflow,
    /// Wrong value type on the operand stack
    #[error("type error: expected {expected}, got {got}")]
    TypeError {
        expected: &'static str,
        got: &'static str,
    },
    /// Bytecode references an extern symbol with no registered adapter
    #[error("unbound extern '{name}' referenced by program")]
    UnboundExtern { name: String },
    /// Extern invoked at execution time without a binding
    #[error("unknown extern '{name}'")]
    UnknownExtern { name: String },
    /// Program function lookup failed
    #[error("unknown function '{name}'")]
    UnknownFunction { name: String },
    /// Load from a local slot that was never stored
    #[error("undefined local slot {index}")]
    UndefinedLocal { index: usize },
    /// A handle of one resource kind reached an adapter expecting another
    #[error("native handle kind mismatch: expected {expected}, got {got}")]
    HandleKindMismatch {
        expected: HandleKind,
        got: HandleKind,
    },
    /// A handle was used after its finalizer already ran
    #[error("use-after-free of native handle ({kind})")]
    UseAfterFree { kind: HandleKind },
    /// The native library returned a null resource pointer
    #[error("resource creation failed: native call for {kind} returned null")]
    ResourceCreationFailed { kind: HandleKind },
    /// The same raw resource pointer was wrapped twice
    #[error("raw resource {addr:#x} is already owned by a live handle")]
    AlreadyWrapped { addr: usize },
    /// The native library could not be loaded or is missing a symbol
    #[error(transparent)]
    Backend(#[from] crate::backend::BackendError),
}
