//! Extern registry bridge
//!
//! Startup-time binding of bytecode-referenced symbol names to marshalling
//! adapters. Registration happens once per symbol before validation; the
//! binding set is closed before any bytecode executes and never re-checked
//! per call.

use crate::diag::Diagnostics;
use crate::value::RuntimeError;
use crate::vm::Vm;
use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

/// A VM-callable adapter. Communicates exclusively through the operand
/// stack (plus mutation of ref cells already on it).
pub type ExternFn = Arc<dyn Fn(&mut Vm) -> Result<(), RuntimeError>>;

struct Binding {
    func: ExternFn,
    /// Quiet bindings skip the "registered but never referenced" warning.
    quiet: bool,
}

/// Symbol-name to adapter bindings for one VM instance.
#[derive(Default)]
pub struct ExternRegistry {
    bindings: HashMap<String, Binding>,
}

impl ExternRegistry {
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    /// Bind `name` to `func`. Unreferenced loud bindings are reported as a
    /// warning during [`validate`](Self::validate).
    pub fn register(&mut self, name: impl Into<String>, func: ExternFn) {
        self.bindings
            .insert(name.into(), Binding { func, quiet: false });
    }

    /// Like [`register`](Self::register) but suppresses the unreferenced
    /// diagnostic. Used for bulk library installs where most symbols go
    /// unused by any given program.
    pub fn register_quiet(&mut self, name: impl Into<String>, func: ExternFn) {
        self.bindings
            .insert(name.into(), Binding { func, quiet: true });
    }

    /// Fail fast if any referenced symbol has no binding.
    ///
    /// Names the first missing symbol (referenced set is ordered, so the
    /// report is deterministic). Also warns about loud bindings the program
    /// never references; that is informational only.
    pub fn validate(
        &self,
        referenced: &BTreeSet<String>,
        diag: &Diagnostics,
    ) -> Result<(), RuntimeError> {
        for name in referenced {
            if !self.bindings.contains_key(name) {
                return Err(RuntimeError::UnboundExtern { name: name.clone() });
            }
        }
        let mut unused: Vec<&str> = self
            .bindings
            .iter()
            .filter(|(name, binding)| !binding.quiet && !referenced.contains(*name))
            .map(|(name, _)| name.as_str())
            .collect();
        unused.sort_unstable();
        for name in unused {
            diag.warn(&format!("extern '{}' registered but never referenced", name));
        }
        Ok(())
    }

    /// Execution-time lookup.
    pub fn get(&self, name: &str) -> Option<ExternFn> {
        self.bindings.get(name).map(|b| b.func.clone())
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}
