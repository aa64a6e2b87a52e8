//! Native handle wrapper
//!
//! A [`Handle`] is the managed wrapper the VM holds for exactly one raw
//! native resource pointer. It owns the pointer and an optional finalizer,
//! carries a kind tag checked at every adapter boundary, and may name a
//! parent handle it depends on (a renderer's owning window). The finalizer
//! runs exactly once, from the handle heap, after the handle becomes
//! unreachable from VM code.

use crate::value::RuntimeError;
use std::ffi::c_void;
use std::fmt;
use std::sync::{Arc, Mutex};

/// Resource kind discriminator.
///
/// Every handle carries a tag; adapters fail with a typed error when a
/// handle of the wrong kind reaches them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HandleKind {
    Window,
    Renderer,
    Event,
}

impl fmt::Display for HandleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            HandleKind::Window => write!(f, "window"),
            HandleKind::Renderer => write!(f, "renderer"),
            HandleKind::Event => write!(f, "event"),
        }
    }
}

/// Release callback, invoked at most once with the wrapped pointer.
pub type Finalizer = Box<dyn FnOnce(*mut c_void)>;

struct NativeHandle {
    raw: *mut c_void,
    kind: HandleKind,
    finalizer: Option<Finalizer>,
    /// Dependency edge: holding the parent here keeps it reachable until
    /// this handle's own finalizer has run.
    parent: Option<Handle>,
    finalized: bool,
}

// The VM and every adapter execute on a single logical thread; the raw
// pointer is only ever dereferenced by the native library on that thread.
unsafe impl Send for NativeHandle {}

/// Managed reference to a native resource.
///
/// Clones are the VM-visible references (operand stack, cells); the handle
/// heap retains one registry clone. A handle whose only remaining reference
/// is the registry is unreachable from VM code and eligible for collection.
#[derive(Clone)]
pub struct Handle(Arc<Mutex<NativeHandle>>);

impl Handle {
    pub(crate) fn new(
        raw: *mut c_void,
        kind: HandleKind,
        parent: Option<Handle>,
        finalizer: Option<Finalizer>,
    ) -> Self {
        Handle(Arc::new(Mutex::new(NativeHandle {
            raw,
            kind,
            finalizer,
            parent,
            finalized: false,
        })))
    }

    pub fn kind(&self) -> HandleKind {
        self.lock().kind
    }

    /// Address of the wrapped pointer (used for the live-resource set).
    pub(crate) fn raw_addr(&self) -> usize {
        self.lock().raw as usize
    }

    /// Borrow the wrapped pointer for the duration of one adapter call.
    ///
    /// Fails if the handle wraps a different resource kind than the adapter
    /// expects, or if its finalizer has already run.
    pub fn raw_as(&self, expected: HandleKind) -> Result<*mut c_void, RuntimeError> {
        let inner = self.lock();
        if inner.finalized {
            return Err(RuntimeError::UseAfterFree { kind: inner.kind });
        }
        if inner.kind != expected {
            return Err(RuntimeError::HandleKindMismatch {
                expected,
                got: inner.kind,
            });
        }
        Ok(inner.raw)
    }

    pub fn is_finalized(&self) -> bool {
        self.lock().finalized
    }

    /// True if no VM-visible reference remains besides the caller's.
    pub(crate) fn is_exclusively_owned(&self) -> bool {
        Arc::strong_count(&self.0) == 1
    }

    /// Run the finalizer if it has not run yet.
    ///
    /// Returns the freed address on the first call, `None` on any later one.
    /// The parent edge is dropped only after the finalizer returns, so a
    /// dependency can never be released before its dependent.
    pub(crate) fn finalize(&self) -> Option<usize> {
        let (finalizer, raw, parent) = {
            let mut inner = self.lock();
            if inner.finalized {
                return None;
            }
            inner.finalized = true;
            (inner.finalizer.take(), inner.raw, inner.parent.take())
        };
        if let Some(f) = finalizer {
            f(raw);
        }
        drop(parent);
        Some(raw as usize)
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, NativeHandle> {
        self.0.lock().expect("native handle lock poisoned")
    }
}

impl fmt::Debug for Handle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let inner = self.lock();
        f.debug_struct("Handle")
            .field("kind", &inner.kind)
            .field("raw", &inner.raw)
            .field("finalized", &inner.finalized)
            .finish()
    }
}
