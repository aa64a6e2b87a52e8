//! Handle heap and collection
//!
//! The heap owns the registry side of every live [`Handle`]. Collection is
//! reachability-based: a handle whose only remaining reference is the
//! registry itself cannot be reached by VM code, so its finalizer fires and
//! the entry is dropped. Parent edges make ordering safe: a child handle
//! keeps its parent reachable until the child's own finalizer has run, so a
//! renderer is always destroyed before its owning window.

use crate::handle::{Finalizer, Handle, HandleKind};
use crate::value::RuntimeError;
use std::collections::HashSet;
use std::ffi::c_void;

/// Registry of live native handles plus the collector that finalizes them.
pub struct HandleHeap {
    entries: Vec<Handle>,
    /// Raw addresses currently owned by a live handle. Guards against the
    /// same resource pointer being wrapped twice.
    live: HashSet<usize>,
    enabled: bool,
}

impl HandleHeap {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            live: HashSet::new(),
            enabled: true,
        }
    }

    /// Enable or disable automatic collection (the `--no-gc` switch).
    ///
    /// A disabled heap still registers handles so shutdown finalization
    /// stays correct; only [`collect`](Self::collect) becomes a no-op.
    pub fn set_enabled(&mut self, enabled: bool) {
        self.enabled = enabled;
    }

    /// Take ownership of a freshly allocated native resource.
    ///
    /// Rejects null pointers (failed native creation must never be wrapped
    /// as if it were valid) and pointers already owned by a live handle.
    pub fn wrap(
        &mut self,
        raw: *mut c_void,
        kind: HandleKind,
        parent: Option<Handle>,
        finalizer: Option<Finalizer>,
    ) -> Result<Handle, RuntimeError> {
        if raw.is_null() {
            return Err(RuntimeError::ResourceCreationFailed { kind });
        }
        let addr = raw as usize;
        if !self.live.insert(addr) {
            return Err(RuntimeError::AlreadyWrapped { addr });
        }
        let handle = Handle::new(raw, kind, parent, finalizer);
        self.entries.push(handle.clone());
        Ok(handle)
    }

    /// Finalize every handle unreachable from VM code.
    ///
    /// Returns the number of resources released.
    pub fn collect(&mut self) -> usize {
        if !self.enabled {
            return 0;
        }
        self.sweep_unreachable()
    }

    /// Shutdown path: release everything still registered.
    ///
    /// First sweeps normally (ignoring the `--no-gc` switch), then forces
    /// the leftovers (handles the embedder still holds references to) in
    /// reverse registration order. Children are always registered after
    /// their parents, so the forced pass still frees dependents first.
    pub fn finalize_all(&mut self) {
        self.sweep_unreachable();
        while let Some(handle) = self.entries.pop() {
            if let Some(addr) = handle.finalize() {
                self.live.remove(&addr);
            }
        }
        self.live.clear();
    }

    /// One collection to fixpoint: finalizing a child drops its parent
    /// edge, which may make the parent collectible in the same pass.
    fn sweep_unreachable(&mut self) -> usize {
        let mut freed = 0;
        loop {
            let before = self.entries.len();
            let mut kept = Vec::with_capacity(before);
            for handle in self.entries.drain(..) {
                if handle.is_exclusively_owned() {
                    if let Some(addr) = handle.finalize() {
                        self.live.remove(&addr);
                        freed += 1;
                    }
                } else {
                    kept.push(handle);
                }
            }
            self.entries = kept;
            if self.entries.len() == before {
                break;
            }
        }
        freed
    }

    /// Number of handles currently registered.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for HandleHeap {
    fn default() -> Self {
        Self::new()
    }
}
