//! Warning diagnostics
//!
//! Non-fatal diagnostics (unresolved constants, unused extern registrations)
//! flow through a pluggable writer so embedders and tests can capture them.
//! Fatal errors never go through this path; they propagate as [`RuntimeError`]
//! values.
//!
//! [`RuntimeError`]: crate::value::RuntimeError

use std::io::Write;
use std::sync::{Arc, Mutex};

/// Shared writer for warning diagnostics.
pub type DiagWriter = Arc<Mutex<dyn Write + Send>>;

/// Writer targeting stderr (the default).
pub fn stderr_writer() -> DiagWriter {
    Arc::new(Mutex::new(std::io::stderr()))
}

/// Handle for emitting warning diagnostics.
///
/// Cheap to clone; all clones share the same underlying writer.
#[derive(Clone)]
pub struct Diagnostics {
    out: DiagWriter,
}

impl Diagnostics {
    pub fn new(out: DiagWriter) -> Self {
        Self { out }
    }

    /// Diagnostics that write to stderr.
    pub fn stderr() -> Self {
        Self::new(stderr_writer())
    }

    /// Emit a single warning line.
    pub fn warn(&self, message: &str) {
        let mut out = self.out.lock().expect("diagnostic writer lock poisoned");
        // A failed diagnostic write is not worth aborting execution over.
        let _ = writeln!(out, "warning: {}", message);
    }

    /// Emit a step-trace line (only used when debug mode is on).
    pub fn trace(&self, message: &str) {
        let mut out = self.out.lock().expect("diagnostic writer lock poisoned");
        let _ = writeln!(out, "[debug] {}", message);
    }
}

impl Default for Diagnostics {
    fn default() -> Self {
        Self::stderr()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn warn_writes_one_line() {
        let buf: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));
        let diag = Diagnostics::new(buf.clone());
        diag.warn("something odd");

        let contents = String::from_utf8(buf.lock().unwrap().clone()).unwrap();
        assert_eq!(contents, "warning: something odd\n");
    }

    #[test]
    fn clones_share_the_writer() {
        let buf: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));
        let diag = Diagnostics::new(buf.clone());
        let other = diag.clone();
        diag.warn("a");
        other.warn("b");

        let contents = String::from_utf8(buf.lock().unwrap().clone()).unwrap();
        assert_eq!(contents.lines().count(), 2);
    }
}
