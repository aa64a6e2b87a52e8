//! Symbolic constant table
//!
//! Resolves symbolic names from the native library's namespace (init flags,
//! window flags, event-type codes) into VM numbers. An unknown name is not
//! fatal: it emits one warning line and resolves to `0`, so a mistyped
//! constant degrades visibly instead of crashing. Known names are pure
//! lookups, stable for the process lifetime.

use crate::diag::Diagnostics;
use std::collections::HashMap;

/// SDL2's exported constant values for every symbol the adapter set touches.
///
/// Values are fixed by the SDL2 ABI.
pub const SDL_CONSTANTS: &[(&str, i64)] = &[
    ("SDL_INIT_EVERYTHING", 0x0000_F231),
    ("SDL_INIT_VIDEO", 0x0000_0020),
    ("SDL_WINDOWPOS_CENTERED", 0x2FFF_0000),
    ("SDL_WINDOW_SHOWN", 0x0000_0004),
    ("SDL_RENDERER_ACCELERATED", 0x0000_0002),
    ("SDL_RENDERER_PRESENTVSYNC", 0x0000_0004),
    ("SDL_QUIT", 0x100),
    ("SDL_KEYDOWN", 0x300),
    ("SDL_MOUSEBUTTONDOWN", 0x401),
    ("SDL_MOUSEBUTTONUP", 0x402),
];

/// Immutable name-to-integer lookup, populated once at startup.
pub struct ConstantTable {
    entries: HashMap<&'static str, i64>,
    diag: Diagnostics,
}

impl ConstantTable {
    /// Build the table from the backend's exported constant list.
    pub fn new(constants: &[(&'static str, i64)], diag: Diagnostics) -> Self {
        Self {
            entries: constants.iter().copied().collect(),
            diag,
        }
    }

    /// Exact, case-sensitive lookup.
    ///
    /// A miss warns and yields `0`; it never fails the program.
    pub fn resolve(&self, name: &str) -> i64 {
        match self.entries.get(name) {
            Some(value) => *value,
            None => {
                self.diag
                    .warn(&format!("unknown native constant '{}', substituting 0", name));
                0
            }
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
