//! Graphics backend seam
//!
//! The native windowing library as a black box behind a trait. One backend
//! value owns the library's process-wide initialization and teardown; the
//! adapters invoke its operations and wrap the resources it allocates. No
//! thread safety is assumed of the underlying library; the VM's
//! single-threaded execution model is the synchronization.

pub mod sdl;

use std::ffi::c_void;
use thiserror::Error;

/// Errors loading the native library or resolving its symbols.
#[derive(Debug, Error)]
pub enum BackendError {
    #[error("native library not found (tried: {tried})")]
    LibraryNotFound { tried: String },
    #[error("symbol '{symbol}' not found in native library")]
    SymbolNotFound { symbol: String },
    #[error("failed to load native library: {0}")]
    LoadFailed(String),
}

/// Operations the marshalling adapters need from the native library.
///
/// Creation calls return raw pointers exactly as the library produced them
/// (possibly null; the handle heap checks). Destruction calls are only ever
/// reached through handle finalizers.
pub trait GraphicsBackend {
    /// Initialize library subsystems; returns the library's status code,
    /// passed through to bytecode uninterpreted.
    fn init(&self, flags: u32) -> i32;
    fn quit(&self);

    fn create_window(&self, title: &str, x: i32, y: i32, w: i32, h: i32, flags: u32)
        -> *mut c_void;
    fn destroy_window(&self, window: *mut c_void);

    fn create_renderer(&self, window: *mut c_void, flags: u32) -> *mut c_void;
    fn destroy_renderer(&self, renderer: *mut c_void);

    /// Allocate an event buffer for [`poll_event`](Self::poll_event).
    fn alloc_event(&self) -> *mut c_void;
    fn free_event(&self, event: *mut c_void);
    /// Non-blocking: returns 1 if an event was written into `event`, else 0.
    fn poll_event(&self, event: *mut c_void) -> i32;
    fn event_type(&self, event: *mut c_void) -> u32;

    fn is_key_down(&self, scancode: i32) -> bool;

    fn render_clear(&self, renderer: *mut c_void);
    fn render_present(&self, renderer: *mut c_void);
    fn fill_rect(&self, renderer: *mut c_void, x: i32, y: i32, w: i32, h: i32);
    fn set_draw_color(&self, renderer: *mut c_void, r: u8, g: u8, b: u8, a: u8);

    /// Milliseconds since library initialization.
    fn ticks(&self) -> u32;
    /// Blocks the calling thread (the whole VM) for `ms` milliseconds.
    fn delay(&self, ms: u32);
    fn mouse_position(&self) -> (i32, i32);

    /// Exported symbolic constants for the constant table.
    fn constants(&self) -> &'static [(&'static str, i64)] {
        crate::consts::SDL_CONSTANTS
    }
}
