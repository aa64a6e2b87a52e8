//! SDL2 backend
//!
//! Loads the SDL2 shared library at runtime with `libloading` and resolves
//! each required symbol once at construction, so a missing library or symbol
//! is a single startup error rather than a call-time surprise.
//!
//! # Safety
//!
//! All unsafe code is confined to this module: symbol resolution, calls
//! through C function pointers, and the raw event-buffer allocation that
//! mirrors the library's `SDL_Event` size.

use super::{BackendError, GraphicsBackend};
use libloading::Library;
use std::alloc::{alloc_zeroed, dealloc, Layout};
use std::ffi::{c_char, c_int, c_void, CString};

/// `sizeof(SDL_Event)` in the SDL2 ABI: a 56-byte union.
const SDL_EVENT_SIZE: usize = 56;
const SDL_EVENT_ALIGN: usize = 8;

/// Library names tried in order, covering common platform conventions.
const LIBRARY_CANDIDATES: &[&str] = &[
    "libSDL2-2.0.so.0",
    "libSDL2.so",
    "libSDL2-2.0.0.dylib",
    "libSDL2.dylib",
    "SDL2.dll",
];

#[repr(C)]
struct SdlRect {
    x: c_int,
    y: c_int,
    w: c_int,
    h: c_int,
}

type InitFn = unsafe extern "C" fn(u32) -> c_int;
type QuitFn = unsafe extern "C" fn();
type CreateWindowFn =
    unsafe extern "C" fn(*const c_char, c_int, c_int, c_int, c_int, u32) -> *mut c_void;
type DestroyWindowFn = unsafe extern "C" fn(*mut c_void);
type CreateRendererFn = unsafe extern "C" fn(*mut c_void, c_int, u32) -> *mut c_void;
type DestroyRendererFn = unsafe extern "C" fn(*mut c_void);
type PollEventFn = unsafe extern "C" fn(*mut c_void) -> c_int;
type GetKeyboardStateFn = unsafe extern "C" fn(*mut c_int) -> *const u8;
type RenderClearFn = unsafe extern "C" fn(*mut c_void) -> c_int;
type RenderPresentFn = unsafe extern "C" fn(*mut c_void);
type RenderFillRectFn = unsafe extern "C" fn(*mut c_void, *const SdlRect) -> c_int;
type SetRenderDrawColorFn = unsafe extern "C" fn(*mut c_void, u8, u8, u8, u8) -> c_int;
type GetTicksFn = unsafe extern "C" fn() -> u32;
type DelayFn = unsafe extern "C" fn(u32);
type GetMouseStateFn = unsafe extern "C" fn(*mut c_int, *mut c_int) -> u32;

/// SDL2 loaded dynamically; one instance owns the library handle and all
/// resolved function pointers. The pointers stay valid as long as `_lib`
/// keeps the library mapped.
pub struct SdlBackend {
    _lib: Library,
    init: InitFn,
    quit: QuitFn,
    create_window: CreateWindowFn,
    destroy_window: DestroyWindowFn,
    create_renderer: CreateRendererFn,
    destroy_renderer: DestroyRendererFn,
    poll_event: PollEventFn,
    get_keyboard_state: GetKeyboardStateFn,
    render_clear: RenderClearFn,
    render_present: RenderPresentFn,
    render_fill_rect: RenderFillRectFn,
    set_render_draw_color: SetRenderDrawColorFn,
    get_ticks: GetTicksFn,
    delay: DelayFn,
    get_mouse_state: GetMouseStateFn,
}

/// Resolve one symbol, copying the function pointer out of the library.
///
/// # Safety
///
/// `T` must be the correct `extern "C"` signature for `name`; a mismatch is
/// undefined behavior at call time.
unsafe fn resolve<T: Copy>(lib: &Library, name: &'static str) -> Result<T, BackendError> {
    let symbol: libloading::Symbol<'_, T> =
        lib.get(name.as_bytes()).map_err(|_| BackendError::SymbolNotFound {
            symbol: name.to_string(),
        })?;
    Ok(*symbol)
}

impl SdlBackend {
    /// Open SDL2 and resolve every symbol the adapter set calls.
    pub fn load() -> Result<Self, BackendError> {
        let lib = LIBRARY_CANDIDATES
            .iter()
            .find_map(|name| unsafe { Library::new(name).ok() })
            .ok_or_else(|| BackendError::LibraryNotFound {
                tried: LIBRARY_CANDIDATES.join(", "),
            })?;

        unsafe {
            Ok(Self {
                init: resolve(&lib, "SDL_Init")?,
                quit: resolve(&lib, "SDL_Quit")?,
                create_window: resolve(&lib, "SDL_CreateWindow")?,
                destroy_window: resolve(&lib, "SDL_DestroyWindow")?,
                create_renderer: resolve(&lib, "SDL_CreateRenderer")?,
                destroy_renderer: resolve(&lib, "SDL_DestroyRenderer")?,
                poll_event: resolve(&lib, "SDL_PollEvent")?,
                get_keyboard_state: resolve(&lib, "SDL_GetKeyboardState")?,
                render_clear: resolve(&lib, "SDL_RenderClear")?,
                render_present: resolve(&lib, "SDL_RenderPresent")?,
                render_fill_rect: resolve(&lib, "SDL_RenderFillRect")?,
                set_render_draw_color: resolve(&lib, "SDL_SetRenderDrawColor")?,
                get_ticks: resolve(&lib, "SDL_GetTicks")?,
                delay: resolve(&lib, "SDL_Delay")?,
                get_mouse_state: resolve(&lib, "SDL_GetMouseState")?,
                _lib: lib,
            })
        }
    }

    fn event_layout() -> Layout {
        // Size and alignment are ABI constants; this cannot fail.
        Layout::from_size_align(SDL_EVENT_SIZE, SDL_EVENT_ALIGN)
            .expect("SDL_Event layout is valid")
    }
}

impl GraphicsBackend for SdlBackend {
    fn init(&self, flags: u32) -> i32 {
        unsafe { (self.init)(flags) }
    }

    fn quit(&self) {
        unsafe { (self.quit)() }
    }

    fn create_window(
        &self,
        title: &str,
        x: i32,
        y: i32,
        w: i32,
        h: i32,
        flags: u32,
    ) -> *mut c_void {
        let Ok(title) = CString::new(title) else {
            // Interior nul: the library cannot take this title. A null
            // result surfaces as a resource-creation failure upstream.
            return std::ptr::null_mut();
        };
        unsafe { (self.create_window)(title.as_ptr(), x, y, w, h, flags) }
    }

    fn destroy_window(&self, window: *mut c_void) {
        unsafe { (self.destroy_window)(window) }
    }

    fn create_renderer(&self, window: *mut c_void, flags: u32) -> *mut c_void {
        // -1: first driver supporting the requested flags.
        unsafe { (self.create_renderer)(window, -1, flags) }
    }

    fn destroy_renderer(&self, renderer: *mut c_void) {
        unsafe { (self.destroy_renderer)(renderer) }
    }

    fn alloc_event(&self) -> *mut c_void {
        unsafe { alloc_zeroed(Self::event_layout()) as *mut c_void }
    }

    fn free_event(&self, event: *mut c_void) {
        if !event.is_null() {
            unsafe { dealloc(event as *mut u8, Self::event_layout()) }
        }
    }

    fn poll_event(&self, event: *mut c_void) -> i32 {
        unsafe { (self.poll_event)(event) }
    }

    fn event_type(&self, event: *mut c_void) -> u32 {
        // The event type is the first field of every SDL_Event variant.
        unsafe { *(event as *const u32) }
    }

    fn is_key_down(&self, scancode: i32) -> bool {
        let mut numkeys: c_int = 0;
        let keys = unsafe { (self.get_keyboard_state)(&mut numkeys) };
        if keys.is_null() || scancode < 0 || scancode >= numkeys {
            return false;
        }
        unsafe { *keys.offset(scancode as isize) != 0 }
    }

    fn render_clear(&self, renderer: *mut c_void) {
        unsafe {
            (self.set_render_draw_color)(renderer, 0, 0, 0, 255);
            (self.render_clear)(renderer);
        }
    }

    fn render_present(&self, renderer: *mut c_void) {
        unsafe { (self.render_present)(renderer) }
    }

    fn fill_rect(&self, renderer: *mut c_void, x: i32, y: i32, w: i32, h: i32) {
        let rect = SdlRect { x, y, w, h };
        unsafe {
            (self.render_fill_rect)(renderer, &rect);
        }
    }

    fn set_draw_color(&self, renderer: *mut c_void, r: u8, g: u8, b: u8, a: u8) {
        unsafe {
            (self.set_render_draw_color)(renderer, r, g, b, a);
        }
    }

    fn ticks(&self) -> u32 {
        unsafe { (self.get_ticks)() }
    }

    fn delay(&self, ms: u32) {
        unsafe { (self.delay)(ms) }
    }

    fn mouse_position(&self) -> (i32, i32) {
        let mut x: c_int = 0;
        let mut y: c_int = 0;
        unsafe {
            (self.get_mouse_state)(&mut x, &mut y);
        }
        (x, y)
    }
}
