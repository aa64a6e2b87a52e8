//! Shared test support: a recording graphics backend.
#![allow(dead_code)] // each integration test binary uses a different subset

use ember_runtime::{Diagnostics, GraphicsBackend};
use std::collections::VecDeque;
use std::ffi::c_void;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// What kind of resource a mock destruction released.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Destroyed {
    Window(usize),
    Renderer(usize),
    Event(usize),
}

#[derive(Default)]
struct MockState {
    next_addr: usize,
    destroyed: Vec<Destroyed>,
    pending_events: VecDeque<u32>,
    mouse: (i32, i32),
    held_keys: Vec<i32>,
    delays: Vec<u32>,
    draw_color: (u8, u8, u8, u8),
    clears: usize,
    presents: usize,
    rects: Vec<(i32, i32, i32, i32)>,
    init_flags: Option<u32>,
    quit_calls: usize,
    ticks: u32,
}

/// Records every backend call and hands out fake resource addresses.
///
/// Window and renderer pointers are synthetic (the native library is a
/// black box; nothing dereferences them). Event buffers are real 56-byte
/// allocations because poll/event-type read and write through them.
pub struct MockBackend {
    state: Mutex<MockState>,
}

impl MockBackend {
    pub fn new() -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(MockState {
                next_addr: 0x1000,
                ..MockState::default()
            }),
        })
    }

    fn next_addr(&self) -> usize {
        let mut st = self.state.lock().unwrap();
        st.next_addr += 0x10;
        st.next_addr
    }

    pub fn queue_event(&self, event_type: u32) {
        self.state.lock().unwrap().pending_events.push_back(event_type);
    }

    pub fn set_mouse(&self, x: i32, y: i32) {
        self.state.lock().unwrap().mouse = (x, y);
    }

    pub fn hold_key(&self, scancode: i32) {
        self.state.lock().unwrap().held_keys.push(scancode);
    }

    pub fn set_ticks(&self, ticks: u32) {
        self.state.lock().unwrap().ticks = ticks;
    }

    pub fn destroyed(&self) -> Vec<Destroyed> {
        self.state.lock().unwrap().destroyed.clone()
    }

    pub fn delays(&self) -> Vec<u32> {
        self.state.lock().unwrap().delays.clone()
    }

    pub fn draw_color(&self) -> (u8, u8, u8, u8) {
        self.state.lock().unwrap().draw_color
    }

    pub fn clears(&self) -> usize {
        self.state.lock().unwrap().clears
    }

    pub fn presents(&self) -> usize {
        self.state.lock().unwrap().presents
    }

    pub fn rects(&self) -> Vec<(i32, i32, i32, i32)> {
        self.state.lock().unwrap().rects.clone()
    }

    pub fn init_flags(&self) -> Option<u32> {
        self.state.lock().unwrap().init_flags
    }

    pub fn quit_calls(&self) -> usize {
        self.state.lock().unwrap().quit_calls
    }
}

impl GraphicsBackend for MockBackend {
    fn init(&self, flags: u32) -> i32 {
        self.state.lock().unwrap().init_flags = Some(flags);
        0
    }

    fn quit(&self) {
        self.state.lock().unwrap().quit_calls += 1;
    }

    fn create_window(
        &self,
        _title: &str,
        _x: i32,
        _y: i32,
        _w: i32,
        _h: i32,
        _flags: u32,
    ) -> *mut c_void {
        self.next_addr() as *mut c_void
    }

    fn destroy_window(&self, window: *mut c_void) {
        self.state
            .lock()
            .unwrap()
            .destroyed
            .push(Destroyed::Window(window as usize));
    }

    fn create_renderer(&self, _window: *mut c_void, _flags: u32) -> *mut c_void {
        self.next_addr() as *mut c_void
    }

    fn destroy_renderer(&self, renderer: *mut c_void) {
        self.state
            .lock()
            .unwrap()
            .destroyed
            .push(Destroyed::Renderer(renderer as usize));
    }

    fn alloc_event(&self) -> *mut c_void {
        Box::into_raw(Box::new([0u8; 56])) as *mut c_void
    }

    fn free_event(&self, event: *mut c_void) {
        self.state
            .lock()
            .unwrap()
            .destroyed
            .push(Destroyed::Event(event as usize));
        drop(unsafe { Box::from_raw(event as *mut [u8; 56]) });
    }

    fn poll_event(&self, event: *mut c_void) -> i32 {
        match self.state.lock().unwrap().pending_events.pop_front() {
            Some(ty) => {
                unsafe { *(event as *mut u32) = ty };
                1
            }
            None => 0,
        }
    }

    fn event_type(&self, event: *mut c_void) -> u32 {
        unsafe { *(event as *const u32) }
    }

    fn is_key_down(&self, scancode: i32) -> bool {
        self.state.lock().unwrap().held_keys.contains(&scancode)
    }

    fn render_clear(&self, _renderer: *mut c_void) {
        let mut st = self.state.lock().unwrap();
        st.draw_color = (0, 0, 0, 255);
        st.clears += 1;
    }

    fn render_present(&self, _renderer: *mut c_void) {
        self.state.lock().unwrap().presents += 1;
    }

    fn fill_rect(&self, _renderer: *mut c_void, x: i32, y: i32, w: i32, h: i32) {
        self.state.lock().unwrap().rects.push((x, y, w, h));
    }

    fn set_draw_color(&self, _renderer: *mut c_void, r: u8, g: u8, b: u8, a: u8) {
        self.state.lock().unwrap().draw_color = (r, g, b, a);
    }

    fn ticks(&self) -> u32 {
        self.state.lock().unwrap().ticks
    }

    fn delay(&self, ms: u32) {
        self.state.lock().unwrap().delays.push(ms);
        std::thread::sleep(Duration::from_millis(ms as u64));
    }

    fn mouse_position(&self) -> (i32, i32) {
        self.state.lock().unwrap().mouse
    }
}

/// Diagnostics writing into a capturable buffer.
pub fn capture_diagnostics() -> (Diagnostics, Arc<Mutex<Vec<u8>>>) {
    let buf: Arc<Mutex<Vec<u8>>> = Arc::new(Mutex::new(Vec::new()));
    (Diagnostics::new(buf.clone()), buf)
}

pub fn captured(buf: &Arc<Mutex<Vec<u8>>>) -> String {
    String::from_utf8(buf.lock().unwrap().clone()).unwrap()
}
