//! Adapter marshalling behavior against the recording backend.

mod common;

use common::{capture_diagnostics, captured, MockBackend};
use ember_runtime::{ext, Function, Op, Program, RuntimeError, Vm};
use std::sync::Arc;
use std::time::Instant;

fn main_program(ops: Vec<Op>) -> Program {
    Program {
        functions: vec![Function {
            name: "main".into(),
            ops,
        }],
    }
}

fn run(vm: &mut Vm) -> Result<(), RuntimeError> {
    let id = vm.resolve_function("main")?;
    vm.call_function(id, 0)
}

fn vm_with(backend: &Arc<MockBackend>, ops: Vec<Op>) -> Vm {
    let (diag, _) = capture_diagnostics();
    let mut vm = Vm::with_diagnostics(main_program(ops), diag);
    ext::sdl::install(&mut vm, backend.clone() as Arc<dyn ember_runtime::GraphicsBackend>);
    vm
}

#[test]
fn init_passes_flags_and_pushes_status() {
    let backend = MockBackend::new();
    let mut vm = vm_with(
        &backend,
        vec![Op::PushNumber(32.0), Op::CallExtern("SDL_Init".into()), Op::Return],
    );
    run(&mut vm).unwrap();
    assert_eq!(vm.pop_number().unwrap(), 0.0);
    assert_eq!(backend.init_flags(), Some(32));
}

#[test]
fn constant_adapter_resolves_known_name() {
    let backend = MockBackend::new();
    let mut vm = vm_with(
        &backend,
        vec![
            Op::PushString("SDL_INIT_VIDEO".into()),
            Op::CallExtern("SDL".into()),
            Op::Return,
        ],
    );
    run(&mut vm).unwrap();
    assert_eq!(vm.pop_number().unwrap(), 32.0);
}

#[test]
fn constant_adapter_degrades_unknown_name_to_zero() {
    let backend = MockBackend::new();
    let (diag, buf) = capture_diagnostics();
    let mut vm = Vm::with_diagnostics(
        main_program(vec![
            Op::PushString("SDL_TYPO_FLAG".into()),
            Op::CallExtern("SDL".into()),
            Op::Return,
        ]),
        diag,
    );
    ext::sdl::install(&mut vm, backend as Arc<dyn ember_runtime::GraphicsBackend>);
    run(&mut vm).unwrap();
    assert_eq!(vm.pop_number().unwrap(), 0.0);

    let out = captured(&buf);
    assert_eq!(out.lines().count(), 1);
    assert!(out.contains("SDL_TYPO_FLAG"));
}

#[test]
fn out_parameters_mutate_cells_and_push_nothing() {
    let backend = MockBackend::new();
    backend.set_mouse(42, 17);
    // Adapter pops the x cell first, so it must sit on top: push y, then x.
    let mut vm = vm_with(
        &backend,
        vec![
            Op::NewRef,
            Op::StoreLocal(0), // x cell
            Op::NewRef,
            Op::StoreLocal(1), // y cell
            Op::LoadLocal(1),
            Op::LoadLocal(0),
            Op::CallExtern("SDL_GetMousePos".into()),
            Op::LoadLocal(0),
            Op::ReadRef,
            Op::LoadLocal(1),
            Op::ReadRef,
            Op::Return,
        ],
    );
    run(&mut vm).unwrap();
    // Top of stack: y value, then x value; nothing else was pushed.
    assert_eq!(vm.pop_number().unwrap(), 17.0);
    assert_eq!(vm.pop_number().unwrap(), 42.0);
    assert_eq!(vm.stack_depth(), 0);
}

#[test]
fn poll_with_no_pending_event_returns_zero_immediately() {
    let backend = MockBackend::new();
    let mut vm = vm_with(
        &backend,
        vec![
            Op::CallExtern("SDL_CreateEvent".into()),
            Op::CallExtern("SDL_PollEvent".into()),
            Op::Return,
        ],
    );
    run(&mut vm).unwrap();
    assert_eq!(vm.pop_number().unwrap(), 0.0);
}

#[test]
fn poll_delivers_queued_event_and_its_type() {
    let backend = MockBackend::new();
    backend.queue_event(0x100); // SDL_QUIT
    let mut vm = vm_with(
        &backend,
        vec![
            Op::CallExtern("SDL_CreateEvent".into()),
            Op::StoreLocal(0),
            Op::LoadLocal(0),
            Op::CallExtern("SDL_PollEvent".into()),
            Op::Pop, // status (checked elsewhere)
            Op::LoadLocal(0),
            Op::CallExtern("SDL_EventType".into()),
            Op::Return,
        ],
    );
    run(&mut vm).unwrap();
    assert_eq!(vm.pop_number().unwrap(), 256.0);
}

#[test]
fn zero_delay_returns_without_measurable_wait() {
    let backend = MockBackend::new();
    let mut vm = vm_with(
        &backend,
        vec![Op::PushNumber(0.0), Op::CallExtern("SDL_Delay".into()), Op::Return],
    );
    let start = Instant::now();
    run(&mut vm).unwrap();
    assert!(start.elapsed().as_millis() < 100);
    assert_eq!(backend.delays(), vec![0]);
}

#[test]
fn draw_color_persists_across_calls_and_clear_resets_it() {
    let backend = MockBackend::new();
    let mut vm = vm_with(
        &backend,
        vec![
            // Window: adapter pops title first, so flags go on the bottom.
            Op::PushNumber(4.0),   // flags
            Op::PushNumber(240.0), // height
            Op::PushNumber(320.0), // width
            Op::PushNumber(0.0),   // y
            Op::PushNumber(0.0),   // x
            Op::PushString("demo".into()),
            Op::CallExtern("SDL_CreateWindow".into()),
            Op::StoreLocal(0),
            // Renderer: pops window handle first, then flags.
            Op::PushNumber(2.0),
            Op::LoadLocal(0),
            Op::CallExtern("SDL_CreateRenderer".into()),
            Op::StoreLocal(1),
            // SetRenderDrawColor pops renderer, r, g, b, a.
            Op::PushNumber(255.0), // a
            Op::PushNumber(30.0),  // b
            Op::PushNumber(20.0),  // g
            Op::PushNumber(10.0),  // r
            Op::LoadLocal(1),
            Op::CallExtern("SDL_SetRenderDrawColor".into()),
            // FillRect pops renderer, x, y, w, h.
            Op::PushNumber(50.0), // h
            Op::PushNumber(40.0), // w
            Op::PushNumber(8.0),  // y
            Op::PushNumber(4.0),  // x
            Op::LoadLocal(1),
            Op::CallExtern("SDL_RenderFillRect".into()),
            Op::LoadLocal(1),
            Op::CallExtern("SDL_RenderPresent".into()),
            Op::LoadLocal(1),
            Op::CallExtern("SDL_RenderClear".into()),
            Op::Return,
        ],
    );
    run(&mut vm).unwrap();
    assert_eq!(backend.rects(), vec![(4, 8, 40, 50)]);
    assert_eq!(backend.presents(), 1);
    assert_eq!(backend.clears(), 1);
    // Clear reset the persistent draw color to opaque black.
    assert_eq!(backend.draw_color(), (0, 0, 0, 255));
}

#[test]
fn key_and_ticks_adapters_pass_through() {
    let backend = MockBackend::new();
    backend.hold_key(80);
    backend.set_ticks(1234);
    let mut vm = vm_with(
        &backend,
        vec![
            Op::PushNumber(80.0),
            Op::CallExtern("SDL_IsKeyDown".into()),
            Op::CallExtern("SDL_GetTicks".into()),
            Op::Return,
        ],
    );
    run(&mut vm).unwrap();
    assert_eq!(vm.pop_number().unwrap(), 1234.0);
    assert_eq!(vm.pop_number().unwrap(), 1.0);
}

#[test]
fn window_handle_rejected_where_renderer_expected() {
    let backend = MockBackend::new();
    let mut vm = vm_with(
        &backend,
        vec![
            Op::PushNumber(4.0),
            Op::PushNumber(240.0),
            Op::PushNumber(320.0),
            Op::PushNumber(0.0),
            Op::PushNumber(0.0),
            Op::PushString("demo".into()),
            Op::CallExtern("SDL_CreateWindow".into()),
            Op::CallExtern("SDL_RenderClear".into()),
            Op::Return,
        ],
    );
    let err = run(&mut vm).unwrap_err();
    assert!(matches!(
        err,
        RuntimeError::HandleKindMismatch {
            expected: ember_runtime::HandleKind::Renderer,
            got: ember_runtime::HandleKind::Window,
        }
    ));
}

#[test]
fn quit_reaches_the_backend() {
    let backend = MockBackend::new();
    let mut vm = vm_with(&backend, vec![Op::CallExtern("SDL_Quit".into()), Op::Return]);
    run(&mut vm).unwrap();
    assert_eq!(backend.quit_calls(), 1);
}
