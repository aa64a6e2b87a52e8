//! SDL adapter set
//!
//! One adapter per extern symbol the bytecode can reference. Stack contracts
//! are listed top-of-stack first; the caller must have pushed in the reverse
//! order. Resource-producing adapters push a managed handle built through
//! the handle heap, never a raw pointer.

use crate::backend::GraphicsBackend;
use crate::consts::ConstantTable;
use crate::handle::HandleKind;
use crate::value::RuntimeError;
use crate::vm::Vm;
use std::sync::Arc;

/// Register every SDL adapter on the VM and populate its constant table
/// from the backend's exported namespace.
///
/// Registrations are quiet: a program is free to reference only a subset.
pub fn install(vm: &mut Vm, backend: Arc<dyn GraphicsBackend>) {
    let table = ConstantTable::new(backend.constants(), vm.diagnostics().clone());
    vm.set_constants(table);

    macro_rules! hook {
        ($name:literal, $adapter:path) => {{
            let b = backend.clone();
            vm.register_extern_quiet($name, Arc::new(move |vm: &mut Vm| $adapter(vm, &b)));
        }};
    }

    hook!("SDL_Init", init);
    hook!("SDL_Quit", quit);
    hook!("SDL", constant);
    hook!("SDL_CreateWindow", create_window);
    hook!("SDL_CreateRenderer", create_renderer);
    hook!("SDL_CreateEvent", create_event);
    hook!("SDL_PollEvent", poll_event);
    hook!("SDL_EventType", event_type);
    hook!("SDL_IsKeyDown", is_key_down);
    hook!("SDL_RenderClear", render_clear);
    hook!("SDL_RenderPresent", render_present);
    hook!("SDL_RenderFillRect", render_fill_rect);
    hook!("SDL_SetRenderDrawColor", set_render_draw_color);
    hook!("SDL_GetTicks", get_ticks);
    hook!("SDL_Delay", delay);
    hook!("SDL_GetMousePos", get_mouse_pos);
}

/// Pops: flags. Pushes: the library's init status code, uninterpreted.
fn init(vm: &mut Vm, b: &Arc<dyn GraphicsBackend>) -> Result<(), RuntimeError> {
    let flags = vm.pop_number()? as u32;
    vm.push_number(b.init(flags) as f64);
    Ok(())
}

/// Pops nothing. Shuts the library's subsystems down.
fn quit(_vm: &mut Vm, b: &Arc<dyn GraphicsBackend>) -> Result<(), RuntimeError> {
    b.quit();
    Ok(())
}

/// Pops: constant name string. Pushes: its value, or 0 with a warning.
fn constant(vm: &mut Vm, _b: &Arc<dyn GraphicsBackend>) -> Result<(), RuntimeError> {
    let name = vm.pop_string()?;
    let value = vm.resolve_constant(&name);
    vm.push_number(value as f64);
    Ok(())
}

/// Pops: title, x, y, width, height, flags. Pushes: a window handle whose
/// finalizer destroys the window.
fn create_window(vm: &mut Vm, b: &Arc<dyn GraphicsBackend>) -> Result<(), RuntimeError> {
    let title = vm.pop_string()?;
    let x = vm.pop_number()? as i32;
    let y = vm.pop_number()? as i32;
    let width = vm.pop_number()? as i32;
    let height = vm.pop_number()? as i32;
    let flags = vm.pop_number()? as u32;

    let raw = b.create_window(&title, x, y, width, height, flags);
    let backend = b.clone();
    vm.push_native(
        raw,
        HandleKind::Window,
        None,
        Some(Box::new(move |p| backend.destroy_window(p))),
    )
}

/// Pops: window handle, flags. Pushes: a renderer handle. The renderer
/// keeps a dependency edge to its window, so the window can never be
/// finalized first.
fn create_renderer(vm: &mut Vm, b: &Arc<dyn GraphicsBackend>) -> Result<(), RuntimeError> {
    let window = vm.pop_handle(HandleKind::Window)?;
    let flags = vm.pop_number()? as u32;

    let raw = b.create_renderer(window.raw_as(HandleKind::Window)?, flags);
    let backend = b.clone();
    vm.push_native(
        raw,
        HandleKind::Renderer,
        Some(window),
        Some(Box::new(move |p| backend.destroy_renderer(p))),
    )
}

/// Pops nothing. Pushes: an event-buffer handle.
fn create_event(vm: &mut Vm, b: &Arc<dyn GraphicsBackend>) -> Result<(), RuntimeError> {
    let raw = b.alloc_event();
    let backend = b.clone();
    vm.push_native(
        raw,
        HandleKind::Event,
        None,
        Some(Box::new(move |p| backend.free_event(p))),
    )
}

/// Pops: event handle. Pushes: 1 if an event was pending, else 0.
/// Never blocks.
fn poll_event(vm: &mut Vm, b: &Arc<dyn GraphicsBackend>) -> Result<(), RuntimeError> {
    let event = vm.pop_handle(HandleKind::Event)?;
    let status = b.poll_event(event.raw_as(HandleKind::Event)?);
    vm.push_number(status as f64);
    Ok(())
}

/// Pops: event handle. Pushes: the event's type code.
fn event_type(vm: &mut Vm, b: &Arc<dyn GraphicsBackend>) -> Result<(), RuntimeError> {
    let event = vm.pop_handle(HandleKind::Event)?;
    let ty = b.event_type(event.raw_as(HandleKind::Event)?);
    vm.push_number(ty as f64);
    Ok(())
}

/// Pops: scancode. Pushes: 1 if the key is held, else 0.
fn is_key_down(vm: &mut Vm, b: &Arc<dyn GraphicsBackend>) -> Result<(), RuntimeError> {
    let scancode = vm.pop_number()? as i32;
    vm.push_number(if b.is_key_down(scancode) { 1.0 } else { 0.0 });
    Ok(())
}

/// Pops: renderer handle. Clears the target to opaque black.
fn render_clear(vm: &mut Vm, b: &Arc<dyn GraphicsBackend>) -> Result<(), RuntimeError> {
    let renderer = vm.pop_handle(HandleKind::Renderer)?;
    b.render_clear(renderer.raw_as(HandleKind::Renderer)?);
    Ok(())
}

/// Pops: renderer handle. Presents the back buffer.
fn render_present(vm: &mut Vm, b: &Arc<dyn GraphicsBackend>) -> Result<(), RuntimeError> {
    let renderer = vm.pop_handle(HandleKind::Renderer)?;
    b.render_present(renderer.raw_as(HandleKind::Renderer)?);
    Ok(())
}

/// Pops: renderer handle, x, y, width, height. Fills the rectangle with the
/// current draw color.
fn render_fill_rect(vm: &mut Vm, b: &Arc<dyn GraphicsBackend>) -> Result<(), RuntimeError> {
    let renderer = vm.pop_handle(HandleKind::Renderer)?;
    let x = vm.pop_number()? as i32;
    let y = vm.pop_number()? as i32;
    let w = vm.pop_number()? as i32;
    let h = vm.pop_number()? as i32;
    b.fill_rect(renderer.raw_as(HandleKind::Renderer)?, x, y, w, h);
    Ok(())
}

/// Pops: renderer handle, r, g, b, a. Sets the persistent draw color.
fn set_render_draw_color(vm: &mut Vm, b: &Arc<dyn GraphicsBackend>) -> Result<(), RuntimeError> {
    let renderer = vm.pop_handle(HandleKind::Renderer)?;
    let r = vm.pop_number()? as u8;
    let g = vm.pop_number()? as u8;
    let bl = vm.pop_number()? as u8;
    let a = vm.pop_number()? as u8;
    b.set_draw_color(renderer.raw_as(HandleKind::Renderer)?, r, g, bl, a);
    Ok(())
}

/// Pops nothing. Pushes: milliseconds since library init.
fn get_ticks(vm: &mut Vm, b: &Arc<dyn GraphicsBackend>) -> Result<(), RuntimeError> {
    vm.push_number(b.ticks() as f64);
    Ok(())
}

/// Pops: milliseconds. Blocks the whole VM for that duration; zero returns
/// immediately.
fn delay(vm: &mut Vm, b: &Arc<dyn GraphicsBackend>) -> Result<(), RuntimeError> {
    let ms = vm.pop_number()? as u32;
    b.delay(ms);
    Ok(())
}

/// Pops: x ref cell, y ref cell. Writes the cursor position into the cells;
/// pushes nothing.
fn get_mouse_pos(vm: &mut Vm, b: &Arc<dyn GraphicsBackend>) -> Result<(), RuntimeError> {
    let ref_x = vm.pop_ref()?;
    let ref_y = vm.pop_ref()?;
    let (x, y) = b.mouse_position();
    ref_x.set(x as f64);
    ref_y.set(y as f64);
    Ok(())
}
