//! Ember runtime: the boundary layer between a stack-based managed VM and
//! a native graphics/input library.
//!
//! The hard problem this crate solves: exposing native, non-garbage-collected
//! resources (windows, renderers, event buffers) to a managed runtime without
//! leaking them, double-freeing them, or corrupting the stack-based calling
//! convention. Four pieces:
//!
//! - [`consts::ConstantTable`]: symbolic names from the library's namespace
//!   resolved to VM numbers, with forgiving degradation on unknown names.
//! - [`handle::Handle`] + [`heap::HandleHeap`]: managed wrappers that own
//!   exactly one raw resource pointer and a finalizer invoked exactly once,
//!   after unreachability, child before parent.
//! - [`ext`]: marshalling adapters popping VM-stack arguments in their
//!   documented order and pushing results back.
//! - [`externs::ExternRegistry`]: startup binding of bytecode symbols to
//!   adapters with a fail-fast completeness check.
//!
//! The SDL2 library itself stays a black box behind
//! [`backend::GraphicsBackend`]; [`backend::sdl::SdlBackend`] loads it
//! dynamically at startup.

pub mod backend;
pub mod consts;
pub mod diag;
pub mod ext;
pub mod externs;
pub mod handle;
pub mod heap;
pub mod program;
pub mod stack;
pub mod value;
pub mod vm;

pub use backend::{BackendError, GraphicsBackend};
pub use consts::ConstantTable;
pub use diag::Diagnostics;
pub use externs::{ExternFn, ExternRegistry};
pub use handle::{Handle, HandleKind};
pub use heap::HandleHeap;
pub use program::{Function, Op, Program};
pub use value::{NumberCell, RuntimeError, Value};
pub use vm::{FunctionId, Vm};
