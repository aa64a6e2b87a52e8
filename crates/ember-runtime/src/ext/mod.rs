//! Marshalling adapters
//!
//! Per-operation glue between the operand stack and the native library.
//! Each adapter pops its arguments in the reverse of the order the caller
//! pushed them, invokes the backend, and pushes scalar results or mutates
//! ref cells. Argument order is part of each adapter's documented contract.

pub mod sdl;
