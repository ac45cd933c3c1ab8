//! A minimal, host-embeddable WebAssembly interpreter for the i32 subset.
//!
//! The crate decodes a binary Wasm module into VM-internal tables
//! ([`runtime::core::module`]) and executes its exports on a stack machine
//! ([`runtime::core::executor`]). Only the 32-bit integer instruction set is
//! supported: no i64/f32/f64, no tables, no globals, a single fixed-size
//! linear memory. See `SPEC_FULL.md` for the full design.

pub mod debug;
pub mod error;
pub mod runtime;
