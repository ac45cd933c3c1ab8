pub mod control_flow;
pub mod executor;
pub mod leb128;
pub mod linker;
pub mod memory;
pub mod module;
pub mod native_executor;
pub mod string_arena;
