//! Embedder-facing driver: load a module from disk or memory, bind the
//! well-known host imports, locate an entry point, and run it.

use std::fs;
use std::path::Path;

use crate::error::CoreError;
use crate::runtime::core::executor::Vm;
use crate::runtime::core::module::{ExportKind, Module};
use crate::runtime::wasi;

pub fn execute_wasm_file(
    wasm_path: &str,
    call: Option<&str>,
    args: &[i32],
) -> Result<Option<i32>, CoreError> {
    if !Path::new(wasm_path).exists() {
        return Err(CoreError::cli(format!("WASM file not found: {wasm_path}")));
    }
    let wasm_bytes = fs::read(wasm_path)?;
    execute_wasm_bytes(&wasm_bytes, call, args)
}

pub fn execute_wasm_bytes(
    wasm_bytes: &[u8],
    call: Option<&str>,
    args: &[i32],
) -> Result<Option<i32>, CoreError> {
    let module = Module::parse(wasm_bytes)?;
    let mut vm = Vm::new(module)?;
    wasi::bind_well_known_imports(&mut vm);

    let func_idx = match call {
        Some(name) => find_export_function(&vm, name)
            .ok_or_else(|| CoreError::cli(format!("no exported function named '{name}'")))?,
        None => resolve_entry_point(&vm)
            .ok_or_else(|| CoreError::cli("module has no start section, `main`, or `_start` export"))?,
    };

    vm.invoke(func_idx, args)
}

fn find_export_function(vm: &Vm<'_>, name: &str) -> Option<u32> {
    vm.exported_function(name)
}

/// Entry-point resolution order: an explicit Start section, then the
/// conventional `main`/`_start` export names (§4.3).
fn resolve_entry_point(vm: &Vm<'_>) -> Option<u32> {
    if let Some(start) = vm.module().start {
        return Some(start);
    }
    if let Some(export) = vm.module().get_export("main") {
        if matches!(export.kind, ExportKind::Function) {
            return Some(export.index);
        }
    }
    if let Some(export) = vm.module().get_export("_start") {
        if matches!(export.kind, ExportKind::Function) {
            return Some(export.index);
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leb(mut v: u32) -> Vec<u8> {
        let mut out = Vec::new();
        loop {
            let byte = (v & 0x7F) as u8;
            v >>= 7;
            if v == 0 {
                out.push(byte);
                break;
            }
            out.push(byte | 0x80);
        }
        out
    }

    fn section(id: u8, body: Vec<u8>) -> Vec<u8> {
        let mut out = vec![id];
        out.extend(leb(body.len() as u32));
        out.extend(body);
        out
    }

    fn module_with_main_returning(value: i32) -> Vec<u8> {
        let mut bytes = b"\0asm".to_vec();
        bytes.extend_from_slice(&1u32.to_le_bytes());
        let mut type_body = leb(1);
        type_body.push(0x60);
        type_body.extend(leb(0));
        type_body.extend(leb(1));
        type_body.push(0x7F);
        bytes.extend(section(1, type_body));
        let mut func_body = leb(1);
        func_body.extend(leb(0));
        bytes.extend(section(3, func_body));
        let mut export_body = leb(1);
        export_body.extend(leb(4));
        export_body.extend_from_slice(b"main");
        export_body.push(0x00);
        export_body.extend(leb(0));
        bytes.extend(section(7, export_body));
        let mut code_body = leb(1);
        let mut body = leb(0);
        body.push(0x41);
        body.extend(leb(value as u32));
        body.push(0x0B);
        code_body.extend(leb(body.len() as u32));
        code_body.extend(body);
        bytes.extend(section(10, code_body));
        bytes
    }

    #[test]
    fn resolves_main_export_by_default() {
        let bytes = module_with_main_returning(42);
        let result = execute_wasm_bytes(&bytes, None, &[]).unwrap();
        assert_eq!(result, Some(42));
    }

    #[test]
    fn explicit_call_name_overrides_entry_resolution() {
        let bytes = module_with_main_returning(7);
        let result = execute_wasm_bytes(&bytes, Some("main"), &[]).unwrap();
        assert_eq!(result, Some(7));
        let err = execute_wasm_bytes(&bytes, Some("missing"), &[]).unwrap_err();
        assert!(matches!(err, CoreError::Cli(_)));
    }

    #[test]
    fn missing_file_is_a_cli_error() {
        let err = execute_wasm_file("/nonexistent/path.wasm", None, &[]).unwrap_err();
        assert!(matches!(err, CoreError::Cli(_)));
    }
}
