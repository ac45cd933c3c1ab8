//! Integration tests against the public library surface: decode a module,
//! bind host imports, and invoke an export exactly the way an embedder would
//! (§6, Embedder API), rather than reaching into `runtime::core::executor`
//! internals the way the unit tests alongside each module do.

use microwasm::error::{CoreError, TrapKind};
use microwasm::runtime::core::executor::Vm;
use microwasm::runtime::core::linker::Linker;
use microwasm::runtime::core::module::Module;
use microwasm::runtime::core::native_executor::execute_wasm_bytes;
use microwasm::runtime::wasi;

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

fn header() -> Vec<u8> {
    let mut bytes = b"\0asm".to_vec();
    bytes.extend_from_slice(&1u32.to_le_bytes());
    bytes
}

/// fib(n): n < 2 ? n : fib(n-1) + fib(n-2), exported as "fib".
fn fib_module() -> Vec<u8> {
    let mut bytes = header();

    let mut type_body = leb(1);
    type_body.push(0x60);
    type_body.extend(leb(1));
    type_body.push(0x7F);
    type_body.extend(leb(1));
    type_body.push(0x7F);
    bytes.extend(section(1, type_body));

    let mut func_body = leb(1);
    func_body.extend(leb(0));
    bytes.extend(section(3, func_body));

    let mut export_body = leb(1);
    export_body.extend(leb(3));
    export_body.extend_from_slice(b"fib");
    export_body.push(0x00);
    export_body.extend(leb(0));
    bytes.extend(section(7, export_body));

    let body = vec![
        0x20, 0x00, 0x41, 0x02, 0x48, // local.get 0; i32.const 2; i32.lt_s
        0x04, 0x40, // if void
        0x20, 0x00, 0x0F, // local.get 0; return
        0x0B, // end if
        0x20, 0x00, 0x41, 0x01, 0x6B, 0x10, 0x00, // fib(n-1)
        0x20, 0x00, 0x41, 0x02, 0x6B, 0x10, 0x00, // fib(n-2)
        0x6A, // add
        0x0B, // end function
    ];
    let mut code_body = leb(1);
    let mut full_body = leb(0);
    full_body.extend(body);
    code_body.extend(leb(full_body.len() as u32));
    code_body.extend(full_body);
    bytes.extend(section(10, code_body));

    bytes
}

/// Exports "main" (Start target) which stores 120 at address 0 and loads it
/// back, and imports env.print_i32 (left unbound here).
fn memory_roundtrip_module() -> Vec<u8> {
    let mut bytes = header();

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
    body.extend(vec![
        0x41, 0x00, // i32.const 0
        0x41, 0x78, // i32.const 120
        0x36, 0x00, 0x00, // i32.store
        0x41, 0x00, // i32.const 0
        0x28, 0x00, 0x00, // i32.load
        0x0B,
    ]);
    code_body.extend(leb(body.len() as u32));
    code_body.extend(body);
    bytes.extend(section(10, code_body));

    bytes
}

fn unbound_import_module() -> Vec<u8> {
    let mut bytes = header();

    let mut type_body = leb(1);
    type_body.push(0x60);
    type_body.extend(leb(0));
    type_body.extend(leb(0));
    bytes.extend(section(1, type_body));

    let mut import_body = leb(1);
    import_body.extend(leb(3));
    import_body.extend_from_slice(b"env");
    import_body.extend(leb(9));
    import_body.extend_from_slice(b"print_i32");
    import_body.push(0x00);
    import_body.extend(leb(0));
    bytes.extend(section(2, import_body));

    let mut export_body = leb(1);
    export_body.extend(leb(4));
    export_body.extend_from_slice(b"main");
    export_body.push(0x00);
    export_body.extend(leb(0));
    bytes.extend(section(7, export_body));

    bytes
}

#[test]
fn embedder_invokes_fib_through_native_executor() {
    let bytes = fib_module();
    assert_eq!(execute_wasm_bytes(&bytes, Some("fib"), &[10]).unwrap(), Some(55));
    assert_eq!(execute_wasm_bytes(&bytes, Some("fib"), &[5]).unwrap(), Some(5));
}

#[test]
fn recursive_call_restores_caller_locals() {
    let bytes = fib_module();
    let module = Module::parse(&bytes).unwrap();
    let mut vm = Vm::new(module).unwrap();
    let func = vm.exported_function("fib").unwrap();
    assert_eq!(vm.invoke(func, &[7]).unwrap(), Some(13));
    // A second top-level call with a fresh argument must not observe any
    // state left over from the nested recursive calls above.
    assert_eq!(vm.invoke(func, &[1]).unwrap(), Some(1));
}

#[test]
fn memory_roundtrip_through_default_entry_resolution() {
    let bytes = memory_roundtrip_module();
    // No explicit `call`: resolution falls back to the `main` export.
    assert_eq!(execute_wasm_bytes(&bytes, None, &[]).unwrap(), Some(120));
}

#[test]
fn linker_binds_host_functions_onto_a_module_before_the_vm_is_built() {
    let bytes = unbound_import_module();
    let mut module = Module::parse(&bytes).unwrap();
    let mut linker = Linker::new();
    // `unbound_import_module`'s import type is `() -> ()`: the callback is
    // invoked with an empty slice, so it must not index into `args`.
    linker.define("env", "print_i32", Box::new(|_args: &[i32]| 0));
    linker.link(&mut module);

    let mut vm = Vm::new(module).unwrap();
    let func = vm.exported_function("main").unwrap();
    assert_eq!(vm.invoke(func, &[]).unwrap(), None);
}

#[test]
fn unbound_import_traps_without_poisoning_the_vm() {
    let bytes = unbound_import_module();
    let module = Module::parse(&bytes).unwrap();
    let mut vm = Vm::new(module).unwrap();
    let func = vm.exported_function("main").unwrap();

    let err = vm.invoke(func, &[]).unwrap_err();
    assert!(matches!(err, CoreError::Trap(TrapKind::UnresolvedImport)));

    // §5: a trap ends only the current invocation. The same VM instance
    // keeps working once the host binds the import the first call needed.
    wasi::bind_well_known_imports(&mut vm);
    assert_eq!(vm.invoke(func, &[]).unwrap(), None);
}
