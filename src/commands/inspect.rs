//! `inspect` command: decode a module and print its tables without running
//! anything (§4.7). Scoped to what this decoder actually retains — no
//! wasm-bindgen/AssemblyScript/TinyGo producer detection, since none of that
//! applies to this core's i32-only decoder.

use std::fs;

use crate::error::Result;
use crate::runtime::core::module::{ExportKind, Module};

pub fn handle_inspect_command(path: &str) -> Result<()> {
    let bytes = fs::read(path)?;
    let module = Module::parse(&bytes)?;

    println!("🔍 Inspecting WebAssembly file: {path}");
    println!();
    println!("Types ({}):", module.types.len());
    for (i, ty) in module.types.iter().enumerate() {
        println!(
            "  [{i}] ({} params) -> ({} results)",
            ty.param_count(),
            ty.results.len()
        );
    }

    println!();
    println!("Imports ({}):", module.function_imports.len());
    for import in &module.function_imports {
        let bound = if import.callback.is_some() { "bound" } else { "unbound" };
        println!("  {}.{} (type {}, {bound})", import.module, import.field, import.type_index);
    }

    println!();
    println!(
        "Functions: {} imported, {} defined ({} total)",
        module.function_imports.len(),
        module.functions.len(),
        module.function_imports.len() + module.functions.len()
    );

    println!();
    println!("Exports ({}):", module.exports.len());
    let mut names: Vec<&String> = module.exports.keys().collect();
    names.sort();
    for name in names {
        let export = &module.exports[name];
        let kind = match export.kind {
            ExportKind::Function => "function",
            ExportKind::Memory => "memory",
        };
        println!("  {name} -> {kind} #{}", export.index);
    }

    if let Some(memory) = module.memory {
        println!();
        println!(
            "Memory: {} initial page(s), max {}",
            memory.initial,
            memory
                .maximum
                .map(|m| m.to_string())
                .unwrap_or_else(|| "unbounded".to_string())
        );
    }

    println!();
    println!("Data segments: {}", module.data_segments.len());

    if let Some(start) = module.start {
        println!("Start function: #{start}");
    }

    println!();
    println!("Inspection completed successfully.");
    Ok(())
}
