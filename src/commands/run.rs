//! `run` command: parse a module, bind the well-known host imports, invoke
//! an export, and print the result (§4.7).

use crate::error::{CoreError, Result};
use crate::runtime::core::native_executor;

pub fn handle_run_command(path: &str, call: &Option<String>, args: &[i32]) -> Result<()> {
    if !path.ends_with(".wasm") {
        return Err(CoreError::cli(format!("expected a .wasm file, got: {path}")));
    }

    println!("🎯 Running WASM file: {path}");
    if let Some(func) = call {
        println!("📍 Calling: {func}");
    }
    if !args.is_empty() {
        let rendered: Vec<String> = args.iter().map(i32::to_string).collect();
        println!("📝 Arguments: {}", rendered.join(" "));
    }

    let result = native_executor::execute_wasm_file(path, call.as_deref(), args)?;

    match result {
        Some(value) => println!("✅ Result: {value}"),
        None => println!("✅ Execution completed (no result)"),
    }

    Ok(())
}
