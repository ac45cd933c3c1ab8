//! Command-line surface (§4.7): `run` invokes an export, `inspect` prints
//! the decoded module's tables. Kept deliberately small — this binary is a
//! thin embedder around `runtime::core`, not a dev server.

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(author, version, about = "A minimal, host-embeddable WebAssembly interpreter", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose debug logging
    #[arg(long, global = true)]
    pub debug: bool,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Parse a module, bind the well-known host imports, and invoke an export
    Run {
        /// Path to the .wasm file
        path: String,

        /// Exported function to call (default: Start section, then `_start`, then `main`)
        #[arg(long)]
        call: Option<String>,

        /// i32 arguments to push onto the operand stack before invoking
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        args: Vec<i32>,
    },

    /// Decode a module and print its types, imports, exports, and function count
    Inspect {
        /// Path to the .wasm file
        path: String,
    },
}

pub fn get_args() -> Args {
    Args::parse()
}
