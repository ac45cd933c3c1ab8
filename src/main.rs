mod cli;
mod commands;
mod debug;
mod error;
mod runtime;

use cli::{get_args, Commands};
use debug::enable_debug;
use error::CoreError;
use std::error::Error;

fn main() {
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("\n🔥 microwasm encountered an unexpected error:");
        eprintln!("{panic_info}");
        eprintln!("\n💡 This is likely a bug in the interpreter, not the module under test.");
    }));

    let args = get_args();

    if args.debug {
        enable_debug();
    }

    debug_println!("dispatching command: {:?}", args.command);

    let result: Result<(), CoreError> = match &args.command {
        Commands::Run { path, call, args } => commands::handle_run_command(path, call, args),
        Commands::Inspect { path } => commands::handle_inspect_command(path),
    };

    if let Err(e) = result {
        let mut error_source: &dyn Error = &e;
        eprintln!("❌ {error_source}");
        while let Some(source) = error_source.source() {
            eprintln!("   Caused by: {source}");
            error_source = source;
        }
        std::process::exit(1);
    }
}
