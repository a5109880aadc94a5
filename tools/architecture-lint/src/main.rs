//! Runs the architecture lint over `client/src` and exits non-zero on any
//! boundary violation.
//!
//! The client directory defaults to `client/` beside this tool's workspace
//! and can be overridden with the first argument.

use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

fn default_client_dir() -> PathBuf {
    // tools/architecture-lint -> workspace root
    Path::new(env!("CARGO_MANIFEST_DIR"))
        .ancestors()
        .nth(2)
        .map_or_else(|| PathBuf::from("."), Path::to_path_buf)
        .join("client")
}

fn main() -> ExitCode {
    let client_dir = std::env::args_os()
        .nth(1)
        .map_or_else(default_client_dir, PathBuf::from);

    match architecture_lint::lint_client_sources(&client_dir) {
        Ok(()) => {
            let _ = writeln!(
                io::stdout().lock(),
                "client layer boundaries hold ({})",
                client_dir.display()
            );
            ExitCode::SUCCESS
        }
        Err(err) => {
            let _ = writeln!(io::stderr().lock(), "{err}");
            ExitCode::FAILURE
        }
    }
}
