//! buildgate CLI - run builds and dependency restores without overlap
//!
//! Binary name: `buildgate`

use std::process;

mod cli;
mod commands;

use cli::handlers::{format_error, run_cli};
use tracing_subscriber::filter::LevelFilter;

#[tokio::main]
async fn main() {
    // Logs go to stderr so build output on stdout stays clean.
    // RUST_LOG wins when set; info otherwise.
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::builder()
                .with_default_directive(LevelFilter::INFO.into())
                .from_env_lossy(),
        )
        .with_writer(std::io::stderr)
        .init();

    if let Err(err) = run_cli().await {
        #[allow(clippy::print_stderr)]
        {
            eprintln!("Error: {}", format_error(&err));
        }

        let code = err
            .downcast_ref::<buildgate_core::Error>()
            .map_or(1, buildgate_core::Error::exit_code);

        #[allow(clippy::exit)]
        process::exit(code);
    }
}
