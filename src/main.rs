use clap::Parser;
use tracing_subscriber::{EnvFilter, fmt, prelude::*};

use sealbox::cli::{self, Cli, output};

fn main() {
    let args = Cli::parse();

    let filter = EnvFilter::try_from_env("SEALBOX_LOG").unwrap_or_else(|_| {
        if args.verbose {
            EnvFilter::new("sealbox=debug")
        } else {
            EnvFilter::new("sealbox=warn")
        }
    });

    tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .without_time(),
        )
        .init();

    output::set_quiet(args.quiet);

    if let Err(e) = cli::execute(&args) {
        output::error(&format!("Error: {e}"));
        std::process::exit(1);
    }
}
