use anyhow::Result;
use clap::Parser;
use formcheck::cli;
use tracing::error;

fn main() -> Result<()> {
    let args = cli::Args::parse();
    if let Err(err) = cli::dispatch(args) {
        // Dispatch can fail before logging is initialized (config load,
        // input validation); make sure the error still reaches stderr.
        if tracing::dispatcher::has_been_set() {
            error!("{:#}", err);
        } else {
            eprintln!("formcheck: {err:#}");
        }
        std::process::exit(1);
    }
    Ok(())
}
