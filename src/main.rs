use clap::Parser;
use tmx::cli::{run_cli, Args};
use tracing_subscriber::{fmt, EnvFilter};

#[tokio::main]
async fn main() {
    // Initialize logging
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();

    // Only bad arguments make it back here; actions report their own errors
    if let Err(e) = run_cli(args).await {
        eprintln!("Error: {}", e);
        std::process::exit(if e.is_usage() { 2 } else { 1 });
    }
}
