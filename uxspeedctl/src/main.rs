use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = uxspeedctl::Cli::parse();
    if let Err(err) = uxspeedctl::run(cli) {
        eprintln!("error: {err}");
        std::process::exit(1);
    }
}
