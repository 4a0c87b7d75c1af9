use clap::Parser;
use htpy_scanner::args::default_base_dir;
use htpy_scanner::{watch, Cli, TemplateScanner};
use tracing_subscriber::EnvFilter;

fn init_logging(verbose: bool) {
    let default_level = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .without_time()
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let cli = Cli::parse();
    init_logging(cli.verbose);

    let config = match cli.to_config(&default_base_dir()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };
    let scanner = TemplateScanner::new(config);

    if let Err(e) = scanner.run_once() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    if cli.watch {
        watch::watch(&scanner).await?;
    }

    Ok(())
}
