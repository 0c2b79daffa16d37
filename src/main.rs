use clap::Parser;
use shareflow::cli::commands::{Cli, Commands};
use shareflow::cli::handlers::{self, Context};
use shareflow::io::{config_io, paths};
use tracing_subscriber::EnvFilter;

/// Log to stderr. RUST_LOG wins over the config filter; -v forces debug.
fn init_logging(config_filter: &str, verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("shareflow=debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(config_filter))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let data_dir = paths::data_dir(cli.data_dir.as_deref());

    match cli.command {
        Commands::Init(args) => {
            // Init runs before config is loaded so it can replace a broken one
            init_logging("warn", cli.verbose);
            if let Err(e) = handlers::cmd_init(args, &data_dir) {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
        command => {
            let config = match config_io::load_config(&data_dir) {
                Ok(config) => config,
                Err(e) => {
                    eprintln!("error: {}", e);
                    std::process::exit(1);
                }
            };
            init_logging(&config.log.filter, cli.verbose);
            tracing::debug!(data_dir = %data_dir.display(), "starting");

            let ctx = Context {
                data_dir,
                config,
                json: cli.json,
            };
            if let Err(e) = handlers::dispatch(command, ctx).await {
                eprintln!("error: {}", e);
                std::process::exit(1);
            }
        }
    }
}
