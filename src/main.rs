//! replica-query, read/write splitting router.

use clap::Parser;
use replica_query::cli::{self, Cli, Commands};
use replica_query::{config, logger, rule};
use tokio::runtime::Builder;
use tracing::info;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Cli::parse();
    logger();

    info!("replica-query {}", env!("CARGO_PKG_VERSION"));

    let config = config::load(&args.config)?;

    match args.command {
        None | Some(Commands::Check) => cli::check(&config),

        Some(Commands::Route {
            rule: name,
            schema,
            query,
        }) => {
            rule::activate(&config)?;
            let route = cli::route(&name, schema.as_deref(), &query)?;
            println!("{}", serde_json::to_string_pretty(&route)?);
            Ok(())
        }

        Some(Commands::Run { rule: name, schema }) => {
            rule::activate(&config)?;

            let runtime = match config.general.workers {
                0 => {
                    let mut binding = Builder::new_current_thread();
                    binding.enable_all();
                    binding
                }
                workers => {
                    info!("spawning {} workers", workers);
                    let mut builder = Builder::new_multi_thread();
                    builder.worker_threads(workers).enable_all();
                    builder
                }
            }
            .build()?;

            runtime.block_on(cli::run(&args.config, &name, schema))
        }
    }
}
