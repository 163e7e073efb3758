use std::path::{Path, PathBuf};

use clap::{Parser, Subcommand};
use tokio::io::{stdin, AsyncBufReadExt, BufReader};
use tokio::select;
use tracing::{error, info, warn};

use crate::balancer::registered;
use crate::config::Config;
use crate::parser::enrich;
use crate::router::{route_active, Route, RouteContext};
use crate::rule::{self, ReplicaQuerySwapper, RuleConfigSwapper};
use crate::sighup::Sighup;

/// Route SQL statements to a primary or one of its replicas.
#[derive(Parser, Debug)]
pub struct Cli {
    /// Path to the configuration file. Default: "replica_query.toml"
    #[arg(short, long, default_value = "replica_query.toml")]
    pub config: PathBuf,
    /// Subcommand.
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Route statements read from stdin, one per line.
    /// Send SIGHUP to reload the configuration.
    Run {
        /// Rule to route with.
        #[arg(short, long)]
        rule: String,
        /// Initial schema of the session.
        #[arg(short, long)]
        schema: Option<String>,
    },

    /// Check the configuration and print the rules as they were understood.
    Check,

    /// Route one statement.
    Route {
        #[arg(short, long)]
        rule: String,
        #[arg(short, long)]
        schema: Option<String>,
        query: String,
    },
}

/// Validate configuration and print it back.
pub fn check(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    let swapper = ReplicaQuerySwapper::new(&config.general);
    let rules = swapper.swap_to_object(&config.rules)?;

    info!(
        "{} rules ok [{}, order {}], load balancers: {}",
        rules.len(),
        <ReplicaQuerySwapper as RuleConfigSwapper>::TAG,
        <ReplicaQuerySwapper as RuleConfigSwapper>::ORDER,
        registered().join(", "),
    );

    let resolved = Config {
        general: config.general.clone(),
        rules: swapper.swap_to_declarative(&rules),
    };
    println!("{}", resolved.to_toml()?);

    Ok(())
}

/// Route one statement against the active rules.
pub fn route(
    rule: &str,
    schema: Option<&str>,
    query: &str,
) -> Result<Route, Box<dyn std::error::Error>> {
    let statement = enrich(query)?;
    let route = route_active(&statement, &RouteContext::new(rule).schema(schema))?;
    Ok(route)
}

/// Reload the configuration file, keeping the current rules on error.
pub fn reload(path: &Path) -> Result<u64, rule::Error> {
    let rules = rule::reload(path)?;
    info!(
        "reloaded \"{}\", {} rules [generation {}]",
        path.display(),
        rules.len(),
        rules.generation()
    );
    Ok(rules.generation())
}

/// Route statements from stdin until it's closed.
pub async fn run(
    path: &Path,
    rule: &str,
    mut schema: Option<String>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut sighup = Sighup::new()?;
    let mut lines = BufReader::new(stdin()).lines();

    loop {
        select! {
            line = lines.next_line() => {
                let Some(line) = line? else {
                    break;
                };

                let query = line.trim();
                if query.is_empty() {
                    continue;
                }

                match route(rule, schema.as_deref(), query) {
                    Ok(route) => {
                        // USE changes the session's schema.
                        schema = route.schema().map(|s| s.to_string());
                        println!("{}", serde_json::to_string(&route)?);
                    }
                    Err(err) => error!("{} [{}]", err, query),
                }
            }

            _ = sighup.listen() => {
                if let Err(err) = reload(path) {
                    warn!("SIGHUP reload failed: {}", err);
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod test {
    use std::io::Write;

    use super::*;

    #[test]
    fn test_route_args() {
        let cli = Cli::parse_from([
            "replica-query",
            "--config",
            "rules.toml",
            "route",
            "--rule",
            "pr_ds",
            "--schema",
            "sales",
            "SELECT 1",
        ]);
        assert_eq!(cli.config, PathBuf::from("rules.toml"));
        match cli.command {
            Some(Commands::Route {
                rule,
                schema,
                query,
            }) => {
                assert_eq!(rule, "pr_ds");
                assert_eq!(schema.as_deref(), Some("sales"));
                assert_eq!(query, "SELECT 1");
            }
            command => panic!("unexpected command: {:?}", command),
        }
    }

    #[test]
    fn test_reload() {
        // Same rule the router tests activate, so they keep passing.
        let mut file = tempfile::NamedTempFile::new().unwrap();
        file.write_all(
            br#"
[dataSources.route_active]
primaryDataSourceName = "primary"
replicaDataSourceNames = ["replica"]
"#,
        )
        .unwrap();

        let generation = reload(file.path()).unwrap();
        assert!(generation > 0);
        assert!(rule::rules().generation() >= generation);

        let dir = tempfile::tempdir().unwrap();
        let err = reload(dir.path()).unwrap_err();
        assert!(matches!(err, rule::Error::Config(_)));
        assert!(rule::rules().rule("route_active").is_some());
    }

    #[test]
    fn test_check() {
        let config = Config::from_toml(
            r#"
[dataSources.pr_ds]
primaryDataSourceName = "primary_ds"
replicaDataSourceNames = ["replica_ds_0", "replica_ds_1"]
"#,
        )
        .unwrap();
        assert!(check(&config).is_ok());

        let config = Config::from_toml(
            r#"
[dataSources.pr_ds]
primaryDataSourceName = "primary_ds"
replicaDataSourceNames = ["primary_ds"]
"#,
        )
        .unwrap();
        assert!(check(&config).is_err());
    }
}
