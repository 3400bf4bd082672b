use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use configuration::Config;
use database::{DbRepository, SchemaOutcome};

/// The main entry point for the mining database tool.
#[tokio::main]
async fn main() {
    // A missing .env file is fine; the config file and real environment still apply.
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let config = match configuration::load_config(cli.config.as_deref()) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    let _log_guard = match configuration::init_tracing(&config.logging) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("{e}");
            std::process::exit(1);
        }
    };

    // Any error reaching this point is fatal: log it with its full chain and stop.
    if let Err(e) = run(cli.command, config).await {
        tracing::error!("{e:#}");
        std::process::exit(1);
    }
}

// ==============================================================================
// CLI Structure
// ==============================================================================

/// Maintains the mining automation database and resolves miners and pools.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to the configuration file (defaults to `config.toml` if present).
    #[arg(long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Send a notification e-mail using the configured SMTP server.
    Notify {
        #[arg(long)]
        subject: String,
        #[arg(long)]
        body: String,
    },
    #[command(flatten)]
    Db(DbCommands),
}

/// Commands that need the database. The schema is verified before each of them runs.
#[derive(Subcommand)]
enum DbCommands {
    /// Verify the database schema and migrate it if it is behind.
    Migrate,
    /// Look up a miner by name, creating it if needed, and print its id.
    Miner {
        /// The unique name of the mining hardware.
        name: String,
    },
    /// Look up an algorithm by name, creating it if needed, and print its id.
    Algorithm {
        /// The algorithm name, e.g. "scrypt".
        name: String,
    },
    /// Print the stratum URL of a pool for an algorithm.
    PoolUrl {
        /// The database id of the algorithm.
        algorithm_id: i64,
    },
}

async fn run(command: Commands, config: Config) -> Result<()> {
    match command {
        Commands::Notify { subject, body } => {
            alerter::send_email(&config.email, &subject, &body).await;
            Ok(())
        }
        Commands::Db(command) => run_db(command, &config).await,
    }
}

async fn run_db(command: DbCommands, config: &Config) -> Result<()> {
    let (repo, outcome) = open_repository(config).await?;

    match command {
        DbCommands::Migrate => println!("{}", describe_outcome(outcome)),
        DbCommands::Miner { name } => {
            let id = repo
                .resolve_miner(&name)
                .await
                .with_context(|| format!("Failed to resolve miner `{name}`"))?;
            println!("{id}");
        }
        DbCommands::Algorithm { name } => {
            let id = repo
                .resolve_algorithm(&name)
                .await
                .with_context(|| format!("Failed to resolve algorithm `{name}`"))?;
            println!("{id}");
        }
        DbCommands::PoolUrl { algorithm_id } => {
            let url = repo.resolve_pool_url(algorithm_id).await?;
            println!("{url}");
        }
    }

    Ok(())
}

/// Connects and makes sure the schema is current before anything else touches it.
async fn open_repository(config: &Config) -> Result<(DbRepository, SchemaOutcome)> {
    let pool = database::connect(&config.database)
        .await
        .context("Failed to connect to the database server")?;
    let repo = DbRepository::new(pool);
    let outcome = repo
        .verify_and_update_schema()
        .await
        .context("Schema verification failed")?;
    Ok((repo, outcome))
}

fn describe_outcome(outcome: SchemaOutcome) -> String {
    match outcome {
        SchemaOutcome::Initialized => {
            format!("Schema created at version {}.", core_types::SCHEMA_VERSION)
        }
        SchemaOutcome::Upgraded { from } => {
            format!("Schema upgraded from version {from} to {}.", core_types::SCHEMA_VERSION)
        }
        SchemaOutcome::Current { version } => format!("Schema is current (version {version})."),
    }
}
