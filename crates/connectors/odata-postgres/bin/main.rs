use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::{filter::LevelFilter, fmt, prelude::*, EnvFilter};

use odata_postgres::{routes, state};
use odata_postgres_configuration::environment::ProcessEnvironment;
use odata_postgres_configuration::introspection::create_pool;
use odata_postgres_configuration::version1::{self, ParsedConfiguration};
use odata_postgres_configuration::{
    make_runtime_configuration, Configuration, DatabaseIntrospector, SchemaIntrospector,
};

/// Serve the tables of a PostgreSQL schema as OData entity sets.
#[derive(Parser)]
#[command(version)]
struct Cli {
    /// The directory holding configuration.json.
    #[arg(
        long,
        global = true,
        env = "ODATA_CONFIGURATION_DIRECTORY",
        default_value = "."
    )]
    configuration: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Run the HTTP server.
    Serve {
        #[arg(long, default_value = "0.0.0.0")]
        host: std::net::IpAddr,
        #[arg(long, env = "PORT", default_value_t = 8080)]
        port: u16,
    },
    /// Write a default configuration and its JSON schema.
    Initialize,
    /// Read the database schema and print the entity model it gives.
    Introspect,
}

#[tokio::main]
pub async fn main() -> ExitCode {
    init_tracing();
    let cli = Cli::parse();

    let result = match cli.command {
        Command::Serve { host, port } => {
            serve(&cli.configuration, SocketAddr::new(host, port)).await
        }
        Command::Initialize => initialize(&cli.configuration).await,
        Command::Introspect => introspect(&cli.configuration).await,
    };
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(error) => {
            tracing::error!("{error:#}");
            ExitCode::FAILURE
        }
    }
}

/// Log to stderr, filtered by `ODATA_LOG` (default `info`).
fn init_tracing() {
    let filter = EnvFilter::builder()
        .with_default_directive(LevelFilter::INFO.into())
        .with_env_var("ODATA_LOG")
        .from_env_lossy();
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

async fn read_configuration(configuration_dir: &Path) -> anyhow::Result<Configuration> {
    let parsed = version1::parse_configuration(configuration_dir).await?;
    Ok(make_runtime_configuration(parsed, ProcessEnvironment)?)
}

async fn serve(configuration_dir: &Path, address: SocketAddr) -> anyhow::Result<()> {
    let configuration = read_configuration(configuration_dir).await?;
    let state = state::create_state(&configuration).await?;
    let router = routes::create_router(state);

    tracing::info!(%address, schema = %configuration.schema_name, "Starting server");
    axum::Server::bind(&address)
        .serve(router.into_make_service())
        .with_graceful_shutdown(async {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutting down");
        })
        .await
        .context("running the server")
}

async fn initialize(configuration_dir: &Path) -> anyhow::Result<()> {
    let configuration_file = configuration_dir.join(version1::CONFIGURATION_FILENAME);
    if tokio::fs::try_exists(&configuration_file).await? {
        anyhow::bail!("{} already exists", configuration_file.display());
    }
    version1::write_parsed_configuration(ParsedConfiguration::initial(), configuration_dir)
        .await?;
    tracing::info!(directory = %configuration_dir.display(), "Wrote the default configuration");
    Ok(())
}

async fn introspect(configuration_dir: &Path) -> anyhow::Result<()> {
    let configuration = read_configuration(configuration_dir).await?;
    let pool = create_pool(&configuration)?;
    let introspector = SchemaIntrospector::new(
        Arc::new(DatabaseIntrospector::new(pool, &configuration)),
        configuration.naming.clone(),
    );
    let model = introspector.scan().await?;
    println!("{}", serde_json::to_string_pretty(&*model)?);
    Ok(())
}
