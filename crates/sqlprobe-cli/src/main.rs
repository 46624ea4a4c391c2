use anyhow::Result;
use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::{Path, PathBuf};

use sqlprobe_catalog::CatalogReader;
use sqlprobe_core::{ConnectionParameters, ProbeConfig, DEFAULT_PORT};
use sqlprobe_session::{MockSession, Session};

/// sqlprobe - connector and catalog probe for the SQL-testing harness
#[derive(Parser)]
#[command(name = "sqlprobe")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Path to config file (default: sqlprobe.toml)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the provisioning and introspection flow against the in-memory
    /// mock, with no backend dependency
    Mock,

    /// Run the flow against a live backend
    Probe {
        /// Backend hostname
        #[arg(long)]
        host: Option<String>,

        /// Backend port
        #[arg(long)]
        port: Option<u16>,

        /// Database to connect to
        #[arg(long)]
        database: Option<String>,

        /// Username (password is read from SQLPROBE_PASSWORD)
        #[arg(long)]
        user: Option<String>,

        /// Scratch database to provision
        #[arg(long)]
        scratch: Option<String>,

        /// Connect with TLS
        #[arg(long)]
        tls: bool,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();

    let config = match &cli.config {
        Some(path) => Some(ProbeConfig::from_file(path)?),
        None if Path::new("sqlprobe.toml").exists() => {
            Some(ProbeConfig::from_file(Path::new("sqlprobe.toml"))?)
        }
        None => None,
    };

    match cli.command {
        Commands::Mock => {
            let scratch = config
                .as_ref()
                .map(|c| c.scratch_database.clone())
                .unwrap_or_else(|| "sqlancer_test".to_string());
            let mut session = MockSession::new();
            run(&mut session, &scratch).await
        }
        Commands::Probe {
            host,
            port,
            database,
            user,
            scratch,
            tls,
        } => {
            let scratch = scratch
                .or_else(|| config.as_ref().map(|c| c.scratch_database.clone()))
                .unwrap_or_else(|| "sqlancer_test".to_string());
            let mut params = config
                .map(|c| c.connection)
                .unwrap_or_else(|| ConnectionParameters::new("localhost", DEFAULT_PORT, "default"));
            if let Some(host) = host {
                params.host = host;
            }
            if let Some(port) = port {
                params.port = port;
            }
            if let Some(database) = database {
                params.database = database;
            }
            if let Some(user) = user {
                params.username = Some(user);
            }
            if let Ok(password) = std::env::var("SQLPROBE_PASSWORD") {
                params.password = Some(password);
            }
            probe(params, &scratch, tls).await
        }
    }
}

#[cfg(feature = "backend-postgres")]
async fn probe(params: ConnectionParameters, scratch: &str, tls: bool) -> Result<()> {
    use sqlprobe_session::RemoteSession;

    let mut session = if tls {
        RemoteSession::with_tls(params)
    } else {
        RemoteSession::new(params)
    };
    run(&mut session, scratch).await
}

#[cfg(not(feature = "backend-postgres"))]
async fn probe(_params: ConnectionParameters, _scratch: &str, _tls: bool) -> Result<()> {
    anyhow::bail!(
        "remote backend support not compiled; rebuild with: cargo build --features backend-postgres"
    )
}

/// Connect, run the demo flow, and close on every path.
async fn run(session: &mut dyn Session, scratch: &str) -> Result<()> {
    session.connect().await?;
    println!(
        "{} {} backend",
        "Connected to".green().bold(),
        session.backend_name()
    );

    let result = flow(session, scratch).await;
    session.close().await;
    println!("{}", "Session closed".dimmed());
    result
}

async fn flow(session: &mut dyn Session, scratch: &str) -> Result<()> {
    CatalogReader::new(&mut *session)
        .provision_database(scratch)
        .await?;
    println!("{} {scratch}", "Provisioned scratch database".green());

    session
        .execute_statement("CREATE TABLE test_table (id INT, name STRING, value DOUBLE)")
        .await?;
    session
        .execute_statement("INSERT INTO test_table VALUES (1, 'test1', 10.5), (2, 'test2', 20.3)")
        .await?;

    let mut catalog = CatalogReader::new(&mut *session);
    let tables = catalog.list_tables().await?;
    println!("{}", "Tables:".bold());
    for table in &tables {
        println!("  {table}");
    }

    for table in &tables {
        let columns = catalog.describe_columns(table).await?;
        println!("{} {table}:", "Columns in".bold());
        for column in columns {
            println!("  {column}");
        }
    }
    Ok(())
}
