//! Command-line interface for ldap-sql-sync
//!
//! # Usage Examples
//!
//! ## Bootstrap
//! ```bash
//! # Tables, indexes and the default data group, skipped if already initialized
//! CN_JCA_CLIENT_ID=1800.6c5faab4 ldap-sql-sync bootstrap \
//!   --dialect pgsql \
//!   --connection-string "host=localhost user=jans password=secret dbname=jans" \
//!   --data-mapping /app/static/data_mapping.json --data-group default
//!
//! # Schema only
//! ldap-sql-sync bootstrap --connection-string mysql://... --skip-data
//! ```
//!
//! ## Offline
//! ```bash
//! ldap-sql-sync plan --dialect mysql
//! ldap-sql-sync transform --dialect mysql /app/tmp/jans-auth/clients.ldif
//! ```

use anyhow::Context;
use clap::{Parser, Subcommand};
use ldap_sql_sync::config::{CatalogOpts, DataOpts, DialectOpts, MarkerOpts, PhaseOpts};
use ldap_sql_sync::plan::{plan_statements, row_to_json_line, transform_file};
use ldap_sql_sync::{connect_client, Bootstrap, BootstrapOptions, DataPlan, Marker};
use std::path::PathBuf;
use sync_core::SqlClient;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "ldap-sql-sync")]
#[command(about = "Bootstrap MySQL or PostgreSQL from a directory schema and LDIF data")]
#[command(long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Create tables and indexes, then load the data files
    Bootstrap {
        #[command(flatten)]
        dialect: DialectOpts,

        /// Target database connection string
        #[arg(long, env = "SQL_CONNECTION_STRING")]
        connection_string: String,

        #[command(flatten)]
        catalogs: CatalogOpts,

        #[command(flatten)]
        marker: MarkerOpts,

        #[command(flatten)]
        data: DataOpts,

        #[command(flatten)]
        phases: PhaseOpts,
    },

    /// Print the CREATE TABLE and CREATE INDEX statements without connecting
    Plan {
        #[command(flatten)]
        dialect: DialectOpts,

        #[command(flatten)]
        catalogs: CatalogOpts,
    },

    /// Print the rows an LDIF file produces, one JSON object per line
    Transform {
        #[command(flatten)]
        dialect: DialectOpts,

        #[command(flatten)]
        catalogs: CatalogOpts,

        /// LDIF files to transform
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info")),
        )
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Bootstrap {
            dialect,
            connection_string,
            catalogs,
            marker,
            data,
            phases,
        } => {
            run_bootstrap(
                dialect,
                &connection_string,
                catalogs,
                marker,
                data,
                phases,
            )
            .await?
        }
        Commands::Plan { dialect, catalogs } => {
            let translator = catalogs.load_translator(dialect.dialect)?;
            for statement in plan_statements(&translator)? {
                println!("{statement}\n");
            }
        }
        Commands::Transform {
            dialect,
            catalogs,
            files,
        } => {
            let translator = catalogs.load_translator(dialect.dialect)?;
            for path in &files {
                for row in transform_file(&translator, path)? {
                    println!("{}", row_to_json_line(&row));
                }
            }
        }
    }

    Ok(())
}

async fn run_bootstrap(
    dialect: DialectOpts,
    connection_string: &str,
    catalogs: CatalogOpts,
    marker: MarkerOpts,
    data: DataOpts,
    phases: PhaseOpts,
) -> anyhow::Result<()> {
    let dialect = dialect.dialect;
    let translator = catalogs.load_translator(dialect)?;

    let data_plan = if phases.skip_data {
        None
    } else {
        match data.load_mapping()? {
            Some(mapping) => Some(DataPlan {
                mapping,
                groups: data.data_groups.clone(),
                templates_dir: data.templates_dir.clone(),
                render_dir: data.render_dir.clone(),
                context: data.load_context()?,
            }),
            None => {
                warn!("No --data-mapping given, data files will not be loaded");
                None
            }
        }
    };

    let options = BootstrapOptions {
        skip_initialized: marker.skip_initialized,
        marker: marker.marker_id.map(|id| Marker {
            table: marker.marker_table,
            id,
        }),
        skip_tables: phases.skip_tables,
        skip_indexes: phases.skip_indexes,
        data: data_plan,
    };

    let client = connect_client(dialect, connection_string).await?;
    let result = Bootstrap::new(&translator, client.as_ref())
        .run(&options)
        .await;
    if let Err(e) = client.close().await {
        warn!("Failed to close the target connection: {e}");
    }
    let report = result.context("Bootstrap failed")?;

    if report.already_initialized {
        info!("Nothing to do");
    } else {
        info!("Bootstrap completed");
    }
    Ok(())
}
