//! pgtable-sync CLI
//!
//! Command-line tool that keeps one PostgreSQL table in line with its JSON
//! definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{Level, info};
use tracing_subscriber::FmtSubscriber;

use pgtable_core::{plan_create, plan_update};
use pgtable_sync::prelude::*;

/// Declarative PostgreSQL table management.
#[derive(Parser)]
#[command(name = "pgtable-sync")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(flatten)]
    connection: ConnectionConfig,

    /// State file recording the last applied definition.
    #[arg(short, long, env = "PGTABLE_STATE", default_value = "pgtable.state.json")]
    state: PathBuf,

    /// Enable verbose output.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the statements a definition would run, without connecting.
    Plan {
        /// Table definition file (JSON).
        #[arg(short, long)]
        definition: PathBuf,
    },

    /// Create the table or converge it to the definition.
    Apply {
        /// Table definition file (JSON).
        #[arg(short, long)]
        definition: PathBuf,

        /// Log the SQL without executing it.
        #[arg(long)]
        dry_run: bool,

        /// Run all statements in one transaction.
        #[arg(long)]
        transactional: bool,
    },

    /// Read the live columns of the tracked table.
    Read,

    /// Stop tracking the table. The table itself is kept.
    Forget,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let log_level = if cli.verbose {
        Level::DEBUG
    } else {
        Level::INFO
    };
    let subscriber = FmtSubscriber::builder()
        .with_max_level(log_level)
        .with_target(false)
        .without_time()
        .finish();
    tracing::subscriber::set_global_default(subscriber)?;

    let state = StateFile::new(&cli.state);
    let registry = ConnectionRegistry::new();

    match cli.command {
        Commands::Plan { definition } => {
            let desired = TableDefinition::from_path(&definition)?.into_state()?;
            let statements = match state.load()? {
                None => vec![plan_create(&desired)?],
                Some(record) => plan_update(&record.declared, &desired)?,
            };

            if statements.is_empty() {
                info!(table = %desired.identity, "No changes.");
            } else {
                for statement in &statements {
                    println!("{statement};");
                }
            }
        }

        Commands::Apply {
            definition,
            dry_run,
            transactional,
        } => {
            let desired = TableDefinition::from_path(&definition)?.into_state()?;
            let mode = if transactional {
                ApplyMode::Transactional
            } else {
                ApplyMode::Sequential
            };
            let pool = registry.connect(&cli.connection)?;
            let resource = TableResource::new(Reconciler::new(pool).mode(mode).dry_run(dry_run));

            let record = match state.load()? {
                None => match resource.create(desired).await {
                    Ok(record) => record,
                    Err(CreateFailure { record, error }) => {
                        if let Some(record) = record.filter(|_| !dry_run) {
                            state.save(&record)?;
                        }
                        return Err(error.into());
                    }
                },
                Some(record) => match resource.update(record, desired).await {
                    Ok(record) => record,
                    Err(UpdateFailure { record, error }) => {
                        if !dry_run {
                            state.save(&record)?;
                        }
                        return Err(error.into());
                    }
                },
            };

            if dry_run {
                info!("Dry run, state file left unchanged.");
            } else {
                state.save(&record)?;
                info!(
                    table = %record.declared.identity,
                    state = %state.path().display(),
                    "Table is up to date."
                );
            }
        }

        Commands::Read => {
            let record = state.load_required()?;
            let pool = registry.connect(&cli.connection)?;
            let resource = TableResource::new(Reconciler::new(pool));

            let record = resource.read(record).await?;
            state.save(&record)?;

            println!("\n{}:", record.declared.identity);
            println!("{:-<60}", "");
            if let Some(observed) = &record.observed {
                for column in &observed.columns {
                    println!(" {:<30} {}", column.name, column.column_type);
                }
            }
            println!();
        }

        Commands::Forget => {
            let record = state.load_required()?;
            info!(
                id = %record.id,
                state = %state.path().display(),
                "Forgetting table, the database is left unchanged."
            );
            state.remove()?;
        }
    }

    registry.clear();
    Ok(())
}
