//! Command-line consumer of the items repository.
//!
//! # Responsibility
//! - Wire one storage handle into `OfflineItemsRepository` at startup.
//! - Map subcommands onto repository calls; nothing here touches SQL.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use futures::StreamExt;
use inventory_core::{
    default_log_level, init_logging, DatabaseConfig, InventoryDatabase, Item, ItemId,
    ItemsRepository, MismatchPolicy, OfflineItemsRepository, SCHEMA_VERSION,
};
use log::info;
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "inventory")]
#[command(author, version, about = "Inspect and edit the local item inventory", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Database file
    #[arg(long, global = true, default_value = "item_database")]
    db: PathBuf,

    /// Use a throwaway in-memory store instead of --db
    #[arg(long, global = true)]
    in_memory: bool,

    /// Expected schema version
    #[arg(long, global = true, default_value_t = SCHEMA_VERSION)]
    schema_version: u32,

    /// Fail instead of wiping the store on a schema version mismatch
    #[arg(long, global = true)]
    reject_mismatch: bool,

    /// Absolute directory for rolling log files (logging is off when unset)
    #[arg(long, global = true)]
    log_dir: Option<PathBuf>,

    /// trace|debug|info|warn|error
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// List all items ordered by name
    List,

    /// Show one item
    Show { id: ItemId },

    /// Add an item; the id is assigned unless --id is given
    Add {
        name: String,
        price: f64,
        quantity: i64,
        #[arg(long)]
        id: Option<ItemId>,
    },

    /// Replace name, price and quantity of an existing item
    Update {
        id: ItemId,
        name: String,
        price: f64,
        quantity: i64,
    },

    /// Delete an item
    Delete { id: ItemId },

    /// Print the item list every time it changes (Ctrl-C to stop)
    Watch,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if let Some(log_dir) = &cli.log_dir {
        let level = cli.log_level.as_deref().unwrap_or(default_log_level());
        init_logging(level, log_dir)
            .map_err(|err| anyhow::anyhow!("failed to initialize logging: {err}"))?;
    }

    let db = InventoryDatabase::open(database_config(&cli)).context("failed to open inventory")?;
    let repo: Arc<dyn ItemsRepository> = Arc::new(OfflineItemsRepository::new(db.item_dao()));

    let outcome = run(cli.command, repo.as_ref()).await;
    db.close().context("failed to close inventory")?;
    outcome
}

fn database_config(cli: &Cli) -> DatabaseConfig {
    let config = if cli.in_memory {
        DatabaseConfig::in_memory(cli.schema_version)
    } else {
        DatabaseConfig::file(&cli.db, cli.schema_version)
    };
    if cli.reject_mismatch {
        config.with_mismatch_policy(MismatchPolicy::Reject)
    } else {
        config
    }
}

async fn run(command: Commands, repo: &dyn ItemsRepository) -> Result<()> {
    match command {
        Commands::List => {
            let items = first(repo.get_all_items_stream()).await?;
            print_items(&items);
        }
        Commands::Show { id } => match first(repo.get_item_stream(id)).await? {
            Some(item) => print_items(std::slice::from_ref(&item)),
            None => bail!("item {id} not found"),
        },
        Commands::Add {
            name,
            price,
            quantity,
            id,
        } => {
            let item = match id {
                Some(id) => Item::with_id(id, name, price, quantity),
                None => Item::new(name, price, quantity),
            };
            repo.insert_item(&item).await?;
            info!("event=cli_add module=cli status=ok");
        }
        Commands::Update {
            id,
            name,
            price,
            quantity,
        } => {
            repo.update_item(&Item::with_id(id, name, price, quantity))
                .await?;
        }
        Commands::Delete { id } => {
            let Some(item) = first(repo.get_item_stream(id)).await? else {
                bail!("item {id} not found");
            };
            repo.delete_item(&item).await?;
        }
        Commands::Watch => {
            let mut items = repo.get_all_items_stream();
            loop {
                tokio::select! {
                    next = items.next() => match next {
                        Some(snapshot) => {
                            print_items(&snapshot?);
                            println!();
                        }
                        None => break,
                    },
                    _ = tokio::signal::ctrl_c() => break,
                }
            }
        }
    }
    Ok(())
}

async fn first<T>(
    mut stream: futures::stream::BoxStream<'static, inventory_core::RepoResult<T>>,
) -> Result<T> {
    match stream.next().await {
        Some(value) => Ok(value?),
        None => bail!("live query ended before emitting"),
    }
}

fn print_items(items: &[Item]) {
    if items.is_empty() {
        println!("(no items)");
        return;
    }
    println!("{:>6}  {:<24} {:>10} {:>8}", "id", "name", "price", "qty");
    for item in items {
        println!(
            "{:>6}  {:<24} {:>10.2} {:>8}",
            item.id, item.name, item.price, item.quantity
        );
    }
}
