// Command-line entry point.
// Loads configuration from the environment and runs one inventory command.

use anyhow::Result;
use clap::{Parser, Subcommand};

use skinstash::logging::{init_logging_default, init_logging_json};
use skinstash::{Config, InventoryManager};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None, propagate_version = true)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    json: bool,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// List cached inventory items
    List,

    /// Buy an item by market name unless one is already owned
    Buy {
        /// Exact market hash name
        name: String,

        /// Highest acceptable price, in minor currency units
        #[arg(long)]
        max_price: Option<u64>,
    },

    /// Withdraw an owned item by id
    Withdraw {
        id: String,
    },

    /// Print the inventory cache file path
    Path,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    if cli.json {
        init_logging_json();
    } else {
        init_logging_default();
    }

    run(cli).await
}

async fn run(cli: Cli) -> Result<()> {
    let config = Config::from_env()?;

    match cli.command {
        Commands::Path => {
            println!("{}", config.inventory_path()?.display());
        }
        Commands::List => {
            let manager = InventoryManager::connect(config).await?;
            for item in manager.items().await {
                println!("{}\t{}", item.id, item.name);
            }
        }
        Commands::Buy { name, max_price } => {
            let manager = InventoryManager::connect(config).await?;
            let item = manager.buy(&name, max_price).await?;
            println!("{}", serde_json::to_string_pretty(&item)?);
        }
        Commands::Withdraw { id } => {
            let manager = InventoryManager::connect(config).await?;
            let summary = manager.withdraw(id.as_str()).await?;
            println!("{}", serde_json::to_string_pretty(&summary)?);
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_buy() {
        let cli = Cli::try_parse_from(["skinstash", "buy", "AWP | Asiimov", "--max-price", "1500"])
            .unwrap();
        match cli.command {
            Commands::Buy { name, max_price } => {
                assert_eq!(name, "AWP | Asiimov");
                assert_eq!(max_price, Some(1500));
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_parse_withdraw_with_json_logs() {
        let cli = Cli::try_parse_from(["skinstash", "withdraw", "12345", "--json"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Withdraw { id } if id == "12345"));
    }

    #[test]
    fn test_requires_subcommand() {
        assert!(Cli::try_parse_from(["skinstash"]).is_err());
    }
}
