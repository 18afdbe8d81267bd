use anyhow::Result;
use clap::Parser;
use std::path::PathBuf;
use wb_supplies::{
    commands::{self, Services, config::Config},
    runtime::RealRuntime,
};

/// wb-supplies - Wildberries supplies client
///
/// Lists, creates and transitions marketplace supplies and their orders.
/// Account tokens are read from a JSON file mapping account names to API tokens.
///
/// Examples:
///   wb-supplies supplies list --open      # Open supplies of the only account
///   wb-supplies -a main supplies create "Лот 1"
#[derive(Parser, Debug)]
#[command(author, version = env!("WB_SUPPLIES_VERSION"), about)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Tokens file (defaults to <config dir>/wb-supplies/tokens.json)
    #[arg(
        long = "tokens",
        short = 't',
        env = "WB_TOKENS_FILE",
        value_name = "PATH",
        global = true
    )]
    pub tokens_file: Option<PathBuf>,

    /// Account to act as (may be omitted when only one is configured)
    #[arg(
        long = "account",
        short = 'a',
        env = "WB_ACCOUNT",
        value_name = "NAME",
        global = true
    )]
    pub account: Option<String>,

    /// Supplies API URL
    #[arg(long = "supplies-url", env = "WB_SUPPLIES_URL", value_name = "URL", global = true)]
    pub supplies_url: Option<String>,

    /// Orders API URL
    #[arg(long = "orders-url", env = "WB_ORDERS_URL", value_name = "URL", global = true)]
    pub orders_url: Option<String>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Manage supplies
    Supplies {
        #[command(subcommand)]
        command: SuppliesCommand,
    },

    /// Inspect orders
    Orders {
        #[command(subcommand)]
        command: OrdersCommand,
    },

    /// List configured accounts
    Accounts,
}

#[derive(clap::Subcommand, Debug)]
enum SuppliesCommand {
    /// List supplies
    List {
        /// Only supplies that are not done
        #[arg(long)]
        open: bool,
    },

    /// Show the orders of a supply
    Orders {
        #[arg(value_name = "SUPPLY_ID")]
        supply_id: String,
    },

    /// Create a supply
    Create {
        #[arg(value_name = "NAME")]
        name: String,
    },

    /// Attach an order to a supply
    AddOrder {
        #[arg(value_name = "SUPPLY_ID")]
        supply_id: String,
        #[arg(value_name = "ORDER_ID")]
        order_id: u64,
    },

    /// Delete an empty supply
    Delete {
        #[arg(value_name = "SUPPLY_ID")]
        supply_id: String,
    },

    /// Hand a supply over to delivery
    Deliver {
        #[arg(value_name = "SUPPLY_ID")]
        supply_id: String,
    },
}

#[derive(clap::Subcommand, Debug)]
enum OrdersCommand {
    /// List new orders
    New,

    /// List all orders
    List,

    /// Show statuses of orders in a supply
    Status {
        #[arg(value_name = "SUPPLY_ID")]
        supply_id: String,
        #[arg(value_name = "ORDER_ID", required = true)]
        order_ids: Vec<u64>,
    },

    /// Fetch PNG stickers for orders in a supply
    Stickers {
        #[arg(value_name = "SUPPLY_ID")]
        supply_id: String,
        #[arg(value_name = "ORDER_ID", required = true)]
        order_ids: Vec<u64>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();
    let runtime = RealRuntime;

    let config = Config::load(
        &runtime,
        cli.tokens_file,
        cli.account,
        cli.supplies_url,
        cli.orders_url,
    )?;

    let output = match cli.command {
        Commands::Accounts => serde_json::to_value(commands::accounts(&config.tokens))?,
        Commands::Supplies { command } => {
            let services = Services::from_config(&config)?;
            run_supplies(&services, command).await?
        }
        Commands::Orders { command } => {
            let services = Services::from_config(&config)?;
            run_orders(&services, command).await?
        }
    };

    commands::print_json(&output)
}

async fn run_supplies(services: &Services, command: SuppliesCommand) -> Result<serde_json::Value> {
    let api = &services.supplies;
    let account = services.account.name();
    match command {
        SuppliesCommand::List { open } => commands::list_supplies(api, account, open).await,
        SuppliesCommand::Orders { supply_id } => {
            commands::supply_orders(api, account, &supply_id).await
        }
        SuppliesCommand::Create { name } => commands::create_supply(api, &name).await,
        SuppliesCommand::AddOrder {
            supply_id,
            order_id,
        } => commands::add_order(api, &supply_id, order_id).await,
        SuppliesCommand::Delete { supply_id } => commands::delete_supply(api, &supply_id).await,
        SuppliesCommand::Deliver { supply_id } => commands::deliver_supply(api, &supply_id).await,
    }
}

async fn run_orders(services: &Services, command: OrdersCommand) -> Result<serde_json::Value> {
    let api = &services.orders;
    let account = services.account.name();
    match command {
        OrdersCommand::New => commands::list_new_orders(api, account).await,
        OrdersCommand::List => commands::list_orders(api, account).await,
        OrdersCommand::Status {
            supply_id,
            order_ids,
        } => commands::order_statuses(api, account, &supply_id, &order_ids).await,
        OrdersCommand::Stickers {
            supply_id,
            order_ids,
        } => commands::stickers(api, account, &supply_id, &order_ids).await,
    }
}
