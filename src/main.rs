use anyhow::Result;
use clap::{Parser, Subcommand};
use tracing::{debug, warn};

use billsplit::cli::{self, bill, demo, pay, select, settle, user};
use billsplit::config::Config;
use billsplit::logging;
use billsplit::model::{BillStatus, NewItem};
use billsplit::session::Session;
use billsplit::store::StoreAvailability;

#[derive(Parser)]
#[command(name = "billsplit")]
#[command(about = "Split a restaurant bill item by item and track who has paid")]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file path
    #[arg(short, long, default_value = "billsplit.yaml")]
    config: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Create a bill
    Create {
        /// Restaurant name
        restaurant: String,

        /// Bill date (YYYY-MM-DD), defaults to today
        #[arg(short, long)]
        date: Option<String>,

        /// Item as name:price or name:price:quantity (repeatable)
        #[arg(short, long = "item", required = true)]
        items: Vec<NewItem>,

        /// Tax amount; splits tax proportionally
        #[arg(long)]
        tax: Option<f64>,

        /// Tip amount; splits tip proportionally
        #[arg(long)]
        tip: Option<f64>,
    },

    /// List bills, newest first
    List {
        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show a bill with your selections and running total
    Show {
        /// Bill ID (full or prefix)
        bill: String,

        /// Print as JSON
        #[arg(long)]
        json: bool,
    },

    /// Toggle one item in your selection
    Select {
        /// Bill ID (full or prefix)
        bill: String,
        /// Item ID (full or prefix)
        item: String,
    },

    /// Select or clear every unit of a grouped item
    SelectGroup {
        /// Bill ID (full or prefix)
        bill: String,
        /// Group number as shown by `show`
        group: usize,
        /// Clear the group instead of selecting it
        #[arg(long)]
        clear: bool,
    },

    /// Record how much you have paid
    Pay {
        /// Bill ID (full or prefix)
        bill: String,
        #[arg(allow_hyphen_values = true)]
        amount: f64,
    },

    /// Print your settlement message
    Settle {
        /// Bill ID (full or prefix)
        bill: String,
    },

    /// Set a bill's status (active, settled, archived)
    Status {
        /// Bill ID (full or prefix)
        bill: String,
        status: BillStatus,
    },

    /// Delete a bill and everything attached to it
    Delete {
        /// Bill ID (full or prefix)
        bill: String,
    },

    /// Show or change your display name
    Whoami {
        /// New display name
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Walk through the built-in sample bill
    Demo,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load config
    let config = match Config::load(&cli.config) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Warning: {:#}; using defaults", e);
            Config::default()
        }
    };
    logging::init(&config.logging.level);

    if let Commands::Demo = cli.command {
        return demo::run();
    }

    let session_path = config.session_path();
    let mut session = Session::load_or_create(&session_path)?;
    debug!(session_id = %session.session_id, "session loaded");

    // Probed once; every store-backed command goes through this
    let availability = StoreAvailability::probe(&config);

    if let Commands::Whoami { name } = cli.command {
        return user::whoami(&availability, &mut session, &session_path, name);
    }

    let store = match availability.require() {
        Ok(store) => store,
        Err(e) => {
            if let StoreAvailability::Unavailable { reason } = &availability {
                cli::print_config_error(reason, &config.database_path());
            }
            return Err(e.into());
        }
    };

    if let Err(e) = store.get_or_create_user(&session.session_id, &session.user_name) {
        warn!(error = %e, "could not register session user");
    }

    match cli.command {
        Commands::Create {
            restaurant,
            date,
            items,
            tax,
            tip,
        } => {
            let args = bill::CreateArgs {
                restaurant,
                date,
                items,
                tax,
                tip,
            };
            bill::create(store, &session, args)?;
        }
        Commands::List { json } => {
            bill::list(store, json)?;
        }
        Commands::Show { bill: query, json } => {
            bill::show(store, &session, &query, json)?;
        }
        Commands::Select { bill, item } => {
            select::toggle(store, &session, &bill, &item)?;
        }
        Commands::SelectGroup { bill, group, clear } => {
            select::toggle_group(store, &session, &bill, group, clear)?;
        }
        Commands::Pay { bill, amount } => {
            pay::run(store, &session, &bill, amount)?;
        }
        Commands::Settle { bill } => {
            settle::run(store, &session, &bill)?;
        }
        Commands::Status { bill: query, status } => {
            bill::set_status(store, &query, status)?;
        }
        Commands::Delete { bill: query } => {
            bill::delete(store, &query)?;
        }
        Commands::Whoami { .. } | Commands::Demo => {}
    }

    Ok(())
}
