//! Barely Used Bytes CLI - browse the marketplace and manage your cart.
//!
//! # Usage
//!
//! ```bash
//! # Browse listings, cheapest first
//! bub products list --sort price-low
//!
//! # Browse one category page
//! bub products category gpu --condition excellent
//!
//! # Quick search suggestions
//! bub search ryzen
//!
//! # Cart and wishlist (persisted under BUB_DATA_DIR)
//! bub cart add <product-id> -q 2
//! bub cart update <product-id> 0
//! bub wishlist add <product-id>
//!
//! # Place one order per cart item (requires BUB_ID_TOKEN and BUB_USER_ID)
//! bub checkout --street "1 Road" --city Dhaka --zip 1207
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::process::ExitCode;
use std::sync::Arc;

use barely_used_storefront::api::ApiClient;
use barely_used_storefront::catalog::{CatalogQuery, SearchFields, SortMode};
use barely_used_storefront::checkout::DEFAULT_PAYMENT_METHOD;
use barely_used_storefront::config::StorefrontConfig;
use barely_used_storefront::listing::DEFAULT_COUNTRY;
use barely_used_storefront::storage::FileStore;
use barely_used_storefront::{AppError, Session};
use clap::{Parser, Subcommand};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod output;

#[derive(Parser)]
#[command(name = "bub")]
#[command(author, version, about = "Barely Used Bytes storefront CLI")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Browse listings
    Products {
        #[command(subcommand)]
        action: ProductsAction,
    },
    /// Show search suggestions for a query
    Search {
        /// Text to search for
        query: String,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Manage the wishlist
    Wishlist {
        #[command(subcommand)]
        action: WishlistAction,
    },
    /// Order everything in the cart
    Checkout {
        #[arg(long)]
        street: String,
        #[arg(long)]
        city: String,
        #[arg(long)]
        zip: String,
        #[arg(long, default_value = DEFAULT_COUNTRY)]
        country: String,
        #[arg(long, default_value = DEFAULT_PAYMENT_METHOD)]
        payment: String,
        /// Note for the sellers
        #[arg(long)]
        notes: Option<String>,
    },
    /// Show your orders
    Orders,
    /// Manage your own listings
    Listings {
        #[command(subcommand)]
        action: ListingsAction,
    },
}

#[derive(Subcommand)]
enum ListingsAction {
    /// Listings you have posted
    Mine,
}

#[derive(Subcommand)]
enum ProductsAction {
    /// List all listings
    List {
        #[command(flatten)]
        filters: Filters,
        /// Category to show, or `all`
        #[arg(long, default_value = "all")]
        category: String,
    },
    /// List one category's listings by slug (e.g. `gpu`)
    Category {
        slug: String,
        #[command(flatten)]
        filters: Filters,
    },
    /// Show a listing
    Show { id: String },
    /// List the categories present in the catalog
    Categories,
}

#[derive(clap::Args)]
struct Filters {
    /// Free-text filter
    #[arg(long, default_value = "")]
    search: String,
    /// Condition to show, or `all`
    #[arg(long, default_value = "all")]
    condition: String,
    /// `newest`, `oldest`, `price-low`, `price-high` or `popular`
    #[arg(long, default_value = "newest")]
    sort: String,
}

#[derive(Subcommand)]
enum CartAction {
    /// Show the cart and its totals
    Show,
    /// Add a listing to the cart
    Add {
        id: String,
        #[arg(short, long, default_value_t = 1)]
        quantity: u32,
    },
    /// Remove a listing from the cart
    Remove { id: String },
    /// Set an item's quantity; zero or less removes it
    Update {
        id: String,
        #[arg(allow_negative_numbers = true)]
        quantity: i64,
    },
    /// Empty the cart
    Clear,
}

#[derive(Subcommand)]
enum WishlistAction {
    /// Show the wishlist
    Show,
    /// Add a listing to the wishlist
    Add { id: String },
    /// Remove a listing from the wishlist
    Remove { id: String },
    /// Empty the wishlist
    Clear,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &StorefrontConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            attach_stacktrace: true,
            ..Default::default()
        },
    ));

    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    // Sentry needs the configuration, and must be up before the subscriber
    let config = StorefrontConfig::from_env();
    let _sentry_guard = config.as_ref().ok().and_then(init_sentry);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "barely_used_storefront=info,barely_used_cli=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let result = match config {
        Ok(config) => run(cli, config).await,
        Err(e) => Err(e.into()),
    };

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if matches!(e, AppError::Storage(_) | AppError::Internal(_)) {
                let event_id = sentry::capture_error(&e);
                tracing::error!(error = %e, sentry_event_id = %event_id, "Command failed");
            }
            output::error(&e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, config: StorefrontConfig) -> Result<(), AppError> {
    let client = ApiClient::new(&config.api, config.identity_provider())?;
    let storage = Arc::new(FileStore::open(&config.data_dir)?);
    let mut session = Session::start(storage);

    let result = dispatch(cli.command, &config, &client, &mut session).await;
    session.end();
    result
}

async fn dispatch(
    command: Commands,
    config: &StorefrontConfig,
    client: &commands::Client,
    session: &mut Session,
) -> Result<(), AppError> {
    match command {
        Commands::Products { action } => match action {
            ProductsAction::List { filters, category } => {
                commands::catalog::list(client, &filters.into_query(category)).await?;
            }
            ProductsAction::Category { slug, filters } => {
                commands::catalog::category(client, &slug, filters.into_query(String::new()))
                    .await?;
            }
            ProductsAction::Show { id } => commands::catalog::show(client, &id).await?,
            ProductsAction::Categories => commands::catalog::categories(client).await?,
        },
        Commands::Search { query } => commands::catalog::search(client, config, &query).await?,
        Commands::Cart { action } => match action {
            CartAction::Show => output::cart(session.cart()),
            CartAction::Add { id, quantity } => {
                commands::cart::add(client, session.cart_mut(), &id, quantity).await?;
            }
            CartAction::Remove { id } => commands::cart::remove(session.cart_mut(), &id),
            CartAction::Update { id, quantity } => {
                commands::cart::update(session.cart_mut(), &id, quantity);
            }
            CartAction::Clear => commands::cart::clear(session.cart_mut()),
        },
        Commands::Wishlist { action } => match action {
            WishlistAction::Show => output::wishlist(session.wishlist()),
            WishlistAction::Add { id } => {
                commands::wishlist::add(client, session.wishlist_mut(), &id).await?;
            }
            WishlistAction::Remove { id } => {
                commands::wishlist::remove(session.wishlist_mut(), &id);
            }
            WishlistAction::Clear => commands::wishlist::clear(session.wishlist_mut()),
        },
        Commands::Checkout {
            street,
            city,
            zip,
            country,
            payment,
            notes,
        } => {
            let request = commands::checkout::request(street, city, zip, country, payment, notes);
            commands::checkout::run(client, session.cart_mut(), &request).await?;
        }
        Commands::Orders => commands::checkout::orders(client).await?,
        Commands::Listings {
            action: ListingsAction::Mine,
        } => commands::listing::mine(client).await?,
    }
    Ok(())
}

impl Filters {
    fn into_query(self, category: String) -> CatalogQuery {
        CatalogQuery {
            search: self.search,
            category,
            condition: self.condition,
            sort: SortMode::parse(&self.sort),
            fields: SearchFields::LISTING,
        }
    }
}
