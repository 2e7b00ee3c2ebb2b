//! oshop CLI - browse the store, manage the cart, and place orders.
//!
//! # Usage
//!
//! ```bash
//! # Show reviews and the first page of products
//! oshop reviews
//! oshop products --page 1
//!
//! # Fill the cart
//! oshop cart add 12 --quantity 2
//! oshop cart update 12 3
//! oshop cart show
//!
//! # Enter a phone number and order
//! oshop phone "+7 (912) 345-67-89"
//! oshop order
//! ```
//!
//! Cart and phone persist between runs in `OSHOP_STATE_FILE`.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use oshop_core::ProductId;
use oshop_storefront::config::{StorefrontConfig, parse_api_url};
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use url::Url;

mod commands;

#[derive(Parser)]
#[command(name = "oshop")]
#[command(author, version, about = "oshop storefront client")]
struct Cli {
    /// Store API base URL (overrides `OSHOP_API_URL`)
    #[arg(long, global = true, value_parser = parse_api_url)]
    api_url: Option<Url>,

    /// State file for cart and phone (overrides `OSHOP_STATE_FILE`)
    #[arg(long, global = true)]
    state_file: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print customer reviews
    Reviews,
    /// Print one page of products
    Products {
        /// Page number, starting at 1
        #[arg(short, long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..))]
        page: u32,
    },
    /// Manage the cart
    Cart {
        #[command(subcommand)]
        action: CartAction,
    },
    /// Enter the phone number used for orders
    Phone {
        /// Phone number in any format; digits beyond 11 are ignored
        raw: String,
    },
    /// Submit the cart as an order
    Order {
        /// Phone number to use instead of the saved one
        #[arg(short, long)]
        phone: Option<String>,
    },
}

#[derive(Subcommand)]
enum CartAction {
    /// Print cart lines and the total
    Show,
    /// Add a product, or overwrite its quantity if already present
    Add {
        id: ProductId,
        /// Quantity; anything but a positive integer counts as 1
        #[arg(short, long, default_value = "1")]
        quantity: String,
    },
    /// Set the quantity of a product already in the cart
    Update {
        id: ProductId,
        /// Quantity; anything but a positive integer counts as 1
        quantity: String,
    },
    /// Increase a product's quantity by one
    Inc { id: ProductId },
    /// Decrease a product's quantity by one (never below one)
    Dec { id: ProductId },
    /// Remove everything from the cart
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

/// Warnings and errors become Sentry events; info and debug become breadcrumbs.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let config = match StorefrontConfig::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing_subscriber::fmt::init();
            tracing::error!("Failed to load configuration: {e}");
            std::process::exit(1);
        }
    };

    // Must be initialized before the tracing subscriber
    let _sentry_guard = init_sentry(&config);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "oshop=info,oshop_storefront=info".into());

    tracing_subscriber::registry()
        .with(env_filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    let config = StorefrontConfig {
        api_url: cli.api_url.clone().unwrap_or(config.api_url),
        state_file: cli.state_file.clone().unwrap_or(config.state_file),
        ..config
    };

    if let Err(e) = run(cli.command, &config).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(command: Commands, config: &StorefrontConfig) -> Result<(), commands::CommandError> {
    let mut session = commands::open_session(config)?;

    match command {
        Commands::Reviews => commands::browse::reviews(&mut session).await,
        Commands::Products { page } => commands::browse::products(&mut session, page).await,
        Commands::Cart { action } => match action {
            CartAction::Show => commands::cart::show(&mut session).await,
            CartAction::Add { id, quantity } => commands::cart::add(&mut session, id, &quantity),
            CartAction::Update { id, quantity } => commands::cart::update(&mut session, id, &quantity),
            CartAction::Inc { id } => commands::cart::increment(&mut session, id),
            CartAction::Dec { id } => commands::cart::decrement(&mut session, id),
            CartAction::Clear => commands::cart::clear(&mut session).await,
        },
        Commands::Phone { raw } => commands::order::phone(&mut session, &raw),
        Commands::Order { phone } => commands::order::submit(&mut session, phone.as_deref()).await,
    }
}
