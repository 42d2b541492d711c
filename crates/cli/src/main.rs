//! Product App CLI - Browse the catalog and manage the cart from a terminal.
//!
//! # Usage
//!
//! ```bash
//! # List the catalog
//! product-app list
//!
//! # Show one product
//! product-app show 7
//!
//! # Add a product to the cart twice
//! product-app add 7 --times 2
//!
//! # Remove one unit of a product
//! product-app remove 7
//!
//! # Show the shared cart, or the local fallback entries
//! product-app cart
//! product-app fallback
//! ```
//!
//! Without `HOST_APP_URL` the app runs standalone and adds go to the local
//! fallback. `--embedded-host` runs an in-process host for the duration of
//! one command.

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};
use product_app::ProductApp;
use product_app::config::{LogFormat, ProductAppConfig};
use product_app_core::ProductId;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;

#[derive(Parser)]
#[command(name = "product-app")]
#[command(author, version, about = "Product catalog and cart")]
struct Cli {
    /// Run an in-process host that owns the cart for this command
    #[arg(long, global = true)]
    embedded_host: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// List the product catalog
    List,
    /// Show one product
    Show {
        /// Product ID
        id: i32,
    },
    /// Add a product to the cart
    Add {
        /// Product ID
        id: i32,

        /// Number of times to press "Add to Cart"
        #[arg(short = 'n', long, default_value_t = 1)]
        times: u32,
    },
    /// Remove one unit of a product from the cart
    Remove {
        /// Product ID
        id: i32,
    },
    /// Show the shared cart
    Cart,
    /// Show the local fallback cart entries
    Fallback,
}

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &ProductAppConfig) -> Option<sentry::ClientInitGuard> {
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

    tracing::info!("Sentry initialized");
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

fn init_tracing(format: LogFormat) {
    // Defaults to info level for our crates if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "product_app=info,product_app_cli=info".into());

    // Logs go to stderr; stdout carries the rendered views
    let pretty = (format == LogFormat::Pretty)
        .then(|| tracing_subscriber::fmt::layer().with_writer(std::io::stderr));
    let json = (format == LogFormat::Json)
        .then(|| tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(pretty)
        .with(json)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    // Load configuration from environment (needed for Sentry init)
    let config = ProductAppConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);
    init_tracing(config.log_format);

    let app = if cli.embedded_host {
        ProductApp::embedded(&config)
    } else {
        ProductApp::from_config(&config)
    }
    .expect("Failed to initialize product app");

    if let Err(e) = run(&app, cli.command).await {
        e.report();
        std::process::exit(1);
    }
}

async fn run(app: &ProductApp, command: Commands) -> product_app::Result<()> {
    match command {
        Commands::List => commands::catalog::list(app).await,
        Commands::Show { id } => commands::catalog::show(app, ProductId::new(id)).await?,
        Commands::Add { id, times } => commands::cart::add(app, ProductId::new(id), times).await?,
        Commands::Remove { id } => commands::cart::remove(app, ProductId::new(id)).await?,
        Commands::Cart => commands::cart::show(app).await,
        Commands::Fallback => commands::cart::fallback(app).await?,
    }
    Ok(())
}
