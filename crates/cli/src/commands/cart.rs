//! Cart commands.

use product_app::cart::{CartSource, Committed};
use product_app::{AddOutcome, ProductApp};
use product_app_core::ProductId;

use super::catalog::open;

/// Open a product and press "Add to Cart" `times` times.
///
/// # Errors
///
/// Returns `AppError::Navigation` if the product is not in the catalog.
pub async fn add(app: &ProductApp, id: ProductId, times: u32) -> product_app::Result<()> {
    open(app, id).await?;

    for _ in 0..times {
        match app.add_to_cart().await {
            AddOutcome::Done(Ok(committed)) => report(&committed, "Added"),
            AddOutcome::Done(Err(degraded)) => {
                tracing::error!(error = %degraded, "Add failed");
            }
            AddOutcome::NoProduct => {
                tracing::warn!(product_id = %id, "Product not found, nothing added");
                break;
            }
            AddOutcome::Busy => tracing::debug!("Add already in flight"),
        }
    }

    #[allow(clippy::print_stdout)]
    {
        print!("{}", app.screen());
    }
    Ok(())
}

/// Open a product and press "Remove from Cart".
///
/// # Errors
///
/// Returns `AppError::Navigation` if the product is not in the catalog.
pub async fn remove(app: &ProductApp, id: ProductId) -> product_app::Result<()> {
    open(app, id).await?;
    // Pick up what the host already holds so the view shows current quantity
    if let Err(e) = app.cart().refresh().await {
        tracing::debug!(error = %e, "Shared cart not readable");
    }

    match app.remove_from_cart().await {
        Some(Ok(committed)) => report(&committed, "Removed"),
        Some(Err(ignored)) => tracing::warn!(error = %ignored, "Remove ignored"),
        None => {}
    }

    #[allow(clippy::print_stdout)]
    {
        print!("{}", app.screen());
    }
    Ok(())
}

/// Print the shared cart.
pub async fn show(app: &ProductApp) {
    let view = match app.cart().refresh().await {
        Ok(view) => view,
        Err(e) => {
            tracing::warn!(error = %e, "Shared cart not readable");
            app.cart_view()
        }
    };

    #[allow(clippy::print_stdout)]
    {
        print!("{view}");
    }
}

/// Print the entries in the local fallback cart.
///
/// # Errors
///
/// Returns `AppError::Storage` if the local store cannot be read.
pub async fn fallback(app: &ProductApp) -> product_app::Result<()> {
    let entries = app.cart().fallback_entries().await?;

    #[allow(clippy::print_stdout)]
    {
        if entries.is_empty() {
            println!("No locally saved items");
        }
        for entry in &entries {
            println!("[{:>3}] {} {}", entry.id.as_i32(), entry.name, entry.price);
        }
    }
    Ok(())
}

fn report(committed: &Committed, verb: &str) {
    let destination = match committed.source {
        CartSource::Remote => "host cart",
        CartSource::LocalFallback => "local fallback",
    };
    tracing::info!(product_id = %committed.product_id, destination, "{verb}");
}
