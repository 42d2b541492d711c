//! Catalog browsing commands.

use product_app::ProductApp;
use product_app_core::ProductId;

/// Print the catalog listing.
pub async fn list(app: &ProductApp) {
    let view = app.load_catalog().await;

    #[allow(clippy::print_stdout)]
    {
        print!("{view}");
    }
}

/// Print one product's detail view.
///
/// # Errors
///
/// Returns `AppError::Navigation` if the product is not in the catalog.
pub async fn show(app: &ProductApp, id: ProductId) -> product_app::Result<()> {
    open(app, id).await?;

    #[allow(clippy::print_stdout)]
    {
        print!("{}", app.screen());
    }
    Ok(())
}

/// Load the catalog and navigate to a product, as a user clicking through
/// the listing would.
pub(crate) async fn open(app: &ProductApp, id: ProductId) -> product_app::Result<()> {
    app.load_catalog().await;
    app.select_product(id).await?;
    Ok(())
}
