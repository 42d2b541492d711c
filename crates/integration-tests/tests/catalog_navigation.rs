//! Catalog listing and navigation through `ProductApp`.

#![allow(clippy::unwrap_used)]

use product_app::navigation::NavigationError;
use product_app::views::DetailState;
use product_app::{AppError, ProductApp, Screen};
use product_app_core::{NavigationState, ProductId};
use product_app_integration_tests::{
    MISSING_PRODUCT, ProductSource, SLOW_PRODUCT, SLOW_PRODUCT_DELAY, config, standalone_app,
};

#[tokio::test]
async fn test_catalog_entries_navigate_to_their_own_detail() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _source) = standalone_app(dir.path()).await;

    let view = app.load_catalog().await;
    assert_eq!(view.entries().len(), 5);

    for entry in view.entries() {
        app.select_product(entry.id).await.unwrap();
        assert_eq!(
            app.navigation(),
            NavigationState::ProductDetail {
                product_id: entry.id
            }
        );
        assert_eq!(app.detail_view().unwrap().product_id, entry.id);
        app.go_back();
    }
}

#[tokio::test]
async fn test_listing_rendering() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _source) = standalone_app(dir.path()).await;
    app.load_catalog().await;

    let Screen::Catalog(view) = app.screen() else {
        panic!("expected catalog screen");
    };
    let rendered = view.to_string();
    assert!(rendered.contains("[  1] Backpack | bags | $109.95 | ⭐ 3.9"));
    assert!(rendered.contains("[  7] Shirt | clothing | $19.99 | ⭐ N/A"));
}

#[tokio::test]
async fn test_select_then_back_returns_to_catalog() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _source) = standalone_app(dir.path()).await;
    app.load_catalog().await;

    for id in [7, MISSING_PRODUCT] {
        app.select_product(ProductId::new(id)).await.unwrap();
        app.go_back();
        assert_eq!(app.navigation(), NavigationState::Catalog);
        assert_eq!(app.navigation().selected_product(), None);
        assert!(app.detail_view().is_none());
    }
}

#[tokio::test]
async fn test_missing_product_shows_not_found_and_stays_on_detail() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _source) = standalone_app(dir.path()).await;
    app.load_catalog().await;

    app.select_product(ProductId::new(MISSING_PRODUCT)).await.unwrap();

    let detail = app.detail_view().unwrap();
    assert_eq!(detail.state, DetailState::NotFound);
    assert!(detail.to_string().contains("Product not found"));
    assert_eq!(
        app.navigation().selected_product(),
        Some(ProductId::new(MISSING_PRODUCT))
    );
}

#[tokio::test]
async fn test_detail_rendering() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _source) = standalone_app(dir.path()).await;
    app.load_catalog().await;
    app.select_product(ProductId::new(2)).await.unwrap();

    let rendered = app.screen().to_string();
    assert!(rendered.starts_with("← Back to Products\nJacket\n[clothing]\nWarm\n"));
    assert!(rendered.contains("$55.99  ⭐ 4.7 (500 reviews)"));
    assert!(rendered.contains("[Add to Cart]"));
    assert!(!rendered.contains("Remove from Cart"));
}

#[tokio::test]
async fn test_unavailable_catalog_shows_empty_listing() {
    let dir = tempfile::tempdir().unwrap();
    let source = ProductSource::spawn_broken().await;
    let app = ProductApp::from_config(&config(&source.url, None, dir.path())).unwrap();

    let view = app.load_catalog().await;
    assert!(!view.is_loading());
    assert!(view.entries().is_empty());
    assert_eq!(app.screen().to_string(), "No products\n");

    // Nothing was listed, so nothing is selectable
    let err = app.select_product(ProductId::new(7)).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::Navigation(NavigationError::UnknownProduct(_))
    ));
    assert_eq!(app.navigation(), NavigationState::Catalog);
}

#[tokio::test]
async fn test_fetch_completing_after_navigation_is_discarded() {
    let dir = tempfile::tempdir().unwrap();
    let (app, _source) = standalone_app(dir.path()).await;
    app.load_catalog().await;

    let slow = {
        let app = app.clone();
        tokio::spawn(async move { app.select_product(ProductId::new(SLOW_PRODUCT)).await })
    };
    tokio::time::sleep(SLOW_PRODUCT_DELAY / 6).await;
    assert_eq!(app.detail_view().unwrap().state, DetailState::Loading);

    app.go_back();
    slow.await.unwrap().unwrap();

    // The lamp arrived after the user left; the catalog is still shown
    assert_eq!(app.navigation(), NavigationState::Catalog);
    assert!(matches!(app.screen(), Screen::Catalog(_)));

    // Reopening the same product fetches it afresh
    app.select_product(ProductId::new(SLOW_PRODUCT)).await.unwrap();
    let detail = app.detail_view().unwrap();
    assert_eq!(detail.state.product().unwrap().title, "Slow Lamp");
}
