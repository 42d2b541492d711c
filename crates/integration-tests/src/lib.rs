//! Integration tests for the Product App.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p product-app-integration-tests
//! ```
//!
//! Every collaborator is an in-process `axum` server bound to an ephemeral
//! port, so the tests need no network access or running services.
//!
//! - [`ProductSource`] - the product data source (`/products`, `/products/{id}`)
//! - [`MockHost`] - a host application exposing `remoteEntry.json` and a
//!   shared cart store over HTTP
//!
//! # Test Categories
//!
//! - `catalog_navigation` - Catalog listing, selection, back, stale fetches
//! - `cart_hosted` - Cart mutations through a reachable host
//! - `cart_standalone` - Cart mutations landing in the local fallback

#![allow(clippy::unwrap_used, clippy::expect_used)]

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use axum::{
    Json, Router,
    extract::{Path as UrlPath, State},
    http::StatusCode,
    routing::{get, post},
};
use product_app::ProductApp;
use product_app::cart::{InMemoryCartStore, SharedCartStore};
use product_app::config::ProductAppConfig;
use product_app_core::{CartAction, CartState};
use tokio::net::TcpListener;
use url::Url;

/// Catalog served by [`ProductSource`].
pub const CATALOG: &str = r#"[
    {"id": 1, "title": "Backpack", "price": 109.95, "category": "bags", "description": "Fits a laptop", "image": "https://img.test/1.png", "rating": {"rate": 3.9, "count": 120}},
    {"id": 2, "title": "Jacket", "price": 55.99, "category": "clothing", "description": "Warm", "image": "https://img.test/2.png", "rating": {"rate": 4.7, "count": 500}},
    {"id": 7, "title": "Shirt", "price": 19.99, "category": "clothing", "description": "Cotton", "image": "https://img.test/7.png"},
    {"id": 13, "title": "Monitor", "price": 599.99, "category": "electronics", "description": "Wide", "image": "https://img.test/13.png"},
    {"id": 99, "title": "Slow Lamp", "price": 5.5, "category": "home", "description": "Takes a while", "image": "https://img.test/99.png"}
]"#;

/// Product ID whose detail response is delayed by [`SLOW_PRODUCT_DELAY`].
pub const SLOW_PRODUCT: i32 = 99;

/// Product ID listed in the catalog whose detail request finds nothing.
pub const MISSING_PRODUCT: i32 = 13;

pub const SLOW_PRODUCT_DELAY: Duration = Duration::from_millis(300);

async fn serve(app: Router) -> Url {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        let _ = axum::serve(listener, app).await;
    });
    Url::parse(&format!("http://{addr}")).unwrap()
}

/// Mock product data source.
pub struct ProductSource {
    pub url: Url,
}

impl ProductSource {
    /// Serve [`CATALOG`].
    pub async fn spawn() -> Self {
        let app = Router::new()
            .route("/products", get(|| async { CATALOG }))
            .route("/products/{id}", get(product));
        Self {
            url: serve(app).await,
        }
    }

    /// Serve a source whose catalog endpoint always fails.
    pub async fn spawn_broken() -> Self {
        let app = Router::new()
            .route(
                "/products",
                get(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "boom") }),
            )
            .route("/products/{id}", get(product));
        Self {
            url: serve(app).await,
        }
    }
}

async fn product(UrlPath(id): UrlPath<i32>) -> String {
    if id == SLOW_PRODUCT {
        tokio::time::sleep(SLOW_PRODUCT_DELAY).await;
    }
    if id == MISSING_PRODUCT {
        // The source answers unknown IDs with an empty 200
        return String::new();
    }

    let catalog: Vec<serde_json::Value> = serde_json::from_str(CATALOG).unwrap();
    catalog
        .into_iter()
        .find(|p| p["id"] == id)
        .map(|p| p.to_string())
        .unwrap_or_default()
}

/// Mock host application backed by the reference reducer.
pub struct MockHost {
    pub url: Url,
    pub store: Arc<InMemoryCartStore>,
}

impl MockHost {
    /// Serve a host that exposes `./cartActions` as `host_app`.
    pub async fn spawn() -> Self {
        Self::spawn_with_manifest(r#"{"name": "host_app", "exposes": ["./cartActions"]}"#).await
    }

    /// Serve a host with a custom `remoteEntry.json`.
    pub async fn spawn_with_manifest(manifest: &'static str) -> Self {
        let store = Arc::new(InMemoryCartStore::new());
        let app = Router::new()
            .route("/remoteEntry.json", get(move || async move { manifest }))
            .route("/cart", get(cart_state))
            .route("/cart/dispatch", post(dispatch))
            .with_state(store.clone());
        Self {
            url: serve(app).await,
            store,
        }
    }

    /// Actions the host has accepted, in order.
    #[must_use]
    pub fn dispatched(&self) -> Vec<CartAction> {
        self.store.dispatched()
    }
}

async fn cart_state(State(store): State<Arc<InMemoryCartStore>>) -> Json<CartState> {
    Json(store.snapshot())
}

async fn dispatch(
    State(store): State<Arc<InMemoryCartStore>>,
    Json(action): Json<CartAction>,
) -> StatusCode {
    match store.dispatch(action).await {
        Ok(()) => StatusCode::NO_CONTENT,
        Err(_) => StatusCode::UNPROCESSABLE_ENTITY,
    }
}

/// Configuration pointing at the given collaborators.
#[must_use]
pub fn config(source: &Url, host: Option<&Url>, data_dir: &Path) -> ProductAppConfig {
    let source = source.to_string();
    let host = host.map(ToString::to_string);
    let data_dir = data_dir.display().to_string();
    ProductAppConfig::from_lookup(|key| match key {
        "PRODUCT_API_BASE_URL" => Some(source.clone()),
        "HOST_APP_URL" => host.clone(),
        "PRODUCT_APP_DATA_DIR" => Some(data_dir.clone()),
        _ => None,
    })
    .unwrap()
}

/// A standalone app with its fallback under `data_dir`.
pub async fn standalone_app(data_dir: &Path) -> (ProductApp, ProductSource) {
    let source = ProductSource::spawn().await;
    let app = ProductApp::from_config(&config(&source.url, None, data_dir)).unwrap();
    (app, source)
}

/// An app mounted in a [`MockHost`] reachable over HTTP.
pub async fn hosted_app(data_dir: &Path) -> (ProductApp, MockHost, ProductSource) {
    let source = ProductSource::spawn().await;
    let host = MockHost::spawn().await;
    let app = ProductApp::from_config(&config(&source.url, Some(&host.url), data_dir)).unwrap();
    (app, host, source)
}
