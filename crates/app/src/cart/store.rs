//! The host application's shared cart store, as seen from this app.
//!
//! The store's reducer belongs to the host. This app only reads snapshots
//! and dispatches actions built by the host's own action constructors.

use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;
use product_app_core::{CartAction, CartState};
use thiserror::Error;
use tracing::instrument;
use url::Url;

/// Errors talking to the shared store.
#[derive(Debug, Error)]
pub enum StoreError {
    /// The store refused the action.
    #[error("Store rejected action: {0}")]
    Rejected(String),

    /// The store could not be reached.
    #[error("Store unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

/// A cart store owned by the host.
#[async_trait]
pub trait SharedCartStore: Send + Sync {
    /// Current cart snapshot.
    async fn state(&self) -> Result<CartState, StoreError>;

    /// Dispatch an action into the store.
    async fn dispatch(&self, action: CartAction) -> Result<(), StoreError>;
}

/// Process-local store running the reference cart reducer.
///
/// Backs an embedded host, a standalone mount (where nothing ever dispatches
/// into it), and tests.
#[derive(Debug, Default)]
pub struct InMemoryCartStore {
    state: Mutex<CartState>,
    dispatched: Mutex<Vec<CartAction>>,
}

impl InMemoryCartStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Every action dispatched so far, in order.
    #[must_use]
    pub fn dispatched(&self) -> Vec<CartAction> {
        self.dispatched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Current snapshot without going through the trait.
    #[must_use]
    pub fn snapshot(&self) -> CartState {
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl SharedCartStore for InMemoryCartStore {
    async fn state(&self) -> Result<CartState, StoreError> {
        Ok(self.snapshot())
    }

    async fn dispatch(&self, action: CartAction) -> Result<(), StoreError> {
        self.dispatched
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(action.clone());
        self.state
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .apply(action);
        Ok(())
    }
}

/// Shared store reachable over HTTP.
///
/// - `GET {host}/cart` returns the cart snapshot
/// - `POST {host}/cart/dispatch` accepts one action
#[derive(Clone)]
pub struct HttpCartStore {
    client: reqwest::Client,
    host_url: Url,
}

impl HttpCartStore {
    #[must_use]
    pub const fn new(client: reqwest::Client, host_url: Url) -> Self {
        Self { client, host_url }
    }

    fn endpoint(&self, segments: &[&str]) -> Url {
        let mut url = self.host_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().extend(segments);
        }
        url
    }
}

#[async_trait]
impl SharedCartStore for HttpCartStore {
    async fn state(&self) -> Result<CartState, StoreError> {
        let response = self
            .client
            .get(self.endpoint(&["cart"]))
            .send()
            .await?
            .error_for_status()?;
        Ok(response.json::<CartState>().await?)
    }

    #[instrument(skip(self, action), fields(product_id = %action.product_id()))]
    async fn dispatch(&self, action: CartAction) -> Result<(), StoreError> {
        let response = self
            .client
            .post(self.endpoint(&["cart", "dispatch"]))
            .json(&action)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(StoreError::Rejected(format!(
                "HTTP {status}: {}",
                body.chars().take(200).collect::<String>()
            )));
        }
        Ok(())
    }
}
