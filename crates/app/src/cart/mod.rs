//! Cart integration bridge.
//!
//! # Architecture
//!
//! - The host application owns the real cart in its shared store
//! - The host's cart action constructors are an optional capability,
//!   resolved by name on every request (never at compose time)
//! - When the capability cannot be resolved or invoked, adds fall back to a
//!   local persisted collection; removes do not
//!
//! # Resolution per request
//!
//! ```text
//! add_to_cart(product)
//!   resolve(capability) -> try_add(payload) -> store.dispatch(action)   => Committed(Remote)
//!   any step fails      -> fallback.append(payload)                     => Committed(LocalFallback)
//!                          fallback write fails                         => Degraded
//!
//! remove_from_cart(id)
//!   resolve(capability) -> try_remove(id) -> store.dispatch(action)     => Committed(Remote)
//!   any step fails                                                      => Ignored
//! ```
//!
//! The fallback write is only issued after the remote attempt has failed,
//! so an item is never recorded in both stores.

mod capability;
mod fallback;
mod store;

pub use capability::{
    CapabilityError, CapabilityRegistry, CapabilityResolver, CartMutator, HostCartActions,
    HttpCapabilityResolver, NullResolver, RemoteManifest,
};
pub use fallback::FallbackCart;
pub use store::{HttpCartStore, InMemoryCartStore, SharedCartStore, StoreError};

use std::sync::{Arc, PoisonError, RwLock};

use product_app_core::{CartItemPayload, CartState, Product, ProductId};
use thiserror::Error;
use tracing::{debug, instrument, warn};

use crate::storage::StorageError;
use crate::views::CartView;

/// Where a committed mutation landed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CartSource {
    /// Dispatched into the host's shared store.
    Remote,
    /// Appended to the local fallback collection.
    LocalFallback,
}

/// A mutation that was durably accepted somewhere.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Committed {
    pub product_id: ProductId,
    pub source: CartSource,
}

/// An add that reached neither the host nor local storage.
#[derive(Debug, Error)]
#[error("could not save product {product_id} to the cart: {source}")]
pub struct Degraded {
    pub product_id: ProductId,
    #[source]
    pub source: StorageError,
}

/// A remove that could not reach the host. The cart is unchanged.
#[derive(Debug, Error)]
#[error("could not remove product {product_id} from the cart: {reason}")]
pub struct Ignored {
    pub product_id: ProductId,
    #[source]
    pub reason: RemoteError,
}

/// Why the remote path failed for one request.
#[derive(Debug, Error)]
pub enum RemoteError {
    #[error(transparent)]
    Capability(#[from] CapabilityError),
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Routes cart mutations to the host's store or the local fallback.
#[derive(Clone)]
pub struct CartBridge {
    inner: Arc<CartBridgeInner>,
}

struct CartBridgeInner {
    resolver: Arc<dyn CapabilityResolver>,
    capability: String,
    store: Arc<dyn SharedCartStore>,
    fallback: FallbackCart,
    // `None` until the remote path has succeeded this session
    visible: RwLock<Option<CartState>>,
}

impl CartBridge {
    /// Create a bridge.
    ///
    /// # Arguments
    ///
    /// * `resolver` - Looks up the host's cart capability per request
    /// * `capability` - Capability name, e.g. `host_app/cartActions`
    /// * `store` - The host's shared cart store
    /// * `fallback` - Local collection used when the host is unreachable
    #[must_use]
    pub fn new(
        resolver: Arc<dyn CapabilityResolver>,
        capability: impl Into<String>,
        store: Arc<dyn SharedCartStore>,
        fallback: FallbackCart,
    ) -> Self {
        Self {
            inner: Arc::new(CartBridgeInner {
                resolver,
                capability: capability.into(),
                store,
                fallback,
                visible: RwLock::new(None),
            }),
        }
    }

    /// Add one unit of `product` to the cart.
    ///
    /// # Errors
    ///
    /// Returns `Degraded` only when the remote path failed and the local
    /// fallback could not be written either.
    #[instrument(skip(self, product), fields(product_id = %product.id))]
    pub async fn add_to_cart(&self, product: &Product) -> Result<Committed, Degraded> {
        let payload = CartItemPayload::from(product);
        let product_id = payload.id;

        match self.try_remote_add(&payload).await {
            Ok(()) => {
                debug!("Added to shared cart");
                self.refresh_visible().await;
                Ok(Committed {
                    product_id,
                    source: CartSource::Remote,
                })
            }
            Err(e) => {
                warn!(error = %e, "Host cart unavailable, saving to local fallback");
                match self.inner.fallback.append(payload).await {
                    Ok(count) => {
                        debug!(count, "Appended to fallback cart");
                        Ok(Committed {
                            product_id,
                            source: CartSource::LocalFallback,
                        })
                    }
                    Err(source) => {
                        tracing::error!(error = %source, "Fallback cart write failed");
                        Err(Degraded { product_id, source })
                    }
                }
            }
        }
    }

    /// Remove one unit of a product from the shared cart.
    ///
    /// There is no local fallback for removal.
    ///
    /// # Errors
    ///
    /// Returns `Ignored` when the host could not be reached; nothing changed.
    #[instrument(skip(self), fields(product_id = %product_id))]
    pub async fn remove_from_cart(&self, product_id: ProductId) -> Result<Committed, Ignored> {
        match self.try_remote_remove(product_id).await {
            Ok(()) => {
                debug!("Removed from shared cart");
                self.refresh_visible().await;
                Ok(Committed {
                    product_id,
                    source: CartSource::Remote,
                })
            }
            Err(reason) => {
                warn!(error = %reason, "Host cart unavailable, remove ignored");
                Err(Ignored { product_id, reason })
            }
        }
    }

    /// Quantity of a product in the cart visible to the UI.
    ///
    /// Reads the last shared-store snapshot; 0 if the remote path has not
    /// been used this session.
    #[must_use]
    pub fn quantity_in_cart(&self, product_id: ProductId) -> u32 {
        self.inner
            .visible
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map_or(0, |state| state.quantity_of(product_id))
    }

    /// Whether a remote mutation has succeeded this session.
    #[must_use]
    pub fn remote_used(&self) -> bool {
        self.inner
            .visible
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Display totals for the cart visible to the UI.
    #[must_use]
    pub fn cart_view(&self) -> CartView {
        self.inner
            .visible
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .as_ref()
            .map_or_else(CartView::empty, CartView::from)
    }

    /// Read the shared store and make it the visible cart.
    ///
    /// # Errors
    ///
    /// Returns `StoreError` if the shared store cannot be read; the visible
    /// cart is left as it was.
    pub async fn refresh(&self) -> Result<CartView, StoreError> {
        let state = self.inner.store.state().await?;
        let view = CartView::from(&state);
        *self
            .inner
            .visible
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(state);
        Ok(view)
    }

    /// Entries in the local fallback collection.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the local store cannot be read.
    pub async fn fallback_entries(&self) -> Result<Vec<CartItemPayload>, StorageError> {
        self.inner.fallback.load().await
    }

    async fn try_remote_add(&self, payload: &CartItemPayload) -> Result<(), RemoteError> {
        let mutator = self.inner.resolver.resolve(&self.inner.capability).await?;
        let action = mutator.try_add(payload)?;
        self.inner.store.dispatch(action).await?;
        Ok(())
    }

    async fn try_remote_remove(&self, product_id: ProductId) -> Result<(), RemoteError> {
        let mutator = self.inner.resolver.resolve(&self.inner.capability).await?;
        let action = mutator.try_remove(product_id)?;
        self.inner.store.dispatch(action).await?;
        Ok(())
    }

    async fn refresh_visible(&self) {
        match self.inner.store.state().await {
            Ok(state) => {
                *self
                    .inner
                    .visible
                    .write()
                    .unwrap_or_else(PoisonError::into_inner) = Some(state);
            }
            Err(e) => warn!(error = %e, "Could not read shared cart after mutation"),
        }
    }
}
