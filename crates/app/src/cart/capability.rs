//! Resolution of the host's cart-mutation capability.
//!
//! The host application is deployed separately and may or may not expose
//! its cart actions to this app. The capability is looked up by name
//! (`<remote>/<module>`, e.g. `host_app/cartActions`) on every mutation
//! request; nothing is assumed at compose time.
//!
//! - [`NullResolver`] - standalone mount, the capability never resolves
//! - [`CapabilityRegistry`] - in-process host registers mutators by name
//! - [`HttpCapabilityResolver`] - host reachable over HTTP, advertising its
//!   exposed modules in `remoteEntry.json`

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;
use product_app_core::{CartAction, CartItemPayload, PayloadError, ProductId};
use serde::Deserialize;
use thiserror::Error;
use tracing::{debug, instrument};
use url::Url;

/// Errors resolving or invoking the cart capability.
#[derive(Debug, Error)]
pub enum CapabilityError {
    /// The host does not expose the capability (or there is no host).
    #[error("Capability unavailable: {0}")]
    Unavailable(String),

    /// The capability refused to build an action.
    #[error("Capability rejected request: {0}")]
    Rejected(#[from] PayloadError),

    /// The host could not be reached.
    #[error("Host unreachable: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Action constructors exposed by the host.
///
/// Implementations build actions; dispatching them into the shared store is
/// the caller's job.
pub trait CartMutator: Send + Sync {
    /// Build an "add" action for `item`.
    ///
    /// # Errors
    ///
    /// Returns `CapabilityError` if the host refuses the item.
    fn try_add(&self, item: &CartItemPayload) -> Result<CartAction, CapabilityError>;

    /// Build a "remove" action for `id`.
    ///
    /// # Errors
    ///
    /// Returns `CapabilityError` if the host refuses the request.
    fn try_remove(&self, id: ProductId) -> Result<CartAction, CapabilityError>;
}

/// Looks up a [`CartMutator`] by capability name.
#[async_trait]
pub trait CapabilityResolver: Send + Sync {
    /// Resolve the capability registered under `name`.
    async fn resolve(&self, name: &str) -> Result<Arc<dyn CartMutator>, CapabilityError>;
}

/// The host's cart action constructors.
///
/// Validates payloads the way the host's cart slice expects before building
/// `cart/addToCart` and `cart/removeFromCart` actions.
#[derive(Debug, Clone, Copy, Default)]
pub struct HostCartActions;

impl CartMutator for HostCartActions {
    fn try_add(&self, item: &CartItemPayload) -> Result<CartAction, CapabilityError> {
        item.validate()?;
        Ok(CartAction::Add(item.clone()))
    }

    fn try_remove(&self, id: ProductId) -> Result<CartAction, CapabilityError> {
        Ok(CartAction::Remove(id))
    }
}

/// Resolver for a standalone mount: nothing ever resolves.
#[derive(Debug, Clone, Copy, Default)]
pub struct NullResolver;

#[async_trait]
impl CapabilityResolver for NullResolver {
    async fn resolve(&self, name: &str) -> Result<Arc<dyn CartMutator>, CapabilityError> {
        Err(CapabilityError::Unavailable(format!("{name} (no host)")))
    }
}

/// In-process registry a host populates with its capabilities.
#[derive(Default)]
pub struct CapabilityRegistry {
    entries: RwLock<HashMap<String, Arc<dyn CartMutator>>>,
}

impl CapabilityRegistry {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Expose `mutator` under `name`, replacing any previous registration.
    pub fn register(&self, name: impl Into<String>, mutator: Arc<dyn CartMutator>) {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.insert(name.into(), mutator);
    }

    /// Withdraw the capability registered under `name`.
    pub fn unregister(&self, name: &str) -> bool {
        let mut entries = self.entries.write().unwrap_or_else(PoisonError::into_inner);
        entries.remove(name).is_some()
    }
}

#[async_trait]
impl CapabilityResolver for CapabilityRegistry {
    async fn resolve(&self, name: &str) -> Result<Arc<dyn CartMutator>, CapabilityError> {
        let entries = self.entries.read().unwrap_or_else(PoisonError::into_inner);
        entries
            .get(name)
            .cloned()
            .ok_or_else(|| CapabilityError::Unavailable(format!("{name} is not registered")))
    }
}

/// Manifest a host serves at `remoteEntry.json`.
#[derive(Debug, Deserialize)]
pub struct RemoteManifest {
    /// Remote name (e.g., `host_app`).
    pub name: String,
    /// Exposed module paths (e.g., `./cartActions`).
    #[serde(default)]
    pub exposes: Vec<String>,
}

impl RemoteManifest {
    /// Whether `module` (with or without the `./` prefix) is exposed.
    #[must_use]
    pub fn exposes(&self, module: &str) -> bool {
        let module = module.trim_start_matches("./");
        self.exposes
            .iter()
            .any(|exposed| exposed.trim_start_matches("./") == module)
    }
}

/// Resolver for a host reachable over HTTP.
///
/// Every resolution re-reads the host's manifest, so a host that comes up
/// or goes down mid-session is picked up on the next mutation.
#[derive(Clone)]
pub struct HttpCapabilityResolver {
    client: reqwest::Client,
    host_url: Url,
}

impl HttpCapabilityResolver {
    #[must_use]
    pub const fn new(client: reqwest::Client, host_url: Url) -> Self {
        Self { client, host_url }
    }

    async fn manifest(&self) -> Result<RemoteManifest, CapabilityError> {
        let mut url = self.host_url.clone();
        if let Ok(mut path) = url.path_segments_mut() {
            path.pop_if_empty().push("remoteEntry.json");
        }
        let response = self.client.get(url).send().await?.error_for_status()?;
        Ok(response.json::<RemoteManifest>().await?)
    }
}

#[async_trait]
impl CapabilityResolver for HttpCapabilityResolver {
    #[instrument(skip(self), fields(host = %self.host_url))]
    async fn resolve(&self, name: &str) -> Result<Arc<dyn CartMutator>, CapabilityError> {
        let Some((remote, module)) = name.split_once('/') else {
            return Err(CapabilityError::Unavailable(format!(
                "{name} is not a <remote>/<module> name"
            )));
        };

        let manifest = self.manifest().await?;
        if manifest.name != remote {
            return Err(CapabilityError::Unavailable(format!(
                "host is {}, not {remote}",
                manifest.name
            )));
        }
        if !manifest.exposes(module) {
            return Err(CapabilityError::Unavailable(format!(
                "{remote} does not expose {module}"
            )));
        }

        debug!("Resolved host capability");
        Ok(Arc::new(HostCartActions))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::{Router, routing::get};
    use product_app_core::Price;
    use tokio::net::TcpListener;

    use super::*;

    fn shirt() -> CartItemPayload {
        CartItemPayload {
            id: ProductId::new(7),
            name: "Shirt".to_string(),
            price: Price::from_cents(1999),
            image: "shirt.png".to_string(),
        }
    }

    async fn spawn_host(manifest: &'static str) -> Url {
        let app = Router::new().route("/remoteEntry.json", get(move || async move { manifest }));
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });
        Url::parse(&format!("http://{addr}")).unwrap()
    }

    #[test]
    fn test_host_actions_build_actions() {
        let actions = HostCartActions;
        assert_eq!(actions.try_add(&shirt()).unwrap(), CartAction::Add(shirt()));
        assert_eq!(
            actions.try_remove(ProductId::new(7)).unwrap(),
            CartAction::Remove(ProductId::new(7))
        );
    }

    #[test]
    fn test_host_actions_reject_invalid_payload() {
        let mut item = shirt();
        item.name = String::new();
        assert!(matches!(
            HostCartActions.try_add(&item),
            Err(CapabilityError::Rejected(PayloadError::EmptyName(_)))
        ));
    }

    #[tokio::test]
    async fn test_null_resolver_never_resolves() {
        let err = NullResolver.resolve("host_app/cartActions").await.err().unwrap();
        assert!(matches!(err, CapabilityError::Unavailable(_)));
    }

    #[tokio::test]
    async fn test_registry_register_and_unregister() {
        let registry = CapabilityRegistry::new();
        assert!(registry.resolve("host_app/cartActions").await.is_err());

        registry.register("host_app/cartActions", Arc::new(HostCartActions));
        let mutator = registry.resolve("host_app/cartActions").await.unwrap();
        assert!(mutator.try_add(&shirt()).is_ok());

        assert!(registry.unregister("host_app/cartActions"));
        assert!(registry.resolve("host_app/cartActions").await.is_err());
    }

    #[test]
    fn test_manifest_exposes_with_or_without_prefix() {
        let manifest: RemoteManifest =
            serde_json::from_str(r#"{"name": "host_app", "exposes": ["./cartActions"]}"#).unwrap();
        assert!(manifest.exposes("cartActions"));
        assert!(manifest.exposes("./cartActions"));
        assert!(!manifest.exposes("store"));
    }

    #[tokio::test]
    async fn test_http_resolver_resolves_exposed_module() {
        let host = spawn_host(r#"{"name": "host_app", "exposes": ["./cartActions", "./store"]}"#).await;
        let resolver = HttpCapabilityResolver::new(reqwest::Client::new(), host);

        assert!(resolver.resolve("host_app/cartActions").await.is_ok());
        assert!(matches!(
            resolver.resolve("host_app/checkout").await,
            Err(CapabilityError::Unavailable(_))
        ));
        assert!(matches!(
            resolver.resolve("other_host/cartActions").await,
            Err(CapabilityError::Unavailable(_))
        ));
    }

    #[tokio::test]
    async fn test_http_resolver_unreachable_host() {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let resolver = HttpCapabilityResolver::new(
            reqwest::Client::new(),
            Url::parse(&format!("http://{addr}")).unwrap(),
        );
        assert!(matches!(
            resolver.resolve("host_app/cartActions").await,
            Err(CapabilityError::Transport(_))
        ));
    }
}
