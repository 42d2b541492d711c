//! Composition root.
//!
//! [`ProductApp`] wires the navigation state to catalog-backed views and
//! bridge-backed cart actions. It is the only place that knows which
//! resolver and store implementations are in use.
//!
//! No lock is held across an `.await`: every fetch runs unlocked and its
//! result is applied afterwards only if navigation has not moved on.

use std::fmt;
use std::sync::{Arc, Mutex, PoisonError, RwLock};

use product_app_core::{NavigationState, ProductId};
use tracing::{debug, info, instrument};

use crate::cart::{
    CapabilityRegistry, CapabilityResolver, CartBridge, Committed, Degraded, FallbackCart,
    HostCartActions, HttpCapabilityResolver, HttpCartStore, Ignored, InMemoryCartStore,
    NullResolver, SharedCartStore,
};
use crate::catalog::ProductCatalogClient;
use crate::config::{DEFAULT_CART_CAPABILITY, ProductAppConfig};
use crate::error::{Result, add_breadcrumb};
use crate::navigation::{NavigationController, Transition};
use crate::storage::FileStorage;
use crate::views::{AddControl, CartView, CatalogView, DetailState, DetailView};

/// What the user is looking at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Screen {
    Catalog(CatalogView),
    Detail(DetailView),
}

impl fmt::Display for Screen {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Catalog(view) => write!(f, "{view}"),
            Self::Detail(view) => write!(f, "{view}"),
        }
    }
}

/// Result of pressing the add control.
#[derive(Debug)]
pub enum AddOutcome {
    /// An add is already in flight; this press was ignored.
    Busy,
    /// No product detail is loaded, so there is nothing to add.
    NoProduct,
    /// The bridge handled the add.
    Done(std::result::Result<Committed, Degraded>),
}

/// The product micro-frontend.
#[derive(Clone)]
pub struct ProductApp {
    inner: Arc<ProductAppInner>,
}

struct ProductAppInner {
    catalog: ProductCatalogClient,
    cart: CartBridge,
    session: Mutex<Session>,
    catalog_view: RwLock<CatalogView>,
}

/// Navigation plus the detail state that belongs to it.
struct Session {
    navigation: NavigationController,
    // Bumped on every transition; a fetch only applies if it still matches
    generation: u64,
    detail: DetailState,
    // Scoped to one detail view; replaced on every transition
    add_control: AddControl,
}

impl Session {
    /// Start a new view: stale fetches and in-flight adds stop applying.
    fn advance(&mut self) -> u64 {
        self.generation += 1;
        self.detail = DetailState::Loading;
        self.add_control = AddControl::new();
        self.generation
    }
}

impl ProductApp {
    /// Create an app from its collaborators.
    #[must_use]
    pub fn new(catalog: ProductCatalogClient, cart: CartBridge) -> Self {
        Self {
            inner: Arc::new(ProductAppInner {
                catalog,
                cart,
                session: Mutex::new(Session {
                    navigation: NavigationController::new(),
                    generation: 0,
                    detail: DetailState::Loading,
                    add_control: AddControl::new(),
                }),
                catalog_view: RwLock::new(CatalogView::Loading),
            }),
        }
    }

    /// Build the app from configuration.
    ///
    /// With a host configured, the cart capability and shared store are
    /// reached over HTTP. Without one, the capability never resolves and
    /// every add lands in the local fallback.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Client` if the HTTP client cannot be built.
    pub fn from_config(config: &ProductAppConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("product-app/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let resolver: Arc<dyn CapabilityResolver>;
        let store: Arc<dyn SharedCartStore>;
        let capability = match &config.host {
            Some(host) => {
                info!(host = %host.base_url, capability = %host.capability, "Running hosted");
                resolver = Arc::new(HttpCapabilityResolver::new(
                    client.clone(),
                    host.base_url.clone(),
                ));
                store = Arc::new(HttpCartStore::new(client.clone(), host.base_url.clone()));
                host.capability.as_str()
            }
            None => {
                info!("Running standalone, cart adds use the local fallback");
                resolver = Arc::new(NullResolver);
                store = Arc::new(InMemoryCartStore::new());
                DEFAULT_CART_CAPABILITY
            }
        };

        Ok(Self::assemble(config, client, resolver, store, capability))
    }

    /// Build the app with an in-process host that registers its cart
    /// capability and owns an in-memory shared store.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Client` if the HTTP client cannot be built.
    pub fn embedded(config: &ProductAppConfig) -> Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(concat!("product-app/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let capability = config
            .host
            .as_ref()
            .map_or(DEFAULT_CART_CAPABILITY, |host| host.capability.as_str());
        let registry = CapabilityRegistry::new();
        registry.register(capability, Arc::new(HostCartActions));
        info!(capability, "Running with embedded host");

        Ok(Self::assemble(
            config,
            client,
            Arc::new(registry),
            Arc::new(InMemoryCartStore::new()),
            capability,
        ))
    }

    fn assemble(
        config: &ProductAppConfig,
        client: reqwest::Client,
        resolver: Arc<dyn CapabilityResolver>,
        store: Arc<dyn SharedCartStore>,
        capability: &str,
    ) -> Self {
        let storage = Arc::new(FileStorage::new(&config.data_dir));
        let fallback = FallbackCart::new(storage, config.cart_key.clone());
        let cart = CartBridge::new(resolver, capability, store, fallback);
        let catalog = ProductCatalogClient::with_client(client, config.product_api_url.clone());
        Self::new(catalog, cart)
    }

    /// The cart bridge.
    #[must_use]
    pub fn cart(&self) -> &CartBridge {
        &self.inner.cart
    }

    /// The active navigation state.
    #[must_use]
    pub fn navigation(&self) -> NavigationState {
        self.session().navigation.state()
    }

    /// Fetch the catalog and rebuild the listing.
    ///
    /// A failed fetch leaves an empty listing and nothing selectable.
    #[instrument(skip(self))]
    pub async fn load_catalog(&self) -> CatalogView {
        *self.catalog_view_mut() = CatalogView::Loading;

        let result = self.inner.catalog.fetch_catalog().await;
        if let Err(e) = &result {
            tracing::warn!(error = %e, "Catalog unavailable");
        }

        let ids: Vec<ProductId> = result
            .as_ref()
            .map(|products| products.iter().map(|p| p.id).collect())
            .unwrap_or_default();
        self.session().navigation.register_catalog(ids);

        let view = CatalogView::from_fetch(&result);
        self.catalog_view_mut().clone_from(&view);
        view
    }

    /// Open a product's detail view and fetch the product.
    ///
    /// If navigation moves on before the fetch completes, its result is
    /// discarded.
    ///
    /// # Errors
    ///
    /// Returns `AppError::Navigation` if the product cannot be selected from
    /// the current state. A failed fetch is not an error; the detail view
    /// shows "Product not found".
    #[instrument(skip(self), fields(product_id = %id))]
    pub async fn select_product(&self, id: ProductId) -> Result<Transition> {
        let generation = {
            let mut session = self.session();
            let transition = session.navigation.select_product(id)?;
            if !transition.changed() {
                return Ok(transition);
            }
            session.advance()
        };
        let id_text = id.to_string();
        add_breadcrumb("navigation", "Viewed product", Some(&[("product_id", id_text.as_str())]));

        let state = DetailState::from_fetch(self.inner.catalog.fetch_product(id).await);

        let mut session = self.session();
        if session.generation == generation {
            session.detail = state;
        } else {
            debug!("Discarding stale product fetch");
        }
        Ok(Transition::Moved {
            from: NavigationState::Catalog,
            to: NavigationState::ProductDetail { product_id: id },
        })
    }

    /// Return to the catalog.
    pub fn go_back(&self) -> Transition {
        let mut session = self.session();
        let transition = session.navigation.go_back();
        if transition.changed() {
            session.advance();
            add_breadcrumb("navigation", "Back to products", None);
        }
        transition
    }

    /// Press the add control for the product being viewed.
    ///
    /// The control belongs to the current detail view. An add still in
    /// flight from a view the user has left does not block this one.
    #[instrument(skip(self))]
    pub async fn add_to_cart(&self) -> AddOutcome {
        let (control, product) = {
            let session = self.session();
            (session.add_control.clone(), session.detail.product().cloned())
        };
        let Some(_guard) = control.try_begin() else {
            debug!("Add already in flight");
            return AddOutcome::Busy;
        };
        let Some(product) = product else {
            return AddOutcome::NoProduct;
        };

        let id_text = product.id.to_string();
        add_breadcrumb("cart", "Add to cart", Some(&[("product_id", id_text.as_str())]));
        AddOutcome::Done(self.inner.cart.add_to_cart(&product).await)
    }

    /// Press the remove control for the product being viewed.
    ///
    /// Returns `None` when no product detail is active.
    #[instrument(skip(self))]
    pub async fn remove_from_cart(&self) -> Option<std::result::Result<Committed, Ignored>> {
        let id = self.navigation().selected_product()?;
        let id_text = id.to_string();
        add_breadcrumb("cart", "Remove from cart", Some(&[("product_id", id_text.as_str())]));
        Some(self.inner.cart.remove_from_cart(id).await)
    }

    /// The listing as last loaded.
    #[must_use]
    pub fn catalog_view(&self) -> CatalogView {
        self.inner
            .catalog_view
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// The detail view, if a product is selected.
    #[must_use]
    pub fn detail_view(&self) -> Option<DetailView> {
        let (product_id, state, adding) = {
            let session = self.session();
            (
                session.navigation.state().selected_product()?,
                session.detail.clone(),
                session.add_control.is_busy(),
            )
        };
        Some(DetailView {
            product_id,
            state,
            quantity_in_cart: self.inner.cart.quantity_in_cart(product_id),
            adding,
        })
    }

    /// Cart totals for display.
    #[must_use]
    pub fn cart_view(&self) -> CartView {
        self.inner.cart.cart_view()
    }

    /// The active screen.
    #[must_use]
    pub fn screen(&self) -> Screen {
        self.detail_view()
            .map_or_else(|| Screen::Catalog(self.catalog_view()), Screen::Detail)
    }

    fn session(&self) -> std::sync::MutexGuard<'_, Session> {
        self.inner
            .session
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn catalog_view_mut(&self) -> std::sync::RwLockWriteGuard<'_, CatalogView> {
        self.inner
            .catalog_view
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}
