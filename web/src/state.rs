//! Shared application state for handlers.

use storefront_engine::{CartService, CatalogService, EngineConfig, OrderService, PaymentService};

/// Application state: one service per domain, all over the same store.
#[derive(Clone)]
pub struct AppState<S> {
    /// Product catalog operations.
    pub catalog: CatalogService<S>,
    /// Cart lifecycle and cart-line operations.
    pub carts: CartService<S>,
    /// Order workflow operations.
    pub orders: OrderService<S>,
    /// Payment lifecycle operations.
    pub payments: PaymentService<S>,
}

impl<S: storefront_engine::Store + Clone> AppState<S> {
    /// Build the state over a store.
    #[must_use]
    pub fn new(store: S, config: EngineConfig) -> Self {
        Self {
            catalog: CatalogService::new(store.clone()),
            carts: CartService::new(store.clone(), config),
            orders: OrderService::new(store.clone(), config),
            payments: PaymentService::new(store),
        }
    }
}
