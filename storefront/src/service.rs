//! The storefront service facade.
//!
//! [`Storefront`] is the application's composition root: it hydrates the
//! cart from storage, wires the injected dependencies into a
//! [`ShopEnvironment`], and runs the shop reducer on a store. Callers get a
//! small async API instead of actions and subscriptions.
//!
//! Two disciplines shape the facade:
//!
//! - **Write-through mutations.** Cart calls return only after the
//!   persistence effect has settled, so a caller that read storage right
//!   after a call would see the same cart it just produced.
//! - **No client-side abandonment.** Once a checkout has been submitted to
//!   the gateway it is never timed out or cancelled here; the call waits for
//!   the workflow to settle one way or the other.

use crate::cart::{CART_STORAGE_KEY, CartAction, CartLine, CartState};
use crate::checkout::{CheckoutAction, CheckoutFailure, CheckoutState};
use crate::ledger::{KvSaleLedger, LedgerError, SaleLedger, SaleRecord, SalesSummary, summarize};
use crate::payment::{CardDetails, PaymentGateway};
use crate::shop::{ShopAction, ShopEnvironment, ShopReducer, ShopState};
use crate::types::{CatalogItem, ItemId, Money};
use spinshop_core::environment::Clock;
use spinshop_core::storage::KeyValueStore;
use spinshop_runtime::{Store, StoreError};
use std::sync::Arc;
use tokio::sync::broadcast;

type ShopStore = Store<ShopState, ShopAction, ShopEnvironment, ShopReducer>;

/// Why a storefront call failed.
#[derive(Debug, thiserror::Error)]
pub enum StorefrontError {
    /// The checkout attempt failed; the failure carries the user-facing
    /// message.
    #[error("{0}")]
    Rejected(CheckoutFailure),
    /// A checkout is already in flight; finish or settle it first.
    #[error("A checkout is already in progress")]
    CheckoutInProgress,
    /// The underlying store refused the action.
    #[error(transparent)]
    Store(#[from] StoreError),
    /// The sales ledger could not be read.
    #[error(transparent)]
    Ledger(#[from] LedgerError),
}

/// The storefront: cart, checkout, and sales over injected dependencies.
#[derive(Clone)]
pub struct Storefront {
    store: ShopStore,
    ledger: Arc<dyn SaleLedger>,
}

impl Storefront {
    /// Builds a storefront whose sales ledger lives in the same storage as
    /// the cart snapshots (the production wiring).
    pub async fn new(
        storage: Arc<dyn KeyValueStore>,
        gateway: Arc<dyn PaymentGateway>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let ledger = KvSaleLedger::new(storage.clone()).shared();
        Self::with_ledger(storage, gateway, clock, ledger).await
    }

    /// Builds a storefront with an explicitly injected ledger.
    pub async fn with_ledger(
        storage: Arc<dyn KeyValueStore>,
        gateway: Arc<dyn PaymentGateway>,
        clock: Arc<dyn Clock>,
        ledger: Arc<dyn SaleLedger>,
    ) -> Self {
        let snapshot = match storage.get(CART_STORAGE_KEY).await {
            Ok(snapshot) => snapshot,
            Err(error) => {
                tracing::warn!(%error, "Could not read persisted cart, starting empty");
                None
            }
        };
        let cart = CartState::restore(snapshot.as_deref());
        tracing::info!(lines = cart.lines().len(), "Hydrated cart from storage");

        let environment = ShopEnvironment::new(clock, storage, gateway, ledger.clone());
        let state = ShopState {
            cart,
            checkout: CheckoutState::default(),
        };

        Self {
            store: Store::new(state, ShopReducer, environment),
            ledger,
        }
    }

    /// Adds one unit of `item` to the cart and persists the new snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is shutting down.
    pub async fn add_to_cart(&self, item: CatalogItem) -> Result<(), StorefrontError> {
        let mut handle = self
            .store
            .send(ShopAction::Cart(CartAction::Add { item }))
            .await?;
        handle.wait().await;
        Ok(())
    }

    /// Removes an item's whole line and persists the new snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is shutting down.
    pub async fn remove_from_cart(&self, id: ItemId) -> Result<(), StorefrontError> {
        let mut handle = self
            .store
            .send(ShopAction::Cart(CartAction::Remove { id }))
            .await?;
        handle.wait().await;
        Ok(())
    }

    /// Empties the cart and erases the persisted snapshot.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is shutting down.
    pub async fn clear_cart(&self) -> Result<(), StorefrontError> {
        let mut handle = self.store.send(ShopAction::Cart(CartAction::Clear)).await?;
        handle.wait().await;
        Ok(())
    }

    /// Shows or hides the cart drawer.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is shutting down.
    pub async fn toggle_cart(&self) -> Result<(), StorefrontError> {
        let mut handle = self
            .store
            .send(ShopAction::Cart(CartAction::ToggleDrawer))
            .await?;
        handle.wait().await;
        Ok(())
    }

    /// The current cart lines.
    pub async fn cart(&self) -> Vec<CartLine> {
        self.store.state(|state| state.cart.lines().to_vec()).await
    }

    /// The current cart total (without the checkout surcharge).
    pub async fn cart_total(&self) -> Money {
        self.store.state(|state| state.cart.total()).await
    }

    /// Total units in the cart.
    pub async fn cart_count(&self) -> u32 {
        self.store.state(|state| state.cart.count()).await
    }

    /// Whether the cart drawer is showing.
    pub async fn drawer_open(&self) -> bool {
        self.store.state(|state| state.cart.drawer_open()).await
    }

    /// Where the checkout workflow currently stands.
    pub async fn checkout_state(&self) -> CheckoutState {
        self.store.state(|state| state.checkout.clone()).await
    }

    /// Runs a checkout attempt to settlement and returns the receipt.
    ///
    /// A previous success is reset automatically; otherwise the attempt
    /// walks the full workflow: validation, gateway confirmation, ledger
    /// append, cart clearing. The call waits as long as the gateway does;
    /// a submitted payment is never abandoned client-side.
    ///
    /// # Errors
    ///
    /// - [`StorefrontError::Rejected`] with the workflow failure (empty
    ///   cart, invalid card, decline, technical fault)
    /// - [`StorefrontError::CheckoutInProgress`] if an attempt is already
    ///   in flight
    /// - [`StorefrontError::Store`] if the store is shutting down
    pub async fn checkout(&self, card: CardDetails) -> Result<SaleRecord, StorefrontError> {
        match self.checkout_state().await {
            CheckoutState::Success { .. } => {
                let mut handle = self
                    .store
                    .send(ShopAction::Checkout(CheckoutAction::Reset))
                    .await?;
                handle.wait().await;
            }
            state if state.is_processing() => {
                return Err(StorefrontError::CheckoutInProgress);
            }
            _ => {}
        }

        // Subscribe before sending so a fast settlement cannot be missed.
        let mut actions = self.store.subscribe_actions();
        let mut handle = self
            .store
            .send_cascading(ShopAction::Checkout(CheckoutAction::Submit { card }))
            .await?;

        // Synchronous rejections are already in state when send returns.
        if let Some(failure) = self.store.state(|state| state.checkout.error()).await {
            return Err(StorefrontError::Rejected(failure));
        }

        loop {
            match actions.recv().await {
                Ok(ShopAction::Checkout(CheckoutAction::SaleRecorded { receipt })) => {
                    // Cover the trailing erase-cart effect so storage agrees
                    // with the receipt when this returns.
                    handle.wait().await;
                    return Ok(receipt);
                }
                Ok(ShopAction::Checkout(CheckoutAction::PaymentDeclined)) => {
                    return Err(StorefrontError::Rejected(CheckoutFailure::Declined));
                }
                Ok(ShopAction::Checkout(
                    CheckoutAction::ConfirmationFailed { .. }
                    | CheckoutAction::RecordingFailed { .. },
                )) => {
                    return Err(StorefrontError::Rejected(CheckoutFailure::Technical));
                }
                Ok(_) => {}
                Err(broadcast::error::RecvError::Lagged(skipped)) => {
                    tracing::warn!(skipped, "Checkout observer lagged");
                }
                Err(broadcast::error::RecvError::Closed) => {
                    return Err(StoreError::ChannelClosed.into());
                }
            }
        }
    }

    /// Returns a settled checkout to a clean form.
    ///
    /// # Errors
    ///
    /// Returns an error if the store is shutting down.
    pub async fn start_new_order(&self) -> Result<(), StorefrontError> {
        let mut handle = self
            .store
            .send(ShopAction::Checkout(CheckoutAction::Reset))
            .await?;
        handle.wait().await;
        Ok(())
    }

    /// Every recorded sale, oldest first.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger cannot be read.
    pub async fn sales(&self) -> Result<Vec<SaleRecord>, StorefrontError> {
        Ok(self.ledger.sales().await?)
    }

    /// Revenue and ticket-sale aggregates over the whole ledger.
    ///
    /// # Errors
    ///
    /// Returns an error if the ledger cannot be read.
    pub async fn sales_summary(&self) -> Result<SalesSummary, StorefrontError> {
        let sales = self.ledger.sales().await?;
        Ok(summarize(&sales))
    }

    /// Gracefully shuts the store down, draining in-flight effects.
    ///
    /// # Errors
    ///
    /// Returns an error if pending effects did not settle within the
    /// configured timeout.
    pub async fn shutdown(&self) -> Result<(), StorefrontError> {
        Ok(self.store.shutdown().await?)
    }
}
