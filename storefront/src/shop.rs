//! The shop reducer: cart mutations composed with the checkout workflow.
//!
//! Cart and checkout share one reducer because settlement couples them: the
//! checkout snapshot is taken from the cart at submit time, and the cart is
//! cleared inside the transition that accepts the durable sale record.
//! Everything async (persistence, the gateway conversation, the ledger
//! append) happens in effects that feed outcome actions back in.

use crate::cart::{CART_STORAGE_KEY, CartAction, CartState};
use crate::checkout::{CheckoutAction, CheckoutFailure, CheckoutState, PendingOrder};
use crate::ledger::{SaleLedger, SaleRecord};
use crate::payment::{PaymentDecision, PaymentGateway, PaymentMethodRef, validate_card};
use crate::types::Money;
use spinshop_core::environment::Clock;
use spinshop_core::storage::KeyValueStore;
use spinshop_core::{Effect, Reducer, SmallVec, smallvec};
use std::sync::Arc;

/// Dependencies the shop reducer's effects run against.
#[derive(Clone)]
pub struct ShopEnvironment {
    /// Wall clock for sale timestamps.
    pub clock: Arc<dyn Clock>,
    /// Where cart snapshots persist.
    pub storage: Arc<dyn KeyValueStore>,
    /// Payment processor.
    pub gateway: Arc<dyn PaymentGateway>,
    /// Book of record for settled sales.
    pub ledger: Arc<dyn SaleLedger>,
}

impl ShopEnvironment {
    /// Bundles the injected dependencies into an environment.
    #[must_use]
    pub fn new(
        clock: Arc<dyn Clock>,
        storage: Arc<dyn KeyValueStore>,
        gateway: Arc<dyn PaymentGateway>,
        ledger: Arc<dyn SaleLedger>,
    ) -> Self {
        Self {
            clock,
            storage,
            gateway,
            ledger,
        }
    }
}

/// Complete storefront state: the cart and the checkout workflow.
#[derive(Clone, Debug, Default)]
pub struct ShopState {
    /// The shopping cart.
    pub cart: CartState,
    /// Where the current checkout attempt stands.
    pub checkout: CheckoutState,
}

/// Everything that can happen in the storefront.
#[derive(Clone, Debug)]
pub enum ShopAction {
    /// Cart mutation.
    Cart(CartAction),
    /// Checkout workflow step.
    Checkout(CheckoutAction),
}

impl From<CartAction> for ShopAction {
    fn from(action: CartAction) -> Self {
        Self::Cart(action)
    }
}

impl From<CheckoutAction> for ShopAction {
    fn from(action: CheckoutAction) -> Self {
        Self::Checkout(action)
    }
}

/// Reducer for the whole storefront.
#[derive(Clone, Copy, Debug, Default)]
pub struct ShopReducer;

impl Reducer for ShopReducer {
    type State = ShopState;
    type Action = ShopAction;
    type Environment = ShopEnvironment;

    fn reduce(
        &self,
        state: &mut Self::State,
        action: Self::Action,
        env: &Self::Environment,
    ) -> SmallVec<[Effect<Self::Action>; 4]> {
        match action {
            ShopAction::Cart(action) => Self::reduce_cart(state, action, env),
            ShopAction::Checkout(action) => Self::reduce_checkout(state, action, env),
        }
    }
}

impl ShopReducer {
    fn reduce_cart(
        state: &mut ShopState,
        action: CartAction,
        env: &ShopEnvironment,
    ) -> SmallVec<[Effect<ShopAction>; 4]> {
        match action {
            CartAction::Add { item } => {
                tracing::debug!(id = %item.id, title = %item.title, "Adding item to cart");
                state.cart.add(item);
                smallvec![Self::persist_cart(&state.cart, env)]
            }
            CartAction::Remove { id } => {
                tracing::debug!(%id, "Removing item from cart");
                state.cart.remove(&id);
                smallvec![Self::persist_cart(&state.cart, env)]
            }
            CartAction::Clear => {
                tracing::debug!("Clearing cart");
                state.cart.clear();
                smallvec![Self::erase_cart(env)]
            }
            CartAction::ToggleDrawer => {
                state.cart.toggle_drawer();
                smallvec![]
            }
        }
    }

    fn reduce_checkout(
        state: &mut ShopState,
        action: CheckoutAction,
        env: &ShopEnvironment,
    ) -> SmallVec<[Effect<ShopAction>; 4]> {
        match (state.checkout.clone(), action) {
            (CheckoutState::Idle { .. }, CheckoutAction::Submit { card }) => {
                if state.cart.is_empty() {
                    state.checkout = CheckoutState::Idle {
                        error: Some(CheckoutFailure::EmptyCart),
                    };
                    return smallvec![];
                }
                if !validate_card(&card) {
                    state.checkout = CheckoutState::Idle {
                        error: Some(CheckoutFailure::InvalidCard),
                    };
                    return smallvec![];
                }

                let order = PendingOrder::from_cart(&state.cart);
                let method = PaymentMethodRef::from_card(&card);
                tracing::info!(
                    total = order.total.cents(),
                    lines = order.lines.len(),
                    "Submitting checkout"
                );
                let effect = Self::confirm_payment(order.total, method, env);
                state.checkout = CheckoutState::AwaitingConfirmation { order };
                smallvec![effect]
            }

            (
                CheckoutState::AwaitingConfirmation { order },
                CheckoutAction::PaymentConfirmed,
            ) => {
                let sale = SaleRecord::new(order.lines, order.total, env.clock.now());
                tracing::info!(sale_id = %sale.id, "Payment confirmed, recording sale");
                let effect = Self::record_sale(sale.clone(), env);
                state.checkout = CheckoutState::RecordingSale { sale };
                smallvec![effect]
            }

            (CheckoutState::AwaitingConfirmation { .. }, CheckoutAction::PaymentDeclined) => {
                tracing::info!("Payment declined");
                state.checkout = CheckoutState::Idle {
                    error: Some(CheckoutFailure::Declined),
                };
                smallvec![]
            }

            (
                CheckoutState::AwaitingConfirmation { .. },
                CheckoutAction::ConfirmationFailed { reason },
            ) => {
                tracing::warn!(%reason, "Payment confirmation failed");
                state.checkout = CheckoutState::Idle {
                    error: Some(CheckoutFailure::Technical),
                };
                smallvec![]
            }

            (CheckoutState::RecordingSale { sale }, CheckoutAction::SaleRecorded { receipt }) => {
                if receipt.id != sale.id {
                    tracing::warn!(
                        expected = %sale.id,
                        received = %receipt.id,
                        "Ignoring sale confirmation for a different sale"
                    );
                    return smallvec![];
                }

                tracing::info!(
                    sale_id = %receipt.id,
                    total = receipt.total.cents(),
                    "Sale settled"
                );
                // The ledger append is durable; only now does the cart empty.
                state.cart.clear();
                state.checkout = CheckoutState::Success { receipt };
                smallvec![Self::erase_cart(env)]
            }

            (CheckoutState::RecordingSale { .. }, CheckoutAction::RecordingFailed { reason }) => {
                tracing::error!(%reason, "Failed to record sale, cart preserved");
                state.checkout = CheckoutState::Idle {
                    error: Some(CheckoutFailure::Technical),
                };
                smallvec![]
            }

            (
                CheckoutState::Idle { .. } | CheckoutState::Success { .. },
                CheckoutAction::Reset,
            ) => {
                state.checkout = CheckoutState::Idle { error: None };
                smallvec![]
            }

            (_, CheckoutAction::Submit { .. }) => {
                tracing::warn!("Ignoring submit, checkout is not at the form");
                smallvec![]
            }

            (_, action) => {
                tracing::debug!(?action, "Ignoring checkout action in current state");
                smallvec![]
            }
        }
    }

    fn persist_cart(cart: &CartState, env: &ShopEnvironment) -> Effect<ShopAction> {
        let snapshot = match cart.snapshot() {
            Ok(snapshot) => snapshot,
            Err(error) => {
                tracing::error!(%error, "Failed to serialize cart, skipping persistence");
                return Effect::None;
            }
        };

        let storage = env.storage.clone();
        Effect::Future(Box::pin(async move {
            // The in-memory cart is the source of truth; a failed write is
            // logged and the next mutation retries the full snapshot.
            if let Err(error) = storage.put(CART_STORAGE_KEY, snapshot).await {
                tracing::warn!(%error, "Failed to persist cart");
            }
            None
        }))
    }

    fn erase_cart(env: &ShopEnvironment) -> Effect<ShopAction> {
        let storage = env.storage.clone();
        Effect::Future(Box::pin(async move {
            if let Err(error) = storage.remove(CART_STORAGE_KEY).await {
                tracing::warn!(%error, "Failed to erase persisted cart");
            }
            None
        }))
    }

    fn confirm_payment(
        amount: Money,
        method: PaymentMethodRef,
        env: &ShopEnvironment,
    ) -> Effect<ShopAction> {
        let gateway = env.gateway.clone();
        Effect::Future(Box::pin(async move {
            let intent = match gateway.create_intent(amount).await {
                Ok(intent) => intent,
                Err(error) => {
                    return Some(ShopAction::Checkout(CheckoutAction::ConfirmationFailed {
                        reason: error.to_string(),
                    }));
                }
            };

            match gateway.confirm_payment(&intent, &method).await {
                Ok(PaymentDecision::Approved) => {
                    Some(ShopAction::Checkout(CheckoutAction::PaymentConfirmed))
                }
                Ok(PaymentDecision::Declined) => {
                    Some(ShopAction::Checkout(CheckoutAction::PaymentDeclined))
                }
                Err(error) => Some(ShopAction::Checkout(CheckoutAction::ConfirmationFailed {
                    reason: error.to_string(),
                })),
            }
        }))
    }

    fn record_sale(sale: SaleRecord, env: &ShopEnvironment) -> Effect<ShopAction> {
        let ledger = env.ledger.clone();
        Effect::Future(Box::pin(async move {
            let receipt = sale.clone();
            match ledger.record(sale).await {
                Ok(()) => Some(ShopAction::Checkout(CheckoutAction::SaleRecorded { receipt })),
                Err(error) => Some(ShopAction::Checkout(CheckoutAction::RecordingFailed {
                    reason: error.to_string(),
                })),
            }
        }))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::panic)]
mod tests {
    use super::*;
    use crate::checkout::SHIPPING_FEE;
    use crate::ledger::KvSaleLedger;
    use crate::payment::{CardDetails, ScriptedGateway};
    use crate::types::{CatalogItem, ItemId};
    use spinshop_testing::{InMemoryStore, ReducerTest, assertions, test_clock};

    fn record(id: &str, euros: u64) -> CatalogItem {
        CatalogItem {
            id: ItemId::from(id),
            title: format!("Record {id}"),
            artist: "Test Artist".to_string(),
            price: Money::from_euros(euros),
            cover_url: String::new(),
            genre: "Jazz".to_string(),
            format: "LP".to_string(),
            description: String::new(),
            discogs_link: "#".to_string(),
        }
    }

    fn valid_card() -> CardDetails {
        CardDetails::new("4242 4242 4242 4242", "12/30", "123")
    }

    fn test_env() -> ShopEnvironment {
        let storage = InMemoryStore::new().shared();
        ShopEnvironment::new(
            Arc::new(test_clock()),
            storage.clone(),
            ScriptedGateway::approving().shared(),
            KvSaleLedger::new(storage).shared(),
        )
    }

    fn state_with_items(items: &[CatalogItem]) -> ShopState {
        let mut state = ShopState::default();
        for item in items {
            state.cart.add(item.clone());
        }
        state
    }

    fn awaiting_state(items: &[CatalogItem]) -> ShopState {
        let mut state = state_with_items(items);
        state.checkout = CheckoutState::AwaitingConfirmation {
            order: PendingOrder::from_cart(&state.cart),
        };
        state
    }

    #[test]
    fn adding_the_same_record_twice_merges_lines() {
        ReducerTest::new(ShopReducer)
            .with_env(test_env())
            .given_state(ShopState::default())
            .when_action(ShopAction::Cart(CartAction::Add {
                item: record("r1", 25),
            }))
            .when_action(ShopAction::Cart(CartAction::Add {
                item: record("r1", 25),
            }))
            .then_state(|state| {
                assert_eq!(state.cart.lines().len(), 1);
                assert_eq!(state.cart.lines()[0].quantity, 2);
                assert_eq!(state.cart.total(), Money::from_cents(5000));
                assert_eq!(state.cart.count(), 2);
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn distinct_records_total_independently() {
        ReducerTest::new(ShopReducer)
            .with_env(test_env())
            .given_state(ShopState::default())
            .when_action(ShopAction::Cart(CartAction::Add {
                item: record("r1", 25),
            }))
            .when_action(ShopAction::Cart(CartAction::Add {
                item: record("r2", 45),
            }))
            .then_state(|state| {
                assert_eq!(state.cart.total(), Money::from_cents(7000));
                assert_eq!(state.cart.count(), 2);
            })
            .run();
    }

    #[test]
    fn the_same_event_ticket_twice_is_one_line() {
        let ticket = || {
            CatalogItem::ticket_for_event(
                "jazz-night",
                "Jazz Night",
                "Live Music",
                "2025-06-21",
                Money::from_euros(15),
            )
        };

        ReducerTest::new(ShopReducer)
            .with_env(test_env())
            .given_state(ShopState::default())
            .when_action(ShopAction::Cart(CartAction::Add { item: ticket() }))
            .when_action(ShopAction::Cart(CartAction::Add { item: ticket() }))
            .then_state(|state| {
                assert_eq!(state.cart.lines().len(), 1);
                assert_eq!(state.cart.lines()[0].quantity, 2);
            })
            .run();
    }

    #[test]
    fn removing_a_line_persists_the_smaller_cart() {
        ReducerTest::new(ShopReducer)
            .with_env(test_env())
            .given_state(state_with_items(&[record("r1", 25), record("r2", 45)]))
            .when_action(ShopAction::Cart(CartAction::Remove {
                id: ItemId::from("r1"),
            }))
            .then_state(|state| {
                assert_eq!(state.cart.lines().len(), 1);
                assert_eq!(state.cart.total(), Money::from_euros(45));
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn toggling_the_drawer_is_pure_state() {
        ReducerTest::new(ShopReducer)
            .with_env(test_env())
            .given_state(ShopState::default())
            .when_action(ShopAction::Cart(CartAction::ToggleDrawer))
            .then_state(|state| assert!(state.cart.drawer_open()))
            .then_effects(|effects| assertions::assert_no_effects(effects))
            .run();
    }

    #[test]
    fn clearing_the_cart_erases_the_snapshot() {
        ReducerTest::new(ShopReducer)
            .with_env(test_env())
            .given_state(state_with_items(&[record("r1", 25)]))
            .when_action(ShopAction::Cart(CartAction::Clear))
            .then_state(|state| assert!(state.cart.is_empty()))
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn submitting_an_empty_cart_is_rejected_synchronously() {
        ReducerTest::new(ShopReducer)
            .with_env(test_env())
            .given_state(ShopState::default())
            .when_action(ShopAction::Checkout(CheckoutAction::Submit {
                card: valid_card(),
            }))
            .then_state(|state| {
                assert_eq!(state.checkout.error(), Some(CheckoutFailure::EmptyCart));
                assert!(!state.checkout.is_processing());
            })
            .then_effects(|effects| assertions::assert_no_effects(effects))
            .run();
    }

    #[test]
    fn submitting_bad_card_details_is_rejected_synchronously() {
        ReducerTest::new(ShopReducer)
            .with_env(test_env())
            .given_state(state_with_items(&[record("r1", 25)]))
            .when_action(ShopAction::Checkout(CheckoutAction::Submit {
                card: CardDetails::new("1234", "12/30", "123"),
            }))
            .then_state(|state| {
                assert_eq!(state.checkout.error(), Some(CheckoutFailure::InvalidCard));
                assert_eq!(state.cart.count(), 1, "rejection must not touch the cart");
            })
            .then_effects(|effects| assertions::assert_no_effects(effects))
            .run();
    }

    #[test]
    fn a_valid_submit_snapshots_the_order_and_starts_confirmation() {
        ReducerTest::new(ShopReducer)
            .with_env(test_env())
            .given_state(state_with_items(&[record("r1", 25), record("r2", 45)]))
            .when_action(ShopAction::Checkout(CheckoutAction::Submit {
                card: valid_card(),
            }))
            .then_state(|state| {
                let CheckoutState::AwaitingConfirmation { order } = &state.checkout else {
                    panic!("expected AwaitingConfirmation, got {:?}", state.checkout);
                };
                assert_eq!(order.total, Money::from_euros(70).add(SHIPPING_FEE));
                assert_eq!(order.lines.len(), 2);
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn confirmation_builds_the_sale_from_the_order_snapshot() {
        let expected_time = test_clock().now();

        ReducerTest::new(ShopReducer)
            .with_env(test_env())
            .given_state(awaiting_state(&[record("r1", 25), record("r2", 45)]))
            .when_action(ShopAction::Checkout(CheckoutAction::PaymentConfirmed))
            .then_state(move |state| {
                let CheckoutState::RecordingSale { sale } = &state.checkout else {
                    panic!("expected RecordingSale, got {:?}", state.checkout);
                };
                assert_eq!(sale.total, Money::from_cents(7500));
                assert_eq!(sale.items.len(), 2);
                assert_eq!(sale.timestamp, expected_time);
            })
            .then_effects(|effects| {
                assertions::assert_effects_count(effects, 1);
                assertions::assert_has_future_effect(effects);
            })
            .run();
    }

    #[test]
    fn a_decline_returns_to_the_form_with_the_cart_intact() {
        ReducerTest::new(ShopReducer)
            .with_env(test_env())
            .given_state(awaiting_state(&[record("r1", 25)]))
            .when_action(ShopAction::Checkout(CheckoutAction::PaymentDeclined))
            .then_state(|state| {
                assert_eq!(state.checkout.error(), Some(CheckoutFailure::Declined));
                assert_eq!(state.cart.count(), 1);
            })
            .then_effects(|effects| assertions::assert_no_effects(effects))
            .run();
    }

    #[test]
    fn a_gateway_fault_reads_as_a_technical_error() {
        ReducerTest::new(ShopReducer)
            .with_env(test_env())
            .given_state(awaiting_state(&[record("r1", 25)]))
            .when_action(ShopAction::Checkout(CheckoutAction::ConfirmationFailed {
                reason: "gateway unreachable".to_string(),
            }))
            .then_state(|state| {
                assert_eq!(state.checkout.error(), Some(CheckoutFailure::Technical));
                assert_eq!(state.cart.count(), 1);
            })
            .run();
    }

    #[test]
    fn the_durable_receipt_clears_the_cart_and_erases_the_snapshot() {
        let mut state = awaiting_state(&[record("r1", 25)]);
        let env = test_env();

        // Walk to RecordingSale to get the in-flight sale.
        ShopReducer.reduce(
            &mut state,
            ShopAction::Checkout(CheckoutAction::PaymentConfirmed),
            &env,
        );
        let CheckoutState::RecordingSale { sale } = state.checkout.clone() else {
            panic!("expected RecordingSale, got {:?}", state.checkout);
        };

        let effects = ShopReducer.reduce(
            &mut state,
            ShopAction::Checkout(CheckoutAction::SaleRecorded {
                receipt: sale.clone(),
            }),
            &env,
        );

        assert!(state.cart.is_empty(), "cart clears only after settlement");
        let CheckoutState::Success { receipt } = &state.checkout else {
            panic!("expected Success, got {:?}", state.checkout);
        };
        assert_eq!(receipt.id, sale.id);
        assertions::assert_effects_count(&effects, 1);
        assertions::assert_has_future_effect(&effects);
    }

    #[test]
    fn a_receipt_for_a_different_sale_is_ignored() {
        let mut state = awaiting_state(&[record("r1", 25)]);
        let env = test_env();

        ShopReducer.reduce(
            &mut state,
            ShopAction::Checkout(CheckoutAction::PaymentConfirmed),
            &env,
        );
        let before = state.checkout.clone();

        let stranger = SaleRecord::new(
            Vec::new(),
            Money::from_euros(1),
            env.clock.now(),
        );
        let effects = ShopReducer.reduce(
            &mut state,
            ShopAction::Checkout(CheckoutAction::SaleRecorded { receipt: stranger }),
            &env,
        );

        assert_eq!(state.checkout, before);
        assert_eq!(state.cart.count(), 1);
        assertions::assert_no_effects(&effects);
    }

    #[test]
    fn a_failed_ledger_append_preserves_the_cart() {
        let mut state = awaiting_state(&[record("r1", 25)]);
        let env = test_env();

        ShopReducer.reduce(
            &mut state,
            ShopAction::Checkout(CheckoutAction::PaymentConfirmed),
            &env,
        );
        let effects = ShopReducer.reduce(
            &mut state,
            ShopAction::Checkout(CheckoutAction::RecordingFailed {
                reason: "disk full".to_string(),
            }),
            &env,
        );

        assert_eq!(state.checkout.error(), Some(CheckoutFailure::Technical));
        assert_eq!(state.cart.count(), 1, "an unrecorded sale must not empty the cart");
        assertions::assert_no_effects(&effects);
    }

    #[test]
    fn submit_is_ignored_while_an_attempt_is_in_flight() {
        let mut state = awaiting_state(&[record("r1", 25)]);
        let before = state.checkout.clone();
        let env = test_env();

        let effects = ShopReducer.reduce(
            &mut state,
            ShopAction::Checkout(CheckoutAction::Submit { card: valid_card() }),
            &env,
        );

        assert_eq!(state.checkout, before);
        assertions::assert_no_effects(&effects);
    }

    #[test]
    fn reset_returns_a_settled_attempt_to_a_clean_form() {
        let mut state = state_with_items(&[]);
        state.checkout = CheckoutState::Idle {
            error: Some(CheckoutFailure::Declined),
        };
        let env = test_env();

        let effects = ShopReducer.reduce(
            &mut state,
            ShopAction::Checkout(CheckoutAction::Reset),
            &env,
        );

        assert_eq!(state.checkout, CheckoutState::Idle { error: None });
        assertions::assert_no_effects(&effects);
    }

    #[test]
    fn reset_is_ignored_mid_flight() {
        let mut state = awaiting_state(&[record("r1", 25)]);
        let before = state.checkout.clone();
        let env = test_env();

        ShopReducer.reduce(
            &mut state,
            ShopAction::Checkout(CheckoutAction::Reset),
            &env,
        );

        assert_eq!(state.checkout, before);
    }

    #[test]
    fn checkout_total_is_cart_total_plus_surcharge() {
        let env = test_env();
        let mut state = ShopState::default();

        for item in [record("r1", 25), record("r2", 45)] {
            ShopReducer.reduce(&mut state, ShopAction::Cart(CartAction::Add { item }), &env);
        }
        assert_eq!(state.cart.total(), Money::from_cents(7000));

        ShopReducer.reduce(
            &mut state,
            ShopAction::Checkout(CheckoutAction::Submit { card: valid_card() }),
            &env,
        );
        ShopReducer.reduce(
            &mut state,
            ShopAction::Checkout(CheckoutAction::PaymentConfirmed),
            &env,
        );

        let CheckoutState::RecordingSale { sale } = &state.checkout else {
            panic!("expected RecordingSale, got {:?}", state.checkout);
        };
        assert_eq!(sale.total, Money::from_cents(7500));
    }
}
