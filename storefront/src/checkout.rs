//! Checkout workflow types.
//!
//! Checkout is a small state machine driven by the shop reducer: one
//! suspension while the gateway confirms the charge, one while the ledger
//! records the sale, then a terminal receipt. Failed attempts land back on
//! an idle form carrying the user-facing failure; the transition rules
//! themselves live in [`crate::shop`].

use crate::cart::{CartLine, CartState};
use crate::ledger::SaleRecord;
use crate::payment::CardDetails;
use crate::types::Money;
use std::fmt;

/// Flat surcharge added to the cart total at checkout (shipping/service).
pub const SHIPPING_FEE: Money = Money::from_cents(500);

/// Why a checkout attempt did not produce a receipt.
///
/// Carries the user-facing message; the distinction between a decline and a
/// technical fault matters because only the latter is worth retrying as-is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CheckoutFailure {
    /// There was nothing to buy.
    EmptyCart,
    /// The card details failed the shape check.
    InvalidCard,
    /// The gateway refused the card.
    Declined,
    /// Something in the machinery broke: gateway unreachable, ledger write
    /// failed.
    Technical,
}

impl CheckoutFailure {
    /// The message shown on the checkout form.
    #[must_use]
    pub const fn message(self) -> &'static str {
        match self {
            Self::EmptyCart => "Your cart is empty.",
            Self::InvalidCard => "Please check your card details.",
            Self::Declined => "Payment declined. Please try another card.",
            Self::Technical => "A technical error occurred. Please try again.",
        }
    }
}

impl fmt::Display for CheckoutFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

/// Snapshot of what a submitted checkout is buying.
///
/// Taken at submit time so the charge and the eventual sale record describe
/// the cart as it was, even if it somehow changed mid-flight.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PendingOrder {
    /// The lines being purchased.
    pub lines: Vec<CartLine>,
    /// Charged amount: cart total plus [`SHIPPING_FEE`].
    pub total: Money,
}

impl PendingOrder {
    /// Snapshots the cart into an order.
    #[must_use]
    pub fn from_cart(cart: &CartState) -> Self {
        Self {
            lines: cart.lines().to_vec(),
            total: cart.total().add(SHIPPING_FEE),
        }
    }
}

/// Where the checkout workflow currently stands.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CheckoutState {
    /// Showing the form, possibly with the previous attempt's failure.
    Idle {
        /// Failure of the last attempt, cleared on the next submit.
        error: Option<CheckoutFailure>,
    },
    /// Waiting for the gateway to confirm the charge.
    AwaitingConfirmation {
        /// What is being bought and for how much.
        order: PendingOrder,
    },
    /// Payment approved; waiting for the ledger append.
    RecordingSale {
        /// The sale being written.
        sale: SaleRecord,
    },
    /// The attempt settled with a durable receipt.
    Success {
        /// The recorded sale.
        receipt: SaleRecord,
    },
}

impl CheckoutState {
    /// Whether an attempt is in flight (between submit and settlement).
    #[must_use]
    pub const fn is_processing(&self) -> bool {
        matches!(
            self,
            Self::AwaitingConfirmation { .. } | Self::RecordingSale { .. }
        )
    }

    /// The failure shown on the form, if idle with one.
    #[must_use]
    pub const fn error(&self) -> Option<CheckoutFailure> {
        match self {
            Self::Idle { error } => *error,
            _ => None,
        }
    }
}

impl Default for CheckoutState {
    fn default() -> Self {
        Self::Idle { error: None }
    }
}

/// Checkout workflow actions.
///
/// `Submit` comes from the user; the rest are fed back by the confirmation
/// and recording effects.
#[derive(Clone, Debug)]
pub enum CheckoutAction {
    /// Start an attempt with the given card.
    Submit {
        /// Card form input.
        card: CardDetails,
    },
    /// The gateway approved the charge.
    PaymentConfirmed,
    /// The gateway refused the card.
    PaymentDeclined,
    /// The gateway conversation broke down.
    ConfirmationFailed {
        /// What went wrong, for the logs.
        reason: String,
    },
    /// The ledger durably recorded the sale.
    SaleRecorded {
        /// The record as written.
        receipt: SaleRecord,
    },
    /// The ledger append failed.
    RecordingFailed {
        /// What went wrong, for the logs.
        reason: String,
    },
    /// Leave a settled attempt and return to a clean form.
    Reset,
}
