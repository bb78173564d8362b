//! Spinshop Storefront - a record shop's cart and checkout on the composable runtime
//!
//! This crate implements the commerce core of a record-store venue: a
//! shopping cart for records and event tickets, a mock payment checkout, and
//! a durable sales ledger with back-office aggregates. It showcases:
//!
//! - **One composed reducer**: cart mutations and the checkout state machine
//!   share `ShopReducer`, because settlement couples them
//! - **Effects for everything async**: persistence writes, the gateway
//!   conversation, and the ledger append all run as tracked effects that
//!   feed outcome actions back in
//! - **Injected dependencies**: clock, storage, gateway, and ledger arrive
//!   through `ShopEnvironment`, so every piece swaps out in tests
//!
//! # Architecture
//!
//! ```text
//!              ┌──────────────────────────┐
//!              │        Storefront        │  facade / composition root:
//!              │  hydrate · mutate · buy  │  one async method per use case
//!              └────────────┬─────────────┘
//!                           │ actions
//!                           ▼
//!              ┌──────────────────────────┐
//!              │  Store<ShopState, …>     │  spinshop-runtime
//!              └────────────┬─────────────┘
//!                           │ ShopReducer
//!             ┌─────────────┴─────────────┐
//!             ▼                           ▼
//!     ┌───────────────┐          ┌────────────────┐
//!     │   CartState   │          │ CheckoutState  │
//!     │ (lines, total)│          │ (workflow)     │
//!     └───────┬───────┘          └───────┬────────┘
//!             │ persist effect           │ confirm / record effects
//!             ▼                          ▼
//!     ┌───────────────┐  ┌────────────────┐  ┌──────────────┐
//!     │ KeyValueStore │  │ PaymentGateway │  │  SaleLedger  │
//!     └───────────────┘  └────────────────┘  └──────────────┘
//! ```
//!
//! # Checkout Workflow
//!
//! ```text
//! Idle ──Submit──▶ AwaitingConfirmation ──approved──▶ RecordingSale ──recorded──▶ Success
//!  ▲   (validate)          │                               │
//!  │                       │ declined / gateway fault      │ ledger fault
//!  └───────────────────────┴───────────────────────────────┘
//!         back to Idle carrying the failure, cart intact
//! ```
//!
//! Two durability rules anchor the workflow:
//!
//! 1. The cart is cleared only **after** the sale is durably in the ledger;
//!    a declined payment or a failed append leaves the cart (and its
//!    persisted snapshot) untouched.
//! 2. The ledger never drops a sale silently: a failed or unreadable append
//!    surfaces as a technical error to the buyer.
//!
//! # Usage
//!
//! See [`Storefront`] for the service API and the crate's binary for a
//! full walkthrough.

#![forbid(unsafe_code)]
#![warn(missing_docs)]

pub mod cart;
pub mod checkout;
pub mod config;
pub mod ledger;
pub mod payment;
pub mod service;
pub mod shop;
pub mod types;

pub use cart::{CART_STORAGE_KEY, CartAction, CartLine, CartState};
pub use checkout::{CheckoutAction, CheckoutFailure, CheckoutState, PendingOrder, SHIPPING_FEE};
pub use config::Config;
pub use ledger::{
    KvSaleLedger, LedgerError, SALES_STORAGE_KEY, SaleKind, SaleLedger, SaleRecord, SalesSummary,
    summarize,
};
pub use payment::{
    CardDetails, ConfirmOutcome, PaymentDecision, PaymentGateway, PaymentGatewayError,
    PaymentIntent, PaymentIntentStatus, PaymentMethodRef, ScriptedGateway, SimulatedGateway,
    validate_card,
};
pub use service::{Storefront, StorefrontError};
pub use shop::{ShopAction, ShopEnvironment, ShopReducer, ShopState};
pub use types::*;
