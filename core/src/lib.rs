//! # Spinshop Core
//!
//! Core traits and types for the Spinshop composable architecture.
//!
//! This crate provides the fundamental abstractions for building the shop's
//! state machines: pure reducers that describe side effects as values, with
//! all external dependencies injected through an environment.
//!
//! ## Core Concepts
//!
//! - **State**: Domain state for a feature (cart contents, checkout progress)
//! - **Action**: All possible inputs to a reducer (user intents plus the
//!   outcomes fed back by effects, e.g. a payment confirmation)
//! - **Reducer**: Pure function `(State, Action, Environment) → (State, Effects)`
//! - **Effect**: Side effect descriptions (not execution)
//! - **Environment**: Injected dependencies via traits
//!
//! ## Architecture Principles
//!
//! - Functional Core, Imperative Shell
//! - Unidirectional Data Flow
//! - Explicit Effects (no hidden I/O)
//! - Dependency Injection via Environment
//!
//! ## Example
//!
//! ```ignore
//! use spinshop_core::{Effect, Reducer, SmallVec, smallvec};
//!
//! struct CartReducer;
//!
//! impl Reducer for CartReducer {
//!     type State = CartState;
//!     type Action = CartAction;
//!     type Environment = CartEnvironment;
//!
//!     fn reduce(
//!         &self,
//!         state: &mut CartState,
//!         action: CartAction,
//!         env: &CartEnvironment,
//!     ) -> SmallVec<[Effect<CartAction>; 4]> {
//!         match action {
//!             CartAction::Add { item } => {
//!                 state.add(item);
//!                 smallvec![persist_snapshot(state, env)]
//!             }
//!             _ => smallvec![Effect::None],
//!         }
//!     }
//! }
//! ```

pub mod effect;
pub mod environment;
pub mod reducer;
pub mod storage;

// Re-export commonly used types
pub use chrono::{DateTime, Utc};
pub use effect::Effect;
pub use environment::{Clock, SystemClock};
pub use reducer::Reducer;
pub use serde::{Deserialize, Serialize};
pub use smallvec::{SmallVec, smallvec};
pub use storage::{KeyValueStore, StorageError};
