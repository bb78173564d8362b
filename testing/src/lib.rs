//! # Spinshop Testing
//!
//! Testing utilities for Spinshop reducers and services.
//!
//! This crate provides the tools the rest of the workspace tests with:
//!
//! - [`ReducerTest`]: a Given/When/Then harness for exercising reducers
//!   synchronously, without a store or a runtime
//! - [`assertions`]: reusable effect assertions for `.then_effects(...)`
//! - [`mocks`]: deterministic stand-ins for the ambient environment
//!   ([`FixedClock`], [`InMemoryStore`], [`FailingStore`])
//!
//! ## Example
//!
//! ```ignore
//! use spinshop_testing::{ReducerTest, assertions, test_clock};
//!
//! ReducerTest::new(CartReducer)
//!     .with_env(env)
//!     .given_state(CartState::default())
//!     .when_action(CartAction::Add { item })
//!     .then_state(|state| assert_eq!(state.count(), 1))
//!     .then_effects(|effects| assertions::assert_effects_count(effects, 1))
//!     .run();
//! ```

pub mod mocks;

pub use mocks::{FailingStore, FixedClock, InMemoryStore, test_clock};
pub use reducer_test::{ReducerTest, assertions};
