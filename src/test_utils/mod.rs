//! Test utilities.
//!
//! This module provides:
//! - Test data factories for creating valid user records
//! - In-memory implementations of the persistence, OAuth state and identity provider ports
//! - A builder for `AppState` backed by those in-memory implementations

mod app_state_builder;
mod mocks;

pub use app_state_builder::*;
pub use factories::*;
pub use mocks::*;
