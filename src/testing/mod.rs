//! Testing infrastructure for the view session
//!
//! Provides an in-memory [`HealingApi`](crate::api::HealingApi) so the state container
//! can be exercised without a network or a rendering harness.

pub mod mock_api;

pub use mock_api::{echo_broadcast, MockBehavior, MockCall, MockHealingApi};
