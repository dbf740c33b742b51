pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod tea;
pub mod testing;
pub mod view;

pub use api::{HealingApi, HealingClient};
pub use config::ClientConfig;
pub use error::{ApiError, ApiResult};
pub use tea::Session;
