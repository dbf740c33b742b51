//! Healing service API: wire types, request assembly and the HTTP client

pub mod client;
pub mod request;
pub mod types;

pub use client::{HealingApi, HealingClient};
pub use request::{build_broadcast_request, build_code_search_query, parse_float_lenient};
pub use types::{BroadcastResponse, FieldType, HealingCode, IntentionRequest, SoulArchiveEntry};
