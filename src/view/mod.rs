//! Derived view data computed from session state

pub mod geometry;
pub mod summary;

pub use geometry::{compute_geometry_image_url, geometry_image_ref, slugify, GeometryImageRef};
pub use summary::BroadcastSummary;
