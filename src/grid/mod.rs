pub mod builder;
pub mod family;
pub mod range;

pub use builder::{build_router_grid, GridSettings};
pub use family::{is_media_key, MediaFamily, Trunk};
pub use range::expand_range;
