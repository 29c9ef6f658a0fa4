pub mod crosspoint;
pub mod trunks;

pub use crosspoint::{clear_routes, routes_for, RouteMode};
pub use trunks::build_trunk_params;
