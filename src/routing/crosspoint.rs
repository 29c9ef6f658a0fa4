use std::ops::RangeInclusive;

use serde::Deserialize;

use crate::models::{param_root, ParameterKey, ParameterMap};

/// Destinations in the router's crosspoint table
pub const ROUTE_COUNT: u32 = 32;

/// Source every test-pattern destination is pointed at
pub const TEST_PATTERN_SOURCE: u32 = 31;

/// Destinations driven by the diagnostic loopback pattern.
/// One older panel build also drove destination 24; that variant has not been
/// confirmed against the device's loopback pattern and is not reproduced.
pub const TEST_PATTERN_DESTINATIONS: RangeInclusive<u32> = 16..=23;

/// Default crosspoint blocks as (first destination, first source, length)
const DEFAULT_BLOCKS: [(u32, u32, u32); 2] = [(4, 17, 8), (16, 5, 8)];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteMode {
    #[default]
    Default,
    TestPattern,
}

fn route_key(destination: u32) -> ParameterKey {
    ParameterKey::new(param_root::CROSSPOINT, vec![destination])
}

/// Every destination disconnected (`"0"`)
pub fn clear_routes() -> ParameterMap {
    (0..ROUTE_COUNT).map(|dst| (route_key(dst), "0".to_string())).collect()
}

/// Project mapping: destinations 4..=11 from sources 17..=24 and
/// destinations 16..=23 from sources 5..=12
pub fn default_routes() -> ParameterMap {
    DEFAULT_BLOCKS
        .iter()
        .flat_map(|&(dst, src, len)| (0..len).map(move |i| (route_key(dst + i), (src + i).to_string())))
        .collect()
}

pub fn test_pattern_routes() -> ParameterMap {
    TEST_PATTERN_DESTINATIONS
        .map(|dst| (route_key(dst), TEST_PATTERN_SOURCE.to_string()))
        .collect()
}

/// Routes set after the clear phase for `mode`
pub fn routes_for(mode: RouteMode) -> ParameterMap {
    match mode {
        RouteMode::Default => default_routes(),
        RouteMode::TestPattern => test_pattern_routes(),
    }
}
