use crate::registry::Registry;
use std::f64::consts::{E, PI};

/// The golden ratio, `(1 + sqrt 5) / 2`.
pub const PHI: f64 = 1.618_033_988_749_895;

pub fn register(registry: &mut Registry) {
    registry.insert_constant("pi", PI);
    registry.insert_constant("e", E);
    registry.insert_constant("phi", PHI);
}
