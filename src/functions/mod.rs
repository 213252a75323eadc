pub mod constants;
pub mod elementary;
pub mod rounding;
pub mod trigonometry;

use crate::registry::Registry;

/// Installs every built-in constant and function.
pub fn register_functions(registry: &mut Registry) {
    constants::register(registry);
    elementary::register(registry);
    rounding::register(registry);
    trigonometry::register(registry);
}

pub(crate) const DOMAIN_ERROR: &str = "math domain error";
