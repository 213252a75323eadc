use crate::functions::DOMAIN_ERROR;
use crate::registry::{Arity, Registry};
use reckon_macros::reckon_fn;

pub fn register(registry: &mut Registry) {
    registry.insert_function("sin", Arity::Exact(1), sin);
    registry.insert_function("cos", Arity::Exact(1), cos);
    registry.insert_function("tan", Arity::Exact(1), tan);
}

// Angles are in radians. An infinite angle has no defined value.

#[reckon_fn]
pub fn sin(x: f64) -> Result<f64, String> {
    finite_angle(x).map(f64::sin)
}

#[reckon_fn]
pub fn cos(x: f64) -> Result<f64, String> {
    finite_angle(x).map(f64::cos)
}

#[reckon_fn]
pub fn tan(x: f64) -> Result<f64, String> {
    finite_angle(x).map(f64::tan)
}

fn finite_angle(x: f64) -> Result<f64, String> {
    if x.is_infinite() {
        Err(DOMAIN_ERROR.to_string())
    } else {
        Ok(x)
    }
}
