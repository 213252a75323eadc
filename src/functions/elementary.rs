use crate::functions::DOMAIN_ERROR;
use crate::registry::{Arity, Registry};
use reckon_macros::reckon_fn;

pub fn register(registry: &mut Registry) {
    registry.insert_function("log", Arity::Exact(1), log);
    registry.insert_function("sqrt", Arity::Exact(1), sqrt);
    registry.insert_function("abs", Arity::Exact(1), abs);
}

/// Natural logarithm.
#[reckon_fn]
pub fn log(x: f64) -> Result<f64, String> {
    if x <= 0.0 {
        return Err(DOMAIN_ERROR.to_string());
    }
    Ok(x.ln())
}

#[reckon_fn]
pub fn sqrt(x: f64) -> Result<f64, String> {
    if x < 0.0 {
        return Err(DOMAIN_ERROR.to_string());
    }
    Ok(x.sqrt())
}

#[reckon_fn]
pub fn abs(x: f64) -> Result<f64, String> {
    Ok(x.abs())
}
