use crate::registry::{Arity, Registry};

pub fn register(registry: &mut Registry) {
    registry.insert_function("round", Arity::Range { min: 1, max: 2 }, round);
}

/// `round(x)` rounds to the nearest integer, `round(x, digits)` to a number
/// of decimal places (negative counts round to tens, hundreds, ...). Ties go
/// to the even neighbour.
pub fn round(args: &[f64]) -> Result<f64, String> {
    match *args {
        [x] => round_to_integer(x),
        [x, digits] => {
            if digits.fract() != 0.0 || !digits.is_finite() {
                return Err(format!("digit count must be an integer, got {}", digits));
            }
            Ok(round_to_digits(x, digits as i64))
        }
        _ => Err(format!("Expected 1 or 2 arguments, but got {}", args.len())),
    }
}

fn round_to_integer(x: f64) -> Result<f64, String> {
    if !x.is_finite() {
        return Err(format!("cannot convert float {} to integer", x));
    }
    // The result is an integer, which has no negative zero.
    Ok(x.round_ties_even() + 0.0)
}

fn round_to_digits(x: f64, digits: i64) -> f64 {
    if !x.is_finite() || x == 0.0 || digits > f64::MAX_10_EXP as i64 {
        return x;
    }
    if digits < -(f64::MAX_10_EXP as i64) {
        return 0.0 * x.signum();
    }

    let factor = 10f64.powi(digits.unsigned_abs() as i32);
    let rounded = if digits >= 0 {
        (x * factor).round_ties_even() / factor
    } else {
        (x / factor).round_ties_even() * factor
    };

    if rounded.is_finite() {
        rounded
    } else {
        x
    }
}
