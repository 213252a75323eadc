use log::debug;
use reckon::{Arity, Calculator};
use reckon_macros::reckon_fn;

#[reckon_fn]
fn hypot(x: f64, y: f64) -> Result<f64, String> {
    Ok(x.hypot(y))
}

#[reckon_fn]
fn factorial(n: i64) -> Result<f64, String> {
    if n < 0 {
        return Err("factorial of a negative number".to_string());
    }
    Ok((1..=n).map(|k| k as f64).product())
}

fn main() {
    pretty_env_logger::init();

    let mut calculator = Calculator::new();
    calculator
        .registry_mut()
        .register_function("hypot", Arity::Exact(2), hypot)
        .expect("valid name");
    calculator
        .registry_mut()
        .register_function("factorial", Arity::Exact(1), factorial)
        .expect("valid name");

    let expressions = [
        "3 + 4 * 2",
        "(3 + 4) * 2",
        "2 ^ 3 ^ 2",
        "round(pi, 4)",
        "hypot(3, 4)",
        "factorial(5) / factorial(3)",
        "factorial(2.5)",
        "sqrt(-1)",
        "1 / 0",
    ];

    for expression in expressions {
        let ast = calculator.parse_expression(expression);
        debug!("{} => {:?}", expression, ast);

        match calculator.evaluate(expression) {
            Ok(result) => println!("{} = {}", expression, result),
            Err(err) => println!("{}: Error: {}", expression, err),
        }
    }
}
