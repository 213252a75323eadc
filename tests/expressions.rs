use rand::Rng;
use reckon::config::DEFAULT_MAX_DEPTH;
use reckon::{
    evaluate, evaluate_expression, parse, Arity, Calculator, Error, EvalError, Registry,
    SyntaxErrorKind,
};
use std::fs;
use std::sync::Arc;
use std::thread;
use tempfile::TempDir;

const OPERATORS: [&str; 6] = ["+", "-", "*", "/", "%", "^"];

fn apply(operator: &str, left: f64, right: f64) -> f64 {
    match operator {
        "+" => left + right,
        "-" => left - right,
        "*" => left * right,
        "/" => left / right,
        "%" => left % right,
        "^" => left.powf(right),
        _ => unreachable!(),
    }
}

fn precedence(operator: &str) -> u8 {
    match operator {
        "+" | "-" => 1,
        "^" => 3,
        _ => 2,
    }
}

/// A random fully parenthesised expression and its value.
fn random_expression(rng: &mut impl Rng, depth: usize) -> (String, f64) {
    if depth == 0 || rng.random_bool(0.3) {
        let value = rng.random_range(0..20) as f64;
        return (format!("{}", value), value);
    }
    let operator = OPERATORS[rng.random_range(0..OPERATORS.len())];
    let (left, l) = random_expression(rng, depth - 1);
    let (right, r) = if operator == "^" {
        let exponent = rng.random_range(0..4) as f64;
        (format!("{}", exponent), exponent)
    } else {
        random_expression(rng, depth - 1)
    };
    (format!("({} {} {})", left, operator, right), apply(operator, l, r))
}

fn same(a: f64, b: f64) -> bool {
    a.to_bits() == b.to_bits() || (a.is_nan() && b.is_nan())
}

fn syntax_kind(input: &str) -> SyntaxErrorKind {
    match parse(input) {
        Err(e) => e.kind,
        Ok(ast) => panic!("{:?} parsed as {}", input, ast),
    }
}

#[test]
fn test_matches_float_arithmetic() {
    let calculator = Calculator::new();
    let mut rng = rand::rng();

    for _ in 0..500 {
        let (expression, expected) = random_expression(&mut rng, 5);
        let result = calculator.evaluate(&expression).unwrap();
        assert!(same(result, expected), "{} = {}, expected {}", expression, result, expected);
    }
}

#[test]
fn test_precedence_and_associativity() {
    let calculator = Calculator::new();
    let mut rng = rand::rng();

    for _ in 0..500 {
        let a = rng.random_range(1..10) as f64;
        let b = rng.random_range(1..10) as f64;
        let c = rng.random_range(1..4) as f64;
        let first = OPERATORS[rng.random_range(0..OPERATORS.len())];
        let second = OPERATORS[rng.random_range(0..OPERATORS.len())];

        let right_first = precedence(second) > precedence(first)
            || (first == "^" && second == "^");
        let expected = if right_first {
            apply(first, a, apply(second, b, c))
        } else {
            apply(second, apply(first, a, b), c)
        };

        let expression = format!("{} {} {} {} {}", a, first, b, second, c);
        let result = calculator.evaluate(&expression).unwrap();
        assert!(same(result, expected), "{} = {}, expected {}", expression, result, expected);
    }
}

#[test]
fn test_literal_round_trip() {
    let calculator = Calculator::new();
    let mut rng = rand::rng();

    for _ in 0..1000 {
        let value: f64 = rng.random_range(-1e12..1e12) * rng.random::<f64>();
        for text in [format!("{}", value), format!("{:e}", value)] {
            assert_eq!(calculator.evaluate(&text), Ok(value), "{}", text);
        }
    }
}

#[test]
fn test_documented_results() {
    let registry = Registry::with_builtins();
    let eval = |input: &str| evaluate_expression(input, &registry);

    assert_eq!(eval("3 + 4 * 2"), Ok(11.0));
    assert_eq!(eval("2 ^ 3 ^ 2"), Ok(512.0));
    assert_eq!(eval("sqrt(16)"), Ok(4.0));
    assert_eq!(eval("pi"), Ok(std::f64::consts::PI));
    assert_eq!(eval("-7 % 3"), Ok(-1.0));
    assert_eq!(eval("7 % -3"), Ok(1.0));
    assert_eq!(eval("1 / 0"), Ok(f64::INFINITY));
    assert_eq!(eval("-1 / 0"), Ok(f64::NEG_INFINITY));
    assert!(eval("0 / 0").unwrap().is_nan());
    assert!(eval("5 % 0").unwrap().is_nan());
    assert_eq!(eval("2 ** 10"), Ok(1024.0));
    assert_eq!(eval("-2 ^ 2"), Ok(4.0));
    assert_eq!(eval("round(2.675, 2)"), Ok(2.67));
}

#[test]
fn test_malformed_input_is_a_syntax_error() {
    assert_eq!(syntax_kind(""), SyntaxErrorKind::Empty);
    assert_eq!(syntax_kind("   "), SyntaxErrorKind::Empty);
    assert_eq!(syntax_kind("2+"), SyntaxErrorKind::UnexpectedToken);
    assert_eq!(syntax_kind("2+3)"), SyntaxErrorKind::UnmatchedParen);
    assert_eq!(syntax_kind("(2+3"), SyntaxErrorKind::UnmatchedParen);
    assert_eq!(syntax_kind("2 3"), SyntaxErrorKind::TrailingInput);
    assert_eq!(syntax_kind("2 $ 3"), SyntaxErrorKind::TrailingInput);
    assert_eq!(syntax_kind("sqrt(1,)"), SyntaxErrorKind::UnexpectedToken);
    assert_eq!(syntax_kind("__import__('os')"), SyntaxErrorKind::UnexpectedToken);
}

#[test]
fn test_evaluation_errors() {
    let registry = Registry::with_builtins();
    let eval = |input: &str| evaluate_expression(input, &registry);

    assert_eq!(
        eval("sqrt(16, 2)"),
        Err(Error::Eval(EvalError::ArityMismatch {
            name: "sqrt".to_string(),
            expected: Arity::Exact(1),
            got: 2,
        }))
    );
    assert_eq!(
        eval("undefined_name"),
        Err(Error::Eval(EvalError::UnknownName("undefined_name".to_string())))
    );
    assert_eq!(
        eval("sqrt(-1)"),
        Err(Error::Eval(EvalError::FunctionFailed {
            name: "sqrt".to_string(),
            message: "math domain error".to_string(),
        }))
    );
}

#[test]
fn test_registered_function() {
    let mut registry = Registry::with_builtins();
    assert_eq!(
        evaluate_expression("foo(1, 2)", &registry),
        Err(Error::Eval(EvalError::UnknownFunction("foo".to_string())))
    );

    registry
        .register_function("foo", Arity::Exact(2), |args| Ok(args[0] + args[1]))
        .unwrap();
    assert_eq!(evaluate_expression("foo(1, 2)", &registry), Ok(3.0));
}

#[test]
fn test_evaluation_is_idempotent() {
    let registry = Registry::with_builtins();
    let ast = parse("round(sin(pi / 3) * e ^ 2, 5) - abs(-1.5) % 0.7").unwrap();

    let first = evaluate(&ast, &registry).unwrap();
    let second = evaluate(&ast, &registry).unwrap();
    assert_eq!(first.to_bits(), second.to_bits());
}

#[test]
fn test_hostile_nesting_is_rejected() {
    let calculator = Calculator::new();

    let deep_parens = format!("{}1{}", "(".repeat(100_000), ")".repeat(100_000));
    assert!(matches!(
        calculator.evaluate(&deep_parens),
        Err(Error::Syntax(e)) if e.kind == SyntaxErrorKind::TooDeep
    ));

    let deep_negation = format!("{}1", "-".repeat(100_000));
    assert!(matches!(
        calculator.evaluate(&deep_negation),
        Err(Error::Syntax(e)) if e.kind == SyntaxErrorKind::TooDeep
    ));

    let long_power = format!("{}2", "2^".repeat(100_000));
    assert!(matches!(
        calculator.evaluate(&long_power),
        Err(Error::Syntax(e)) if e.kind == SyntaxErrorKind::TooDeep
    ));

    let nested_calls = format!("{}1{}", "abs(".repeat(100_000), ")".repeat(100_000));
    assert!(matches!(
        calculator.evaluate(&nested_calls),
        Err(Error::Syntax(e)) if e.kind == SyntaxErrorKind::TooDeep
    ));
}

#[test]
fn test_random_garbage_never_panics() {
    const ALPHABET: &[u8] = b"0123456789+-*/%^() .,eEpisqrtabc_$((((((((-)))";
    let calculator = Calculator::new();
    let mut rng = rand::rng();

    for _ in 0..2000 {
        let length = rng.random_range(0..400);
        let input: String = (0..length)
            .map(|_| ALPHABET[rng.random_range(0..ALPHABET.len())] as char)
            .collect();
        let _ = calculator.evaluate(&input);
    }

    for _ in 0..200 {
        let depth = rng.random_range(0..300);
        let opener = ["(", "-(", "abs(", "sqrt(", "2^("][rng.random_range(0..5)];
        let input = format!("{}1{}", opener.repeat(depth), ")".repeat(depth));
        let _ = calculator.evaluate(&input);
    }
}

#[test]
fn test_spaced_operators() {
    let calculator = Calculator::new();

    assert_eq!(calculator.evaluate("6 * 3"), Ok(18.0));
    assert_eq!(calculator.evaluate("6 / 3"), Ok(2.0));
    assert_eq!(calculator.evaluate("7 % 4"), Ok(3.0));
    assert_eq!(calculator.evaluate("2 ^ 3"), Ok(8.0));
    assert_eq!(calculator.evaluate("2 ** 3"), Ok(8.0));
    assert_eq!(calculator.evaluate("2* 3"), Ok(6.0));
    assert_eq!(calculator.evaluate("(1) * (2)"), Ok(2.0));
    assert_eq!(calculator.evaluate(" 3\t+ 4 *\n2 "), Ok(11.0));
}

#[test]
fn test_nesting_at_the_default_limit() {
    let within = format!("{}1{}", "(".repeat(DEFAULT_MAX_DEPTH), ")".repeat(DEFAULT_MAX_DEPTH));
    let beyond = format!("({})", within);
    let calls = format!(
        "{}1{}",
        "abs(".repeat(DEFAULT_MAX_DEPTH - 1),
        ")".repeat(DEFAULT_MAX_DEPTH - 1)
    );

    let handle = {
        let (within, beyond, calls) = (within.clone(), beyond.clone(), calls.clone());
        thread::spawn(move || {
            let calculator = Calculator::new();
            (
                calculator.evaluate(&within),
                calculator.evaluate(&beyond),
                calculator.evaluate(&calls),
            )
        })
    };
    let (within_result, beyond_result, calls_result) = handle.join().unwrap();
    assert_eq!(within_result, Ok(1.0));
    assert!(matches!(
        beyond_result,
        Err(Error::Syntax(e)) if e.kind == SyntaxErrorKind::TooDeep
    ));
    assert_eq!(calls_result, Ok(1.0));

    let results = Calculator::new().evaluate_many(&vec![within; 16]);
    assert!(results.iter().all(|result| *result == Ok(1.0)));
    let results = Calculator::new().evaluate_many(&vec![calls; 16]);
    assert!(results.iter().all(|result| *result == Ok(1.0)));
}

#[test]
fn test_long_flat_chains() {
    let calculator = Calculator::new();
    assert_eq!(calculator.evaluate(&vec!["1"; 300].join(" + ")), Ok(300.0));
    assert_eq!(calculator.evaluate(&vec!["2"; 300].join(" * ")), Ok(2f64.powi(300)));

    let handle = thread::spawn(|| {
        let sum = vec!["1"; 100_000].join("+");
        Calculator::new().evaluate(&sum)
    });
    assert_eq!(handle.join().unwrap(), Ok(100_000.0));
}

#[test]
fn test_shared_between_threads() {
    let calculator = Arc::new(Calculator::new());

    let handles: Vec<_> = (0..8)
        .map(|i| {
            let calculator = Arc::clone(&calculator);
            thread::spawn(move || calculator.evaluate(&format!("{} * 10 + sqrt(4)", i)))
        })
        .collect();

    for (i, handle) in handles.into_iter().enumerate() {
        assert_eq!(handle.join().unwrap(), Ok(i as f64 * 10.0 + 2.0));
    }
}

#[test]
fn test_plugins_extend_the_calculator() {
    let dir = TempDir::new().unwrap();
    fs::write(
        dir.path().join("finance.json"),
        r#"{
            "constants": { "vat": 0.2 },
            "functions": {
                "gross": { "params": ["net"], "body": "net * (1 + vat)" },
                "_internal": { "params": [], "body": "0" }
            }
        }"#,
    )
    .unwrap();
    fs::write(dir.path().join("broken.json"), r#"{ "functions": 12 }"#).unwrap();

    let mut calculator = Calculator::new();
    let report = calculator.load_plugins(dir.path());

    assert_eq!(report.loaded.len(), 1);
    assert_eq!(report.failed.len(), 1);
    assert_eq!(calculator.evaluate("gross(100)"), Ok(100.0 * (1.0 + 0.2)));
    assert_eq!(
        calculator.evaluate("_internal()"),
        Err(Error::Eval(EvalError::UnknownFunction("_internal".to_string())))
    );
}
