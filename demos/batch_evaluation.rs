use reckon::Calculator;

fn main() {
    pretty_env_logger::init();

    let mut calculator = Calculator::new();
    let report = calculator.load_plugins("plugins");
    println!(
        "Loaded {} plugin file(s), {} failed",
        report.loaded.len(),
        report.failed.len()
    );

    let expressions: Vec<String> = (1..=10)
        .map(|r| format!("round(pi * {} ^ 2, 2)", r))
        .chain(["sqrt(2) * sqrt(2)".to_string(), "log(0)".to_string()])
        .collect();

    let results = calculator.evaluate_many(&expressions);
    for (expression, result) in expressions.iter().zip(results) {
        match result {
            Ok(value) => println!("{} = {}", expression, value),
            Err(err) => println!("{}: Error: {}", expression, err),
        }
    }
}
