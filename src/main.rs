use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use log::debug;
use reckon::config::{DEFAULT_MAX_DEPTH, DEFAULT_PLUGIN_DIR};
use reckon::{Calculator, CalculatorConfig};

/// reckon evaluates arithmetic expressions such as `3 + 4 * 2` or
/// `round(sqrt(2), 3)`. Without an expression it starts an interactive prompt.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    /// Expression to evaluate, e.g. '3 + 4 * 2'.
    #[arg(allow_hyphen_values = true)]
    expression: Option<String>,

    /// Directory scanned for plugin manifests (*.json).
    #[arg(long, env = "RECKON_PLUGIN_DIR", default_value = DEFAULT_PLUGIN_DIR)]
    plugin_dir: PathBuf,

    /// Only use the built-in constants and functions.
    #[arg(long)]
    no_plugins: bool,

    /// Deepest nesting an expression may have.
    #[arg(long, env = "RECKON_MAX_DEPTH", default_value_t = DEFAULT_MAX_DEPTH)]
    max_depth: usize,

    /// Print the available constants and functions, then exit.
    #[arg(long)]
    list: bool,
}

impl Cli {
    fn config(&self) -> CalculatorConfig {
        CalculatorConfig {
            max_depth: self.max_depth,
            plugin_dir: self.plugin_dir.clone(),
            load_plugins: !self.no_plugins,
        }
    }
}

fn main() -> ExitCode {
    pretty_env_logger::init();

    let cli = Cli::parse();
    debug!("{:?}", cli);
    let calculator = Calculator::with_config(&cli.config());

    if cli.list {
        list(&calculator);
        return ExitCode::SUCCESS;
    }

    match cli.expression {
        Some(expression) => match calculator.evaluate(&expression) {
            Ok(result) => {
                println!("{}", result);
                ExitCode::SUCCESS
            }
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            }
        },
        None => match interactive(&calculator) {
            Ok(()) => ExitCode::SUCCESS,
            Err(e) => {
                eprintln!("Error: {}", e);
                ExitCode::FAILURE
            }
        },
    }
}

fn interactive(calculator: &Calculator) -> io::Result<()> {
    println!("Interactive mode (type 'exit' to quit)");

    let stdin = io::stdin();
    let mut stdout = io::stdout();
    let mut line = String::new();

    loop {
        print!(">>> ");
        stdout.flush()?;

        line.clear();
        if stdin.lock().read_line(&mut line)? == 0 {
            println!();
            return Ok(());
        }

        let input = line.trim();
        if input.is_empty() {
            continue;
        }
        if input.eq_ignore_ascii_case("exit") || input.eq_ignore_ascii_case("quit") {
            return Ok(());
        }

        match calculator.evaluate(input) {
            Ok(result) => println!("{}", result),
            Err(e) => eprintln!("Error: {}", e),
        }
    }
}

fn list(calculator: &Calculator) {
    let registry = calculator.registry();

    println!("Constants:");
    for name in registry.constant_names() {
        if let Some(value) = registry.constant(name) {
            println!("  {} = {}", name, value);
        }
    }

    println!("Functions:");
    for name in registry.function_names() {
        if let Some(entry) = registry.function(name) {
            println!("  {} ({} argument(s))", name, entry.arity());
        }
    }
}
