pub mod ast;
pub mod calculator;
pub mod config;
pub mod error;
pub mod functions;
pub mod plugin;
pub mod registry;

pub use ast::{evaluate, parse, ASTNode, Evaluator, Parser};
pub use calculator::Calculator;
pub use config::CalculatorConfig;
pub use error::{Error, EvalError, RegistryError, Result, SyntaxError, SyntaxErrorKind};
pub use registry::{Arity, Definition, Function, FunctionEntry, Registry};

/// Parses and evaluates `expression` against `registry` in one step.
pub fn evaluate_expression(expression: &str, registry: &Registry) -> Result<f64> {
    let ast = parse(expression)?;
    Ok(evaluate(&ast, registry)?)
}
