use crate::ast::{ASTNode, Evaluator, Parser};
use crate::config::CalculatorConfig;
use crate::error::{Result, SyntaxError};
use crate::plugin::{LoadReport, PluginLoader};
use crate::registry::Registry;
use log::debug;
use rayon::prelude::*;
use std::path::Path;

/// Parser, evaluator and registry bundled together.
///
/// ```
/// use reckon::Calculator;
///
/// let calculator = Calculator::new();
/// assert_eq!(calculator.evaluate("2 + 3 * 4").unwrap(), 14.0);
/// ```
#[derive(Debug, Clone)]
pub struct Calculator {
    registry: Registry,
    parser: Parser,
    evaluator: Evaluator,
}

impl Default for Calculator {
    fn default() -> Self {
        Self::new()
    }
}

impl Calculator {
    /// A calculator with the built-in constants and functions.
    pub fn new() -> Self {
        Self::with_registry(Registry::with_builtins())
    }

    pub fn with_registry(registry: Registry) -> Self {
        Self {
            registry,
            parser: Parser::default(),
            evaluator: Evaluator::default(),
        }
    }

    /// Built-ins, plus plugins when `config.load_plugins` is set.
    pub fn with_config(config: &CalculatorConfig) -> Self {
        let mut calculator = Self {
            registry: Registry::with_builtins(),
            parser: Parser::new(config.max_depth),
            evaluator: Evaluator::new(config.max_depth),
        };
        if config.load_plugins {
            calculator.load_plugins(&config.plugin_dir);
        }
        calculator
    }

    pub fn parse_expression(&self, input: &str) -> std::result::Result<ASTNode, SyntaxError> {
        self.parser.parse(input)
    }

    /// Parses and evaluates `input`. Each call builds a fresh tree.
    pub fn evaluate(&self, input: &str) -> Result<f64> {
        let ast = self.parse_expression(input)?;
        debug!("Parsed {:?} as {}", input, ast);
        self.evaluate_ast(&ast)
    }

    pub fn evaluate_ast(&self, ast: &ASTNode) -> Result<f64> {
        Ok(self.evaluator.evaluate(ast, &self.registry)?)
    }

    /// Evaluates independent expressions in parallel. Results keep the input order.
    pub fn evaluate_many<S>(&self, inputs: &[S]) -> Vec<Result<f64>>
    where
        S: AsRef<str> + Sync,
    {
        inputs
            .par_iter()
            .map(|input| self.evaluate(input.as_ref()))
            .collect()
    }

    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    /// Loads every plugin manifest in `dir` into this calculator's registry.
    pub fn load_plugins(&mut self, dir: impl AsRef<Path>) -> LoadReport {
        PluginLoader::new(dir.as_ref())
            .with_max_depth(self.parser.max_depth())
            .load(&mut self.registry)
    }
}
