use crate::ast::ASTNode;
use crate::config::DEFAULT_MAX_DEPTH;
use crate::error::EvalError;
use crate::registry::Registry;
use log::trace;

/// Walks an [`ASTNode`] tree and computes its value.
///
/// Names resolve against the registry's constants, calls against its
/// functions. The evaluator itself holds no state besides its nesting limit,
/// so one instance can be shared freely between threads.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Evaluator {
    max_depth: usize,
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl Evaluator {
    /// Creates a new `Evaluator` that refuses trees nested deeper than
    /// `max_depth` levels, counted the way [`Parser`](crate::ast::Parser) counts them.
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Evaluates an `ASTNode` against a registry.
    ///
    /// # Returns
    ///
    /// * `Ok(f64)` with the value of the expression. Division by zero yields
    ///   an infinity or NaN rather than an error.
    /// * `Err(EvalError)` on the first unknown name, unknown function, arity
    ///   mismatch, failing function or excessive nesting.
    pub fn evaluate(&self, ast: &ASTNode, registry: &Registry) -> Result<f64, EvalError> {
        self.evaluate_node(ast, registry, 1)
    }

    fn evaluate_node(
        &self,
        ast: &ASTNode,
        registry: &Registry,
        depth: usize,
    ) -> Result<f64, EvalError> {
        if depth > self.max_depth {
            return Err(EvalError::DepthExceeded(self.max_depth));
        }

        let result = match ast {
            ASTNode::Number(n) => *n,

            ASTNode::Identifier(name) => registry
                .constant(name)
                .ok_or_else(|| EvalError::UnknownName(name.clone()))?,

            ASTNode::UnaryOperation { operator, operand } => {
                operator.apply(self.evaluate_node(operand, registry, depth + 1)?)
            }

            ASTNode::BinaryOperation { .. } => {
                // A chain of left operands stays at this depth.
                let (first, rest) = ast.left_chain();
                let mut value = self.evaluate_node(first, registry, depth)?;
                for (operator, right) in rest {
                    let right_value = self.evaluate_node(right, registry, depth + 1)?;
                    value = operator.apply(value, right_value);
                }
                value
            }

            ASTNode::FunctionCall { name, args } => {
                // Arguments first, left to right, then the lookup.
                let values = args
                    .iter()
                    .map(|arg| self.evaluate_node(arg, registry, depth + 1))
                    .collect::<Result<Vec<f64>, EvalError>>()?;

                let function = registry
                    .function(name)
                    .ok_or_else(|| EvalError::UnknownFunction(name.clone()))?;
                function.call(name, &values)?
            }
        };

        trace!("Evaluated {} => {}", ast, result);
        Ok(result)
    }
}
