use std::collections::HashMap;
use std::fmt;
use std::mem;

mod evaluator;
mod parser;
mod token;

use crate::error::{EvalError, SyntaxError};
use crate::registry::Registry;

pub use evaluator::Evaluator;
pub use parser::Parser;
pub(crate) use token::is_identifier;
pub use token::{Token, TokenKind};

#[derive(Debug, PartialEq)]
pub enum ASTNode {
    Number(f64),
    /// A reference to a constant.
    Identifier(String),
    UnaryOperation {
        operator: UnaryOperator,
        operand: Box<ASTNode>,
    },
    BinaryOperation {
        left: Box<ASTNode>,
        operator: Operator,
        right: Box<ASTNode>,
    },
    FunctionCall {
        name: String,
        args: Vec<ASTNode>,
    },
}

impl ASTNode {
    pub fn identifier(name: &str) -> Self {
        ASTNode::Identifier(name.to_string())
    }

    pub fn negate(operand: ASTNode) -> Self {
        ASTNode::UnaryOperation {
            operator: UnaryOperator::Negate,
            operand: Box::new(operand),
        }
    }

    pub fn binary(left: ASTNode, operator: Operator, right: ASTNode) -> Self {
        ASTNode::BinaryOperation {
            left: Box::new(left),
            operator,
            right: Box::new(right),
        }
    }

    pub fn call(name: &str, args: Vec<ASTNode>) -> Self {
        ASTNode::FunctionCall {
            name: name.to_string(),
            args,
        }
    }

    /// Returns a copy of the tree with every identifier found in `bindings`
    /// replaced by its value. Function names are left alone.
    pub fn substitute(&self, bindings: &HashMap<String, f64>) -> ASTNode {
        match self {
            ASTNode::Number(value) => ASTNode::Number(*value),
            ASTNode::Identifier(name) => bindings
                .get(name)
                .map_or_else(|| ASTNode::Identifier(name.clone()), |value| ASTNode::Number(*value)),
            ASTNode::UnaryOperation { operator, operand } => ASTNode::UnaryOperation {
                operator: *operator,
                operand: Box::new(operand.substitute(bindings)),
            },
            ASTNode::BinaryOperation { .. } => {
                let (first, rest) = self.left_chain();
                rest.into_iter()
                    .fold(first.substitute(bindings), |left, (operator, right)| {
                        ASTNode::binary(left, operator, right.substitute(bindings))
                    })
            }
            ASTNode::FunctionCall { name, args } => ASTNode::FunctionCall {
                name: name.clone(),
                args: args.iter().map(|arg| arg.substitute(bindings)).collect(),
            },
        }
    }

    /// Splits a chain of binary operations along its left operands: the
    /// innermost left operand, then each operator with its right operand,
    /// innermost first. Evaluating them in that order is evaluating
    /// left to right.
    pub(crate) fn left_chain(&self) -> (&ASTNode, Vec<(Operator, &ASTNode)>) {
        let mut rest = Vec::new();
        let mut node = self;
        while let ASTNode::BinaryOperation {
            left,
            operator,
            right,
        } = node
        {
            rest.push((*operator, &**right));
            node = &**left;
        }
        rest.reverse();
        (node, rest)
    }

    fn is_leaf(&self) -> bool {
        matches!(self, ASTNode::Number(_) | ASTNode::Identifier(_))
    }

    /// Moves every non-leaf child into `pending`, leaving leaves behind.
    fn detach_children(&mut self, pending: &mut Vec<ASTNode>) {
        let mut detach = |child: &mut ASTNode| {
            if !child.is_leaf() {
                pending.push(mem::replace(child, ASTNode::Number(0.0)));
            }
        };
        match self {
            ASTNode::Number(_) | ASTNode::Identifier(_) => {}
            ASTNode::UnaryOperation { operand, .. } => detach(&mut **operand),
            ASTNode::BinaryOperation { left, right, .. } => {
                detach(&mut **left);
                detach(&mut **right);
            }
            ASTNode::FunctionCall { args, .. } => args.iter_mut().for_each(&mut detach),
        }
    }
}

impl Clone for ASTNode {
    fn clone(&self) -> Self {
        self.substitute(&HashMap::new())
    }
}

// Long operator chains are deeper than the call stack allows for a recursive drop.
impl Drop for ASTNode {
    fn drop(&mut self) {
        let mut pending = Vec::new();
        self.detach_children(&mut pending);
        while let Some(mut node) = pending.pop() {
            node.detach_children(&mut pending);
        }
    }
}

/// Fully parenthesised, so the output parses back to the same tree.
impl fmt::Display for ASTNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ASTNode::Number(value) => write!(f, "{}", value),
            ASTNode::Identifier(name) => write!(f, "{}", name),
            ASTNode::UnaryOperation { operator, operand } => {
                write!(f, "({}{})", operator, operand)
            }
            ASTNode::BinaryOperation { .. } => {
                let (first, rest) = self.left_chain();
                for _ in 0..rest.len() {
                    write!(f, "(")?;
                }
                write!(f, "{}", first)?;
                for (operator, right) in rest {
                    write!(f, " {} {})", operator, right)?;
                }
                Ok(())
            }
            ASTNode::FunctionCall { name, args } => {
                write!(f, "{}(", name)?;
                for (i, arg) in args.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{}", arg)?;
                }
                write!(f, ")")
            }
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum UnaryOperator {
    Negate,
}

impl UnaryOperator {
    pub fn apply(&self, operand: f64) -> f64 {
        match self {
            UnaryOperator::Negate => -operand,
        }
    }
}

impl fmt::Display for UnaryOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            UnaryOperator::Negate => write!(f, "-"),
        }
    }
}

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Operator {
    Add,
    Subtract,
    Multiply,
    Divide,
    Modulo,
    Power,
}

impl Operator {
    /// Plain IEEE-754 arithmetic: dividing by zero gives an infinity or NaN,
    /// and `%` keeps the sign of the dividend.
    pub fn apply(&self, left: f64, right: f64) -> f64 {
        match self {
            Operator::Add => left + right,
            Operator::Subtract => left - right,
            Operator::Multiply => left * right,
            Operator::Divide => left / right,
            Operator::Modulo => left % right,
            Operator::Power => left.powf(right),
        }
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let symbol = match self {
            Operator::Add => "+",
            Operator::Subtract => "-",
            Operator::Multiply => "*",
            Operator::Divide => "/",
            Operator::Modulo => "%",
            Operator::Power => "^",
        };
        write!(f, "{}", symbol)
    }
}

/// Parses `input` with the default nesting limit.
pub fn parse(input: &str) -> Result<ASTNode, SyntaxError> {
    Parser::default().parse(input)
}

/// Evaluates `ast` with the default nesting limit.
pub fn evaluate(ast: &ASTNode, registry: &Registry) -> Result<f64, EvalError> {
    Evaluator::default().evaluate(ast, registry)
}
