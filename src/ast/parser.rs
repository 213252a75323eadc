use crate::ast::token::{Token, TokenKind};
use crate::ast::{ASTNode, Operator, UnaryOperator};
use crate::config::DEFAULT_MAX_DEPTH;
use crate::error::{SyntaxError, SyntaxErrorKind};
use log::debug;
use pest::error::{Error as PestError, ErrorVariant, InputLocation};
use pest::iterators::{Pair, Pairs};
use pest::Parser as _;
use pest_derive::Parser;

#[derive(Parser)]
#[grammar = "ast/expression.pest"]
struct ExpressionGrammar;

/// A subtree together with its nesting depth. Left operands of binary
/// operators do not add to it: every tree walk follows that chain in a loop.
type Built = (ASTNode, usize);

/// Turns expression text into an [`ASTNode`] tree.
///
/// The whole input must form a single expression. Input nested deeper than
/// `max_depth` levels is rejected. A level is a pair of parentheses, a
/// function call, a negation or the right operand of a binary operator.
/// Flat chains such as `1 + 2 + ... + 300` stay at the same level.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Parser {
    max_depth: usize,
}

impl Default for Parser {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl Parser {
    pub fn new(max_depth: usize) -> Self {
        Self { max_depth }
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn parse(&self, input: &str) -> Result<ASTNode, SyntaxError> {
        debug!("Parsing expression: {}", input);
        if input.trim().is_empty() {
            return Err(SyntaxError::new(
                SyntaxErrorKind::Empty,
                0,
                "empty expression",
            ));
        }
        self.check_parentheses(input)?;

        let expression = ExpressionGrammar::parse(Rule::expression, input)
            .map_err(|e| convert_error(input, e))?
            .next()
            .and_then(|pair| pair.into_inner().find(|p| p.as_rule() == Rule::expr))
            .ok_or_else(|| SyntaxError::new(SyntaxErrorKind::Empty, 0, "empty expression"))?;

        let (ast, depth) = self.build_expression(expression)?;
        debug!("Parse result (depth {}): {}", depth, ast);
        Ok(ast)
    }

    /// Reports unbalanced parentheses precisely and caps nesting before the
    /// grammar recurses into it.
    fn check_parentheses(&self, input: &str) -> Result<(), SyntaxError> {
        let mut open = Vec::new();
        for (position, c) in input.char_indices() {
            match c {
                '(' => {
                    open.push(position);
                    if open.len() > self.max_depth {
                        return Err(self.too_deep(position));
                    }
                }
                ')' => {
                    if open.pop().is_none() {
                        return Err(SyntaxError::new(
                            SyntaxErrorKind::UnmatchedParen,
                            position,
                            "unmatched ')'",
                        ));
                    }
                }
                _ => {}
            }
        }

        match open.pop() {
            Some(position) => Err(SyntaxError::new(
                SyntaxErrorKind::UnmatchedParen,
                position,
                "'(' was never closed",
            )),
            None => Ok(()),
        }
    }

    fn build_expression(&self, pair: Pair<Rule>) -> Result<Built, SyntaxError> {
        let position = pair.as_span().start();
        let mut pairs = pair.into_inner();
        let mut node = self.build_term(next_pair(&mut pairs, position)?)?;

        while let Some(operator_pair) = pairs.next() {
            let operator = parse_operator(&operator_pair)?;
            let right = self.build_term(next_pair(&mut pairs, operator_pair.as_span().end())?)?;
            node = self.combine(node, operator, right, operator_pair.as_span().start())?;
        }

        Ok(node)
    }

    fn build_term(&self, pair: Pair<Rule>) -> Result<Built, SyntaxError> {
        let position = pair.as_span().start();
        let mut pairs = pair.into_inner();
        let mut node = self.build_factor(next_pair(&mut pairs, position)?)?;

        while let Some(operator_pair) = pairs.next() {
            let operator = parse_operator(&operator_pair)?;
            let right = self.build_factor(next_pair(&mut pairs, operator_pair.as_span().end())?)?;
            node = self.combine(node, operator, right, operator_pair.as_span().start())?;
        }

        Ok(node)
    }

    /// `^` associates to the right, so operands are collected first and
    /// folded from the end.
    fn build_factor(&self, pair: Pair<Rule>) -> Result<Built, SyntaxError> {
        let position = pair.as_span().start();
        let mut pairs = pair.into_inner();
        let first = self.build_unary(next_pair(&mut pairs, position)?)?;

        let mut rest = Vec::new();
        while let Some(operator_pair) = pairs.next() {
            let operator = parse_operator(&operator_pair)?;
            let operand = self.build_unary(next_pair(&mut pairs, operator_pair.as_span().end())?)?;
            rest.push((operator, operator_pair.as_span().start(), operand));
        }

        let Some((mut operator, mut position, mut node)) = rest.pop() else {
            return Ok(first);
        };
        while let Some((previous_operator, previous_position, left)) = rest.pop() {
            node = self.combine(left, operator, node, position)?;
            operator = previous_operator;
            position = previous_position;
        }
        self.combine(first, operator, node, position)
    }

    fn build_unary(&self, pair: Pair<Rule>) -> Result<Built, SyntaxError> {
        let position = pair.as_span().start();
        let mut negations = 0;
        let mut primary = None;
        for inner in pair.into_inner() {
            match inner.as_rule() {
                Rule::neg => negations += 1,
                _ => primary = Some(inner),
            }
        }

        let primary = primary.ok_or_else(|| incomplete(position))?;
        let (mut node, depth) = self.build_primary(primary)?;
        let depth = depth + negations;
        if depth > self.max_depth {
            return Err(self.too_deep(position));
        }
        for _ in 0..negations {
            node = ASTNode::UnaryOperation {
                operator: UnaryOperator::Negate,
                operand: Box::new(node),
            };
        }

        Ok((node, depth))
    }

    fn build_primary(&self, pair: Pair<Rule>) -> Result<Built, SyntaxError> {
        debug!("Building primary expression: {:?}", pair.as_str());
        let position = pair.as_span().start();
        match pair.as_rule() {
            Rule::number => {
                let value = pair.as_str().parse::<f64>().map_err(|e| {
                    SyntaxError::new(
                        SyntaxErrorKind::UnexpectedToken,
                        position,
                        format!("invalid number '{}': {}", pair.as_str(), e),
                    )
                })?;
                Ok((ASTNode::Number(value), 1))
            }
            Rule::identifier => Ok((ASTNode::Identifier(pair.as_str().to_string()), 1)),
            Rule::group => {
                let inner = pair.into_inner().next().ok_or_else(|| incomplete(position))?;
                self.build_expression(inner)
            }
            Rule::function_call => self.build_function_call(pair),
            rule => Err(SyntaxError::new(
                SyntaxErrorKind::UnexpectedToken,
                position,
                format!("unexpected rule in primary expression: {:?}", rule),
            )),
        }
    }

    fn build_function_call(&self, pair: Pair<Rule>) -> Result<Built, SyntaxError> {
        let position = pair.as_span().start();
        let mut inner = pair.into_inner();
        let name = next_pair(&mut inner, position)?.as_str().to_string();

        let mut args = Vec::new();
        let mut depth = 0;
        if let Some(arg_list) = inner.next() {
            for arg in arg_list.into_inner() {
                let (node, arg_depth) = self.build_expression(arg)?;
                depth = depth.max(arg_depth);
                args.push(node);
            }
        }

        let depth = depth + 1;
        if depth > self.max_depth {
            return Err(self.too_deep(position));
        }
        Ok((ASTNode::FunctionCall { name, args }, depth))
    }

    fn combine(
        &self,
        (left, left_depth): Built,
        operator: Operator,
        (right, right_depth): Built,
        position: usize,
    ) -> Result<Built, SyntaxError> {
        let depth = left_depth.max(right_depth + 1);
        if depth > self.max_depth {
            return Err(self.too_deep(position));
        }
        Ok((ASTNode::binary(left, operator, right), depth))
    }

    fn too_deep(&self, position: usize) -> SyntaxError {
        SyntaxError::new(
            SyntaxErrorKind::TooDeep,
            position,
            format!("expression nests deeper than {} levels", self.max_depth),
        )
    }
}

fn next_pair<'i>(pairs: &mut Pairs<'i, Rule>, position: usize) -> Result<Pair<'i, Rule>, SyntaxError> {
    pairs.next().ok_or_else(|| incomplete(position))
}

fn incomplete(position: usize) -> SyntaxError {
    SyntaxError::new(
        SyntaxErrorKind::UnexpectedToken,
        position,
        "incomplete expression",
    )
}

fn parse_operator(pair: &Pair<Rule>) -> Result<Operator, SyntaxError> {
    match pair.as_rule() {
        Rule::add => Ok(Operator::Add),
        Rule::sub => Ok(Operator::Subtract),
        Rule::mul => Ok(Operator::Multiply),
        Rule::div => Ok(Operator::Divide),
        Rule::rem => Ok(Operator::Modulo),
        Rule::pow => Ok(Operator::Power),
        _ => Err(SyntaxError::new(
            SyntaxErrorKind::UnexpectedToken,
            pair.as_span().start(),
            format!("expected an operator, found '{}'", pair.as_str()),
        )),
    }
}

fn convert_error(input: &str, error: PestError<Rule>) -> SyntaxError {
    let position = match error.location {
        InputLocation::Pos(position) => position,
        InputLocation::Span((start, _)) => start,
    };
    let expected = match &error.variant {
        ErrorVariant::ParsingError { positives, .. } => positives.clone(),
        ErrorVariant::CustomError { .. } => Vec::new(),
    };
    debug!("Parse error at {}: expected {:?}", position, expected);

    let token = Token::scan(input, position);
    if expected.contains(&Rule::EOI) {
        return SyntaxError::new(
            SyntaxErrorKind::TrailingInput,
            token.position,
            format!("unexpected {} after a complete expression", token),
        );
    }

    let message = match token.kind {
        TokenKind::End => format!("unexpected end of input, expected {}", describe(&expected)),
        _ => format!("unexpected {}, expected {}", token, describe(&expected)),
    };
    SyntaxError::new(SyntaxErrorKind::UnexpectedToken, token.position, message)
}

fn describe(expected: &[Rule]) -> String {
    let mut labels: Vec<&str> = Vec::new();
    for rule in expected {
        let label = match rule {
            Rule::add | Rule::sub | Rule::mul | Rule::div | Rule::rem | Rule::pow => "an operator",
            Rule::EOI => "end of input",
            _ => "a number, name or '('",
        };
        if !labels.contains(&label) {
            labels.push(label);
        }
    }

    if labels.is_empty() {
        "a valid expression".to_string()
    } else {
        labels.join(" or ")
    }
}
