use crate::ast::{Block, Expr, InfixOp, PrefixOp, Program, Stmt};
use crate::error::{ParseError, Span};
use crate::lexer::{Lexer, Token, TokenType};
use log::trace;
use std::collections::HashMap;

/// Total order of binding strengths, weakest first. An infix operator binds
/// the expression parsed so far only while its precedence strictly exceeds
/// the minimum the caller passed down, which makes same-precedence chains
/// associate left.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Precedence {
    Lowest,
    Equals,
    LessGreater,
    Sum,
    Product,
    Prefix,
    Call,
    Index,
}

type PrefixParseFn = fn(&mut Parser) -> Result<Expr, ParseError>;
type InfixParseFn = fn(&mut Parser, Expr) -> Result<Expr, ParseError>;

/// Precedence-climbing (Pratt) parser over a lazy token stream with exactly
/// two tokens of lookahead (`cur_token` and `peek_token`).
///
/// Parse errors never abort the whole parse: a failed statement is recorded,
/// the parser resynchronizes at the next statement boundary, and parsing
/// continues so one pass collects every diagnosable defect.
pub struct Parser {
    lexer: Lexer,
    cur_token: Token,
    peek_token: Token,
    errors: Vec<ParseError>,
    prefix_fns: HashMap<TokenType, PrefixParseFn>,
    infix_fns: HashMap<TokenType, InfixParseFn>,
}

impl Parser {
    pub fn new(mut lexer: Lexer) -> Self {
        let cur_token = lexer.next_token();
        let peek_token = lexer.next_token();

        let mut prefix_fns: HashMap<TokenType, PrefixParseFn> = HashMap::new();
        prefix_fns.insert(TokenType::Integer, Self::parse_integer_literal);
        prefix_fns.insert(TokenType::True, Self::parse_boolean_literal);
        prefix_fns.insert(TokenType::False, Self::parse_boolean_literal);
        prefix_fns.insert(TokenType::String, Self::parse_string_literal);
        prefix_fns.insert(TokenType::Identifier, Self::parse_identifier);
        prefix_fns.insert(TokenType::Bang, Self::parse_prefix_expression);
        prefix_fns.insert(TokenType::Minus, Self::parse_prefix_expression);
        prefix_fns.insert(TokenType::LeftParen, Self::parse_grouped_expression);
        prefix_fns.insert(TokenType::If, Self::parse_if_expression);
        prefix_fns.insert(TokenType::Fn, Self::parse_function_literal);
        prefix_fns.insert(TokenType::LeftBracket, Self::parse_array_literal);
        prefix_fns.insert(TokenType::LeftBrace, Self::parse_hash_literal);

        let mut infix_fns: HashMap<TokenType, InfixParseFn> = HashMap::new();
        infix_fns.insert(TokenType::Plus, Self::parse_infix_expression);
        infix_fns.insert(TokenType::Minus, Self::parse_infix_expression);
        infix_fns.insert(TokenType::Star, Self::parse_infix_expression);
        infix_fns.insert(TokenType::Slash, Self::parse_infix_expression);
        infix_fns.insert(TokenType::Less, Self::parse_infix_expression);
        infix_fns.insert(TokenType::Greater, Self::parse_infix_expression);
        infix_fns.insert(TokenType::EqualEqual, Self::parse_infix_expression);
        infix_fns.insert(TokenType::BangEqual, Self::parse_infix_expression);
        infix_fns.insert(TokenType::LeftParen, Self::parse_call_expression);
        infix_fns.insert(TokenType::LeftBracket, Self::parse_index_expression);

        Self {
            lexer,
            cur_token,
            peek_token,
            errors: Vec::new(),
            prefix_fns,
            infix_fns,
        }
    }

    /// All syntax errors collected so far, in source order.
    pub fn errors(&self) -> &[ParseError] {
        &self.errors
    }

    pub fn parse_program(&mut self) -> Program {
        let mut statements = Vec::new();

        while self.cur_token.token_type != TokenType::Eof {
            match self.parse_statement() {
                Ok(stmt) => statements.push(stmt),
                Err(error) => {
                    self.errors.push(error);
                    self.synchronize();
                }
            }
            self.next_token();
        }

        Program { statements }
    }

    fn next_token(&mut self) {
        self.cur_token = std::mem::replace(&mut self.peek_token, self.lexer.next_token());
    }

    /// Skip to the next statement boundary after a parse error so later
    /// statements still get diagnosed.
    fn synchronize(&mut self) {
        while self.cur_token.token_type != TokenType::Semicolon
            && self.cur_token.token_type != TokenType::Eof
        {
            self.next_token();
        }
    }

    fn parse_statement(&mut self) -> Result<Stmt, ParseError> {
        let stmt = match self.cur_token.token_type {
            TokenType::Let => self.parse_let_statement()?,
            TokenType::Return => self.parse_return_statement()?,
            _ => self.parse_expression_statement()?,
        };

        // Statement terminators are optional
        if self.peek_token.token_type == TokenType::Semicolon {
            self.next_token();
        }

        Ok(stmt)
    }

    fn parse_let_statement(&mut self) -> Result<Stmt, ParseError> {
        trace!("let statement at {}:{}", self.cur_token.line, self.cur_token.column);
        let start = self.cur_token.span.start;

        self.expect_peek(TokenType::Identifier)?;
        let name = self.cur_token.lexeme.clone();

        self.expect_peek(TokenType::Equal)?;
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;
        let span = Span::new(start, value.span().end);

        Ok(Stmt::Let { name, value, span })
    }

    fn parse_return_statement(&mut self) -> Result<Stmt, ParseError> {
        trace!("return statement at {}:{}", self.cur_token.line, self.cur_token.column);
        let start = self.cur_token.span.start;
        self.next_token();

        let value = self.parse_expression(Precedence::Lowest)?;
        let span = Span::new(start, value.span().end);

        Ok(Stmt::Return { value, span })
    }

    fn parse_expression_statement(&mut self) -> Result<Stmt, ParseError> {
        let expr = self.parse_expression(Precedence::Lowest)?;
        let span = expr.span().clone();

        Ok(Stmt::Expression { expr, span })
    }

    fn parse_expression(&mut self, min_precedence: Precedence) -> Result<Expr, ParseError> {
        let prefix = match self.prefix_fns.get(&self.cur_token.token_type) {
            Some(function) => *function,
            None => {
                return Err(error_at(
                    &self.cur_token,
                    format!(
                        "no prefix parse function for '{}'",
                        self.cur_token.token_type
                    ),
                ));
            }
        };

        let mut left = prefix(self)?;

        while self.peek_token.token_type != TokenType::Semicolon
            && min_precedence < token_precedence(self.peek_token.token_type)
        {
            let infix = match self.infix_fns.get(&self.peek_token.token_type) {
                Some(function) => *function,
                None => return Ok(left),
            };
            self.next_token();
            left = infix(self, left)?;
        }

        Ok(left)
    }

    fn parse_integer_literal(&mut self) -> Result<Expr, ParseError> {
        let value = self.cur_token.lexeme.parse::<i64>().map_err(|_| {
            error_at(
                &self.cur_token,
                format!("invalid integer literal '{}'", self.cur_token.lexeme),
            )
        })?;

        Ok(Expr::Integer {
            value,
            span: self.cur_token.span.clone(),
        })
    }

    fn parse_boolean_literal(&mut self) -> Result<Expr, ParseError> {
        Ok(Expr::Boolean {
            value: self.cur_token.token_type == TokenType::True,
            span: self.cur_token.span.clone(),
        })
    }

    fn parse_string_literal(&mut self) -> Result<Expr, ParseError> {
        Ok(Expr::Str {
            value: self.cur_token.lexeme.clone(),
            span: self.cur_token.span.clone(),
        })
    }

    fn parse_identifier(&mut self) -> Result<Expr, ParseError> {
        Ok(Expr::Identifier {
            name: self.cur_token.lexeme.clone(),
            span: self.cur_token.span.clone(),
        })
    }

    fn parse_prefix_expression(&mut self) -> Result<Expr, ParseError> {
        let start = self.cur_token.span.start;
        let operator = match self.cur_token.token_type {
            TokenType::Bang => PrefixOp::Not,
            TokenType::Minus => PrefixOp::Negate,
            _ => unreachable!(),
        };

        self.next_token();
        let operand = self.parse_expression(Precedence::Prefix)?;
        let span = Span::new(start, operand.span().end);

        Ok(Expr::Prefix {
            operator,
            operand: Box::new(operand),
            span,
        })
    }

    fn parse_infix_expression(&mut self, left: Expr) -> Result<Expr, ParseError> {
        let operator = match self.cur_token.token_type {
            TokenType::Plus => InfixOp::Add,
            TokenType::Minus => InfixOp::Subtract,
            TokenType::Star => InfixOp::Multiply,
            TokenType::Slash => InfixOp::Divide,
            TokenType::EqualEqual => InfixOp::Equal,
            TokenType::BangEqual => InfixOp::NotEqual,
            TokenType::Less => InfixOp::Less,
            TokenType::Greater => InfixOp::Greater,
            _ => unreachable!(),
        };

        // Right operand parses at this operator's own precedence, so chains
        // of equal precedence fold to the left.
        let precedence = token_precedence(self.cur_token.token_type);
        self.next_token();
        let right = self.parse_expression(precedence)?;
        let span = Span::new(left.span().start, right.span().end);

        Ok(Expr::Infix {
            left: Box::new(left),
            operator,
            right: Box::new(right),
            span,
        })
    }

    fn parse_grouped_expression(&mut self) -> Result<Expr, ParseError> {
        self.next_token();
        let expr = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenType::RightParen)?;
        Ok(expr)
    }

    fn parse_if_expression(&mut self) -> Result<Expr, ParseError> {
        let start = self.cur_token.span.start;

        self.expect_peek(TokenType::LeftParen)?;
        self.next_token();
        let condition = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenType::RightParen)?;

        self.expect_peek(TokenType::LeftBrace)?;
        let consequence = self.parse_block()?;

        let alternative = if self.peek_token.token_type == TokenType::Else {
            self.next_token();
            self.expect_peek(TokenType::LeftBrace)?;
            Some(self.parse_block()?)
        } else {
            None
        };

        let end = alternative
            .as_ref()
            .map(|block| block.span.end)
            .unwrap_or(consequence.span.end);

        Ok(Expr::If {
            condition: Box::new(condition),
            consequence,
            alternative,
            span: Span::new(start, end),
        })
    }

    fn parse_block(&mut self) -> Result<Block, ParseError> {
        let start = self.cur_token.span.start;
        self.next_token();

        let mut statements = Vec::new();
        while self.cur_token.token_type != TokenType::RightBrace
            && self.cur_token.token_type != TokenType::Eof
        {
            statements.push(self.parse_statement()?);
            self.next_token();
        }

        if self.cur_token.token_type != TokenType::RightBrace {
            return Err(error_at(
                &self.cur_token,
                "expected '}' to close block".to_string(),
            ));
        }

        Ok(Block {
            statements,
            span: Span::new(start, self.cur_token.span.end),
        })
    }

    fn parse_function_literal(&mut self) -> Result<Expr, ParseError> {
        let start = self.cur_token.span.start;

        self.expect_peek(TokenType::LeftParen)?;
        let parameters = self.parse_function_parameters()?;

        self.expect_peek(TokenType::LeftBrace)?;
        let body = self.parse_block()?;
        let span = Span::new(start, body.span.end);

        Ok(Expr::Function {
            parameters,
            body,
            span,
        })
    }

    fn parse_function_parameters(&mut self) -> Result<Vec<String>, ParseError> {
        let mut parameters = Vec::new();

        if self.peek_token.token_type == TokenType::RightParen {
            self.next_token();
            return Ok(parameters);
        }

        self.next_token();
        parameters.push(self.parse_parameter_name()?);

        while self.peek_token.token_type == TokenType::Comma {
            self.next_token();
            self.next_token();
            parameters.push(self.parse_parameter_name()?);
        }

        self.expect_peek(TokenType::RightParen)?;
        Ok(parameters)
    }

    fn parse_parameter_name(&mut self) -> Result<String, ParseError> {
        if self.cur_token.token_type != TokenType::Identifier {
            return Err(error_at(
                &self.cur_token,
                format!(
                    "expected parameter name, found '{}'",
                    self.cur_token.token_type
                ),
            ));
        }
        Ok(self.cur_token.lexeme.clone())
    }

    fn parse_call_expression(&mut self, callee: Expr) -> Result<Expr, ParseError> {
        let start = callee.span().start;
        let arguments = self.parse_expression_list(TokenType::RightParen)?;
        let span = Span::new(start, self.cur_token.span.end);

        Ok(Expr::Call {
            callee: Box::new(callee),
            arguments,
            span,
        })
    }

    fn parse_array_literal(&mut self) -> Result<Expr, ParseError> {
        let start = self.cur_token.span.start;
        let elements = self.parse_expression_list(TokenType::RightBracket)?;
        let span = Span::new(start, self.cur_token.span.end);

        Ok(Expr::Array { elements, span })
    }

    /// Comma-delimited expressions bounded by `end`; the list may be empty.
    /// Leaves the closing token as the current token.
    fn parse_expression_list(&mut self, end: TokenType) -> Result<Vec<Expr>, ParseError> {
        let mut list = Vec::new();

        if self.peek_token.token_type == end {
            self.next_token();
            return Ok(list);
        }

        self.next_token();
        list.push(self.parse_expression(Precedence::Lowest)?);

        while self.peek_token.token_type == TokenType::Comma {
            self.next_token();
            self.next_token();
            list.push(self.parse_expression(Precedence::Lowest)?);
        }

        self.expect_peek(end)?;
        Ok(list)
    }

    fn parse_index_expression(&mut self, left: Expr) -> Result<Expr, ParseError> {
        let start = left.span().start;
        self.next_token();

        let index = self.parse_expression(Precedence::Lowest)?;
        self.expect_peek(TokenType::RightBracket)?;
        let span = Span::new(start, self.cur_token.span.end);

        Ok(Expr::Index {
            left: Box::new(left),
            index: Box::new(index),
            span,
        })
    }

    fn parse_hash_literal(&mut self) -> Result<Expr, ParseError> {
        let start = self.cur_token.span.start;
        let mut pairs = Vec::new();

        while self.peek_token.token_type != TokenType::RightBrace {
            self.next_token();
            let key = self.parse_expression(Precedence::Lowest)?;

            self.expect_peek(TokenType::Colon)?;
            self.next_token();
            let value = self.parse_expression(Precedence::Lowest)?;

            pairs.push((key, value));

            if self.peek_token.token_type != TokenType::RightBrace {
                self.expect_peek(TokenType::Comma)?;
            }
        }

        self.expect_peek(TokenType::RightBrace)?;
        let span = Span::new(start, self.cur_token.span.end);

        Ok(Expr::Hash { pairs, span })
    }

    fn expect_peek(&mut self, expected: TokenType) -> Result<(), ParseError> {
        if self.peek_token.token_type == expected {
            self.next_token();
            Ok(())
        } else {
            Err(error_at(
                &self.peek_token,
                format!(
                    "expected '{}', found '{}'",
                    expected, self.peek_token.token_type
                ),
            ))
        }
    }
}

fn error_at(token: &Token, message: String) -> ParseError {
    ParseError::new(token.line, token.column, token.span.clone(), message)
}

fn token_precedence(token_type: TokenType) -> Precedence {
    match token_type {
        TokenType::EqualEqual | TokenType::BangEqual => Precedence::Equals,
        TokenType::Less | TokenType::Greater => Precedence::LessGreater,
        TokenType::Plus | TokenType::Minus => Precedence::Sum,
        TokenType::Star | TokenType::Slash => Precedence::Product,
        TokenType::LeftParen => Precedence::Call,
        TokenType::LeftBracket => Precedence::Index,
        _ => Precedence::Lowest,
    }
}
