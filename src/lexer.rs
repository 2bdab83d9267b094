use crate::error::Span;
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TokenType {
    // Single-character tokens
    LeftParen,
    RightParen,
    LeftBrace,
    RightBrace,
    LeftBracket,
    RightBracket,
    Comma,
    Colon,
    Semicolon,
    Plus,
    Minus,
    Star,
    Slash,

    // One or two character tokens
    Bang,
    BangEqual,
    Equal,
    EqualEqual,
    Less,
    Greater,

    // Literals
    Identifier,
    Integer,
    String,

    // Keywords
    Let,
    Fn,
    If,
    Else,
    Return,
    True,
    False,

    // Special
    Eof,
    Illegal,
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let text = match self {
            TokenType::LeftParen => "(",
            TokenType::RightParen => ")",
            TokenType::LeftBrace => "{",
            TokenType::RightBrace => "}",
            TokenType::LeftBracket => "[",
            TokenType::RightBracket => "]",
            TokenType::Comma => ",",
            TokenType::Colon => ":",
            TokenType::Semicolon => ";",
            TokenType::Plus => "+",
            TokenType::Minus => "-",
            TokenType::Star => "*",
            TokenType::Slash => "/",
            TokenType::Bang => "!",
            TokenType::BangEqual => "!=",
            TokenType::Equal => "=",
            TokenType::EqualEqual => "==",
            TokenType::Less => "<",
            TokenType::Greater => ">",
            TokenType::Identifier => "identifier",
            TokenType::Integer => "integer literal",
            TokenType::String => "string literal",
            TokenType::Let => "let",
            TokenType::Fn => "fn",
            TokenType::If => "if",
            TokenType::Else => "else",
            TokenType::Return => "return",
            TokenType::True => "true",
            TokenType::False => "false",
            TokenType::Eof => "end of input",
            TokenType::Illegal => "illegal character",
        };
        write!(f, "{}", text)
    }
}

/// A single token with its lexeme and source position. Positions are 1-based
/// (line, column) for diagnostics plus a character `Span` for rendering.
#[derive(Debug, Clone)]
pub struct Token {
    pub token_type: TokenType,
    pub lexeme: String,
    pub line: usize,
    pub column: usize,
    pub span: Span,
}

impl Token {
    pub fn new(
        token_type: TokenType,
        lexeme: String,
        line: usize,
        column: usize,
        span: Span,
    ) -> Self {
        Self {
            token_type,
            lexeme,
            line,
            column,
            span,
        }
    }
}

/// Lazy, forward-only scanner. Call `next_token` repeatedly; after the `Eof`
/// token is produced, every subsequent call keeps yielding `Eof`.
pub struct Lexer {
    chars: Vec<char>,
    position: usize,
    read_position: usize,
    ch: char,
    line: usize,
    column: usize,
    keywords: HashMap<&'static str, TokenType>,
}

impl Lexer {
    pub fn new(source: &str) -> Self {
        let mut keywords = HashMap::new();
        keywords.insert("let", TokenType::Let);
        keywords.insert("fn", TokenType::Fn);
        keywords.insert("if", TokenType::If);
        keywords.insert("else", TokenType::Else);
        keywords.insert("return", TokenType::Return);
        keywords.insert("true", TokenType::True);
        keywords.insert("false", TokenType::False);

        let mut lexer = Self {
            chars: source.chars().collect(),
            position: 0,
            read_position: 0,
            ch: '\0',
            line: 1,
            column: 0,
            keywords,
        };
        lexer.read_char();
        lexer
    }

    pub fn next_token(&mut self) -> Token {
        self.skip_whitespace();

        let line = self.line;
        let column = self.column;
        let start = self.position;

        let token_type = match self.ch {
            '(' => TokenType::LeftParen,
            ')' => TokenType::RightParen,
            '{' => TokenType::LeftBrace,
            '}' => TokenType::RightBrace,
            '[' => TokenType::LeftBracket,
            ']' => TokenType::RightBracket,
            ',' => TokenType::Comma,
            ':' => TokenType::Colon,
            ';' => TokenType::Semicolon,
            '+' => TokenType::Plus,
            '-' => TokenType::Minus,
            '*' => TokenType::Star,
            '/' => TokenType::Slash,
            '<' => TokenType::Less,
            '>' => TokenType::Greater,
            '=' => {
                if self.peek_char() == '=' {
                    self.read_char();
                    TokenType::EqualEqual
                } else {
                    TokenType::Equal
                }
            }
            '!' => {
                if self.peek_char() == '=' {
                    self.read_char();
                    TokenType::BangEqual
                } else {
                    TokenType::Bang
                }
            }
            '"' => return self.read_string(line, column, start),
            '\0' => {
                return Token::new(
                    TokenType::Eof,
                    String::new(),
                    line,
                    column,
                    Span::single(start),
                )
            }
            c if c.is_ascii_digit() => return self.read_integer(line, column, start),
            c if c.is_alphabetic() || c == '_' => return self.read_identifier(line, column, start),
            _ => TokenType::Illegal,
        };

        self.read_char();
        let lexeme: String = self.chars[start..self.position].iter().collect();
        Token::new(token_type, lexeme, line, column, Span::new(start, self.position))
    }

    fn read_char(&mut self) {
        if self.ch == '\n' {
            self.line += 1;
            self.column = 0;
        }
        self.position = self.read_position;
        self.ch = self.chars.get(self.position).copied().unwrap_or('\0');
        if self.position < self.chars.len() {
            self.read_position += 1;
        }
        self.column += 1;
    }

    fn peek_char(&self) -> char {
        self.chars.get(self.read_position).copied().unwrap_or('\0')
    }

    fn skip_whitespace(&mut self) {
        while self.ch == ' ' || self.ch == '\t' || self.ch == '\r' || self.ch == '\n' {
            self.read_char();
        }
    }

    fn read_integer(&mut self, line: usize, column: usize, start: usize) -> Token {
        while self.ch.is_ascii_digit() {
            self.read_char();
        }
        let lexeme: String = self.chars[start..self.position].iter().collect();
        Token::new(
            TokenType::Integer,
            lexeme,
            line,
            column,
            Span::new(start, self.position),
        )
    }

    fn read_identifier(&mut self, line: usize, column: usize, start: usize) -> Token {
        while self.ch.is_alphanumeric() || self.ch == '_' {
            self.read_char();
        }
        let lexeme: String = self.chars[start..self.position].iter().collect();
        let token_type = self
            .keywords
            .get(lexeme.as_str())
            .copied()
            .unwrap_or(TokenType::Identifier);
        Token::new(
            token_type,
            lexeme,
            line,
            column,
            Span::new(start, self.position),
        )
    }

    fn read_string(&mut self, line: usize, column: usize, start: usize) -> Token {
        // Consume the opening quote
        self.read_char();
        while self.ch != '"' && self.ch != '\0' {
            self.read_char();
        }

        if self.ch == '\0' {
            // Unterminated string; surfaces as a parse error downstream
            let lexeme: String = self.chars[start..self.position].iter().collect();
            return Token::new(
                TokenType::Illegal,
                lexeme,
                line,
                column,
                Span::new(start, self.position),
            );
        }

        let lexeme: String = self.chars[start + 1..self.position].iter().collect();
        // Consume the closing quote
        self.read_char();
        Token::new(
            TokenType::String,
            lexeme,
            line,
            column,
            Span::new(start, self.position),
        )
    }
}
