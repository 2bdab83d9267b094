use crate::error::Span;
use std::fmt;

/// AST node model produced by the parser and walked by the evaluator.
/// Nodes are immutable once constructed; every variant carries the `Span` of
/// the source region it was parsed from.

#[derive(Debug, Clone)]
pub struct Program {
    pub statements: Vec<Stmt>,
}

#[derive(Debug, Clone)]
pub enum Stmt {
    Let {
        name: String,
        value: Expr,
        span: Span,
    },
    Return {
        value: Expr,
        span: Span,
    },
    Expression {
        expr: Expr,
        span: Span,
    },
}

impl Stmt {
    pub fn span(&self) -> &Span {
        match self {
            Stmt::Let { span, .. } => span,
            Stmt::Return { span, .. } => span,
            Stmt::Expression { span, .. } => span,
        }
    }
}

/// Brace-delimited statement sequence, used by `if` arms and function bodies.
#[derive(Debug, Clone)]
pub struct Block {
    pub statements: Vec<Stmt>,
    pub span: Span,
}

#[derive(Debug, Clone)]
pub enum Expr {
    Integer {
        value: i64,
        span: Span,
    },
    Boolean {
        value: bool,
        span: Span,
    },
    Str {
        value: String,
        span: Span,
    },
    Identifier {
        name: String,
        span: Span,
    },
    Prefix {
        operator: PrefixOp,
        operand: Box<Expr>,
        span: Span,
    },
    Infix {
        left: Box<Expr>,
        operator: InfixOp,
        right: Box<Expr>,
        span: Span,
    },
    If {
        condition: Box<Expr>,
        consequence: Block,
        alternative: Option<Block>,
        span: Span,
    },
    Function {
        parameters: Vec<String>,
        body: Block,
        span: Span,
    },
    Call {
        callee: Box<Expr>,
        arguments: Vec<Expr>,
        span: Span,
    },
    Array {
        elements: Vec<Expr>,
        span: Span,
    },
    Index {
        left: Box<Expr>,
        index: Box<Expr>,
        span: Span,
    },
    /// Key/value pairs in source order; insertion order is irrelevant to
    /// semantics but preserved for display.
    Hash {
        pairs: Vec<(Expr, Expr)>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> &Span {
        match self {
            Expr::Integer { span, .. } => span,
            Expr::Boolean { span, .. } => span,
            Expr::Str { span, .. } => span,
            Expr::Identifier { span, .. } => span,
            Expr::Prefix { span, .. } => span,
            Expr::Infix { span, .. } => span,
            Expr::If { span, .. } => span,
            Expr::Function { span, .. } => span,
            Expr::Call { span, .. } => span,
            Expr::Array { span, .. } => span,
            Expr::Index { span, .. } => span,
            Expr::Hash { span, .. } => span,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixOp {
    Negate,
    Not,
}

impl fmt::Display for PrefixOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            PrefixOp::Negate => write!(f, "-"),
            PrefixOp::Not => write!(f, "!"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InfixOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Equal,
    NotEqual,
    Less,
    Greater,
}

impl fmt::Display for InfixOp {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let op = match self {
            InfixOp::Add => "+",
            InfixOp::Subtract => "-",
            InfixOp::Multiply => "*",
            InfixOp::Divide => "/",
            InfixOp::Equal => "==",
            InfixOp::NotEqual => "!=",
            InfixOp::Less => "<",
            InfixOp::Greater => ">",
        };
        write!(f, "{}", op)
    }
}

fn write_joined<T: fmt::Display>(
    f: &mut fmt::Formatter,
    items: &[T],
    separator: &str,
) -> fmt::Result {
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            write!(f, "{}", separator)?;
        }
        write!(f, "{}", item)?;
    }
    Ok(())
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write_joined(f, &self.statements, "; ")
    }
}

impl fmt::Display for Stmt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Stmt::Let { name, value, .. } => write!(f, "let {} = {}", name, value),
            Stmt::Return { value, .. } => write!(f, "return {}", value),
            Stmt::Expression { expr, .. } => write!(f, "{}", expr),
        }
    }
}

impl fmt::Display for Block {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{{")?;
        write_joined(f, &self.statements, "; ")?;
        write!(f, "}}")
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Integer { value, .. } => write!(f, "{}", value),
            Expr::Boolean { value, .. } => write!(f, "{}", value),
            Expr::Str { value, .. } => write!(f, "\"{}\"", value),
            Expr::Identifier { name, .. } => write!(f, "{}", name),
            Expr::Prefix {
                operator, operand, ..
            } => write!(f, "({}{})", operator, operand),
            Expr::Infix {
                left,
                operator,
                right,
                ..
            } => write!(f, "({} {} {})", left, operator, right),
            Expr::If {
                condition,
                consequence,
                alternative,
                ..
            } => {
                write!(f, "if ({}) {}", condition, consequence)?;
                if let Some(alt) = alternative {
                    write!(f, " else {}", alt)?;
                }
                Ok(())
            }
            Expr::Function {
                parameters, body, ..
            } => {
                write!(f, "fn(")?;
                write_joined(f, parameters, ", ")?;
                write!(f, ") {}", body)
            }
            Expr::Call {
                callee, arguments, ..
            } => {
                write!(f, "{}(", callee)?;
                write_joined(f, arguments, ", ")?;
                write!(f, ")")
            }
            Expr::Array { elements, .. } => {
                write!(f, "[")?;
                write_joined(f, elements, ", ")?;
                write!(f, "]")
            }
            Expr::Index { left, index, .. } => write!(f, "{}[{}]", left, index),
            Expr::Hash { pairs, .. } => {
                write!(f, "{{")?;
                for (i, (key, value)) in pairs.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{} : {}", key, value)?;
                }
                write!(f, "}}")
            }
        }
    }
}
