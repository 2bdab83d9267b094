use crate::ast::{Block, Expr, InfixOp, PrefixOp, Program, Stmt};
use crate::environment::Environment;
use crate::value::{FunctionValue, Value};
use log::trace;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

/// Tree-walking evaluator. Purely synchronous, single-threaded recursion
/// over the AST; recursion depth follows AST nesting plus live call frames,
/// so host stack limits apply to pathologically deep programs.
///
/// Failure is a value: `Value::Error` halts the current expression and every
/// enclosing statement sequence, and surfaces unchanged to the caller.
pub struct Evaluator;

impl Evaluator {
    pub fn new() -> Self {
        Self
    }

    /// Evaluate a whole program. A `Return` reaching the top level is
    /// unwrapped to its inner value before being handed to the caller.
    pub fn eval_program(&self, program: &Program, env: &Rc<RefCell<Environment>>) -> Value {
        let mut result = Value::Null;

        for stmt in &program.statements {
            result = self.eval_statement(stmt, env);
            match result {
                Value::Return(inner) => return *inner,
                Value::Error(_) => return result,
                _ => {}
            }
        }

        result
    }

    /// Inside a nested block a `Return` stays wrapped so it keeps
    /// propagating up to the nearest function-call (or program) boundary.
    fn eval_block(&self, block: &Block, env: &Rc<RefCell<Environment>>) -> Value {
        let mut result = Value::Null;

        for stmt in &block.statements {
            result = self.eval_statement(stmt, env);
            if matches!(result, Value::Return(_) | Value::Error(_)) {
                return result;
            }
        }

        result
    }

    fn eval_statement(&self, stmt: &Stmt, env: &Rc<RefCell<Environment>>) -> Value {
        match stmt {
            Stmt::Let { name, value, .. } => {
                let value = self.eval_expression(value, env);
                if value.is_error() {
                    return value;
                }
                // Always a local write; shadows any outer binding
                env.borrow_mut().set(name, value);
                Value::Null
            }
            Stmt::Return { value, .. } => {
                let value = self.eval_expression(value, env);
                if value.is_error() {
                    return value;
                }
                Value::Return(Box::new(value))
            }
            Stmt::Expression { expr, .. } => self.eval_expression(expr, env),
        }
    }

    pub fn eval_expression(&self, expr: &Expr, env: &Rc<RefCell<Environment>>) -> Value {
        match expr {
            Expr::Integer { value, .. } => Value::Integer(*value),
            Expr::Boolean { value, .. } => Value::Boolean(*value),
            Expr::Str { value, .. } => Value::Str(value.clone()),
            Expr::Identifier { name, .. } => {
                trace!("resolve identifier '{}'", name);
                env.borrow().get(name)
            }
            Expr::Prefix {
                operator, operand, ..
            } => {
                let operand = self.eval_expression(operand, env);
                if operand.is_error() {
                    return operand;
                }
                eval_prefix_op(*operator, operand)
            }
            Expr::Infix {
                left,
                operator,
                right,
                ..
            } => {
                let left = self.eval_expression(left, env);
                if left.is_error() {
                    return left;
                }
                let right = self.eval_expression(right, env);
                if right.is_error() {
                    return right;
                }
                eval_infix_op(*operator, left, right)
            }
            Expr::If {
                condition,
                consequence,
                alternative,
                ..
            } => {
                let condition = self.eval_expression(condition, env);
                if condition.is_error() {
                    return condition;
                }
                if condition.is_truthy() {
                    self.eval_block(consequence, env)
                } else if let Some(alternative) = alternative {
                    self.eval_block(alternative, env)
                } else {
                    Value::Null
                }
            }
            Expr::Function {
                parameters, body, ..
            } => Value::Function(Rc::new(FunctionValue {
                parameters: parameters.clone(),
                body: body.clone(),
                env: Rc::clone(env),
            })),
            Expr::Call {
                callee, arguments, ..
            } => {
                let callee = self.eval_expression(callee, env);
                if callee.is_error() {
                    return callee;
                }
                let args = match self.eval_expressions(arguments, env) {
                    Ok(args) => args,
                    Err(error) => return error,
                };
                self.apply_function(callee, args)
            }
            Expr::Array { elements, .. } => match self.eval_expressions(elements, env) {
                Ok(elements) => Value::Array(elements),
                Err(error) => error,
            },
            Expr::Index { left, index, .. } => {
                let left = self.eval_expression(left, env);
                if left.is_error() {
                    return left;
                }
                let index = self.eval_expression(index, env);
                if index.is_error() {
                    return index;
                }
                eval_index_op(left, index)
            }
            Expr::Hash { pairs, .. } => self.eval_hash_literal(pairs, env),
        }
    }

    /// Evaluate expressions left to right, stopping at the first error.
    fn eval_expressions(
        &self,
        exprs: &[Expr],
        env: &Rc<RefCell<Environment>>,
    ) -> Result<Vec<Value>, Value> {
        let mut values = Vec::with_capacity(exprs.len());
        for expr in exprs {
            let value = self.eval_expression(expr, env);
            if value.is_error() {
                return Err(value);
            }
            values.push(value);
        }
        Ok(values)
    }

    fn apply_function(&self, callee: Value, args: Vec<Value>) -> Value {
        let function = match callee {
            Value::Function(function) => function,
            other => return Value::Error(format!("not a function: {}", other.type_name())),
        };

        if args.len() != function.parameters.len() {
            return Value::Error(format!(
                "wrong number of arguments: expected {}, got {}",
                function.parameters.len(),
                args.len()
            ));
        }

        trace!("call function with {} argument(s)", args.len());

        // Arguments bind in a fresh scope whose outer link is the function's
        // captured environment, not the caller's.
        let mut call_env = Environment::enclosed_by(Rc::clone(&function.env));
        for (name, value) in function.parameters.iter().zip(args) {
            call_env.set(name, value);
        }
        let call_env = Rc::new(RefCell::new(call_env));

        match self.eval_block(&function.body, &call_env) {
            Value::Return(inner) => *inner,
            other => other,
        }
    }

    fn eval_hash_literal(
        &self,
        pairs: &[(Expr, Expr)],
        env: &Rc<RefCell<Environment>>,
    ) -> Value {
        let mut hash = HashMap::new();

        for (key_expr, value_expr) in pairs {
            let key = self.eval_expression(key_expr, env);
            if key.is_error() {
                return key;
            }
            let Some(key) = key.hash_key() else {
                return Value::Error(format!("unusable as hash key: {}", key.type_name()));
            };

            let value = self.eval_expression(value_expr, env);
            if value.is_error() {
                return value;
            }

            hash.insert(key, value);
        }

        Value::Hash(hash)
    }
}

impl Default for Evaluator {
    fn default() -> Self {
        Self::new()
    }
}

fn eval_prefix_op(operator: PrefixOp, operand: Value) -> Value {
    match operator {
        PrefixOp::Negate => match operand {
            Value::Integer(n) => Value::Integer(-n),
            Value::Float(n) => Value::Float(-n),
            other => Value::Error(format!("unknown operator: -{}", other.type_name())),
        },
        PrefixOp::Not => match operand {
            Value::Boolean(b) => Value::Boolean(!b),
            // On integers `!` is a zero test, not general truthiness
            Value::Integer(n) => Value::Boolean(n == 0),
            other => Value::Error(format!("unknown operator: !{}", other.type_name())),
        },
    }
}

fn eval_infix_op(operator: InfixOp, left: Value, right: Value) -> Value {
    // An integer paired with a float promotes to float, so division chains
    // like `7 / 2 * 2` keep computing instead of tripping the mismatch check
    let (left, right) = match (left, right) {
        (Value::Integer(l), right @ Value::Float(_)) => (Value::Float(l as f64), right),
        (left @ Value::Float(_), Value::Integer(r)) => (left, Value::Float(r as f64)),
        pair => pair,
    };

    // Mixed operand types are rejected before any operator dispatch
    if std::mem::discriminant(&left) != std::mem::discriminant(&right) {
        return Value::Error(format!(
            "type mismatch: {} {} {}",
            left.type_name(),
            operator,
            right.type_name()
        ));
    }

    match (operator, left, right) {
        (InfixOp::Add, Value::Integer(l), Value::Integer(r)) => Value::Integer(l + r),
        (InfixOp::Subtract, Value::Integer(l), Value::Integer(r)) => Value::Integer(l - r),
        (InfixOp::Multiply, Value::Integer(l), Value::Integer(r)) => Value::Integer(l * r),
        (InfixOp::Divide, Value::Integer(l), Value::Integer(r)) => {
            if r == 0 {
                return Value::Error("division by zero".to_string());
            }
            // Division is real-valued; integral results collapse back to
            // integers so `50 / 2 * 2` stays in integer arithmetic
            numeric_result(l as f64 / r as f64)
        }
        (InfixOp::Less, Value::Integer(l), Value::Integer(r)) => Value::Boolean(l < r),
        (InfixOp::Greater, Value::Integer(l), Value::Integer(r)) => Value::Boolean(l > r),

        (InfixOp::Add, Value::Float(l), Value::Float(r)) => numeric_result(l + r),
        (InfixOp::Subtract, Value::Float(l), Value::Float(r)) => numeric_result(l - r),
        (InfixOp::Multiply, Value::Float(l), Value::Float(r)) => numeric_result(l * r),
        (InfixOp::Divide, Value::Float(l), Value::Float(r)) => {
            if r == 0.0 {
                return Value::Error("division by zero".to_string());
            }
            numeric_result(l / r)
        }
        (InfixOp::Less, Value::Float(l), Value::Float(r)) => Value::Boolean(l < r),
        (InfixOp::Greater, Value::Float(l), Value::Float(r)) => Value::Boolean(l > r),

        (InfixOp::Add, Value::Str(l), Value::Str(r)) => Value::Str(l + &r),

        (InfixOp::Equal, l, r) if equality_comparable(&l) => Value::Boolean(l == r),
        (InfixOp::NotEqual, l, r) if equality_comparable(&l) => Value::Boolean(l != r),

        (operator, l, r) => Value::Error(format!(
            "unknown operator: {} {} {}",
            l.type_name(),
            operator,
            r.type_name()
        )),
    }
}

/// Numeric results are floats only while non-integral; an integral result
/// collapses back to an integer so later arithmetic stays in integers.
fn numeric_result(n: f64) -> Value {
    if n.fract() == 0.0 {
        Value::Integer(n as i64)
    } else {
        Value::Float(n)
    }
}

fn equality_comparable(value: &Value) -> bool {
    matches!(
        value,
        Value::Integer(_) | Value::Float(_) | Value::Boolean(_) | Value::Str(_)
    )
}

fn eval_index_op(left: Value, index: Value) -> Value {
    match (left, index) {
        (Value::Array(elements), Value::Integer(i)) => {
            if i < 0 || i as usize >= elements.len() {
                return Value::Error(format!("array index out of bounds: {}", i));
            }
            elements[i as usize].clone()
        }
        (Value::Array(_), index) => Value::Error(format!(
            "array index must be an integer, got {}",
            index.type_name()
        )),
        (Value::Hash(pairs), index) => match index.hash_key() {
            // A missing key reads as null, like an undefined identifier
            Some(key) => pairs.get(&key).cloned().unwrap_or(Value::Null),
            None => Value::Error(format!("unusable as hash key: {}", index.type_name())),
        },
        (left, _) => Value::Error(format!(
            "index operator not supported for {}",
            left.type_name()
        )),
    }
}
