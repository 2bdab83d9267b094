use crate::environment::Environment;
use crate::evaluator::Evaluator;
use crate::lexer::Lexer;
use crate::parser::Parser;
use crate::value::Value;
use std::cell::RefCell;
use std::rc::Rc;

/// Run a whole source text in a fresh environment. Parse errors are all
/// reported before giving up; runtime errors surface as ordinary values and
/// never take the process down.
pub fn run(source: &str, filename: Option<&str>) {
    let lexer = Lexer::new(source);
    let mut parser = Parser::new(lexer);
    let program = parser.parse_program();

    if !parser.errors().is_empty() {
        for error in parser.errors() {
            error.report(source, filename);
        }
        return;
    }

    let evaluator = Evaluator::new();
    let env = Rc::new(RefCell::new(Environment::new()));

    match evaluator.eval_program(&program, &env) {
        Value::Null => {}
        error @ Value::Error(_) => eprintln!("{}", error),
        value => println!("{}", value),
    }
}
